use crate::domain::trail::Color;
use glam::DVec3;
use serde::Deserialize;
use thiserror::Error;

/// Shared settings for every emitter in a trail system.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrailSettings {
    /// Ticks a point lives before it is recycled to the emitter's current position.
    pub ttl: f64,
}

impl Default for TrailSettings {
    fn default() -> Self {
        Self { ttl: 16.0 }
    }
}

/// Options for a single emitter. Every recognized option is listed here with its default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmitterOptions {
    /// Unique name within the owning trail system.
    pub id: String,

    /// Emission point in the target's local space.
    pub offset: DVec3,

    /// `#rgb` or `#rrggbb`.
    pub color: String,

    /// Number of points in the ring. Fixed for the emitter's lifetime.
    pub max_len: usize,

    /// Ribbon width handed to the renderer.
    pub line_width: f64,

    /// Per-emitter ttl override; falls back to [`TrailSettings::ttl`].
    pub ttl: Option<f64>,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self {
            id: String::new(),
            offset: DVec3::ZERO,
            color: "#fff".to_string(),
            max_len: 32,
            line_width: 0.015,
            ttl: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    #[error("emitter id must not be empty")]
    EmptyId,
    #[error("max_len must be at least 1")]
    ZeroCapacity,
    #[error("ttl must be finite and positive, got {0}")]
    InvalidTtl(f64),
    #[error("invalid color {0:?}")]
    InvalidColor(String),
    #[error("line_width must be finite and positive, got {0}")]
    InvalidLineWidth(f64),
    #[error("offset must be finite")]
    InvalidOffset,
}

/// Emitter options after validation, ready to build an emitter from.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEmitter {
    pub id: String,
    pub offset: DVec3,
    pub color: Color,
    pub max_len: usize,
    pub line_width: f64,
    pub ttl: f64,
}

impl EmitterOptions {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_offset(mut self, offset: DVec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn validate(&self, settings: &TrailSettings) -> Result<ValidatedEmitter, OptionsError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(OptionsError::EmptyId);
        }
        if self.max_len == 0 {
            return Err(OptionsError::ZeroCapacity);
        }

        let ttl = self.ttl.unwrap_or(settings.ttl);
        if !ttl.is_finite() || ttl <= 0.0 {
            return Err(OptionsError::InvalidTtl(ttl));
        }
        if !self.line_width.is_finite() || self.line_width <= 0.0 {
            return Err(OptionsError::InvalidLineWidth(self.line_width));
        }
        if !self.offset.is_finite() {
            return Err(OptionsError::InvalidOffset);
        }

        let color = self
            .color
            .parse::<Color>()
            .map_err(|_| OptionsError::InvalidColor(self.color.clone()))?;

        Ok(ValidatedEmitter {
            id: id.to_string(),
            offset: self.offset,
            color,
            max_len: self.max_len,
            line_width: self.line_width,
            ttl,
        })
    }
}

/// Emitters attached to every vehicle unless the tuning file overrides them:
/// the two rear tire contact patches and the two brake lights.
pub fn default_vehicle_emitters() -> Vec<EmitterOptions> {
    vec![
        EmitterOptions::new("tire-rear-left").with_offset(DVec3::new(-0.08, 0.0, -0.12)),
        EmitterOptions::new("tire-rear-right").with_offset(DVec3::new(0.08, 0.0, -0.12)),
        EmitterOptions::new("brake-left")
            .with_offset(DVec3::new(-0.07, 0.05, -0.2))
            .with_color("#ff0073"),
        EmitterOptions::new("brake-right")
            .with_offset(DVec3::new(0.07, 0.05, -0.2))
            .with_color("#ff0073"),
    ]
}
