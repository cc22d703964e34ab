use crate::domain::SimTuning;
use crate::domain::tuning::TuningError;
use std::{env, fs, time::Duration};
use thiserror::Error;

// Runtime/server constants (not gameplay tuning).

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const FRAME_BROADCAST_CAPACITY: usize = 128;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 60);

pub fn http_port() -> u16 {
    env::var("NEON_DRIVE_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3001)
}

pub fn tick_interval() -> Duration {
    env::var("NEON_DRIVE_TICK_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|millis| *millis > 0)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TICK_INTERVAL)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid vehicle tuning: {0}")]
    Tuning(#[from] TuningError),
}

/// Parses gameplay tuning from TOML. Missing tables and fields keep their defaults.
pub fn parse_tuning(text: &str) -> Result<SimTuning, ConfigError> {
    let tuning: SimTuning = toml::from_str(text)?;
    tuning.vehicle.validate()?;
    Ok(tuning)
}

/// Loads tuning from `NEON_DRIVE_TUNING` when set, otherwise returns the defaults.
pub fn load_tuning() -> Result<SimTuning, ConfigError> {
    let Ok(path) = env::var("NEON_DRIVE_TUNING") else {
        return Ok(SimTuning::default());
    };

    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let tuning = parse_tuning(&text)?;
    tracing::debug!(%path, emitters = tuning.emitters.len(), "tuning loaded");
    Ok(tuning)
}
