use super::{Polyline, TargetId, TrailEmitter, TransformSource};
use crate::domain::errors::TrailError;
use crate::domain::tuning::{EmitterOptions, TrailSettings};
use tracing::{debug, info};

/// Insertion-ordered set of named emitters sharing one default ttl.
#[derive(Debug, Clone, Default)]
pub struct TrailSystem {
    settings: TrailSettings,
    // A Vec keeps insertion order for iteration; emitter counts are small.
    emitters: Vec<TrailEmitter>,
}

impl TrailSystem {
    pub fn new(settings: TrailSettings) -> Self {
        Self {
            settings,
            emitters: Vec::new(),
        }
    }

    pub fn settings(&self) -> &TrailSettings {
        &self.settings
    }

    /// Adds an emitter following `target`, seeded at the target's current transform.
    ///
    /// Fails without touching existing emitters when the options are invalid, the id is
    /// already taken, or `source` cannot resolve the target.
    pub fn add_emitter<S>(
        &mut self,
        target: TargetId,
        options: &EmitterOptions,
        source: &S,
    ) -> Result<&TrailEmitter, TrailError>
    where
        S: TransformSource + ?Sized,
    {
        let validated = options.validate(&self.settings)?;
        if self.position(&validated.id).is_some() {
            return Err(TrailError::DuplicateEmitter(validated.id));
        }
        let origin = source
            .transform_of(target)
            .ok_or(TrailError::UnknownTarget(target))?;

        info!(
            emitter_id = %validated.id,
            target_id = target,
            max_len = validated.max_len,
            ttl = validated.ttl,
            "trail emitter added"
        );
        self.emitters.push(TrailEmitter::new(target, validated, &origin));
        let idx = self.emitters.len() - 1;
        Ok(&self.emitters[idx])
    }

    /// Removes an emitter and releases its buffers.
    pub fn remove_emitter(&mut self, id: &str) -> Result<TrailEmitter, TrailError> {
        let idx = self
            .position(id)
            .ok_or_else(|| TrailError::UnknownEmitter(id.to_string()))?;

        info!(emitter_id = %id, "trail emitter removed");
        Ok(self.emitters.remove(idx))
    }

    /// Removes every emitter following `target`. Returns how many were removed.
    pub fn remove_target(&mut self, target: TargetId) -> usize {
        let before = self.emitters.len();
        self.emitters.retain(|e| e.target() != target);
        let removed = before - self.emitters.len();
        if removed > 0 {
            info!(target_id = target, removed, "trail emitters removed for target");
        }
        removed
    }

    /// Ages every emitter in insertion order and rebuilds its ordered polyline.
    ///
    /// Call this after the targets have been moved for the frame so fresh points land on
    /// this frame's pose. Emitters whose target is missing from `source` stay frozen.
    pub fn update<S>(&mut self, dt: f64, source: &S)
    where
        S: TransformSource + ?Sized,
    {
        for emitter in &mut self.emitters {
            let Some(transform) = source.transform_of(emitter.target()) else {
                debug!(
                    emitter_id = %emitter.id(),
                    target_id = emitter.target(),
                    "trail target missing; emitter frozen"
                );
                continue;
            };
            emitter.update(dt, &transform);
        }
    }

    pub fn emitter(&self, id: &str) -> Option<&TrailEmitter> {
        self.emitters.iter().find(|e| e.id() == id)
    }

    pub fn emitters(&self) -> impl Iterator<Item = &TrailEmitter> {
        self.emitters.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.emitters.iter().map(|e| e.id())
    }

    /// Renderer-facing buffers in insertion order.
    pub fn polylines(&self) -> impl Iterator<Item = (&str, &Polyline)> {
        self.emitters.iter().map(|e| (e.id(), e.polyline()))
    }

    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.emitters.iter().position(|e| e.id() == id)
    }
}
