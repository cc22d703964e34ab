// Trail effect: fixed-capacity emitters whose points recycle to follow a moving target.

pub mod color;
pub mod emitter;
pub mod point;
pub mod system;

pub use color::Color;
pub use emitter::{Polyline, TrailEmitter};
pub use point::TrailPoint;
pub use system::TrailSystem;

use crate::domain::vehicle::Transform;
use std::collections::HashMap;

/// Identifies the transform an emitter follows (a driver's vehicle in the world loop).
pub type TargetId = u64;

/// Resolves emitter targets to their current world transform.
pub trait TransformSource {
    fn transform_of(&self, target: TargetId) -> Option<Transform>;
}

impl TransformSource for HashMap<TargetId, Transform> {
    fn transform_of(&self, target: TargetId) -> Option<Transform> {
        self.get(&target).copied()
    }
}

// A lone transform stands in for every target; handy for single-vehicle setups.
impl TransformSource for Transform {
    fn transform_of(&self, _target: TargetId) -> Option<Transform> {
        Some(*self)
    }
}
