// Domain layer: vehicle integration and the trail effect.

pub mod control;
pub mod errors;
pub mod trail;
pub mod tuning;
pub mod vehicle;

pub use control::ControlInput;
pub use errors::TrailError;
pub use trail::{Polyline, TargetId, TrailEmitter, TrailSystem, TransformSource};
pub use tuning::SimTuning;
pub use vehicle::{Transform, VehicleDynamics, VehicleState};
