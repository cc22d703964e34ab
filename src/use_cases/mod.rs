// Use cases layer: the frame loop that drives vehicles and trails.

pub mod drive;
pub mod types;
pub mod world;

pub use drive::world_task;
pub use types::{DriveEvent, FrameUpdate, TrailSnapshot, VehicleSnapshot};
pub use world::{World, WorldError};
