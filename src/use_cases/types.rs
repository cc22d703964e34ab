// Use-case level inputs/outputs for the frame loop.

use crate::domain::trail::{Color, TrailEmitter};
use crate::domain::{ControlInput, TargetId, VehicleDynamics};
use glam::DVec3;

#[derive(Debug, Clone)]
pub enum DriveEvent {
    Join { driver_id: u64 },
    Leave { driver_id: u64 },
    Input { driver_id: u64, input: ControlInput },
}

/// Everything the renderer needs for one frame. Published only after every vehicle and
/// every trail buffer has been updated for the tick.
#[derive(Debug, Clone, Default)]
pub struct FrameUpdate {
    pub tick: u64,
    pub vehicles: Vec<VehicleSnapshot>,
    pub trails: Vec<TrailSnapshot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSnapshot {
    pub driver_id: u64,
    pub position: DVec3,
    pub heading: f64,
    pub velocity: f64,
    pub camera_angle: f64,
    pub camera_offset_x: f64,
    pub tire_rotation: f64,
}

impl VehicleSnapshot {
    pub fn new(driver_id: u64, vehicle: &VehicleDynamics) -> Self {
        let s = vehicle.state();
        Self {
            driver_id,
            position: s.position,
            heading: s.heading,
            velocity: s.velocity,
            camera_angle: s.camera_angle,
            camera_offset_x: vehicle.camera_offset_x(),
            tire_rotation: s.tire_rotation,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrailSnapshot {
    pub id: String,
    pub target: TargetId,
    pub color: Color,
    pub line_width: f64,
    /// Ordered by ascending point age.
    pub positions: Vec<DVec3>,
    pub fade: Vec<f64>,
}

impl From<&TrailEmitter> for TrailSnapshot {
    fn from(e: &TrailEmitter) -> Self {
        Self {
            id: e.id().to_string(),
            target: e.target(),
            color: e.color(),
            line_width: e.line_width(),
            positions: e.polyline().positions.clone(),
            fade: e.polyline().fade.clone(),
        }
    }
}
