// Wire protocol DTOs and conversions for the frame stream.

use crate::domain::ControlInput;
use crate::use_cases::{FrameUpdate, TrailSnapshot, VehicleSnapshot};
use serde::{Deserialize, Serialize};

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Assigned identity for the connection after Join is accepted.
    Identity { driver_id: String },
    // Fully updated frame: vehicle poses plus ordered trail buffers.
    Frame(FrameDto),
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    // Initial handshake; spawns a vehicle for this connection.
    Join(JoinPayload),
    // Control samples sent after a successful Join.
    Input(ControlInputDto),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JoinPayload {
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Per-frame control sample sent by the client after joining.
#[derive(Debug, Clone, Deserialize)]
pub struct ControlInputDto {
    #[serde(default)]
    pub steer: f64,
    #[serde(default)]
    pub throttle: f64,
}

impl From<ControlInputDto> for ControlInput {
    fn from(input: ControlInputDto) -> Self {
        ControlInput::new(input.steer, input.throttle)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameDto {
    pub tick: u64,
    pub vehicles: Vec<VehicleDto>,
    pub trails: Vec<TrailDto>,
}

impl From<FrameUpdate> for FrameDto {
    fn from(frame: FrameUpdate) -> Self {
        Self {
            tick: frame.tick,
            vehicles: frame.vehicles.iter().map(VehicleDto::from).collect(),
            trails: frame.trails.iter().map(TrailDto::from).collect(),
        }
    }
}

/// Flattened vehicle pose and visual angles.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleDto {
    pub driver_id: String,
    pub position: [f64; 3],
    pub heading: f64,
    pub velocity: f64,
    pub camera_angle: f64,
    pub camera_offset_x: f64,
    pub tire_rotation: f64,
}

impl From<&VehicleSnapshot> for VehicleDto {
    fn from(v: &VehicleSnapshot) -> Self {
        Self {
            driver_id: v.driver_id.to_string(),
            position: v.position.to_array(),
            heading: v.heading,
            velocity: v.velocity,
            camera_angle: v.camera_angle,
            camera_offset_x: v.camera_offset_x,
            tire_rotation: v.tire_rotation,
        }
    }
}

/// One ribbon, freshest point first.
#[derive(Debug, Clone, Serialize)]
pub struct TrailDto {
    pub id: String,
    pub driver_id: String,
    pub color: String,
    pub line_width: f64,
    pub points: Vec<[f64; 3]>,
    pub fade: Vec<f64>,
}

impl From<&TrailSnapshot> for TrailDto {
    fn from(t: &TrailSnapshot) -> Self {
        Self {
            id: t.id.clone(),
            driver_id: t.target.to_string(),
            color: t.color.to_string(),
            line_width: t.line_width,
            points: t.positions.iter().map(|p| p.to_array()).collect(),
            fade: t.fade.clone(),
        }
    }
}
