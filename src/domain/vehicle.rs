// Open-loop kinematic vehicle integrator.

use crate::domain::control::ControlInput;
use crate::domain::tuning::{TuningError, VehicleTuning};
use glam::{DQuat, DVec3};

/// World-space pose the renderer applies to a model and trail emitters sample from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: DVec3,
    pub rotation: DQuat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
    };

    /// Maps a point from the transform's local space into world space.
    pub fn apply(&self, local: DVec3) -> DVec3 {
        self.position + self.rotation * local
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Kinematic and visual-only state mutated by [`VehicleDynamics::update`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VehicleState {
    pub position: DVec3,
    /// Yaw around +Y in radians. Heading 0 faces +Z.
    pub heading: f64,
    /// Angular rate added to the heading each tick.
    pub angle: f64,
    pub velocity: f64,
    pub vx: f64,
    pub vz: f64,

    // Visual-only state (never feeds back into the pose)
    pub camera_angle: f64,
    pub tire_rotation: f64,
}

#[derive(Debug, Clone)]
pub struct VehicleDynamics {
    tuning: VehicleTuning,
    state: VehicleState,
}

impl VehicleDynamics {
    pub fn new(tuning: VehicleTuning) -> Result<Self, TuningError> {
        Self::with_state(tuning, VehicleState::default())
    }

    pub fn with_state(tuning: VehicleTuning, state: VehicleState) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self { tuning, state })
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn tuning(&self) -> &VehicleTuning {
        &self.tuning
    }

    pub fn transform(&self) -> Transform {
        Transform {
            position: self.state.position,
            rotation: DQuat::from_rotation_y(self.state.heading),
        }
    }

    /// Lateral camera offset derived from the smoothed camera angle.
    pub fn camera_offset_x(&self) -> f64 {
        self.state.camera_angle * -self.tuning.camera_sway
    }

    /// Advances the vehicle by one tick. `dt` is measured in ticks and only scales the
    /// position step; the velocity, steering and damping rates are per tick, so callers
    /// that need rate-independent motion feed whole ticks (see `World::advance`).
    pub fn update(&mut self, control: ControlInput, dt: f64) {
        let t = &self.tuning;
        let s = &mut self.state;

        s.velocity += control.throttle * t.acceleration;
        // Steering authority scales with speed; a parked car cannot turn.
        s.angle += control.steer * t.rotational_acceleration * s.velocity;
        s.heading += s.angle;

        s.vz = s.heading.cos() * s.velocity;
        s.vx = s.heading.sin() * s.velocity;
        s.position += DVec3::new(s.vx, 0.0, s.vz) * dt;

        s.velocity *= t.resistance;
        s.angle *= t.resistance;

        s.camera_angle += (s.angle - s.camera_angle) * t.camera_smoothing;

        s.tire_rotation += (control.steer - s.tire_rotation) * t.tire_follow;
        s.tire_rotation *= t.tire_return;
    }
}
