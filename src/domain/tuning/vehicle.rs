use serde::Deserialize;
use thiserror::Error;

/// Gameplay tuning for the vehicle integrator.
///
/// Keep this separate from runtime/server configuration (tick rates, buffer sizes, etc.).
/// Every rate below is applied once per tick; `dt` only scales the position step.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VehicleTuning {
    /// Velocity gained per tick at full throttle.
    pub acceleration: f64,

    /// Angular rate gained per tick at full steer, per unit of velocity.
    pub rotational_acceleration: f64,

    /// Multiplicative decay applied to velocity and angular rate each tick. Must be in (0, 1).
    pub resistance: f64,

    /// Exponential smoothing factor for the camera yaw. Higher is snappier. Must be in (0, 1].
    pub camera_smoothing: f64,

    /// Lateral camera offset per radian of smoothed camera angle.
    pub camera_sway: f64,

    /// How quickly the cosmetic tire angle follows the steering input.
    pub tire_follow: f64,

    /// Decay applied to the cosmetic tire angle after following.
    pub tire_return: f64,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            acceleration: 0.004,
            rotational_acceleration: 0.04,
            resistance: 0.95,
            camera_smoothing: 0.9,
            camera_sway: 50.0,
            tire_follow: 0.1,
            tire_return: 0.95,
        }
    }
}

/// Rejected vehicle tuning values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuningError {
    #[error("resistance must be in (0, 1), got {0}")]
    Resistance(f64),
    #[error("camera_smoothing must be in (0, 1], got {0}")]
    CameraSmoothing(f64),
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },
}

impl VehicleTuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        let fields = [
            ("acceleration", self.acceleration),
            ("rotational_acceleration", self.rotational_acceleration),
            ("resistance", self.resistance),
            ("camera_smoothing", self.camera_smoothing),
            ("camera_sway", self.camera_sway),
            ("tire_follow", self.tire_follow),
            ("tire_return", self.tire_return),
        ];
        if let Some(&(field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(TuningError::NonFinite { field });
        }

        if !(self.resistance > 0.0 && self.resistance < 1.0) {
            return Err(TuningError::Resistance(self.resistance));
        }
        if !(self.camera_smoothing > 0.0 && self.camera_smoothing <= 1.0) {
            return Err(TuningError::CameraSmoothing(self.camera_smoothing));
        }

        Ok(())
    }

    /// Steady-state speed under constant full throttle: the fixed point of
    /// `v = (v + a) * r`, i.e. `a * r / (1 - r)`.
    pub fn terminal_velocity(&self) -> f64 {
        self.acceleration * self.resistance / (1.0 - self.resistance)
    }
}
