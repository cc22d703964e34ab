// Gameplay tuning, loaded from TOML and validated before the world starts.

pub mod trail;
pub mod vehicle;

pub use trail::{EmitterOptions, OptionsError, TrailSettings, ValidatedEmitter};
pub use vehicle::{TuningError, VehicleTuning};

use serde::Deserialize;

/// Full gameplay tuning for a world: one vehicle profile shared by every driver,
/// the trail settings, and the emitter layout attached to each vehicle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimTuning {
    pub vehicle: VehicleTuning,
    pub trails: TrailSettings,
    pub emitters: Vec<EmitterOptions>,
}

impl Default for SimTuning {
    fn default() -> Self {
        Self {
            vehicle: VehicleTuning::default(),
            trails: TrailSettings::default(),
            emitters: trail::default_vehicle_emitters(),
        }
    }
}
