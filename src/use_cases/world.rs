// Frame-ordered world: every vehicle moves before any trail samples it.

use super::types::{FrameUpdate, TrailSnapshot, VehicleSnapshot};
use crate::domain::tuning::TuningError;
use crate::domain::{
    ControlInput, SimTuning, TargetId, TrailError, TrailSystem, Transform, VehicleDynamics,
};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::{info, warn};

/// Errors returned by world setup and driver lifecycle operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    #[error(transparent)]
    Tuning(#[from] TuningError),
    #[error(transparent)]
    Trail(#[from] TrailError),
    #[error("driver {0} is already in the world")]
    DriverExists(u64),
}

struct Driver {
    vehicle: VehicleDynamics,
    // Held until the next input arrives.
    input: ControlInput,
}

pub struct World {
    tuning: SimTuning,
    // BTreeMap keeps vehicle updates and snapshots in a stable order.
    drivers: BTreeMap<u64, Driver>,
    trails: TrailSystem,
    poses: HashMap<TargetId, Transform>,
    tick: u64,
    // Fraction of a tick carried over between `advance` calls.
    pending: f64,
}

// Whole ticks run per `advance` call before the backlog is dropped.
const MAX_STEPS_PER_ADVANCE: u32 = 8;
// Absorbs float drift when an interval converts to just under one tick.
const TICK_EPSILON: f64 = 1e-6;

impl World {
    /// Validates the tuning once up front so joins cannot fail on bad configuration.
    pub fn new(tuning: SimTuning) -> Result<Self, WorldError> {
        tuning.vehicle.validate()?;

        let mut ids = Vec::with_capacity(tuning.emitters.len());
        for options in &tuning.emitters {
            let validated = options
                .validate(&tuning.trails)
                .map_err(TrailError::from)?;
            if ids.contains(&validated.id) {
                return Err(TrailError::DuplicateEmitter(validated.id).into());
            }
            ids.push(validated.id);
        }

        Ok(Self {
            trails: TrailSystem::new(tuning.trails),
            tuning,
            drivers: BTreeMap::new(),
            poses: HashMap::new(),
            tick: 0,
            pending: 0.0,
        })
    }

    /// Spawns a vehicle at the origin and attaches the configured emitters to it.
    /// Emitter ids are namespaced as `"<driver_id>/<emitter id>"`.
    pub fn join(&mut self, driver_id: u64) -> Result<(), WorldError> {
        if self.drivers.contains_key(&driver_id) {
            return Err(WorldError::DriverExists(driver_id));
        }

        let vehicle = VehicleDynamics::new(self.tuning.vehicle)?;
        let origin = vehicle.transform();
        for options in &self.tuning.emitters {
            let mut options = options.clone();
            options.id = format!("{driver_id}/{}", options.id.trim());
            if let Err(e) = self.trails.add_emitter(driver_id, &options, &origin) {
                // Keep the trail system consistent if a stale emitter is in the way.
                self.trails.remove_target(driver_id);
                return Err(e.into());
            }
        }

        self.poses.insert(driver_id, origin);
        self.drivers.insert(
            driver_id,
            Driver {
                vehicle,
                input: ControlInput::NEUTRAL,
            },
        );
        info!(driver_id, emitters = self.tuning.emitters.len(), "driver joined");
        Ok(())
    }

    /// Removes the driver's vehicle and its emitters. Returns false for unknown drivers.
    pub fn leave(&mut self, driver_id: u64) -> bool {
        if self.drivers.remove(&driver_id).is_none() {
            return false;
        }
        self.poses.remove(&driver_id);
        let removed = self.trails.remove_target(driver_id);
        info!(driver_id, removed, "driver left");
        true
    }

    /// Replaces the driver's held control input. Returns false for unknown drivers.
    pub fn set_input(&mut self, driver_id: u64, input: ControlInput) -> bool {
        match self.drivers.get_mut(&driver_id) {
            Some(driver) => {
                driver.input = input;
                true
            }
            None => {
                warn!(driver_id, "input for unknown driver dropped");
                false
            }
        }
    }

    /// Advances one frame: vehicles first, then trails against the fresh poses.
    pub fn step(&mut self, dt: f64) {
        for (id, driver) in &mut self.drivers {
            driver.vehicle.update(driver.input, dt);
            self.poses.insert(*id, driver.vehicle.transform());
        }

        self.trails.update(dt, &self.poses);
        self.tick += 1;
    }

    /// Accumulates `ticks` of elapsed time and runs one `step(1.0)` per whole tick.
    ///
    /// Every rate in the tuning is per tick, so stepping in whole ticks keeps motion the
    /// same whatever interval drives the loop. Returns the number of steps taken.
    pub fn advance(&mut self, ticks: f64) -> u32 {
        if ticks.is_nan() || ticks <= 0.0 {
            return 0;
        }
        self.pending += ticks;

        let mut steps = 0;
        while self.pending >= 1.0 - TICK_EPSILON {
            if steps == MAX_STEPS_PER_ADVANCE {
                warn!(
                    backlog = self.pending,
                    tick = self.tick,
                    "world fell behind; dropping backlog"
                );
                self.pending = 0.0;
                break;
            }
            self.step(1.0);
            self.pending -= 1.0;
            steps += 1;
        }
        steps
    }

    pub fn snapshot(&self) -> FrameUpdate {
        FrameUpdate {
            tick: self.tick,
            vehicles: self
                .drivers
                .iter()
                .map(|(id, d)| VehicleSnapshot::new(*id, &d.vehicle))
                .collect(),
            trails: self.trails.emitters().map(TrailSnapshot::from).collect(),
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn vehicle(&self, driver_id: u64) -> Option<&VehicleDynamics> {
        self.drivers.get(&driver_id).map(|d| &d.vehicle)
    }

    pub fn trails(&self) -> &TrailSystem {
        &self.trails
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tuning::{EmitterOptions, TrailSettings, VehicleTuning};
    use glam::DVec3;

    fn tuning() -> SimTuning {
        SimTuning {
            vehicle: VehicleTuning {
                acceleration: 0.015,
                ..VehicleTuning::default()
            },
            trails: TrailSettings { ttl: 4.0 },
            emitters: vec![
                EmitterOptions::new("rear").with_max_len(4),
                EmitterOptions::new("light")
                    .with_max_len(8)
                    .with_offset(DVec3::new(0.0, 0.0, -1.0)),
            ],
        }
    }

    #[test]
    fn when_driver_joins_then_configured_emitters_are_namespaced() {
        let mut world = World::new(tuning()).expect("valid tuning");

        world.join(7).expect("join succeeds");

        let ids: Vec<&str> = world.trails().emitters().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["7/rear", "7/light"]);
        assert_eq!(world.driver_count(), 1);
    }

    #[test]
    fn when_driver_joins_twice_then_second_join_is_rejected() {
        let mut world = World::new(tuning()).expect("valid tuning");
        world.join(7).expect("join succeeds");

        assert_eq!(world.join(7), Err(WorldError::DriverExists(7)));
        assert_eq!(world.trails().len(), 2);
    }

    #[test]
    fn when_layout_repeats_an_id_then_world_rejects_it() {
        let mut bad = tuning();
        bad.emitters.push(EmitterOptions::new("rear"));

        assert!(matches!(
            World::new(bad),
            Err(WorldError::Trail(TrailError::DuplicateEmitter(id))) if id == "rear"
        ));
    }

    #[test]
    fn when_vehicle_tuning_is_invalid_then_world_rejects_it() {
        let mut bad = tuning();
        bad.vehicle.resistance = 1.5;

        assert!(matches!(World::new(bad), Err(WorldError::Tuning(_))));
    }

    #[test]
    fn when_stepping_then_fresh_trail_points_sit_on_this_frames_pose() {
        let mut world = World::new(tuning()).expect("valid tuning");
        world.join(1).expect("join succeeds");
        world.set_input(1, ControlInput::new(0.0, 1.0));

        for _ in 0..12 {
            world.step(1.0);

            let pose = world.vehicle(1).expect("vehicle exists").transform();
            let rear = world.trails().emitter("1/rear").expect("emitter exists");
            // With 4 points over a ttl of 4 one point recycles every tick.
            assert_eq!(rear.points()[0].elapsed(), 0.0);
            assert_eq!(rear.polyline().positions[0], pose.position);
        }
    }

    #[test]
    fn when_driver_leaves_then_vehicle_and_trails_are_released() {
        let mut world = World::new(tuning()).expect("valid tuning");
        world.join(1).expect("join succeeds");
        world.join(2).expect("join succeeds");

        assert!(world.leave(1));
        assert!(!world.leave(1));

        assert!(world.vehicle(1).is_none());
        assert!(world.trails().emitters().all(|e| e.target() == 2));
        assert!(!world.set_input(1, ControlInput::new(1.0, 1.0)));
    }

    fn drive_for(world: &mut World, frames: usize, ticks_per_frame: f64) {
        for _ in 0..frames {
            world.advance(ticks_per_frame);
        }
    }

    #[test]
    fn when_loop_rate_halves_then_pose_after_one_second_is_unchanged() {
        let mut fast = World::new(tuning()).expect("valid tuning");
        let mut slow = World::new(tuning()).expect("valid tuning");
        for world in [&mut fast, &mut slow] {
            world.join(1).expect("join succeeds");
            world.set_input(1, ControlInput::new(1.0, 1.0));
        }

        drive_for(&mut fast, 60, 1.0);
        drive_for(&mut slow, 30, 2.0);

        let a = *fast.vehicle(1).expect("vehicle exists").state();
        let b = *slow.vehicle(1).expect("vehicle exists").state();
        assert!((a.heading - b.heading).abs() < 1e-9);
        assert!((a.velocity - b.velocity).abs() < 1e-9);
        assert!((a.position - b.position).length() < 1e-9);
        assert_eq!(fast.tick(), 60);
        assert_eq!(slow.tick(), 60);

        let fast_rear = fast.trails().emitter("1/rear").expect("emitter exists");
        let slow_rear = slow.trails().emitter("1/rear").expect("emitter exists");
        assert_eq!(fast_rear.polyline(), slow_rear.polyline());
    }

    #[test]
    fn when_advancing_by_fractions_then_remainder_carries_over() {
        let mut world = World::new(tuning()).expect("valid tuning");

        assert_eq!(world.advance(0.5), 0);
        assert_eq!(world.advance(0.75), 1);
        assert_eq!(world.advance(0.75), 1);
        assert_eq!(world.tick(), 2);

        assert_eq!(world.advance(-1.0), 0);
        assert_eq!(world.advance(f64::NAN), 0);
        assert_eq!(world.tick(), 2);
    }

    #[test]
    fn when_interval_is_just_under_a_tick_then_one_step_still_runs() {
        let mut world = World::new(tuning()).expect("valid tuning");

        assert_eq!(world.advance(1.0 - 1e-8), 1);
    }

    #[test]
    fn when_backlog_is_large_then_steps_are_capped() {
        let mut world = World::new(tuning()).expect("valid tuning");

        assert_eq!(world.advance(100.0), MAX_STEPS_PER_ADVANCE);
        assert_eq!(world.advance(0.5), 0);
    }

    #[test]
    fn when_snapshotting_then_every_vehicle_and_trail_is_reported() {
        let mut world = World::new(tuning()).expect("valid tuning");
        world.join(3).expect("join succeeds");
        world.join(1).expect("join succeeds");
        world.step(1.0);

        let frame = world.snapshot();

        assert_eq!(frame.tick, 1);
        let drivers: Vec<u64> = frame.vehicles.iter().map(|v| v.driver_id).collect();
        assert_eq!(drivers, vec![1, 3]);
        assert_eq!(frame.trails.len(), 4);
        assert_eq!(frame.trails[1].positions.len(), 8);
        assert_eq!(frame.trails[1].fade.len(), 8);
    }
}
