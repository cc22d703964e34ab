use super::types::{DriveEvent, FrameUpdate};
use super::world::World;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, broadcast, mpsc};
use tracing::{info, warn};

/// Simulation rate the tuning constants are expressed against; one tick == one 60 Hz frame.
pub const TICKS_PER_SECOND: f64 = 60.0;

/// Converts a wall-clock interval into simulation ticks.
pub fn ticks_for(interval: Duration) -> f64 {
    interval.as_secs_f64() * TICKS_PER_SECOND
}

/// Drives the world at a fixed rate until `shutdown` fires.
///
/// Each interval drains pending events, advances the world by the elapsed ticks (vehicles,
/// then trails, per whole tick) and only then broadcasts the finished frame, so subscribers
/// never observe a half-updated frame.
pub async fn world_task(
    mut event_rx: mpsc::Receiver<DriveEvent>,
    frame_tx: broadcast::Sender<FrameUpdate>,
    mut world: World,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) {
    let mut interval = tokio::time::interval(tick_interval);
    let dt = ticks_for(tick_interval);

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!(tick = world.tick(), "world loop shutting down");
                break;
            }
            _ = interval.tick() => {}
        }

        while let Ok(ev) = event_rx.try_recv() {
            match ev {
                DriveEvent::Join { driver_id } => {
                    if let Err(e) = world.join(driver_id) {
                        warn!(driver_id, error = %e, "join rejected");
                    }
                }
                DriveEvent::Leave { driver_id } => {
                    world.leave(driver_id);
                }
                DriveEvent::Input { driver_id, input } => {
                    world.set_input(driver_id, input);
                }
            }
        }

        // Whole-tick substeps keep motion independent of the loop interval.
        world.advance(dt);

        // No subscribers is fine; frames are simply dropped.
        let _ = frame_tx.send(world.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ControlInput, SimTuning};

    #[test]
    fn when_interval_is_one_sixtieth_second_then_dt_is_one_tick() {
        let dt = ticks_for(Duration::from_secs_f64(1.0 / 60.0));

        assert!((dt - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn when_driver_joins_and_accelerates_then_frames_report_motion() {
        let (event_tx, event_rx) = mpsc::channel(16);
        let (frame_tx, mut frame_rx) = broadcast::channel(64);
        let shutdown = Arc::new(Notify::new());
        let world = World::new(SimTuning::default()).expect("default tuning is valid");

        let handle = tokio::spawn(world_task(
            event_rx,
            frame_tx,
            world,
            Duration::from_millis(2),
            shutdown.clone(),
        ));

        event_tx
            .send(DriveEvent::Join { driver_id: 9 })
            .await
            .expect("world loop running");
        event_tx
            .send(DriveEvent::Input {
                driver_id: 9,
                input: ControlInput::new(0.0, 1.0),
            })
            .await
            .expect("world loop running");

        let moving = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match frame_rx.recv().await {
                    Ok(frame) => {
                        if let Some(v) = frame.vehicles.iter().find(|v| v.driver_id == 9) {
                            if v.velocity > 0.0 && v.position.z > 0.0 {
                                return frame;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => panic!("frames closed"),
                }
            }
        })
        .await
        .expect("vehicle should start moving");

        assert_eq!(moving.trails.len(), 4);
        assert!(moving.trails.iter().all(|t| t.target == 9));

        shutdown.notify_one();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("world loop should stop")
            .expect("world loop should not panic");
    }
}
