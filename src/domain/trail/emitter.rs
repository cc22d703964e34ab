use super::{Color, TargetId, TrailPoint};
use crate::domain::tuning::ValidatedEmitter;
use crate::domain::vehicle::Transform;
use glam::DVec3;

/// Renderer-facing buffer for one emitter, rebuilt in place every update.
///
/// `positions[i]` and `fade[i]` describe the same point. Points are ordered by
/// ascending elapsed time, so the freshest sample comes first and the ribbon
/// runs from the emitter back along the path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    pub positions: Vec<DVec3>,
    pub fade: Vec<f64>,
}

/// A fixed ring of trail points bound to one local offset on one target.
#[derive(Debug, Clone)]
pub struct TrailEmitter {
    id: String,
    target: TargetId,
    offset: DVec3,
    color: Color,
    line_width: f64,
    ttl: f64,
    points: Vec<TrailPoint>,
    polyline: Polyline,
}

impl TrailEmitter {
    /// Seeds `max_len` points at the target's current emission point with phases spread
    /// evenly over `[0, ttl)`, so recycling is staggered rather than happening all at once.
    pub fn new(target: TargetId, validated: ValidatedEmitter, origin: &Transform) -> Self {
        let start = origin.apply(validated.offset);
        let points: Vec<TrailPoint> = (0..validated.max_len)
            .map(|i| {
                let phase = (i as f64 / validated.max_len as f64) * validated.ttl;
                TrailPoint::seeded(start, phase, validated.ttl)
            })
            .collect();

        let mut emitter = Self {
            id: validated.id,
            target,
            offset: validated.offset,
            color: validated.color,
            line_width: validated.line_width,
            ttl: validated.ttl,
            polyline: Polyline {
                positions: Vec::with_capacity(points.len()),
                fade: Vec::with_capacity(points.len()),
            },
            points,
        };
        emitter.rebuild_polyline();
        emitter
    }

    /// Ages every point by `dt` ticks, recycles expired points to the target's current
    /// emission point, then rebuilds the ordered polyline. Returns how many points recycled.
    pub fn update(&mut self, dt: f64, target: &Transform) -> usize {
        // Negative or NaN deltas would break the elapsed lower bound.
        let dt = dt.max(0.0);
        let emission = target.apply(self.offset);

        let mut recycled = 0;
        for point in &mut self.points {
            if point.advance(dt, || emission) {
                recycled += 1;
            }
        }

        self.rebuild_polyline();
        recycled
    }

    fn rebuild_polyline(&mut self) {
        // Stable sort keeps equal-elapsed points in their previous order.
        self.points.sort_by(|a, b| a.elapsed().total_cmp(&b.elapsed()));

        self.polyline.positions.clear();
        self.polyline.fade.clear();
        for point in &self.points {
            self.polyline.positions.push(point.position());
            self.polyline.fade.push(point.fade());
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    pub fn offset(&self) -> DVec3 {
        self.offset
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn line_width(&self) -> f64 {
        self.line_width
    }

    pub fn ttl(&self) -> f64 {
        self.ttl
    }

    pub fn max_len(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[TrailPoint] {
        &self.points
    }

    pub fn polyline(&self) -> &Polyline {
        &self.polyline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tuning::{EmitterOptions, TrailSettings};
    use glam::DQuat;
    use std::f64::consts::FRAC_PI_2;

    fn emitter(max_len: usize, offset: DVec3) -> TrailEmitter {
        let validated = EmitterOptions::new("rear")
            .with_offset(offset)
            .with_max_len(max_len)
            .validate(&TrailSettings { ttl: 16.0 })
            .expect("valid options");
        TrailEmitter::new(7, validated, &Transform::IDENTITY)
    }

    fn at(x: f64, z: f64) -> Transform {
        Transform {
            position: DVec3::new(x, 0.0, z),
            rotation: DQuat::IDENTITY,
        }
    }

    #[test]
    fn when_created_then_phases_are_staggered_over_ttl() {
        let emitter = emitter(4, DVec3::ZERO);

        let phases: Vec<f64> = emitter.points().iter().map(|p| p.elapsed()).collect();
        assert_eq!(phases, vec![0.0, 4.0, 8.0, 12.0]);
        assert_eq!(emitter.polyline().positions.len(), 4);
        assert_eq!(emitter.polyline().fade, vec![1.0, 0.75, 0.5, 0.25]);
    }

    #[test]
    fn when_updated_repeatedly_then_capacity_and_elapsed_bounds_hold() {
        let mut emitter = emitter(10, DVec3::new(0.1, 0.0, -0.2));

        for tick in 0..200 {
            let dt = [0.3, 1.0, 2.5, 0.0, 17.0][tick % 5];
            emitter.update(dt, &at(tick as f64, 0.0));

            assert_eq!(emitter.points().len(), 10);
            assert_eq!(emitter.polyline().positions.len(), 10);
            for point in emitter.points() {
                assert!(point.elapsed() >= 0.0);
                assert!(point.elapsed() < emitter.ttl());
            }
        }
    }

    #[test]
    fn when_updated_then_polyline_is_ordered_by_elapsed() {
        let mut emitter = emitter(8, DVec3::ZERO);

        for tick in 0..40 {
            emitter.update(1.5, &at(0.0, tick as f64));

            let elapsed: Vec<f64> = emitter.points().iter().map(|p| p.elapsed()).collect();
            assert!(elapsed.windows(2).all(|w| w[0] <= w[1]));
            for (point, pos) in emitter.points().iter().zip(&emitter.polyline().positions) {
                assert_eq!(point.position(), *pos);
            }
        }
    }

    #[test]
    fn when_delta_is_zero_then_points_are_unchanged() {
        let mut emitter = emitter(6, DVec3::ZERO);
        emitter.update(3.0, &at(1.0, 1.0));
        let before = emitter.points().to_vec();

        for _ in 0..10 {
            emitter.update(0.0, &at(50.0, 50.0));
        }

        assert_eq!(emitter.points(), before.as_slice());
    }

    #[test]
    fn when_point_recycles_then_it_samples_the_rotated_offset() {
        let mut emitter = emitter(1, DVec3::new(0.0, 0.0, -1.0));
        let target = Transform {
            position: DVec3::new(10.0, 0.0, 0.0),
            rotation: DQuat::from_rotation_y(FRAC_PI_2),
        };

        let recycled = emitter.update(16.0, &target);

        assert_eq!(recycled, 1);
        let pos = emitter.polyline().positions[0];
        assert!((pos - DVec3::new(9.0, 0.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn when_ticking_at_unit_steps_then_one_point_recycles_per_phase_slot() {
        let mut emitter = emitter(16, DVec3::ZERO);

        // 16 points over a ttl of 16 puts exactly one point on each integer phase.
        for tick in 1..=32 {
            let recycled = emitter.update(1.0, &at(0.0, tick as f64));
            assert_eq!(recycled, 1);
        }
        assert_eq!(emitter.polyline().positions[0], DVec3::new(0.0, 0.0, 32.0));
    }
}
