use glam::DVec3;

/// One recycled sample of a trail. Holds no velocity: it stays where it was
/// sampled until its ttl runs out, then jumps back to the emitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    position: DVec3,
    elapsed: f64,
    ttl: f64,
}

impl TrailPoint {
    pub(crate) fn seeded(position: DVec3, phase: f64, ttl: f64) -> Self {
        Self {
            position,
            elapsed: phase,
            ttl,
        }
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn ttl(&self) -> f64 {
        self.ttl
    }

    /// Opacity for the renderer: 1 when freshly recycled, approaching 0 at the end of life.
    pub fn fade(&self) -> f64 {
        1.0 - self.elapsed / self.ttl
    }

    /// Ages the point by `dt` and recycles it once its ttl is reached.
    /// Returns true when the point was recycled.
    pub(crate) fn advance(&mut self, dt: f64, resample: impl FnOnce() -> DVec3) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.ttl {
            self.elapsed = 0.0;
            self.position = resample();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_ttl_is_reached_then_point_resets_and_resamples() {
        let mut point = TrailPoint::seeded(DVec3::ZERO, 15.0, 16.0);

        let recycled = point.advance(1.0, || DVec3::X);

        assert!(recycled);
        assert_eq!(point.elapsed(), 0.0);
        assert_eq!(point.position(), DVec3::X);
    }

    #[test]
    fn when_ttl_is_not_reached_then_position_is_kept() {
        let mut point = TrailPoint::seeded(DVec3::ZERO, 2.0, 16.0);

        let recycled = point.advance(1.0, || DVec3::X);

        assert!(!recycled);
        assert_eq!(point.elapsed(), 3.0);
        assert_eq!(point.position(), DVec3::ZERO);
        assert!((point.fade() - 13.0 / 16.0).abs() < 1e-12);
    }
}
