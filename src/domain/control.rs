// Per-frame control sample consumed by the vehicle integrator.

/// Normalized steering/throttle pair, nominally in [-1, 1] on both axes.
///
/// The integrator does not validate the range; callers that accept untrusted
/// input are expected to run [`ControlInput::sanitized`] first.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlInput {
    /// Horizontal axis: negative steers left, positive steers right.
    pub steer: f64,
    /// Vertical axis: positive accelerates, negative brakes/reverses.
    pub throttle: f64,
}

impl ControlInput {
    pub const NEUTRAL: Self = Self {
        steer: 0.0,
        throttle: 0.0,
    };

    pub fn new(steer: f64, throttle: f64) -> Self {
        Self { steer, throttle }
    }

    /// Drops non-finite samples and clamps the rest into [-1, 1].
    pub fn sanitized(self) -> Option<Self> {
        if !self.steer.is_finite() || !self.throttle.is_finite() {
            return None;
        }

        Some(Self {
            steer: self.steer.clamp(-1.0, 1.0),
            throttle: self.throttle.clamp(-1.0, 1.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_values_are_out_of_range_then_sanitized_clamps_them() {
        let input = ControlInput::new(-3.0, 1.5).sanitized();

        assert_eq!(input, Some(ControlInput::new(-1.0, 1.0)));
    }

    #[test]
    fn when_a_value_is_nan_then_sanitized_drops_the_sample() {
        assert!(ControlInput::new(f64::NAN, 0.0).sanitized().is_none());
        assert!(ControlInput::new(0.0, f64::INFINITY).sanitized().is_none());
    }
}
