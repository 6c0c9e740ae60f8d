//! Per-scene animation clock.

/// Monotonic elapsed-time source.
///
/// Time is accumulated in `f64` so long-running scenes do not lose precision; the
/// value handed to motion formulas is `f32`. Only [`reset`](AnimationClock::reset)
/// moves it back to zero, which happens when a scene is (re)created.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationClock {
    elapsed: f64,
    ticks: u64,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances by `dt` seconds and returns the new elapsed time.
    ///
    /// Non-finite, zero or negative deltas are ignored so the clock never goes backward.
    pub fn advance(&mut self, dt: f64) -> f32 {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
            self.ticks += 1;
        } else if dt != 0.0 {
            log::debug!("ignoring clock delta {dt}");
        }
        self.seconds()
    }

    /// Elapsed seconds
    pub fn seconds(&self) -> f32 {
        self.elapsed as f32
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Number of accepted advances since the last reset
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic() {
        let mut clock = AnimationClock::new();
        clock.advance(0.5);
        clock.advance(-1.0);
        clock.advance(f64::NAN);
        clock.advance(f64::INFINITY);
        assert_eq!(clock.elapsed(), 0.5);
        assert_eq!(clock.ticks(), 1);
    }

    #[test]
    fn test_reset() {
        let mut clock = AnimationClock::new();
        clock.advance(2.0);
        clock.reset();
        assert_eq!(clock.seconds(), 0.0);
        assert_eq!(clock.ticks(), 0);
    }
}
