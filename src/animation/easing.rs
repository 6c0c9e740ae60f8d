//! Easing curves
//!
//! Every curve maps progress in `[0, 1]` to `[0, 1]` (overshooting curves excepted)
//! with `apply(0) == 0` and `apply(1) == 1`. Input outside the unit range is clamped.

use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Easing {
    Linear,
    EaseInQuad,
    EaseOutQuad,
    #[default]
    EaseInOutQuad,
    EaseOutCubic,
    EaseInOutCubic,
    /// Overshoots slightly past the end before settling
    EaseOutBack,
    EaseInOutSine,
}

impl Easing {
    pub fn apply(self, progress: f32) -> f32 {
        let p = if progress.is_nan() {
            1.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        match self {
            Easing::Linear => p,
            Easing::EaseInQuad => p * p,
            Easing::EaseOutQuad => 1.0 - (1.0 - p) * (1.0 - p),
            Easing::EaseInOutQuad => {
                if p < 0.5 {
                    2.0 * p * p
                } else {
                    1.0 - (-2.0 * p + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseOutCubic => 1.0 - (1.0 - p).powi(3),
            Easing::EaseInOutCubic => {
                if p < 0.5 {
                    4.0 * p * p * p
                } else {
                    1.0 - (-2.0 * p + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseOutBack => {
                const C1: f32 = 1.70158;
                const C3: f32 = C1 + 1.0;
                1.0 + C3 * (p - 1.0).powi(3) + C1 * (p - 1.0).powi(2)
            }
            Easing::EaseInOutSine => -((PI * p).cos() - 1.0) / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 8] = [
        Easing::Linear,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseOutBack,
        Easing::EaseInOutSine,
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-5, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-5, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_clamps_input() {
        for easing in ALL {
            assert_eq!(easing.apply(-3.0), easing.apply(0.0));
            assert_eq!(easing.apply(7.0), easing.apply(1.0));
        }
    }

    #[test]
    fn test_in_out_midpoint() {
        assert!((Easing::EaseInOutQuad.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((Easing::EaseInOutCubic.apply(0.5) - 0.5).abs() < 1e-6);
    }
}
