//! Closed-form procedural motion.
//!
//! Each [`Motion`] maps elapsed time to a transform offset that is layered on top of
//! a node's base transform. Offsets never depend on previous frames:
//! `angle = base_angle + t * angular_velocity`, `offset = amplitude * sin(t * frequency + phase)`.

use cgmath::Vector3;

use crate::gfx::transform::{axis_angle, Transform};

/// `amplitude * sin(t * frequency + phase)`; frequency is in radians per second
pub fn oscillate(amplitude: f32, frequency: f32, phase: f32, t: f32) -> f32 {
    amplitude * (t * frequency + phase).sin()
}

/// A procedural motion component
#[derive(Debug, Clone, Copy)]
pub enum Motion {
    /// Constant-rate rotation about `axis`
    Spin {
        axis: Vector3<f32>,
        base_angle: f32,
        angular_velocity: f32,
    },
    /// Translation back and forth along `axis`
    Bob {
        axis: Vector3<f32>,
        amplitude: f32,
        frequency: f32,
        phase: f32,
    },
    /// Rotation back and forth about `axis` (amplitude in radians)
    Sway {
        axis: Vector3<f32>,
        amplitude: f32,
        frequency: f32,
        phase: f32,
    },
    /// Uniform scale `1 + amplitude * sin(...)`
    Breathe {
        amplitude: f32,
        frequency: f32,
        phase: f32,
    },
    /// Circular path in the XZ plane around the base position
    Orbit {
        radius: f32,
        angular_velocity: f32,
        phase: f32,
    },
    /// Any other closed-form function of time
    Custom(fn(f32) -> Transform),
}

impl Motion {
    pub fn spin(axis: Vector3<f32>, angular_velocity: f32) -> Self {
        Motion::Spin {
            axis,
            base_angle: 0.0,
            angular_velocity,
        }
    }

    pub fn bob(axis: Vector3<f32>, amplitude: f32, frequency: f32, phase: f32) -> Self {
        Motion::Bob {
            axis,
            amplitude,
            frequency,
            phase,
        }
    }

    pub fn sway(axis: Vector3<f32>, amplitude: f32, frequency: f32, phase: f32) -> Self {
        Motion::Sway {
            axis,
            amplitude,
            frequency,
            phase,
        }
    }

    /// Transform offset at elapsed time `t`
    pub fn sample(&self, t: f32) -> Transform {
        match *self {
            Motion::Spin {
                axis,
                base_angle,
                angular_velocity,
            } => Transform {
                rotation: axis_angle(axis, base_angle + t * angular_velocity),
                ..Transform::identity()
            },
            Motion::Bob {
                axis,
                amplitude,
                frequency,
                phase,
            } => Transform {
                position: axis * oscillate(amplitude, frequency, phase, t),
                ..Transform::identity()
            },
            Motion::Sway {
                axis,
                amplitude,
                frequency,
                phase,
            } => Transform {
                rotation: axis_angle(axis, oscillate(amplitude, frequency, phase, t)),
                ..Transform::identity()
            },
            Motion::Breathe {
                amplitude,
                frequency,
                phase,
            } => Transform::identity().with_scale(1.0 + oscillate(amplitude, frequency, phase, t)),
            Motion::Orbit {
                radius,
                angular_velocity,
                phase,
            } => {
                let angle = t * angular_velocity + phase;
                Transform::from_position(radius * angle.cos(), 0.0, radius * angle.sin())
            }
            Motion::Custom(f) => f(t),
        }
    }

    /// Rotation angle in radians for spin motions
    pub fn angle_at(&self, t: f32) -> Option<f32> {
        match *self {
            Motion::Spin {
                base_angle,
                angular_velocity,
                ..
            } => Some(base_angle + t * angular_velocity),
            Motion::Sway {
                amplitude,
                frequency,
                phase,
                ..
            } => Some(oscillate(amplitude, frequency, phase, t)),
            _ => None,
        }
    }
}

/// Layers every motion at time `t` onto `base`, in order
pub fn apply_motions(base: &Transform, motions: &[Motion], t: f32) -> Transform {
    motions
        .iter()
        .fold(*base, |acc, motion| acc.offset_by(&motion.sample(t)))
}

/// A scalar oscillating around a base value, used for emissive pulses and fades
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oscillation {
    pub base: f32,
    pub amplitude: f32,
    pub frequency: f32,
    pub phase: f32,
}

impl Oscillation {
    pub fn new(base: f32, amplitude: f32, frequency: f32, phase: f32) -> Self {
        Self {
            base,
            amplitude,
            frequency,
            phase,
        }
    }

    pub fn sample(&self, t: f32) -> f32 {
        self.base + oscillate(self.amplitude, self.frequency, self.phase, t)
    }
}
