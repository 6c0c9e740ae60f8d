//! Procedural particle fields.
//!
//! A field is generated once from a seed; afterwards every particle position is a
//! closed-form function of elapsed time (a vertical drift that wraps inside the
//! field plus a small wobble), so the field can be sampled at any `t` without
//! stepping through intermediate frames.

use cgmath::{Matrix4, Vector3};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::gfx::transform::Transform;

/// Where particles are scattered at generation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// Uniformly inside a sphere
    Volume,
    /// Close to the surface of a sphere
    Shell,
}

/// Generation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleFieldDesc {
    pub count: usize,
    pub radius: f32,
    pub shape: FieldShape,
    /// Vertical drift speed range in units per second
    pub drift_speed: (f32, f32),
    /// Wobble amplitude
    pub wobble: f32,
    /// Per-particle uniform scale range
    pub particle_scale: (f32, f32),
    pub seed: u64,
}

impl ParticleFieldDesc {
    pub fn new(count: usize, radius: f32) -> Self {
        Self {
            count,
            radius,
            shape: FieldShape::Volume,
            drift_speed: (0.02, 0.08),
            wobble: 0.05,
            particle_scale: (0.01, 0.03),
            seed: 7,
        }
    }

    /// Builder pattern: Set the scatter shape
    pub fn with_shape(mut self, shape: FieldShape) -> Self {
        self.shape = shape;
        self
    }

    /// Builder pattern: Set the drift speed range
    pub fn with_drift(mut self, min: f32, max: f32) -> Self {
        self.drift_speed = (min.min(max), max.max(min));
        self
    }

    /// Builder pattern: Set the particle scale range
    pub fn with_particle_scale(mut self, min: f32, max: f32) -> Self {
        self.particle_scale = (min.min(max), max.max(min));
        self
    }

    /// Builder pattern: Set the wobble amplitude
    pub fn with_wobble(mut self, wobble: f32) -> Self {
        self.wobble = wobble.max(0.0);
        self
    }

    /// Builder pattern: Set the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Particle {
    origin: Vector3<f32>,
    drift: f32,
    frequency: f32,
    phase: f32,
    scale: f32,
}

/// A reproducible set of drifting particles
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleField {
    particles: Vec<Particle>,
    radius: f32,
    wobble: f32,
}

/// Draws from `range`, tolerating an empty range
fn sample(rng: &mut StdRng, (min, max): (f32, f32)) -> f32 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

impl ParticleField {
    pub fn generate(desc: &ParticleFieldDesc) -> Self {
        let mut rng = StdRng::seed_from_u64(desc.seed);
        let radius = if desc.radius.is_finite() {
            desc.radius.abs()
        } else {
            1.0
        };

        let particles = (0..desc.count)
            .map(|_| {
                // Uniform direction
                let z: f32 = rng.random_range(-1.0..1.0);
                let theta: f32 = rng.random_range(0.0..TAU);
                let planar = (1.0 - z * z).max(0.0).sqrt();
                let direction = Vector3::new(planar * theta.cos(), z, planar * theta.sin());

                let distance = match desc.shape {
                    FieldShape::Volume => radius * rng.random::<f32>().cbrt(),
                    FieldShape::Shell => radius * rng.random_range(0.92..1.0),
                };

                Particle {
                    origin: direction * distance,
                    drift: sample(&mut rng, desc.drift_speed),
                    frequency: rng.random_range(0.5..1.5),
                    phase: rng.random_range(0.0..TAU),
                    scale: sample(&mut rng, desc.particle_scale),
                }
            })
            .collect();

        Self {
            particles,
            radius,
            wobble: desc.wobble,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Local position of particle `index` at time `t`
    pub fn position(&self, index: usize, t: f32) -> Option<Vector3<f32>> {
        let p = self.particles.get(index)?;
        let span = 2.0 * self.radius;

        // Drift upward and wrap back to the bottom of the field
        let y = if span > 0.0 {
            (p.origin.y + p.drift * t + self.radius).rem_euclid(span) - self.radius
        } else {
            p.origin.y
        };
        let angle = t * p.frequency + p.phase;

        Some(Vector3::new(
            p.origin.x + self.wobble * angle.sin(),
            y,
            p.origin.z + self.wobble * (angle * 0.7).cos(),
        ))
    }

    /// Local transforms of every particle at time `t`
    pub fn transforms(&self, t: f32) -> Vec<Transform> {
        (0..self.particles.len())
            .filter_map(|i| {
                let position = self.position(i, t)?;
                Some(Transform {
                    position,
                    ..Transform::identity().with_scale(self.particles[i].scale)
                })
            })
            .collect()
    }

    /// World matrices for instanced drawing under `parent`
    pub fn world_matrices(&self, parent: &Matrix4<f32>, t: f32) -> Vec<Matrix4<f32>> {
        self.transforms(t)
            .iter()
            .map(|local| parent * local.to_matrix())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    #[test]
    fn test_seed_reproducible() {
        let desc = ParticleFieldDesc::new(64, 2.0).with_seed(42);
        assert_eq!(ParticleField::generate(&desc), ParticleField::generate(&desc));
        let other = ParticleField::generate(&desc.with_seed(43));
        assert_ne!(ParticleField::generate(&desc), other);
    }

    #[test]
    fn test_positions_stay_in_field() {
        let desc = ParticleFieldDesc::new(128, 1.5).with_wobble(0.1);
        let field = ParticleField::generate(&desc);
        for t in [0.0, 1.0, 17.3, 1000.0] {
            for i in 0..field.len() {
                let p = field.position(i, t).unwrap();
                assert!(p.y.abs() <= 1.5 + 1e-3);
                let planar = Vector3::new(p.x, 0.0, p.z).magnitude();
                assert!(planar <= 1.5 + 0.2);
            }
        }
    }

    #[test]
    fn test_position_is_function_of_time() {
        let field = ParticleField::generate(&ParticleFieldDesc::new(8, 1.0));
        let direct = field.position(3, 12.5).unwrap();
        // Sampling other times first changes nothing
        for t in [0.1, 5.0, 9.0] {
            field.position(3, t);
        }
        assert_eq!(field.position(3, 12.5).unwrap(), direct);
        assert!(field.position(8, 0.0).is_none());
    }

    #[test]
    fn test_shell_distance() {
        let desc = ParticleFieldDesc::new(32, 1.0)
            .with_shape(FieldShape::Shell)
            .with_wobble(0.0)
            .with_drift(0.0, 0.0);
        let field = ParticleField::generate(&desc);
        for i in 0..field.len() {
            let d = field.position(i, 0.0).unwrap().magnitude();
            assert!(d >= 0.9 && d <= 1.0 + 1e-5);
        }
    }
}
