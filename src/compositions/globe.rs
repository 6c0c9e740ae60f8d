//! Rotating globe with orbit rings, pulsing location markers and a drifting dust field.

use std::f32::consts::FRAC_PI_2;

use cgmath::{Point3, Vector3};

use super::{studio_lights, Composition};
use crate::animation::{
    motion::{Motion, Oscillation},
    particles::{FieldShape, ParticleFieldDesc},
};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::gfx::{
    camera::Camera,
    geometry::{build_ring, build_sphere, RingParams, SphereParams},
    material::Material,
    scene::{ObjectDesc, SceneBuilder},
    transform::Transform,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Globe {
    pub radius: f32,
    /// Marker positions as (latitude, longitude) in degrees
    pub markers: Vec<(f32, f32)>,
    pub dust_count: usize,
    pub seed: u64,
    pub spin_speed: f32,
    pub tint: [f32; 3],
    pub accent: [f32; 3],
}

impl Default for Globe {
    fn default() -> Self {
        Self {
            radius: 1.2,
            markers: vec![
                (40.7, -74.0),
                (51.5, -0.1),
                (35.7, 139.7),
                (-33.9, 151.2),
                (1.3, 103.8),
            ],
            dust_count: 300,
            seed: 7,
            spin_speed: 0.15,
            tint: [0.12, 0.2, 0.45],
            accent: [0.3, 0.9, 0.8],
        }
    }
}

/// Point on a sphere of `radius` for latitude/longitude in degrees
fn surface_point(radius: f32, latitude: f32, longitude: f32) -> Vector3<f32> {
    let (lat, lon) = (latitude.to_radians(), longitude.to_radians());
    Vector3::new(
        radius * lat.cos() * lon.sin(),
        radius * lat.sin(),
        radius * lat.cos() * lon.cos(),
    )
}

impl Composition for Globe {
    fn name(&self) -> &str {
        "globe"
    }

    fn blueprint(&self, _config: &EngineConfig) -> Result<SceneBuilder> {
        let camera = Camera::new(Point3::new(0.0, 0.6, 4.5), Point3::new(0.0, 0.0, 0.0));
        let mut builder = SceneBuilder::new(self.name()).with_camera(camera);
        for light in studio_lights(self.accent) {
            builder.add_light(light);
        }
        builder.dolly_camera_to(Camera::new(
            Point3::new(0.0, 0.2, 3.2),
            Point3::new(0.0, 0.0, 0.0),
        ));

        let root = builder.root();
        let planet = builder.add_object(
            root,
            ObjectDesc::group("planet")
                .with_transform(Transform::identity().with_rotation(Vector3::unit_z(), 0.41))
                .with_motion(Motion::spin(Vector3::unit_y(), self.spin_speed)),
        );
        builder.tilt_with_pointer(planet);

        let sphere = builder.add_geometry(
            "globe",
            build_sphere(&SphereParams::new(self.radius, 48, 32))?,
        );
        let surface = builder.add_material(
            Material::metal(self.tint, 0.45)
                .with_name("globe")
                .with_emissive_color(self.accent),
        );
        builder.add_object(
            planet,
            ObjectDesc::mesh("globe", sphere, surface).hoverable(),
        );

        // Markers: one geometry, one material each so their pulses stay independent
        let marker = builder.add_geometry(
            "marker",
            build_sphere(&SphereParams::new(self.radius * 0.035, 12, 8))?,
        );
        for (i, &(lat, lon)) in self.markers.iter().enumerate() {
            let material = builder.add_material(
                Material::emissive_accent(self.accent, 1.5).with_name(&format!("marker_{i}")),
            );
            let p = surface_point(self.radius * 1.01, lat, lon);
            builder.add_object(
                planet,
                ObjectDesc::mesh(&format!("marker_{i}"), marker, material)
                    .with_transform(Transform::from_position(p.x, p.y, p.z))
                    .with_emissive_pulse(Oscillation::new(1.5, 1.0, 3.0, i as f32 * 1.3))
                    .with_motion(Motion::Breathe {
                        amplitude: 0.25,
                        frequency: 3.0,
                        phase: i as f32 * 1.3,
                    })
                    .hoverable(),
            );
        }

        // Orbit rings, tilted and counter-rotating
        for (i, (tilt, speed)) in [(0.35f32, 0.3f32), (-0.6, -0.2)].into_iter().enumerate() {
            let ring = builder.add_geometry(
                &format!("orbit_{i}"),
                build_ring(&RingParams::new(
                    self.radius * (1.35 + 0.2 * i as f32),
                    0.008,
                    6,
                    128,
                ))?,
            );
            let material =
                builder.add_material(Material::glass(self.accent).with_name(&format!("orbit_{i}")));
            builder.add_object(
                root,
                ObjectDesc::mesh(&format!("orbit_{i}"), ring, material)
                    .with_transform(Transform::identity().with_rotation(Vector3::unit_x(), tilt))
                    .with_motion(Motion::spin(Vector3::unit_y(), speed)),
            );
        }

        // Satellite riding the outer orbit
        let satellite = builder.add_geometry(
            "satellite",
            build_sphere(&SphereParams::new(self.radius * 0.05, 12, 8))?,
        );
        let satellite_material =
            builder.add_material(Material::emissive_accent([1.0, 0.85, 0.5], 2.0).with_name("satellite"));
        builder.add_object(
            root,
            ObjectDesc::mesh("satellite", satellite, satellite_material)
                .with_transform(Transform::identity().with_rotation(Vector3::unit_x(), -0.6))
                .with_motion(Motion::Orbit {
                    radius: self.radius * 1.55,
                    angular_velocity: -0.5,
                    phase: FRAC_PI_2,
                }),
        );

        // Dust
        let dust = builder.add_geometry(
            "dust",
            build_sphere(&SphereParams::new(0.012, 6, 4))?,
        );
        let dust_material = builder.add_material(Material::emissive_accent([0.8, 0.9, 1.0], 1.0).with_name("dust"));
        builder.add_object(
            root,
            ObjectDesc::mesh("dust", dust, dust_material).with_particles(
                ParticleFieldDesc::new(self.dust_count, self.radius * 2.5)
                    .with_shape(FieldShape::Volume)
                    .with_drift(0.02, 0.08)
                    .with_wobble(0.05)
                    .with_particle_scale(0.5, 1.5)
                    .with_seed(self.seed),
            ),
        );

        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::RecordingBackend;
    use cgmath::InnerSpace;

    #[test]
    fn test_surface_point() {
        let p = surface_point(2.0, 90.0, 0.0);
        assert!((p - Vector3::new(0.0, 2.0, 0.0)).magnitude() < 1e-5);
        let q = surface_point(2.0, 0.0, 0.0);
        assert!((q - Vector3::new(0.0, 0.0, 2.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_globe_counts() {
        let globe = Globe::default();
        let mut backend = RecordingBackend::new(100, 100);
        let scene = globe
            .blueprint(&EngineConfig::default())
            .unwrap()
            .build(&mut backend)
            .unwrap();
        let stats = scene.statistics();
        assert_eq!(stats.particle_count, globe.dust_count);
        // Globe plus one per marker
        assert_eq!(scene.hit_candidates().len(), 1 + globe.markers.len());
    }
}
