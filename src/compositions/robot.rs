//! A small robot figure: torso, bobbing head with glowing eyes and an antenna, and
//! arms swinging out of phase.

use std::f32::consts::PI;

use cgmath::{Point3, Vector3};

use super::{studio_lights, Composition};
use crate::animation::motion::{Motion, Oscillation};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::gfx::{
    camera::Camera,
    geometry::{build_cylinder, build_rounded_tile, build_sphere, CylinderParams, SphereParams, TileParams},
    material::Material,
    scene::{ObjectDesc, SceneBuilder},
    transform::Transform,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Robot {
    pub body: [f32; 3],
    pub eye: [f32; 3],
    /// Arm swing amplitude in radians
    pub arm_swing: f32,
}

impl Default for Robot {
    fn default() -> Self {
        Self {
            body: [0.82, 0.85, 0.9],
            eye: [0.2, 0.8, 1.0],
            arm_swing: 0.35,
        }
    }
}

impl Composition for Robot {
    fn name(&self) -> &str {
        "robot"
    }

    fn blueprint(&self, _config: &EngineConfig) -> Result<SceneBuilder> {
        let camera = Camera::new(Point3::new(0.0, 0.4, 5.0), Point3::new(0.0, 0.2, 0.0)).with_fov(38.0);
        let mut builder = SceneBuilder::new(self.name()).with_camera(camera);
        for light in studio_lights(self.eye) {
            builder.add_light(light);
        }

        let root = builder.root();
        let figure = builder.add_object(
            root,
            ObjectDesc::group("figure").with_motion(Motion::Breathe {
                amplitude: 0.015,
                frequency: 1.8,
                phase: 0.0,
            }),
        );
        builder.tilt_with_pointer(figure);

        // Torso
        let torso = builder.add_geometry(
            "torso",
            build_rounded_tile(&TileParams::new(1.1, 1.2, 0.7).with_corners(0.22, 6).with_bevel(0.05))?,
        );
        let shell = builder.add_material(Material::metal(self.body, 0.35).with_name("torso"));
        builder.add_object(
            figure,
            ObjectDesc::mesh("torso", torso, shell)
                .with_transform(Transform::from_position(0.0, -0.4, 0.0))
                .hoverable(),
        );

        // Head bobs on its own pivot so the eyes and antenna follow it
        let head_pivot = builder.add_object(
            figure,
            ObjectDesc::group("head_pivot")
                .with_transform(Transform::from_position(0.0, 0.65, 0.0))
                .with_motion(Motion::bob(Vector3::unit_y(), 0.05, 2.0, 0.0))
                .with_motion(Motion::sway(Vector3::unit_z(), 0.06, 1.0, 0.0)),
        );
        let head = builder.add_geometry(
            "head",
            build_rounded_tile(&TileParams::new(0.9, 0.65, 0.6).with_corners(0.2, 6).with_bevel(0.04))?,
        );
        let head_shell = builder.add_material(Material::metal(self.body, 0.3).with_name("head"));
        builder.add_object(head_pivot, ObjectDesc::mesh("head", head, head_shell).hoverable());

        let eye = builder.add_geometry("eye", build_sphere(&SphereParams::new(0.08, 16, 12))?);
        for (side, x) in [("left", -0.2f32), ("right", 0.2)] {
            let glow = builder.add_material(
                Material::emissive_accent(self.eye, 2.0).with_name(&format!("eye_{side}")),
            );
            builder.add_object(
                head_pivot,
                ObjectDesc::mesh(&format!("eye_{side}"), eye, glow)
                    .with_transform(Transform::from_position(x, 0.05, 0.31))
                    .with_emissive_pulse(Oscillation::new(2.0, 0.6, 2.5, 0.0)),
            );
        }

        let antenna = builder.add_geometry(
            "antenna",
            build_cylinder(&CylinderParams::new(0.02, 0.3, 8).with_top_radius(0.012))?,
        );
        let antenna_material = builder.add_material(Material::metal([0.5, 0.5, 0.55], 0.4).with_name("antenna"));
        builder.add_object(
            head_pivot,
            ObjectDesc::mesh("antenna", antenna, antenna_material)
                .with_transform(Transform::from_position(0.0, 0.47, 0.0)),
        );
        let tip = builder.add_geometry("antenna_tip", build_sphere(&SphereParams::new(0.05, 12, 8))?);
        let tip_glow = builder.add_material(Material::emissive_accent([1.0, 0.4, 0.3], 1.5).with_name("antenna_tip"));
        builder.add_object(
            head_pivot,
            ObjectDesc::mesh("antenna_tip", tip, tip_glow)
                .with_transform(Transform::from_position(0.0, 0.65, 0.0))
                .with_emissive_pulse(Oscillation::new(1.2, 1.0, 4.0, 0.0)),
        );

        // Arms hang from shoulder pivots and swing in opposite phase
        let arm = builder.add_geometry("arm", build_cylinder(&CylinderParams::new(0.09, 0.8, 12))?);
        for (side, x, phase) in [("left", -0.7f32, 0.0f32), ("right", 0.7, PI)] {
            let shoulder = builder.add_object(
                figure,
                ObjectDesc::group(&format!("shoulder_{side}"))
                    .with_transform(Transform::from_position(x, -0.05, 0.0))
                    .with_motion(Motion::sway(Vector3::unit_x(), self.arm_swing, 1.6, phase)),
            );
            let material = builder.add_material(Material::metal(self.body, 0.4).with_name(&format!("arm_{side}")));
            builder.add_object(
                shoulder,
                ObjectDesc::mesh(&format!("arm_{side}"), arm, material)
                    .with_transform(Transform::from_position(0.0, -0.4, 0.0)),
            );
        }

        Ok(builder)
    }
}
