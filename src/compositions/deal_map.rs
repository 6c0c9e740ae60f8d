//! Deal map: a tilted grid of rounded tiles pulsing in a diagonal wave, framed and
//! marked with a few highlighted deals.

use cgmath::{Point3, Vector3};

use super::{studio_lights, Composition};
use crate::animation::motion::{Motion, Oscillation};
use crate::config::EngineConfig;
use crate::error::{Result, SceneError};
use crate::gfx::{
    camera::Camera,
    geometry::{build_cylinder, build_frame, build_rounded_tile, CylinderParams, FrameParams, TileParams},
    material::Material,
    scene::{ObjectDesc, SceneBuilder},
    transform::Transform,
};

#[derive(Debug, Clone, PartialEq)]
pub struct DealMap {
    pub rows: u32,
    pub columns: u32,
    pub tile_size: f32,
    pub spacing: f32,
    /// Phase step of the pulse wave per row and column
    pub wave_step: f32,
    /// Tiles (row, column) carrying a deal pin
    pub deals: Vec<(u32, u32)>,
    pub tint: [f32; 3],
    pub accent: [f32; 3],
}

impl Default for DealMap {
    fn default() -> Self {
        Self {
            rows: 5,
            columns: 7,
            tile_size: 0.42,
            spacing: 0.08,
            wave_step: 0.45,
            deals: vec![(1, 2), (3, 5), (2, 0)],
            tint: [0.16, 0.2, 0.3],
            accent: [0.45, 0.4, 1.0],
        }
    }
}

impl DealMap {
    /// Builder pattern: Set the grid size
    pub fn with_grid(mut self, rows: u32, columns: u32) -> Self {
        self.rows = rows;
        self.columns = columns;
        self
    }

    fn tile_position(&self, row: u32, column: u32) -> (f32, f32) {
        let pitch = self.tile_size + self.spacing;
        let x = (column as f32 - (self.columns as f32 - 1.0) * 0.5) * pitch;
        let z = (row as f32 - (self.rows as f32 - 1.0) * 0.5) * pitch;
        (x, z)
    }
}

impl Composition for DealMap {
    fn name(&self) -> &str {
        "deal_map"
    }

    fn blueprint(&self, _config: &EngineConfig) -> Result<SceneBuilder> {
        if self.rows == 0 || self.columns == 0 {
            return Err(SceneError::InvalidGeometry(format!(
                "deal map grid {}x{} is empty",
                self.rows, self.columns
            )));
        }

        let camera = Camera::new(Point3::new(0.0, 3.2, 3.6), Point3::new(0.0, 0.0, 0.0)).with_fov(42.0);
        let mut builder = SceneBuilder::new(self.name()).with_camera(camera);
        for light in studio_lights(self.accent) {
            builder.add_light(light);
        }
        builder.dolly_camera_to(
            Camera::new(Point3::new(0.0, 4.5, 1.2), Point3::new(0.0, 0.0, 0.0)).with_fov(42.0),
        );

        let root = builder.root();
        let board = builder.add_object(
            root,
            ObjectDesc::group("board").with_motion(Motion::sway(Vector3::unit_y(), 0.08, 0.3, 0.0)),
        );
        builder.tilt_with_pointer(board);

        // Tiles lie flat: the extruded slab faces +Z, so rotate it onto the XZ plane
        let tile = builder.add_geometry(
            "tile",
            build_rounded_tile(
                &TileParams::new(self.tile_size, self.tile_size, 0.06)
                    .with_corners(self.tile_size * 0.18, 4)
                    .with_bevel(0.01),
            )?,
        );
        let flat = Transform::identity().with_rotation(Vector3::unit_x(), -std::f32::consts::FRAC_PI_2);

        for row in 0..self.rows {
            for column in 0..self.columns {
                let (x, z) = self.tile_position(row, column);
                let material = builder.add_material(
                    Material::emissive_accent(self.accent, 0.3)
                        .with_base_color(self.tint)
                        .with_name(&format!("tile_{row}_{column}")),
                );
                let phase = (row + column) as f32 * self.wave_step;
                builder.add_object(
                    board,
                    ObjectDesc::mesh(&format!("tile_{row}_{column}"), tile, material)
                        .with_transform(Transform { position: Vector3::new(x, 0.0, z), ..flat })
                        .with_emissive_pulse(Oscillation::new(0.35, 0.3, 1.4, -phase))
                        .hoverable(),
                );
            }
        }

        // Frame around the grid
        let pitch = self.tile_size + self.spacing;
        let width = self.columns as f32 * pitch + self.spacing * 2.0;
        let depth = self.rows as f32 * pitch + self.spacing * 2.0;
        let frame = builder.add_geometry(
            "frame",
            build_frame(&FrameParams::new(width, depth, self.spacing * 1.5, 0.08).with_corners(0.1, 4))?,
        );
        let frame_material = builder.add_material(Material::glass([0.7, 0.75, 1.0]).with_name("frame"));
        builder.add_object(
            board,
            ObjectDesc::mesh("frame", frame, frame_material).with_transform(flat),
        );

        // Deal pins hover above their tiles
        let pin = builder.add_geometry(
            "pin",
            build_cylinder(&CylinderParams::new(0.05, 0.25, 12).with_top_radius(0.0))?,
        );
        for (i, &(row, column)) in self.deals.iter().enumerate() {
            if row >= self.rows || column >= self.columns {
                log::warn!("deal ({row}, {column}) is outside the {}x{} grid", self.rows, self.columns);
                continue;
            }
            let (x, z) = self.tile_position(row, column);
            let glow = builder.add_material(
                Material::emissive_accent([1.0, 0.75, 0.3], 1.8).with_name(&format!("deal_{i}")),
            );
            builder.add_object(
                board,
                ObjectDesc::mesh(&format!("deal_{i}"), pin, glow)
                    .with_transform(
                        Transform::from_position(x, 0.3, z)
                            .with_rotation(Vector3::unit_x(), std::f32::consts::PI),
                    )
                    .with_motion(Motion::bob(Vector3::unit_y(), 0.05, 2.2, i as f32))
                    .with_motion(Motion::spin(Vector3::unit_y(), 1.2)),
            );
        }

        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::driver::AnimationDriver;
    use crate::gfx::backend::RecordingBackend;

    #[test]
    fn test_grid_tiles_have_own_materials() {
        let map = DealMap::default().with_grid(3, 4);
        let mut backend = RecordingBackend::new(100, 100);
        let scene = map
            .blueprint(&EngineConfig::default())
            .unwrap()
            .build(&mut backend)
            .unwrap();
        assert_eq!(scene.hit_candidates().len(), 12);
    }

    #[test]
    fn test_pulses_are_phase_shifted() {
        let mut backend = RecordingBackend::new(100, 100);
        let mut scene = DealMap::default()
            .blueprint(&EngineConfig::default())
            .unwrap()
            .build(&mut backend)
            .unwrap();
        let mut driver = AnimationDriver::new(EngineConfig::default());
        driver.start();
        driver.frame(&mut scene, &mut backend, 0.05).unwrap();

        let intensity = |name: &str| {
            let node = scene.node(scene.find(name).unwrap()).unwrap();
            scene.material(node.material.unwrap()).unwrap().emissive_intensity
        };
        assert!((intensity("tile_0_0") - intensity("tile_0_1")).abs() > 1e-3);
    }

    #[test]
    fn test_empty_grid_rejected() {
        let result = DealMap::default().with_grid(0, 3).blueprint(&EngineConfig::default());
        assert!(matches!(result, Err(SceneError::InvalidGeometry(_))));
    }
}
