//! Hero emblem: a word of extruded letterforms inside a glass frame, circled by a
//! slowly spinning ring.

use cgmath::{Point3, Vector3};

use super::{studio_lights, Composition};
use crate::animation::motion::{Motion, Oscillation};
use crate::config::EngineConfig;
use crate::error::{Result, SceneError};
use crate::gfx::{
    camera::Camera,
    geometry::{
        build_frame, build_letterform, build_ring, FrameParams, Letter, LetterParams, RingParams,
    },
    material::Material,
    scene::{ObjectDesc, SceneBuilder},
    transform::Transform,
};

#[derive(Debug, Clone, PartialEq)]
pub struct HeroEmblem {
    /// Letters to spell; only letters with a letterform are accepted
    pub word: String,
    pub letter_size: f32,
    pub stroke: f32,
    pub depth: f32,
    pub accent: [f32; 3],
    pub glass_tint: [f32; 3],
}

impl Default for HeroEmblem {
    fn default() -> Self {
        Self {
            word: "CIO".to_string(),
            letter_size: 1.0,
            stroke: 0.22,
            depth: 0.25,
            accent: [0.35, 0.55, 1.0],
            glass_tint: [0.85, 0.9, 1.0],
        }
    }
}

impl HeroEmblem {
    /// Builder pattern: Set the word
    pub fn with_word(mut self, word: &str) -> Self {
        self.word = word.to_string();
        self
    }

    /// Builder pattern: Set the accent color
    pub fn with_accent(mut self, accent: [f32; 3]) -> Self {
        self.accent = accent;
        self
    }
}

impl Composition for HeroEmblem {
    fn name(&self) -> &str {
        "hero_emblem"
    }

    fn blueprint(&self, _config: &EngineConfig) -> Result<SceneBuilder> {
        let letters = self
            .word
            .chars()
            .map(|c| {
                Letter::from_char(c).ok_or_else(|| {
                    SceneError::InvalidGeometry(format!("no letterform for '{c}'"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if letters.is_empty() {
            return Err(SceneError::InvalidGeometry("hero emblem needs a word".into()));
        }

        let camera = Camera::new(Point3::new(0.0, 0.3, 5.5), Point3::new(0.0, 0.0, 0.0)).with_fov(40.0);
        let mut builder = SceneBuilder::new(self.name()).with_camera(camera);
        for light in studio_lights(self.accent) {
            builder.add_light(light);
        }
        builder.dolly_camera_to(
            Camera::new(Point3::new(0.0, -0.4, 8.0), Point3::new(0.0, 0.4, 0.0)).with_fov(40.0),
        );

        let root = builder.root();
        let emblem = builder.add_object(
            root,
            ObjectDesc::group("emblem").with_motion(Motion::bob(Vector3::unit_y(), 0.06, 1.2, 0.0)),
        );
        builder.tilt_with_pointer(emblem);

        // Letters, laid out left to right and centered
        let params = LetterParams::new(self.letter_size, self.stroke, self.depth)
            .with_bevel(self.depth * 0.15)
            .with_segments(40);
        let gap = self.letter_size * 0.25;
        let total: f32 = letters.iter().map(|l| params.width(*l)).sum::<f32>()
            + gap * (letters.len() - 1) as f32;

        let mut cursor = -total * 0.5;
        for (i, letter) in letters.iter().enumerate() {
            let width = params.width(*letter);
            let geometry = builder.add_geometry(
                &format!("letter_{i}"),
                build_letterform(*letter, &params)?,
            );
            let material = builder.add_material(
                Material::emissive_accent(self.accent, 0.6)
                    .with_name(&format!("letter_{i}"))
                    .with_metalness(0.3),
            );
            builder.add_object(
                emblem,
                ObjectDesc::mesh(&format!("letter_{i}"), geometry, material)
                    .with_transform(Transform::from_position(cursor + width * 0.5, 0.0, 0.0))
                    .with_emissive_pulse(Oscillation::new(0.6, 0.15, 1.6, i as f32 * 0.8))
                    .hoverable(),
            );
            cursor += width + gap;
        }

        // Glass frame around the word
        let frame_width = total + self.letter_size * 0.8;
        let frame_height = self.letter_size * 1.6;
        let frame = builder.add_geometry(
            "frame",
            build_frame(
                &FrameParams::new(frame_width, frame_height, self.stroke * 0.6, self.depth * 0.6)
                    .with_corners(self.letter_size * 0.3, 6)
                    .with_bevel(self.depth * 0.1),
            )?,
        );
        let glass = builder.add_material(Material::glass(self.glass_tint));
        builder.fade_on_scroll(glass, 0.55, 0.15);
        builder.add_object(
            emblem,
            ObjectDesc::mesh("frame", frame, glass)
                .with_transform(Transform::from_position(0.0, 0.0, -self.depth)),
        );

        // Ring circling the emblem
        let ring = builder.add_geometry(
            "ring",
            build_ring(&RingParams::new(frame_width * 0.62, 0.025, 12, 96))?,
        );
        let ring_material = builder.add_material(
            Material::emissive_accent(self.accent, 1.4).with_name("ring"),
        );
        builder.add_object(
            root,
            ObjectDesc::mesh("ring", ring, ring_material)
                .with_transform(
                    Transform::identity().with_rotation(Vector3::new(1.0, 0.0, 0.2), 1.25),
                )
                .with_motion(Motion::spin(Vector3::unit_y(), 0.4)),
        );

        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::RecordingBackend;

    #[test]
    fn test_letters_hoverable() {
        let mut backend = RecordingBackend::new(100, 100);
        let scene = HeroEmblem::default()
            .blueprint(&EngineConfig::default())
            .unwrap()
            .build(&mut backend)
            .unwrap();
        assert_eq!(scene.hit_candidates().len(), 3);
        assert!(scene.tilt_node().is_some());
        assert!(scene.find("letter_2").is_some());
    }

    #[test]
    fn test_unknown_letter_rejected() {
        let result = HeroEmblem::default()
            .with_word("CRM")
            .blueprint(&EngineConfig::default());
        assert!(matches!(result, Err(SceneError::InvalidGeometry(_))));
    }
}
