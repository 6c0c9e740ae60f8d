//! Material factory
//!
//! Materials are shading descriptors mutated every frame by the animation driver
//! (emissive intensity for hover and pulse effects, opacity for scroll fades).
//! [`Material`] is not `Clone`: every call to the factory returns a
//! fresh instance, and the scene builder rejects a material referenced by more than
//! one independently animated object.

/// GPU uniform data for materials. Must match `MaterialUniform` in the shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    /// RGB base color, alpha is opacity
    pub base_color: [f32; 4],
    /// RGB emissive color, w is emissive intensity
    pub emissive: [f32; 4],
    /// roughness, metalness, transmission, unused
    pub params: [f32; 4],
}

/// Shading parameters for one object
#[derive(Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 3],
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    pub roughness: f32,
    pub metalness: f32,
    /// Glass-like see-through amount (0.0 = opaque surface, 1.0 = clear glass)
    pub transmission: f32,
    pub opacity: f32,
    baseline_emissive: f32,
}

/// Creates a new, independently owned material.
///
/// `tint` is used for both the base and the emissive color. Roughness and transmission
/// are clamped to `[0, 1]`; a negative emissive intensity is treated as zero.
pub fn create_material(
    tint: [f32; 3],
    emissive_intensity: f32,
    roughness: f32,
    transmission: f32,
) -> Material {
    let emissive_intensity = sanitize(emissive_intensity, 0.0).max(0.0);
    Material {
        name: "material".to_string(),
        base_color: tint,
        emissive: tint,
        emissive_intensity,
        roughness: sanitize(roughness, 0.5).clamp(0.0, 1.0),
        metalness: 0.0,
        transmission: sanitize(transmission, 0.0).clamp(0.0, 1.0),
        opacity: 1.0,
        baseline_emissive: emissive_intensity,
    }
}

fn sanitize(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

impl Material {
    /// Transmissive glass with a faint self-illumination
    pub fn glass(tint: [f32; 3]) -> Self {
        create_material(tint, 0.15, 0.05, 0.9)
            .with_name("glass")
            .with_opacity(0.55)
    }

    /// Bright emissive accent for highlights, eyes and markers
    pub fn emissive_accent(tint: [f32; 3], intensity: f32) -> Self {
        create_material(tint, intensity, 0.4, 0.0)
            .with_name("accent")
            .with_base_color([tint[0] * 0.2, tint[1] * 0.2, tint[2] * 0.2])
    }

    /// Diffuse surface with no emission
    pub fn matte(tint: [f32; 3], roughness: f32) -> Self {
        create_material(tint, 0.0, roughness, 0.0).with_name("matte")
    }

    /// Polished metal
    pub fn metal(tint: [f32; 3], roughness: f32) -> Self {
        create_material(tint, 0.0, roughness, 0.0)
            .with_name("metal")
            .with_metalness(1.0)
    }

    /// Builder pattern: Set the name used in logs and errors
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Builder pattern: Override the base color
    pub fn with_base_color(mut self, color: [f32; 3]) -> Self {
        self.base_color = color;
        self
    }

    /// Builder pattern: Override the emissive color
    pub fn with_emissive_color(mut self, color: [f32; 3]) -> Self {
        self.emissive = color;
        self
    }

    /// Builder pattern: Set metalness (clamped to [0, 1])
    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = sanitize(metalness, 0.0).clamp(0.0, 1.0);
        self
    }

    /// Builder pattern: Set opacity (clamped to [0, 1])
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = sanitize(opacity, 1.0).clamp(0.0, 1.0);
        self
    }

    /// Emissive intensity the material was created with, before any animation
    pub fn baseline_emissive(&self) -> f32 {
        self.baseline_emissive
    }

    pub fn set_emissive_intensity(&mut self, intensity: f32) {
        self.emissive_intensity = sanitize(intensity, self.baseline_emissive).max(0.0);
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = sanitize(opacity, self.opacity).clamp(0.0, 1.0);
    }

    /// Needs alpha blending and back-to-front ordering
    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0 || self.transmission > 0.0
    }

    pub fn to_uniform(&self) -> MaterialUniform {
        let [r, g, b] = self.base_color;
        let [er, eg, eb] = self.emissive;
        MaterialUniform {
            base_color: [r, g, b, self.opacity],
            emissive: [er, eg, eb, self.emissive_intensity],
            params: [self.roughness, self.metalness, self.transmission, 0.0],
        }
    }
}
