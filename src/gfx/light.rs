//! Light descriptors
//!
//! Lights are plain values fixed at build time. They are packed into the global
//! uniform each frame together with the camera.

use super::camera::CameraUniform;

/// Maximum number of directional and point lights the shader evaluates
pub const MAX_LIGHTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Uniform illumination from every direction
    Ambient { color: [f32; 3], intensity: f32 },
    /// Sun-like light; `direction` points from the light into the scene
    Directional {
        direction: [f32; 3],
        color: [f32; 3],
        intensity: f32,
    },
    /// Omnidirectional light; `range` of 0 means no falloff cutoff
    Point {
        position: [f32; 3],
        color: [f32; 3],
        intensity: f32,
        range: f32,
    },
}

impl Light {
    pub fn ambient(color: [f32; 3], intensity: f32) -> Self {
        Light::Ambient { color, intensity }
    }

    pub fn directional(direction: [f32; 3], color: [f32; 3], intensity: f32) -> Self {
        Light::Directional {
            direction,
            color,
            intensity,
        }
    }

    pub fn point(position: [f32; 3], color: [f32; 3], intensity: f32, range: f32) -> Self {
        Light::Point {
            position,
            color,
            intensity,
            range: range.max(0.0),
        }
    }
}

/// GPU layout of one non-ambient light. Must match `Light` in the shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightRaw {
    /// xyz: direction (w = 0) or position (w = 1)
    pub vector: [f32; 4],
    /// rgb color, w intensity
    pub color: [f32; 4],
    /// x: range
    pub params: [f32; 4],
}

/// Per-frame global uniform: camera plus lights. Must match `Globals` in the shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    pub camera: CameraUniform,
    /// rgb ambient color premultiplied by intensity
    pub ambient: [f32; 4],
    pub lights: [LightRaw; MAX_LIGHTS],
    /// x: number of active entries in `lights`
    pub light_count: [u32; 4],
}

impl GlobalsUniform {
    /// Packs the camera and lights; lights beyond [`MAX_LIGHTS`] are dropped
    pub fn new(camera: CameraUniform, lights: &[Light]) -> Self {
        let mut ambient = [0.0f32; 4];
        let mut packed = [LightRaw::default(); MAX_LIGHTS];
        let mut count = 0usize;

        for light in lights {
            match *light {
                Light::Ambient { color, intensity } => {
                    for c in 0..3 {
                        ambient[c] += color[c] * intensity;
                    }
                }
                Light::Directional {
                    direction,
                    color,
                    intensity,
                } if count < MAX_LIGHTS => {
                    packed[count] = LightRaw {
                        vector: [direction[0], direction[1], direction[2], 0.0],
                        color: [color[0], color[1], color[2], intensity],
                        params: [0.0; 4],
                    };
                    count += 1;
                }
                Light::Point {
                    position,
                    color,
                    intensity,
                    range,
                } if count < MAX_LIGHTS => {
                    packed[count] = LightRaw {
                        vector: [position[0], position[1], position[2], 1.0],
                        color: [color[0], color[1], color[2], intensity],
                        params: [range, 0.0, 0.0, 0.0],
                    };
                    count += 1;
                }
                _ => {}
            }
        }
        ambient[3] = 1.0;

        Self {
            camera,
            ambient,
            lights: packed,
            light_count: [count as u32, 0, 0, 0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packing() {
        let lights = [
            Light::ambient([1.0, 1.0, 1.0], 0.2),
            Light::ambient([1.0, 0.0, 0.0], 0.1),
            Light::directional([0.0, -1.0, 0.0], [1.0; 3], 1.0),
            Light::point([0.0, 2.0, 0.0], [0.5; 3], 3.0, 10.0),
        ];
        let globals = GlobalsUniform::new(CameraUniform::default(), &lights);
        assert_eq!(globals.light_count[0], 2);
        assert!((globals.ambient[0] - 0.3).abs() < 1e-6);
        assert_eq!(globals.lights[1].vector[3], 1.0);
        assert_eq!(globals.lights[1].params[0], 10.0);
    }

    #[test]
    fn test_excess_lights_dropped() {
        let lights = vec![Light::point([0.0; 3], [1.0; 3], 1.0, 0.0); MAX_LIGHTS + 3];
        let globals = GlobalsUniform::new(CameraUniform::default(), &lights);
        assert_eq!(globals.light_count[0], MAX_LIGHTS as u32);
    }

    #[test]
    fn test_uniform_size_is_aligned() {
        assert_eq!(std::mem::size_of::<GlobalsUniform>() % 16, 0);
    }
}
