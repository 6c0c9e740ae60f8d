//! # Vertex Data Structures
//!
//! GPU-compatible vertex and per-instance formats shared by every backend.

use cgmath::{Matrix, Matrix3, Matrix4, SquareMatrix};

/// A 3D vertex with position and normal data.
///
/// The `#[repr(C)]` layout is required for GPU buffer uploads.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    /// 3D position coordinates [x, y, z]
    pub position: [f32; 3],
    /// 3D normal vector [nx, ny, nz] for lighting calculations
    pub normal: [f32; 3],
}

impl Vertex3D {
    /// Returns the vertex buffer layout for wgpu rendering.
    ///
    /// - Attribute 0: Position (Float32x3) at shader location 0
    /// - Attribute 1: Normal (Float32x3) at shader location 1
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Per-instance world and normal matrices.
///
/// Every draw carries at least one instance; particle fields carry one per particle.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 3]; 3],
}

impl InstanceRaw {
    /// Packs a world matrix; the normal matrix is its inverse transpose
    pub fn from_matrix(world: &Matrix4<f32>) -> Self {
        let linear = Matrix3::from_cols(
            world.x.truncate(),
            world.y.truncate(),
            world.z.truncate(),
        );
        let normal = linear
            .invert()
            .map(|inv| inv.transpose())
            .unwrap_or(linear);
        Self {
            model: (*world).into(),
            normal: normal.into(),
        }
    }

    /// World-space translation of this instance
    pub fn translation(&self) -> [f32; 3] {
        [self.model[3][0], self.model[3][1], self.model[3][2]]
    }

    /// Instance buffer layout at shader locations 2..=8
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        const ATTRIBUTES: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
            2 => Float32x4,
            3 => Float32x4,
            4 => Float32x4,
            5 => Float32x4,
            6 => Float32x3,
            7 => Float32x3,
            8 => Float32x3,
        ];
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn test_instance_translation() {
        let raw = InstanceRaw::from_matrix(&Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0)));
        assert_eq!(raw.translation(), [1.0, 2.0, 3.0]);
        assert_eq!(raw.normal, [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
    }

    #[test]
    fn test_layout_sizes() {
        assert_eq!(std::mem::size_of::<Vertex3D>(), 24);
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 100);
    }
}
