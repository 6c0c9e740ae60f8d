//! # Procedural Geometry Generation
//!
//! Pure builders for every shape the compositions use, so no model files are loaded.
//! Each call returns a new, independent [`GeometryData`]; nothing is memoized.
//!
//! ## Supported Shapes
//!
//! - **Sphere**: UV sphere with configurable resolution
//! - **Cylinder**: capped cylinder or cone frustum along Y
//! - **Ring**: torus lying in the XZ plane
//! - **Rounded tile**: extruded rounded rectangle with an optional bevel
//! - **Frame**: rounded rectangular outline with a stroke thickness
//! - **Letterforms**: extruded `C`, `I` and `O` outlines
//!
//! ## Usage
//!
//! ```rust
//! use lumen::gfx::geometry::{build_ring, build_sphere, RingParams, SphereParams};
//!
//! let globe = build_sphere(&SphereParams::new(1.0, 32, 16)).unwrap();
//! let orbit = build_ring(&RingParams::new(1.4, 0.02, 8, 64)).unwrap();
//! assert!(globe.triangle_count() > orbit.triangle_count() / 4);
//! ```

pub mod bounds;
pub mod extrude;
pub mod primitives;

pub use bounds::{Aabb, Ray};
pub use extrude::*;
pub use primitives::*;

use crate::error::{Result, SceneError};
use crate::gfx::backend::vertex::Vertex3D;

/// Smallest segment count any builder accepts
pub const MIN_SEGMENTS: u32 = 3;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Local-space bounding box of all vertices
    pub fn bounds(&self) -> Aabb {
        Aabb::from_vertices(&self.vertices)
    }

    /// Push one vertex and return its index
    pub(crate) fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        self.normals.push(normal);
        self.tex_coords.push(uv);
        index
    }

    /// Append another mesh, offsetting its indices
    pub(crate) fn append(&mut self, other: GeometryData) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.normals.extend(other.normals);
        self.tex_coords.extend(other.tex_coords);
        self.indices.extend(other.indices.into_iter().map(|i| i + offset));
    }

    /// Convert to the interleaved vertex format used by the renderer
    pub fn to_vertices(&self) -> (Vec<Vertex3D>, Vec<u32>) {
        let vertices = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect();

        (vertices, self.indices.clone())
    }

    /// Structural sanity check run before upload
    pub fn validate(&self) -> Result<()> {
        if self.vertices.is_empty() || self.indices.is_empty() {
            return Err(SceneError::InvalidGeometry("mesh has no triangles".into()));
        }
        if self.indices.len() % 3 != 0 {
            return Err(SceneError::InvalidGeometry(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        let count = self.vertices.len() as u32;
        if let Some(bad) = self.indices.iter().find(|&&i| i >= count) {
            return Err(SceneError::InvalidGeometry(format!(
                "index {bad} out of range for {count} vertices"
            )));
        }
        if self.vertices.iter().flatten().any(|c| !c.is_finite()) {
            return Err(SceneError::InvalidGeometry("non-finite vertex position".into()));
        }
        Ok(())
    }
}

/// Rejects non-finite or non-positive sizes
pub(crate) fn require_positive(name: &str, value: f32) -> Result<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SceneError::InvalidGeometry(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

/// Clamps a segment count to [`MIN_SEGMENTS`]
pub(crate) fn clamp_segments(name: &str, segments: u32) -> u32 {
    if segments < MIN_SEGMENTS {
        log::warn!("{name} of {segments} is below the minimum, clamping to {MIN_SEGMENTS}");
        MIN_SEGMENTS
    } else {
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_offsets_indices() {
        let mut a = GeometryData::new();
        a.push_vertex([0.0; 3], [0.0, 1.0, 0.0], [0.0; 2]);
        a.indices = vec![0, 0, 0];
        let mut b = GeometryData::new();
        b.push_vertex([1.0; 3], [0.0, 1.0, 0.0], [0.0; 2]);
        b.indices = vec![0, 0, 0];
        a.append(b);
        assert_eq!(a.indices, vec![0, 0, 0, 1, 1, 1]);
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_index() {
        let mut data = GeometryData::new();
        data.push_vertex([0.0; 3], [0.0, 1.0, 0.0], [0.0; 2]);
        data.indices = vec![0, 1, 2];
        assert!(matches!(data.validate(), Err(SceneError::InvalidGeometry(_))));
    }

    #[test]
    fn test_segment_clamp() {
        assert_eq!(clamp_segments("segments", 1), MIN_SEGMENTS);
        assert_eq!(clamp_segments("segments", 12), 12);
    }
}
