//! # Primitive Shape Generation
//!
//! Spheres, cylinders and rings. All shapes are generated with outward normals and
//! texture coordinates, Y-up, centered at the origin.

use super::{clamp_segments, require_positive, GeometryData};
use crate::error::Result;
use std::f32::consts::{PI, TAU};

/// Parameters for [`build_sphere`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereParams {
    pub radius: f32,
    /// Number of vertical segments (longitude lines)
    pub width_segments: u32,
    /// Number of horizontal segments (latitude lines)
    pub height_segments: u32,
}

impl SphereParams {
    pub fn new(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self {
            radius,
            width_segments,
            height_segments,
        }
    }
}

/// Generate a UV sphere
pub fn build_sphere(params: &SphereParams) -> Result<GeometryData> {
    let radius = require_positive("sphere radius", params.radius)?;
    let long_segs = clamp_segments("sphere width segments", params.width_segments);
    let lat_segs = clamp_segments("sphere height segments", params.height_segments);

    let mut data = GeometryData::new();

    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32; // 0 to PI
        let (sin_theta, cos_theta) = theta.sin_cos();

        for long in 0..=long_segs {
            let phi = long as f32 * TAU / long_segs as f32; // 0 to 2*PI
            let (sin_phi, cos_phi) = phi.sin_cos();

            let normal = [sin_theta * cos_phi, cos_theta, sin_theta * sin_phi];
            data.push_vertex(
                [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                normal,
                [long as f32 / long_segs as f32, lat as f32 / lat_segs as f32],
            );
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;

            data.indices.extend_from_slice(&[first, first + 1, second]);
            data.indices.extend_from_slice(&[second, first + 1, second + 1]);
        }
    }

    Ok(data)
}

/// Parameters for [`build_cylinder`]; a zero top radius makes a cone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderParams {
    pub radius_top: f32,
    pub radius_bottom: f32,
    pub height: f32,
    pub radial_segments: u32,
}

impl CylinderParams {
    pub fn new(radius: f32, height: f32, radial_segments: u32) -> Self {
        Self {
            radius_top: radius,
            radius_bottom: radius,
            height,
            radial_segments,
        }
    }

    /// Builder pattern: Taper towards the top
    pub fn with_top_radius(mut self, radius_top: f32) -> Self {
        self.radius_top = radius_top;
        self
    }
}

/// Generate a capped cylinder (or frustum) along the Y axis
pub fn build_cylinder(params: &CylinderParams) -> Result<GeometryData> {
    let height = require_positive("cylinder height", params.height)?;
    let bottom = require_positive("cylinder bottom radius", params.radius_bottom)?;
    let top = if params.radius_top == 0.0 {
        0.0
    } else {
        require_positive("cylinder top radius", params.radius_top)?
    };
    let segments = clamp_segments("cylinder radial segments", params.radial_segments);
    let half = height * 0.5;

    let mut data = GeometryData::new();

    // Side wall; the normal tilts with the slope of a frustum
    let slope = (bottom - top) / height;
    for ring in 0..=1u32 {
        let (y, radius) = if ring == 0 { (-half, bottom) } else { (half, top) };
        for i in 0..=segments {
            let u = i as f32 / segments as f32;
            let (sin, cos) = (u * TAU).sin_cos();
            let inv = 1.0 / (1.0 + slope * slope).sqrt();
            data.push_vertex(
                [cos * radius, y, sin * radius],
                [cos * inv, slope * inv, sin * inv],
                [u, ring as f32],
            );
        }
    }
    for i in 0..segments {
        let a = i;
        let b = i + segments + 1;
        data.indices.extend_from_slice(&[a, b, a + 1]);
        data.indices.extend_from_slice(&[b, b + 1, a + 1]);
    }

    // Caps
    for (y, radius, ny) in [(half, top, 1.0f32), (-half, bottom, -1.0)] {
        if radius <= 0.0 {
            continue;
        }
        let center = data.push_vertex([0.0, y, 0.0], [0.0, ny, 0.0], [0.5, 0.5]);
        let start = data.vertices.len() as u32;
        for i in 0..=segments {
            let (sin, cos) = (i as f32 / segments as f32 * TAU).sin_cos();
            data.push_vertex(
                [cos * radius, y, sin * radius],
                [0.0, ny, 0.0],
                [0.5 + cos * 0.5, 0.5 + sin * 0.5],
            );
        }
        for i in 0..segments {
            if ny > 0.0 {
                data.indices.extend_from_slice(&[center, start + i + 1, start + i]);
            } else {
                data.indices.extend_from_slice(&[center, start + i, start + i + 1]);
            }
        }
    }

    Ok(data)
}

/// Parameters for [`build_ring`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingParams {
    /// Distance from the center to the middle of the tube
    pub radius: f32,
    /// Tube radius
    pub tube: f32,
    /// Segments around the tube's cross-section
    pub radial_segments: u32,
    /// Segments around the ring
    pub tubular_segments: u32,
}

impl RingParams {
    pub fn new(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        Self {
            radius,
            tube,
            radial_segments,
            tubular_segments,
        }
    }
}

/// Generate a torus lying in the XZ plane
///
/// A tube at least as thick as the ring radius would self-intersect at the center,
/// so it is clamped just below the radius.
pub fn build_ring(params: &RingParams) -> Result<GeometryData> {
    let radius = require_positive("ring radius", params.radius)?;
    let mut tube = require_positive("ring tube", params.tube)?;
    if tube >= radius {
        let clamped = radius * 0.99;
        log::warn!("ring tube {tube} reaches the center of radius {radius}, clamping to {clamped}");
        tube = clamped;
    }
    let around = clamp_segments("ring tubular segments", params.tubular_segments);
    let section = clamp_segments("ring radial segments", params.radial_segments);

    let mut data = GeometryData::new();

    for i in 0..=around {
        let u = i as f32 / around as f32;
        let (sin_u, cos_u) = (u * TAU).sin_cos();
        for j in 0..=section {
            let v = j as f32 / section as f32;
            let (sin_v, cos_v) = (v * TAU).sin_cos();

            let normal = [cos_u * cos_v, sin_v, sin_u * cos_v];
            let reach = radius + tube * cos_v;
            data.push_vertex([cos_u * reach, tube * sin_v, sin_u * reach], normal, [u, v]);
        }
    }

    for i in 0..around {
        for j in 0..section {
            let a = i * (section + 1) + j;
            let b = (i + 1) * (section + 1) + j;
            data.indices.extend_from_slice(&[a, a + 1, b]);
            data.indices.extend_from_slice(&[b, a + 1, b + 1]);
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneError;

    #[test]
    fn test_sphere_counts_and_radius() {
        let sphere = build_sphere(&SphereParams::new(2.0, 8, 4)).unwrap();
        assert_eq!(sphere.vertex_count(), 9 * 5);
        assert_eq!(sphere.triangle_count(), 8 * 4 * 2);
        for v in &sphere.vertices {
            let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((len - 2.0).abs() < 1e-4);
        }
        assert!(sphere.validate().is_ok());
    }

    #[test]
    fn test_sphere_segment_clamp() {
        let sphere = build_sphere(&SphereParams::new(1.0, 1, 0)).unwrap();
        assert_eq!(sphere.triangle_count(), 3 * 3 * 2);
    }

    #[test]
    fn test_rejects_bad_sizes() {
        assert!(matches!(
            build_sphere(&SphereParams::new(-1.0, 8, 8)),
            Err(SceneError::InvalidGeometry(_))
        ));
        assert!(build_cylinder(&CylinderParams::new(1.0, f32::NAN, 8)).is_err());
        assert!(build_ring(&RingParams::new(0.0, 0.1, 8, 8)).is_err());
    }

    #[test]
    fn test_cone_has_single_cap() {
        let cone = build_cylinder(&CylinderParams::new(1.0, 2.0, 6).with_top_radius(0.0)).unwrap();
        let bounds = cone.bounds();
        assert!((bounds.max.y - 1.0).abs() < 1e-6);
        assert!((bounds.min.y + 1.0).abs() < 1e-6);
        assert!(cone.validate().is_ok());
    }

    #[test]
    fn test_ring_extent_and_clamp() {
        let ring = build_ring(&RingParams::new(1.0, 0.1, 16, 8)).unwrap();
        let bounds = ring.bounds();
        assert!((bounds.max.x - 1.1).abs() < 1e-4);
        assert!((bounds.max.y - 0.1).abs() < 1e-4);

        let fat = build_ring(&RingParams::new(1.0, 2.0, 16, 6)).unwrap();
        assert!(fat.bounds().max.x < 2.0);
    }
}
