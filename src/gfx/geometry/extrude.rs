//! Extruded outlines: rounded tiles, frames and letterforms.
//!
//! Every shape is a 2D [`Profile`] in the XY plane pushed along Z by an [`Extrusion`].
//! Two profile kinds cover all shapes:
//!
//! - **Band**: an outer and an inner contour with matching point counts (rings, frames,
//!   arcs). Caps are quad strips between partner points.
//! - **Convex**: a single convex outline (tiles, bars). Caps are triangle fans.
//!
//! A bevel insets the cap contour towards the partner point (band) or the centroid
//! (convex) and connects it to the full-size wall with a slanted strip.

use super::{clamp_segments, require_positive, GeometryData};
use crate::error::{Result, SceneError};
use cgmath::{InnerSpace, Vector2, Vector3};
use std::f32::consts::{FRAC_PI_2, TAU};

/// Smallest inner width/height a stroked outline may keep
pub const MIN_INNER: f32 = 1e-3;

/// A 2D outline to extrude
#[derive(Debug, Clone, PartialEq)]
pub enum Profile {
    Band {
        outer: Vec<Vector2<f32>>,
        inner: Vec<Vector2<f32>>,
        closed: bool,
    },
    Convex {
        outline: Vec<Vector2<f32>>,
    },
}

/// Depth along Z and bevel size of an extrusion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extrusion {
    pub depth: f32,
    pub bevel: f32,
}

impl Extrusion {
    pub fn new(depth: f32, bevel: f32) -> Self {
        Self { depth, bevel }
    }
}

/// Extrude a profile into a closed mesh centered on z = 0
pub fn extrude(profile: &Profile, extrusion: &Extrusion) -> Result<GeometryData> {
    let depth = require_positive("extrusion depth", extrusion.depth)?;
    if !extrusion.bevel.is_finite() || extrusion.bevel < 0.0 {
        return Err(SceneError::InvalidGeometry(format!(
            "bevel must be finite and non-negative, got {}",
            extrusion.bevel
        )));
    }

    match profile {
        Profile::Band {
            outer,
            inner,
            closed,
        } => extrude_band(outer, inner, *closed, depth, extrusion.bevel),
        Profile::Convex { outline } => extrude_convex(outline, depth, extrusion.bevel),
    }
}

/// Z levels of the side walls: `(inset, z)` pairs from back to front
fn wall_levels(depth: f32, bevel: f32) -> Vec<(bool, f32)> {
    let half = depth * 0.5;
    if bevel > 0.0 {
        vec![
            (true, -half),
            (false, -half + bevel),
            (false, half - bevel),
            (true, half),
        ]
    } else {
        vec![(false, -half), (false, half)]
    }
}

fn clamp_bevel(bevel: f32, depth: f32, min_span: f32) -> f32 {
    let limit = (depth * 0.45).min(min_span * 0.45);
    if bevel > limit {
        log::warn!("bevel {bevel} exceeds the outline, clamping to {limit}");
        limit
    } else {
        bevel
    }
}

fn inset_towards(from: Vector2<f32>, to: Vector2<f32>, amount: f32) -> Vector2<f32> {
    let span = to - from;
    let len = span.magnitude();
    if len <= f32::EPSILON || amount <= 0.0 {
        from
    } else {
        from + span * (amount / len)
    }
}

fn lift(p: Vector2<f32>, z: f32) -> Vector3<f32> {
    Vector3::new(p.x, p.y, z)
}

/// Emit a flat-shaded quad whose normal faces along `hint`
fn emit_quad(data: &mut GeometryData, corners: [Vector3<f32>; 4], hint: Vector3<f32>) {
    let mut normal = (corners[1] - corners[0]).cross(corners[3] - corners[0]);
    if normal.magnitude2() <= f32::EPSILON * f32::EPSILON {
        normal = (corners[2] - corners[1]).cross(corners[0] - corners[1]);
    }
    if normal.magnitude2() <= f32::EPSILON * f32::EPSILON {
        // Zero-area quad (collapsed corner)
        return;
    }
    let mut normal = normal.normalize();
    if normal.dot(hint) < 0.0 {
        normal = -normal;
    }

    let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    let base = data.vertices.len() as u32;
    for (corner, uv) in corners.iter().zip(uvs) {
        data.push_vertex((*corner).into(), normal.into(), uv);
    }
    data.indices
        .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

/// Side walls along a contour, one flat quad per segment and level pair
fn emit_walls(
    data: &mut GeometryData,
    full: &[Vector2<f32>],
    inset: &[Vector2<f32>],
    levels: &[(bool, f32)],
    closed: bool,
    hint: impl Fn(usize, usize) -> Vector2<f32>,
) {
    let n = full.len();
    let segments = if closed { n } else { n.saturating_sub(1) };
    let pick = |level: (bool, f32), i: usize| lift(if level.0 { inset[i] } else { full[i] }, level.1);

    for i in 0..segments {
        let j = (i + 1) % n;
        if (full[j] - full[i]).magnitude2() <= f32::EPSILON * f32::EPSILON {
            continue;
        }
        let h = hint(i, j);
        for pair in levels.windows(2) {
            let corners = [pick(pair[0], i), pick(pair[0], j), pick(pair[1], j), pick(pair[1], i)];
            emit_quad(data, corners, Vector3::new(h.x, h.y, 0.0));
        }
    }
}

fn extrude_band(
    outer: &[Vector2<f32>],
    inner: &[Vector2<f32>],
    closed: bool,
    depth: f32,
    bevel: f32,
) -> Result<GeometryData> {
    if outer.len() != inner.len() || outer.len() < 2 {
        return Err(SceneError::InvalidGeometry(format!(
            "band contours need matching lengths of at least 2 (outer {}, inner {})",
            outer.len(),
            inner.len()
        )));
    }
    let n = outer.len();

    let min_span = outer
        .iter()
        .zip(inner)
        .map(|(o, i)| (o - i).magnitude())
        .fold(f32::INFINITY, f32::min);
    let bevel = clamp_bevel(bevel, depth, min_span);

    let outer_inset: Vec<_> = (0..n).map(|i| inset_towards(outer[i], inner[i], bevel)).collect();
    let inner_inset: Vec<_> = (0..n).map(|i| inset_towards(inner[i], outer[i], bevel)).collect();
    let levels = wall_levels(depth, bevel);
    let half = depth * 0.5;

    let mut data = GeometryData::new();

    // Caps
    let segments = if closed { n } else { n - 1 };
    for (z, nz) in [(half, 1.0f32), (-half, -1.0)] {
        for i in 0..segments {
            let j = (i + 1) % n;
            let corners = [
                lift(outer_inset[i], z),
                lift(outer_inset[j], z),
                lift(inner_inset[j], z),
                lift(inner_inset[i], z),
            ];
            emit_quad(&mut data, corners, Vector3::new(0.0, 0.0, nz));
        }
    }

    let midpoint = |a: &[Vector2<f32>], i: usize, j: usize| (a[i] + a[j]) * 0.5;
    emit_walls(&mut data, outer, &outer_inset, &levels, closed, |i, j| {
        midpoint(outer, i, j) - midpoint(inner, i, j)
    });
    emit_walls(&mut data, inner, &inner_inset, &levels, closed, |i, j| {
        midpoint(inner, i, j) - midpoint(outer, i, j)
    });

    // End faces of an open band
    if !closed {
        for (k, neighbor) in [(0, 1), (n - 1, n - 2)] {
            let away = (outer[k] - outer[neighbor]) + (inner[k] - inner[neighbor]);
            let pick_outer = |level: (bool, f32)| {
                lift(if level.0 { outer_inset[k] } else { outer[k] }, level.1)
            };
            let pick_inner = |level: (bool, f32)| {
                lift(if level.0 { inner_inset[k] } else { inner[k] }, level.1)
            };
            for pair in levels.windows(2) {
                let corners = [
                    pick_outer(pair[0]),
                    pick_inner(pair[0]),
                    pick_inner(pair[1]),
                    pick_outer(pair[1]),
                ];
                emit_quad(&mut data, corners, Vector3::new(away.x, away.y, 0.0));
            }
        }
    }

    Ok(data)
}

fn extrude_convex(outline: &[Vector2<f32>], depth: f32, bevel: f32) -> Result<GeometryData> {
    if outline.len() < 3 {
        return Err(SceneError::InvalidGeometry(format!(
            "convex outline needs at least 3 points, got {}",
            outline.len()
        )));
    }
    let n = outline.len();
    let centroid = outline.iter().fold(Vector2::new(0.0, 0.0), |acc, p| acc + p) / n as f32;

    let min_span = outline
        .iter()
        .map(|p| (p - centroid).magnitude())
        .fold(f32::INFINITY, f32::min);
    let bevel = clamp_bevel(bevel, depth, min_span);
    let inset: Vec<_> = outline
        .iter()
        .map(|p| inset_towards(*p, centroid, bevel))
        .collect();
    let levels = wall_levels(depth, bevel);
    let half = depth * 0.5;

    let mut data = GeometryData::new();

    // Fan caps
    for (z, nz) in [(half, 1.0f32), (-half, -1.0)] {
        let normal = [0.0, 0.0, nz];
        let center = data.push_vertex(lift(centroid, z).into(), normal, [0.5, 0.5]);
        let start = data.vertices.len() as u32;
        for p in &inset {
            data.push_vertex(lift(*p, z).into(), normal, [0.5 + p.x, 0.5 + p.y]);
        }
        for i in 0..n as u32 {
            let j = (i + 1) % n as u32;
            if nz > 0.0 {
                data.indices.extend_from_slice(&[center, start + i, start + j]);
            } else {
                data.indices.extend_from_slice(&[center, start + j, start + i]);
            }
        }
    }

    emit_walls(&mut data, outline, &inset, &levels, true, |i, j| {
        (outline[i] + outline[j]) * 0.5 - centroid
    });

    Ok(data)
}

/// Counter-clockwise rounded rectangle with `corner_segments + 1` points per corner
pub fn rounded_rect_outline(
    width: f32,
    height: f32,
    radius: f32,
    corner_segments: u32,
) -> Vec<Vector2<f32>> {
    let radius = radius.clamp(0.0, width.min(height) * 0.5);
    let (hx, hy) = (width * 0.5 - radius, height * 0.5 - radius);
    let segments = clamp_segments("corner segments", corner_segments);
    let corners = [(hx, hy), (-hx, hy), (-hx, -hy), (hx, -hy)];

    let mut points = Vec::with_capacity(4 * (segments as usize + 1));
    for (corner, (cx, cy)) in corners.iter().enumerate() {
        let start = corner as f32 * FRAC_PI_2;
        for s in 0..=segments {
            let angle = start + FRAC_PI_2 * s as f32 / segments as f32;
            points.push(Vector2::new(cx + radius * angle.cos(), cy + radius * angle.sin()));
        }
    }
    points
}

/// Parameters for [`build_rounded_tile`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileParams {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub corner_radius: f32,
    pub bevel: f32,
    pub corner_segments: u32,
}

impl TileParams {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
            corner_radius: 0.0,
            bevel: 0.0,
            corner_segments: 4,
        }
    }

    /// Builder pattern: Set corner radius and segments per corner
    pub fn with_corners(mut self, radius: f32, segments: u32) -> Self {
        self.corner_radius = radius;
        self.corner_segments = segments;
        self
    }

    /// Builder pattern: Set bevel size
    pub fn with_bevel(mut self, bevel: f32) -> Self {
        self.bevel = bevel;
        self
    }
}

/// Generate a rounded rectangular slab
pub fn build_rounded_tile(params: &TileParams) -> Result<GeometryData> {
    let width = require_positive("tile width", params.width)?;
    let height = require_positive("tile height", params.height)?;
    let outline = rounded_rect_outline(
        width,
        height,
        params.corner_radius.max(0.0),
        clamp_segments("tile corner segments", params.corner_segments),
    );
    extrude(
        &Profile::Convex { outline },
        &Extrusion::new(params.depth, params.bevel),
    )
}

/// Parameters for [`build_frame`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    pub width: f32,
    pub height: f32,
    /// Stroke thickness of the outline
    pub stroke: f32,
    pub depth: f32,
    pub corner_radius: f32,
    pub bevel: f32,
    pub corner_segments: u32,
}

impl FrameParams {
    pub fn new(width: f32, height: f32, stroke: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            stroke,
            depth,
            corner_radius: 0.0,
            bevel: 0.0,
            corner_segments: 4,
        }
    }

    /// Builder pattern: Set corner radius and segments per corner
    pub fn with_corners(mut self, radius: f32, segments: u32) -> Self {
        self.corner_radius = radius;
        self.corner_segments = segments;
        self
    }

    /// Builder pattern: Set bevel size
    pub fn with_bevel(mut self, bevel: f32) -> Self {
        self.bevel = bevel;
        self
    }

    /// Stroke after clamping so the inner opening keeps at least [`MIN_INNER`]
    pub fn effective_stroke(&self) -> f32 {
        let limit = ((self.width.min(self.height) - MIN_INNER) * 0.5).max(0.0);
        self.stroke.min(limit)
    }

    /// Width and height of the inner opening
    pub fn inner_size(&self) -> (f32, f32) {
        let stroke = self.effective_stroke();
        (self.width - 2.0 * stroke, self.height - 2.0 * stroke)
    }
}

/// Generate a rounded rectangular outline of the given stroke thickness
pub fn build_frame(params: &FrameParams) -> Result<GeometryData> {
    let width = require_positive("frame width", params.width)?;
    let height = require_positive("frame height", params.height)?;
    require_positive("frame stroke", params.stroke)?;
    if width.min(height) <= MIN_INNER {
        return Err(SceneError::InvalidGeometry(format!(
            "frame {width}x{height} leaves no room for an opening"
        )));
    }

    let stroke = params.effective_stroke();
    if stroke < params.stroke {
        log::warn!(
            "frame stroke {} would close the opening, clamping to {stroke}",
            params.stroke
        );
    }
    let (inner_w, inner_h) = params.inner_size();
    let radius = params.corner_radius.clamp(0.0, width.min(height) * 0.5);
    let inner_radius = (radius - stroke).max(0.0);

    let corner_segments = clamp_segments("frame corner segments", params.corner_segments);
    let outer = rounded_rect_outline(width, height, radius, corner_segments);
    let inner = rounded_rect_outline(inner_w, inner_h, inner_radius, corner_segments);

    extrude(
        &Profile::Band {
            outer,
            inner,
            closed: true,
        },
        &Extrusion::new(params.depth, params.bevel),
    )
}

/// Letterforms available to [`build_letterform`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Letter {
    C,
    I,
    O,
}

impl Letter {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'I' => Some(Letter::I),
            'O' => Some(Letter::O),
            _ => None,
        }
    }
}

/// Parameters for [`build_letterform`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterParams {
    /// Cap height of the glyph
    pub size: f32,
    /// Stroke thickness
    pub stroke: f32,
    pub depth: f32,
    pub bevel: f32,
    /// Segments along curved strokes
    pub segments: u32,
}

impl LetterParams {
    pub fn new(size: f32, stroke: f32, depth: f32) -> Self {
        Self {
            size,
            stroke,
            depth,
            bevel: 0.0,
            segments: 32,
        }
    }

    /// Builder pattern: Set bevel size
    pub fn with_bevel(mut self, bevel: f32) -> Self {
        self.bevel = bevel;
        self
    }

    /// Builder pattern: Set curve segments
    pub fn with_segments(mut self, segments: u32) -> Self {
        self.segments = segments;
        self
    }

    /// Glyph width; round letters are slightly narrower than tall
    pub fn width(&self, letter: Letter) -> f32 {
        match letter {
            Letter::I => self.stroke.min(self.size),
            Letter::C | Letter::O => self.size * 0.8,
        }
    }
}

/// Opening of the `C` in radians, centered on +X
const C_GAP: f32 = 1.9;

/// Generate an extruded letterform centered at the origin
pub fn build_letterform(letter: Letter, params: &LetterParams) -> Result<GeometryData> {
    let size = require_positive("letter size", params.size)?;
    let stroke = require_positive("letter stroke", params.stroke)?;
    let extrusion = Extrusion::new(params.depth, params.bevel);

    if letter == Letter::I {
        let (hw, hh) = (params.width(letter) * 0.5, size * 0.5);
        let outline = vec![
            Vector2::new(hw, hh),
            Vector2::new(-hw, hh),
            Vector2::new(-hw, -hh),
            Vector2::new(hw, -hh),
        ];
        return extrude(&Profile::Convex { outline }, &extrusion);
    }

    let (rx, ry) = (params.width(letter) * 0.5, size * 0.5);
    let limit = rx.min(ry) - MIN_INNER;
    if limit <= 0.0 {
        return Err(SceneError::InvalidGeometry(format!(
            "letter {letter:?} of size {size} leaves no room for a counter"
        )));
    }
    let stroke = if stroke > limit {
        log::warn!("letter stroke {stroke} would close the counter, clamping to {limit}");
        limit
    } else {
        stroke
    };
    let (irx, iry) = ((rx - stroke).max(MIN_INNER), (ry - stroke).max(MIN_INNER));
    let segments = clamp_segments("letter segments", params.segments);

    let (angles, closed): (Vec<f32>, bool) = match letter {
        Letter::O => (
            (0..segments).map(|i| i as f32 / segments as f32 * TAU).collect(),
            true,
        ),
        _ => {
            let start = C_GAP * 0.5;
            let sweep = TAU - C_GAP;
            (
                (0..=segments)
                    .map(|i| start + sweep * i as f32 / segments as f32)
                    .collect(),
                false,
            )
        }
    };

    let ellipse = |a: f32, b: f32| -> Vec<Vector2<f32>> {
        angles
            .iter()
            .map(|t| Vector2::new(a * t.cos(), b * t.sin()))
            .collect()
    };

    extrude(
        &Profile::Band {
            outer: ellipse(rx, ry),
            inner: ellipse(irx, iry),
            closed,
        },
        &extrusion,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::MIN_SEGMENTS;

    fn outer_bounds_contains(data: &GeometryData, w: f32, h: f32) -> bool {
        let b = data.bounds();
        b.min.x >= -w * 0.5 - 1e-5
            && b.max.x <= w * 0.5 + 1e-5
            && b.min.y >= -h * 0.5 - 1e-5
            && b.max.y <= h * 0.5 + 1e-5
    }

    #[test]
    fn test_tile_extent() {
        let tile = build_rounded_tile(&TileParams::new(2.0, 1.0, 0.2).with_corners(0.2, 4))
            .unwrap();
        assert!(tile.validate().is_ok());
        let b = tile.bounds();
        assert!((b.max.x - 1.0).abs() < 1e-5);
        assert!((b.max.z - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_corner_segments_clamped() {
        let coarse = build_rounded_tile(&TileParams::new(1.0, 1.0, 0.1).with_corners(0.3, 1)).unwrap();
        let minimum =
            build_rounded_tile(&TileParams::new(1.0, 1.0, 0.1).with_corners(0.3, MIN_SEGMENTS)).unwrap();
        assert_eq!(coarse.vertex_count(), minimum.vertex_count());

        let outline = rounded_rect_outline(1.0, 1.0, 0.3, 2);
        assert_eq!(outline.len(), 4 * (MIN_SEGMENTS as usize + 1));

        let frame = build_frame(&FrameParams::new(2.0, 1.0, 0.2, 0.1).with_corners(0.3, 0)).unwrap();
        let reference =
            build_frame(&FrameParams::new(2.0, 1.0, 0.2, 0.1).with_corners(0.3, MIN_SEGMENTS)).unwrap();
        assert_eq!(frame.vertex_count(), reference.vertex_count());
    }

    #[test]
    fn test_frame_stroke_clamped() {
        // Stroke at or above half the width must never invert the opening
        for stroke in [0.5, 1.0, 5.0, 100.0] {
            let params = FrameParams::new(1.0, 2.0, stroke, 0.1);
            let (iw, ih) = params.inner_size();
            assert!(iw >= MIN_INNER * 0.999, "inner width {iw} for stroke {stroke}");
            assert!(ih > 0.0);
            let frame = build_frame(&params).unwrap();
            assert!(frame.validate().is_ok());
            assert!(outer_bounds_contains(&frame, 1.0, 2.0));
        }
    }

    #[test]
    fn test_frame_normal_stroke_untouched() {
        let params = FrameParams::new(2.0, 2.0, 0.25, 0.1);
        assert_eq!(params.effective_stroke(), 0.25);
        assert_eq!(params.inner_size(), (1.5, 1.5));
    }

    #[test]
    fn test_letterforms_build() {
        let params = LetterParams::new(1.0, 0.18, 0.2).with_bevel(0.02).with_segments(24);
        for letter in [Letter::C, Letter::I, Letter::O] {
            let mesh = build_letterform(letter, &params).unwrap();
            assert!(mesh.validate().is_ok());
            assert!(mesh.triangle_count() > 0);
            assert!(outer_bounds_contains(&mesh, params.width(letter), 1.0));
        }
    }

    #[test]
    fn test_letter_stroke_clamped() {
        let params = LetterParams::new(1.0, 3.0, 0.2);
        let mesh = build_letterform(Letter::O, &params).unwrap();
        assert!(mesh.validate().is_ok());
        assert!(outer_bounds_contains(&mesh, params.width(Letter::O), 1.0));
    }

    #[test]
    fn test_letter_too_small_for_counter_rejected() {
        for letter in [Letter::C, Letter::O] {
            let result = build_letterform(letter, &LetterParams::new(0.001, 0.0005, 0.1));
            assert!(matches!(result, Err(SceneError::InvalidGeometry(_))), "{letter:?}");
        }
        // The bar has no counter and still builds
        assert!(build_letterform(Letter::I, &LetterParams::new(0.001, 0.0005, 0.1)).is_ok());
    }

    #[test]
    fn test_normals_are_unit() {
        let mesh = build_letterform(Letter::C, &LetterParams::new(1.0, 0.2, 0.3).with_bevel(0.05))
            .unwrap();
        for n in &mesh.normals {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(build_rounded_tile(&TileParams::new(0.0, 1.0, 1.0)).is_err());
        assert!(build_frame(&FrameParams::new(1.0, 1.0, 0.1, -1.0)).is_err());
        assert!(build_letterform(Letter::C, &LetterParams::new(1.0, f32::INFINITY, 0.1)).is_err());
        assert!(extrude(
            &Profile::Band {
                outer: vec![Vector2::new(0.0, 0.0); 3],
                inner: vec![Vector2::new(0.0, 0.0); 2],
                closed: true,
            },
            &Extrusion::new(1.0, 0.0)
        )
        .is_err());
    }

    #[test]
    fn test_letter_from_char() {
        assert_eq!(Letter::from_char('o'), Some(Letter::O));
        assert_eq!(Letter::from_char('x'), None);
    }
}
