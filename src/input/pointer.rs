//! Pointer/Hit-Test Adapter.
//!
//! Client coordinates are converted to normalized device coordinates relative to the
//! hosting surface's rectangle. Malformed or out-of-bounds input produces `None`
//! rather than an error; a hit test over no candidates simply finds nothing.

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3};

use crate::gfx::{
    camera::Camera,
    geometry::{Aabb, Ray},
    scene::NodeId,
};

/// The hosting surface's rectangle in client (CSS) pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle at the origin
    pub fn sized(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn is_valid(&self) -> bool {
        [self.left, self.top, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.left + self.width && y >= self.top && y <= self.top + self.height
    }
}

/// Normalized device coordinates: x right, y up, both in [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ndc {
    pub x: f32,
    pub y: f32,
}

impl Ndc {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Converts client coordinates to normalized device coordinates.
///
/// Returns `None` for non-finite input, a degenerate rectangle or a point outside it.
pub fn to_normalized_coords(client_x: f32, client_y: f32, rect: &SurfaceRect) -> Option<Ndc> {
    if !client_x.is_finite() || !client_y.is_finite() || !rect.is_valid() {
        log::trace!("dropping pointer input ({client_x}, {client_y}) for {rect:?}");
        return None;
    }
    if !rect.contains(client_x, client_y) {
        return None;
    }
    let x = (client_x - rect.left) / rect.width * 2.0 - 1.0;
    let y = -((client_y - rect.top) / rect.height * 2.0 - 1.0);
    Some(Ndc::new(x, y))
}

/// Maps normalized device coordinates back to client coordinates in `rect`
pub fn from_normalized_coords(ndc: Ndc, rect: &SurfaceRect) -> (f32, f32) {
    (
        rect.left + (ndc.x + 1.0) * 0.5 * rect.width,
        rect.top + (1.0 - ndc.y) * 0.5 * rect.height,
    )
}

/// An object eligible for hit testing: its local bounds and world matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitCandidate {
    pub node: NodeId,
    pub bounds: Aabb,
    pub world: Matrix4<f32>,
}

/// The nearest intersected candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub node: NodeId,
    /// World-space distance from the ray origin
    pub distance: f32,
    pub point: Vector3<f32>,
}

/// Casts a ray through `ndc` and returns the nearest candidate it intersects.
///
/// Candidate bounds are tested in the candidate's local space, so rotated objects
/// are hit by their oriented box rather than a loose world-aligned one.
pub fn hit_test(ndc: Ndc, camera: &Camera, candidates: &[HitCandidate]) -> Option<Hit> {
    if candidates.is_empty() || !(-1.0..=1.0).contains(&ndc.x) || !(-1.0..=1.0).contains(&ndc.y) {
        return None;
    }
    let ray = camera.ray_from_ndc(ndc.x, ndc.y)?;

    candidates
        .iter()
        .filter_map(|candidate| intersect_candidate(&ray, candidate))
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

fn intersect_candidate(ray: &Ray, candidate: &HitCandidate) -> Option<Hit> {
    let inverse = candidate.world.invert()?;
    let origin = inverse * ray.origin.extend(1.0);
    let direction = inverse * ray.direction.extend(0.0);
    if origin.w.abs() <= f32::EPSILON || direction.truncate().magnitude2() <= f32::EPSILON {
        return None;
    }

    let local = Ray::new(origin.truncate() / origin.w, direction.truncate());
    let t = candidate.bounds.intersect_ray(&local)?;
    let hit_local = local.point_at(t);
    let point = (candidate.world * hit_local.extend(1.0)).truncate();

    Some(Hit {
        node: candidate.node,
        distance: (point - ray.origin).magnitude(),
        point,
    })
}

/// Tracks the pointer over one hosting surface
#[derive(Debug, Default)]
pub struct PointerAdapter {
    rect: Option<SurfaceRect>,
    last: Option<Ndc>,
}

impl PointerAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, rect: SurfaceRect) {
        self.rect = Some(rect);
        self.last = None;
    }

    pub fn detach(&mut self) {
        self.rect = None;
        self.last = None;
    }

    pub fn is_attached(&self) -> bool {
        self.rect.is_some()
    }

    pub fn set_rect(&mut self, rect: SurfaceRect) {
        if self.rect.is_some() {
            self.rect = Some(rect);
        }
    }

    pub fn rect(&self) -> Option<&SurfaceRect> {
        self.rect.as_ref()
    }

    /// Records a pointer move and returns the normalized position, if on the surface
    pub fn pointer_moved(&mut self, client_x: f32, client_y: f32) -> Option<Ndc> {
        self.last = self
            .rect
            .as_ref()
            .and_then(|rect| to_normalized_coords(client_x, client_y, rect));
        self.last
    }

    pub fn pointer_left(&mut self) {
        self.last = None;
    }

    pub fn position(&self) -> Option<Ndc> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;
    use slotmap::SlotMap;

    fn unit_box() -> Aabb {
        Aabb::new(Vector3::new(-0.5, -0.5, -0.5), Vector3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn test_normalized_corners() {
        let rect = SurfaceRect::new(10.0, 20.0, 200.0, 100.0);
        assert_eq!(to_normalized_coords(10.0, 20.0, &rect), Some(Ndc::new(-1.0, 1.0)));
        assert_eq!(to_normalized_coords(210.0, 120.0, &rect), Some(Ndc::new(1.0, -1.0)));
        assert_eq!(to_normalized_coords(110.0, 70.0, &rect), Some(Ndc::new(0.0, 0.0)));
    }

    #[test]
    fn test_malformed_input_is_dropped() {
        let rect = SurfaceRect::sized(100.0, 100.0);
        assert!(to_normalized_coords(-5.0, 50.0, &rect).is_none());
        assert!(to_normalized_coords(f32::NAN, 50.0, &rect).is_none());
        assert!(to_normalized_coords(50.0, 50.0, &SurfaceRect::sized(0.0, 100.0)).is_none());
    }

    #[test]
    fn test_hit_nearest() {
        let mut ids: SlotMap<NodeId, ()> = SlotMap::with_key();
        let near = ids.insert(());
        let far = ids.insert(());
        let camera = Camera::new(Point3::new(0.0, 0.0, 5.0), Point3::new(0.0, 0.0, 0.0));

        let candidates = [
            HitCandidate {
                node: far,
                bounds: unit_box(),
                world: Matrix4::from_translation(Vector3::new(0.0, 0.0, -2.0)),
            },
            HitCandidate {
                node: near,
                bounds: unit_box(),
                world: Matrix4::from_translation(Vector3::new(0.0, 0.0, 1.0)),
            },
        ];

        let hit = hit_test(Ndc::new(0.0, 0.0), &camera, &candidates).unwrap();
        assert_eq!(hit.node, near);
        // Ray starts on the near plane, 0.1 in front of the camera
        assert!((hit.distance - 3.4).abs() < 1e-2);
        assert!(hit_test(Ndc::new(0.9, 0.9), &camera, &candidates).is_none());
        assert!(hit_test(Ndc::new(0.0, 0.0), &camera, &[]).is_none());
        assert!(hit_test(Ndc::new(1.5, 0.0), &camera, &candidates).is_none());
    }

    #[test]
    fn test_scaled_candidate() {
        let mut ids: SlotMap<NodeId, ()> = SlotMap::with_key();
        let node = ids.insert(());
        let camera = Camera::new(Point3::new(0.0, 0.0, 5.0), Point3::new(0.0, 0.0, 0.0));
        let candidate = HitCandidate {
            node,
            bounds: unit_box(),
            world: Matrix4::from_scale(2.0),
        };
        let hit = hit_test(Ndc::new(0.0, 0.0), &camera, &[candidate]).unwrap();
        assert!((hit.point.z - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_adapter_requires_attach() {
        let mut adapter = PointerAdapter::new();
        assert!(adapter.pointer_moved(5.0, 5.0).is_none());
        adapter.attach(SurfaceRect::sized(10.0, 10.0));
        assert!(adapter.pointer_moved(5.0, 5.0).is_some());
        adapter.pointer_left();
        assert!(adapter.position().is_none());
    }
}
