//! Camera descriptor
//!
//! A look-at perspective camera. Projection follows the OpenGL convention internally
//! (clip z in [-1, 1]) and is corrected to wgpu's [0, 1] depth range only when the
//! view-projection uniform is built. Ray unprojection uses the uncorrected matrix.

use cgmath::{
    perspective, Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, SquareMatrix, Vector3, Vector4,
};

use crate::gfx::geometry::Ray;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    /// Contains the view projection matrix.
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov_y: Deg<f32>,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Point3::new(0.0, 0.0, 5.0), Point3::origin())
    }
}

impl Camera {
    pub fn new(position: Point3<f32>, target: Point3<f32>) -> Self {
        Self {
            position,
            target,
            up: Vector3::unit_y(),
            fov_y: Deg(45.0),
            near: 0.1,
            far: 100.0,
            aspect: 1.0,
        }
    }

    /// Builder pattern: Set vertical field of view in degrees
    pub fn with_fov(mut self, degrees: f32) -> Self {
        self.fov_y = Deg(degrees.clamp(1.0, 179.0));
        self
    }

    /// Builder pattern: Set near/far clip planes
    pub fn with_clip(mut self, near: f32, far: f32) -> Self {
        self.near = near.max(f32::EPSILON);
        self.far = far.max(self.near * 2.0);
        self
    }

    /// Updates the aspect ratio; non-positive or non-finite values are ignored.
    /// Returns whether the camera changed.
    pub fn set_aspect(&mut self, aspect: f32) -> bool {
        if !aspect.is_finite() || aspect <= 0.0 || aspect == self.aspect {
            return false;
        }
        self.aspect = aspect;
        true
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    /// OpenGL-convention projection
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        perspective(self.fov_y, self.aspect, self.near, self.far)
    }

    /// View-projection for rendering with wgpu depth conventions
    pub fn view_proj(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * self.projection_matrix() * self.view_matrix()
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_position: self.position.to_homogeneous().into(),
            view_proj: self.view_proj().into(),
        }
    }

    /// World-space ray through a point in normalized device coordinates
    ///
    /// Returns `None` if the view-projection is singular or the coordinates are not finite.
    pub fn ray_from_ndc(&self, ndc_x: f32, ndc_y: f32) -> Option<Ray> {
        if !ndc_x.is_finite() || !ndc_y.is_finite() {
            return None;
        }
        let inv_view_proj = (self.projection_matrix() * self.view_matrix()).invert()?;

        let unproject = |z: f32| {
            let p = inv_view_proj * Vector4::new(ndc_x, ndc_y, z, 1.0);
            Vector3::new(p.x / p.w, p.y / p.w, p.z / p.w)
        };
        let near = unproject(-1.0);
        let far = unproject(1.0);

        let direction = far - near;
        if direction.magnitude2() <= f32::EPSILON {
            return None;
        }
        let ray = Ray::new(near, direction);
        ray.is_finite().then_some(ray)
    }

    /// Interpolates pose and field of view towards `other`; aspect and clip planes are kept
    pub fn lerp(&self, other: &Camera, t: f32) -> Camera {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: Point3<f32>, b: Point3<f32>| a + (b - a) * t;
        Camera {
            position: mix(self.position, other.position),
            target: mix(self.target, other.target),
            up: self.up,
            fov_y: Deg(self.fov_y.0 + (other.fov_y.0 - self.fov_y.0) * t),
            near: self.near,
            far: self.far,
            aspect: self.aspect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 5.0), Point3::origin());
        let ray = camera.ray_from_ndc(0.0, 0.0).unwrap();
        assert!((ray.direction - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-4);
        assert!((ray.origin.z - 4.9).abs() < 1e-3);
    }

    #[test]
    fn test_offset_ray_follows_ndc() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 5.0), Point3::origin());
        let ray = camera.ray_from_ndc(0.5, -0.5).unwrap();
        assert!(ray.direction.x > 0.0);
        assert!(ray.direction.y < 0.0);
        assert!(camera.ray_from_ndc(f32::NAN, 0.0).is_none());
    }

    #[test]
    fn test_set_aspect() {
        let mut camera = Camera::default();
        assert!(camera.set_aspect(16.0 / 9.0));
        assert!(!camera.set_aspect(16.0 / 9.0));
        assert!(!camera.set_aspect(0.0));
        assert!(!camera.set_aspect(f32::INFINITY));
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Camera::new(Point3::new(0.0, 0.0, 6.0), Point3::origin()).with_fov(40.0);
        let b = Camera::new(Point3::new(0.0, 1.0, 3.0), Point3::origin()).with_fov(30.0);
        assert_eq!(a.lerp(&b, 0.0), a);
        let end = a.lerp(&b, 2.0);
        assert_eq!(end.position, b.position);
        assert_eq!(end.fov_y, b.fov_y);
    }
}
