//! # Render Backends
//!
//! [`RenderBackend`] is the only place GPU work happens. The scene builder uploads
//! geometries and materials through it, the animation driver hands it one
//! [`RenderFrame`] per tick, and the lifecycle controller releases everything through
//! it in reverse acquisition order.
//!
//! - [`WgpuBackend`] renders into a window surface with wgpu
//! - [`RecordingBackend`] keeps a ledger of live allocations and every call made,
//!   for headless hosts and tests

pub mod recording;
pub mod vertex;
pub mod wgpu_backend;

pub use recording::{BackendEvent, Ledger, RecordingBackend, RecordingSurface};
pub use vertex::{InstanceRaw, Vertex3D};
pub use wgpu_backend::WgpuBackend;

use crate::error::Result;
use crate::gfx::{
    geometry::GeometryData,
    light::GlobalsUniform,
    material::MaterialUniform,
    scene::{GeometryId, MaterialId},
};

/// One draw call: a geometry, its material state this frame, and its instances
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub geometry: GeometryId,
    /// `None` draws with the backend's fallback material
    pub material: Option<(MaterialId, MaterialUniform)>,
    pub instances: Vec<InstanceRaw>,
    /// Alpha blended; drawn after every opaque item, back to front
    pub transparent: bool,
    /// View-space distance used to order transparent items
    pub depth: f32,
}

/// Everything a backend needs to present one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub globals: GlobalsUniform,
    pub clear_color: [f64; 4],
    pub draws: Vec<DrawItem>,
}

impl RenderFrame {
    /// Total number of instances across all draws
    pub fn instance_count(&self) -> usize {
        self.draws.iter().map(|d| d.instances.len()).sum()
    }
}

/// GPU-facing operations of a mounted scene.
///
/// Release calls for unknown or already released handles must be no-ops.
pub trait RenderBackend {
    fn upload_geometry(&mut self, id: GeometryId, data: &GeometryData) -> Result<()>;
    fn upload_material(&mut self, id: MaterialId, material: &MaterialUniform) -> Result<()>;
    fn release_geometry(&mut self, id: GeometryId);
    fn release_material(&mut self, id: MaterialId);
    /// Resize the drawing buffer in physical pixels
    fn resize(&mut self, width: u32, height: u32);
    fn render(&mut self, frame: &RenderFrame) -> Result<()>;
    /// Release the drawing context itself; called last during teardown
    fn release_context(&mut self);
}

/// A host surface able to produce a drawing context.
///
/// The lifecycle controller calls this once per mount; failure maps to
/// `SceneError::ContextUnavailable`.
pub trait DrawingSurface {
    type Backend: RenderBackend;

    fn create_context(&mut self, width: u32, height: u32) -> Result<Self::Backend>;
}
