//! Host input adapters: surface size and pointer position.

pub mod pointer;
pub mod viewport;

pub use pointer::{
    from_normalized_coords, hit_test, to_normalized_coords, Hit, HitCandidate, Ndc,
    PointerAdapter, SurfaceRect,
};
pub use viewport::{LayoutMode, SurfaceSize, Viewport, ViewportAdapter};
