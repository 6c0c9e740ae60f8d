//! # Graphics Module
//!
//! Everything that describes what ends up on screen: procedural geometry,
//! materials, transforms, the camera, lights, the scene graph and the render
//! backends that turn a scene into pixels.
//!
//! ## Architecture Overview
//!
//! - **Geometry** ([`geometry`]) - Pure mesh builders (spheres, rings, extruded outlines)
//! - **Materials** ([`material`]) - Independently owned shading descriptors
//! - **Scene** ([`scene`]) - Transform tree, resource registry and the scene builder
//! - **Backends** ([`backend`]) - The `RenderBackend` seam, a wgpu renderer and a recording backend
//!
//! Scenes are built through [`scene::SceneBuilder`], which uploads every geometry and
//! material through a [`backend::RenderBackend`] and hands back a [`scene::Scene`]
//! owning the resulting handles.

pub mod backend;
pub mod camera;
pub mod geometry;
pub mod light;
pub mod material;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use camera::Camera;
pub use material::Material;
pub use scene::{Scene, SceneBuilder};
pub use transform::Transform;
