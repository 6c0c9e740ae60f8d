// src/lib.rs
//! Lumen Scene Engine
//!
//! A realtime scene animation engine for small decorative 3D compositions,
//! built on wgpu and winit. Scenes are assembled once by a builder, animated by
//! closed-form functions of a per-scene clock, and torn down through a lifecycle
//! controller that releases every GPU resource exactly once.

pub mod animation;
pub mod app;
pub mod compositions;
pub mod config;
pub mod error;
pub mod frame;
pub mod gfx;
pub mod input;
pub mod lifecycle;

// Re-export main types for convenience
pub use app::ShowcaseApp;
pub use config::EngineConfig;
pub use error::{Result, SceneError};
pub use lifecycle::{Lifecycle, LifecycleState};
