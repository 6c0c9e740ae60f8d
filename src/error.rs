//! Error taxonomy for scene construction and lifecycle management.
//!
//! Only failures that end a Scene instance are represented here. Malformed pointer
//! input is not an error (hit tests simply report no hit) and releasing an already
//! released resource is a no-op, so neither has a variant.

use thiserror::Error;

/// Errors raised while creating, building or running a Scene.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    /// The host cannot provide a drawing context (no adapter, no surface, no device).
    ///
    /// Fatal for the Scene being mounted; the host is expected to show a static fallback.
    #[error("drawing context unavailable: {0}")]
    ContextUnavailable(String),

    /// A GPU allocation failed while the Scene was being built or rendered.
    #[error("GPU resource allocation failed: {0}")]
    ResourceExhaustion(String),

    /// Shape parameters that cannot produce a valid mesh (non-finite or non-positive sizes).
    #[error("invalid geometry parameters: {0}")]
    InvalidGeometry(String),

    /// A material is referenced by more than one independently animated object.
    #[error("material '{material}' is shared by independently animated objects {objects:?}")]
    SharedMaterial {
        material: String,
        objects: Vec<String>,
    },

    /// A lifecycle operation was called from a state that does not allow it.
    #[error("invalid lifecycle state: expected {expected}, found {found}")]
    InvalidState {
        expected: &'static str,
        found: &'static str,
    },
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, SceneError>;

impl SceneError {
    /// Whether the error ends the Scene instance (every variant except misuse does).
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SceneError::InvalidState { .. })
    }
}
