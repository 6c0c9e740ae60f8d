//! # Scene Management Module
//!
//! A [`Scene`] owns one visual composition: a tree of [`SceneObject`]s, the camera,
//! the lights and a [`ResourceRegistry`] holding every geometry and material the
//! composition allocated on the backend.
//!
//! ## Key Components
//!
//! - [`SceneBuilder`] - assembles the tree once and uploads its resources
//! - [`Scene`] - the built tree, updated by the animation driver every frame
//! - [`SceneObject`] - a node with a transform, geometry, material and motions
//! - [`ResourceRegistry`] - acquisition-ordered ownership of GPU resources
//!
//! Nodes, geometries and materials are addressed by slotmap keys ([`NodeId`],
//! [`GeometryId`], [`MaterialId`]) that stay valid for the lifetime of the scene.

pub mod builder;
pub mod object;
pub mod registry;
pub mod scene;

pub use builder::SceneBuilder;
pub use object::{NodeId, ObjectDesc, SceneObject};
pub use registry::{GeometryId, GeometryRecord, MaterialId, ResourceKey, ResourceRegistry};
pub use scene::{Scene, SceneStatistics, ScrollLink};
