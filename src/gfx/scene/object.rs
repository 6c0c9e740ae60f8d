//! Scene nodes.

use cgmath::{Matrix4, SquareMatrix};
use slotmap::new_key_type;

use super::registry::{GeometryId, MaterialId};
use crate::animation::{
    motion::{apply_motions, Motion, Oscillation},
    particles::{ParticleField, ParticleFieldDesc},
};
use crate::gfx::transform::Transform;

new_key_type! {
    /// Stable handle to a node of one scene
    pub struct NodeId;
}

/// A node in a scene's transform tree
#[derive(Debug)]
pub struct SceneObject {
    pub name: String,
    /// Local transform before motion and transition overlays
    pub transform: Transform,
    pub geometry: Option<GeometryId>,
    pub material: Option<MaterialId>,
    pub motions: Vec<Motion>,
    /// Emissive intensity as a function of time, replacing the material's resting value
    pub emissive: Option<Oscillation>,
    pub particles: Option<ParticleField>,
    pub hoverable: bool,
    pub visible: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) pose: Transform,
    pub(crate) world: Matrix4<f32>,
    pub(crate) world_visible: bool,
}

impl SceneObject {
    pub(crate) fn from_desc(desc: ObjectDesc, parent: Option<NodeId>) -> Self {
        Self {
            name: desc.name,
            transform: desc.transform,
            geometry: desc.geometry,
            material: desc.material,
            motions: desc.motions,
            emissive: desc.emissive,
            particles: desc.particles.as_ref().map(ParticleField::generate),
            hoverable: desc.hoverable,
            visible: desc.visible,
            parent,
            children: Vec::new(),
            pose: desc.transform,
            world: Matrix4::identity(),
            world_visible: desc.visible,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Local transform at time `t` from the base transform and procedural motions
    pub fn animated(&self, t: f32) -> Transform {
        apply_motions(&self.transform, &self.motions, t)
    }

    /// Local transform applied in the last update, overlays included
    pub fn pose(&self) -> &Transform {
        &self.pose
    }

    /// World matrix computed by the last update
    pub fn world(&self) -> &Matrix4<f32> {
        &self.world
    }

    /// Visible itself and through every ancestor
    pub fn is_world_visible(&self) -> bool {
        self.world_visible
    }

    /// Whether the driver mutates this object's material every frame
    pub fn animates_material(&self) -> bool {
        self.hoverable || self.emissive.is_some()
    }
}

/// Description of a node handed to the scene builder
#[derive(Debug, Clone)]
pub struct ObjectDesc {
    pub name: String,
    pub transform: Transform,
    pub geometry: Option<GeometryId>,
    pub material: Option<MaterialId>,
    pub motions: Vec<Motion>,
    pub emissive: Option<Oscillation>,
    pub particles: Option<ParticleFieldDesc>,
    pub hoverable: bool,
    pub visible: bool,
}

impl ObjectDesc {
    /// A transform-only group node
    pub fn group(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transform: Transform::identity(),
            geometry: None,
            material: None,
            motions: Vec::new(),
            emissive: None,
            particles: None,
            hoverable: false,
            visible: true,
        }
    }

    pub fn mesh(name: &str, geometry: GeometryId, material: MaterialId) -> Self {
        Self {
            geometry: Some(geometry),
            material: Some(material),
            ..Self::group(name)
        }
    }

    /// Builder pattern: Set the base transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Builder pattern: Add a procedural motion
    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motions.push(motion);
        self
    }

    /// Builder pattern: Drive emissive intensity from an oscillation
    pub fn with_emissive_pulse(mut self, pulse: Oscillation) -> Self {
        self.emissive = Some(pulse);
        self
    }

    /// Builder pattern: Draw the geometry once per particle of a generated field
    pub fn with_particles(mut self, desc: ParticleFieldDesc) -> Self {
        self.particles = Some(desc);
        self
    }

    /// Builder pattern: Include in hover hit testing
    pub fn hoverable(mut self) -> Self {
        self.hoverable = true;
        self
    }

    /// Builder pattern: Start hidden
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}
