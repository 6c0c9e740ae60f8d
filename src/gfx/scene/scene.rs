use cgmath::{EuclideanSpace, InnerSpace, Matrix4, SquareMatrix};
use slotmap::SlotMap;

use super::{
    object::{NodeId, SceneObject},
    registry::{MaterialId, ResourceRegistry},
};
use crate::gfx::{
    backend::{DrawItem, InstanceRaw, RenderBackend, RenderFrame},
    camera::Camera,
    geometry::Aabb,
    light::{GlobalsUniform, Light},
    material::Material,
    transform::Transform,
};
use crate::input::pointer::HitCandidate;

/// Effect driven by the host's scroll progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollLink {
    /// Camera pose reached at full progress; the scene camera is the pose at zero
    CameraDolly(Camera),
    /// Material opacity interpolated from `from` to `to`
    Opacity {
        material: MaterialId,
        from: f32,
        to: f32,
    },
}

/// One visual composition: its transform tree, camera, lights and resources
#[derive(Debug)]
pub struct Scene {
    pub(crate) name: String,
    pub(crate) root: NodeId,
    pub(crate) nodes: SlotMap<NodeId, SceneObject>,
    /// Parents always precede their children
    pub(crate) order: Vec<NodeId>,
    pub(crate) registry: ResourceRegistry,
    pub(crate) base_camera: Camera,
    pub(crate) camera: Camera,
    pub(crate) lights: Vec<Light>,
    pub(crate) hit_candidates: Vec<NodeId>,
    pub(crate) tilt_node: Option<NodeId>,
    pub(crate) scroll_links: Vec<ScrollLink>,
    pub(crate) layout_scale: f32,
    pub(crate) scroll_progress: f32,
    pub(crate) time: f32,
}

impl Scene {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Camera used for the next frame, scroll dolly applied
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Time of the last transform update
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneObject> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneObject> {
        self.nodes.get_mut(id)
    }

    /// Nodes in update order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SceneObject)> {
        self.order
            .iter()
            .filter_map(|&id| self.nodes.get(id).map(|node| (id, node)))
    }

    /// First node with the given name
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.registry.material(id)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.registry.material_mut(id)
    }

    /// The nodes pointer hit testing considers
    pub fn hit_candidates(&self) -> &[NodeId] {
        &self.hit_candidates
    }

    /// Node tilted by the pointer position, if any
    pub fn tilt_node(&self) -> Option<NodeId> {
        self.tilt_node
    }

    pub fn layout_scale(&self) -> f32 {
        self.layout_scale
    }

    /// Uniform scale applied to the root node; returns whether it changed
    pub fn set_layout_scale(&mut self, scale: f32) -> bool {
        if !scale.is_finite() || scale <= 0.0 || scale == self.layout_scale {
            return false;
        }
        self.layout_scale = scale;
        true
    }

    /// Updates the camera aspect ratio; returns whether it changed
    pub fn set_aspect(&mut self, aspect: f32) -> bool {
        if !self.base_camera.set_aspect(aspect) {
            return false;
        }
        self.apply_scroll(self.scroll_progress);
        true
    }

    /// Applies every scroll link for a progress fraction in [0, 1]
    pub fn apply_scroll(&mut self, progress: f32) {
        let progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.scroll_progress = progress;
        self.camera = self.base_camera;

        for link in &self.scroll_links {
            match *link {
                ScrollLink::CameraDolly(pose) => {
                    self.camera = self.base_camera.lerp(&pose, progress);
                }
                ScrollLink::Opacity { material, from, to } => {
                    if let Some(material) = self.registry.material_mut(material) {
                        material.set_opacity(from + (to - from) * progress);
                    }
                }
            }
        }
    }

    pub fn scroll_progress(&self) -> f32 {
        self.scroll_progress
    }

    /// Recomputes every node's pose and world matrix at time `t`.
    ///
    /// `overlay` supplies an extra offset per node (tilt, pulse) layered on top of the
    /// procedural motion. The layout scale is applied to the root.
    pub fn update_world_transforms(&mut self, t: f32, overlay: impl Fn(NodeId) -> Transform) {
        self.time = t;
        for &id in &self.order {
            let (parent_world, parent_visible) = match self.nodes.get(id).and_then(|n| n.parent) {
                Some(parent) => match self.nodes.get(parent) {
                    Some(p) => (p.world, p.world_visible),
                    None => (Matrix4::identity(), true),
                },
                None => (Matrix4::identity(), true),
            };

            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            let mut pose = node.animated(t).offset_by(&overlay(id));
            if id == self.root {
                pose.scale *= self.layout_scale;
            }
            node.pose = pose;
            node.world = parent_world * pose.to_matrix();
            node.world_visible = parent_visible && node.visible;
        }
    }

    /// World-space bounds of a node's geometry
    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb> {
        let node = self.nodes.get(id)?;
        let record = self.registry.geometry(node.geometry?)?;
        Some(record.bounds.transform(&node.world))
    }

    /// Visible hit candidates with their local bounds and world matrices
    pub fn hit_targets(&self) -> Vec<HitCandidate> {
        self.hit_candidates
            .iter()
            .filter_map(|&id| {
                let node = self.nodes.get(id)?;
                if !node.world_visible {
                    return None;
                }
                let record = self.registry.geometry(node.geometry?)?;
                Some(HitCandidate {
                    node: id,
                    bounds: record.bounds,
                    world: node.world,
                })
            })
            .collect()
    }

    /// Draw calls for the current state: opaque first, then transparent back to front
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let eye = self.camera.position.to_vec();
        let mut opaque = Vec::new();
        let mut transparent = Vec::new();

        for (_, node) in self.nodes() {
            let Some(geometry) = node.geometry else {
                continue;
            };
            if !node.world_visible {
                continue;
            }

            let instances: Vec<InstanceRaw> = match &node.particles {
                Some(field) => field
                    .world_matrices(&node.world, self.time)
                    .iter()
                    .map(InstanceRaw::from_matrix)
                    .collect(),
                None => vec![InstanceRaw::from_matrix(&node.world)],
            };
            if instances.is_empty() {
                continue;
            }

            let material = node
                .material
                .and_then(|id| self.registry.material(id).map(|m| (id, m)));
            let is_transparent = material.is_some_and(|(_, m)| m.is_transparent());
            let depth = (node.world.w.truncate() - eye).magnitude();

            let item = DrawItem {
                geometry,
                material: material.map(|(id, m)| (id, m.to_uniform())),
                instances,
                transparent: is_transparent,
                depth,
            };
            if is_transparent {
                transparent.push(item);
            } else {
                opaque.push(item);
            }
        }

        transparent.sort_by(|a, b| b.depth.total_cmp(&a.depth));
        opaque.extend(transparent);
        opaque
    }

    pub fn render_frame(&self, clear_color: [f64; 4]) -> RenderFrame {
        RenderFrame {
            globals: GlobalsUniform::new(self.camera.to_uniform(), &self.lights),
            clear_color,
            draws: self.draw_list(),
        }
    }

    pub fn statistics(&self) -> SceneStatistics {
        let mut total_triangles = 0;
        let mut particle_count = 0;
        for (_, node) in self.nodes() {
            let copies = node.particles.as_ref().map_or(1, |field| field.len());
            particle_count += node.particles.as_ref().map_or(0, |field| field.len());
            if let Some(record) = node.geometry.and_then(|g| self.registry.geometry(g)) {
                total_triangles += record.triangles * copies;
            }
        }

        SceneStatistics {
            object_count: self.nodes.len(),
            geometry_count: self.registry.geometry_count(),
            material_count: self.registry.material_count(),
            total_triangles,
            particle_count,
        }
    }

    /// Releases every geometry and material this scene allocated.
    ///
    /// Idempotent; returns how many resources were released by this call.
    pub fn dispose(&mut self, backend: &mut dyn RenderBackend) -> usize {
        self.registry.release_all(backend)
    }

    /// Geometries and materials still held by the backend
    pub fn tracked_resources(&self) -> usize {
        self.registry.tracked()
    }
}

/// Scene statistics for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub geometry_count: usize,
    pub material_count: usize,
    /// Triangles drawn per frame, particle instances included
    pub total_triangles: usize,
    pub particle_count: usize,
}
