//! Scene Graph Builder.
//!
//! A composition is assembled once from a configuration value: register geometries
//! and materials, attach nodes under their parents, then [`SceneBuilder::build`]
//! validates the tree and uploads every resource through the backend. Handles
//! returned while assembling stay valid in the built [`Scene`].

use std::collections::HashMap;

use slotmap::SlotMap;

use super::{
    object::{NodeId, ObjectDesc, SceneObject},
    registry::{GeometryId, MaterialId, ResourceRegistry},
    scene::{Scene, ScrollLink},
};
use crate::error::{Result, SceneError};
use crate::gfx::{
    backend::RenderBackend, camera::Camera, geometry::GeometryData, light::Light,
    material::Material, transform::Transform,
};

pub struct SceneBuilder {
    name: String,
    registry: ResourceRegistry,
    nodes: SlotMap<NodeId, SceneObject>,
    order: Vec<NodeId>,
    root: NodeId,
    camera: Camera,
    lights: Vec<Light>,
    scroll_links: Vec<ScrollLink>,
    tilt_node: Option<NodeId>,
}

impl SceneBuilder {
    pub fn new(name: &str) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneObject::from_desc(ObjectDesc::group("root"), None));
        Self {
            name: name.to_string(),
            registry: ResourceRegistry::new(),
            nodes,
            order: vec![root],
            root,
            camera: Camera::default(),
            lights: Vec::new(),
            scroll_links: Vec::new(),
            tilt_node: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Builder pattern: Set the camera
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    /// Builder pattern: Add a light
    pub fn with_light(mut self, light: Light) -> Self {
        self.lights.push(light);
        self
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn add_geometry(&mut self, name: &str, data: GeometryData) -> GeometryId {
        self.registry.add_geometry(name, data)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.registry.add_material(material)
    }

    /// Attaches a node under `parent`. An unknown parent attaches to the root.
    pub fn add_object(&mut self, parent: NodeId, desc: ObjectDesc) -> NodeId {
        let parent = if self.nodes.contains_key(parent) {
            parent
        } else {
            log::warn!("unknown parent for '{}', attaching to root", desc.name);
            self.root
        };
        let id = self
            .nodes
            .insert(SceneObject::from_desc(desc, Some(parent)));
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(id);
        }
        self.order.push(id);
        id
    }

    /// Sets the base transform of the root node
    pub fn set_root_transform(&mut self, transform: Transform) {
        if let Some(root) = self.nodes.get_mut(self.root) {
            root.transform = transform;
        }
    }

    /// Camera pose reached when the host's scroll progress is 1
    pub fn dolly_camera_to(&mut self, pose: Camera) {
        self.scroll_links.push(ScrollLink::CameraDolly(pose));
    }

    /// Fades a material's opacity with scroll progress
    pub fn fade_on_scroll(&mut self, material: MaterialId, from: f32, to: f32) {
        self.scroll_links
            .push(ScrollLink::Opacity { material, from, to });
    }

    /// Tilts `node` towards the pointer
    pub fn tilt_with_pointer(&mut self, node: NodeId) {
        self.tilt_node = Some(node);
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Checks geometry references and material ownership.
    ///
    /// A material referenced by an object whose material is animated (hover or
    /// emissive pulse) must not be referenced by any other object.
    pub fn validate(&self) -> Result<()> {
        let mut users: HashMap<MaterialId, Vec<NodeId>> = HashMap::new();

        for &id in &self.order {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if let Some(geometry) = node.geometry {
                if self.registry.geometry(geometry).is_none() {
                    return Err(SceneError::InvalidGeometry(format!(
                        "object '{}' references a geometry this scene does not own",
                        node.name
                    )));
                }
            }
            if let Some(material) = node.material {
                users.entry(material).or_default().push(id);
            }
        }

        for &id in &self.order {
            let Some(material) = self.nodes.get(id).and_then(|n| n.material) else {
                continue;
            };
            let Some(sharing) = users.get(&material) else {
                continue;
            };
            let animated = sharing
                .iter()
                .any(|n| self.nodes.get(*n).is_some_and(SceneObject::animates_material));
            if sharing.len() > 1 && animated {
                return Err(SceneError::SharedMaterial {
                    material: self
                        .registry
                        .material(material)
                        .map_or_else(|| "unknown".to_string(), |m| m.name.clone()),
                    objects: sharing
                        .iter()
                        .filter_map(|n| self.nodes.get(*n).map(|o| o.name.clone()))
                        .collect(),
                });
            }
        }
        Ok(())
    }

    /// Validates the tree and uploads every geometry and material.
    ///
    /// On failure nothing stays allocated on the backend.
    pub fn build(self, backend: &mut dyn RenderBackend) -> Result<Scene> {
        self.validate()?;

        let SceneBuilder {
            name,
            mut registry,
            nodes,
            order,
            root,
            camera,
            lights,
            scroll_links,
            tilt_node,
        } = self;

        for (_, node) in nodes.iter() {
            if let Some(material) = node.material {
                if registry.material(material).is_none() {
                    log::warn!("object '{}' uses an unknown material", node.name);
                }
            }
        }

        registry.upload_all(backend)?;

        let hit_candidates = order
            .iter()
            .copied()
            .filter(|id| nodes.get(*id).is_some_and(|n| n.hoverable && n.geometry.is_some()))
            .collect();

        let mut scene = Scene {
            name,
            root,
            nodes,
            order,
            registry,
            base_camera: camera,
            camera,
            lights,
            hit_candidates,
            tilt_node,
            scroll_links,
            layout_scale: 1.0,
            scroll_progress: 0.0,
            time: 0.0,
        };
        scene.apply_scroll(0.0);
        scene.update_world_transforms(0.0, |_| Transform::identity());

        let stats = scene.statistics();
        log::info!(
            "built scene '{}': {} objects, {} geometries, {} materials, {} triangles",
            scene.name,
            stats.object_count,
            stats.geometry_count,
            stats.material_count,
            stats.total_triangles
        );
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::motion::{Motion, Oscillation};
    use crate::animation::particles::ParticleFieldDesc;
    use crate::gfx::backend::RecordingBackend;
    use crate::gfx::geometry::{build_ring, build_sphere, RingParams, SphereParams};
    use cgmath::Vector3;

    fn sphere() -> GeometryData {
        build_sphere(&SphereParams::new(0.5, 12, 8)).unwrap()
    }

    #[test]
    fn test_build_uploads_everything() {
        let mut builder = SceneBuilder::new("test");
        let mesh = builder.add_geometry("sphere", sphere());
        let a = builder.add_material(Material::matte([1.0, 0.0, 0.0], 0.5));
        let b = builder.add_material(Material::glass([0.8, 0.9, 1.0]));
        let root = builder.root();
        let left = builder.add_object(root, ObjectDesc::mesh("left", mesh, a).hoverable());
        builder.add_object(
            left,
            ObjectDesc::mesh("right", mesh, b)
                .with_transform(Transform::from_position(2.0, 0.0, 0.0)),
        );

        let mut backend = RecordingBackend::new(100, 100);
        let scene = builder.build(&mut backend).unwrap();

        assert_eq!(backend.ledger().live_resources(), 3);
        assert_eq!(scene.tracked_resources(), 3);
        assert_eq!(scene.hit_candidates(), &[left]);
        assert_eq!(scene.statistics().object_count, 3);

        let right = scene.find("right").unwrap();
        let world = scene.node(right).unwrap().world();
        assert!((world.w.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_shared_animated_material_rejected() {
        let mut builder = SceneBuilder::new("shared");
        let mesh = builder.add_geometry("sphere", sphere());
        let accent = builder.add_material(Material::emissive_accent([0.2, 0.6, 1.0], 1.0));
        let root = builder.root();
        builder.add_object(
            root,
            ObjectDesc::mesh("eye_l", mesh, accent).with_emissive_pulse(Oscillation::new(
                1.0, 0.5, 2.0, 0.0,
            )),
        );
        builder.add_object(root, ObjectDesc::mesh("eye_r", mesh, accent));

        let mut backend = RecordingBackend::new(100, 100);
        match builder.build(&mut backend) {
            Err(SceneError::SharedMaterial { objects, .. }) => {
                assert_eq!(objects, vec!["eye_l".to_string(), "eye_r".to_string()]);
            }
            other => panic!("expected SharedMaterial, got {other:?}"),
        }
        assert_eq!(backend.ledger().live_resources(), 0);
    }

    #[test]
    fn test_static_objects_may_share_material() {
        let mut builder = SceneBuilder::new("static");
        let mesh = builder.add_geometry("sphere", sphere());
        let matte = builder.add_material(Material::matte([0.4; 3], 0.8));
        let root = builder.root();
        builder.add_object(root, ObjectDesc::mesh("a", mesh, matte));
        builder.add_object(root, ObjectDesc::mesh("b", mesh, matte));

        let mut backend = RecordingBackend::new(100, 100);
        assert!(builder.build(&mut backend).is_ok());
    }

    #[test]
    fn test_draw_list_orders_transparent_last() {
        let mut builder = SceneBuilder::new("order");
        let mesh = builder.add_geometry("sphere", sphere());
        let root = builder.root();
        for (name, z) in [("near", 2.0), ("far", -2.0)] {
            let glass = builder.add_material(Material::glass([1.0; 3]));
            builder.add_object(
                root,
                ObjectDesc::mesh(name, mesh, glass)
                    .with_transform(Transform::from_position(0.0, 0.0, z)),
            );
        }
        let solid = builder.add_material(Material::matte([1.0; 3], 0.5));
        builder.add_object(root, ObjectDesc::mesh("solid", mesh, solid));

        let mut backend = RecordingBackend::new(100, 100);
        let scene = builder.build(&mut backend).unwrap();
        let draws = scene.draw_list();

        assert_eq!(draws.len(), 3);
        assert!(!draws[0].transparent);
        assert!(draws[1].transparent && draws[2].transparent);
        assert!(draws[1].depth > draws[2].depth);
    }

    #[test]
    fn test_particles_draw_instanced() {
        let mut builder = SceneBuilder::new("particles");
        let dot = builder.add_geometry("dot", sphere());
        let glow = builder.add_material(Material::emissive_accent([1.0; 3], 2.0));
        let ring = builder.add_geometry(
            "ring",
            build_ring(&RingParams::new(1.0, 0.05, 8, 32)).unwrap(),
        );
        let ring_mat = builder.add_material(Material::metal([0.7; 3], 0.3));
        let root = builder.root();
        builder.add_object(
            root,
            ObjectDesc::mesh("dust", dot, glow).with_particles(ParticleFieldDesc::new(40, 2.0)),
        );
        builder.add_object(
            root,
            ObjectDesc::mesh("ring", ring, ring_mat)
                .with_motion(Motion::spin(Vector3::unit_y(), 0.5)),
        );

        let mut backend = RecordingBackend::new(100, 100);
        let scene = builder.build(&mut backend).unwrap();
        let frame = scene.render_frame([0.0; 4]);
        assert_eq!(frame.instance_count(), 41);
        assert_eq!(scene.statistics().particle_count, 40);
    }

    #[test]
    fn test_hidden_parent_hides_children() {
        let mut builder = SceneBuilder::new("hidden");
        let mesh = builder.add_geometry("sphere", sphere());
        let mat = builder.add_material(Material::matte([1.0; 3], 0.5));
        let root = builder.root();
        let group = builder.add_object(root, ObjectDesc::group("group").hidden());
        builder.add_object(group, ObjectDesc::mesh("child", mesh, mat));

        let mut backend = RecordingBackend::new(100, 100);
        let scene = builder.build(&mut backend).unwrap();
        assert!(scene.draw_list().is_empty());
    }
}
