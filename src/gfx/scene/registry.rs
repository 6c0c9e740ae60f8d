//! Ownership of every GPU-resident resource a scene allocates.
//!
//! Geometries and materials are registered while a scene is being assembled and
//! uploaded together when it is built. The registry remembers the order in which the
//! backend accepted them and releases them in exactly the reverse order, once.

use slotmap::{new_key_type, SlotMap};

use crate::error::Result;
use crate::gfx::{
    backend::RenderBackend,
    geometry::{Aabb, GeometryData},
    material::Material,
};

new_key_type! {
    /// Handle to an immutable geometry owned by a scene
    pub struct GeometryId;
    /// Handle to a material owned by a scene
    pub struct MaterialId;
}

/// A resource as seen by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Geometry(GeometryId),
    Material(MaterialId),
}

/// CPU-side bookkeeping for one geometry
#[derive(Debug, Clone)]
pub struct GeometryRecord {
    pub name: String,
    /// Local-space bounds, kept for hit testing after the vertex data is dropped
    pub bounds: Aabb,
    pub triangles: usize,
    /// Vertex data until it has been uploaded
    data: Option<GeometryData>,
}

impl GeometryRecord {
    pub fn is_resident(&self) -> bool {
        self.data.is_none()
    }
}

#[derive(Debug, Default)]
pub struct ResourceRegistry {
    geometries: SlotMap<GeometryId, GeometryRecord>,
    materials: SlotMap<MaterialId, Material>,
    /// Registration order, drained by `upload_all`
    pending: Vec<ResourceKey>,
    /// Acquisition order of resources the backend currently holds
    acquired: Vec<ResourceKey>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_geometry(&mut self, name: &str, data: GeometryData) -> GeometryId {
        let id = self.geometries.insert(GeometryRecord {
            name: name.to_string(),
            bounds: data.bounds(),
            triangles: data.triangle_count(),
            data: Some(data),
        });
        self.pending.push(ResourceKey::Geometry(id));
        id
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = self.materials.insert(material);
        self.pending.push(ResourceKey::Material(id));
        id
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&GeometryRecord> {
        self.geometries.get(id)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials.iter()
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Resources currently held by the backend
    pub fn tracked(&self) -> usize {
        self.acquired.len()
    }

    /// Acquisition order of the resources currently held by the backend
    pub fn acquisition_order(&self) -> &[ResourceKey] {
        &self.acquired
    }

    /// Uploads every registered resource in registration order.
    ///
    /// If any upload fails, everything this registry already holds is released in
    /// reverse order before the error is returned, leaving nothing allocated.
    pub fn upload_all(&mut self, backend: &mut dyn RenderBackend) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        for key in pending {
            if let Err(err) = self.upload(backend, key) {
                log::warn!(
                    "upload of {key:?} failed, rolling back {} resources: {err}",
                    self.acquired.len()
                );
                self.release_all(backend);
                return Err(err);
            }
            self.acquired.push(key);
        }
        log::debug!(
            "uploaded {} geometries and {} materials",
            self.geometries.len(),
            self.materials.len()
        );
        Ok(())
    }

    fn upload(&mut self, backend: &mut dyn RenderBackend, key: ResourceKey) -> Result<()> {
        match key {
            ResourceKey::Geometry(id) => {
                let Some(record) = self.geometries.get_mut(id) else {
                    return Ok(());
                };
                if let Some(data) = record.data.as_ref() {
                    backend.upload_geometry(id, data)?;
                }
                record.data = None;
            }
            ResourceKey::Material(id) => {
                if let Some(material) = self.materials.get(id) {
                    backend.upload_material(id, &material.to_uniform())?;
                }
            }
        }
        Ok(())
    }

    /// Releases every held resource in reverse acquisition order.
    ///
    /// Returns how many resources were released; a second call releases nothing.
    pub fn release_all(&mut self, backend: &mut dyn RenderBackend) -> usize {
        if self.acquired.is_empty() {
            log::debug!("resource registry already released");
            return 0;
        }
        let released = self.acquired.len();
        while let Some(key) = self.acquired.pop() {
            match key {
                ResourceKey::Geometry(id) => backend.release_geometry(id),
                ResourceKey::Material(id) => backend.release_material(id),
            }
        }
        self.pending.clear();
        log::debug!("released {released} scene resources");
        released
    }
}
