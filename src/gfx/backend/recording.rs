//! Headless backend that records every call.
//!
//! [`RecordingSurface`] hands out [`RecordingBackend`]s that share one [`Ledger`]
//! with the surface, so a host can still inspect live allocations, the event order
//! and the last rendered frame after teardown dropped the backend.

use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use super::{DrawingSurface, RenderBackend, RenderFrame};
use crate::error::{Result, SceneError};
use crate::gfx::{
    geometry::GeometryData,
    material::MaterialUniform,
    scene::{GeometryId, MaterialId},
};

/// A call observed by the recording backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendEvent {
    ContextCreated { width: u32, height: u32 },
    GeometryUploaded(GeometryId),
    MaterialUploaded(MaterialId),
    GeometryReleased(GeometryId),
    MaterialReleased(MaterialId),
    Resized { width: u32, height: u32 },
    Rendered { draws: usize },
    ContextReleased,
}

/// Shared record of backend activity
#[derive(Debug, Default)]
pub struct Ledger {
    pub live_geometries: HashSet<GeometryId>,
    pub live_materials: HashSet<MaterialId>,
    pub events: Vec<BackendEvent>,
    pub frames_rendered: usize,
    pub last_frame: Option<RenderFrame>,
    pub contexts_live: usize,
    pub size: (u32, u32),
}

impl Ledger {
    /// Geometries plus materials still allocated
    pub fn live_resources(&self) -> usize {
        self.live_geometries.len() + self.live_materials.len()
    }

    pub fn count(&self, matches: impl Fn(&BackendEvent) -> bool) -> usize {
        self.events.iter().filter(|e| matches(e)).count()
    }
}

/// Backend that tracks allocations instead of touching a GPU
#[derive(Debug)]
pub struct RecordingBackend {
    ledger: Rc<RefCell<Ledger>>,
    upload_budget: Option<usize>,
    fail_render: bool,
    released: bool,
}

impl RecordingBackend {
    pub fn new(width: u32, height: u32) -> Self {
        let ledger = Rc::new(RefCell::new(Ledger::default()));
        Self::with_ledger(ledger, width, height)
    }

    fn with_ledger(ledger: Rc<RefCell<Ledger>>, width: u32, height: u32) -> Self {
        {
            let mut l = ledger.borrow_mut();
            l.contexts_live += 1;
            l.size = (width, height);
            l.events.push(BackendEvent::ContextCreated { width, height });
        }
        Self {
            ledger,
            upload_budget: None,
            fail_render: false,
            released: false,
        }
    }

    pub fn ledger(&self) -> Ref<'_, Ledger> {
        self.ledger.borrow()
    }

    fn spend_upload(&mut self, what: &str) -> Result<()> {
        match self.upload_budget.as_mut() {
            Some(0) => Err(SceneError::ResourceExhaustion(format!(
                "upload budget exhausted while allocating {what}"
            ))),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl RenderBackend for RecordingBackend {
    fn upload_geometry(&mut self, id: GeometryId, data: &GeometryData) -> Result<()> {
        self.spend_upload("geometry")?;
        data.validate()?;
        let mut ledger = self.ledger.borrow_mut();
        ledger.live_geometries.insert(id);
        ledger.events.push(BackendEvent::GeometryUploaded(id));
        Ok(())
    }

    fn upload_material(&mut self, id: MaterialId, _material: &MaterialUniform) -> Result<()> {
        self.spend_upload("material")?;
        let mut ledger = self.ledger.borrow_mut();
        ledger.live_materials.insert(id);
        ledger.events.push(BackendEvent::MaterialUploaded(id));
        Ok(())
    }

    fn release_geometry(&mut self, id: GeometryId) {
        let mut ledger = self.ledger.borrow_mut();
        if ledger.live_geometries.remove(&id) {
            ledger.events.push(BackendEvent::GeometryReleased(id));
        } else {
            log::debug!("geometry {id:?} already released");
        }
    }

    fn release_material(&mut self, id: MaterialId) {
        let mut ledger = self.ledger.borrow_mut();
        if ledger.live_materials.remove(&id) {
            ledger.events.push(BackendEvent::MaterialReleased(id));
        } else {
            log::debug!("material {id:?} already released");
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        let mut ledger = self.ledger.borrow_mut();
        ledger.size = (width, height);
        ledger.events.push(BackendEvent::Resized { width, height });
    }

    fn render(&mut self, frame: &RenderFrame) -> Result<()> {
        if self.released {
            return Err(SceneError::ContextUnavailable("context already released".into()));
        }
        if self.fail_render {
            return Err(SceneError::ResourceExhaustion("injected render failure".into()));
        }
        let mut ledger = self.ledger.borrow_mut();
        ledger.frames_rendered += 1;
        ledger.events.push(BackendEvent::Rendered {
            draws: frame.draws.len(),
        });
        ledger.last_frame = Some(frame.clone());
        Ok(())
    }

    fn release_context(&mut self) {
        if self.released {
            log::debug!("recording context already released");
            return;
        }
        self.released = true;
        let mut ledger = self.ledger.borrow_mut();
        ledger.contexts_live = ledger.contexts_live.saturating_sub(1);
        ledger.events.push(BackendEvent::ContextReleased);
    }
}

/// Surface producing [`RecordingBackend`]s, with optional failure injection
#[derive(Debug, Default)]
pub struct RecordingSurface {
    ledger: Rc<RefCell<Ledger>>,
    fail_context: bool,
    upload_budget: Option<usize>,
    fail_render: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: Every `create_context` call fails
    pub fn without_context(mut self) -> Self {
        self.fail_context = true;
        self
    }

    /// Builder pattern: Uploads fail with `ResourceExhaustion` after `count` successes
    pub fn with_upload_budget(mut self, count: usize) -> Self {
        self.upload_budget = Some(count);
        self
    }

    /// Builder pattern: Every render call fails with `ResourceExhaustion`
    pub fn with_failing_render(mut self) -> Self {
        self.fail_render = true;
        self
    }

    pub fn ledger(&self) -> Ref<'_, Ledger> {
        self.ledger.borrow()
    }

    /// Shared handle to the ledger
    pub fn ledger_handle(&self) -> Rc<RefCell<Ledger>> {
        Rc::clone(&self.ledger)
    }
}

impl DrawingSurface for RecordingSurface {
    type Backend = RecordingBackend;

    fn create_context(&mut self, width: u32, height: u32) -> Result<RecordingBackend> {
        if self.fail_context {
            return Err(SceneError::ContextUnavailable(
                "recording surface configured without a context".into(),
            ));
        }
        let mut backend = RecordingBackend::with_ledger(Rc::clone(&self.ledger), width, height);
        backend.upload_budget = self.upload_budget;
        backend.fail_render = self.fail_render;
        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::{build_sphere, SphereParams};
    use slotmap::SlotMap;

    #[test]
    fn test_upload_and_release_tracking() {
        let mut ids: SlotMap<GeometryId, ()> = SlotMap::with_key();
        let id = ids.insert(());
        let mesh = build_sphere(&SphereParams::new(1.0, 8, 8)).unwrap();

        let mut backend = RecordingBackend::new(100, 100);
        backend.upload_geometry(id, &mesh).unwrap();
        assert_eq!(backend.ledger().live_resources(), 1);

        backend.release_geometry(id);
        backend.release_geometry(id);
        assert_eq!(backend.ledger().live_resources(), 0);
        assert_eq!(
            backend
                .ledger()
                .count(|e| matches!(e, BackendEvent::GeometryReleased(_))),
            1
        );
    }

    #[test]
    fn test_upload_budget() {
        let mut ids: SlotMap<MaterialId, ()> = SlotMap::with_key();
        let mut surface = RecordingSurface::new().with_upload_budget(1);
        let mut backend = surface.create_context(10, 10).unwrap();
        let uniform = crate::gfx::material::Material::matte([1.0; 3], 0.5).to_uniform();

        assert!(backend.upload_material(ids.insert(()), &uniform).is_ok());
        assert!(matches!(
            backend.upload_material(ids.insert(()), &uniform),
            Err(SceneError::ResourceExhaustion(_))
        ));
        assert_eq!(surface.ledger().live_materials.len(), 1);
    }

    #[test]
    fn test_context_failure() {
        let mut surface = RecordingSurface::new().without_context();
        assert!(matches!(
            surface.create_context(10, 10),
            Err(SceneError::ContextUnavailable(_))
        ));
        assert_eq!(surface.ledger().contexts_live, 0);
    }
}
