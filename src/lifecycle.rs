//! Lifecycle Controller.
//!
//! ```text
//! Unmounted -> Initializing -> Running -> TearingDown -> Unmounted
//!                   |                          ^
//!                   +------- on failure -------+
//! ```
//!
//! Mounting acquires, in order: the drawing context, the viewport adapter, the
//! pointer adapter, the scene's GPU resources and finally the running driver with its
//! first frame request. Every acquisition is recorded and teardown undoes them in
//! strict reverse order, so the frame request is cancelled before any resource is
//! released and the context goes last. A failed mount tears down whatever it had
//! acquired before returning the error.

use crate::animation::driver::{AnimationDriver, FrameOutcome};
use crate::compositions::Composition;
use crate::config::EngineConfig;
use crate::error::{Result, SceneError};
use crate::frame::{FrameRequest, FrameScheduler};
use crate::gfx::{
    backend::{DrawingSurface, RenderBackend},
    scene::Scene,
};
use crate::input::{
    pointer::{PointerAdapter, SurfaceRect},
    viewport::{SurfaceSize, Viewport, ViewportAdapter},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unmounted,
    Initializing,
    Running,
    TearingDown,
}

impl LifecycleState {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleState::Unmounted => "Unmounted",
            LifecycleState::Initializing => "Initializing",
            LifecycleState::Running => "Running",
            LifecycleState::TearingDown => "TearingDown",
        }
    }
}

/// Something acquired while mounting, undone during teardown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Acquisition {
    Context,
    Viewport,
    Pointer,
    Scene,
    Driver,
}

/// Owns one mounted scene and everything it needs to run
pub struct Lifecycle<S: DrawingSurface, F: FrameScheduler> {
    config: EngineConfig,
    surface: S,
    scheduler: F,
    state: LifecycleState,
    backend: Option<S::Backend>,
    scene: Option<Scene>,
    viewport: ViewportAdapter,
    pointer: PointerAdapter,
    driver: AnimationDriver,
    acquired: Vec<Acquisition>,
    pending_frame: Option<FrameRequest>,
    visible: bool,
}

impl<S: DrawingSurface, F: FrameScheduler> Lifecycle<S, F> {
    pub fn new(surface: S, scheduler: F, config: EngineConfig) -> Self {
        Self {
            viewport: ViewportAdapter::new(&config),
            pointer: PointerAdapter::new(),
            driver: AnimationDriver::new(config.clone()),
            config,
            surface,
            scheduler,
            state: LifecycleState::Unmounted,
            backend: None,
            scene: None,
            acquired: Vec::new(),
            pending_frame: None,
            visible: true,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    pub fn backend(&self) -> Option<&S::Backend> {
        self.backend.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    pub fn driver(&self) -> &AnimationDriver {
        &self.driver
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.current()
    }

    pub fn pointer(&self) -> &PointerAdapter {
        &self.pointer
    }

    /// The frame request the next callback must carry
    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.pending_frame
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn transition(&mut self, next: LifecycleState) {
        log::info!("lifecycle {} -> {}", self.state.name(), next.name());
        self.state = next;
    }

    fn require_running(&self) -> Result<()> {
        if self.state == LifecycleState::Running {
            Ok(())
        } else {
            Err(SceneError::InvalidState {
                expected: LifecycleState::Running.name(),
                found: self.state.name(),
            })
        }
    }

    /// Creates the context, builds `composition` and starts the animation loop
    pub fn mount(
        &mut self,
        composition: &dyn Composition,
        size: SurfaceSize,
        rect: SurfaceRect,
    ) -> Result<()> {
        if self.state != LifecycleState::Unmounted {
            return Err(SceneError::InvalidState {
                expected: LifecycleState::Unmounted.name(),
                found: self.state.name(),
            });
        }
        self.transition(LifecycleState::Initializing);

        match self.acquire(composition, size, rect) {
            Ok(()) => {
                self.transition(LifecycleState::Running);
                Ok(())
            }
            Err(err) => {
                log::error!("mounting '{}' failed: {err}", composition.name());
                self.teardown();
                Err(err)
            }
        }
    }

    fn acquire(
        &mut self,
        composition: &dyn Composition,
        size: SurfaceSize,
        rect: SurfaceRect,
    ) -> Result<()> {
        let (width, height) = self
            .viewport
            .compute(size)
            .map_or((1, 1), |v| (v.physical_width, v.physical_height));
        let backend = self.surface.create_context(width, height)?;
        self.backend = Some(backend);
        self.acquired.push(Acquisition::Context);

        let viewport = self.viewport.attach(size);
        self.acquired.push(Acquisition::Viewport);

        self.pointer.attach(rect);
        self.acquired.push(Acquisition::Pointer);

        let builder = composition.blueprint(&self.config)?;
        let Some(backend) = self.backend.as_mut() else {
            return Err(SceneError::ContextUnavailable("context lost while mounting".into()));
        };
        let mut scene = builder.build(backend)?;
        if let Some(viewport) = viewport {
            scene.set_aspect(viewport.aspect());
            scene.set_layout_scale(viewport.layout_scale);
        }
        self.scene = Some(scene);
        self.acquired.push(Acquisition::Scene);

        self.driver.reset();
        self.driver.start();
        self.acquired.push(Acquisition::Driver);
        self.schedule_next();
        Ok(())
    }

    fn schedule_next(&mut self) {
        if self.driver.is_running() && self.visible && self.pending_frame.is_none() {
            self.pending_frame = Some(self.scheduler.request_frame());
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(request) = self.pending_frame.take() {
            self.scheduler.cancel_frame(request);
        }
    }

    fn teardown(&mut self) {
        self.transition(LifecycleState::TearingDown);
        while let Some(acquisition) = self.acquired.pop() {
            match acquisition {
                Acquisition::Driver => {
                    self.driver.stop();
                    self.cancel_pending();
                }
                Acquisition::Scene => {
                    if let (Some(scene), Some(backend)) = (self.scene.as_mut(), self.backend.as_mut()) {
                        scene.dispose(backend);
                    }
                    self.scene = None;
                }
                Acquisition::Pointer => self.pointer.detach(),
                Acquisition::Viewport => self.viewport.detach(),
                Acquisition::Context => {
                    if let Some(mut backend) = self.backend.take() {
                        backend.release_context();
                    }
                }
            }
        }
        self.transition(LifecycleState::Unmounted);
    }

    /// Stops the loop and releases everything; a no-op when already unmounted
    pub fn unmount(&mut self) {
        if self.state == LifecycleState::Unmounted {
            log::debug!("unmount called while already unmounted");
            return;
        }
        self.teardown();
    }

    /// Halts frame scheduling. Safe to call at any time, including between a frame
    /// request and its delivery; the late callback is ignored.
    pub fn stop(&mut self) {
        self.driver.stop();
        self.cancel_pending();
    }

    /// Resumes a stopped loop
    pub fn start(&mut self) -> Result<()> {
        self.require_running()?;
        self.driver.start();
        self.schedule_next();
        Ok(())
    }

    /// Pauses the loop while the surface is hidden; resuming does not jump the clock
    pub fn set_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        if !visible {
            self.cancel_pending();
        } else if self.state == LifecycleState::Running {
            self.driver.hold_clock();
            self.schedule_next();
        }
    }

    /// Delivers a frame callback with the elapsed seconds since the previous frame.
    ///
    /// Callbacks for requests that are no longer pending are ignored. A render error
    /// tears the scene down and is returned.
    pub fn on_frame(&mut self, request: FrameRequest, dt: f64) -> Result<FrameOutcome> {
        if self.state != LifecycleState::Running || self.pending_frame != Some(request) {
            log::debug!("ignoring stale frame callback {request:?}");
            return Ok(FrameOutcome::Skipped);
        }
        self.pending_frame = None;

        let (Some(scene), Some(backend)) = (self.scene.as_mut(), self.backend.as_mut()) else {
            return Ok(FrameOutcome::Skipped);
        };
        match self.driver.frame(scene, backend, dt) {
            Ok(outcome) => {
                self.schedule_next();
                Ok(outcome)
            }
            Err(err) => {
                log::error!("frame failed, tearing down: {err}");
                self.teardown();
                Err(err)
            }
        }
    }

    /// Applies a new surface size; returns whether anything changed
    pub fn resize(&mut self, size: SurfaceSize, rect: SurfaceRect) -> bool {
        if self.state != LifecycleState::Running {
            return false;
        }
        self.pointer.set_rect(rect);
        let Some(viewport) = self.viewport.resize(size) else {
            return false;
        };
        if let Some(backend) = self.backend.as_mut() {
            backend.resize(viewport.physical_width, viewport.physical_height);
        }
        if let Some(scene) = self.scene.as_mut() {
            scene.set_aspect(viewport.aspect());
            scene.set_layout_scale(viewport.layout_scale);
        }
        true
    }

    // Input signals are accepted only while running; anything else is dropped

    pub fn pointer_moved(&mut self, client_x: f32, client_y: f32) {
        if self.state == LifecycleState::Running {
            let ndc = self.pointer.pointer_moved(client_x, client_y);
            self.driver.pointer_moved(ndc);
        }
    }

    pub fn pointer_left(&mut self) {
        if self.state == LifecycleState::Running {
            self.pointer.pointer_left();
            self.driver.pointer_moved(None);
        }
    }

    pub fn click(&mut self) {
        if self.state == LifecycleState::Running {
            self.driver.clicked();
        }
    }

    pub fn set_scroll_progress(&mut self, progress: f32) {
        if self.state == LifecycleState::Running {
            self.driver.set_scroll_progress(progress);
        }
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.config.reduced_motion = reduced;
        self.driver.set_reduced_motion(reduced);
    }
}

impl<S: DrawingSurface, F: FrameScheduler> Drop for Lifecycle<S, F> {
    fn drop(&mut self) {
        if self.state != LifecycleState::Unmounted {
            self.teardown();
        }
    }
}
