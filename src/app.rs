//! Native host: mounts one composition in a winit window.
//!
//! Window events map onto the lifecycle controller: resizes and scale-factor changes
//! feed the viewport adapter, cursor events the pointer adapter, the mouse wheel the
//! scroll progress, occlusion the visibility flag, and `RedrawRequested` delivers the
//! frame callback requested through [`RedrawScheduler`].

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::compositions::Composition;
use crate::config::EngineConfig;
use crate::error::{Result, SceneError};
use crate::frame::RedrawScheduler;
use crate::gfx::backend::{DrawingSurface, WgpuBackend};
use crate::input::{pointer::SurfaceRect, viewport::SurfaceSize};
use crate::lifecycle::Lifecycle;

/// Scroll progress moved by one wheel line
const SCROLL_PER_LINE: f32 = 0.05;
/// Scroll progress moved by one logical pixel of touchpad scrolling
const SCROLL_PER_PIXEL: f32 = 0.002;

/// A window acting as the drawing surface
pub struct WindowSurface {
    window: Arc<Window>,
}

impl WindowSurface {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }
}

impl DrawingSurface for WindowSurface {
    type Backend = WgpuBackend;

    fn create_context(&mut self, width: u32, height: u32) -> Result<WgpuBackend> {
        pollster::block_on(WgpuBackend::new(Arc::clone(&self.window), width, height))
    }
}

struct Mounted {
    window: Arc<Window>,
    lifecycle: Lifecycle<WindowSurface, RedrawScheduler>,
    last_frame: Instant,
    scroll: f32,
}

/// Opens a window and runs one composition until the window is closed
pub struct ShowcaseApp {
    composition: Box<dyn Composition>,
    config: EngineConfig,
    title: String,
    size: (u32, u32),
    mounted: Option<Mounted>,
    error: Option<SceneError>,
}

impl ShowcaseApp {
    pub fn new(composition: Box<dyn Composition>) -> Self {
        let title = format!("lumen - {}", composition.name());
        Self {
            composition,
            config: EngineConfig::default(),
            title,
            size: (1200, 800),
            mounted: None,
            error: None,
        }
    }

    /// Builder pattern: Set the engine configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Builder pattern: Set the initial logical window size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    /// Runs the event loop; returns the error that ended the scene, if any
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        event_loop.set_control_flow(ControlFlow::Wait);
        event_loop
            .run_app(&mut self)
            .context("event loop terminated abnormally")?;

        match self.error.take() {
            Some(err) => Err(err).with_context(|| format!("'{}' stopped", self.composition.name())),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: SceneError) {
        log::error!("{err}");
        self.error = Some(err);
        if let Some(mut mounted) = self.mounted.take() {
            mounted.lifecycle.unmount();
        }
        event_loop.exit();
    }
}

/// Logical surface size and rectangle for a window
fn surface_of(window: &Window) -> (SurfaceSize, SurfaceRect) {
    let scale = window.scale_factor();
    let logical: LogicalSize<f32> = window.inner_size().to_logical(scale);
    (
        SurfaceSize::new(logical.width, logical.height, scale as f32),
        SurfaceRect::sized(logical.width, logical.height),
    )
}

impl ApplicationHandler for ShowcaseApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.mounted.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(self.size.0, self.size.1));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, SceneError::ContextUnavailable(format!("window: {e}")));
                return;
            }
        };

        let mut lifecycle = Lifecycle::new(
            WindowSurface::new(Arc::clone(&window)),
            RedrawScheduler::new(Arc::clone(&window)),
            self.config.clone(),
        );
        let (size, rect) = surface_of(&window);
        if let Err(err) = lifecycle.mount(self.composition.as_ref(), size, rect) {
            self.fail(event_loop, err);
            return;
        }

        self.mounted = Some(Mounted {
            window,
            lifecycle,
            last_frame: Instant::now(),
            scroll: 0.0,
        });
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                mounted.lifecycle.unmount();
                self.mounted = None;
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::KeyM),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let reduced = !mounted.lifecycle.config().reduced_motion;
                log::info!("reduced motion {}", if reduced { "on" } else { "off" });
                mounted.lifecycle.set_reduced_motion(reduced);
            }
            WindowEvent::Resized(PhysicalSize { .. }) | WindowEvent::ScaleFactorChanged { .. } => {
                let (size, rect) = surface_of(&mounted.window);
                mounted.lifecycle.resize(size, rect);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let scale = mounted.window.scale_factor();
                let logical = PhysicalPosition::new(position.x, position.y).to_logical::<f32>(scale);
                mounted.lifecycle.pointer_moved(logical.x, logical.y);
            }
            WindowEvent::CursorLeft { .. } => mounted.lifecycle.pointer_left(),
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => mounted.lifecycle.click(),
            WindowEvent::MouseWheel { delta, .. } => {
                let step = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * SCROLL_PER_LINE,
                    MouseScrollDelta::PixelDelta(p) => {
                        -(p.y as f32) / mounted.window.scale_factor() as f32 * SCROLL_PER_PIXEL
                    }
                };
                mounted.scroll = (mounted.scroll + step).clamp(0.0, 1.0);
                mounted.lifecycle.set_scroll_progress(mounted.scroll);
            }
            WindowEvent::Occluded(occluded) => mounted.lifecycle.set_visible(!occluded),
            WindowEvent::RedrawRequested => {
                let Some(request) = mounted.lifecycle.scheduler_mut().take_due() else {
                    return;
                };
                let now = Instant::now();
                let dt = now.duration_since(mounted.last_frame).as_secs_f64();
                mounted.last_frame = now;

                if let Err(err) = mounted.lifecycle.on_frame(request, dt) {
                    self.fail(event_loop, err);
                }
            }
            _ => (),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut mounted) = self.mounted.take() {
            mounted.lifecycle.unmount();
        }
    }
}
