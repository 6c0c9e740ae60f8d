//! Resize/Viewport Adapter.
//!
//! Keeps the drawing buffer, the camera aspect ratio and the layout scale in step
//! with the hosting surface. Reporting the same size twice changes nothing.

use crate::config::EngineConfig;

/// Size of the hosting surface as reported by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    /// Logical (CSS) width
    pub width: f32,
    /// Logical (CSS) height
    pub height: f32,
    pub device_pixel_ratio: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Desktop,
    Mobile,
}

/// Derived drawing state for one surface size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub size: SurfaceSize,
    /// Device pixel ratio after clamping
    pub pixel_ratio: f32,
    /// Drawing buffer size in physical pixels
    pub physical_width: u32,
    pub physical_height: u32,
    pub layout: LayoutMode,
    /// Root scale for the layout mode
    pub layout_scale: f32,
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        self.size.width / self.size.height
    }
}

/// Observes the hosting surface's size
#[derive(Debug)]
pub struct ViewportAdapter {
    max_pixel_ratio: f32,
    mobile_breakpoint: f32,
    mobile_scale: f32,
    current: Option<Viewport>,
    attached: bool,
}

impl ViewportAdapter {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_pixel_ratio: config.max_device_pixel_ratio,
            mobile_breakpoint: config.mobile_breakpoint,
            mobile_scale: config.mobile_scale,
            current: None,
            attached: false,
        }
    }

    /// Starts observing; the initial size is applied like any other resize
    pub fn attach(&mut self, size: SurfaceSize) -> Option<Viewport> {
        self.attached = true;
        self.current = None;
        self.resize(size)
    }

    pub fn detach(&mut self) {
        self.attached = false;
        self.current = None;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn current(&self) -> Option<&Viewport> {
        self.current.as_ref()
    }

    /// Computes the viewport for `size` without applying it
    pub fn compute(&self, size: SurfaceSize) -> Option<Viewport> {
        if !size.is_valid() {
            return None;
        }
        let pixel_ratio = if size.device_pixel_ratio.is_finite() && size.device_pixel_ratio > 0.0 {
            size.device_pixel_ratio.min(self.max_pixel_ratio)
        } else {
            1.0
        };
        let layout = if size.width < self.mobile_breakpoint {
            LayoutMode::Mobile
        } else {
            LayoutMode::Desktop
        };

        Some(Viewport {
            size,
            pixel_ratio,
            physical_width: ((size.width * pixel_ratio).round() as u32).max(1),
            physical_height: ((size.height * pixel_ratio).round() as u32).max(1),
            layout,
            layout_scale: match layout {
                LayoutMode::Mobile => self.mobile_scale,
                LayoutMode::Desktop => 1.0,
            },
        })
    }

    /// Applies a new surface size.
    ///
    /// Returns the new viewport only when something changed; invalid sizes, repeated
    /// sizes and calls while detached return `None`.
    pub fn resize(&mut self, size: SurfaceSize) -> Option<Viewport> {
        if !self.attached {
            return None;
        }
        let Some(viewport) = self.compute(size) else {
            log::debug!("ignoring invalid surface size {size:?}");
            return None;
        };
        if self.current == Some(viewport) {
            return None;
        }
        log::debug!(
            "viewport {}x{} ({:?}, ratio {})",
            viewport.physical_width,
            viewport.physical_height,
            viewport.layout,
            viewport.pixel_ratio
        );
        self.current = Some(viewport);
        Some(viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> ViewportAdapter {
        let mut adapter = ViewportAdapter::new(&EngineConfig::default());
        adapter.attached = true;
        adapter
    }

    #[test]
    fn test_pixel_ratio_clamped() {
        let viewport = adapter().resize(SurfaceSize::new(1000.0, 500.0, 3.0)).unwrap();
        assert_eq!(viewport.pixel_ratio, 2.0);
        assert_eq!((viewport.physical_width, viewport.physical_height), (2000, 1000));
        assert_eq!(viewport.aspect(), 2.0);
    }

    #[test]
    fn test_resize_idempotent() {
        let mut adapter = adapter();
        let size = SurfaceSize::new(800.0, 600.0, 1.0);
        assert!(adapter.resize(size).is_some());
        assert!(adapter.resize(size).is_none());
        assert!(adapter.resize(SurfaceSize::new(801.0, 600.0, 1.0)).is_some());
    }

    #[test]
    fn test_mobile_layout() {
        let viewport = adapter().resize(SurfaceSize::new(375.0, 667.0, 2.0)).unwrap();
        assert_eq!(viewport.layout, LayoutMode::Mobile);
        assert_eq!(viewport.layout_scale, 0.7);
    }

    #[test]
    fn test_invalid_sizes_ignored() {
        let mut adapter = adapter();
        assert!(adapter.resize(SurfaceSize::new(0.0, 100.0, 1.0)).is_none());
        let viewport = adapter.resize(SurfaceSize::new(100.0, 100.0, f32::NAN)).unwrap();
        assert_eq!(viewport.pixel_ratio, 1.0);
        assert!(ViewportAdapter::new(&EngineConfig::default())
            .resize(SurfaceSize::new(100.0, 100.0, 1.0))
            .is_none());
    }
}
