//! Engine configuration
//!
//! A plain configuration value handed to the lifecycle controller at construction.
//! Every knob has a default tuned for decorative hero visuals; hosts override
//! individual values through the `with_*` builder methods.

/// Tunables shared by the viewport adapter, the animation driver and the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Upper bound for the device pixel ratio used to size the drawing buffer
    pub max_device_pixel_ratio: f32,
    /// Surface width (CSS pixels) below which the mobile layout applies
    pub mobile_breakpoint: f32,
    /// Uniform scale applied to the scene root in the mobile layout
    pub mobile_scale: f32,
    /// Duration of hover enter/exit emissive transitions in seconds
    pub hover_transition: f32,
    /// Emissive intensity added to a hovered object's material
    pub hover_emissive_boost: f32,
    /// Duration of the click pulse in seconds
    pub click_pulse: f32,
    /// Peak scale reached by a click pulse
    pub click_pulse_scale: f32,
    /// Maximum tilt (radians) applied from the pointer position
    pub pointer_tilt: f32,
    /// Duration of pointer tilt transitions in seconds
    pub pointer_tilt_transition: f32,
    /// Freeze procedural motion and make transitions complete immediately
    pub reduced_motion: bool,
    /// Clear color (linear RGBA)
    pub clear_color: [f64; 4],
    /// Optional ceiling on the frame delta fed into the clock, in seconds.
    /// `None` advances by the full elapsed time of every frame.
    pub max_frame_delta: Option<f32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_device_pixel_ratio: 2.0,
            mobile_breakpoint: 768.0,
            mobile_scale: 0.7,
            hover_transition: 0.35,
            hover_emissive_boost: 1.5,
            click_pulse: 0.6,
            click_pulse_scale: 1.12,
            pointer_tilt: 0.25,
            pointer_tilt_transition: 0.5,
            reduced_motion: false,
            clear_color: [0.0, 0.0, 0.0, 0.0],
            max_frame_delta: None,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: Set the device pixel ratio ceiling (never below 1.0)
    pub fn with_max_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.max_device_pixel_ratio = ratio.max(1.0);
        self
    }

    /// Builder pattern: Set the mobile layout breakpoint and root scale
    pub fn with_mobile_layout(mut self, breakpoint: f32, scale: f32) -> Self {
        self.mobile_breakpoint = breakpoint.max(0.0);
        self.mobile_scale = scale.max(f32::EPSILON);
        self
    }

    /// Builder pattern: Set hover transition duration and emissive boost
    pub fn with_hover(mut self, duration: f32, emissive_boost: f32) -> Self {
        self.hover_transition = duration.max(0.0);
        self.hover_emissive_boost = emissive_boost;
        self
    }

    /// Builder pattern: Set click pulse duration and peak scale
    pub fn with_click_pulse(mut self, duration: f32, peak_scale: f32) -> Self {
        self.click_pulse = duration.max(0.0);
        self.click_pulse_scale = peak_scale;
        self
    }

    /// Builder pattern: Set pointer tilt amplitude and transition duration
    pub fn with_pointer_tilt(mut self, max_tilt: f32, duration: f32) -> Self {
        self.pointer_tilt = max_tilt;
        self.pointer_tilt_transition = duration.max(0.0);
        self
    }

    /// Builder pattern: Enable or disable reduced motion
    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    /// Builder pattern: Set the clear color
    pub fn with_clear_color(mut self, r: f64, g: f64, b: f64, a: f64) -> Self {
        self.clear_color = [r, g, b, a];
        self
    }

    /// Builder pattern: Cap the frame delta; non-positive or non-finite values remove the cap
    pub fn with_max_frame_delta(mut self, seconds: f32) -> Self {
        self.max_frame_delta = (seconds.is_finite() && seconds > 0.0).then_some(seconds);
        self
    }

    /// Transition duration honoring reduced motion
    pub(crate) fn effective_duration(&self, duration: f32) -> f32 {
        if self.reduced_motion {
            0.0
        } else {
            duration
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_device_pixel_ratio, 2.0);
        assert!(!config.reduced_motion);
        assert_eq!(config.max_frame_delta, None);
    }

    #[test]
    fn test_frame_delta_ceiling() {
        assert_eq!(EngineConfig::new().with_max_frame_delta(0.25).max_frame_delta, Some(0.25));
        assert_eq!(EngineConfig::new().with_max_frame_delta(0.0).max_frame_delta, None);
        assert_eq!(EngineConfig::new().with_max_frame_delta(f32::NAN).max_frame_delta, None);
    }

    #[test]
    fn test_builder_clamps() {
        let config = EngineConfig::new()
            .with_max_device_pixel_ratio(0.5)
            .with_hover(-1.0, 2.0)
            .with_reduced_motion(true);
        assert_eq!(config.max_device_pixel_ratio, 1.0);
        assert_eq!(config.hover_transition, 0.0);
        assert_eq!(config.effective_duration(0.4), 0.0);
    }
}
