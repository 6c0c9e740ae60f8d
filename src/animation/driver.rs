//! Animation Driver.
//!
//! [`AnimationDriver::frame`] runs once per presented frame and always in the same
//! order: advance the clock, evaluate closed-form motion and scroll links, apply
//! transitions, hit-test the pointer, render. All per-frame state lives in the
//! driver (clock, input, transitions) and the scene it is handed, so the update is
//! a plain function of those two values and the frame delta.

use cgmath::Vector3;

use super::{
    clock::AnimationClock,
    easing::Easing,
    transition::{TiltAxis, TransitionSet, TransitionTarget},
};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::gfx::{
    backend::RenderBackend,
    scene::{MaterialId, NodeId, Scene},
    transform::{axis_angle, Transform},
};
use crate::input::pointer::{hit_test, Ndc};

/// Smallest change in pointer tilt that starts a new transition
const TILT_EPSILON: f32 = 1e-4;

/// Input signals, overwritten by the host between frames
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputState {
    /// Pointer position over the surface, `None` when outside
    pub pointer: Option<Ndc>,
    /// Object under the pointer as of the last frame
    pub hovered: Option<NodeId>,
    /// Pitch and yaw the tilt node is heading to
    pub tilt_target: (f32, f32),
    /// Host scroll progress in [0, 1]
    pub scroll_progress: f32,
    /// A click arrived since the last frame
    pub pending_click: bool,
}

/// Result of one driver invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    Rendered {
        time: f32,
        hovered: Option<NodeId>,
        clicked: Option<NodeId>,
    },
    /// The driver is stopped or the frame was stale
    Skipped,
}

#[derive(Debug)]
pub struct AnimationDriver {
    config: EngineConfig,
    clock: AnimationClock,
    transitions: TransitionSet,
    input: InputState,
    running: bool,
    /// Next frame contributes no time (after a resume)
    hold_clock: bool,
    frames_rendered: u64,
}

impl AnimationDriver {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            clock: AnimationClock::new(),
            transitions: TransitionSet::new(),
            input: InputState::default(),
            running: false,
            hold_clock: false,
            frames_rendered: 0,
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.hold_clock = self.clock.ticks() > 0;
        }
    }

    /// Halts the loop; frames delivered afterwards are skipped
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Makes the next frame contribute no elapsed time
    pub fn hold_clock(&mut self) {
        self.hold_clock = true;
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn transitions(&self) -> &TransitionSet {
        &self.transitions
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.config.reduced_motion = reduced;
    }

    pub fn pointer_moved(&mut self, pointer: Option<Ndc>) {
        self.input.pointer = pointer;
    }

    pub fn clicked(&mut self) {
        self.input.pending_click = true;
    }

    pub fn set_scroll_progress(&mut self, progress: f32) {
        if progress.is_finite() {
            self.input.scroll_progress = progress.clamp(0.0, 1.0);
        }
    }

    /// Clears time, input and transitions for a freshly built scene
    pub fn reset(&mut self) {
        self.clock.reset();
        self.transitions.clear();
        self.input = InputState::default();
        self.hold_clock = false;
        self.frames_rendered = 0;
    }

    /// Runs one frame with a delta of `dt` seconds
    pub fn frame(
        &mut self,
        scene: &mut Scene,
        backend: &mut dyn RenderBackend,
        dt: f64,
    ) -> Result<FrameOutcome> {
        if !self.running {
            return Ok(FrameOutcome::Skipped);
        }

        // Clock
        let dt = if std::mem::take(&mut self.hold_clock) || !dt.is_finite() {
            0.0
        } else {
            match self.config.max_frame_delta {
                Some(max) => dt.clamp(0.0, f64::from(max)),
                None => dt.max(0.0),
            }
        };
        let t = if self.config.reduced_motion {
            self.clock.seconds()
        } else {
            self.clock.advance(dt)
        };

        // Procedural motion and scroll
        scene.apply_scroll(self.input.scroll_progress);

        // Transitions
        for (target, value) in self.transitions.advance(dt as f32) {
            if let TransitionTarget::PulseScale(_) = target {
                if value > 0.0 {
                    let settle = self.config.effective_duration(self.config.click_pulse * 0.5);
                    self.transitions
                        .start(target, 0.0, settle, Easing::EaseInOutQuad);
                }
            }
        }
        self.apply_materials(scene, t);
        let transitions = &self.transitions;
        let pulse_peak = self.config.click_pulse_scale;
        scene.update_world_transforms(t, |id| overlay(transitions, pulse_peak, id));

        // Hit testing
        let hovered = self
            .input
            .pointer
            .and_then(|ndc| hit_test(ndc, scene.camera(), &scene.hit_targets()))
            .map(|hit| hit.node);
        self.update_hover(scene, hovered);
        self.update_tilt(scene);
        let clicked = self.take_click(hovered);

        // Render
        backend.render(&scene.render_frame(self.config.clear_color))?;
        self.frames_rendered += 1;

        Ok(FrameOutcome::Rendered {
            time: t,
            hovered,
            clicked,
        })
    }

    /// Sets every animated material's emissive intensity from its resting or
    /// oscillating value plus the hover boost
    fn apply_materials(&self, scene: &mut Scene, t: f32) {
        let updates: Vec<(MaterialId, Option<f32>)> = scene
            .nodes()
            .filter(|(_, node)| node.animates_material())
            .filter_map(|(_, node)| {
                let material = node.material?;
                Some((material, node.emissive.map(|pulse| pulse.sample(t))))
            })
            .collect();

        for (id, oscillating) in updates {
            let boost = self.transitions.value(TransitionTarget::EmissiveBoost(id));
            if let Some(material) = scene.material_mut(id) {
                let base = oscillating.unwrap_or_else(|| material.baseline_emissive());
                material.set_emissive_intensity((base + boost).max(0.0));
            }
        }
    }

    fn update_hover(&mut self, scene: &Scene, hovered: Option<NodeId>) {
        if hovered == self.input.hovered {
            return;
        }
        let duration = self.config.effective_duration(self.config.hover_transition);
        let material_of = |id: Option<NodeId>| id.and_then(|n| scene.node(n)).and_then(|n| n.material);

        if let Some(material) = material_of(self.input.hovered) {
            self.transitions.start(
                TransitionTarget::EmissiveBoost(material),
                0.0,
                duration,
                Easing::EaseInOutQuad,
            );
        }
        if let Some(material) = material_of(hovered) {
            self.transitions.start(
                TransitionTarget::EmissiveBoost(material),
                self.config.hover_emissive_boost,
                duration,
                Easing::EaseInOutQuad,
            );
        }
        log::debug!("hover {:?} -> {:?}", self.input.hovered, hovered);
        self.input.hovered = hovered;
    }

    fn update_tilt(&mut self, scene: &Scene) {
        let Some(node) = scene.tilt_node() else {
            return;
        };
        let max = self.config.pointer_tilt;
        let (pitch, yaw) = self
            .input
            .pointer
            .map_or((0.0, 0.0), |ndc| (-ndc.y * max, ndc.x * max));
        self.input.tilt_target = (pitch, yaw);

        let duration = self
            .config
            .effective_duration(self.config.pointer_tilt_transition);
        for (axis, value) in [(TiltAxis::Pitch, pitch), (TiltAxis::Yaw, yaw)] {
            let target = TransitionTarget::Tilt(node, axis);
            if (self.transitions.destination(target) - value).abs() > TILT_EPSILON {
                self.transitions
                    .start(target, value, duration, Easing::EaseOutCubic);
            }
        }
    }

    fn take_click(&mut self, hovered: Option<NodeId>) -> Option<NodeId> {
        if !std::mem::take(&mut self.input.pending_click) {
            return None;
        }
        let node = hovered?;
        let rise = self.config.effective_duration(self.config.click_pulse * 0.5);
        if rise > 0.0 {
            self.transitions.start(
                TransitionTarget::PulseScale(node),
                1.0,
                rise,
                Easing::EaseOutQuad,
            );
        }
        Some(node)
    }
}

/// Tilt and pulse offsets of a node
fn overlay(transitions: &TransitionSet, pulse_peak: f32, id: NodeId) -> Transform {
    let pitch = transitions.value(TransitionTarget::Tilt(id, TiltAxis::Pitch));
    let yaw = transitions.value(TransitionTarget::Tilt(id, TiltAxis::Yaw));
    let pulse = transitions.value(TransitionTarget::PulseScale(id));
    if pitch == 0.0 && yaw == 0.0 && pulse == 0.0 {
        return Transform::identity();
    }

    Transform {
        rotation: axis_angle(Vector3::unit_y(), yaw) * axis_angle(Vector3::unit_x(), pitch),
        ..Transform::identity().with_scale(1.0 + (pulse_peak - 1.0) * pulse)
    }
}
