//! Eased transitions triggered by discrete events.
//!
//! A [`PendingTransition`] interpolates one scalar property from `start` to `end`.
//! [`TransitionSet`] holds at most one in-flight transition per property: starting a
//! new one supersedes the old one and begins from the property's current value, so
//! an interrupted hover fade continues from where it was instead of jumping.

use std::collections::HashMap;

use super::easing::Easing;
use crate::gfx::scene::{MaterialId, NodeId};

/// Rotation axis used by pointer tilt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TiltAxis {
    /// About X, driven by vertical pointer position
    Pitch,
    /// About Y, driven by horizontal pointer position
    Yaw,
}

/// The property a transition animates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionTarget {
    /// Emissive intensity added on top of a material's resting value
    EmissiveBoost(MaterialId),
    /// Extra rotation of a node, in radians
    Tilt(NodeId, TiltAxis),
    /// Click pulse amount of a node (0 = rest, 1 = peak)
    PulseScale(NodeId),
}

impl TransitionTarget {
    /// Value of the property when nothing has animated it
    pub fn rest_value(&self) -> f32 {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    Running,
    Complete,
}

/// An in-flight eased interpolation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingTransition {
    pub target: TransitionTarget,
    pub start: f32,
    pub end: f32,
    pub duration: f32,
    pub elapsed: f32,
    pub easing: Easing,
    phase: TransitionPhase,
}

impl PendingTransition {
    pub fn new(
        target: TransitionTarget,
        start: f32,
        end: f32,
        duration: f32,
        easing: Easing,
    ) -> Self {
        Self {
            target,
            start,
            end,
            duration: if duration.is_finite() { duration.max(0.0) } else { 0.0 },
            elapsed: 0.0,
            easing,
            phase: TransitionPhase::Idle,
        }
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    /// Idle -> Running; a zero-length transition completes immediately
    pub fn begin(&mut self) {
        if self.phase != TransitionPhase::Idle {
            return;
        }
        self.phase = if self.duration <= 0.0 {
            TransitionPhase::Complete
        } else {
            TransitionPhase::Running
        };
    }

    /// Accumulates `dt` while running and returns the new phase
    pub fn advance(&mut self, dt: f32) -> TransitionPhase {
        if self.phase == TransitionPhase::Running && dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
            if self.elapsed >= self.duration {
                self.elapsed = self.duration;
                self.phase = TransitionPhase::Complete;
            }
        }
        self.phase
    }

    /// `elapsed / duration` clamped to [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 || self.phase == TransitionPhase::Complete {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn value(&self) -> f32 {
        self.start + (self.end - self.start) * self.easing.apply(self.progress())
    }
}

/// At most one transition per target, plus the settled values of finished ones
#[derive(Debug, Default)]
pub struct TransitionSet {
    active: HashMap<TransitionTarget, PendingTransition>,
    settled: HashMap<TransitionTarget, f32>,
}

impl TransitionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a property
    pub fn value(&self, target: TransitionTarget) -> f32 {
        self.active
            .get(&target)
            .map(PendingTransition::value)
            .or_else(|| self.settled.get(&target).copied())
            .unwrap_or_else(|| target.rest_value())
    }

    /// Where the property is heading (the current value if nothing is running)
    pub fn destination(&self, target: TransitionTarget) -> f32 {
        self.active
            .get(&target)
            .map(|t| t.end)
            .unwrap_or_else(|| self.value(target))
    }

    /// Starts a transition from the current value towards `end`, superseding any
    /// transition already running for `target`.
    pub fn start(&mut self, target: TransitionTarget, end: f32, duration: f32, easing: Easing) {
        let start = self.value(target);
        let mut transition = PendingTransition::new(target, start, end, duration, easing);
        transition.begin();

        if self.active.remove(&target).is_some() {
            log::trace!("superseding transition on {target:?} at {start}");
        }

        if transition.phase() == TransitionPhase::Complete {
            self.settle(target, transition.value());
        } else {
            self.settled.remove(&target);
            self.active.insert(target, transition);
        }
    }

    /// Advances every running transition and returns the ones that completed
    pub fn advance(&mut self, dt: f32) -> Vec<(TransitionTarget, f32)> {
        let mut completed = Vec::new();
        for (target, transition) in self.active.iter_mut() {
            if transition.advance(dt) == TransitionPhase::Complete {
                completed.push((*target, transition.value()));
            }
        }
        for (target, value) in &completed {
            self.active.remove(target);
            self.settle(*target, *value);
        }
        completed
    }

    fn settle(&mut self, target: TransitionTarget, value: f32) {
        if value == target.rest_value() {
            self.settled.remove(&target);
        } else {
            self.settled.insert(target, value);
        }
    }

    pub fn is_active(&self, target: TransitionTarget) -> bool {
        self.active.contains_key(&target)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn get(&self, target: TransitionTarget) -> Option<&PendingTransition> {
        self.active.get(&target)
    }

    /// Targets that currently differ from rest, running or settled
    pub fn targets(&self) -> impl Iterator<Item = TransitionTarget> + '_ {
        self.active
            .keys()
            .chain(self.settled.keys().filter(|t| !self.active.contains_key(*t)))
            .copied()
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.settled.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn material_target() -> TransitionTarget {
        let mut ids: SlotMap<MaterialId, ()> = SlotMap::with_key();
        TransitionTarget::EmissiveBoost(ids.insert(()))
    }

    #[test]
    fn test_state_machine() {
        let target = material_target();
        let mut t = PendingTransition::new(target, 0.0, 1.0, 1.0, Easing::Linear);
        assert_eq!(t.phase(), TransitionPhase::Idle);
        assert_eq!(t.advance(0.5), TransitionPhase::Idle);

        t.begin();
        assert_eq!(t.advance(0.25), TransitionPhase::Running);
        assert!((t.value() - 0.25).abs() < 1e-6);
        assert_eq!(t.advance(10.0), TransitionPhase::Complete);
        assert_eq!(t.value(), 1.0);
        // Completed transitions are not resumed
        t.begin();
        assert_eq!(t.phase(), TransitionPhase::Complete);
    }

    #[test]
    fn test_zero_duration_completes() {
        let target = material_target();
        let mut set = TransitionSet::new();
        set.start(target, 2.0, 0.0, Easing::Linear);
        assert!(!set.is_active(target));
        assert_eq!(set.value(target), 2.0);
    }

    #[test]
    fn test_supersede_starts_from_current_value() {
        let target = material_target();
        let mut set = TransitionSet::new();

        set.start(target, 1.0, 1.0, Easing::Linear);
        set.advance(0.4);
        let partial = set.value(target);
        assert!((partial - 0.4).abs() < 1e-6);

        set.start(target, 0.0, 1.0, Easing::Linear);
        assert_eq!(set.active_count(), 1);
        let reversing = set.get(target).unwrap();
        assert!((reversing.start - partial).abs() < 1e-6);
        assert!((set.value(target) - partial).abs() < 1e-6);

        set.advance(0.5);
        assert!((set.value(target) - partial * 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_completion_settles() {
        let target = material_target();
        let mut set = TransitionSet::new();
        set.start(target, 1.5, 0.2, Easing::EaseOutCubic);
        let done = set.advance(0.3);
        assert_eq!(done, vec![(target, 1.5)]);
        assert_eq!(set.active_count(), 0);
        assert_eq!(set.value(target), 1.5);
        assert_eq!(set.targets().count(), 1);

        set.start(target, 0.0, 0.0, Easing::Linear);
        assert_eq!(set.targets().count(), 0);
    }
}
