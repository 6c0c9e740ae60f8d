//! # Animation
//!
//! Time-driven state of a mounted scene.
//!
//! - [`clock`] - per-scene monotonic elapsed time
//! - [`easing`] - easing curves for transitions
//! - [`motion`] - closed-form procedural motion (spin, bob, sway, orbit)
//! - [`particles`] - seeded particle fields whose positions are functions of time
//! - [`transition`] - eased transitions triggered by discrete events
//! - [`driver`] - the per-frame update that ties them to a scene and a backend
//!
//! Everything procedural is a pure function of the clock value, so pausing the
//! frame loop or skipping renders never desynchronizes motion.

pub mod clock;
pub mod driver;
pub mod easing;
pub mod motion;
pub mod particles;
pub mod transition;

pub use clock::AnimationClock;
pub use driver::{AnimationDriver, FrameOutcome, InputState};
pub use easing::Easing;
pub use motion::{Motion, Oscillation};
pub use particles::{ParticleField, ParticleFieldDesc};
pub use transition::{PendingTransition, TransitionPhase, TransitionSet, TransitionTarget};
