//! # Compositions
//!
//! The decorative visuals mounted by hosts. Each composition turns its own parameters
//! plus the engine configuration into a [`SceneBuilder`]; the lifecycle controller
//! builds and runs it.
//!
//! - [`HeroEmblem`] - extruded letterforms in a glass frame with an orbiting ring
//! - [`Globe`] - a spinning globe with orbit rings, pulsing markers and drifting dust
//! - [`Robot`] - a small hierarchical figure with glowing eyes and swinging arms
//! - [`DealMap`] - a grid of tiles with phase-shifted emissive pulses

pub mod deal_map;
pub mod globe;
pub mod hero_emblem;
pub mod robot;

pub use deal_map::DealMap;
pub use globe::Globe;
pub use hero_emblem::HeroEmblem;
pub use robot::Robot;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::gfx::{light::Light, scene::SceneBuilder};

/// A visual that can be assembled into a scene
pub trait Composition {
    fn name(&self) -> &str;

    /// Registers geometries, materials and nodes; nothing touches the GPU yet
    fn blueprint(&self, config: &EngineConfig) -> Result<SceneBuilder>;
}

/// Looks a composition up by name
pub fn by_name(name: &str) -> Option<Box<dyn Composition>> {
    match name {
        "hero_emblem" | "hero" => Some(Box::new(HeroEmblem::default())),
        "globe" => Some(Box::new(Globe::default())),
        "robot" => Some(Box::new(Robot::default())),
        "deal_map" | "map" => Some(Box::new(DealMap::default())),
        _ => None,
    }
}

/// Key, fill and rim lights shared by every composition
pub(crate) fn studio_lights(accent: [f32; 3]) -> [Light; 4] {
    [
        Light::ambient([1.0, 1.0, 1.0], 0.25),
        Light::directional([-0.4, -0.8, -0.6], [1.0, 0.97, 0.92], 1.1),
        Light::directional([0.6, -0.2, 0.5], [0.6, 0.7, 1.0], 0.35),
        Light::point([0.0, 1.5, 3.0], accent, 2.0, 12.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::RecordingBackend;

    #[test]
    fn test_every_composition_builds() {
        let config = EngineConfig::default();
        for name in ["hero_emblem", "globe", "robot", "deal_map"] {
            let composition = by_name(name).unwrap();
            let mut backend = RecordingBackend::new(320, 240);
            let scene = composition
                .blueprint(&config)
                .unwrap()
                .build(&mut backend)
                .unwrap();

            let stats = scene.statistics();
            assert!(stats.total_triangles > 0, "{name} has no triangles");
            assert!(!scene.hit_candidates().is_empty(), "{name} has nothing to hover");
            assert_eq!(
                backend.ledger().live_resources(),
                stats.geometry_count + stats.material_count
            );
        }
        assert!(by_name("splash").is_none());
    }
}
