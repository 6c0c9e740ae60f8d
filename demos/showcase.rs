//! # Showcase
//!
//! Opens a window with one of the built-in compositions.
//!
//! ```text
//! cargo run --example showcase -- globe
//! RUST_LOG=lumen=debug cargo run --example showcase -- robot --reduced-motion
//! ```
//!
//! Move the pointer to hover and tilt, click to pulse, scroll to dolly the camera,
//! press `M` to toggle reduced motion and `Esc` to quit.

use anyhow::bail;
use lumen::{compositions, EngineConfig, ShowcaseApp};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("lumen=info"))
        .init();

    let mut name = "hero_emblem".to_string();
    let mut config = EngineConfig::default();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--reduced-motion" => config = config.with_reduced_motion(true),
            other => name = other.to_string(),
        }
    }

    let Some(composition) = compositions::by_name(&name) else {
        bail!("unknown composition '{name}' (try hero_emblem, globe, robot or deal_map)");
    };

    ShowcaseApp::new(composition)
        .with_config(config.with_clear_color(0.02, 0.02, 0.05, 1.0))
        .run()
}
