#![allow(dead_code)]

use cgmath::Vector3;
use lumen::{
    animation::motion::Motion,
    compositions::Composition,
    frame::ManualFrameScheduler,
    gfx::{
        backend::RecordingSurface,
        geometry::{build_sphere, SphereParams},
        material::Material,
        scene::{ObjectDesc, SceneBuilder},
    },
    input::{SurfaceRect, SurfaceSize},
    EngineConfig, Lifecycle, Result,
};

pub type TestLifecycle = Lifecycle<RecordingSurface, ManualFrameScheduler>;

pub const ANGULAR_VELOCITY: f32 = 1.3;
pub const BASE_ANGLE: f32 = 0.25;

/// One spinning, hoverable sphere at the origin
pub struct Spinner;

impl Composition for Spinner {
    fn name(&self) -> &str {
        "spinner"
    }

    fn blueprint(&self, _config: &EngineConfig) -> Result<SceneBuilder> {
        let mut builder = SceneBuilder::new(self.name());
        let mesh = builder.add_geometry("ball", build_sphere(&SphereParams::new(1.0, 16, 12))?);
        let material = builder.add_material(Material::emissive_accent([0.3, 0.6, 1.0], 0.5));
        let root = builder.root();
        builder.add_object(
            root,
            ObjectDesc::mesh("spinner", mesh, material)
                .with_motion(Motion::Spin {
                    axis: Vector3::unit_y(),
                    base_angle: BASE_ANGLE,
                    angular_velocity: ANGULAR_VELOCITY,
                })
                .hoverable(),
        );
        Ok(builder)
    }
}

pub fn size() -> SurfaceSize {
    SurfaceSize::new(800.0, 600.0, 1.0)
}

pub fn rect() -> SurfaceRect {
    SurfaceRect::sized(800.0, 600.0)
}

pub fn lifecycle(surface: RecordingSurface, config: EngineConfig) -> TestLifecycle {
    Lifecycle::new(surface, ManualFrameScheduler::new(), config)
}

pub fn mounted(config: EngineConfig) -> TestLifecycle {
    let mut lifecycle = lifecycle(RecordingSurface::new(), config);
    lifecycle
        .mount(&Spinner, size(), rect())
        .expect("mount should succeed");
    lifecycle
}

/// Delivers `count` frames of `dt` seconds through the scheduler
pub fn pump(lifecycle: &mut TestLifecycle, count: usize, dt: f64) {
    for _ in 0..count {
        let request = lifecycle
            .scheduler_mut()
            .next_due()
            .expect("a frame should be pending");
        lifecycle.on_frame(request, dt).expect("frame should render");
    }
}
