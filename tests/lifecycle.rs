mod common;

use common::{lifecycle, mounted, pump, rect, size, Spinner};
use lumen::{
    animation::{FrameOutcome, InputState},
    frame::FrameScheduler,
    gfx::backend::{BackendEvent, RecordingSurface},
    input::SurfaceSize,
    EngineConfig, LifecycleState, SceneError,
};

#[test]
fn test_mount_then_unmount_leaves_nothing_behind() {
    let mut lc = mounted(EngineConfig::default());
    assert_eq!(lc.state(), LifecycleState::Running);
    assert_eq!(lc.scheduler().pending(), 1);
    assert!(lc.surface().ledger().live_resources() > 0);

    lc.unmount();
    assert_eq!(lc.state(), LifecycleState::Unmounted);
    assert!(lc.scene().is_none());
    assert!(lc.pending_frame().is_none());
    assert!(!lc.pointer().is_attached());
    assert_eq!(lc.scheduler().pending(), 0);

    let ledger = lc.surface().ledger();
    assert_eq!(ledger.live_resources(), 0);
    assert_eq!(ledger.contexts_live, 0);
}

#[test]
fn test_unmount_is_idempotent() {
    let mut lc = mounted(EngineConfig::default());
    lc.unmount();
    lc.unmount();
    let ledger = lc.surface().ledger();
    assert_eq!(ledger.count(|e| *e == BackendEvent::ContextReleased), 1);
}

#[test]
fn test_context_failure_rolls_back() {
    let mut lc = lifecycle(RecordingSurface::new().without_context(), EngineConfig::default());
    let result = lc.mount(&Spinner, size(), rect());

    assert!(matches!(result, Err(SceneError::ContextUnavailable(_))));
    assert_eq!(lc.state(), LifecycleState::Unmounted);
    assert_eq!(lc.scheduler().pending(), 0);
    assert!(lc.viewport().is_none());
    assert!(!lc.pointer().is_attached());
    assert_eq!(lc.surface().ledger().contexts_live, 0);
}

#[test]
fn test_upload_failure_releases_partial_scene() {
    // Spinner needs one geometry and one material
    let mut lc = lifecycle(
        RecordingSurface::new().with_upload_budget(1),
        EngineConfig::default(),
    );
    let result = lc.mount(&Spinner, size(), rect());

    assert!(matches!(result, Err(SceneError::ResourceExhaustion(_))));
    assert_eq!(lc.state(), LifecycleState::Unmounted);
    assert_eq!(lc.scheduler().pending(), 0);

    let ledger = lc.surface().ledger();
    assert_eq!(ledger.live_resources(), 0);
    assert_eq!(ledger.contexts_live, 0);
    assert_eq!(ledger.events.last(), Some(&BackendEvent::ContextReleased));
}

#[test]
fn test_mount_twice_rejected() {
    let mut lc = mounted(EngineConfig::default());
    let result = lc.mount(&Spinner, size(), rect());
    assert!(matches!(result, Err(SceneError::InvalidState { .. })));
    assert_eq!(lc.state(), LifecycleState::Running);
}

#[test]
fn test_remount_after_unmount() {
    let mut lc = mounted(EngineConfig::default());
    pump(&mut lc, 10, 1.0 / 60.0);
    lc.unmount();

    lc.mount(&Spinner, size(), rect()).unwrap();
    assert_eq!(lc.driver().clock().ticks(), 0);
    pump(&mut lc, 1, 1.0 / 60.0);
    assert_eq!(lc.surface().ledger().contexts_live, 1);
}

#[test]
fn test_release_order_mirrors_acquisition() {
    let mut lc = mounted(EngineConfig::default());
    pump(&mut lc, 3, 1.0 / 60.0);
    lc.unmount();

    #[derive(Debug, PartialEq)]
    enum Key {
        Geometry(lumen::gfx::scene::GeometryId),
        Material(lumen::gfx::scene::MaterialId),
    }

    let ledger = lc.surface().ledger();
    let uploads: Vec<Key> = ledger
        .events
        .iter()
        .filter_map(|e| match e {
            BackendEvent::GeometryUploaded(id) => Some(Key::Geometry(*id)),
            BackendEvent::MaterialUploaded(id) => Some(Key::Material(*id)),
            _ => None,
        })
        .collect();
    let mut releases: Vec<Key> = ledger
        .events
        .iter()
        .filter_map(|e| match e {
            BackendEvent::GeometryReleased(id) => Some(Key::Geometry(*id)),
            BackendEvent::MaterialReleased(id) => Some(Key::Material(*id)),
            _ => None,
        })
        .collect();
    releases.reverse();

    assert_eq!(uploads, releases);
    assert_eq!(ledger.events.first(), Some(&BackendEvent::ContextCreated { width: 800, height: 600 }));
    assert_eq!(ledger.events.last(), Some(&BackendEvent::ContextReleased));
}

#[test]
fn test_stale_frame_after_stop_is_ignored() {
    let mut lc = mounted(EngineConfig::default());
    pump(&mut lc, 2, 1.0 / 60.0);

    let request = lc.pending_frame().unwrap();
    lc.stop();
    assert_eq!(lc.scheduler().pending(), 0);

    let rendered = lc.surface().ledger().frames_rendered;
    let outcome = lc.on_frame(request, 1.0 / 60.0).unwrap();
    assert_eq!(outcome, FrameOutcome::Skipped);
    assert_eq!(lc.surface().ledger().frames_rendered, rendered);
    assert!(lc.pending_frame().is_none());

    lc.start().unwrap();
    assert_eq!(lc.scheduler().pending(), 1);
}

#[test]
fn test_frame_after_unmount_is_ignored() {
    let mut lc = mounted(EngineConfig::default());
    let request = lc.pending_frame().unwrap();
    lc.unmount();
    assert_eq!(lc.on_frame(request, 0.016).unwrap(), FrameOutcome::Skipped);
    assert_eq!(lc.surface().ledger().frames_rendered, 0);
}

#[test]
fn test_input_ignored_unless_running() {
    let mut lc = lifecycle(RecordingSurface::new(), EngineConfig::default());
    lc.pointer_moved(400.0, 300.0);
    lc.click();
    lc.set_scroll_progress(0.8);
    lc.pointer_left();
    assert_eq!(*lc.driver().input(), InputState::default());

    let mut lc = mounted(EngineConfig::default());
    lc.set_scroll_progress(0.8);
    lc.unmount();
    lc.set_scroll_progress(0.2);
    lc.pointer_left();
    assert_eq!(lc.driver().input().scroll_progress, 0.8);
}

#[test]
fn test_start_requires_running() {
    let mut lc = lifecycle(RecordingSurface::new(), EngineConfig::default());
    assert!(matches!(lc.start(), Err(SceneError::InvalidState { .. })));
}

#[test]
fn test_each_frame_requests_exactly_one_more() {
    let mut lc = mounted(EngineConfig::default());
    pump(&mut lc, 25, 1.0 / 60.0);
    assert_eq!(lc.scheduler().pending(), 1);
    assert_eq!(lc.scheduler().requested_total(), 26);
    assert_eq!(lc.surface().ledger().frames_rendered, 25);
}

#[test]
fn test_hidden_surface_pauses_without_time_jump() {
    let mut lc = mounted(EngineConfig::default());
    pump(&mut lc, 30, 1.0 / 60.0);
    let before = lc.driver().clock().seconds();

    lc.set_visible(false);
    assert_eq!(lc.scheduler().pending(), 0);
    assert!(lc.pending_frame().is_none());

    lc.set_visible(true);
    assert_eq!(lc.scheduler().pending(), 1);
    // The host reports the whole hidden interval on the first frame back
    pump(&mut lc, 1, 0.09);
    assert!((lc.driver().clock().seconds() - before).abs() < 1e-6);

    pump(&mut lc, 1, 0.05);
    assert!((lc.driver().clock().seconds() - before - 0.05).abs() < 1e-5);
}

#[test]
fn test_render_failure_tears_down() {
    let mut lc = lifecycle(RecordingSurface::new().with_failing_render(), EngineConfig::default());
    lc.mount(&Spinner, size(), rect()).unwrap();

    let request = lc.scheduler_mut().next_due().unwrap();
    let result = lc.on_frame(request, 0.016);
    assert!(matches!(result, Err(SceneError::ResourceExhaustion(_))));
    assert_eq!(lc.state(), LifecycleState::Unmounted);

    let ledger = lc.surface().ledger();
    assert_eq!(ledger.live_resources(), 0);
    assert_eq!(ledger.contexts_live, 0);
}

#[test]
fn test_resize_is_idempotent() {
    let mut lc = mounted(EngineConfig::default());
    assert!(!lc.resize(size(), rect()));

    let larger = SurfaceSize::new(1024.0, 640.0, 1.0);
    assert!(lc.resize(larger, rect()));
    assert!(!lc.resize(larger, rect()));

    let ledger = lc.surface().ledger();
    assert_eq!(ledger.count(|e| matches!(e, BackendEvent::Resized { .. })), 1);
    assert_eq!(ledger.size, (1024, 640));
}

#[test]
fn test_resize_updates_camera_aspect_and_layout() {
    let mut lc = mounted(EngineConfig::default());
    let narrow = SurfaceSize::new(400.0, 800.0, 3.0);
    assert!(lc.resize(narrow, rect()));

    let viewport = lc.viewport().unwrap();
    assert_eq!(viewport.pixel_ratio, 2.0);
    assert_eq!((viewport.physical_width, viewport.physical_height), (800, 1600));

    let scene = lc.scene().unwrap();
    assert!((scene.camera().aspect - 0.5).abs() < 1e-6);
    assert!((scene.layout_scale() - 0.7).abs() < 1e-6);
}

#[test]
fn test_drop_tears_down() {
    let surface = RecordingSurface::new();
    let ledger = surface.ledger_handle();
    {
        let mut lc = lifecycle(surface, EngineConfig::default());
        lc.mount(&Spinner, size(), rect()).unwrap();
        assert_eq!(ledger.borrow().contexts_live, 1);
    }
    assert_eq!(ledger.borrow().contexts_live, 0);
    assert_eq!(ledger.borrow().live_resources(), 0);
}
