mod common;

use common::{mounted, pump};
use lumen::{
    input::{from_normalized_coords, to_normalized_coords, Ndc, SurfaceRect},
    EngineConfig,
};

#[test]
fn test_normalized_round_trip() {
    let rect = SurfaceRect::new(40.0, 25.0, 640.0, 360.0);
    for &(x, y) in &[(40.0, 25.0), (360.0, 205.0), (679.0, 384.0), (100.5, 300.25)] {
        let ndc = to_normalized_coords(x, y, &rect).unwrap();
        assert!((-1.0..=1.0).contains(&ndc.x) && (-1.0..=1.0).contains(&ndc.y));
        let (bx, by) = from_normalized_coords(ndc, &rect);
        assert!((bx - x).abs() < 1e-3, "x {x} came back as {bx}");
        assert!((by - y).abs() < 1e-3, "y {y} came back as {by}");
    }
}

#[test]
fn test_corners_and_orientation() {
    let rect = SurfaceRect::sized(200.0, 100.0);
    assert_eq!(to_normalized_coords(0.0, 0.0, &rect), Some(Ndc::new(-1.0, 1.0)));
    assert_eq!(to_normalized_coords(100.0, 50.0, &rect), Some(Ndc::new(0.0, 0.0)));
    assert_eq!(to_normalized_coords(200.0, 100.0, &rect), Some(Ndc::new(1.0, -1.0)));
}

#[test]
fn test_degenerate_input_rejected() {
    let rect = SurfaceRect::sized(200.0, 100.0);
    assert_eq!(to_normalized_coords(f32::NAN, 10.0, &rect), None);
    assert_eq!(to_normalized_coords(-5.0, 10.0, &rect), None);
    assert_eq!(to_normalized_coords(10.0, 10.0, &SurfaceRect::sized(0.0, 100.0)), None);
}

#[test]
fn test_pointer_off_surface_hovers_nothing() {
    let mut lc = mounted(EngineConfig::default());
    lc.pointer_moved(400.0, 300.0);
    pump(&mut lc, 1, 1.0 / 60.0);
    assert!(lc.driver().input().hovered.is_some());

    lc.pointer_moved(-20.0, 300.0);
    assert!(lc.pointer().position().is_none());
    pump(&mut lc, 1, 1.0 / 60.0);
    assert!(lc.driver().input().hovered.is_none());
}

#[test]
fn test_pointer_corner_misses_sphere() {
    let mut lc = mounted(EngineConfig::default());
    lc.pointer_moved(5.0, 5.0);
    pump(&mut lc, 1, 1.0 / 60.0);
    assert!(lc.driver().input().pointer.is_some());
    assert!(lc.driver().input().hovered.is_none());
}
