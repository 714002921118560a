// Host-side tests for drag rotation, orbit controls and the camera.

use glam::{Vec2, Vec3};
use wellaver_core::*;

#[test]
fn drag_pitch_saturates_at_thirty_degrees() {
    let limit = 30f32.to_radians();
    let mut d = DragRotation::default();
    d.pointer_down(Vec2::new(100.0, 100.0));
    for i in 1..=50 {
        d.pointer_move(Vec2::new(100.0, 100.0 + 20.0 * i as f32));
    }
    assert_eq!(d.pitch, limit);

    for i in 1..=100 {
        d.pointer_move(Vec2::new(100.0, 1100.0 - 20.0 * i as f32));
    }
    assert_eq!(d.pitch, -limit);
}

#[test]
fn drag_yaw_is_unrestricted() {
    let mut d = DragRotation::default();
    d.rotate_by(10.0, 0.0);
    d.rotate_by(10.0, 0.0);
    assert!((d.yaw - 20.0).abs() < 1e-5);
    assert_eq!(d.pitch, 0.0);
}

#[test]
fn drag_moves_without_pointer_down_are_ignored() {
    let mut d = DragRotation::default();
    d.pointer_move(Vec2::new(300.0, 300.0));
    assert_eq!(d.yaw, 0.0);
    d.pointer_down(Vec2::ZERO);
    d.pointer_up();
    d.pointer_move(Vec2::new(50.0, 0.0));
    assert_eq!(d.yaw, 0.0);
}

#[test]
fn drag_delta_scales_by_sensitivity() {
    let mut d = DragRotation::default();
    d.pointer_down(Vec2::new(10.0, 10.0));
    d.pointer_move(Vec2::new(20.0, 15.0));
    assert!((d.yaw - 0.1).abs() < 1e-6);
    assert!((d.pitch - 0.05).abs() < 1e-6);
}

#[test]
fn drag_reset_keeps_tuning() {
    let mut d = DragRotation {
        speed: 0.5,
        ..DragRotation::default()
    };
    d.rotate_by(1.0, 0.2);
    d.reset();
    assert_eq!(d.yaw, 0.0);
    assert_eq!(d.pitch, 0.0);
    assert_eq!(d.speed, 0.5);
    assert!(!d.active);
}

#[test]
fn orbit_round_trips_camera_placement() {
    let mut o = OrbitControls::default();
    let eye = Vec3::new(2.0, 1.6, 2.0);
    let target = Vec3::new(0.0, 0.5, 0.0);
    o.set_from_camera(eye, target);
    assert!(o.eye().abs_diff_eq(eye, 1e-4));
    assert_eq!(o.target, target);
}

#[test]
fn orbit_rotation_is_damped_over_updates() {
    let mut o = OrbitControls::default();
    o.set_from_camera(Vec3::new(0.0, 1.0, 3.0), Vec3::new(0.0, 1.0, 0.0));
    let start = o.azimuth;
    o.pointer_down(Vec2::ZERO);
    o.pointer_move(Vec2::new(-100.0, 0.0));
    o.pointer_up();

    o.update();
    let first = o.azimuth - start;
    // 100 px * 0.005 rad/px, a tenth applied on the first update
    assert!((first - 0.05).abs() < 1e-5);
    for _ in 0..300 {
        o.update();
    }
    assert!((o.azimuth - start - 0.5).abs() < 1e-3);
}

#[test]
fn orbit_radius_is_preserved_by_rotation() {
    let mut o = OrbitControls::default();
    let r = o.radius;
    o.pointer_down(Vec2::ZERO);
    o.pointer_move(Vec2::new(37.0, -12.0));
    for _ in 0..20 {
        o.update();
    }
    assert!(((o.eye() - o.target).length() - r).abs() < 1e-4);
}

#[test]
fn orbit_polar_never_reaches_the_poles() {
    let mut o = OrbitControls::default();
    o.pointer_down(Vec2::ZERO);
    o.pointer_move(Vec2::new(0.0, 10_000.0));
    for _ in 0..500 {
        o.update();
    }
    assert!(o.polar > 0.0);
    assert!(o.polar < std::f32::consts::PI);
    assert!(o.eye().is_finite());
}

#[test]
fn orbit_zoom_is_clamped() {
    let mut o = OrbitControls::default();
    let r = o.radius;
    o.zoom(1.0);
    assert!(o.radius > r);
    o.zoom(-2.0);
    assert!(o.radius < r);
    for _ in 0..1000 {
        o.zoom(5.0);
    }
    assert_eq!(o.radius, o.max_distance);
    for _ in 0..1000 {
        o.zoom(-5.0);
    }
    assert_eq!(o.radius, o.min_distance);
}

#[test]
fn camera_aspect_follows_viewport() {
    let mut c = Camera::default();
    c.set_viewport(1920, 1080);
    assert!((c.aspect - 16.0 / 9.0).abs() < 1e-5);
    // Zero-sized viewports keep the last valid aspect.
    c.set_viewport(0, 600);
    assert!((c.aspect - 16.0 / 9.0).abs() < 1e-5);
}

#[test]
fn camera_projects_target_to_screen_center() {
    let c = Camera {
        eye: Vec3::new(2.0, 1.6, 2.0),
        target: Vec3::new(0.0, 0.5, 0.0),
        ..Camera::default()
    };
    let ndc = c.view_projection().project_point3(c.target);
    assert!(ndc.x.abs() < 1e-5);
    assert!(ndc.y.abs() < 1e-5);
    assert!(ndc.z > 0.0 && ndc.z < 1.0);
}
