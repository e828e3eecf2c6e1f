// Host-side tests for bounding boxes, planes, rays and camera picking.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
#[path = "../src/engine/mod.rs"]
mod engine;

use engine::*;
use glam::{Vec2, Vec3};

fn approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

#[test]
fn aabb_grows_to_cover_points() {
    let mut b = Aabb::empty();
    for p in [
        Vec3::new(-1.0, 0.0, 2.0),
        Vec3::new(3.0, 4.0, -2.0),
        Vec3::new(0.0, 1.0, 0.0),
    ] {
        b.expand_to(p);
    }
    assert_eq!(b.min, Vec3::new(-1.0, 0.0, -2.0));
    assert_eq!(b.max, Vec3::new(3.0, 4.0, 2.0));
    assert_eq!(b.center(), Vec3::new(1.0, 2.0, 0.0));
    assert_eq!(b.size(), Vec3::new(4.0, 4.0, 4.0));
}

#[test]
fn empty_aabb_has_zero_size() {
    let b = Aabb::empty();
    assert!(b.is_empty());
    assert_eq!(b.size(), Vec3::ZERO);
    let mut grown = b;
    grown.expand_to(Vec3::ONE);
    assert!(!grown.is_empty());
    assert_eq!(grown.min, grown.max);
}

#[test]
fn aabb_scale_then_translate() {
    let b = Aabb::new(Vec3::new(-1.0, -2.0, 0.0), Vec3::new(1.0, 2.0, 0.5));
    let moved = b.scaled_translated(2.0, Vec3::new(0.0, 1.0, 0.0));
    assert!(approx(moved.min, Vec3::new(-2.0, -3.0, 0.0)));
    assert!(approx(moved.max, Vec3::new(2.0, 5.0, 1.0)));
}

#[test]
fn ray_hits_plane_in_front() {
    let plane = Plane::from_normal_and_point(Vec3::Z, Vec3::new(0.0, 0.0, 1.0));
    let ray = Ray::new(Vec3::new(0.5, 0.5, 5.0), Vec3::new(0.0, 0.0, -1.0));
    let hit = ray.intersect_plane(&plane).expect("hit");
    assert!(approx(hit, Vec3::new(0.5, 0.5, 1.0)));
}

#[test]
fn parallel_ray_misses_plane() {
    let plane = Plane::from_normal_and_point(Vec3::Z, Vec3::ZERO);
    let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::X);
    assert_eq!(ray.intersect_plane(&plane), None);
}

#[test]
fn parallel_ray_on_plane_hits_at_origin() {
    let plane = Plane::from_normal_and_point(Vec3::Z, Vec3::ZERO);
    let ray = Ray::new(Vec3::new(1.0, 2.0, 0.0), Vec3::Y);
    assert_eq!(ray.intersect_plane(&plane), Some(Vec3::new(1.0, 2.0, 0.0)));
}

#[test]
fn plane_behind_ray_is_a_miss() {
    let plane = Plane::from_normal_and_point(Vec3::Z, Vec3::new(0.0, 0.0, 10.0));
    let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
    assert_eq!(ray.intersect_plane(&plane), None);
}

#[test]
fn center_ndc_ray_points_at_camera_target() {
    let mut cam = Camera::initial(16.0 / 9.0);
    cam.eye = Vec3::new(1.0, 2.0, 5.0);
    cam.target = Vec3::new(1.0, 2.0, 0.0);
    let ray = cam.ray_through_ndc(Vec2::ZERO);
    assert!(approx(ray.origin, cam.eye));
    assert!(approx(ray.direction, Vec3::new(0.0, 0.0, -1.0)));
}

#[test]
fn ndc_ray_projects_back_to_same_ndc() {
    let cam = Camera::initial(1.5);
    let ndc = Vec2::new(0.4, -0.7);
    let ray = cam.ray_through_ndc(ndc);
    let p = cam.view_projection().project_point3(ray.at(2.5));
    assert!((p.x - ndc.x).abs() < 1e-3);
    assert!((p.y - ndc.y).abs() < 1e-3);
}

#[test]
fn initial_camera_looks_down_negative_z() {
    let cam = Camera::initial(1.0);
    assert_eq!(cam.eye, Vec3::new(0.0, 1.6, 3.0));
    assert!(approx(cam.target - cam.eye, Vec3::new(0.0, 0.0, -1.0)));
    assert!((cam.fovy_radians - 50f32.to_radians()).abs() < 1e-6);
}

#[test]
fn invalid_aspect_falls_back_to_square() {
    let mut cam = Camera::initial(f32::NAN);
    assert_eq!(cam.aspect, 1.0);
    cam.set_aspect(0.0);
    assert_eq!(cam.aspect, 1.0);
    cam.set_aspect(2.0);
    assert_eq!(cam.aspect, 2.0);
}

#[test]
fn framing_uses_height_fit_for_tall_objects() {
    let mut cam = Camera::initial(1.0);
    let bounds = Aabb::new(Vec3::new(-0.2, 0.0, -0.1), Vec3::new(0.2, 2.0, 0.1));
    cam.frame_bounds(&bounds, 1.15, 0.0);
    let expected = 2.0 * 1.15 / (2.0 * (25f32.to_radians()).tan());
    assert!(approx(cam.target, Vec3::new(0.0, 1.0, 0.0)));
    assert!(approx(cam.eye, Vec3::new(0.0, 1.0, expected)));
}

#[test]
fn framing_width_term_scales_with_aspect() {
    let bounds = Aabb::new(Vec3::new(-2.0, 0.0, 0.0), Vec3::new(2.0, 0.5, 0.0));
    let mut cam = Camera::initial(2.0);
    cam.frame_bounds(&bounds, 1.0, 0.0);
    let expected = 4.0 / (2.0 * (25f32.to_radians()).tan()) * 2.0;
    assert!((cam.eye.z - expected).abs() < 1e-3);
}

#[test]
fn framing_raises_look_point_by_align_fraction() {
    let mut cam = Camera::initial(1.0);
    let bounds = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 1.0));
    cam.frame_bounds(&bounds, 1.15, 0.01);
    assert!((cam.target.y - (1.0 + 0.02)).abs() < 1e-6);
    assert!((cam.eye.y - cam.target.y).abs() < 1e-6);
}
