// Host-side tests for the bowing session: scene pipeline, pointer input,
// audio gating and per-frame smoothing working together.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
#[path = "../src/engine/mod.rs"]
mod engine;

use engine::*;
use glam::{Vec2, Vec3};

fn in_rect(rect: &BowRect, p: Vec2) -> bool {
    (rect.min.x..=rect.max.x).contains(&p.x) && (rect.min.y..=rect.max.y).contains(&p.y)
}

#[derive(Default)]
struct FakeTrack {
    playing: bool,
    plays: usize,
    pauses: usize,
    rewinds: usize,
}

impl Playback for FakeTrack {
    fn play(&mut self) {
        self.playing = true;
        self.plays += 1;
    }
    fn pause(&mut self) {
        self.playing = false;
        self.pauses += 1;
    }
    fn is_paused(&self) -> bool {
        !self.playing
    }
    fn rewind(&mut self) {
        self.rewinds += 1;
    }
}

const RECT: CanvasRect = CanvasRect {
    left: 0.0,
    top: 0.0,
    width: 800.0,
    height: 800.0,
};
const CENTER: Vec2 = Vec2::new(400.0, 400.0);

fn violin_bounds() -> Aabb {
    Aabb::new(Vec3::new(-0.2, -0.6, -0.05), Vec3::new(0.2, 0.6, 0.05))
}

fn ready_session() -> BowSession {
    let mut s = BowSession::new(SessionParams::default(), 1.0);
    let layout = s.install_instrument(&violin_bounds());
    assert!(s.install_bow(layout.place_bow(s.params())));
    s
}

fn unlock(s: &mut BowSession, track: &mut FakeTrack) {
    assert!(s.request_unlock());
    track.play();
    s.finish_unlock(true, track);
}

fn visual(s: &BowSession) -> Vec3 {
    s.bow().map(|b| b.visual).unwrap_or(Vec3::NAN)
}

#[test]
fn stages_advance_in_order() {
    let mut s = BowSession::new(SessionParams::default(), 1.5);
    assert!(s.layout().is_none());
    assert!(!s.install_bow(BowPlacement {
        scale: 1.0,
        rest: Vec3::ZERO
    }));
    assert!(s.layout().is_none() && s.bow().is_none());

    let layout = s.install_instrument(&violin_bounds());
    assert!(s.layout().is_some() && s.bow().is_none());

    let placement = layout.place_bow(s.params());
    assert!(s.install_bow(placement));
    assert!(!s.install_bow(placement), "bow already attached");
    assert_eq!(s.bow().map(|b| b.visual), Some(placement.rest));
}

#[test]
fn instrument_layout_is_fixed_after_first_install() {
    let mut s = BowSession::new(SessionParams::default(), 1.0);
    let first = s.install_instrument(&violin_bounds());
    let other = Aabb::new(Vec3::splat(-5.0), Vec3::splat(5.0));
    let second = s.install_instrument(&other);
    assert_eq!(first.scale, second.scale);
    assert_eq!(first.bounds, second.bounds);
}

#[test]
fn camera_is_framed_as_soon_as_instrument_is_placed() {
    let mut s = BowSession::new(SessionParams::default(), 1.0);
    let initial = s.camera().eye;
    assert_eq!(initial, Vec3::from_array(CAMERA_INITIAL_EYE));

    // No bow yet: the violin must already be in view
    let layout = s.install_instrument(&violin_bounds());
    let c = layout.bounds.center();
    assert!((s.camera().target.x - c.x).abs() < 1e-4);
    assert!((s.camera().target.y - (c.y + FRAME_ALIGN_Y * layout.bounds.size().y)).abs() < 1e-4);
    assert!(s.camera().eye.z > layout.plane_z);
    assert_ne!(s.camera().eye, initial);

    // Attaching the bow leaves the camera where it is
    let framed = s.camera().eye;
    assert!(s.install_bow(layout.place_bow(s.params())));
    assert_eq!(s.camera().eye, framed);
}

#[test]
fn input_before_bow_is_harmless() {
    let mut s = BowSession::new(SessionParams::default(), 1.0);
    let mut track = FakeTrack::default();
    s.press_start(CENTER, RECT, 0.0, &mut track);
    s.pointer_move(CENTER + Vec2::new(50.0, 0.0), RECT, 16.0, &mut track);
    assert_eq!(s.frame(32.0, &mut track), None);
    assert!(s.bow_model_matrix().is_none());

    s.install_instrument(&violin_bounds());
    s.pointer_move(CENTER + Vec2::new(90.0, 0.0), RECT, 48.0, &mut track);
    assert_eq!(s.frame(64.0, &mut track), None);
}

#[test]
fn press_snaps_bow_and_holds_still() {
    let mut s = ready_session();
    let mut track = FakeTrack::default();
    let rest = visual(&s);

    s.press_start(CENTER, RECT, 0.0, &mut track);
    let snapped = visual(&s);
    assert!(snapped.distance(rest) > 1e-3);
    let rect = s.layout().unwrap().rect;
    assert!(in_rect(&rect, snapped.truncate()));
    assert!((snapped.z - s.layout().unwrap().plane_z).abs() < 1e-4);

    for i in 1..10 {
        let p = s.frame(i as f64 * 16.0, &mut track).unwrap();
        assert!(p.distance(snapped) < 1e-6);
    }
}

#[test]
fn drag_converges_geometrically() {
    let mut s = ready_session();
    let mut track = FakeTrack::default();
    s.press_start(CENTER, RECT, 0.0, &mut track);
    assert_eq!(
        s.pointer_move(CENTER + Vec2::new(60.0, -40.0), RECT, 16.0, &mut track),
        Motion::Active
    );
    let target = s.bow().unwrap().target;

    let mut dist = visual(&s).distance(target);
    assert!(dist > 1e-3);
    for i in 0..8 {
        s.frame(32.0 + i as f64 * 16.0, &mut track);
        let next = visual(&s).distance(target);
        assert!((next - dist * (1.0 - BOW_SMOOTHING)).abs() < 1e-4);
        dist = next;
    }
}

#[test]
fn jitter_does_not_move_the_bow() {
    let mut s = ready_session();
    let mut track = FakeTrack::default();
    s.press_start(CENTER, RECT, 0.0, &mut track);
    let target = s.bow().unwrap().target;
    assert_eq!(
        s.pointer_move(CENTER + Vec2::new(2.0, 0.0), RECT, 16.0, &mut track),
        Motion::Jitter
    );
    assert_eq!(s.bow().unwrap().target, target);
}

#[test]
fn zero_area_canvas_skips_retarget() {
    let mut s = ready_session();
    let mut track = FakeTrack::default();
    let rest = visual(&s);
    let empty = CanvasRect::new(0.0, 0.0, 0.0, 0.0);
    s.press_start(CENTER, empty, 0.0, &mut track);
    assert_eq!(s.bow().unwrap().target, rest);
}

#[test]
fn first_press_unlocks_without_sound() {
    let mut s = ready_session();
    let mut track = FakeTrack::default();
    assert!(s.press_start(CENTER, RECT, 0.0, &mut track));
    assert_eq!(track.plays, 0);
    assert_eq!(s.playback_state(&track), PlaybackState::Locked);

    // The unlock cycle resolves while the pointer is still down
    track.play();
    s.finish_unlock(true, &mut track);
    assert_eq!(s.playback_state(&track), PlaybackState::Paused);

    s.pointer_move(CENTER + Vec2::new(20.0, 0.0), RECT, 30.0, &mut track);
    assert_eq!(s.playback_state(&track), PlaybackState::Playing);
}

#[test]
fn pending_unlock_is_not_requested_twice() {
    let mut s = ready_session();
    let mut track = FakeTrack::default();
    assert!(s.request_unlock());
    assert!(!s.press_start(CENTER, RECT, 0.0, &mut track));
}

#[test]
fn motionless_hold_pauses_after_idle_window() {
    let mut s = ready_session();
    let mut track = FakeTrack::default();
    unlock(&mut s, &mut track);

    s.press_start(CENTER, RECT, 1000.0, &mut track);
    assert_eq!(track.rewinds, 1);
    assert_eq!(s.playback_state(&track), PlaybackState::Playing);

    s.frame(1100.0, &mut track);
    assert_eq!(s.playback_state(&track), PlaybackState::Playing);
    s.frame(1000.0 + IDLE_PAUSE_MS + 5.0, &mut track);
    assert_eq!(s.playback_state(&track), PlaybackState::Paused);

    // Jitter keeps it paused, real motion resumes without a rewind
    s.pointer_move(CENTER + Vec2::new(1.0, 1.0), RECT, 1200.0, &mut track);
    assert_eq!(s.playback_state(&track), PlaybackState::Paused);
    s.pointer_move(CENTER + Vec2::new(30.0, 0.0), RECT, 1216.0, &mut track);
    assert_eq!(s.playback_state(&track), PlaybackState::Playing);
    assert_eq!(track.rewinds, 1);
}

#[test]
fn release_pauses_and_stops_idle_tracking() {
    let mut s = ready_session();
    let mut track = FakeTrack::default();
    unlock(&mut s, &mut track);
    s.press_start(CENTER, RECT, 0.0, &mut track);
    s.press_end(&mut track);
    assert_eq!(s.playback_state(&track), PlaybackState::Paused);
    let pauses = track.pauses;

    s.frame(5_000.0, &mut track);
    assert_eq!(track.pauses, pauses);
    assert_eq!(
        s.pointer_move(CENTER + Vec2::new(80.0, 0.0), RECT, 5_016.0, &mut track),
        Motion::Ignored
    );
}

#[test]
fn resize_updates_projection_aspect() {
    let mut s = ready_session();
    s.resize(2.0);
    assert_eq!(s.camera().aspect, 2.0);
}
