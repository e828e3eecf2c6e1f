use crate::audio::TrackPlayer;
use crate::dom;
use crate::engine::{BowSession, Motion};
use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys as web;

#[derive(Clone)]
pub struct PointerWiring {
    pub canvas: web::HtmlCanvasElement,
    pub session: Rc<RefCell<BowSession>>,
    pub player: TrackPlayer,
}

pub fn wire_pointer_handlers(w: PointerWiring) {
    wire_pointerdown(&w);
    wire_pointermove(&w);
    wire_press_end(&w);
}

/// Backup unlock on the very first pointer-down anywhere on the page.
pub fn wire_unlock_on_first_pointerdown(session: &Rc<RefCell<BowSession>>, player: &TrackPlayer) {
    let Some(window) = web::window() else {
        return;
    };
    let session = session.clone();
    let player = player.clone();
    dom::listen(
        &window,
        "pointerdown",
        &dom::listener_options(true, true),
        move |_: web::PointerEvent| {
            let claimed = session.borrow_mut().request_unlock();
            if claimed {
                player.run_unlock(session.clone());
            }
        },
    );
}

#[inline]
fn client_pos(ev: &web::PointerEvent) -> Vec2 {
    Vec2::new(ev.client_x() as f32, ev.client_y() as f32)
}

#[inline]
fn prevent(ev: &web::PointerEvent) {
    if ev.cancelable() {
        ev.prevent_default();
    }
}

fn wire_pointerdown(w: &PointerWiring) {
    let w2 = w.clone();
    dom::listen(
        &w.canvas,
        "pointerdown",
        &dom::listener_options(false, false),
        move |ev: web::PointerEvent| {
            let rect = dom::canvas_rect(&w2.canvas);
            let mut player = w2.player.clone();
            let unlock = w2.session.borrow_mut().press_start(
                client_pos(&ev),
                rect,
                instant::now(),
                &mut player,
            );
            if unlock {
                player.run_unlock(w2.session.clone());
            }
            prevent(&ev);
        },
    );
}

fn wire_pointermove(w: &PointerWiring) {
    let w2 = w.clone();
    dom::listen(
        &w.canvas,
        "pointermove",
        &dom::listener_options(false, false),
        move |ev: web::PointerEvent| {
            let rect = dom::canvas_rect(&w2.canvas);
            let mut player = w2.player.clone();
            let motion = w2.session.borrow_mut().pointer_move(
                client_pos(&ev),
                rect,
                instant::now(),
                &mut player,
            );
            if motion != Motion::Ignored {
                prevent(&ev);
            }
        },
    );
}

/// Release, cancel and leave on the canvas, plus a window-level pointer-up
/// for drags that end outside it.
fn wire_press_end(w: &PointerWiring) {
    let opts = dom::listener_options(false, false);
    for event in ["pointerup", "pointercancel", "pointerleave"] {
        listen_press_end(&w.canvas, event, &opts, w);
    }
    if let Some(window) = web::window() {
        listen_press_end(&window, "pointerup", &opts, w);
    }
}

fn listen_press_end(
    target: &web::EventTarget,
    event: &str,
    opts: &web::AddEventListenerOptions,
    w: &PointerWiring,
) {
    let w2 = w.clone();
    dom::listen(target, event, opts, move |ev: web::PointerEvent| {
        let mut player = w2.player.clone();
        let mut session = w2.session.borrow_mut();
        session.press_end(&mut player);
        log::debug!("[audio] {} -> {:?}", ev.type_(), session.playback_state(&player));
        prevent(&ev);
    });
}
