use crate::engine::{BowSession, CanvasRect, MAX_PIXEL_RATIO};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn listener_options(passive: bool, once: bool) -> web::AddEventListenerOptions {
    let opts = web::AddEventListenerOptions::new();
    opts.set_passive(passive);
    opts.set_once(once);
    opts
}

/// Register `handler` for `event` and leak the closure for the page lifetime.
pub fn listen<E>(
    target: &web::EventTarget,
    event: &str,
    opts: &web::AddEventListenerOptions,
    handler: impl FnMut(E) + 'static,
) where
    E: JsCast + 'static,
    E: wasm_bindgen::convert::FromWasmAbi,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    if let Err(e) = target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        closure.as_ref().unchecked_ref(),
        opts,
    ) {
        log::warn!("[dom] could not listen for {}: {:?}", event, e);
    }
    closure.forget();
}

pub fn canvas_rect(canvas: &web::HtmlCanvasElement) -> CanvasRect {
    let r = canvas.get_bounding_client_rect();
    CanvasRect::new(
        r.left() as f32,
        r.top() as f32,
        r.width() as f32,
        r.height() as f32,
    )
}

pub fn canvas_aspect(canvas: &web::HtmlCanvasElement) -> f32 {
    let r = canvas.get_bounding_client_rect();
    (r.width() / r.height().max(1.0)) as f32
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio().min(MAX_PIXEL_RATIO);
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
}

/// Keep the backing store and camera aspect in step with the window.
pub fn wire_resize(canvas: &web::HtmlCanvasElement, session: &Rc<RefCell<BowSession>>) {
    let Some(window) = web::window() else {
        return;
    };
    let canvas = canvas.clone();
    let session = session.clone();
    listen(
        &window,
        "resize",
        &listener_options(true, false),
        move |_: web::Event| {
            sync_canvas_backing_size(&canvas);
            session.borrow_mut().resize(canvas_aspect(&canvas));
        },
    );
}

/// Stop the browser from zooming, scrolling or panning over the canvas.
pub fn suppress_default_gestures(canvas: &web::HtmlCanvasElement) {
    _ = canvas.style().set_property("touch-action", "none");
    let opts = listener_options(false, false);
    for event in ["wheel", "gesturestart", "gesturechange", "gestureend"] {
        listen(canvas, event, &opts, |ev: web::Event| ev.prevent_default());
    }
}

pub fn alert(message: &str) {
    if let Some(w) = web::window() {
        _ = w.alert_with_message(message);
    }
}

pub fn redirect(href: &str) {
    if let Some(w) = web::window() {
        if let Err(e) = w.location().set_href(href) {
            log::error!("[dom] redirect to {} failed: {:?}", href, e);
        }
    }
}
