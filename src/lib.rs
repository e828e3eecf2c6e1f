#![cfg(target_arch = "wasm32")]
use crate::engine::{
    BowSession, SessionParams, CANVAS_ID, MENU_PAGE, SONG_NOT_FOUND_MESSAGE,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod assets;
mod audio;
mod dom;
mod engine;
mod events;
mod frame;
mod render;
mod songs;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("violin-bow starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    // Song selection is fatal when unresolved: nothing else is set up
    let registry = songs::read_registry(&window);
    let requested = songs::requested_song_id(&window);
    let song = match registry.resolve(requested.as_deref()) {
        Ok(song) => song,
        Err(e) => {
            dom::alert(SONG_NOT_FOUND_MESSAGE);
            dom::redirect(MENU_PAGE);
            return Err(e.into());
        }
    };
    log::info!("[song] playing {} ({})", song.id, song.audio);

    let src = String::from(js_sys::encode_uri(&song.audio));
    let player = audio::TrackPlayer::new(&src)?;
    player.wire_error_report();

    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", CANVAS_ID))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    // Maintain canvas internal pixel size to match CSS size * devicePixelRatio
    dom::sync_canvas_backing_size(&canvas);

    let session = Rc::new(RefCell::new(BowSession::new(
        SessionParams::default(),
        dom::canvas_aspect(&canvas),
    )));

    events::wire_unlock_on_first_pointerdown(&session, &player);
    dom::suppress_default_gestures(&canvas);
    events::wire_pointer_handlers(events::PointerWiring {
        canvas: canvas.clone(),
        session: session.clone(),
        player: player.clone(),
    });
    dom::wire_resize(&canvas, &session);

    let gpu = frame::init_gpu(&canvas).await;
    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        session,
        player,
        canvas,
        gpu,
    }));
    frame::start_loop(frame_ctx.clone());

    assets::load_scene(frame_ctx).await;
    Ok(())
}
