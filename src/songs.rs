use crate::engine::{SongRegistry, SONG_QUERY_PARAM, SONG_REGISTRY_GLOBAL};
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

/// Read the page-published registry (`window[SONG_REGISTRY_GLOBAL]`), an
/// object of `id -> { audio }`. Malformed entries are skipped.
pub fn read_registry(window: &web::Window) -> SongRegistry {
    let mut registry = SongRegistry::new();
    let Ok(raw) = js_sys::Reflect::get(window, &JsValue::from_str(SONG_REGISTRY_GLOBAL)) else {
        return registry;
    };
    if !raw.is_object() {
        log::warn!("[song] no registry published on window.{}", SONG_REGISTRY_GLOBAL);
        return registry;
    }
    let table: js_sys::Object = raw.unchecked_into();
    for entry in js_sys::Object::entries(&table).iter() {
        let pair = js_sys::Array::from(&entry);
        let Some(id) = pair.get(0).as_string() else {
            continue;
        };
        let audio = js_sys::Reflect::get(&pair.get(1), &JsValue::from_str("audio"))
            .ok()
            .and_then(|v| v.as_string());
        match audio {
            Some(audio) => registry.insert(id, audio),
            None => log::warn!("[song] entry {} has no audio path", id),
        }
    }
    if registry.is_empty() {
        log::warn!("[song] window.{} lists no playable songs", SONG_REGISTRY_GLOBAL);
    } else {
        log::info!("[song] registry lists {} songs", registry.len());
    }
    registry
}

pub fn requested_song_id(window: &web::Window) -> Option<String> {
    let search = window.location().search().ok()?;
    web::UrlSearchParams::new_with_str(&search)
        .ok()?
        .get(SONG_QUERY_PARAM)
}
