//! Ordered scene loading: instrument (with camera framing), then bow.
//!
//! Each stage consumes the previous stage's result, so the bow can only be
//! placed once the instrument layout exists. A failed stage is logged and
//! the page continues with whatever was already installed.

use crate::engine::{
    parse_glb, BowPlacement, InstrumentLayout, ModelData, SessionParams, BOW_MODEL_PATH,
    VIOLIN_MODEL_PATH,
};
use crate::frame::FrameContext;
use crate::render::SceneSlot;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

pub struct InstrumentStage {
    pub model: ModelData,
    pub layout: InstrumentLayout,
}

pub struct BowStage {
    pub model: ModelData,
    pub placement: BowPlacement,
}

pub async fn fetch_bytes(path: &str) -> anyhow::Result<Vec<u8>> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let resp: web::Response = JsFuture::from(window.fetch_with_str(path))
        .await
        .map_err(|e| anyhow::anyhow!("fetch {} failed: {:?}", path, e))?
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    if !resp.ok() {
        anyhow::bail!("fetch {} returned HTTP {}", path, resp.status());
    }
    let body = resp
        .array_buffer()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let buf = JsFuture::from(body)
        .await
        .map_err(|e| anyhow::anyhow!("reading {} failed: {:?}", path, e))?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

pub async fn load_model(path: &str) -> anyhow::Result<ModelData> {
    let bytes = fetch_bytes(path).await?;
    let model = parse_glb(path, &bytes)?;
    log::info!(
        "[assets] {} loaded: {} meshes, bounds {:?}..{:?}",
        path,
        model.meshes.len(),
        model.bounds.min,
        model.bounds.max
    );
    Ok(model)
}

pub async fn load_instrument(params: &SessionParams) -> anyhow::Result<InstrumentStage> {
    let model = load_model(VIOLIN_MODEL_PATH).await?;
    let layout = InstrumentLayout::fit(&model.bounds, params);
    Ok(InstrumentStage { model, layout })
}

pub async fn load_bow(
    instrument: &InstrumentStage,
    params: &SessionParams,
) -> anyhow::Result<BowStage> {
    let model = load_model(BOW_MODEL_PATH).await?;
    Ok(BowStage {
        model,
        placement: instrument.layout.place_bow(params),
    })
}

/// Run the pipeline against a live frame context.
pub async fn load_scene(ctx: Rc<RefCell<FrameContext<'static>>>) {
    let params = ctx.borrow().session.borrow().params().clone();

    let instrument = match load_instrument(&params).await {
        Ok(stage) => stage,
        Err(e) => {
            log::error!("[assets] violin load failed: {:?}", e);
            return;
        }
    };
    {
        let mut c = ctx.borrow_mut();
        // Frames the camera too, so the violin shows while the bow downloads
        c.session.borrow_mut().install_instrument(&instrument.model.bounds);
        if let Some(g) = &mut c.gpu {
            g.upload_model(SceneSlot::Violin, &instrument.model, instrument.layout.model_matrix());
        }
    }

    match load_bow(&instrument, &params).await {
        Ok(bow) => {
            let mut c = ctx.borrow_mut();
            let installed = c.session.borrow_mut().install_bow(bow.placement);
            if installed {
                if let Some(g) = &mut c.gpu {
                    g.upload_model(
                        SceneSlot::Bow,
                        &bow.model,
                        bow.placement.model_matrix(bow.placement.rest),
                    );
                }
            }
        }
        Err(e) => log::error!("[assets] bow load failed: {:?}", e),
    }

    log::info!("[assets] scene ready");
}
