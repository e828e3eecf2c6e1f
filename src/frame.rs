use crate::audio::TrackPlayer;
use crate::engine::BowSession;
use crate::render;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext<'a> {
    pub session: Rc<RefCell<BowSession>>,
    pub player: TrackPlayer,
    pub canvas: web::HtmlCanvasElement,
    pub gpu: Option<render::GpuState<'a>>,
}

impl FrameContext<'_> {
    /// One animation tick: idle check, bow smoothing, draw.
    pub fn frame(&mut self) {
        let now = instant::now();
        let (view_proj, bow_matrix) = {
            let mut session = self.session.borrow_mut();
            session.frame(now, &mut self.player);
            (session.camera().view_projection(), session.bow_model_matrix())
        };

        let Some(g) = &mut self.gpu else {
            return;
        };
        g.set_view_projection(view_proj);
        if let Some(m) = bow_matrix {
            g.set_bow_transform(m);
        }
        g.resize_if_needed(self.canvas.width(), self.canvas.height());
        match g.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => g.reconfigure(),
            Err(e) => log::error!("[render] frame error: {:?}", e),
        }
    }
}

pub async fn init_gpu(canvas: &web::HtmlCanvasElement) -> Option<render::GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    match render::GpuState::new(leaked_canvas).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("[render] WebGPU init error: {:?}", e);
            None
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext<'static>>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx.borrow_mut().frame();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = tick.borrow().as_ref() {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
