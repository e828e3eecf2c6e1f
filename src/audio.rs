use crate::dom;
use crate::engine::{BowSession, Playback};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

/// The song's `<audio>` element as seen by the audio gate.
#[derive(Clone)]
pub struct TrackPlayer {
    el: web::HtmlAudioElement,
}

impl TrackPlayer {
    /// `src` must already be URI-encoded.
    pub fn new(src: &str) -> anyhow::Result<Self> {
        let el = web::HtmlAudioElement::new_with_src(src)
            .map_err(|e| anyhow::anyhow!("HtmlAudioElement error: {:?}", e))?;
        el.set_preload("auto");
        Ok(Self { el })
    }

    /// Log and alert when the track cannot be fetched or decoded. The page
    /// keeps running without sound.
    pub fn wire_error_report(&self) {
        let el = self.el.clone();
        dom::listen(
            &self.el,
            "error",
            &dom::listener_options(true, false),
            move |_: web::Event| {
                let src = el.src();
                log::error!("[audio] could not load {}", src);
                dom::alert(&format!("Could not load the audio:\n{}", src));
            },
        );
    }

    /// Run the muted play-then-pause cycle that satisfies autoplay policy.
    /// The caller must have claimed the attempt from the session first.
    pub fn run_unlock(&self, session: Rc<RefCell<BowSession>>) {
        self.el.set_muted(true);
        let promise = match self.el.play() {
            Ok(p) => p,
            Err(e) => {
                log::debug!("[audio] unlock rejected synchronously: {:?}", e);
                self.el.set_muted(false);
                session.borrow_mut().finish_unlock(false, &mut self.clone());
                return;
            }
        };
        let mut player = self.clone();
        spawn_local(async move {
            let outcome = JsFuture::from(promise).await;
            session.borrow_mut().finish_unlock(outcome.is_ok(), &mut player);
            player.el.set_muted(false);
            match outcome {
                Ok(_) => log::info!("[audio] playback unlocked"),
                Err(e) => log::debug!("[audio] unlock attempt failed, will retry: {:?}", e),
            }
        });
    }
}

impl Playback for TrackPlayer {
    fn play(&mut self) {
        match self.el.play() {
            Ok(promise) => spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    log::debug!("[audio] play rejected: {:?}", e);
                }
            }),
            Err(e) => log::debug!("[audio] play rejected: {:?}", e),
        }
    }

    fn pause(&mut self) {
        if let Err(e) = self.el.pause() {
            log::debug!("[audio] pause failed: {:?}", e);
        }
    }

    fn is_paused(&self) -> bool {
        self.el.paused()
    }

    fn rewind(&mut self) {
        self.el.set_current_time(0.0);
    }
}
