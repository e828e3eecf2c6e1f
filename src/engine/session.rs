use super::audio_gate::{AudioGate, Playback, PlaybackState};
use super::bow::{BowMotion, BowPlacement, CanvasRect, InstrumentLayout};
use super::camera::Camera;
use super::constants::*;
use super::geometry::Aabb;
use super::input::{Motion, PointerTracker};
use glam::{Mat4, Vec2, Vec3};

/// Tunables for one bowing session.
#[derive(Clone, Debug)]
pub struct SessionParams {
    pub min_motion_px: f32,
    pub idle_pause_ms: f64,
    pub bow_smoothing: f32,
    pub plane_offset_z: f32,
    pub bounds_margin: f32,
    pub instrument_height: f32,
    pub instrument_drop: f32,
    pub min_model_height: f32,
    pub bow_scale_ratio: f32,
    pub bow_rest_height: f32,
    pub frame_margin: f32,
    pub frame_align_y: f32,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            min_motion_px: MIN_MOTION_PX,
            idle_pause_ms: IDLE_PAUSE_MS,
            bow_smoothing: BOW_SMOOTHING,
            plane_offset_z: BOW_PLANE_OFFSET_Z,
            bounds_margin: BOW_BOUNDS_MARGIN,
            instrument_height: INSTRUMENT_HEIGHT,
            instrument_drop: INSTRUMENT_DROP,
            min_model_height: MIN_MODEL_HEIGHT,
            bow_scale_ratio: BOW_SCALE_RATIO,
            bow_rest_height: BOW_REST_HEIGHT,
            frame_margin: FRAME_MARGIN,
            frame_align_y: FRAME_ALIGN_Y,
        }
    }
}

/// How far scene loading has progressed. Bow state only exists in `Ready`.
#[derive(Clone, Debug, Default)]
pub enum SceneStage {
    #[default]
    Loading,
    Instrument(InstrumentLayout),
    Ready {
        layout: InstrumentLayout,
        bow: BowMotion,
    },
}

/// All interaction state of the page: pointer, audio gate, camera and the
/// loaded scene. The web glue owns exactly one of these.
pub struct BowSession {
    params: SessionParams,
    pointer: PointerTracker,
    gate: AudioGate,
    camera: Camera,
    stage: SceneStage,
}

impl BowSession {
    pub fn new(params: SessionParams, aspect: f32) -> Self {
        Self {
            pointer: PointerTracker::new(params.min_motion_px),
            gate: AudioGate::new(params.idle_pause_ms),
            camera: Camera::initial(aspect),
            stage: SceneStage::Loading,
            params,
        }
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn layout(&self) -> Option<&InstrumentLayout> {
        match &self.stage {
            SceneStage::Loading => None,
            SceneStage::Instrument(layout) | SceneStage::Ready { layout, .. } => Some(layout),
        }
    }

    pub fn bow(&self) -> Option<&BowMotion> {
        match &self.stage {
            SceneStage::Ready { bow, .. } => Some(bow),
            _ => None,
        }
    }

    pub fn playback_state(&self, sink: &impl Playback) -> PlaybackState {
        self.gate.state(sink)
    }

    // ---------------- Scene pipeline ----------------

    /// Place the instrument from its raw bounds and frame the camera on it.
    /// Only the first call has an effect; layout and camera are fixed
    /// afterwards.
    pub fn install_instrument(&mut self, raw_bounds: &Aabb) -> InstrumentLayout {
        if let Some(existing) = self.layout() {
            return existing.clone();
        }
        let layout = InstrumentLayout::fit(raw_bounds, &self.params);
        self.camera.frame_bounds(
            &layout.bounds,
            self.params.frame_margin,
            self.params.frame_align_y,
        );
        self.stage = SceneStage::Instrument(layout.clone());
        layout
    }

    /// Attach the bow at rest. Returns `false` unless the instrument stage
    /// has been reached and no bow is attached yet.
    pub fn install_bow(&mut self, placement: BowPlacement) -> bool {
        match std::mem::take(&mut self.stage) {
            SceneStage::Instrument(layout) => {
                self.stage = SceneStage::Ready {
                    layout,
                    bow: BowMotion::at_rest(placement),
                };
                true
            }
            other => {
                self.stage = other;
                false
            }
        }
    }

    pub fn resize(&mut self, aspect: f32) {
        self.camera.set_aspect(aspect);
    }

    // ---------------- Audio unlock ----------------

    /// Claim an unlock attempt for a global first gesture.
    pub fn request_unlock(&mut self) -> bool {
        self.gate.begin_unlock()
    }

    pub fn finish_unlock(&mut self, ok: bool, sink: &mut impl Playback) {
        self.gate.finish_unlock(ok, sink);
    }

    // ---------------- Pointer input ----------------

    /// Press on the canvas. Returns whether the caller should run an audio
    /// unlock cycle.
    pub fn press_start(
        &mut self,
        client: Vec2,
        rect: CanvasRect,
        now_ms: f64,
        sink: &mut impl Playback,
    ) -> bool {
        self.pointer.press_start(rect.local(client), now_ms);
        let unlock = self.gate.begin_unlock();
        self.gate.on_press_start(sink);
        self.retarget(client, rect);
        if let SceneStage::Ready { bow, .. } = &mut self.stage {
            bow.snap();
        }
        unlock
    }

    pub fn pointer_move(
        &mut self,
        client: Vec2,
        rect: CanvasRect,
        now_ms: f64,
        sink: &mut impl Playback,
    ) -> Motion {
        let motion = self.pointer.pointer_move(rect.local(client), now_ms);
        if motion == Motion::Active {
            self.gate.on_active_motion(sink);
            self.retarget(client, rect);
        }
        motion
    }

    /// Release, cancel or leave. Always ends with the track paused.
    pub fn press_end(&mut self, sink: &mut impl Playback) {
        self.pointer.press_end();
        self.gate.on_press_end(sink);
    }

    fn retarget(&mut self, client: Vec2, rect: CanvasRect) {
        let SceneStage::Ready { layout, bow } = &mut self.stage else {
            return;
        };
        let Some(ndc) = rect.to_ndc(client) else {
            return;
        };
        if let Some(target) = layout.map_pointer(&self.camera, ndc) {
            bow.target = target;
        }
    }

    // ---------------- Frame ----------------

    /// Idle check then one smoothing step. Returns the bow's drawn position.
    pub fn frame(&mut self, now_ms: f64, sink: &mut impl Playback) -> Option<Vec3> {
        if self.gate.idle_check(self.pointer.idle_ms(now_ms), sink) {
            log::debug!("[audio] idle pause");
        }
        let smoothing = self.params.bow_smoothing;
        match &mut self.stage {
            SceneStage::Ready { bow, .. } => Some(bow.step(smoothing)),
            _ => None,
        }
    }

    pub fn bow_model_matrix(&self) -> Option<Mat4> {
        self.bow().map(|b| b.model_matrix())
    }
}
