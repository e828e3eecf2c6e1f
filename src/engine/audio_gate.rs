//! Play/pause decisions for the backing track.
//!
//! The gate never talks to a media element directly; it drives anything that
//! implements [`Playback`]. Whether the track is currently playing is always
//! read back from the sink, so external pauses (end of track, element errors)
//! are picked up without extra bookkeeping.

/// Minimal control surface of the track being gated.
pub trait Playback {
    /// Start or resume. Rejections are the sink's to swallow.
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    /// Seek back to time zero.
    fn rewind(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Unlock {
    Locked,
    Pending,
    Unlocked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Locked,
    Paused,
    Playing,
}

#[derive(Clone, Debug)]
pub struct AudioGate {
    unlock: Unlock,
    idle_pause_ms: f64,
}

impl AudioGate {
    pub fn new(idle_pause_ms: f64) -> Self {
        Self {
            unlock: Unlock::Locked,
            idle_pause_ms,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlock == Unlock::Unlocked
    }

    pub fn state(&self, sink: &impl Playback) -> PlaybackState {
        match (self.is_unlocked(), sink.is_paused()) {
            (false, _) => PlaybackState::Locked,
            (true, true) => PlaybackState::Paused,
            (true, false) => PlaybackState::Playing,
        }
    }

    /// Claim the right to run the silent unlock cycle. Returns `false` when
    /// already unlocked or when an attempt is still in flight.
    pub fn begin_unlock(&mut self) -> bool {
        if self.unlock != Unlock::Locked {
            return false;
        }
        self.unlock = Unlock::Pending;
        true
    }

    /// Outcome of the unlock cycle. Success pauses the priming playback; a
    /// failure returns to `Locked` so the next gesture retries.
    pub fn finish_unlock(&mut self, ok: bool, sink: &mut impl Playback) {
        if self.unlock != Unlock::Pending {
            return;
        }
        if ok {
            sink.pause();
            self.unlock = Unlock::Unlocked;
        } else {
            self.unlock = Unlock::Locked;
        }
    }

    pub fn on_press_start(&self, sink: &mut impl Playback) {
        if self.is_unlocked() && sink.is_paused() {
            sink.rewind();
            sink.play();
        }
    }

    pub fn on_active_motion(&self, sink: &mut impl Playback) {
        if self.is_unlocked() && sink.is_paused() {
            sink.play();
        }
    }

    pub fn on_press_end(&self, sink: &mut impl Playback) {
        if !sink.is_paused() {
            sink.pause();
        }
    }

    /// Per-frame check. `idle_ms` is the time since the last qualifying
    /// motion, `None` when nothing is pressed. Returns whether it paused.
    pub fn idle_check(&self, idle_ms: Option<f64>, sink: &mut impl Playback) -> bool {
        let Some(idle) = idle_ms else {
            return false;
        };
        if self.is_unlocked() && idle > self.idle_pause_ms && !sink.is_paused() {
            sink.pause();
            return true;
        }
        false
    }
}
