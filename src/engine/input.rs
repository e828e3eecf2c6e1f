use glam::Vec2;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Pressed {
        /// Last seen pointer position (canvas-relative CSS px).
        last: Vec2,
        /// Time of the press or of the last move that cleared the threshold.
        last_motion_ms: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    /// Pointer moved without a press in progress.
    Ignored,
    /// Pressed, but the step was under the motion threshold.
    Jitter,
    /// Pressed and moved at least the threshold distance.
    Active,
}

/// Press/move/release tracking with a jitter debounce.
#[derive(Clone, Debug)]
pub struct PointerTracker {
    gesture: Gesture,
    min_motion_px: f32,
}

impl PointerTracker {
    pub fn new(min_motion_px: f32) -> Self {
        Self {
            gesture: Gesture::Idle,
            min_motion_px,
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_pressed(&self) -> bool {
        matches!(self.gesture, Gesture::Pressed { .. })
    }

    pub fn press_start(&mut self, pos: Vec2, now_ms: f64) {
        self.gesture = Gesture::Pressed {
            last: pos,
            last_motion_ms: now_ms,
        };
    }

    /// The stored position always follows the pointer; only steps of at
    /// least `min_motion_px` refresh the motion timestamp.
    pub fn pointer_move(&mut self, pos: Vec2, now_ms: f64) -> Motion {
        let Gesture::Pressed {
            last,
            last_motion_ms,
        } = &mut self.gesture
        else {
            return Motion::Ignored;
        };
        let dist = pos.distance(*last);
        *last = pos;
        if dist >= self.min_motion_px {
            *last_motion_ms = now_ms;
            Motion::Active
        } else {
            Motion::Jitter
        }
    }

    /// Returns whether a press was in progress.
    pub fn press_end(&mut self) -> bool {
        let was_pressed = self.is_pressed();
        self.gesture = Gesture::Idle;
        was_pressed
    }

    /// Milliseconds since the last qualifying motion, while pressed.
    pub fn idle_ms(&self, now_ms: f64) -> Option<f64> {
        match self.gesture {
            Gesture::Pressed { last_motion_ms, .. } => Some(now_ms - last_motion_ms),
            Gesture::Idle => None,
        }
    }
}
