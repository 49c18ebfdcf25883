//! Pointer gesture primitives
//!
//! Every controller runs `Idle → Armed (press) → Dragging (first move) →
//! Idle (release)`. [`ClickGuard`] remembers whether the last press turned
//! into a drag so the trailing click can be swallowed.

/// Keyboard modifiers held during a pointer or key event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    /// Ctrl on Linux/Windows, Cmd on macOS
    #[inline]
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// Pointer position relative to the canvas, with modifiers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GesturePhase {
    #[default]
    Idle,
    Armed,
    Dragging,
}

/// Phase bookkeeping shared by all controllers
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureTracker {
    phase: GesturePhase,
    origin: (f64, f64),
    threshold: f64,
}

impl GestureTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.max(0.0),
            ..Self::default()
        }
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn origin(&self) -> (f64, f64) {
        self.origin
    }

    pub fn press(&mut self, event: &PointerEvent) {
        self.phase = GesturePhase::Armed;
        self.origin = (event.x, event.y);
    }

    /// Returns true on the move that turns the press into a drag
    pub fn motion(&mut self, event: &PointerEvent) -> bool {
        if self.phase != GesturePhase::Armed {
            return false;
        }
        let (dx, dy) = (event.x - self.origin.0, event.y - self.origin.1);
        if dx.hypot(dy) < self.threshold {
            return false;
        }
        self.phase = GesturePhase::Dragging;
        true
    }

    /// Back to idle; returns the phase the gesture ended in
    pub fn release(&mut self) -> GesturePhase {
        std::mem::take(&mut self.phase)
    }
}

/// Drag-vs-click disambiguation
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickGuard {
    did_move: bool,
}

impl ClickGuard {
    pub fn mark_moved(&mut self) {
        self.did_move = true;
    }

    /// A new press starts clean; a drag whose click never came must not
    /// swallow the next one
    pub fn reset(&mut self) {
        self.did_move = false;
    }

    /// True when the click follows a drag and must be ignored. Resets.
    pub fn consume(&mut self) -> bool {
        std::mem::take(&mut self.did_move)
    }
}
