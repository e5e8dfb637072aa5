//! Input abstraction layer.
//!
//! Normalizes mouse, pen and touch events into a single `InputEvent` enum.
//! All coordinates are screen pixels relative to the canvas element.

use pb_core::model::Position;

/// Which pointer button went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    /// Middle button: always pans.
    Middle,
    /// Right button: removes the connection under the pointer.
    Secondary,
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` code.
    pub fn from_dom(code: i16) -> Self {
        match code {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// Keyboard modifiers held during a pointer event.
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

    /// ⌘ (macOS) or Ctrl held: a background drag pans instead of selecting.
    pub fn pan_override(&self) -> bool {
        self.meta || self.ctrl
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        x: f32,
        y: f32,
        button: PointerButton,
        modifiers: Modifiers,
    },
    PointerMove {
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },
    PointerUp {
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },
    DoubleClick {
        x: f32,
        y: f32,
    },
    /// Wheel zoom at the cursor. Positive `delta` zooms in.
    Wheel {
        x: f32,
        y: f32,
        delta: f32,
    },
}

impl InputEvent {
    pub fn down(x: f32, y: f32, button: PointerButton) -> Self {
        Self::PointerDown {
            x,
            y,
            button,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::PointerMove {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self::PointerUp {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    /// Screen position carried by the event.
    pub fn position(&self) -> Position {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. }
            | Self::DoubleClick { x, y }
            | Self::Wheel { x, y, .. } => Position::new(*x, *y),
        }
    }
}
