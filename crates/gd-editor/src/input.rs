//! Input abstraction layer.
//!
//! Host map widgets translate their native mouse/touch/pen events into
//! these device-neutral events before handing them to the active tool.

use gd_core::Coord;

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
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

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// The precision modifier is reserved for selection tools: a press that
    /// carries it never starts a geometry gesture. A gesture already under
    /// way runs to its release whatever modifiers are held.
    pub fn precision(&self) -> bool {
        self.shift
    }

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    /// Movement with a button held.
    Drag,
    Up,
    /// Movement without any button held (hover).
    Move,
}

/// A pointer event in map coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub coordinate: Coord,
    pub modifiers: Modifiers,
    pub button: PointerButton,
}

impl PointerEvent {
    fn primary(kind: PointerKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            coordinate: Coord::new(x, y),
            modifiers: Modifiers::NONE,
            button: PointerButton::Primary,
        }
    }

    pub fn down(x: f64, y: f64) -> Self {
        Self::primary(PointerKind::Down, x, y)
    }

    pub fn drag(x: f64, y: f64) -> Self {
        Self::primary(PointerKind::Drag, x, y)
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self::primary(PointerKind::Up, x, y)
    }

    pub fn hover(x: f64, y: f64) -> Self {
        Self::primary(PointerKind::Move, x, y)
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Primary-button press without any modifier: the only press that
    /// starts a geometry gesture.
    pub fn is_plain_primary_down(&self) -> bool {
        self.kind == PointerKind::Down
            && self.button == PointerButton::Primary
            && !self.modifiers.any()
    }
}

/// A keyboard event. `key` uses `KeyboardEvent.key` names (`"Escape"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::NONE,
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn is_escape(&self) -> bool {
        self.key == "Escape"
    }

    pub fn is_enter(&self) -> bool {
        self.key == "Enter"
    }
}
