//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. `meta` (⌘)
//! and `ctrl` are interchangeable so the same table serves every platform.

use crate::input::KeyEvent;
use crate::interactions::ToolKind;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tool switching ──
    SelectTool(ToolKind),

    // ── Edit ──
    Undo,
    Redo,
    Delete,
    Copy,
    Paste,

    // ── Gesture ──
    /// Abort a sketch, else clear the selection.
    Cancel,
    /// Finish a line or polygon sketch.
    Finish,
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, ctrl: bool, shift: bool, _alt: bool, meta: bool) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "c" | "C" => Some(ShortcutAction::Copy),
                "v" | "V" => Some(ShortcutAction::Paste),
                _ => None,
            };
        }

        if shift {
            return None;
        }

        match key {
            "v" | "V" => Some(ShortcutAction::SelectTool(ToolKind::Selection)),
            "p" | "P" => Some(ShortcutAction::SelectTool(ToolKind::Point)),
            "t" | "T" => Some(ShortcutAction::SelectTool(ToolKind::Text)),
            "l" | "L" => Some(ShortcutAction::SelectTool(ToolKind::LineString)),
            "g" | "G" => Some(ShortcutAction::SelectTool(ToolKind::Polygon)),
            "o" | "O" => Some(ShortcutAction::SelectTool(ToolKind::Circle)),
            "r" | "R" => Some(ShortcutAction::SelectTool(ToolKind::Rectangle)),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Cancel),
            "Enter" => Some(ShortcutAction::Finish),
            _ => None,
        }
    }

    pub fn resolve_event(event: &KeyEvent) -> Option<ShortcutAction> {
        let m = event.modifiers;
        Self::resolve(&event.key, m.ctrl, m.shift, m.alt, m.meta)
    }
}
