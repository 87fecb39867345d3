//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s, shared by the
//! browser bridge and native hosts.

use crate::tools::ToolMode;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Select (or toggle off) a tool.
    Tool(ToolMode),

    // ── Edit ──
    Undo,
    Redo,
    /// Delete the selected annotation.
    Delete,
    /// Remove every annotation and mask stroke.
    ClearAll,

    /// Cancel the gesture or modal in progress, else deselect.
    Cancel,
}

/// Resolves key events into shortcut actions.
///
/// On macOS `meta` is ⌘; elsewhere `ctrl` plays the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
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
                "Delete" | "Backspace" => Some(ShortcutAction::ClearAll),
                _ => None,
            };
        }

        if shift {
            return None;
        }

        match key {
            "d" | "D" => Some(ShortcutAction::Tool(ToolMode::Draw)),
            "a" | "A" => Some(ShortcutAction::Tool(ToolMode::Arrow)),
            "t" | "T" => Some(ShortcutAction::Tool(ToolMode::Text)),
            "i" | "I" => Some(ShortcutAction::Tool(ToolMode::Image)),
            "m" | "M" => Some(ShortcutAction::Tool(ToolMode::Mask)),
            "p" | "P" => Some(ShortcutAction::Tool(ToolMode::Prompt)),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Cancel),
            _ => None,
        }
    }
}
