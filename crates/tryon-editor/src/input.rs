//! Input abstraction layer.
//!
//! Normalizes mouse, touch, and pen events into a unified `InputEvent`
//! consumed by the editor's tool and drag state machines.

use tryon_core::model::Point;

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };
}

/// A normalized input event from any pointing device.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start, pen contact).
    PointerDown {
        x: f32,
        y: f32,
        /// Platform multi-click count: 1 for a single click, 2 for a
        /// double click.
        click_count: u32,
        /// Host clock in milliseconds, if the host provides one.
        time_ms: Option<f64>,
        modifiers: Modifiers,
    },

    /// Pointer moved.
    PointerMove {
        x: f32,
        y: f32,
        time_ms: Option<f64>,
        modifiers: Modifiers,
    },

    /// Pointer released.
    PointerUp { x: f32, y: f32, modifiers: Modifiers },

    /// Gesture aborted by the platform (pointer capture lost, touch cancel).
    PointerCancel,

    /// Keyboard shortcut.
    Key { key: String, modifiers: Modifiers },
}

impl InputEvent {
    pub fn pointer_down(x: f32, y: f32) -> Self {
        Self::PointerDown {
            x,
            y,
            click_count: 1,
            time_ms: None,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn double_click(x: f32, y: f32) -> Self {
        Self::PointerDown {
            x,
            y,
            click_count: 2,
            time_ms: None,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        Self::PointerMove {
            x,
            y,
            time_ms: None,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_up(x: f32, y: f32) -> Self {
        Self::PointerUp {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key(key: &str, modifiers: Modifiers) -> Self {
        Self::Key {
            key: key.to_string(),
            modifiers,
        }
    }

    /// Position as a canvas point (timestamped when known), if this is a
    /// pointer event that carries one.
    pub fn point(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y, time_ms, .. } | Self::PointerMove { x, y, time_ms, .. } => {
                let p = Point::new(*x, *y);
                Some(match time_ms {
                    Some(t) => p.with_timestamp(*t),
                    None => p,
                })
            }
            Self::PointerUp { x, y, .. } => Some(Point::new(*x, *y)),
            _ => None,
        }
    }
}
