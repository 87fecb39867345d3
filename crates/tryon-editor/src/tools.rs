//! Tool modes and the pointer-input state machine.
//!
//! One `ToolMode` is active at a time; picking the active tool again turns
//! it off. Pointer events are routed by mode:
//!
//! | Mode | Pointer-down | Pointer-move | Pointer-up |
//! |------|--------------|--------------|------------|
//! | **draw** | start path | append point | commit stroke |
//! | **arrow** | set start | track end | commit arrow |
//! | **mask** | first dab | dabs along motion | commit gesture |
//! | **text** / **image** | open modal | - | - |
//! | **prompt** | - (modal opens on selection) | - | - |
//! | **none** | handled by the drag controller | | |
//!
//! Text and image reset to `none` once their modal is resolved.

use serde::{Deserialize, Serialize};
use tryon_core::error::{TryOnError, TryOnResult};
use tryon_core::geometry::interpolate;
use tryon_core::id::AnnotationId;
use tryon_core::model::*;
use tryon_render::paint::Preview;

/// The active tool determines how pointer events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    #[default]
    None,
    Draw,
    Arrow,
    Text,
    Image,
    Mask,
    Prompt,
}

impl ToolMode {
    pub fn name(self) -> &'static str {
        match self {
            ToolMode::None => "none",
            ToolMode::Draw => "draw",
            ToolMode::Arrow => "arrow",
            ToolMode::Text => "text",
            ToolMode::Image => "image",
            ToolMode::Mask => "mask",
            ToolMode::Prompt => "prompt",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "none" => ToolMode::None,
            "draw" => ToolMode::Draw,
            "arrow" => ToolMode::Arrow,
            "text" => ToolMode::Text,
            "image" => ToolMode::Image,
            "mask" => ToolMode::Mask,
            "prompt" => ToolMode::Prompt,
            _ => return None,
        })
    }

    /// Modes whose pointer-down opens a dialog instead of tracking motion.
    pub fn is_modal(self) -> bool {
        matches!(self, ToolMode::Text | ToolMode::Image | ToolMode::Prompt)
    }
}

// ─── Settings ────────────────────────────────────────────────────────────

/// Size properties adjustable from the properties panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SizeProperty {
    DrawThickness,
    ArrowThickness,
    FontSize,
    BrushSize,
}

impl SizeProperty {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "drawThickness" => SizeProperty::DrawThickness,
            "arrowThickness" => SizeProperty::ArrowThickness,
            "fontSize" => SizeProperty::FontSize,
            "brushSize" => SizeProperty::BrushSize,
            _ => return None,
        })
    }
}

/// Per-tool color and size, read at commit time. Changing a setting never
/// touches existing annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolSettings {
    pub draw_color: Color,
    pub draw_thickness: f32,
    pub arrow_color: Color,
    pub arrow_thickness: f32,
    pub text_color: Color,
    pub font_size: f32,
    pub brush_size: f32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            draw_color: Color::BLACK,
            draw_thickness: 3.0,
            arrow_color: Color::RED,
            arrow_thickness: 3.0,
            text_color: Color::BLACK,
            font_size: 24.0,
            brush_size: 30.0,
        }
    }
}

impl ToolSettings {
    /// Set the color used by `tool`'s next commit from a hex string.
    pub fn set_color(&mut self, tool: ToolMode, value: &str) -> TryOnResult<()> {
        let color = Color::from_hex(value).ok_or_else(|| TryOnError::InvalidColor(value.to_string()))?;
        match tool {
            ToolMode::Draw => self.draw_color = color,
            ToolMode::Arrow => self.arrow_color = color,
            ToolMode::Text => self.text_color = color,
            other => {
                return Err(TryOnError::validation(format!(
                    "tool {} has no color",
                    other.name()
                )));
            }
        }
        Ok(())
    }

    pub fn set_size(&mut self, property: SizeProperty, value: f32) -> TryOnResult<()> {
        if !(value.is_finite() && value > 0.0) {
            return Err(TryOnError::validation(format!(
                "{property:?} must be positive, got {value}"
            )));
        }
        match property {
            SizeProperty::DrawThickness => self.draw_thickness = value,
            SizeProperty::ArrowThickness => self.arrow_thickness = value,
            SizeProperty::FontSize => self.font_size = value,
            SizeProperty::BrushSize => self.brush_size = value,
        }
        Ok(())
    }
}

// ─── State machine ───────────────────────────────────────────────────────

/// Dabs closer than this add nothing visible.
const MIN_DAB_SPACING: f32 = 1.0;
/// Upper bound on dabs filled in by one pointer move.
const MAX_DABS_PER_MOVE: usize = 512;

/// A dialog the host must show. The editor waits for it to resolve.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    /// New text label at `at`.
    TextEntry { at: Point },
    /// Edit an existing label, pre-filled with its current values.
    TextEdit {
        id: AnnotationId,
        text: String,
        color: Color,
        font_size: f32,
    },
    /// Pick an image file to place at `at`.
    ImagePicker { at: Point },
    /// Whole-image generation prompt.
    Prompt,
}

/// Pointer gesture in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Draw { points: Vec<Point> },
    Arrow { start: Point, current: Point },
    Mask { dabs: Vec<MaskStroke>, last: Point },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputState {
    #[default]
    Idle,
    Drawing(Gesture),
    ModalPending(Modal),
}

/// A finished gesture, ready for the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Commit {
    Draw {
        path: Vec<Point>,
        color: Color,
        thickness: f32,
    },
    Arrow {
        start: Point,
        end: Point,
        color: Color,
        thickness: f32,
    },
    Mask(Vec<MaskStroke>),
}

/// What a pointer-down did.
#[derive(Debug, Clone, PartialEq)]
pub enum DownOutcome {
    /// The active tool does not consume pointer-down; try a drag.
    PassThrough,
    /// A gesture started.
    Started,
    /// A modal is now pending.
    Modal(Modal),
    /// Ignored (modal already pending).
    Ignored,
}

#[derive(Debug, Default)]
pub struct ToolInput {
    mode: ToolMode,
    state: InputState,
    pub settings: ToolSettings,
    /// Prompt typed for the mask tool's region edit.
    mask_prompt: String,
}

impl ToolInput {
    pub fn new(settings: ToolSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, InputState::Drawing(_))
    }

    pub fn pending_modal(&self) -> Option<&Modal> {
        match &self.state {
            InputState::ModalPending(m) => Some(m),
            _ => None,
        }
    }

    pub fn mask_prompt(&self) -> &str {
        &self.mask_prompt
    }

    pub fn set_mask_prompt(&mut self, prompt: &str) {
        self.mask_prompt = prompt.to_string();
    }

    /// Mask generation needs both a painted region and a non-blank prompt.
    pub fn can_generate_mask(&self, mask_stroke_count: usize) -> bool {
        mask_stroke_count > 0 && !self.mask_prompt.trim().is_empty()
    }

    /// Activate `tool`, or turn it off if it is already active. Any
    /// gesture or modal in flight is dropped. Returns the new mode.
    pub fn select_tool(&mut self, tool: ToolMode) -> ToolMode {
        self.state = InputState::Idle;
        if tool == self.mode || tool == ToolMode::None {
            if self.mode == ToolMode::Mask || tool == self.mode {
                self.mask_prompt.clear();
            }
            self.mode = ToolMode::None;
        } else {
            self.mode = tool;
            if tool == ToolMode::Prompt {
                self.state = InputState::ModalPending(Modal::Prompt);
            }
        }
        log::debug!("tool -> {}", self.mode.name());
        self.mode
    }

    pub fn pointer_down(&mut self, p: Point) -> DownOutcome {
        if matches!(self.state, InputState::ModalPending(_)) {
            return DownOutcome::Ignored;
        }
        match self.mode {
            ToolMode::None | ToolMode::Prompt => DownOutcome::PassThrough,
            ToolMode::Text => self.open_modal(Modal::TextEntry { at: p }),
            ToolMode::Image => self.open_modal(Modal::ImagePicker { at: p }),
            ToolMode::Draw => {
                self.state = InputState::Drawing(Gesture::Draw { points: vec![p] });
                DownOutcome::Started
            }
            ToolMode::Arrow => {
                self.state = InputState::Drawing(Gesture::Arrow {
                    start: p,
                    current: p,
                });
                DownOutcome::Started
            }
            ToolMode::Mask => {
                let dab = MaskStroke::new(p.x, p.y, self.settings.brush_size);
                self.state = InputState::Drawing(Gesture::Mask {
                    dabs: vec![dab],
                    last: p,
                });
                DownOutcome::Started
            }
        }
    }

    /// Extend the gesture in progress. Returns `true` if it changed.
    pub fn pointer_move(&mut self, p: Point) -> bool {
        let brush = self.settings.brush_size;
        let InputState::Drawing(gesture) = &mut self.state else {
            return false;
        };
        match gesture {
            Gesture::Draw { points } => points.push(p),
            Gesture::Arrow { current, .. } => *current = p,
            Gesture::Mask { dabs, last } => {
                let step = (brush / 2.0)
                    .max(MIN_DAB_SPACING)
                    .max(last.distance(p) / MAX_DABS_PER_MOVE as f32);
                dabs.extend(
                    interpolate(*last, p, step)
                        .into_iter()
                        .map(|q| MaskStroke::new(q.x, q.y, brush)),
                );
                *last = p;
            }
        }
        true
    }

    /// Finish the gesture in progress with the current tool settings.
    pub fn pointer_up(&mut self, p: Point) -> Option<Commit> {
        // A pending modal outlives the click that opened it.
        if !self.is_drawing() {
            return None;
        }
        let InputState::Drawing(gesture) = std::mem::take(&mut self.state) else {
            return None;
        };
        let s = &self.settings;
        Some(match gesture {
            Gesture::Draw { points } => Commit::Draw {
                path: points,
                color: s.draw_color,
                thickness: s.draw_thickness,
            },
            Gesture::Arrow { start, .. } => Commit::Arrow {
                start,
                end: p,
                color: s.arrow_color,
                thickness: s.arrow_thickness,
            },
            Gesture::Mask { dabs, .. } => Commit::Mask(dabs),
        })
    }

    /// Drop the gesture in progress without committing.
    pub fn cancel_gesture(&mut self) -> bool {
        if self.is_drawing() {
            self.state = InputState::Idle;
            true
        } else {
            false
        }
    }

    /// Show the edit dialog for an existing label.
    pub fn open_text_edit(&mut self, text: &TextAnnotation) -> Modal {
        let modal = Modal::TextEdit {
            id: text.id,
            text: text.text.clone(),
            color: text.color,
            font_size: text.font_size,
        };
        self.state = InputState::ModalPending(modal.clone());
        modal
    }

    /// Close the pending modal (confirmed or cancelled) and hand it back.
    /// Modal tools fall back to `none`.
    pub fn resolve_modal(&mut self) -> Option<Modal> {
        let InputState::ModalPending(modal) = std::mem::take(&mut self.state) else {
            return None;
        };
        if self.mode.is_modal() {
            self.mode = ToolMode::None;
        }
        Some(modal)
    }

    /// The gesture in progress, for painting.
    pub fn preview(&self) -> Option<Preview> {
        let InputState::Drawing(gesture) = &self.state else {
            return None;
        };
        let s = &self.settings;
        Some(match gesture {
            Gesture::Draw { points } => Preview::Path {
                points: points.clone(),
                color: s.draw_color,
                thickness: s.draw_thickness,
            },
            Gesture::Arrow { start, current } => Preview::Arrow {
                start: *start,
                end: *current,
                color: s.arrow_color,
                thickness: s.arrow_thickness,
            },
            Gesture::Mask { dabs, .. } => Preview::Mask { dabs: dabs.clone() },
        })
    }

    fn open_modal(&mut self, modal: Modal) -> DownOutcome {
        self.state = InputState::ModalPending(modal.clone());
        DownOutcome::Modal(modal)
    }
}
