//! WASM bridge for the try-on markup editor. Exposes `Editor` to the
//! browser page.
//!
//! Compiled via `wasm-pack build --target web`. Queries return JSON strings
//! or `bool`; fallible operations return `Result<_, JsValue>` carrying the
//! error message.

mod render2d;

use render2d::{Canvas2dSurface, ImageCache};
use tryon_core::config::EditorConfig;
use tryon_core::error::TryOnError;
use tryon_core::id::RasterId;
use tryon_core::model::{Annotation, Color};
use tryon_editor::editor::{Editor, EventOutcome, TextReply};
use tryon_editor::generate::{GenerationKind, GenerationParams, GenerationRequest, GenerationResponse};
use tryon_editor::input::{InputEvent, Modifiers};
use tryon_editor::tools::{Modal, SizeProperty, ToolMode};
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The main WASM-facing canvas controller.
#[wasm_bindgen]
pub struct TryOnCanvas {
    editor: Editor,
    images: ImageCache,
    width: f64,
    height: f64,
}

#[wasm_bindgen]
impl TryOnCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        Self::from_editor(Editor::default(), width, height)
    }

    /// Create with a JSON `EditorConfig` (camelCase, all fields optional).
    pub fn with_config(width: f64, height: f64, config_json: &str) -> Result<TryOnCanvas, JsValue> {
        console_error_panic_hook_setup();
        let editor = EditorConfig::from_json(config_json)
            .and_then(Editor::new)
            .map_err(js_err)?;
        Ok(Self::from_editor(editor, width, height))
    }

    /// Paint the current frame to a Canvas2D context.
    pub fn render(&mut self, ctx: &CanvasRenderingContext2d) {
        let live = self.live_rasters();
        self.images.retain(&live);
        let mut surface = Canvas2dSurface::new(ctx, &mut self.images);
        self.editor
            .paint(&mut surface, self.width as f32, self.height as f32);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    // ─── Pointer / keyboard ──────────────────────────────────────────────

    /// Returns `true` if the canvas needs a repaint or a modal opened
    /// (see `get_pending_modal`).
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f32,
        y: f32,
        click_count: u32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let event = InputEvent::PointerDown {
            x,
            y,
            click_count,
            time_ms: now_ms(),
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        };
        self.dispatch(&event)
    }

    pub fn handle_pointer_move(&mut self, x: f32, y: f32, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let event = InputEvent::PointerMove {
            x,
            y,
            time_ms: now_ms(),
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        };
        self.dispatch(&event)
    }

    pub fn handle_pointer_up(&mut self, x: f32, y: f32, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let event = InputEvent::PointerUp {
            x,
            y,
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        };
        self.dispatch(&event)
    }

    pub fn handle_pointer_cancel(&mut self) -> bool {
        self.dispatch(&InputEvent::PointerCancel)
    }

    /// `key` is `KeyboardEvent.key`.
    pub fn handle_key(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.dispatch(&InputEvent::key(key, modifiers))
    }

    // ─── Tools ───────────────────────────────────────────────────────────

    /// Select (or toggle off) a tool by name. Returns the active tool name.
    pub fn set_tool(&mut self, name: &str) -> String {
        match ToolMode::from_name(name) {
            Some(tool) => {
                self.editor.select_tool(tool);
            }
            None => log::warn!("unknown tool {name:?}"),
        }
        self.get_tool_name()
    }

    pub fn get_tool_name(&self) -> String {
        self.editor.tool().name().to_string()
    }

    /// Returns `false` for an unknown tool or an invalid color string.
    pub fn set_color(&mut self, tool: &str, value: &str) -> bool {
        let Some(tool) = ToolMode::from_name(tool) else {
            return false;
        };
        self.editor.set_color(tool, value).is_ok()
    }

    /// `property` is one of `drawThickness`, `arrowThickness`, `fontSize`,
    /// `brushSize`.
    pub fn set_size(&mut self, property: &str, value: f32) -> bool {
        let Some(property) = SizeProperty::from_name(property) else {
            return false;
        };
        self.editor.set_size(property, value).is_ok()
    }

    pub fn get_settings_json(&self) -> String {
        serde_json::to_string(self.editor.settings()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn set_mask_prompt(&mut self, prompt: &str) {
        self.editor.set_mask_prompt(prompt);
    }

    pub fn get_mask_prompt(&self) -> String {
        self.editor.mask_prompt().to_string()
    }

    pub fn can_generate_mask(&self) -> bool {
        self.editor.can_generate_mask()
    }

    // ─── Modals ──────────────────────────────────────────────────────────

    /// The dialog the page should show, as JSON, or `"null"`.
    pub fn get_pending_modal(&self) -> String {
        self.editor
            .pending_modal()
            .map(modal_json)
            .unwrap_or(serde_json::Value::Null)
            .to_string()
    }

    /// `text: undefined` cancels. `color` is a hex string.
    pub fn resolve_text_modal(&mut self, text: Option<String>, color: Option<String>, font_size: Option<f32>) -> bool {
        let reply = text.map(|text| TextReply {
            text,
            color: color.as_deref().and_then(Color::from_hex),
            font_size,
        });
        self.editor.resolve_text_modal(reply)
    }

    /// `bytes: undefined` cancels. Returns the new annotation id, or an
    /// empty string when nothing was added.
    pub fn resolve_image_modal(&mut self, bytes: Option<Vec<u8>>) -> Result<String, JsValue> {
        let id = self
            .editor
            .resolve_image_modal(bytes.as_deref())
            .map_err(js_err)?;
        Ok(id.map(|id| id.as_str().to_string()).unwrap_or_default())
    }

    /// `params_json: undefined` cancels. Returns the generation request as
    /// JSON, or `"null"` when gated off.
    pub fn resolve_prompt_modal(&mut self, params_json: Option<String>) -> Result<String, JsValue> {
        let params = params_json
            .as_deref()
            .map(GenerationParams::from_json)
            .transpose()
            .map_err(js_err)?;
        let request = self.editor.resolve_prompt_modal(params).map_err(js_err)?;
        request_json(request)
    }

    // ─── Edit ────────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    pub fn delete_selected(&mut self) -> bool {
        self.editor.delete_selected()
    }

    pub fn clear_all(&mut self) -> bool {
        self.editor.clear_all()
    }

    pub fn clear_mask_strokes(&mut self) -> bool {
        self.editor.clear_mask_strokes()
    }

    pub fn get_selected_id(&self) -> String {
        self.editor
            .store()
            .selected()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    /// Toolbar state: tool, selection, undo/redo availability, counts.
    pub fn get_state_json(&self) -> String {
        let store = self.editor.store();
        serde_json::json!({
            "tool": self.editor.tool().name(),
            "selected": store.selected().map(|id| id.as_str().to_string()),
            "annotationCount": store.annotations().len(),
            "maskStrokeCount": store.mask_strokes().len(),
            "canUndo": store.can_undo() && !self.editor.is_generating(),
            "canRedo": store.can_redo() && !self.editor.is_generating(),
            "canGenerateMask": self.editor.can_generate_mask(),
            "isGenerating": self.editor.is_generating(),
            "hasImage": self.editor.base_image().is_some(),
        })
        .to_string()
    }

    // ─── Working image ───────────────────────────────────────────────────

    pub fn load_base_image(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.editor.load_base_image(bytes).map_err(js_err)
    }

    pub fn new_canvas(&mut self) -> Result<(), JsValue> {
        self.editor.new_canvas().map_err(js_err)
    }

    /// PNG data URL of the working image, for the download link.
    pub fn export_data_url(&self) -> Result<String, JsValue> {
        self.editor.export_data_url().map_err(js_err)
    }

    // ─── Generation ──────────────────────────────────────────────────────

    /// `kind` is `"mask"` or `"prompt"`. Returns the request JSON to POST,
    /// or `"null"` when the action is gated off.
    pub fn begin_generation(&mut self, kind: &str, params_json: &str) -> Result<String, JsValue> {
        let kind = match kind {
            "mask" => GenerationKind::Mask,
            "prompt" => GenerationKind::Prompt,
            other => return Err(JsValue::from_str(&format!("unknown generation kind {other:?}"))),
        };
        let params = GenerationParams::from_json(params_json).map_err(js_err)?;
        let request = self.editor.begin_generation(kind, params).map_err(js_err)?;
        request_json(request)
    }

    /// Feed the backend's JSON response back in.
    pub fn finish_generation(&mut self, response_json: &str) -> Result<(), JsValue> {
        let outcome = GenerationResponse::from_json(response_json);
        self.editor.finish_generation(outcome).map_err(js_err)
    }

    /// Report a transport failure (rejected fetch, thrown exception).
    pub fn fail_generation(&mut self, message: &str) -> String {
        let err = self
            .editor
            .finish_generation(Err(TryOnError::generation(message)))
            .err();
        err.map(|e| e.to_string()).unwrap_or_default()
    }

    pub fn is_generating(&self) -> bool {
        self.editor.is_generating()
    }
}

impl TryOnCanvas {
    fn from_editor(editor: Editor, width: f64, height: f64) -> Self {
        Self {
            editor,
            images: ImageCache::default(),
            width,
            height,
        }
    }

    fn dispatch(&mut self, event: &InputEvent) -> bool {
        !matches!(self.editor.handle_event(event), EventOutcome::Ignored)
    }

    fn live_rasters(&self) -> Vec<RasterId> {
        let annotated = self
            .editor
            .store()
            .annotations()
            .iter()
            .filter_map(Annotation::as_image)
            .map(|img| img.raster.id());
        self.editor
            .base_image()
            .map(|b| b.id())
            .into_iter()
            .chain(annotated)
            .collect()
    }
}

fn modal_json(modal: &Modal) -> serde_json::Value {
    match modal {
        Modal::TextEntry { at } => serde_json::json!({
            "kind": "textEntry",
            "x": at.x,
            "y": at.y,
        }),
        Modal::TextEdit {
            id,
            text,
            color,
            font_size,
        } => serde_json::json!({
            "kind": "textEdit",
            "id": id.as_str(),
            "text": text,
            "color": color.to_hex(),
            "fontSize": font_size,
        }),
        Modal::ImagePicker { at } => serde_json::json!({
            "kind": "imagePicker",
            "x": at.x,
            "y": at.y,
        }),
        Modal::Prompt => serde_json::json!({ "kind": "prompt" }),
    }
}

fn request_json(request: Option<GenerationRequest>) -> Result<String, JsValue> {
    match request {
        Some(req) => req.to_json().map_err(js_err),
        None => Ok("null".to_string()),
    }
}

fn js_err(err: TryOnError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn now_ms() -> Option<f64> {
    #[cfg(target_arch = "wasm32")]
    {
        Some(js_sys::Date::now())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}

/// Route Rust panics to the browser console.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("TryOn WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
