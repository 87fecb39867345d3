//! The editor facade: routes input to the tool machine or the drag
//! controller, resolves modals, and runs the generation session.
//!
//! Hosts (the wasm bridge, tests, a native shell) talk only to `Editor`.
//! It owns the store, so every mutation goes through one place and the
//! `is_generating` guard can veto destructive actions.

use crate::drag::DragController;
use crate::generate::{
    GenerationKind, GenerationParams, GenerationRequest, GenerationResponse, Generator,
};
use crate::input::{InputEvent, Modifiers};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::store::{AnnotationStore, StoreView, SubscriptionId, TextPatch};
use crate::tools::{Commit, DownOutcome, Modal, SizeProperty, ToolInput, ToolMode, ToolSettings};
use tryon_core::config::EditorConfig;
use tryon_core::error::{TryOnError, TryOnResult};
use tryon_core::id::AnnotationId;
use tryon_core::model::*;
use tryon_core::raster::RasterHandle;
use tryon_render::hit::hit_text;
use tryon_render::paint::{Frame, paint_frame};
use tryon_render::surface::Surface;

/// What the host should do after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// Nothing changed.
    Ignored,
    /// State or preview changed; repaint.
    Redraw,
    /// Show this dialog, then call the matching `resolve_*` method.
    Modal(Modal),
}

/// The answer from a text dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct TextReply {
    pub text: String,
    /// `None` keeps the label's color (edit) or uses the tool color (new).
    pub color: Option<Color>,
    pub font_size: Option<f32>,
}

impl TextReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            font_size: None,
        }
    }
}

pub struct Editor {
    config: EditorConfig,
    store: AnnotationStore,
    tools: ToolInput,
    drag: DragController,
    /// The working image that generation reads and replaces.
    base_image: Option<RasterHandle>,
    is_generating: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::with_parts(EditorConfig::default(), ToolSettings::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> TryOnResult<Self> {
        config.validate()?;
        Ok(Self::with_parts(config, ToolSettings::default()))
    }

    fn with_parts(config: EditorConfig, settings: ToolSettings) -> Self {
        Self {
            store: AnnotationStore::new(config.history_limit),
            tools: ToolInput::new(settings),
            drag: DragController::new(),
            base_image: None,
            is_generating: false,
            config,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Read-only access; mutate through the editor.
    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn tool(&self) -> ToolMode {
        self.tools.mode()
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.tools.settings
    }

    pub fn pending_modal(&self) -> Option<&Modal> {
        self.tools.pending_modal()
    }

    pub fn base_image(&self) -> Option<&RasterHandle> {
        self.base_image.as_ref()
    }

    pub fn is_generating(&self) -> bool {
        self.is_generating
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StoreView<'_>) + 'static,
    {
        self.store.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    // ─── Tools ───────────────────────────────────────────────────────────

    /// Activate `tool` (or toggle it off). Drops the selection and any
    /// drag in progress.
    pub fn select_tool(&mut self, tool: ToolMode) -> ToolMode {
        if self.drag.is_dragging() {
            self.drag.cancel(&mut self.store);
        }
        self.store.deselect();
        self.tools.select_tool(tool)
    }

    pub fn set_color(&mut self, tool: ToolMode, value: &str) -> TryOnResult<()> {
        self.tools.settings.set_color(tool, value)
    }

    pub fn set_size(&mut self, property: SizeProperty, value: f32) -> TryOnResult<()> {
        self.tools.settings.set_size(property, value)
    }

    pub fn mask_prompt(&self) -> &str {
        self.tools.mask_prompt()
    }

    pub fn set_mask_prompt(&mut self, prompt: &str) {
        self.tools.set_mask_prompt(prompt);
    }

    /// Whether the mask tool's generate action is enabled.
    pub fn can_generate_mask(&self) -> bool {
        !self.is_generating && self.tools.can_generate_mask(self.store.mask_strokes().len())
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: &InputEvent) -> EventOutcome {
        match event {
            InputEvent::PointerDown { click_count, .. } => {
                let Some(p) = event.point() else {
                    return EventOutcome::Ignored;
                };
                self.pointer_down(p, *click_count)
            }
            InputEvent::PointerMove { .. } => {
                let Some(p) = event.point() else {
                    return EventOutcome::Ignored;
                };
                let changed = if self.drag.is_dragging() {
                    self.drag.update(&mut self.store, p, &self.config)
                } else {
                    self.tools.pointer_move(p)
                };
                redraw_if(changed)
            }
            InputEvent::PointerUp { x, y, .. } => {
                if self.drag.is_dragging() {
                    self.drag.end(&mut self.store);
                    return EventOutcome::Redraw;
                }
                match self.tools.pointer_up(Point::new(*x, *y)) {
                    Some(commit) => {
                        self.apply_commit(commit);
                        EventOutcome::Redraw
                    }
                    None => EventOutcome::Ignored,
                }
            }
            InputEvent::PointerCancel => {
                let dragging = self.drag.is_dragging();
                self.drag.cancel(&mut self.store);
                redraw_if(self.tools.cancel_gesture() || dragging)
            }
            InputEvent::Key { key, modifiers } => self.handle_key(key, *modifiers),
        }
    }

    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> EventOutcome {
        let Some(action) =
            ShortcutMap::resolve(key, modifiers.ctrl, modifiers.shift, modifiers.alt, modifiers.meta)
        else {
            return EventOutcome::Ignored;
        };
        log::trace!("shortcut {key:?} -> {action:?}");
        match action {
            ShortcutAction::Tool(tool) => {
                self.select_tool(tool);
                match self.tools.pending_modal() {
                    Some(modal) => EventOutcome::Modal(modal.clone()),
                    None => EventOutcome::Redraw,
                }
            }
            ShortcutAction::Undo => redraw_if(self.undo()),
            ShortcutAction::Redo => redraw_if(self.redo()),
            ShortcutAction::Delete => redraw_if(self.delete_selected()),
            ShortcutAction::ClearAll => redraw_if(self.clear_all()),
            ShortcutAction::Cancel => redraw_if(self.cancel()),
        }
    }

    /// Escape: abort the drag, gesture or modal in progress and fall back
    /// to `none`; with nothing in progress, drop the selection.
    pub fn cancel(&mut self) -> bool {
        let mut changed = false;
        if self.drag.is_dragging() {
            self.drag.cancel(&mut self.store);
            changed = true;
        }
        changed |= self.tools.cancel_gesture();
        changed |= self.tools.resolve_modal().is_some();
        if self.tools.mode() != ToolMode::None {
            self.tools.select_tool(ToolMode::None);
            changed = true;
        }
        if !changed && self.store.selected().is_some() {
            self.store.deselect();
            changed = true;
        }
        changed
    }

    fn pointer_down(&mut self, p: Point, click_count: u32) -> EventOutcome {
        if click_count >= 2
            && self.tools.mode() == ToolMode::None
            && let Some(modal) = self.open_text_edit_at(p)
        {
            return EventOutcome::Modal(modal);
        }

        match self.tools.pointer_down(p) {
            DownOutcome::Started => EventOutcome::Redraw,
            DownOutcome::Modal(modal) => EventOutcome::Modal(modal),
            DownOutcome::Ignored => EventOutcome::Ignored,
            DownOutcome::PassThrough => {
                if self.drag.begin(&mut self.store, p, &self.config).is_some() {
                    EventOutcome::Redraw
                } else if self.store.selected().is_some() {
                    self.store.deselect();
                    EventOutcome::Redraw
                } else {
                    EventOutcome::Ignored
                }
            }
        }
    }

    /// Double-click on the selected text label reopens its dialog.
    fn open_text_edit_at(&mut self, p: Point) -> Option<Modal> {
        let selected = self.store.selected()?;
        let hit = hit_text(p, self.store.annotations(), self.config.text_width_factor)?;
        if hit != selected {
            return None;
        }
        let text = self.store.get(selected)?.as_text()?.clone();
        if self.drag.is_dragging() {
            self.drag.cancel(&mut self.store);
        }
        Some(self.tools.open_text_edit(&text))
    }

    fn apply_commit(&mut self, commit: Commit) {
        match commit {
            Commit::Draw {
                path,
                color,
                thickness,
            } => {
                self.store.add_draw(path, color, thickness);
            }
            Commit::Arrow {
                start,
                end,
                color,
                thickness,
            } => {
                self.store.add_arrow(start, end, color, thickness);
            }
            Commit::Mask(dabs) => {
                self.store.add_mask_strokes(dabs);
            }
        }
    }

    // ─── Modals ──────────────────────────────────────────────────────────

    /// Close the text dialog. `None` means cancelled. Confirming an edit
    /// with blank text deletes the label.
    pub fn resolve_text_modal(&mut self, reply: Option<TextReply>) -> bool {
        if !matches!(
            self.tools.pending_modal(),
            Some(Modal::TextEntry { .. } | Modal::TextEdit { .. })
        ) {
            log::warn!("no text dialog pending");
            return false;
        }
        let modal = self.tools.resolve_modal();
        let Some(reply) = reply else {
            return false;
        };
        match modal {
            Some(Modal::TextEntry { at }) => {
                let settings = &self.tools.settings;
                let color = reply.color.unwrap_or(settings.text_color);
                let font_size = reply.font_size.unwrap_or(settings.font_size);
                self.store
                    .add_text(at.x, at.y, &reply.text, color, font_size)
                    .is_some()
            }
            Some(Modal::TextEdit { id, .. }) => {
                if reply.text.trim().is_empty() {
                    return self.store.delete_annotation(id);
                }
                self.store.update_text(
                    id,
                    TextPatch {
                        text: Some(reply.text),
                        color: reply.color,
                        font_size: reply.font_size,
                        ..TextPatch::default()
                    },
                )
            }
            _ => false,
        }
    }

    /// Close the image picker. `None` means cancelled. A file that fails
    /// to decode leaves the store untouched; the tool resets either way.
    pub fn resolve_image_modal(&mut self, bytes: Option<&[u8]>) -> TryOnResult<Option<AnnotationId>> {
        let Some(Modal::ImagePicker { at }) = self.tools.pending_modal().cloned() else {
            log::warn!("no image picker pending");
            return Ok(None);
        };
        self.tools.resolve_modal();
        let Some(bytes) = bytes else {
            return Ok(None);
        };
        let raster = RasterHandle::decode(bytes).inspect_err(|e| log::warn!("image load failed: {e}"))?;
        let (width, height) = fit_within(
            raster.width() as f32,
            raster.height() as f32,
            self.config.initial_image_max,
        );
        Ok(self.store.add_image(at.x, at.y, width, height, raster, 0.0))
    }

    /// Close the prompt dialog. `Some(params)` starts a prompt generation
    /// with `params.prompt`.
    pub fn resolve_prompt_modal(
        &mut self,
        params: Option<GenerationParams>,
    ) -> TryOnResult<Option<GenerationRequest>> {
        if self.tools.pending_modal() != Some(&Modal::Prompt) {
            log::warn!("no prompt dialog pending");
            return Ok(None);
        }
        self.tools.resolve_modal();
        match params {
            Some(params) => self.begin_generation(GenerationKind::Prompt, params),
            None => Ok(None),
        }
    }

    // ─── History and destructive edits ───────────────────────────────────

    pub fn undo(&mut self) -> bool {
        if self.blocked("undo") {
            return false;
        }
        self.drag.cancel(&mut self.store);
        self.store.undo()
    }

    pub fn redo(&mut self) -> bool {
        if self.blocked("redo") {
            return false;
        }
        self.drag.cancel(&mut self.store);
        self.store.redo()
    }

    pub fn delete_selected(&mut self) -> bool {
        if self.blocked("delete") {
            return false;
        }
        self.drag.cancel(&mut self.store);
        match self.store.selected() {
            Some(id) => self.store.delete_annotation(id),
            None => false,
        }
    }

    pub fn clear_all(&mut self) -> bool {
        if self.blocked("clear") {
            return false;
        }
        self.drag.cancel(&mut self.store);
        self.store.clear_all();
        true
    }

    pub fn clear_mask_strokes(&mut self) -> bool {
        self.store.clear_mask_strokes()
    }

    // ─── Working image ───────────────────────────────────────────────────

    /// Decode `bytes` and make it the working image. On failure the old
    /// image stays.
    pub fn load_base_image(&mut self, bytes: &[u8]) -> TryOnResult<()> {
        if self.is_generating {
            return Err(TryOnError::Busy);
        }
        let raster = RasterHandle::decode(bytes)?;
        log::debug!("working image {}x{}", raster.width(), raster.height());
        self.base_image = Some(raster);
        Ok(())
    }

    /// Drop the working image and every annotation.
    pub fn new_canvas(&mut self) -> TryOnResult<()> {
        if self.is_generating {
            return Err(TryOnError::Busy);
        }
        self.drag.cancel(&mut self.store);
        self.tools.select_tool(ToolMode::None);
        self.base_image = None;
        self.store.clear_all();
        Ok(())
    }

    /// The working image as a PNG data URL.
    pub fn export_data_url(&self) -> TryOnResult<String> {
        self.base_image
            .as_ref()
            .ok_or(TryOnError::NoWorkingImage)?
            .to_data_url()
    }

    // ─── Generation ──────────────────────────────────────────────────────

    /// Build a generation request and mark the editor busy. Returns
    /// `Ok(None)` without side effects when the action is gated off.
    pub fn begin_generation(
        &mut self,
        kind: GenerationKind,
        params: GenerationParams,
    ) -> TryOnResult<Option<GenerationRequest>> {
        if self.is_generating {
            return Err(TryOnError::Busy);
        }
        let prompt = match kind {
            GenerationKind::Mask => {
                if !self.tools.can_generate_mask(self.store.mask_strokes().len()) {
                    return Ok(None);
                }
                self.tools.mask_prompt().trim().to_string()
            }
            GenerationKind::Prompt => match params.prompt.as_deref().map(str::trim) {
                Some(p) if !p.is_empty() => p.to_string(),
                _ => return Ok(None),
            },
        };
        params.validate()?;
        let image = self.base_image.as_ref().ok_or(TryOnError::NoWorkingImage)?;

        let request = GenerationRequest {
            image_data: image.to_base64_png()?,
            mask_data: match kind {
                GenerationKind::Mask => Some(self.store.mask_strokes().to_vec()),
                GenerationKind::Prompt => None,
            },
            prompt: Some(prompt),
            strength: params.strength,
            guidance: params.guidance,
            steps: params.steps,
            seed: params.seed,
        };
        self.is_generating = true;
        log::debug!("generation started ({kind:?})");
        Ok(Some(request))
    }

    /// Apply the backend's answer. The busy flag clears before anything
    /// else; a failure leaves the image and mask untouched. A result with
    /// no request in flight is dropped.
    pub fn finish_generation(&mut self, outcome: TryOnResult<GenerationResponse>) -> TryOnResult<()> {
        if !self.is_generating {
            log::warn!("dropping generation result with no request in flight");
            return Err(TryOnError::NotGenerating);
        }
        self.is_generating = false;
        let applied = outcome
            .and_then(GenerationResponse::into_result)
            .and_then(|out| RasterHandle::decode_base64(&out.output));
        let raster = applied.inspect_err(|e| log::warn!("generation failed: {e}"))?;
        log::debug!("generation finished: {}x{}", raster.width(), raster.height());
        self.base_image = Some(raster);
        self.store.clear_mask_strokes();
        Ok(())
    }

    /// Run a whole generation against a synchronous backend. Returns
    /// `Ok(false)` when gated off.
    pub fn generate_with<G: Generator + ?Sized>(
        &mut self,
        generator: &mut G,
        kind: GenerationKind,
        params: GenerationParams,
    ) -> TryOnResult<bool> {
        let Some(request) = self.begin_generation(kind, params)? else {
            return Ok(false);
        };
        let outcome = generator.generate(&request);
        self.finish_generation(outcome)?;
        Ok(true)
    }

    // ─── Painting ────────────────────────────────────────────────────────

    pub fn paint<S: Surface + ?Sized>(&self, surface: &mut S, width: f32, height: f32) {
        let preview = self.tools.preview();
        let frame = Frame {
            width,
            height,
            base_image: self.base_image.as_ref(),
            annotations: self.store.annotations(),
            mask_strokes: self.store.mask_strokes(),
            selected: self.store.selected(),
            preview: preview.as_ref(),
            config: &self.config,
        };
        paint_frame(surface, &frame);
    }

    fn blocked(&self, action: &str) -> bool {
        if self.is_generating {
            log::warn!("{action} rejected while generating");
        }
        self.is_generating
    }
}

fn redraw_if(changed: bool) -> EventOutcome {
    if changed {
        EventOutcome::Redraw
    } else {
        EventOutcome::Ignored
    }
}

/// Scale `(w, h)` down so the longer side is at most `max`.
fn fit_within(w: f32, h: f32, max: f32) -> (f32, f32) {
    let longest = w.max(h);
    if longest <= max {
        return (w, h);
    }
    let scale = max / longest;
    (w * scale, h * scale)
}
