//! The annotation store: single owner of annotations, mask strokes,
//! selection, and history.
//!
//! Every committed mutation records a snapshot before returning, so the
//! snapshot under the history cursor always equals the live lists. The one
//! exception is a drag in progress: `replace_transient` edits live state
//! without recording, and the gesture ends with `commit_transient` (one
//! snapshot) or `revert_transient` (back to the cursor snapshot).
//!
//! Renderers observe the store through `subscribe`; they receive a
//! read-only `StoreView` after each change and never hold mutable copies.

use crate::history::History;
use tryon_core::id::AnnotationId;
use tryon_core::model::*;
use tryon_core::raster::RasterHandle;

/// Read-only view handed to subscribers.
pub struct StoreView<'a> {
    pub annotations: &'a [Annotation],
    pub mask_strokes: &'a [MaskStroke],
    pub selected: Option<AnnotationId>,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&StoreView<'_>)>;

/// Partial update for a text annotation. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPatch {
    pub text: Option<String>,
    pub color: Option<Color>,
    pub font_size: Option<f32>,
    pub x: Option<f32>,
    pub y: Option<f32>,
}

pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    mask_strokes: Vec<MaskStroke>,
    selected: Option<AnnotationId>,
    history: History,
    /// Creation counter stamped on each new annotation.
    next_timestamp: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl AnnotationStore {
    pub fn new(history_limit: usize) -> Self {
        Self {
            annotations: Vec::new(),
            mask_strokes: Vec::new(),
            selected: None,
            history: History::new(history_limit),
            next_timestamp: 0,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn mask_strokes(&self) -> &[MaskStroke] {
        &self.mask_strokes
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id() == id)
    }

    pub fn selected(&self) -> Option<AnnotationId> {
        self.selected
    }

    pub fn selected_annotation(&self) -> Option<&Annotation> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Full-value copy of the live state.
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            annotations: self.annotations.clone(),
            mask_strokes: self.mask_strokes.clone(),
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_cursor(&self) -> usize {
        self.history.cursor()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Whether live state matches the snapshot under the history cursor.
    /// False only while a transient drag edit is pending.
    pub fn is_committed(&self) -> bool {
        let current = self.history.current();
        current.annotations == self.annotations && current.mask_strokes == self.mask_strokes
    }

    // ─── Creation ────────────────────────────────────────────────────────

    /// Add a freehand stroke. Paths with fewer than two points are dropped.
    pub fn add_draw(&mut self, path: Vec<Point>, color: Color, thickness: f32) -> Option<AnnotationId> {
        if path.len() < 2 || !path.iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
            log::trace!("dropping draw path with {} points", path.len());
            return None;
        }
        let id = AnnotationId::with_prefix("draw");
        let timestamp = self.stamp();
        self.insert(Annotation::Draw(DrawAnnotation {
            id,
            timestamp,
            path,
            color,
            thickness,
        }));
        Some(id)
    }

    /// Add an arrow. Zero-length arrows are dropped.
    pub fn add_arrow(
        &mut self,
        start: Point,
        end: Point,
        color: Color,
        thickness: f32,
    ) -> Option<AnnotationId> {
        if start.distance(end) <= f32::EPSILON || !start.distance(end).is_finite() {
            log::trace!("dropping zero-length arrow");
            return None;
        }
        let id = AnnotationId::with_prefix("arrow");
        let timestamp = self.stamp();
        self.insert(Annotation::Arrow(ArrowAnnotation {
            id,
            timestamp,
            start_x: start.x,
            start_y: start.y,
            end_x: end.x,
            end_y: end.y,
            color,
            thickness,
        }));
        Some(id)
    }

    /// Add a text label. Blank text is dropped.
    pub fn add_text(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        color: Color,
        font_size: f32,
    ) -> Option<AnnotationId> {
        if text.trim().is_empty() || !positive(font_size) || !(x.is_finite() && y.is_finite()) {
            return None;
        }
        let id = AnnotationId::with_prefix("text");
        let timestamp = self.stamp();
        self.insert(Annotation::Text(TextAnnotation {
            id,
            timestamp,
            x,
            y,
            text: text.to_string(),
            color,
            font_size,
        }));
        Some(id)
    }

    /// Add an embedded image. Empty or non-finite rectangles are dropped.
    pub fn add_image(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        raster: RasterHandle,
        rotation: f32,
    ) -> Option<AnnotationId> {
        if !(positive(width) && positive(height) && x.is_finite() && y.is_finite()) {
            return None;
        }
        let id = AnnotationId::with_prefix("image");
        let timestamp = self.stamp();
        self.insert(Annotation::Image(ImageAnnotation {
            id,
            timestamp,
            x,
            y,
            width,
            height,
            rotation,
            raster,
        }));
        Some(id)
    }

    /// Append one painted gesture of mask dabs as a single history step.
    pub fn add_mask_strokes(&mut self, strokes: Vec<MaskStroke>) -> bool {
        if strokes.is_empty() {
            return false;
        }
        log::debug!("mask gesture: {} dabs", strokes.len());
        self.mask_strokes.extend(strokes);
        self.record();
        true
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Merge `patch` into the text annotation `id`. No-op for unknown IDs
    /// and non-text annotations.
    pub fn update_text(&mut self, id: AnnotationId, patch: TextPatch) -> bool {
        let Some(Annotation::Text(t)) = self.annotations.iter_mut().find(|a| a.id() == id) else {
            return false;
        };
        let finite = |v: Option<f32>| v.is_none_or(f32::is_finite);
        if !(patch.font_size.is_none_or(positive) && finite(patch.x) && finite(patch.y)) {
            log::warn!("rejected text patch for {id}: {patch:?}");
            return false;
        }
        if let Some(text) = patch.text {
            t.text = text;
        }
        if let Some(color) = patch.color {
            t.color = color;
        }
        if let Some(font_size) = patch.font_size {
            t.font_size = font_size;
        }
        if let Some(x) = patch.x {
            t.x = x;
        }
        if let Some(y) = patch.y {
            t.y = y;
        }
        log::debug!("updated text {id}");
        self.record();
        true
    }

    pub fn delete_annotation(&mut self, id: AnnotationId) -> bool {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id() != id);
        if self.annotations.len() == before {
            return false;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        log::debug!("deleted {id}");
        self.record();
        true
    }

    /// Empty everything and reset history to a single empty snapshot.
    pub fn clear_all(&mut self) {
        self.annotations.clear();
        self.mask_strokes.clear();
        self.selected = None;
        self.history.reset();
        log::debug!("cleared all annotations");
        self.notify();
    }

    /// Empty the mask only; annotations are untouched.
    pub fn clear_mask_strokes(&mut self) -> bool {
        if self.mask_strokes.is_empty() {
            return false;
        }
        self.mask_strokes.clear();
        self.record();
        true
    }

    // ─── Undo / redo ─────────────────────────────────────────────────────

    /// Restore the previous snapshot. No-op at the oldest entry.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        let snapshot = snapshot.clone();
        self.restore(snapshot);
        true
    }

    /// Restore the next snapshot. No-op at the newest entry.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        let snapshot = snapshot.clone();
        self.restore(snapshot);
        true
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select an existing annotation. Unknown IDs are rejected.
    pub fn select(&mut self, id: AnnotationId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        if self.selected != Some(id) {
            self.selected = Some(id);
            self.notify();
        }
        true
    }

    pub fn deselect(&mut self) {
        if self.selected.take().is_some() {
            self.notify();
        }
    }

    // ─── Transient (drag) edits ──────────────────────────────────────────

    /// Replace the annotation with the same ID without recording history.
    pub fn replace_transient(&mut self, annotation: Annotation) -> bool {
        let id = annotation.id();
        let Some(slot) = self.annotations.iter_mut().find(|a| a.id() == id) else {
            return false;
        };
        *slot = annotation;
        self.notify();
        true
    }

    /// Record pending transient edits as one snapshot. Returns `false`
    /// (and records nothing) when live state already matches history.
    pub fn commit_transient(&mut self) -> bool {
        if self.is_committed() {
            return false;
        }
        self.record();
        true
    }

    /// Drop pending transient edits.
    pub fn revert_transient(&mut self) {
        if self.is_committed() {
            return;
        }
        let snapshot = self.history.current().clone();
        self.restore(snapshot);
    }

    // ─── Subscribers ─────────────────────────────────────────────────────

    /// Register a callback run after every change.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StoreView<'_>) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn stamp(&mut self) -> u64 {
        let t = self.next_timestamp;
        self.next_timestamp += 1;
        t
    }

    fn insert(&mut self, annotation: Annotation) {
        log::debug!("added {} {}", annotation.kind_name(), annotation.id());
        self.annotations.push(annotation);
        self.record();
    }

    fn record(&mut self) {
        let snapshot = self.snapshot();
        self.history.push(snapshot);
        self.notify();
    }

    fn restore(&mut self, snapshot: HistorySnapshot) {
        self.annotations = snapshot.annotations;
        self.mask_strokes = snapshot.mask_strokes;
        if let Some(sel) = self.selected
            && self.get(sel).is_none()
        {
            self.selected = None;
        }
        self.notify();
    }

    fn notify(&mut self) {
        let view = StoreView {
            annotations: &self.annotations,
            mask_strokes: &self.mask_strokes,
            selected: self.selected,
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        };
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&view);
        }
    }
}

fn positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}
