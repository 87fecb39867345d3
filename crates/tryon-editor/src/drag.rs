//! Drag and resize of existing annotations.
//!
//! Pointer-down hit-tests the store (text, then arrow, then image), selects
//! the hit, and opens a `DragSession`. Pointer-move recomputes the dragged
//! annotation from the pre-drag copy plus the pointer position, so frames
//! never accumulate error. Pointer-up commits the whole gesture as one
//! history step; pointer-cancel reverts it.

use crate::store::AnnotationStore;
use tryon_core::EditorConfig;
use tryon_core::geometry::{Bounds, Corner};
use tryon_core::id::AnnotationId;
use tryon_core::model::*;
use tryon_render::hit::{ArrowPart, Hit, ImagePart, hit_test};

/// What a drag does to its annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    /// Translate a text label or image by its anchor.
    Move,
    ArrowStart,
    ArrowEnd,
    /// Translate both arrow endpoints.
    ArrowMove,
    /// Aspect-locked resize of an image from one corner.
    Resize(Corner),
}

impl DragKind {
    fn from_hit(hit: Hit) -> Self {
        match hit {
            Hit::Text(_) | Hit::Image(_, ImagePart::Body) => DragKind::Move,
            Hit::Arrow(_, ArrowPart::Start) => DragKind::ArrowStart,
            Hit::Arrow(_, ArrowPart::End) => DragKind::ArrowEnd,
            Hit::Arrow(_, ArrowPart::Body) => DragKind::ArrowMove,
            Hit::Image(_, ImagePart::Handle(corner)) => DragKind::Resize(corner),
        }
    }
}

/// Short-lived state of one drag gesture. Never stored in history.
#[derive(Debug, Clone)]
pub struct DragSession {
    pub id: AnnotationId,
    pub kind: DragKind,
    /// Pointer position at pointer-down.
    pub origin: Point,
    /// `origin - anchor` for move drags.
    pub offset: (f32, f32),
    /// The annotation as it was at pointer-down.
    pub initial: Annotation,
}

impl DragSession {
    /// The dragged annotation for the pointer at `p`.
    fn apply(&self, p: Point, min_size: f32) -> Annotation {
        let (ox, oy) = self.offset;
        let mut ann = self.initial.clone();
        match (&mut ann, self.kind) {
            (Annotation::Text(t), DragKind::Move) => {
                t.x = p.x - ox;
                t.y = p.y - oy;
            }
            (Annotation::Image(img), DragKind::Move) => {
                img.x = p.x - ox;
                img.y = p.y - oy;
            }
            (Annotation::Image(img), DragKind::Resize(corner)) => {
                let (dx, dy) = p.delta(self.origin);
                let resized = resize_from_corner(img.bounds(), corner, dx, dy, min_size);
                img.set_bounds(resized);
            }
            (Annotation::Arrow(a), DragKind::ArrowStart) => a.set_start(p),
            (Annotation::Arrow(a), DragKind::ArrowEnd) => a.set_end(p),
            (Annotation::Arrow(a), DragKind::ArrowMove) => {
                let (dx, dy) = p.delta(self.origin);
                a.start_x += dx;
                a.start_y += dy;
                a.end_x += dx;
                a.end_y += dy;
            }
            (other, kind) => {
                log::warn!("drag {kind:?} does not apply to {}", other.kind_name());
            }
        }
        ann
    }
}

/// Resize `initial` by dragging `corner` by `(dx, dy)`.
///
/// The opposite corner stays fixed and the aspect ratio of `initial` is
/// kept exactly. The pointer axis that grows the box more wins, so a
/// diagonal drag follows the pointer on its dominant axis. Both sides are
/// floored at `min_size`.
pub fn resize_from_corner(initial: Bounds, corner: Corner, dx: f32, dy: f32, min_size: f32) -> Bounds {
    let aspect = initial.aspect_ratio();
    let grow_x = dx * corner.x_sign();
    let grow_y = dy * corner.y_sign() * aspect;
    let grow = if grow_x.abs() >= grow_y.abs() {
        grow_x
    } else {
        grow_y
    };

    let min_width = min_size.max(min_size * aspect);
    let width = (initial.width + grow).max(min_width);
    let height = width / aspect;

    let fixed = initial.corner(corner.opposite());
    let x = if corner.x_sign() > 0.0 {
        fixed.x
    } else {
        fixed.x - width
    };
    let y = if corner.y_sign() > 0.0 {
        fixed.y
    } else {
        fixed.y - height
    };
    Bounds::new(x, y, width, height)
}

/// Non-reentrant drag state machine: at most one session at a time.
#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Hit-test at `p` and start a drag on the hit. A miss starts nothing
    /// and returns `None`; the caller decides whether to deselect.
    pub fn begin(&mut self, store: &mut AnnotationStore, p: Point, config: &EditorConfig) -> Option<Hit> {
        if self.session.is_some() {
            return None;
        }
        let hit = hit_test(p, store.annotations(), store.selected(), config)?;
        let id = hit.id();
        let initial = store.get(id)?.clone();
        let anchor = match &initial {
            Annotation::Text(t) => Point::new(t.x, t.y),
            Annotation::Image(i) => Point::new(i.x, i.y),
            Annotation::Arrow(a) => a.start(),
            Annotation::Draw(_) => p,
        };
        store.select(id);
        let kind = DragKind::from_hit(hit);
        log::debug!("drag start {id} {kind:?}");
        self.session = Some(DragSession {
            id,
            kind,
            origin: p,
            offset: p.delta(anchor),
            initial,
        });
        Some(hit)
    }

    /// Follow the pointer. Returns `true` if the store changed.
    pub fn update(&mut self, store: &mut AnnotationStore, p: Point, config: &EditorConfig) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        let updated = session.apply(p, config.min_image_size);
        store.replace_transient(updated)
    }

    /// Finish the gesture, recording one snapshot if anything moved.
    pub fn end(&mut self, store: &mut AnnotationStore) -> bool {
        match self.session.take() {
            Some(session) => {
                let committed = store.commit_transient();
                log::debug!("drag end {} (committed: {committed})", session.id);
                committed
            }
            None => false,
        }
    }

    /// Abort the gesture and put the annotation back.
    pub fn cancel(&mut self, store: &mut AnnotationStore) {
        if self.session.take().is_some() {
            store.revert_transient();
        }
    }
}
