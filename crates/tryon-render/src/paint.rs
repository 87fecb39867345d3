//! Store snapshot → surface drawing calls.
//!
//! Paint order: working image, annotations in insertion order, mask dabs,
//! the in-progress gesture, then the selection overlay on top.

use crate::surface::Surface;
use tryon_core::EditorConfig;
use tryon_core::geometry::{Bounds, Corner, arrow};
use tryon_core::id::AnnotationId;
use tryon_core::model::*;
use tryon_core::raster::RasterHandle;

/// Translucent magenta used for mask dabs.
pub const MASK_COLOR: Color = Color::rgba(1.0, 0.0, 0.5, 0.35);
/// Selection outline and handle color.
pub const SELECTION_COLOR: Color = Color::rgba(0.0, 0.48, 1.0, 1.0);

/// An uncommitted gesture, drawn but not yet in the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Path {
        points: Vec<Point>,
        color: Color,
        thickness: f32,
    },
    Arrow {
        start: Point,
        end: Point,
        color: Color,
        thickness: f32,
    },
    Mask {
        dabs: Vec<MaskStroke>,
    },
}

/// Everything needed to paint one frame. Borrowed, never owned.
pub struct Frame<'a> {
    pub width: f32,
    pub height: f32,
    pub base_image: Option<&'a RasterHandle>,
    pub annotations: &'a [Annotation],
    pub mask_strokes: &'a [MaskStroke],
    pub selected: Option<AnnotationId>,
    pub preview: Option<&'a Preview>,
    pub config: &'a EditorConfig,
}

/// Paint one full frame.
pub fn paint_frame<S: Surface + ?Sized>(surface: &mut S, frame: &Frame<'_>) {
    surface.clear(frame.width, frame.height);

    if let Some(base) = frame.base_image {
        let bounds = Bounds::new(0.0, 0.0, base.width() as f32, base.height() as f32);
        surface.draw_raster(base, bounds, 0.0);
    }

    for ann in frame.annotations {
        paint_annotation(surface, ann);
    }

    for dab in frame.mask_strokes {
        paint_dab(surface, dab);
    }

    if let Some(preview) = frame.preview {
        paint_preview(surface, preview);
    }

    if let Some(sel) = frame.selected
        && let Some(ann) = frame.annotations.iter().find(|a| a.id() == sel)
    {
        paint_selection(surface, ann, frame.config);
    }
}

fn paint_annotation<S: Surface + ?Sized>(surface: &mut S, ann: &Annotation) {
    match ann {
        Annotation::Draw(d) => {
            surface.stroke_polyline(&d.path, d.color, d.thickness);
        }
        Annotation::Arrow(a) => {
            paint_arrow(surface, a.start(), a.end(), a.color, a.thickness);
        }
        Annotation::Text(t) => {
            surface.fill_text(&t.text, Point::new(t.x, t.y), t.color, t.font_size);
        }
        Annotation::Image(i) => {
            surface.draw_raster(&i.raster, i.bounds(), i.rotation);
        }
    }
}

fn paint_arrow<S: Surface + ?Sized>(
    surface: &mut S,
    start: Point,
    end: Point,
    color: Color,
    thickness: f32,
) {
    surface.stroke_polyline(&[start, end], color, thickness);
    if let Some((left, right)) = arrow::head_points(start, end, thickness) {
        surface.stroke_polyline(&[left, end, right], color, thickness);
    }
}

fn paint_dab<S: Surface + ?Sized>(surface: &mut S, dab: &MaskStroke) {
    surface.fill_circle(Point::new(dab.x, dab.y), dab.size / 2.0, MASK_COLOR);
}

fn paint_preview<S: Surface + ?Sized>(surface: &mut S, preview: &Preview) {
    match preview {
        Preview::Path {
            points,
            color,
            thickness,
        } => surface.stroke_polyline(points, *color, *thickness),
        Preview::Arrow {
            start,
            end,
            color,
            thickness,
        } => paint_arrow(surface, *start, *end, *color, *thickness),
        Preview::Mask { dabs } => {
            for dab in dabs {
                paint_dab(surface, dab);
            }
        }
    }
}

fn paint_selection<S: Surface + ?Sized>(surface: &mut S, ann: &Annotation, config: &EditorConfig) {
    match ann {
        Annotation::Text(t) => {
            surface.stroke_rect(t.bounds(config.text_width_factor), SELECTION_COLOR, 1.0);
        }
        Annotation::Image(i) => {
            let b = i.bounds();
            surface.stroke_rect(b, SELECTION_COLOR, 1.0);
            for corner in Corner::ALL {
                paint_handle(surface, b.corner(corner), config.handle_size);
            }
        }
        Annotation::Arrow(a) => {
            paint_handle(surface, a.start(), config.handle_size);
            paint_handle(surface, a.end(), config.handle_size);
        }
        Annotation::Draw(_) => {}
    }
}

fn paint_handle<S: Surface + ?Sized>(surface: &mut S, at: Point, size: f32) {
    let half = size / 2.0;
    let b = Bounds::new(at.x - half, at.y - half, size, size);
    surface.fill_rect(b, Color::WHITE);
    surface.stroke_rect(b, SELECTION_COLOR, 1.0);
}
