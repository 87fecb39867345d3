//! Hit testing: point → annotation lookup.
//!
//! Every query walks the annotation list in reverse (last painted =
//! topmost), so the most recent annotation wins overlaps. Freehand strokes
//! are not selectable and never hit.

use tryon_core::geometry::{Corner, distance_point_to_segment};
use tryon_core::id::AnnotationId;
use tryon_core::model::*;
use tryon_core::EditorConfig;

/// Which part of an arrow is under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowPart {
    Start,
    End,
    /// Anywhere along the shaft: drags the whole arrow.
    Body,
}

/// Which part of an image is under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePart {
    Body,
    Handle(Corner),
}

/// Result of the combined hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Text(AnnotationId),
    Arrow(AnnotationId, ArrowPart),
    Image(AnnotationId, ImagePart),
}

impl Hit {
    pub fn id(&self) -> AnnotationId {
        match *self {
            Hit::Text(id) | Hit::Arrow(id, _) | Hit::Image(id, _) => id,
        }
    }
}

/// Topmost text annotation whose approximate box contains `p`.
pub fn hit_text(p: Point, annotations: &[Annotation], width_factor: f32) -> Option<AnnotationId> {
    annotations
        .iter()
        .rev()
        .filter_map(Annotation::as_text)
        .find(|t| t.bounds(width_factor).contains(p.x, p.y))
        .map(|t| t.id)
}

/// Topmost arrow within `tolerance` of `p`. For each arrow the endpoints are
/// checked before the shaft, so grabbing near a tip edits that tip.
pub fn hit_arrow(
    p: Point,
    annotations: &[Annotation],
    tolerance: f32,
) -> Option<(AnnotationId, ArrowPart)> {
    for arrow in annotations.iter().rev().filter_map(Annotation::as_arrow) {
        let (start, end) = (arrow.start(), arrow.end());
        if p.distance(start) <= tolerance {
            return Some((arrow.id, ArrowPart::Start));
        }
        if p.distance(end) <= tolerance {
            return Some((arrow.id, ArrowPart::End));
        }
        if distance_point_to_segment(p, start, end) <= tolerance {
            return Some((arrow.id, ArrowPart::Body));
        }
    }
    None
}

/// Image under `p`. Resize handles exist only on the selected image and
/// are checked first; every image is move-testable by its rectangle.
pub fn hit_image(
    p: Point,
    annotations: &[Annotation],
    selected: Option<AnnotationId>,
    handle_radius: f32,
) -> Option<(AnnotationId, ImagePart)> {
    let selected_image = selected.and_then(|sel| {
        annotations
            .iter()
            .filter_map(Annotation::as_image)
            .find(|img| img.id == sel)
    });

    if let Some(img) = selected_image {
        let bounds = img.bounds();
        for corner in Corner::ALL {
            let c = bounds.corner(corner);
            if (p.x - c.x).abs() <= handle_radius && (p.y - c.y).abs() <= handle_radius {
                return Some((img.id, ImagePart::Handle(corner)));
            }
        }
    }

    annotations
        .iter()
        .rev()
        .filter_map(Annotation::as_image)
        .find(|img| img.bounds().contains(p.x, p.y))
        .map(|img| (img.id, ImagePart::Body))
}

/// Combined test in drag-start priority order: text, then arrow, then image.
pub fn hit_test(
    p: Point,
    annotations: &[Annotation],
    selected: Option<AnnotationId>,
    config: &EditorConfig,
) -> Option<Hit> {
    let hit = hit_text(p, annotations, config.text_width_factor)
        .map(Hit::Text)
        .or_else(|| {
            hit_arrow(p, annotations, config.arrow_tolerance)
                .map(|(id, part)| Hit::Arrow(id, part))
        })
        .or_else(|| {
            hit_image(p, annotations, selected, config.handle_hit_radius())
                .map(|(id, part)| Hit::Image(id, part))
        });
    log::trace!("hit_test ({}, {}) -> {:?}", p.x, p.y, hit);
    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use tryon_core::raster::RasterHandle;

    fn text(name: &str, x: f32, y: f32, s: &str, font_size: f32) -> Annotation {
        Annotation::Text(TextAnnotation {
            id: AnnotationId::intern(name),
            timestamp: 0,
            x,
            y,
            text: s.into(),
            color: Color::BLACK,
            font_size,
        })
    }

    fn arrow(name: &str, sx: f32, sy: f32, ex: f32, ey: f32) -> Annotation {
        Annotation::Arrow(ArrowAnnotation {
            id: AnnotationId::intern(name),
            timestamp: 0,
            start_x: sx,
            start_y: sy,
            end_x: ex,
            end_y: ey,
            color: Color::RED,
            thickness: 3.0,
        })
    }

    fn image(name: &str, x: f32, y: f32, w: f32, h: f32) -> Annotation {
        Annotation::Image(ImageAnnotation {
            id: AnnotationId::intern(name),
            timestamp: 0,
            x,
            y,
            width: w,
            height: h,
            rotation: 0.0,
            raster: RasterHandle::from_rgba(1, 1, vec![0, 0, 0, 255]).unwrap(),
        })
    }

    #[test]
    fn text_box_sits_above_anchor() {
        let list = vec![text("t_above", 100.0, 100.0, "abcd", 20.0)];
        // 4 chars * 20 * 0.6 = 48 wide, 80..100 tall
        assert!(hit_text(Point::new(110.0, 90.0), &list, 0.6).is_some());
        assert!(hit_text(Point::new(147.0, 81.0), &list, 0.6).is_some());
        assert!(hit_text(Point::new(110.0, 105.0), &list, 0.6).is_none());
        assert!(hit_text(Point::new(149.0, 90.0), &list, 0.6).is_none());
    }

    #[test]
    fn topmost_text_wins() {
        let list = vec![
            text("t_low", 0.0, 50.0, "aaaa", 20.0),
            text("t_high", 0.0, 50.0, "aaaa", 20.0),
        ];
        assert_eq!(
            hit_text(Point::new(5.0, 40.0), &list, 0.6),
            Some(AnnotationId::intern("t_high"))
        );
    }

    #[test]
    fn arrow_endpoint_beats_shaft() {
        let list = vec![arrow("a_ends", 0.0, 0.0, 100.0, 0.0)];
        assert_eq!(
            hit_arrow(Point::new(3.0, 4.0), &list, 15.0),
            Some((AnnotationId::intern("a_ends"), ArrowPart::Start))
        );
        assert_eq!(
            hit_arrow(Point::new(98.0, -5.0), &list, 15.0),
            Some((AnnotationId::intern("a_ends"), ArrowPart::End))
        );
        assert_eq!(
            hit_arrow(Point::new(50.0, 14.0), &list, 15.0),
            Some((AnnotationId::intern("a_ends"), ArrowPart::Body))
        );
        assert_eq!(hit_arrow(Point::new(50.0, 16.0), &list, 15.0), None);
    }

    #[test]
    fn unselected_image_has_no_handles() {
        let list = vec![image("img_unsel", 100.0, 100.0, 200.0, 100.0)];
        assert_eq!(
            hit_image(Point::new(100.0, 100.0), &list, None, 12.0),
            Some((AnnotationId::intern("img_unsel"), ImagePart::Body))
        );
        // Just outside the rect but within handle slack: miss when unselected.
        assert_eq!(hit_image(Point::new(95.0, 95.0), &list, None, 12.0), None);
    }

    #[test]
    fn selected_image_exposes_corner_handles() {
        let id = AnnotationId::intern("img_sel");
        let list = vec![image("img_sel", 100.0, 100.0, 200.0, 100.0)];
        let sel = Some(id);
        assert_eq!(
            hit_image(Point::new(95.0, 95.0), &list, sel, 12.0),
            Some((id, ImagePart::Handle(Corner::TopLeft)))
        );
        assert_eq!(
            hit_image(Point::new(305.0, 195.0), &list, sel, 12.0),
            Some((id, ImagePart::Handle(Corner::BottomRight)))
        );
        assert_eq!(
            hit_image(Point::new(300.0, 100.0), &list, sel, 12.0),
            Some((id, ImagePart::Handle(Corner::TopRight)))
        );
        assert_eq!(
            hit_image(Point::new(200.0, 150.0), &list, sel, 12.0),
            Some((id, ImagePart::Body))
        );
        assert_eq!(hit_image(Point::new(313.0, 200.0), &list, sel, 12.0), None);
    }

    #[test]
    fn text_beats_arrow_at_shared_point() {
        let list = vec![
            text("prio_text", 0.0, 20.0, "label", 20.0),
            arrow("prio_arrow", 0.0, 10.0, 100.0, 10.0),
        ];
        let hit = hit_test(Point::new(10.0, 10.0), &list, None, &EditorConfig::default());
        assert_eq!(hit, Some(Hit::Text(AnnotationId::intern("prio_text"))));
    }

    #[test]
    fn arrow_beats_image() {
        let list = vec![
            arrow("prio_a2", 0.0, 50.0, 100.0, 50.0),
            image("prio_img", 0.0, 0.0, 100.0, 100.0),
        ];
        let hit = hit_test(Point::new(50.0, 52.0), &list, None, &EditorConfig::default());
        assert_eq!(
            hit,
            Some(Hit::Arrow(AnnotationId::intern("prio_a2"), ArrowPart::Body))
        );
    }

    #[test]
    fn empty_canvas_misses() {
        assert_eq!(
            hit_test(Point::new(1.0, 1.0), &[], None, &EditorConfig::default()),
            None
        );
    }
}
