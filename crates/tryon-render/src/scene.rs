//! Vello-backed surface.
//!
//! Records drawing calls into a `vello::Scene`; the host presents the scene
//! through its own wgpu renderer.

use crate::surface::Surface;
use kurbo::{
    Affine, BezPath, Cap, Circle, Join, Point as KurboPoint, Rect, Stroke as KurboStroke,
};
use peniko::{Blob, Color as PenikoColor, Fill, Image, ImageFormat};
use std::collections::HashMap;
use tryon_core::geometry::Bounds;
use tryon_core::id::RasterId;
use tryon_core::model::{Color, Point};
use tryon_core::raster::RasterHandle;
use vello::Scene;

/// A `Surface` that paints into a Vello scene.
///
/// Uploaded images are cached per raster ID, so repainting the same
/// snapshot does not copy pixels again.
#[derive(Default)]
pub struct VelloSurface {
    scene: Scene,
    images: HashMap<RasterId, Image>,
}

impl VelloSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Drop cached images whose rasters are no longer referenced.
    pub fn retain_images(&mut self, live: impl IntoIterator<Item = RasterId>) {
        let live: std::collections::HashSet<RasterId> = live.into_iter().collect();
        self.images.retain(|id, _| live.contains(id));
    }

    fn image_for(&mut self, raster: &RasterHandle) -> Image {
        self.images
            .entry(raster.id())
            .or_insert_with(|| {
                let bytes = raster.pixels().as_raw().clone();
                Image::new(
                    Blob::from(bytes),
                    ImageFormat::Rgba8,
                    raster.width(),
                    raster.height(),
                )
            })
            .clone()
    }
}

impl Surface for VelloSurface {
    fn clear(&mut self, width: f32, height: f32) {
        self.scene.reset();
        log::trace!("frame {width}x{height}");
    }

    fn draw_raster(&mut self, raster: &RasterHandle, bounds: Bounds, rotation: f32) {
        if raster.width() == 0 || raster.height() == 0 {
            return;
        }
        let image = self.image_for(raster);
        let (cx, cy) = bounds.center();
        let sx = bounds.width as f64 / raster.width() as f64;
        let sy = bounds.height as f64 / raster.height() as f64;
        let pivot = KurboPoint::new(cx as f64, cy as f64);
        let transform = Affine::rotate_about(rotation as f64, pivot)
            * Affine::translate((bounds.x as f64, bounds.y as f64))
            * Affine::scale_non_uniform(sx, sy);
        self.scene.draw_image(&image, transform);
    }

    fn stroke_polyline(&mut self, points: &[Point], color: Color, width: f32) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let mut path = BezPath::new();
        path.move_to((first.x as f64, first.y as f64));
        for p in rest {
            path.line_to((p.x as f64, p.y as f64));
        }
        let stroke = KurboStroke::new(width as f64)
            .with_caps(Cap::Round)
            .with_join(Join::Round);
        self.scene
            .stroke(&stroke, Affine::IDENTITY, to_peniko(color), None, &path);
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        let circle = Circle::new((center.x as f64, center.y as f64), radius as f64);
        self.scene
            .fill(Fill::NonZero, Affine::IDENTITY, to_peniko(color), None, &circle);
    }

    fn fill_text(&mut self, text: &str, anchor: Point, _color: Color, font_size: f32) {
        // Glyph shaping needs a font context the host owns; the web host
        // paints text through its Canvas2D surface instead.
        log::trace!(
            "TEXT {:?} at ({}, {}) size {}",
            text,
            anchor.x,
            anchor.y,
            font_size
        );
    }

    fn stroke_rect(&mut self, bounds: Bounds, color: Color, width: f32) {
        let stroke = KurboStroke::new(width as f64);
        self.scene
            .stroke(&stroke, Affine::IDENTITY, to_peniko(color), None, &to_rect(bounds));
    }

    fn fill_rect(&mut self, bounds: Bounds, color: Color) {
        self.scene.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            to_peniko(color),
            None,
            &to_rect(bounds),
        );
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn to_rect(b: Bounds) -> Rect {
    Rect::new(
        b.x as f64,
        b.y as f64,
        b.right() as f64,
        b.bottom() as f64,
    )
}

fn to_peniko(c: Color) -> PenikoColor {
    let [r, g, b, a] = c.to_rgba8();
    PenikoColor::from_rgba8(r, g, b, a)
}
