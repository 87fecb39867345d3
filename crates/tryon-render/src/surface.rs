//! The drawing surface the painter drives.
//!
//! A surface owns pixels (a GPU scene, a browser canvas, a test recorder)
//! and nothing else: it never sees the store and never mutates annotations.

use tryon_core::geometry::Bounds;
use tryon_core::model::{Color, Point};
use tryon_core::raster::RasterHandle;

pub trait Surface {
    /// Start a new frame of the given size.
    fn clear(&mut self, width: f32, height: f32);

    /// Draw a raster scaled into `bounds`, rotated by `rotation` radians
    /// about the center of `bounds`.
    fn draw_raster(&mut self, raster: &RasterHandle, bounds: Bounds, rotation: f32);

    /// Open polyline with round caps and joins.
    fn stroke_polyline(&mut self, points: &[Point], color: Color, width: f32);

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color);

    /// Text with its baseline-left corner at `anchor`.
    fn fill_text(&mut self, text: &str, anchor: Point, color: Color, font_size: f32);

    fn stroke_rect(&mut self, bounds: Bounds, color: Color, width: f32);

    fn fill_rect(&mut self, bounds: Bounds, color: Color);
}
