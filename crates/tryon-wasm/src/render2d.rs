//! Canvas2D surface.
//!
//! Implements `Surface` over an HTML `<canvas>` via
//! `CanvasRenderingContext2d`. Rasters are uploaded once into offscreen
//! canvases keyed by `RasterId` and blitted with `drawImage` afterwards.

use std::collections::HashMap;
use std::f64::consts::TAU;
use tryon_core::geometry::Bounds;
use tryon_core::id::RasterId;
use tryon_core::model::{Color, Point};
use tryon_core::raster::RasterHandle;
use tryon_render::surface::Surface;
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

/// Offscreen canvases holding uploaded raster pixels.
#[derive(Default)]
pub struct ImageCache {
    canvases: HashMap<RasterId, HtmlCanvasElement>,
}

impl ImageCache {
    /// Drop canvases for rasters no longer referenced.
    pub fn retain(&mut self, live: &[RasterId]) {
        self.canvases.retain(|id, _| live.contains(id));
    }

    fn get_or_upload(&mut self, raster: &RasterHandle) -> Result<&HtmlCanvasElement, JsValue> {
        if !self.canvases.contains_key(&raster.id()) {
            let canvas = upload(raster)?;
            self.canvases.insert(raster.id(), canvas);
        }
        self.canvases
            .get(&raster.id())
            .ok_or_else(|| JsValue::from_str("raster cache miss"))
    }
}

fn upload(raster: &RasterHandle) -> Result<HtmlCanvasElement, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    canvas.set_width(raster.width());
    canvas.set_height(raster.height());
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;
    let data = ImageData::new_with_u8_clamped_array_and_sh(
        Clamped(raster.pixels().as_raw().as_slice()),
        raster.width(),
        raster.height(),
    )?;
    ctx.put_image_data(&data, 0.0, 0.0)?;
    log::debug!("uploaded raster {} ({}x{})", raster.id().get(), raster.width(), raster.height());
    Ok(canvas)
}

pub struct Canvas2dSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
    images: &'a mut ImageCache,
}

impl<'a> Canvas2dSurface<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d, images: &'a mut ImageCache) -> Self {
        Self { ctx, images }
    }

    fn try_draw_raster(&mut self, raster: &RasterHandle, b: Bounds, rotation: f32) -> Result<(), JsValue> {
        let image = self.images.get_or_upload(raster)?;
        let ctx = self.ctx;
        if rotation == 0.0 {
            return ctx.draw_image_with_html_canvas_element_and_dw_and_dh(
                image,
                b.x as f64,
                b.y as f64,
                b.width as f64,
                b.height as f64,
            );
        }
        let (cx, cy) = b.center();
        ctx.save();
        ctx.translate(cx as f64, cy as f64)?;
        ctx.rotate(rotation as f64)?;
        let drawn = ctx.draw_image_with_html_canvas_element_and_dw_and_dh(
            image,
            -(b.width as f64) / 2.0,
            -(b.height as f64) / 2.0,
            b.width as f64,
            b.height as f64,
        );
        ctx.restore();
        drawn
    }
}

impl Surface for Canvas2dSurface<'_> {
    fn clear(&mut self, width: f32, height: f32) {
        self.ctx.clear_rect(0.0, 0.0, width as f64, height as f64);
    }

    fn draw_raster(&mut self, raster: &RasterHandle, bounds: Bounds, rotation: f32) {
        if let Err(e) = self.try_draw_raster(raster, bounds, rotation) {
            log::warn!("drawImage failed: {e:?}");
        }
    }

    fn stroke_polyline(&mut self, points: &[Point], color: Color, width: f32) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let ctx = self.ctx;
        ctx.set_stroke_style_str(&color.to_css());
        ctx.set_line_width(width as f64);
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        ctx.begin_path();
        ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            ctx.line_to(p.x as f64, p.y as f64);
        }
        ctx.stroke();
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        let ctx = self.ctx;
        ctx.set_fill_style_str(&color.to_css());
        ctx.begin_path();
        if ctx
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)
            .is_ok()
        {
            ctx.fill();
        }
    }

    fn fill_text(&mut self, text: &str, anchor: Point, color: Color, font_size: f32) {
        let ctx = self.ctx;
        ctx.set_font(&format!("{font_size}px sans-serif"));
        ctx.set_text_baseline("alphabetic");
        ctx.set_fill_style_str(&color.to_css());
        if let Err(e) = ctx.fill_text(text, anchor.x as f64, anchor.y as f64) {
            log::warn!("fillText failed: {e:?}");
        }
    }

    fn stroke_rect(&mut self, b: Bounds, color: Color, width: f32) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width as f64);
        self.ctx
            .stroke_rect(b.x as f64, b.y as f64, b.width as f64, b.height as f64);
    }

    fn fill_rect(&mut self, b: Bounds, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx
            .fill_rect(b.x as f64, b.y as f64, b.width as f64, b.height as f64);
    }
}
