//! Annotation data model for the markup canvas.
//!
//! The canvas holds a flat, insertion-ordered list of annotations (strokes,
//! arrows, text labels, embedded images) drawn over a working image, plus a
//! separate list of mask dabs marking the region an AI edit should touch.
//! Everything is in canvas space (pixels, not normalized).

use crate::geometry::Bounds;
use crate::id::AnnotationId;
use crate::raster::RasterHandle;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgba(1.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with its alpha multiplied by `factor`.
    pub fn with_alpha(self, factor: f32) -> Self {
        Self {
            a: (self.a * factor).clamp(0.0, 1.0),
            ..self
        }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let short = |i: usize| hex_val(bytes[i]).map(|v| (v * 17) as f32 / 255.0);
        let long = |i: usize| -> Option<f32> {
            Some((hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) as f32 / 255.0)
        };

        match bytes.len() {
            3 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, 1.0)),
            4 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, 1.0)),
            8 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, long(6)?)),
            _ => None,
        }
    }

    /// 8-bit channels, rounded.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    /// CSS `rgba()` string, for hosts that paint with CSS colors.
    pub fn to_css(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({r}, {g}, {b}, {:.3})", self.a.clamp(0.0, 1.0))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("bad color {s:?}")))
    }
}

// ─── Points & mask dabs ──────────────────────────────────────────────────

/// A canvas-space point. `timestamp` only orders samples; it never drives
/// timing logic.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn distance(&self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Component-wise `self - other`.
    pub fn delta(&self, other: Point) -> (f32, f32) {
        (self.x - other.x, self.y - other.y)
    }
}

/// One brush dab of the region mask.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaskStroke {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

impl MaskStroke {
    pub const fn new(x: f32, y: f32, size: f32) -> Self {
        Self { x, y, size }
    }
}

// ─── Annotations ─────────────────────────────────────────────────────────

/// Freehand stroke. Valid with two or more points.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawAnnotation {
    pub id: AnnotationId,
    pub timestamp: u64,
    pub path: Vec<Point>,
    pub color: Color,
    pub thickness: f32,
}

/// Straight arrow from `start` to `end` (head at `end`).
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowAnnotation {
    pub id: AnnotationId,
    pub timestamp: u64,
    pub start_x: f32,
    pub start_y: f32,
    pub end_x: f32,
    pub end_y: f32,
    pub color: Color,
    pub thickness: f32,
}

impl ArrowAnnotation {
    pub fn start(&self) -> Point {
        Point::new(self.start_x, self.start_y)
    }

    pub fn end(&self) -> Point {
        Point::new(self.end_x, self.end_y)
    }

    pub fn set_start(&mut self, p: Point) {
        self.start_x = p.x;
        self.start_y = p.y;
    }

    pub fn set_end(&mut self, p: Point) {
        self.end_x = p.x;
        self.end_y = p.y;
    }
}

/// Text label. `(x, y)` is the baseline-left anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct TextAnnotation {
    pub id: AnnotationId,
    pub timestamp: u64,
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub color: Color,
    pub font_size: f32,
}

impl TextAnnotation {
    /// Approximate box: `font_size` tall, `chars * font_size * width_factor`
    /// wide, extending up and right from the anchor.
    pub fn bounds(&self, width_factor: f32) -> Bounds {
        let width = self.text.chars().count() as f32 * self.font_size * width_factor;
        Bounds {
            x: self.x,
            y: self.y - self.font_size,
            width,
            height: self.font_size,
        }
    }
}

/// Embedded image. Aspect ratio is fixed by the first `width / height`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAnnotation {
    pub id: AnnotationId,
    pub timestamp: u64,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Radians. Carried through edits, never changed by resize.
    pub rotation: f32,
    pub raster: RasterHandle,
}

impl ImageAnnotation {
    pub fn bounds(&self) -> Bounds {
        Bounds {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn set_bounds(&mut self, b: Bounds) {
        self.x = b.x;
        self.y = b.y;
        self.width = b.width;
        self.height = b.height;
    }
}

/// A user-created overlay on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Draw(DrawAnnotation),
    Arrow(ArrowAnnotation),
    Text(TextAnnotation),
    Image(ImageAnnotation),
}

impl Annotation {
    pub fn id(&self) -> AnnotationId {
        match self {
            Annotation::Draw(a) => a.id,
            Annotation::Arrow(a) => a.id,
            Annotation::Text(a) => a.id,
            Annotation::Image(a) => a.id,
        }
    }

    /// Creation order within the owning store.
    pub fn timestamp(&self) -> u64 {
        match self {
            Annotation::Draw(a) => a.timestamp,
            Annotation::Arrow(a) => a.timestamp,
            Annotation::Text(a) => a.timestamp,
            Annotation::Image(a) => a.timestamp,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Annotation::Draw(_) => "draw",
            Annotation::Arrow(_) => "arrow",
            Annotation::Text(_) => "text",
            Annotation::Image(_) => "image",
        }
    }

    pub fn as_text(&self) -> Option<&TextAnnotation> {
        match self {
            Annotation::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_arrow(&self) -> Option<&ArrowAnnotation> {
        match self {
            Annotation::Arrow(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageAnnotation> {
        match self {
            Annotation::Image(i) => Some(i),
            _ => None,
        }
    }
}

/// Full-value copy of the canvas state, recorded after each committed edit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistorySnapshot {
    pub annotations: Vec<Annotation>,
    pub mask_strokes: Vec<MaskStroke>,
}
