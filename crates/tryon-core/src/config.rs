//! Editor tuning knobs.

use crate::error::{TryOnError, TryOnResult};
use serde::{Deserialize, Serialize};

// ─── Config ───────────────────────────────────────────────────────────────

/// Geometry and history limits for the markup editor.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum number of history snapshots kept, including the initial
    /// empty one. Default: **50**.
    pub history_limit: usize,

    /// Smallest width or height an image may be resized to. Default: **20**.
    pub min_image_size: f32,

    /// Drawn side length of an image resize handle. Default: **12**.
    pub handle_size: f32,

    /// Extra slack around each handle for pointer hits. Default: **6**.
    pub handle_tolerance: f32,

    /// Max pointer distance from an arrow to count as a hit. Default: **15**.
    pub arrow_tolerance: f32,

    /// Approximate glyph width as a fraction of font size. Default: **0.6**.
    pub text_width_factor: f32,

    /// Longest side of a freshly inserted image. Default: **300**.
    pub initial_image_max: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 50,
            min_image_size: 20.0,
            handle_size: 12.0,
            handle_tolerance: 6.0,
            arrow_tolerance: 15.0,
            text_width_factor: 0.6,
            initial_image_max: 300.0,
        }
    }
}

impl EditorConfig {
    /// Parse from JSON and validate.
    pub fn from_json(json: &str) -> TryOnResult<Self> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TryOnResult<()> {
        if self.history_limit == 0 {
            return Err(TryOnError::validation("historyLimit must be at least 1"));
        }
        let positive = [
            ("minImageSize", self.min_image_size),
            ("handleSize", self.handle_size),
            ("arrowTolerance", self.arrow_tolerance),
            ("textWidthFactor", self.text_width_factor),
            ("initialImageMax", self.initial_image_max),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TryOnError::validation(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(self.handle_tolerance.is_finite() && self.handle_tolerance >= 0.0) {
            return Err(TryOnError::validation("handleTolerance must not be negative"));
        }
        Ok(())
    }

    /// Half-width of the square hotspot around each resize handle.
    pub fn handle_hit_radius(&self) -> f32 {
        self.handle_size / 2.0 + self.handle_tolerance
    }
}
