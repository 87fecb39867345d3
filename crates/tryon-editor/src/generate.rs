//! Request/response contract for the external image-generation backend.
//!
//! The editor flattens its working image (plus mask dabs or a prompt) into a
//! `GenerationRequest`; the backend answers with a `GenerationResponse`
//! carrying a new raster or an error message. JSON field names are
//! camelCase and absent optionals are omitted.

use serde::{Deserialize, Serialize};
use tryon_core::error::{TryOnError, TryOnResult};
use tryon_core::model::MaskStroke;

/// Which generate action was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    /// Region edit: mask dabs plus the mask tool's prompt.
    Mask,
    /// Whole-image edit driven by a prompt.
    Prompt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Base64 PNG of the working image.
    pub image_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_data: Option<Vec<MaskStroke>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl GenerationRequest {
    pub fn to_json(&self) -> TryOnResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Caller-tunable knobs. `prompt` is used by prompt generation; mask
/// generation takes its prompt from the mask tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationParams {
    pub prompt: Option<String>,
    pub strength: Option<f32>,
    pub guidance: Option<f32>,
    pub steps: Option<u32>,
    pub seed: Option<u64>,
}

impl GenerationParams {
    pub fn from_json(json: &str) -> TryOnResult<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> TryOnResult<()> {
        if let Some(s) = self.strength
            && !(0.0..=1.0).contains(&s)
        {
            return Err(TryOnError::validation(format!(
                "strength must be within 0..=1, got {s}"
            )));
        }
        if let Some(g) = self.guidance
            && !(1.0..=20.0).contains(&g)
        {
            return Err(TryOnError::validation(format!(
                "guidance must be within 1..=20, got {g}"
            )));
        }
        if self.steps == Some(0) {
            return Err(TryOnError::validation("steps must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutput {
    /// New raster: bare base64 or a data URL.
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<GenerationOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResponse {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            result: Some(GenerationOutput {
                output: output.into(),
                request_id: None,
            }),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }

    pub fn from_json(json: &str) -> TryOnResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Collapse into the output on success, or a `Generation` error.
    pub fn into_result(self) -> TryOnResult<GenerationOutput> {
        match (self.success, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(TryOnError::generation("response has no result")),
            (false, _) => Err(TryOnError::generation(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            )),
        }
    }
}

/// Synchronous stand-in for the generation backend. An `Err` models a
/// transport failure or a thrown exception.
pub trait Generator {
    fn generate(&mut self, request: &GenerationRequest) -> TryOnResult<GenerationResponse>;
}

impl<F> Generator for F
where
    F: FnMut(&GenerationRequest) -> TryOnResult<GenerationResponse>,
{
    fn generate(&mut self, request: &GenerationRequest) -> TryOnResult<GenerationResponse> {
        self(request)
    }
}
