use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Content structure for requests and responses
#[derive(Serialize, Clone, Debug, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Content {
    /// Single-part text content without a role, as used for one-shot
    /// analysis prompts and system instructions.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::text(text)],
            role: None,
        }
    }
}

/// Part structure for a piece of content
#[derive(Serialize, Clone, Debug, Deserialize)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Request to Gemini API to generate content
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// Generation configuration options
#[derive(Serialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
}

impl GenerationConfig {
    /// Fixed tuning for the free-form chat mode. Not user-settable.
    pub fn chat() -> Self {
        Self {
            temperature: Some(0.1),
            top_k: Some(20),
            top_p: Some(0.8),
            max_output_tokens: Some(8192),
            response_mime_type: None,
            response_schema: None,
        }
    }

    /// Fixed tuning for the structured analysis mode: the response is
    /// constrained to JSON conforming to `schema`.
    pub fn analysis(schema: Value) -> Self {
        Self {
            temperature: Some(0.1),
            top_k: Some(40),
            top_p: Some(0.95),
            max_output_tokens: Some(8192),
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema),
        }
    }
}

/// Response from Gemini API
#[derive(Deserialize, Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: UsageMetadata,
}

/// Candidate in the response
#[derive(Deserialize, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token accounting reported by the API; every count defaults to 0 when
/// the field is absent from the envelope.
#[derive(Deserialize, Debug, Serialize, Default, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

/// Flags selecting the optional columns of an analysis response.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub struct OptionalColumns {
    #[serde(default)]
    pub replaced_by: bool,
    #[serde(default)]
    pub sources: bool,
}

/// One analysed standard, as returned by the model. The result list is
/// trusted to match the requested designation list in order and count;
/// the contract does not verify it.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub requested_designation: String,
    /// "Да" or "Нет" by instruction.
    pub exists: String,
    pub full_name: String,
    pub status: String,
    pub ai_note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
}

/// Everything `invoke_analysis` extracts from a 200 response. Usage
/// metadata and finish reason are available even when the candidate
/// carried no rows, so blocked calls (which still consume tokens) can be
/// logged before the failure propagates.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub rows: crate::errors::AdvisorResult<Vec<AnalysisResult>>,
    pub usage: UsageMetadata,
    pub finish_reason: String,
}
