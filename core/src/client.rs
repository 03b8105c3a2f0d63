use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{AdvisorError, AdvisorResult};
use crate::props::{keys, PropertyStore};
use crate::types::*;

/// Fallback returned when a 200 response carries candidates but no usable
/// text (e.g. blocked by safety filters). A soft failure, not an error.
pub const CHAT_FALLBACK: &str =
    "Не удалось получить ответ от ИИ. Попробуйте переформулировать запрос.";

const FINISH_REASON_UNKNOWN: &str = "UNKNOWN";

/// Client for the Gemini generateContent endpoint. Performs exactly one
/// POST per invocation; no retries, no streaming, no timeout beyond the
/// transport default.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    props: Arc<dyn PropertyStore>,
}

impl GeminiClient {
    /// Create a new Gemini API client for a full
    /// `…/models/<model>:generateContent` endpoint URL. The API key is
    /// read from the property store at each invocation, not captured here.
    pub fn new(endpoint: impl Into<String>, props: Arc<dyn PropertyStore>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            props,
        }
    }

    /// Extracts the model identifier from the endpoint URL, or `"unknown"`
    /// when the URL has no `models/<name>:` segment.
    pub fn model_name(&self) -> String {
        self.endpoint
            .split("models/")
            .nth(1)
            .and_then(|rest| rest.split_once(':'))
            .map(|(name, _)| name.to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Reads the API key, failing before any network I/O when it is absent.
    fn api_key(&self) -> AdvisorResult<String> {
        self.props
            .get(keys::GEMINI_API_KEY)?
            .filter(|key| !key.is_empty())
            .ok_or(AdvisorError::MissingApiKey)
    }

    /// Issues the single POST and returns the raw transport status and body.
    /// Non-2xx statuses are not an error here; the interpreters decide.
    async fn dispatch(&self, request: &GenerateContentRequest) -> AdvisorResult<(u16, String)> {
        let api_key = self.api_key()?;
        let url = format!("{}?key={}", self.endpoint, api_key);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AdvisorError::Request(format!("Failed to send request: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AdvisorError::Request(format!("Failed to read response: {}", e)))?;

        debug!(status, body_len = body.len(), "Gemini API responded");
        Ok((status, body))
    }

    /// Free-form chat: sends the conversation history unmodified with the
    /// given system instruction and returns the generated text, or the
    /// fixed fallback string when the model produced none.
    pub async fn invoke_chat(
        &self,
        history: Vec<Content>,
        system_instruction: &str,
    ) -> AdvisorResult<String> {
        let request = GenerateContentRequest {
            contents: history,
            system_instruction: Some(Content::text(system_instruction)),
            generation_config: Some(GenerationConfig::chat()),
        };

        let (status, body) = self.dispatch(&request).await?;
        interpret_chat_response(status, &body)
    }

    /// Structured analysis: sends a single-turn prompt constrained to JSON
    /// conforming to `schema`. Every 200 response yields an outcome whose
    /// usage metadata and finish reason are set; the rows themselves may
    /// still be an error (blocked candidate, unparseable output).
    pub async fn invoke_analysis(
        &self,
        prompt: &str,
        system_instruction: &str,
        schema: Value,
    ) -> AdvisorResult<AnalysisOutcome> {
        let request = GenerateContentRequest {
            contents: vec![Content::text(prompt)],
            system_instruction: Some(Content::text(system_instruction)),
            generation_config: Some(GenerationConfig::analysis(schema)),
        };

        let (status, body) = self.dispatch(&request).await?;
        interpret_analysis_response(status, &body)
    }
}

/// First text part of the first candidate, if any.
fn first_text(response: &GenerateContentResponse) -> Option<&str> {
    response
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .first()?
        .text
        .as_deref()
}

/// Finish reason of the first candidate, or `default` when absent. The
/// analysis path defaults to `"UNKNOWN"`, the chat diagnostic to `"N/A"`.
fn finish_reason_or(response: &GenerateContentResponse, default: &str) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.finish_reason.clone())
        .unwrap_or_else(|| default.to_string())
}

/// Interprets a chat-mode transport outcome. Pure function of the status
/// and body so that every branch is testable without a live endpoint.
fn interpret_chat_response(status: u16, body: &str) -> AdvisorResult<String> {
    if status != 200 {
        return Err(AdvisorError::Api {
            status,
            body: body.to_string(),
        });
    }

    let response: GenerateContentResponse = serde_json::from_str(body)?;
    match first_text(&response).filter(|text| !text.is_empty()) {
        Some(text) => Ok(text.to_string()),
        None => {
            warn!(
                finish_reason = %finish_reason_or(&response, "N/A"),
                "Gemini response contained no text; returning fallback"
            );
            Ok(CHAT_FALLBACK.to_string())
        }
    }
}

/// Interprets an analysis-mode transport outcome. Any parseable 200
/// envelope produces an outcome carrying usage metadata and finish reason;
/// a candidate without content (safety filter or malformed envelope) makes
/// the rows an error while the telemetry stays usable.
fn interpret_analysis_response(status: u16, body: &str) -> AdvisorResult<AnalysisOutcome> {
    if status != 200 {
        return Err(AdvisorError::Api {
            status,
            body: body.to_string(),
        });
    }

    let response: GenerateContentResponse = serde_json::from_str(body)?;
    let usage = response.usage_metadata;
    let finish_reason = finish_reason_or(&response, FINISH_REASON_UNKNOWN);

    let rows = match first_text(&response) {
        // The response format was schema-constrained, so this parse is
        // expected to succeed; a failure propagates as a plain parse error.
        Some(text) => serde_json::from_str::<Vec<AnalysisResult>>(text).map_err(Into::into),
        None => Err(AdvisorError::Blocked {
            finish_reason: finish_reason.clone(),
        }),
    };

    Ok(AnalysisOutcome {
        rows,
        usage,
        finish_reason,
    })
}
