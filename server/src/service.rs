use std::sync::Arc;

use advisor_core::client::GeminiClient;
use advisor_core::errors::AdvisorResult;
use advisor_core::props::{keys, long_term_memory, PropertyStore};
use advisor_core::types::{AnalysisResult, Content, OptionalColumns};
use advisor_core::{prompt, schema};
use tracing::info;

use crate::usage_log::UsageLog;

/// Entry points exposed to the UI layer. Each call performs at most one
/// outbound API request and re-reads the long-term memory from the store,
/// so edits take effect on the next request.
pub struct AdvisorService {
    props: Arc<dyn PropertyStore>,
    client: GeminiClient,
    usage: UsageLog,
}

impl AdvisorService {
    pub fn new(client: GeminiClient, props: Arc<dyn PropertyStore>) -> Self {
        let usage = UsageLog::new(props.clone());
        Self {
            props,
            client,
            usage,
        }
    }

    /// Free-form multi-turn chat. The history is passed through to the API
    /// unmodified, oldest turn first.
    pub async fn chat(
        &self,
        history: Vec<Content>,
        analysis_context: &str,
    ) -> AdvisorResult<String> {
        info!(turns = history.len(), "Chat request");
        let memory = long_term_memory(self.props.as_ref())?;
        let instruction = prompt::chat_system_instruction(analysis_context, &memory);
        self.client.invoke_chat(history, &instruction).await
    }

    /// Batch structured analysis of the named standards. Usage telemetry
    /// is recorded as a side effect; its failures never surface.
    pub async fn analyze(
        &self,
        items: &[String],
        country: &str,
        columns: &OptionalColumns,
    ) -> AdvisorResult<Vec<AnalysisResult>> {
        info!(count = items.len(), country, "Analysis request");
        let memory = long_term_memory(self.props.as_ref())?;
        let instruction = prompt::analysis_system_instruction(&memory);
        let response_schema = schema::analysis_response_schema(columns);
        let user_prompt = prompt::analysis_user_prompt(country, items);

        let outcome = self
            .client
            .invoke_analysis(&user_prompt, &instruction, response_schema)
            .await?;

        // Every 200 response is logged, including blocked ones: they still
        // consume tokens even when no rows come back.
        self.usage
            .record(items.len(), country, &outcome.usage, &outcome.finish_reason);

        outcome.rows
    }

    /// Current long-term memory; empty string when unset.
    pub fn memory(&self) -> AdvisorResult<String> {
        long_term_memory(self.props.as_ref())
    }

    /// Overwrites the long-term memory.
    pub fn set_memory(&self, value: &str) -> AdvisorResult<()> {
        info!(len = value.len(), "Updating long-term memory");
        self.props.set(keys::LONG_TERM_MEMORY, value)
    }

    /// Display name of the configured model, or `"unknown"`.
    pub fn model_name(&self) -> String {
        self.client.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::props::MemoryPropertyStore;

    fn service_for_endpoint(endpoint: &str) -> AdvisorService {
        let props: Arc<dyn PropertyStore> = Arc::new(MemoryPropertyStore::new());
        AdvisorService::new(GeminiClient::new(endpoint, props.clone()), props)
    }

    #[test]
    fn test_model_name_from_endpoint() {
        let service = service_for_endpoint(
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent",
        );
        assert_eq!(service.model_name(), "gemini-2.5-flash");
    }

    #[test]
    fn test_model_name_unknown_for_unrecognized_endpoint() {
        let service = service_for_endpoint("https://example.com/llm");
        assert_eq!(service.model_name(), "unknown");
    }

    #[test]
    fn test_memory_roundtrip() {
        let service = service_for_endpoint("https://example.com/llm");
        assert_eq!(service.memory().unwrap(), "");
        service.set_memory("всегда отвечай кратко").unwrap();
        assert_eq!(service.memory().unwrap(), "всегда отвечай кратко");
    }
}
