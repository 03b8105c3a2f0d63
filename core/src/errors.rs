use thiserror::Error;

/// Errors raised by the advisor core.
#[derive(Error, Debug)]
pub enum AdvisorError {
    /// The Gemini API key is missing from the property store. Checked
    /// before any network call is attempted.
    #[error("Gemini API key is not configured")]
    MissingApiKey,

    /// The API answered with a non-2xx transport status.
    #[error("API error: status {status}: {body}")]
    Api { status: u16, body: String },

    /// A 200 response whose first candidate carries no content, usually a
    /// safety-filter block.
    #[error("API returned no content (finish reason: {finish_reason})")]
    Blocked { finish_reason: String },

    /// The request could not be sent at all.
    #[error("Request error: {0}")]
    Request(String),

    /// The response envelope or the model's structured output failed to
    /// parse as JSON.
    #[error("Parsing error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Property-store I/O failure.
    #[error("Property store error: {0}")]
    Store(String),
}

/// Result type for advisor operations
pub type AdvisorResult<T> = Result<T, AdvisorError>;
