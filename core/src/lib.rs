// Core functionality for the standards advisor:
// - Gemini API client (one POST per invocation, no retries)
// - Request/response data structures
// - Prompt and response-schema builders
// - Persisted key-value property store
// - Shared error types

// Export client module - API client for Gemini
pub mod client;
pub use client::*;

// Export types module - Request/response data structures
pub mod types;
pub use types::*;

// Export errors module - Shared error types
pub mod errors;
pub use errors::*;

// Export props module - Persisted configuration store
pub mod props;
pub use props::*;

// Export prompt module - System-instruction assembly
pub mod prompt;

// Export schema module - Structured-output schema assembly
pub mod schema;
