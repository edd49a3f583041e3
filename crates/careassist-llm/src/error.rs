use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat completion request timed out")]
    Timeout,

    #[error("chat API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON deserialization error for chat completion: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("chat API returned no completion content")]
    EmptyCompletion,

    #[error("Please describe your symptoms.")]
    EmptyPrompt,

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
