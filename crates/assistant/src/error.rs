use thiserror::Error;

/// Failures of the AI path. None of them reaches the HTTP client: the
/// assistant falls back to line extraction and reports the reason as a warning.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("ai request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("ai service answered {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("could not decode ai answer: {0}")]
    Decode(String),
    #[error("ai parsing is disabled")]
    Disabled,
}
