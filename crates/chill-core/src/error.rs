use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChillError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ChillError {
    /// Returns `true` when the error is worth retrying
    /// (network failures, HTTP 408/429 and any 5xx).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Server { status, .. } => is_transient_status(*status),
            _ => false,
        }
    }
}

fn is_transient_status(status: u16) -> bool {
    matches!(status, 408 | 429) || (500..600).contains(&status)
}

pub type Result<T> = std::result::Result<T, ChillError>;
