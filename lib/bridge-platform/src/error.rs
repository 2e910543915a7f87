use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlatformError>;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Control plane request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Control plane returned status {0}")]
    Status(u16),

    #[error("Malformed control plane response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("Control plane unavailable after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

impl PlatformError {
    /// Whether retrying the request could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            PlatformError::Request(_) => true,
            PlatformError::Status(status) => *status >= 500,
            _ => false,
        }
    }
}
