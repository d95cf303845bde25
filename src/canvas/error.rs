#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("Canvas returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("Canvas request failed: {0}")]
    Transport(String),
    #[error("Canvas response could not be decoded: {0}")]
    Decode(String),
    #[error("Invalid Canvas URL: {0}")]
    InvalidUrl(String),
}

impl CanvasError {
    /// Transport failures, rate limiting and server errors are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            CanvasError::Status { status, .. } => *status == 429 || *status >= 500,
            CanvasError::Transport(_) => true,
            CanvasError::Decode(_) | CanvasError::InvalidUrl(_) => false,
        }
    }
}

pub type CanvasResult<T> = Result<T, CanvasError>;
