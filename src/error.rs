use thiserror::Error;

/// Failure taxonomy for the fetch/analysis pipeline.
///
/// The split matters for retries: `Transport` failures are transient and
/// worth another attempt; `Upstream` means the exchange answered with
/// something we cannot use (schema problem, not transient), so the retry
/// loop fails fast on it.
#[derive(Debug, Error)]
pub enum Error {
    /// Network-level failure: connect, DNS, timeout.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Response received but unusable: non-JSON body, missing field,
    /// non-retryable HTTP status.
    #[error("upstream returned unusable data: {0}")]
    Upstream(String),

    /// No expiry matched any tried target month.
    #[error("no expiry found: {0}")]
    NoExpiryFound(String),

    /// Caller handed us something economically or structurally nonsensical.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Everything reqwest surfaces before a body is decoded is
        // network-level: connect, DNS, timeout, broken transfer.
        Error::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Upstream(format!("JSON parse failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
