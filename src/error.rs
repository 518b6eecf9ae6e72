//! Error types for the two outbound legs of the service.
//!
//! Neither type ever escapes a handler: routes map each variant onto a
//! status code and a stable error tag.

use serde_json::Value as JsonValue;

/// Failures while dispatching a generation request to fal.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No `FAL_KEY` configured; no outbound call is attempted.
    #[error("missing FAL_KEY")]
    MissingCredential,

    /// The call did not finish within the configured timeout.
    #[error("fal request timed out")]
    Timeout,

    /// Connection, DNS, TLS or body-read failure.
    #[error("fal request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// fal answered with a non-2xx status.
    #[error("fal returned HTTP {status}")]
    Upstream {
        status: u16,
        /// Parsed body, or `{"raw": text}` when it was not JSON.
        details: JsonValue,
    },

    /// 2xx response without a usable image URL.
    #[error("fal returned no image")]
    NoImageReturned { details: JsonValue },
}

impl DispatchError {
    /// Stable tag surfaced in the `error` field of the JSON response.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_fal_key",
            Self::Timeout => "fal_timeout",
            Self::Network(_) => "fal_unreachable",
            Self::Upstream { .. } => "fal_error",
            Self::NoImageReturned { .. } => "no_image_returned",
        }
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err)
        }
    }
}

/// Failures in the image relay.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Missing src")]
    MissingSource,

    #[error("Invalid src")]
    InvalidSource,

    #[error("Host not allowed: {0}")]
    ForbiddenHost(String),

    #[error("Upstream failed with HTTP {0}")]
    UpstreamStatus(u16),

    #[error("Upstream body exceeds {0} bytes")]
    TooLarge(u64),

    #[error("Upstream failed: {0}")]
    UpstreamFetch(#[from] reqwest::Error),

    #[error("Transcode task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
