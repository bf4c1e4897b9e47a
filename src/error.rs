use std::fmt;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum SnitchDnsError {
    /// 4xx response. Never retried.
    #[error("request failed with status {status} and will not be retried: {body}")]
    Terminal { status: u16, body: String },
    /// Every attempt ended in a transient failure.
    #[error("request failed after {attempts} attempts: {source}")]
    RetryExhausted {
        /// Total attempts made, including the initial one.
        attempts: usize,
        /// Failure of the final attempt.
        #[source]
        source: TransientError,
    },
    /// The call's deadline elapsed or it was canceled by the caller.
    #[error("request canceled: {0}")]
    Canceled(CancelReason),
    /// Request body could not be serialized. No attempt was made.
    #[error("failed to marshal request body: {0}")]
    Marshal(#[source] serde_json::Error),
    /// Response body (or a nested JSON string inside it) could not be decoded.
    #[error("failed to parse {target}: {source}")]
    Unmarshal {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// Missing or empty client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SnitchDnsError {
    /// HTTP status of the last response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Terminal { status, .. } => Some(*status),
            Self::RetryExhausted {
                source: TransientError::Status { status, .. },
                ..
            } => Some(*status),
            _ => None,
        }
    }

    /// `true` for a terminal 404, e.g. a zone or record deleted out of band.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Terminal { status: 404, .. })
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled(_))
    }
}

/// A retryable failure of a single attempt.
#[derive(Debug, thiserror::Error)]
pub enum TransientError {
    /// 5xx or otherwise unexpected status code.
    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    /// Connection, DNS, send, timeout or body-read failure.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Why a call stopped before producing a result.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CancelReason {
    /// The call-wide deadline elapsed.
    DeadlineExceeded,
    /// The call's cancellation token was triggered.
    Canceled,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeadlineExceeded => f.write_str("deadline exceeded"),
            Self::Canceled => f.write_str("canceled by caller"),
        }
    }
}
