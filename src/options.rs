use std::time::Duration;

/// Default `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("snitchdns-http/", env!("CARGO_PKG_VERSION"));

/// Configures HTTP timeout, retry and logging behavior.
///
/// Options are applied once with [`SnitchDnsClient::with_options`] and are
/// read-only for every call made through the client afterwards.
///
/// [`SnitchDnsClient::with_options`]: crate::SnitchDnsClient::with_options
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt transport timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
    /// Backoff before the first retry, doubled on each further retry.
    pub retry_wait_min_ms: u64,
    /// Upper bound for the un-jittered backoff.
    pub retry_wait_max_ms: u64,
    /// Value of the `User-Agent` header. Empty disables the header.
    pub user_agent: String,
    /// Emits request and response bodies as `debug` events.
    pub debug_logging: bool,
}

impl ClientOptions {
    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub(crate) fn retry_wait_min(&self) -> Duration {
        Duration::from_millis(self.retry_wait_min_ms)
    }

    pub(crate) fn retry_wait_max(&self) -> Duration {
        Duration::from_millis(self.retry_wait_max_ms)
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_retries: 3,
            retry_wait_min_ms: 1_000,
            retry_wait_max_ms: 30_000,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            debug_logging: false,
        }
    }
}
