//! `snitchdns-http` is an async HTTP client for the SnitchDNS management API.
//!
//! Every call runs through one retry loop:
//! - 2xx responses succeed, 4xx fail immediately as [`SnitchDnsError::Terminal`]
//! - 5xx and transport failures are retried with exponential backoff and
//!   ±25% jitter, ending in [`SnitchDnsError::RetryExhausted`]
//! - a [`CallContext`] deadline or cancel stops the loop with
//!   [`SnitchDnsError::Canceled`], even mid-backoff
//!
//! Zone and record endpoints are wrapped by [`SnitchDnsClient::create_zone`],
//! [`SnitchDnsClient::get_record`] and friends.

mod backoff;
mod client;
mod context;
mod decode;
mod error;
mod options;
mod types;
mod wire;

#[cfg(feature = "harness")]
pub mod harness;

pub use backoff::jitter_degraded;
pub use client::{SnitchDnsClient, AUTH_HEADER};
pub use context::CallContext;
pub use error::{CancelReason, SnitchDnsError, TransientError};
pub use options::{ClientOptions, DEFAULT_USER_AGENT};
pub use reqwest::Method;
pub use tokio_util::sync::CancellationToken;
pub use types::{
    CreateRecordRequest, CreateZoneRequest, JsonObject, Record, UpdateRecordRequest,
    UpdateZoneRequest, Zone,
};

pub type Result<T> = std::result::Result<T, SnitchDnsError>;
