use std::fmt;

use reqwest::{header, Method, StatusCode};
use serde::Serialize;
use tokio::time::sleep;

use crate::{
    backoff::calculate_backoff,
    decode::{decode_json, decode_record},
    CallContext, CancelReason, ClientOptions, CreateRecordRequest, CreateZoneRequest, Record,
    Result, SnitchDnsError, TransientError, UpdateRecordRequest, UpdateZoneRequest, Zone,
};

/// Header carrying the API key on every request.
pub const AUTH_HEADER: &str = "X-SnitchDNS-Auth";

#[derive(Clone)]
/// HTTP client for the SnitchDNS management API.
///
/// Cloning is cheap and clones share one connection pool. Configuration is
/// fixed once the client is built.
pub struct SnitchDnsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    options: ClientOptions,
}

impl fmt::Debug for SnitchDnsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnitchDnsClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

/// Result of exactly one HTTP attempt.
#[derive(Debug)]
enum AttemptOutcome {
    Success(Vec<u8>),
    Terminal { status: u16, body: String },
    Transient(TransientError),
    Canceled(CancelReason),
}

impl SnitchDnsClient {
    /// Creates a client for the API rooted at `base_url`
    /// (e.g. `http://localhost/api/v1`) with default options.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            options: ClientOptions::default(),
        }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `SNITCHDNS_API_URL` — API base URL
    /// - `SNITCHDNS_API_KEY` — API key sent in [`AUTH_HEADER`]
    ///
    /// Returns [`SnitchDnsError::Config`] if either is missing or blank.
    pub fn from_env() -> Result<Self> {
        let url = required_env("SNITCHDNS_API_URL")?;
        let api_key = required_env("SNITCHDNS_API_KEY")?;
        Ok(Self::new(url, api_key))
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Replaces the underlying `reqwest` client, e.g. to share a pool.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// API root that request paths are appended to, as passed to [`Self::new`].
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Timeout, retry and logging settings used by every call.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub async fn create_zone(&self, ctx: &CallContext, req: &CreateZoneRequest) -> Result<Zone> {
        let body = self.request_json(ctx, Method::POST, "/zones", req).await?;
        decode_json(&body)
    }

    pub async fn get_zone(&self, ctx: &CallContext, id: impl fmt::Display) -> Result<Zone> {
        let body = self
            .request(ctx, Method::GET, &format!("/zones/{id}"))
            .await?;
        decode_json(&body)
    }

    pub async fn update_zone(
        &self,
        ctx: &CallContext,
        id: impl fmt::Display,
        req: &UpdateZoneRequest,
    ) -> Result<Zone> {
        let body = self
            .request_json(ctx, Method::POST, &format!("/zones/{id}"), req)
            .await?;
        decode_json(&body)
    }

    pub async fn delete_zone(&self, ctx: &CallContext, id: impl fmt::Display) -> Result<()> {
        self.request(ctx, Method::DELETE, &format!("/zones/{id}"))
            .await?;
        Ok(())
    }

    /// Creates a record. The response's JSON-encoded `data` and
    /// `conditional_data` strings are decoded before returning.
    pub async fn create_record(
        &self,
        ctx: &CallContext,
        zone_id: impl fmt::Display,
        req: &CreateRecordRequest,
    ) -> Result<Record> {
        let body = self
            .request_json(ctx, Method::POST, &format!("/zones/{zone_id}/records"), req)
            .await?;
        decode_record(&body)
    }

    pub async fn get_record(
        &self,
        ctx: &CallContext,
        zone_id: impl fmt::Display,
        record_id: impl fmt::Display,
    ) -> Result<Record> {
        let body = self
            .request(
                ctx,
                Method::GET,
                &format!("/zones/{zone_id}/records/{record_id}"),
            )
            .await?;
        decode_record(&body)
    }

    pub async fn update_record(
        &self,
        ctx: &CallContext,
        zone_id: impl fmt::Display,
        record_id: impl fmt::Display,
        req: &UpdateRecordRequest,
    ) -> Result<Record> {
        let body = self
            .request_json(
                ctx,
                Method::POST,
                &format!("/zones/{zone_id}/records/{record_id}"),
                req,
            )
            .await?;
        decode_record(&body)
    }

    pub async fn delete_record(
        &self,
        ctx: &CallContext,
        zone_id: impl fmt::Display,
        record_id: impl fmt::Display,
    ) -> Result<()> {
        self.request(
            ctx,
            Method::DELETE,
            &format!("/zones/{zone_id}/records/{record_id}"),
        )
        .await?;
        Ok(())
    }

    /// Sends a bodiless request with retries and returns the raw response body.
    pub async fn request(&self, ctx: &CallContext, method: Method, path: &str) -> Result<Vec<u8>> {
        self.send_with_retry(ctx, method, path, None).await
    }

    /// Serializes `body` as JSON once, then sends it with retries.
    ///
    /// A serialization failure returns [`SnitchDnsError::Marshal`] before any
    /// network attempt.
    pub async fn request_json<B>(
        &self,
        ctx: &CallContext,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>>
    where
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(body).map_err(SnitchDnsError::Marshal)?;
        self.send_with_retry(ctx, method, path, Some(payload)).await
    }

    async fn send_with_retry(
        &self,
        ctx: &CallContext,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        let mut attempt = 0usize;
        loop {
            if attempt > 0 {
                self.wait_before_retry(ctx, attempt).await?;
            }

            match self
                .execute_attempt(ctx, &method, path, body.as_deref())
                .await
            {
                AttemptOutcome::Success(body) => return Ok(body),
                AttemptOutcome::Terminal { status, body } => {
                    return Err(SnitchDnsError::Terminal { status, body });
                }
                AttemptOutcome::Canceled(reason) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(%method, path, attempt, %reason, "request canceled");
                    return Err(SnitchDnsError::Canceled(reason));
                }
                AttemptOutcome::Transient(cause) => {
                    if attempt >= self.options.max_retries {
                        return Err(SnitchDnsError::RetryExhausted {
                            attempts: attempt + 1,
                            source: cause,
                        });
                    }

                    #[cfg(feature = "tracing")]
                    tracing::debug!(%method, path, attempt, error = %cause, "transient failure, will retry");

                    attempt += 1;
                }
            }
        }
    }

    /// Sleeps for the jittered backoff of retry `attempt`, or fails with
    /// [`SnitchDnsError::Canceled`] as soon as `ctx` fires.
    async fn wait_before_retry(&self, ctx: &CallContext, attempt: usize) -> Result<()> {
        let delay = calculate_backoff(
            attempt,
            self.options.retry_wait_min(),
            self.options.retry_wait_max(),
        );

        #[cfg(feature = "tracing")]
        tracing::debug!("retrying request (attempt {}) after {:?}", attempt + 1, delay);

        tokio::select! {
            biased;
            reason = ctx.done() => Err(SnitchDnsError::Canceled(reason)),
            _ = sleep(delay) => Ok(()),
        }
    }

    async fn execute_attempt(
        &self,
        ctx: &CallContext,
        method: &Method,
        path: &str,
        body: Option<&[u8]>,
    ) -> AttemptOutcome {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(AUTH_HEADER, &self.api_key)
            .timeout(self.options.timeout());
        if !self.options.user_agent.is_empty() {
            request = request.header(header::USER_AGENT, &self.options.user_agent);
        }
        if let Some(body) = body {
            #[cfg(feature = "tracing")]
            if self.options.debug_logging {
                tracing::debug!(%method, %url, body = %String::from_utf8_lossy(body), "sending request");
            }
            request = request
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.to_vec());
        }

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            // Read the whole body so a broken stream counts as a failed attempt.
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, bytes.to_vec()))
        };

        let result = tokio::select! {
            biased;
            reason = ctx.done() => return AttemptOutcome::Canceled(reason),
            result = exchange => result,
        };

        match result {
            Ok((status, body)) => {
                #[cfg(feature = "tracing")]
                if self.options.debug_logging {
                    tracing::debug!(%method, %url, status = status.as_u16(), body = %String::from_utf8_lossy(&body), "received response");
                }
                classify(status, body)
            }
            // A transport error racing the deadline is still a cancellation.
            Err(err) => match ctx.fired() {
                Some(reason) => AttemptOutcome::Canceled(reason),
                None => AttemptOutcome::Transient(TransientError::Transport(err)),
            },
        }
    }
}

fn classify(status: StatusCode, body: Vec<u8>) -> AttemptOutcome {
    let code = status.as_u16();
    match code {
        200..=299 => AttemptOutcome::Success(body),
        400..=499 => AttemptOutcome::Terminal {
            status: code,
            body: String::from_utf8_lossy(&body).into_owned(),
        },
        _ => AttemptOutcome::Transient(TransientError::Status {
            status: code,
            body: String::from_utf8_lossy(&body).into_owned(),
        }),
    }
}

fn required_env(name: &str) -> Result<String> {
    let value = std::env::var(name)
        .map_err(|_| SnitchDnsError::Config(format!("missing {name} environment variable")))?;
    if value.trim().is_empty() {
        return Err(SnitchDnsError::Config(format!("{name} is set but empty")));
    }
    Ok(value)
}
