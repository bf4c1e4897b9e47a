//! Disposable SnitchDNS server in Docker for integration tests.
//!
//! Runs the test image through `testcontainers`, waits for the web app to
//! log its startup line and answer on `/`, then scrapes the API key the
//! image writes at startup.

use std::time::Duration;

use testcontainers::{
    core::{wait::HttpWaitStrategy, ContainerPort, ExecCommand, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt, TestcontainersError,
};

use crate::SnitchDnsClient;

pub const IMAGE_NAME: &str = "snitchdns-test";
pub const IMAGE_TAG: &str = "latest";
pub const HTTP_PORT: ContainerPort = ContainerPort::Tcp(80);
pub const DNS_PORT: ContainerPort = ContainerPort::Udp(2024);
/// Log line printed once the web application accepts requests.
pub const READY_LOG_LINE: &str = "Starting Flask web application on port 80";
/// File inside the container holding an `API_KEY=<value>` line.
pub const API_KEY_PATH: &str = "/tmp/apikey.txt";

const API_KEY_MARKER: &str = "API_KEY=";

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("container error: {0}")]
    Container(#[from] TestcontainersError),
    #[error("`cat {API_KEY_PATH}` exited with code {0:?}")]
    ExecFailed(Option<i64>),
    #[error("API_KEY not found in output: {0:?}")]
    ApiKeyMissing(String),
    #[error("empty API key")]
    EmptyApiKey,
}

/// How to provision the container.
#[derive(Clone, Debug)]
pub struct ContainerRequest {
    /// Image name, built beforehand from the test Dockerfile.
    pub image: String,
    pub tag: String,
    /// Upper bound for the readiness wait.
    pub startup_timeout: Duration,
}

impl Default for ContainerRequest {
    fn default() -> Self {
        Self {
            image: IMAGE_NAME.to_owned(),
            tag: IMAGE_TAG.to_owned(),
            startup_timeout: Duration::from_secs(120),
        }
    }
}

/// A running SnitchDNS container. Removed when dropped or terminated.
pub struct SnitchDnsContainer {
    container: ContainerAsync<GenericImage>,
    http_host: String,
    api_key: String,
}

impl SnitchDnsContainer {
    /// Starts a container and returns once it serves HTTP and its API key is
    /// readable.
    pub async fn start(req: ContainerRequest) -> Result<Self, HarnessError> {
        let container = GenericImage::new(req.image, req.tag)
            .with_exposed_port(HTTP_PORT)
            .with_exposed_port(DNS_PORT)
            .with_wait_for(WaitFor::message_on_either_std(READY_LOG_LINE))
            .with_wait_for(WaitFor::http(
                HttpWaitStrategy::new("/")
                    .with_port(HTTP_PORT)
                    .with_expected_status_code(200_u16),
            ))
            .with_startup_timeout(req.startup_timeout)
            .start()
            .await?;

        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(HTTP_PORT).await?;
        let http_host = format!("http://{host}:{port}");

        let mut exec = container
            .exec(ExecCommand::new(["cat", API_KEY_PATH]))
            .await?;
        let stdout = exec.stdout_to_vec().await?;
        let exit_code = exec.exit_code().await?;
        if exit_code.is_some_and(|code| code != 0) {
            return Err(HarnessError::ExecFailed(exit_code));
        }
        let api_key = extract_api_key(&String::from_utf8_lossy(&stdout))?;

        Ok(Self {
            container,
            http_host,
            api_key,
        })
    }

    /// `http://<host>:<port>` of the published web port.
    pub fn http_host(&self) -> &str {
        &self.http_host
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_endpoint(&self) -> String {
        format!("{}/api/v1", self.http_host)
    }

    /// A client pointed at this container.
    pub fn client(&self) -> SnitchDnsClient {
        SnitchDnsClient::new(self.api_endpoint(), self.api_key.clone())
    }

    /// Host port mapped to the DNS listener.
    pub async fn dns_port(&self) -> Result<u16, HarnessError> {
        Ok(self.container.get_host_port_ipv4(DNS_PORT).await?)
    }

    /// Combined stdout and stderr of the container so far.
    pub async fn logs(&self) -> Result<String, HarnessError> {
        let stdout = self.container.stdout_to_vec().await?;
        let stderr = self.container.stderr_to_vec().await?;
        let mut logs = String::from_utf8_lossy(&stdout).into_owned();
        logs.push_str(&String::from_utf8_lossy(&stderr));
        Ok(logs)
    }

    /// Stops and removes the container.
    pub async fn terminate(self) -> Result<(), HarnessError> {
        self.container.rm().await?;
        Ok(())
    }
}

/// Finds the first `API_KEY=<value>` occurrence anywhere in `output` and
/// returns the trimmed value.
pub fn extract_api_key(output: &str) -> Result<String, HarnessError> {
    let value = output
        .lines()
        .find_map(|line| {
            line.find(API_KEY_MARKER)
                .map(|idx| &line[idx + API_KEY_MARKER.len()..])
        })
        .ok_or_else(|| HarnessError::ApiKeyMissing(output.to_owned()))?;

    let api_key = value.trim();
    if api_key.is_empty() {
        return Err(HarnessError::EmptyApiKey);
    }
    Ok(api_key.to_owned())
}

#[cfg(test)]
mod tests {
    use super::{extract_api_key, ContainerRequest, HarnessError, IMAGE_NAME};

    #[test]
    fn extracts_key_from_plain_line() {
        assert_eq!(extract_api_key("API_KEY=abc123\n").unwrap(), "abc123");
    }

    #[test]
    fn extracts_key_preceded_by_stream_noise() {
        let output = "\u{1}\u{0}\u{0}\u{0}\u{0}\u{0}\u{0}\u{14}API_KEY=abc=123 \r\nother";
        assert_eq!(extract_api_key(output).unwrap(), "abc=123");
    }

    #[test]
    fn missing_marker_is_an_error() {
        assert!(matches!(
            extract_api_key("nothing here"),
            Err(HarnessError::ApiKeyMissing(_))
        ));
    }

    #[test]
    fn empty_value_is_an_error() {
        assert!(matches!(
            extract_api_key("API_KEY=   \n"),
            Err(HarnessError::EmptyApiKey)
        ));
    }

    #[test]
    fn default_request_targets_test_image() {
        let req = ContainerRequest::default();
        assert_eq!(req.image, IMAGE_NAME);
        assert_eq!(req.startup_timeout.as_secs(), 120);
    }
}
