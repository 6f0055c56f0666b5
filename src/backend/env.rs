//! Environment variable queries against backend pods
//!
//! Each backend exposes `GET /api/v1/env` returning a flat JSON object of
//! variable name to value. The HTTP status is not inspected: whatever body
//! comes back is decoded as that object.

use super::{BackendError, EnvironmentMap};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

/// Path of the environment endpoint on every backend pod
pub const ENV_PATH: &str = "/api/v1/env";

/// Upper bound for a single environment query
pub const ENV_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetches the environment of a single backend
#[async_trait]
pub trait EnvFetcher: Send + Sync {
    async fn fetch_env(&self, ip: &str, port: u16) -> Result<EnvironmentMap, BackendError>;
}

/// HTTP fetcher used in production
pub struct HttpEnvFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpEnvFetcher {
    pub fn new() -> Self {
        Self::with_timeout(ENV_FETCH_TIMEOUT)
    }

    /// The timeout is applied per request, so it holds whatever client is used
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    fn classify(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout(self.timeout)
        } else {
            BackendError::Transport(e.to_string())
        }
    }
}

impl Default for HttpEnvFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the env URL, bracketing IPv6 literals
pub fn env_url(ip: &str, port: u16) -> String {
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V6(v6)) => format!("http://[{}]:{}{}", v6, port, ENV_PATH),
        _ => format!("http://{}:{}{}", ip, port, ENV_PATH),
    }
}

#[async_trait]
impl EnvFetcher for HttpEnvFetcher {
    async fn fetch_env(&self, ip: &str, port: u16) -> Result<EnvironmentMap, BackendError> {
        let url = env_url(ip, port);

        let response = self
            .client
            .get(&url)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        debug!(url = %url, status = %response.status(), "Backend responded");

        let body = response.text().await.map_err(|e| self.classify(e))?;

        serde_json::from_str::<EnvironmentMap>(&body)
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}
