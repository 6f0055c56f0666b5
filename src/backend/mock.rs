//! Mock resolver and fetcher for handler tests

use super::{BackendError, BackendTarget, EndpointResolver, EnvFetcher, EnvironmentMap};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Resolver returning a fixed result and counting calls
pub struct MockResolver {
    result: Mutex<Result<Vec<BackendTarget>, String>>,
    calls: AtomicUsize,
}

impl MockResolver {
    pub fn with_targets(targets: Vec<BackendTarget>) -> Self {
        Self {
            result: Mutex::new(Ok(targets)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Mutex::new(Err(message.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EndpointResolver for MockResolver {
    async fn resolve(
        &self,
        _service: &str,
        _namespace: &str,
    ) -> Result<Vec<BackendTarget>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &*self.result.lock().expect("MockResolver lock poisoned") {
            Ok(targets) => Ok(targets.clone()),
            Err(message) => Err(BackendError::Transport(message.clone())),
        }
    }
}

/// Fetcher answering per IP; unknown IPs fail with a transport error
#[derive(Default)]
pub struct MockFetcher {
    responses: HashMap<String, EnvironmentMap>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_env(mut self, ip: &str, env: &[(&str, &str)]) -> Self {
        let map = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.responses.insert(ip.to_string(), map);
        self
    }
}

#[async_trait]
impl EnvFetcher for MockFetcher {
    async fn fetch_env(&self, ip: &str, _port: u16) -> Result<EnvironmentMap, BackendError> {
        self.responses
            .get(ip)
            .cloned()
            .ok_or_else(|| BackendError::Transport(format!("connection refused: {}", ip)))
    }
}

pub fn target(name: &str, ip: &str, port: u16) -> BackendTarget {
    BackendTarget {
        name: name.to_string(),
        ip: ip.to_string(),
        port,
    }
}

/// Fetcher that answers every backend with `env` after `delay`
pub struct SlowFetcher {
    delay: std::time::Duration,
    env: EnvironmentMap,
}

impl SlowFetcher {
    pub fn new(delay: std::time::Duration, env: &[(&str, &str)]) -> Self {
        Self {
            delay,
            env: env
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl EnvFetcher for SlowFetcher {
    async fn fetch_env(&self, _ip: &str, _port: u16) -> Result<EnvironmentMap, BackendError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.env.clone())
    }
}
