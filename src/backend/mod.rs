//! Backend discovery and environment queries
//!
//! - `resolver` - turns a Service's Endpoints object into `BackendTarget`s
//! - `env` - fetches `/api/v1/env` from a single backend pod

pub mod env;
pub mod resolver;

pub use env::{env_url, EnvFetcher, HttpEnvFetcher, ENV_FETCH_TIMEOUT, ENV_PATH};
pub use resolver::{targets_from_endpoints, EndpointResolver, KubeEndpointResolver};

use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Environment variables reported by one backend pod
pub type EnvironmentMap = HashMap<String, String>;

/// One pod backing the Service at request time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTarget {
    pub name: String,
    pub ip: String,
    pub port: u16,
}

/// Request-scoped failures talking to the cluster or a backend pod
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("found empty endpoints for service {service} in namespace {namespace}")]
    NotFound { service: String, namespace: String },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to decode environment response: {0}")]
    Decode(String),
}

#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) mod mock;

#[cfg(test)]
#[path = "resolver_test.rs"]
mod resolver_tests;

#[cfg(test)]
#[path = "env_test.rs"]
mod env_tests;
