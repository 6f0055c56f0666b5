//! Process configuration loaded from environment variables
//!
//! - `BACKEND_SERVICE` (required) - Service whose pods are queried
//! - `POD_NAMESPACE` (required) - Namespace of that Service
//! - `PORT` (optional, default 8080) - Listen port for the frontend

use thiserror::Error;

/// Default listen port when `PORT` is unset
pub const DEFAULT_PORT: u16 = 8080;

pub const BACKEND_SERVICE_VAR: &str = "BACKEND_SERVICE";
pub const POD_NAMESPACE_VAR: &str = "POD_NAMESPACE";
pub const PORT_VAR: &str = "PORT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unable to find the environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {value:?} is not a valid port")]
    InvalidPort { var: &'static str, value: String },
}

/// Frontend settings, read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend_service: String,
    pub pod_namespace: String,
    pub port: u16,
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary lookup function
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let backend_service =
            non_empty(BACKEND_SERVICE_VAR).ok_or(ConfigError::MissingVar(BACKEND_SERVICE_VAR))?;
        let pod_namespace =
            non_empty(POD_NAMESPACE_VAR).ok_or(ConfigError::MissingVar(POD_NAMESPACE_VAR))?;

        let port = match non_empty(PORT_VAR) {
            None => DEFAULT_PORT,
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(p) if p != 0 => p,
                _ => {
                    return Err(ConfigError::InvalidPort {
                        var: PORT_VAR,
                        value: raw,
                    })
                }
            },
        };

        Ok(Settings {
            backend_service,
            pod_namespace,
            port,
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
