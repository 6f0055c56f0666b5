//! Health check endpoints for Kubernetes
//!
//! - `/liveness` - Is the process alive?
//! - `/startup` - Has the listener come up?
//! - `/readiness` - Is the listener up and can the backend Service be resolved?

use super::AppState;
use axum::{extract::State, http::StatusCode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::error;

pub(crate) const LISTENER_READY: &str = "Listener is up and running";
pub(crate) const LISTENER_NOT_READY: &str = "Listener is not ready";
pub(crate) const SERVER_NOT_READY: &str = "Server is not ready";
pub(crate) const INTERNAL_ERROR: &str = "some internal error occurred";

/// Shared state for readiness tracking
///
/// Set to ready once the listener is bound, and back to not ready as soon as
/// a shutdown signal arrives.
#[derive(Debug, Clone)]
pub struct ReadinessState {
    ready: Arc<AtomicBool>,
}

impl ReadinessState {
    /// Create a new readiness state (initially not ready)
    pub fn new() -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Mark the server as ready
    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    /// Mark the server as not ready (e.g., during shutdown)
    ///
    /// Readiness and startup probes return 500 from here on, so Kubernetes
    /// stops routing traffic to the pod.
    pub fn set_not_ready(&self) {
        self.ready.store(false, Ordering::SeqCst);
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

impl Default for ReadinessState {
    fn default() -> Self {
        Self::new()
    }
}

/// Liveness probe handler
///
/// Always returns 200 OK - if this responds, the process is alive.
pub(crate) async fn liveness() -> &'static str {
    "OK"
}

/// Startup probe handler
pub(crate) async fn startup(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.readiness.is_ready() {
        (StatusCode::OK, LISTENER_READY)
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, LISTENER_NOT_READY)
    }
}

/// Readiness probe handler
///
/// Not ready short-circuits before any cluster call. Otherwise the backend
/// Service is resolved as a dependency check.
pub(crate) async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if !state.readiness.is_ready() {
        return (StatusCode::INTERNAL_SERVER_ERROR, SERVER_NOT_READY);
    }

    let settings = &state.settings;
    match state
        .resolver
        .resolve(&settings.backend_service, &settings.pod_namespace)
        .await
    {
        Ok(_) => (StatusCode::OK, LISTENER_READY),
        Err(e) => {
            error!(
                error = %e,
                service = %settings.backend_service,
                namespace = %settings.pod_namespace,
                "Readiness dependency check failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
        }
    }
}
