//! Router assembly and listener lifecycle

use super::{frontend, health, ReadinessState, ShutdownSignal};
use crate::backend::{EndpointResolver, EnvFetcher};
use crate::config::Settings;
use axum::{
    http::StatusCode,
    routing::{any, get},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// Upper bound for handling a single request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// State shared by every handler
///
/// The resolver and fetcher are injected so handlers never reach for a
/// global client.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub readiness: ReadinessState,
    pub resolver: Arc<dyn EndpointResolver>,
    pub fetcher: Arc<dyn EnvFetcher>,
    /// Deadline for a whole request, streamed page body included
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(
        settings: Settings,
        readiness: ReadinessState,
        resolver: impl EndpointResolver + 'static,
        fetcher: impl EnvFetcher + 'static,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            readiness,
            resolver: Arc::new(resolver),
            fetcher: Arc::new(fetcher),
            request_timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Build the router for the frontend page and health probes
///
/// `/` only answers GET; probes answer any method.
pub fn build_router(state: AppState) -> Router {
    let timeout = state.request_timeout;

    Router::new()
        .route("/", get(frontend::home_page))
        .route("/liveness", any(health::liveness))
        .route("/startup", any(health::startup))
        .route("/readiness", any(health::readiness))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the frontend listener on all interfaces
pub async fn bind(port: u16) -> Result<TcpListener, std::io::Error> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    // Log after successful bind - server is actually listening
    info!(port = %port, "Server listening");
    Ok(listener)
}

/// Serve requests until `shutdown` fires, then drain in-flight requests
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    mut shutdown: ShutdownSignal,
) -> Result<(), std::io::Error> {
    let app = build_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await
}
