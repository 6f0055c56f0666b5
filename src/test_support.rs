//! Helpers shared by tests that need a real loopback HTTP server

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve `router` on an ephemeral loopback port
///
/// The listener is bound before returning, so requests can be sent
/// immediately without retrying.
pub async fn spawn_router(router: Router) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no local addr");

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    (addr, handle)
}

/// Install ring as the rustls crypto provider (idempotent)
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Settings pointing at `tom-backend` in `demo`
pub fn test_settings() -> crate::config::Settings {
    crate::config::Settings {
        backend_service: "tom-backend".to_string(),
        pod_namespace: "demo".to_string(),
        port: 0,
    }
}

/// Run the full frontend router via `serve` on an ephemeral loopback port
pub async fn spawn_app(
    state: crate::server::AppState,
) -> (
    SocketAddr,
    crate::server::ShutdownController,
    JoinHandle<Result<(), std::io::Error>>,
) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no local addr");

    let (controller, signal) = crate::server::shutdown_channel();
    let handle = tokio::spawn(crate::server::serve(listener, state, signal));

    (addr, controller, handle)
}
