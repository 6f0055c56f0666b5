use kube::Client;
use tom_frontend::backend::{HttpEnvFetcher, KubeEndpointResolver};
use tom_frontend::config::Settings;
use tom_frontend::server::{
    bind, drain_with_grace, serve, shutdown_channel, wait_for_signal, AppState, ReadinessState,
    SHUTDOWN_GRACE,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting tom-frontend");

    // Configuration errors are fatal before anything is served
    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        service = %settings.backend_service,
        namespace = %settings.pod_namespace,
        port = settings.port,
        "Configuration loaded"
    );

    // kube and reqwest both use rustls; pick ring as the provider
    let _ = rustls::crypto::ring::default_provider().install_default();

    // In-cluster service account first, then ~/.kube/config
    let client = match Client::try_default().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to create Kubernetes client");
            return Err(e.into());
        }
    };
    info!("Kubernetes client initialized");

    let (shutdown_controller, shutdown_signal) = shutdown_channel();

    // Not ready until the listener is bound
    let readiness = ReadinessState::new();

    let port = settings.port;
    let state = AppState::new(
        settings,
        readiness.clone(),
        KubeEndpointResolver::new(client),
        HttpEnvFetcher::new(),
    );

    let listener = bind(port).await?;
    let mut server = tokio::spawn(serve(listener, state, shutdown_signal));

    readiness.set_ready();
    info!(port = port, "Server ready");

    tokio::select! {
        signal = wait_for_signal() => {
            let signal = match signal {
                Ok(name) => name,
                Err(e) => {
                    error!(error = %e, "Failed to listen for shutdown signals");
                    return Err(e.into());
                }
            };
            info!(signal = signal, "Initiating graceful shutdown");
        }
        result = &mut server => {
            // Server stopped without being asked to
            readiness.set_not_ready();
            error!(result = ?result, "Server exited unexpectedly");
            return Err(anyhow::anyhow!("server exited unexpectedly"));
        }
    }

    // Mark not ready so K8s stops sending traffic during shutdown
    readiness.set_not_ready();
    shutdown_controller.shutdown();

    if let Err(e) = drain_with_grace(server, SHUTDOWN_GRACE).await {
        error!(error = %e, "Failed to shut down gracefully");
        return Err(e.into());
    }

    info!("server exited properly");
    Ok(())
}
