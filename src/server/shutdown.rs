//! Signal-driven shutdown with a bounded grace period

use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// How long the server may take to drain after a shutdown signal
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("server did not shut down within {0:?}")]
    GraceExceeded(Duration),

    #[error("server failed while shutting down: {0}")]
    Server(#[from] std::io::Error),

    #[error("server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Receiving half of the shutdown channel, handed to the serving loop
#[derive(Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolves once shutdown is requested or the controller is dropped
    pub async fn wait(&mut self) {
        let _ = self.receiver.wait_for(|stop| *stop).await;
    }

    #[cfg(test)]
    pub fn is_shutdown(&self) -> bool {
        *self.receiver.borrow()
    }
}

pub struct ShutdownController {
    sender: watch::Sender<bool>,
}

impl ShutdownController {
    pub fn shutdown(&self) {
        let _ = self.sender.send(true);
        info!("Shutdown signal sent");
    }
}

pub fn shutdown_channel() -> (ShutdownController, ShutdownSignal) {
    let (sender, receiver) = watch::channel(false);
    (ShutdownController { sender }, ShutdownSignal { receiver })
}

/// Wait for the server task to finish, giving up after `grace`
///
/// Exceeding the grace period is an error; the caller is expected to exit
/// non-zero.
pub async fn drain_with_grace(
    server: JoinHandle<Result<(), std::io::Error>>,
    grace: Duration,
) -> Result<(), ShutdownError> {
    match tokio::time::timeout(grace, server).await {
        Ok(joined) => {
            joined??;
            Ok(())
        }
        Err(_) => Err(ShutdownError::GraceExceeded(grace)),
    }
}

/// Wait for SIGTERM or SIGINT and return its name
#[cfg(unix)]
pub async fn wait_for_signal() -> Result<&'static str, std::io::Error> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;

    let name = tokio::select! {
        _ = terminate.recv() => "SIGTERM",
        _ = interrupt.recv() => "SIGINT",
    };
    info!(signal = name, "got signal");
    Ok(name)
}

#[cfg(not(unix))]
pub async fn wait_for_signal() -> Result<&'static str, std::io::Error> {
    tokio::signal::ctrl_c().await?;
    info!(signal = "CTRL_C", "got signal");
    Ok("CTRL_C")
}
