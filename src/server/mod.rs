//! HTTP server for the frontend page and health probes
//!
//! - `/` - HTML page with the environment of every backend pod
//! - `/liveness` - Liveness probe (process is running)
//! - `/startup` - Startup probe (listener is up)
//! - `/readiness` - Readiness probe (listener is up and the cluster answers)
//!
//! Also provides graceful shutdown handling for SIGTERM/SIGINT.

pub mod frontend;
mod health;
mod router;
pub mod shutdown;

pub use health::ReadinessState;
pub use router::{bind, build_router, serve, AppState, REQUEST_TIMEOUT};
pub use shutdown::{
    drain_with_grace, shutdown_channel, wait_for_signal, ShutdownController, ShutdownError,
    ShutdownSignal, SHUTDOWN_GRACE,
};

#[cfg(test)]
#[path = "health_test.rs"]
mod health_tests;

#[cfg(test)]
#[path = "frontend_test.rs"]
mod frontend_tests;

#[cfg(test)]
#[path = "shutdown_test.rs"]
mod shutdown_tests;
