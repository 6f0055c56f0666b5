//! Kubernetes service discovery demo frontend
//!
//! Resolves the pods behind a Service, asks each one for its environment
//! variables and renders them as HTML tables.

pub mod backend;
pub mod config;
pub mod render;
pub mod server;

#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) mod test_support;
