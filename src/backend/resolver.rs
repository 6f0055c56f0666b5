//! Endpoint resolution through the Kubernetes API

use super::{BackendError, BackendTarget};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Endpoints;
use kube::{Api, Client};
use tracing::{debug, warn};

/// Lists the pods currently backing a Service
///
/// Production code uses `KubeEndpointResolver`; tests use `MockResolver`.
#[async_trait]
pub trait EndpointResolver: Send + Sync {
    async fn resolve(
        &self,
        service: &str,
        namespace: &str,
    ) -> Result<Vec<BackendTarget>, BackendError>;
}

/// Resolver backed by the Endpoints resource of the cluster API
#[derive(Clone)]
pub struct KubeEndpointResolver {
    client: Client,
}

impl KubeEndpointResolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EndpointResolver for KubeEndpointResolver {
    async fn resolve(
        &self,
        service: &str,
        namespace: &str,
    ) -> Result<Vec<BackendTarget>, BackendError> {
        let api: Api<Endpoints> = Api::namespaced(self.client.clone(), namespace);

        let endpoints = api
            .get(service)
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let targets = targets_from_endpoints(&endpoints, service, namespace)?;
        debug!(
            service = %service,
            namespace = %namespace,
            count = targets.len(),
            "Resolved backend targets"
        );
        Ok(targets)
    }
}

/// Flatten an Endpoints object into one target per (subset, address)
///
/// Only the first port of each subset is used, so multi-port Services are
/// reported on their first declared port.
pub fn targets_from_endpoints(
    endpoints: &Endpoints,
    service: &str,
    namespace: &str,
) -> Result<Vec<BackendTarget>, BackendError> {
    let subsets = match endpoints.subsets.as_deref() {
        Some(subsets) if !subsets.is_empty() => subsets,
        _ => {
            return Err(BackendError::NotFound {
                service: service.to_string(),
                namespace: namespace.to_string(),
            })
        }
    };

    let mut targets = Vec::new();

    for (index, subset) in subsets.iter().enumerate() {
        let addresses = subset.addresses.as_deref().unwrap_or_default();

        let first_port = subset
            .ports
            .as_deref()
            .and_then(|ports| ports.first())
            .map(|p| p.port);

        let port = match first_port.map(u16::try_from) {
            Some(Ok(port)) if port != 0 => port,
            _ => {
                warn!(
                    service = %service,
                    subset = index,
                    port = ?first_port,
                    "Skipping endpoint subset without a usable port"
                );
                continue;
            }
        };

        for address in addresses {
            let name = address
                .target_ref
                .as_ref()
                .and_then(|r| r.name.clone())
                .unwrap_or_else(|| address.ip.clone());

            targets.push(BackendTarget {
                name,
                ip: address.ip.clone(),
                port,
            });
        }
    }

    Ok(targets)
}
