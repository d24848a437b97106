//! Kubernetes client helpers using kube-rs
//!
//! Builds one client per kubeconfig context and provides the metadata
//! helpers shared by every migration step.

use std::path::Path;
use std::time::Duration;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::debug;

use crate::crd::Elasticsearch;
use crate::Error;

/// Default connection timeout for kube clients
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default read timeout for kube clients
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Create a kube client for a named kubeconfig context.
///
/// Reads `kubeconfig` when given, otherwise the default kubeconfig
/// resolution (`KUBECONFIG` env, then `~/.kube/config`).
pub async fn create_client_for_context(
    kubeconfig: Option<&Path>,
    context: &str,
) -> Result<Client, Error> {
    let kc = match kubeconfig {
        Some(path) => Kubeconfig::read_from(path).map_err(|e| {
            Error::kubeconfig(
                context,
                format!("failed to read kubeconfig {}: {}", path.display(), e),
            )
        })?,
        None => Kubeconfig::read()
            .map_err(|e| Error::kubeconfig(context, format!("failed to read kubeconfig: {}", e)))?,
    };

    let options = KubeConfigOptions {
        context: Some(context.to_string()),
        ..Default::default()
    };

    let mut config = Config::from_custom_kubeconfig(kc, &options)
        .await
        .map_err(|e| Error::kubeconfig(context, format!("failed to load context: {}", e)))?;
    config.connect_timeout = Some(DEFAULT_CONNECT_TIMEOUT);
    config.read_timeout = Some(DEFAULT_READ_TIMEOUT);

    Client::try_from(config)
        .map_err(|e| Error::kubeconfig(context, format!("failed to create client: {}", e)))
}

/// Check the cluster is reachable and serves the Elasticsearch API.
///
/// Lists Elasticsearch resources across all namespaces. A missing ECK
/// installation shows up here as a 404 rather than halfway through a
/// migration.
pub async fn probe_elasticsearch_api(client: &Client, context: &str) -> Result<(), Error> {
    let api: Api<Elasticsearch> = Api::all(client.clone());
    let list = api
        .list(&ListParams::default().limit(1))
        .await
        .map_err(|e| Error::connectivity(context, e.to_string()))?;
    debug!(context = %context, found = list.items.len(), "Elasticsearch API reachable");
    Ok(())
}

/// Remove server-assigned fields before creating an object on another cluster.
///
/// - uid: unique identifier in the source cluster
/// - resourceVersion: optimistic concurrency version
/// - creationTimestamp: when the source object was created
/// - managedFields: server-side apply ownership tracking
/// - generation: controller-managed generation counter
pub fn strip_server_metadata(meta: &mut ObjectMeta) {
    meta.uid = None;
    meta.resource_version = None;
    meta.creation_timestamp = None;
    meta.managed_fields = None;
    meta.generation = None;
}

/// Check if a kube error is an API "not found" response.
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(ae) if ae.code == 404)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ManagedFieldsEntry, Time};
    use kube::error::ErrorResponse;

    fn api_error(code: u16, reason: &str) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: format!("{} error", reason),
            reason: reason.to_string(),
            code,
        })
    }

    #[test]
    fn strip_clears_server_fields_and_keeps_identity() {
        let mut meta = ObjectMeta {
            name: Some("pv-1".to_string()),
            namespace: Some("ns".to_string()),
            uid: Some("abc".to_string()),
            resource_version: Some("42".to_string()),
            creation_timestamp: Some(Time(Default::default())),
            managed_fields: Some(vec![ManagedFieldsEntry::default()]),
            generation: Some(3),
            ..Default::default()
        };

        strip_server_metadata(&mut meta);

        assert_eq!(meta.name.as_deref(), Some("pv-1"));
        assert_eq!(meta.namespace.as_deref(), Some("ns"));
        assert!(meta.uid.is_none());
        assert!(meta.resource_version.is_none());
        assert!(meta.creation_timestamp.is_none());
        assert!(meta.managed_fields.is_none());
        assert!(meta.generation.is_none());
    }

    #[test]
    fn not_found_only_matches_404() {
        assert!(is_not_found(&api_error(404, "NotFound")));
        assert!(!is_not_found(&api_error(409, "AlreadyExists")));
        assert!(!is_not_found(&api_error(500, "InternalError")));
    }
}
