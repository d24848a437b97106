//! Source teardown
//!
//! Deletes the Elasticsearch resource on the source cluster, then
//! force-deletes its Pods so ECK's preStop hooks do not stall the move.
//! PVs are not touched; they are protected by their `Retain` policy.

use kube::ResourceExt;
use tracing::{debug, info};

use esmove_common::crd::Elasticsearch;

use crate::context::MigrationContext;
use crate::error::MigrateError;

/// Delete the Elasticsearch resource and force-delete its Pods.
///
/// Pods are listed again rather than taken from the snapshot, to catch any
/// Pod created since. A Pod that is already gone is skipped. Returns the
/// names of the Pods deleted.
pub async fn delete_source(
    ctx: &MigrationContext,
    es: &Elasticsearch,
) -> Result<Vec<String>, MigrateError> {
    let namespace = es
        .namespace()
        .ok_or_else(|| MigrateError::invalid_object("Elasticsearch", "object has no namespace"))?;
    let name = es.name_any();
    let source = ctx.source();

    info!(
        namespace = %namespace,
        name = %name,
        elapsed = ?ctx.elapsed(),
        "Deleting Elasticsearch resource in source cluster"
    );
    source.delete_elasticsearch(&namespace, &name).await?;

    let pods = source.list_pods(&namespace, &es.cluster_selector()).await?;
    let mut deleted = Vec::with_capacity(pods.len());
    for pod in pods {
        let pod_name = pod.name_any();
        info!(
            namespace = %namespace,
            name = %pod_name,
            elapsed = ?ctx.elapsed(),
            "Force-deleting Pod in source cluster"
        );
        match source.force_delete_pod(&namespace, &pod_name).await {
            Ok(()) => deleted.push(pod_name),
            Err(e) if e.is_not_found() => {
                debug!(name = %pod_name, "Pod already gone");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(deleted)
}
