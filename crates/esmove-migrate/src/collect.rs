//! Snapshot of the source cluster
//!
//! Reads the Elasticsearch resource, its Pods, its PVCs and the PVs bound to
//! those PVCs. Nothing is modified; any failure leaves the source untouched.

use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim, Pod};
use kube::ResourceExt;
use tracing::info;

use esmove_common::crd::Elasticsearch;

use crate::context::MigrationContext;
use crate::error::MigrateError;

/// Source-side objects, read once before anything is changed
#[derive(Clone, Debug)]
pub struct SourceSnapshot {
    /// The Elasticsearch resource, including its cluster UUID annotation
    pub elasticsearch: Elasticsearch,
    /// Pods running the cluster
    pub pods: Vec<Pod>,
    /// PVCs of the cluster, at least one
    pub claims: Vec<PersistentVolumeClaim>,
    /// PVs bound to `claims`, in the same order
    pub volumes: Vec<PersistentVolume>,
}

impl SourceSnapshot {
    /// Names of the snapshot PVs
    pub fn volume_names(&self) -> Vec<String> {
        self.volumes.iter().map(|pv| pv.name_any()).collect()
    }
}

/// Read the Elasticsearch resource and everything it depends on from the
/// source cluster.
pub async fn collect_source(ctx: &MigrationContext) -> Result<SourceSnapshot, MigrateError> {
    let target = &ctx.config().elasticsearch;
    let source = ctx.source();

    info!(
        namespace = %target.namespace,
        name = %target.name,
        elapsed = ?ctx.elapsed(),
        "Retrieving Elasticsearch in source cluster"
    );
    let elasticsearch = source
        .get_elasticsearch(&target.namespace, &target.name)
        .await?
        .ok_or_else(|| MigrateError::not_found("Elasticsearch", target.to_string()))?;
    let selector = elasticsearch.cluster_selector();

    info!(
        namespace = %target.namespace,
        name = %target.name,
        elapsed = ?ctx.elapsed(),
        "Retrieving Pods in source cluster"
    );
    let pods = source.list_pods(&target.namespace, &selector).await?;

    info!(
        namespace = %target.namespace,
        name = %target.name,
        elapsed = ?ctx.elapsed(),
        "Retrieving PVCs in source cluster"
    );
    let claims = source.list_pvcs(&target.namespace, &selector).await?;
    if claims.is_empty() {
        return Err(MigrateError::NoClaims {
            namespace: target.namespace.clone(),
            name: target.name.clone(),
        });
    }

    let mut volumes = Vec::with_capacity(claims.len());
    for claim in &claims {
        let volume_name = claim
            .spec
            .as_ref()
            .and_then(|s| s.volume_name.as_deref())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| MigrateError::ClaimWithoutVolume {
                namespace: claim.namespace().unwrap_or_default(),
                name: claim.name_any(),
            })?;

        info!(name = %volume_name, elapsed = ?ctx.elapsed(), "Retrieving PV in source cluster");
        let volume = source
            .get_pv(volume_name)
            .await?
            .ok_or_else(|| MigrateError::not_found("PersistentVolume", volume_name))?;
        volumes.push(volume);
    }

    info!(
        namespace = %target.namespace,
        name = %target.name,
        pods = pods.len(),
        claims = claims.len(),
        elapsed = ?ctx.elapsed(),
        "Source cluster snapshot collected"
    );

    Ok(SourceSnapshot {
        elasticsearch,
        pods,
        claims,
        volumes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockClusterClient;
    use crate::fixtures::*;

    fn source_with_es() -> MockClusterClient {
        let mut source = MockClusterClient::new();
        source
            .expect_get_elasticsearch()
            .withf(|ns: &str, name: &str| ns == NS && name == ES_NAME)
            .returning(|_, _| Ok(Some(elasticsearch(Some("uuid-123")))));
        source
    }

    #[tokio::test]
    async fn collects_es_pods_claims_and_volumes() {
        let mut source = source_with_es();
        source
            .expect_list_pods()
            .withf(|ns: &str, selector: &str| {
                ns == NS && selector == "elasticsearch.k8s.elastic.co/cluster-name=es1"
            })
            .returning(|_, _| Ok(vec![pod("es1-es-default-0", "Running")]));
        source
            .expect_list_pvcs()
            .returning(|_, _| Ok(vec![pvc("data-0", Some("pv-0")), pvc("data-1", Some("pv-1"))]));
        source
            .expect_get_pv()
            .times(2)
            .returning(|name| Ok(Some(pv(name, "Delete", Some("data")))));

        let ctx = context(source, MockClusterClient::new());
        let snapshot = collect_source(&ctx).await.expect("collection succeeds");

        assert_eq!(snapshot.elasticsearch.cluster_uuid(), Some("uuid-123"));
        assert_eq!(snapshot.pods.len(), 1);
        assert_eq!(snapshot.claims.len(), 2);
        assert_eq!(snapshot.volume_names(), vec!["pv-0", "pv-1"]);
    }

    #[tokio::test]
    async fn missing_elasticsearch_is_not_found() {
        let mut source = MockClusterClient::new();
        source.expect_get_elasticsearch().returning(|_, _| Ok(None));

        let ctx = context(source, MockClusterClient::new());
        let err = collect_source(&ctx).await.unwrap_err();

        assert!(matches!(err, MigrateError::NotFound { .. }));
        assert_eq!(err.to_string(), "Elasticsearch ns/es1 not found");
    }

    #[tokio::test]
    async fn zero_claims_is_rejected() {
        let mut source = source_with_es();
        source.expect_list_pods().returning(|_, _| Ok(vec![]));
        source.expect_list_pvcs().returning(|_, _| Ok(vec![]));
        source.expect_get_pv().never();

        let ctx = context(source, MockClusterClient::new());
        let err = collect_source(&ctx).await.unwrap_err();

        assert!(matches!(err, MigrateError::NoClaims { .. }));
    }

    #[tokio::test]
    async fn claim_without_volume_name_is_rejected() {
        let mut source = source_with_es();
        source.expect_list_pods().returning(|_, _| Ok(vec![]));
        source
            .expect_list_pvcs()
            .returning(|_, _| Ok(vec![pvc("data-0", Some("pv-0")), pvc("data-1", None)]));
        source
            .expect_get_pv()
            .returning(|name| Ok(Some(pv(name, "Delete", Some("data-0")))));

        let ctx = context(source, MockClusterClient::new());
        let err = collect_source(&ctx).await.unwrap_err();

        match err {
            MigrateError::ClaimWithoutVolume { namespace, name } => {
                assert_eq!(namespace, NS);
                assert_eq!(name, "data-1");
            }
            other => panic!("expected ClaimWithoutVolume, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_volume_name_counts_as_missing() {
        let mut source = source_with_es();
        source.expect_list_pods().returning(|_, _| Ok(vec![]));
        source
            .expect_list_pvcs()
            .returning(|_, _| Ok(vec![pvc("data-0", Some(""))]));
        source.expect_get_pv().never();

        let ctx = context(source, MockClusterClient::new());
        let err = collect_source(&ctx).await.unwrap_err();

        assert!(matches!(err, MigrateError::ClaimWithoutVolume { .. }));
    }

    #[tokio::test]
    async fn missing_volume_is_not_found() {
        let mut source = source_with_es();
        source.expect_list_pods().returning(|_, _| Ok(vec![]));
        source
            .expect_list_pvcs()
            .returning(|_, _| Ok(vec![pvc("data-0", Some("pv-0"))]));
        source.expect_get_pv().returning(|_| Ok(None));

        let ctx = context(source, MockClusterClient::new());
        let err = collect_source(&ctx).await.unwrap_err();

        assert_eq!(err.to_string(), "PersistentVolume pv-0 not found");
    }

    #[tokio::test]
    async fn list_errors_are_fatal() {
        let mut source = source_with_es();
        source
            .expect_list_pods()
            .returning(|_, _| Err(api_error(500)));
        source.expect_list_pvcs().never();

        let ctx = context(source, MockClusterClient::new());
        let err = collect_source(&ctx).await.unwrap_err();

        assert!(matches!(err, MigrateError::Kube { .. }));
    }
}
