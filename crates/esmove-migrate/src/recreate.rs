//! Recreation on the target cluster
//!
//! PVs are created first, pointing at the same cloud disks and pre-bound to
//! the PVC name ECK will create on the target. The Elasticsearch resource
//! follows; ECK on the target then creates PVCs that bind to those PVs and
//! starts Pods on the existing data.

use k8s_openapi::api::core::v1::PersistentVolume;
use kube::ResourceExt;
use tracing::{info, warn};

use esmove_common::crd::Elasticsearch;
use esmove_common::kube_utils::strip_server_metadata;

use crate::collect::SourceSnapshot;
use crate::context::MigrationContext;
use crate::error::MigrateError;

/// Build the PV to create on the target from a source PV.
///
/// Server-assigned metadata and status are dropped. The claimRef keeps its
/// kind, namespace and name but loses the uid and resourceVersion of the
/// source PVC, so the PVC ECK creates on the target can bind to it.
pub fn volume_for_target(pv: &PersistentVolume) -> Result<PersistentVolume, MigrateError> {
    let mut volume = pv.clone();
    strip_server_metadata(&mut volume.metadata);
    volume.status = None;

    let claim_ref = volume
        .spec
        .as_mut()
        .and_then(|s| s.claim_ref.as_mut())
        .ok_or_else(|| MigrateError::VolumeWithoutClaimRef {
            name: pv.name_any(),
        })?;
    claim_ref.uid = None;
    claim_ref.resource_version = None;

    Ok(volume)
}

/// Build the Elasticsearch resource to create on the target.
///
/// Drops server-assigned metadata, owner references, every annotation and
/// the status. The cluster UUID annotation is among the dropped annotations;
/// ECK writes it again once the recreated cluster has formed.
pub fn elasticsearch_for_target(es: &Elasticsearch) -> Elasticsearch {
    let mut recreated = es.clone();
    strip_server_metadata(&mut recreated.metadata);
    recreated.metadata.owner_references = None;
    recreated.metadata.annotations = None;
    recreated.status = None;
    recreated
}

/// Create the PVs, then the Elasticsearch resource, on the target cluster.
///
/// Every PV is checked before the first create call, so a PV without a
/// claimRef fails the step with nothing written. If a create call fails
/// after some PVs exist on the target, those PVs are left in place and
/// named in [`MigrateError::PartialRecreate`].
pub async fn recreate_on_target(
    ctx: &MigrationContext,
    snapshot: &SourceSnapshot,
) -> Result<Vec<String>, MigrateError> {
    let volumes = snapshot
        .volumes
        .iter()
        .map(volume_for_target)
        .collect::<Result<Vec<_>, _>>()?;
    let target = ctx.target();

    let mut created = Vec::with_capacity(volumes.len());
    for volume in &volumes {
        let name = volume.name_any();
        info!(
            name = %name,
            elapsed = ?ctx.elapsed(),
            "Creating PV in target cluster (same backing volume)"
        );
        if let Err(e) = target.create_pv(volume).await {
            return Err(partial_failure(created, e));
        }
        created.push(name);
    }

    let es = elasticsearch_for_target(&snapshot.elasticsearch);
    info!(
        namespace = %es.namespace().unwrap_or_default(),
        name = %es.name_any(),
        elapsed = ?ctx.elapsed(),
        "Creating Elasticsearch in target cluster"
    );
    if let Err(e) = target.create_elasticsearch(&es).await {
        return Err(partial_failure(created, e));
    }

    Ok(created)
}

fn partial_failure(created: Vec<String>, err: MigrateError) -> MigrateError {
    if created.is_empty() {
        return err;
    }
    warn!(
        volumes = ?created,
        "PVs left in target cluster after failed recreation, manual cleanup required"
    );
    MigrateError::PartialRecreate {
        created,
        source: Box::new(err),
    }
}
