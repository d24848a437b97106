//! Reclaim policy protection
//!
//! Deleting the Elasticsearch resource makes ECK delete its PVCs. A PV whose
//! reclaim policy is `Delete` would then destroy the cloud disk behind it, so
//! every PV is switched to `Retain` before anything is deleted.

use k8s_openapi::api::core::v1::PersistentVolume;
use kube::ResourceExt;
use tracing::info;

use crate::context::MigrationContext;
use crate::error::MigrateError;

/// Reclaim policy that keeps the backing storage when the PVC goes away
pub const RECLAIM_RETAIN: &str = "Retain";

/// Whether a PV keeps its backing storage once its claim is deleted
pub fn is_retained(pv: &PersistentVolume) -> bool {
    pv.spec
        .as_ref()
        .and_then(|s| s.persistent_volume_reclaim_policy.as_deref())
        == Some(RECLAIM_RETAIN)
}

/// Set `Retain` on every PV of the source cluster that does not have it yet.
///
/// PVs already retained are not updated. Returns the volumes as they now are
/// on the source, so calling this again with the result issues no update.
/// A failed update aborts the step; volumes already switched stay `Retain`.
pub async fn protect_volumes(
    ctx: &MigrationContext,
    volumes: &[PersistentVolume],
) -> Result<Vec<PersistentVolume>, MigrateError> {
    let mut protected = Vec::with_capacity(volumes.len());

    for pv in volumes {
        if is_retained(pv) {
            protected.push(pv.clone());
            continue;
        }

        let mut updated = pv.clone();
        updated
            .spec
            .get_or_insert_with(Default::default)
            .persistent_volume_reclaim_policy = Some(RECLAIM_RETAIN.to_string());

        info!(
            name = %pv.name_any(),
            elapsed = ?ctx.elapsed(),
            "Setting PV reclaim policy to Retain"
        );
        ctx.source().replace_pv(&updated).await?;
        protected.push(updated);
    }

    Ok(protected)
}
