//! Removal of the source PV objects
//!
//! Runs only once the target is verified. Deleting a `Retain` PV object
//! leaves the cloud disk alone, and the disk is now referenced by the PVs
//! created on the target.

use k8s_openapi::api::core::v1::PersistentVolume;
use kube::ResourceExt;
use tracing::{debug, info};

use crate::context::MigrationContext;
use crate::error::MigrateError;

/// Delete the source PV objects. A PV that is already gone is skipped.
///
/// Returns the names of the PVs deleted.
pub async fn delete_source_volumes(
    ctx: &MigrationContext,
    volumes: &[PersistentVolume],
) -> Result<Vec<String>, MigrateError> {
    let mut deleted = Vec::with_capacity(volumes.len());

    for pv in volumes {
        let name = pv.name_any();
        info!(name = %name, elapsed = ?ctx.elapsed(), "Deleting PV in source cluster");
        match ctx.source().delete_pv(&name).await {
            Ok(()) => deleted.push(name),
            Err(e) if e.is_not_found() => {
                debug!(name = %name, "PV already gone");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(deleted)
}
