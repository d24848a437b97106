//! Cluster UUID verification
//!
//! Once the Pods run on the target, ECK records the cluster UUID of the
//! formed cluster on the Elasticsearch resource. If the data was carried
//! over, that UUID is the one the source reported.

use kube::ResourceExt;
use tracing::{error, info};

use esmove_common::crd::Elasticsearch;
use esmove_common::poll::{poll_until, PollResult};

use crate::client::ClusterClient;
use crate::context::MigrationContext;
use crate::error::MigrateError;

/// Compare the cluster UUID reported on the target with the expected one.
///
/// `Ok(None)` while no UUID is reported, `Ok(Some(uuid))` on a match and
/// [`MigrateError::IdentityMismatch`] on any other value.
fn check_uuid(current: &Elasticsearch, expected: &str) -> PollResult<String, MigrateError> {
    match current.cluster_uuid() {
        None => Ok(None),
        Some(uuid) if uuid == expected => Ok(Some(uuid.to_string())),
        Some(uuid) => {
            error!(
                namespace = %current.namespace().unwrap_or_default(),
                name = %current.name_any(),
                uuid = %uuid,
                expected_uuid = %expected,
                "Unexpected: cluster UUID has changed!"
            );
            Err(MigrateError::IdentityMismatch {
                expected: expected.to_string(),
                actual: uuid.to_string(),
            })
        }
    }
}

async fn target_uuid(
    target: &dyn ClusterClient,
    namespace: &str,
    name: &str,
    expected: &str,
) -> PollResult<String, MigrateError> {
    match target.get_elasticsearch(namespace, name).await? {
        Some(current) => check_uuid(&current, expected),
        None => Ok(None),
    }
}

/// Wait until the target reports the cluster UUID recorded on the source.
///
/// A mismatch fails immediately, without using the rest of the budget.
/// Returns the preserved UUID.
pub async fn verify_cluster_uuid(
    ctx: &MigrationContext,
    previous: &Elasticsearch,
) -> Result<String, MigrateError> {
    let namespace = previous.namespace().unwrap_or_default();
    let name = previous.name_any();
    let expected = previous.cluster_uuid().unwrap_or_default().to_string();

    info!(
        namespace = %namespace,
        name = %name,
        expected_uuid = %expected,
        elapsed = ?ctx.elapsed(),
        "Waiting for Elasticsearch UUID to be reported (previous UUID should be preserved)"
    );

    let target = ctx.target();
    let (ns, n, exp) = (namespace.as_str(), name.as_str(), expected.as_str());
    let uuid = poll_until(
        &ctx.config().uuid_poll,
        ctx.cancel_token(),
        "cluster UUID reported in target cluster",
        move || async move { target_uuid(target, ns, n, exp).await },
    )
    .await?;

    info!(
        namespace = %namespace,
        name = %name,
        uuid = %uuid,
        elapsed = ?ctx.elapsed(),
        "Cluster UUID successfully preserved!"
    );
    Ok(uuid)
}
