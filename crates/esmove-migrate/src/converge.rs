//! Wait for the Pods to run on the target cluster

use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use tracing::info;

use esmove_common::poll::{poll_until, PollResult};

use crate::client::ClusterClient;
use crate::context::MigrationContext;
use crate::error::MigrateError;

/// Pod phase ECK Pods reach once Elasticsearch is started
pub const POD_RUNNING: &str = "Running";

/// Namespace and name of a Pod expected on the target
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PodKey {
    /// Pod namespace
    pub namespace: String,
    /// Pod name
    pub name: String,
}

impl From<&Pod> for PodKey {
    fn from(pod: &Pod) -> Self {
        Self {
            namespace: pod.namespace().unwrap_or_default(),
            name: pod.name_any(),
        }
    }
}

fn is_running(pod: &Pod) -> bool {
    pod.status.as_ref().and_then(|s| s.phase.as_deref()) == Some(POD_RUNNING)
}

async fn all_pods_running(
    target: &dyn ClusterClient,
    roster: &[PodKey],
) -> PollResult<(), MigrateError> {
    for key in roster {
        match target.get_pod(&key.namespace, &key.name).await? {
            Some(pod) if is_running(&pod) => {}
            // Not created yet, or not running yet
            _ => return Ok(None),
        }
    }
    Ok(Some(()))
}

/// Wait until every Pod that ran on the source runs on the target.
///
/// Only names and namespaces of `pods` are used. A Pod that does not exist
/// yet counts as not converged; any other read error stops the wait.
/// Returns the names of the Pods observed running.
pub async fn wait_for_pods(
    ctx: &MigrationContext,
    pods: &[Pod],
) -> Result<Vec<String>, MigrateError> {
    let roster: Vec<PodKey> = pods.iter().map(PodKey::from).collect();
    let Some(first) = roster.first() else {
        return Ok(Vec::new());
    };

    info!(
        namespace = %first.namespace,
        pods = roster.len(),
        elapsed = ?ctx.elapsed(),
        "Waiting for all volumes to be bound and Pods to be running in target cluster"
    );

    let target = ctx.target();
    let roster_ref = &roster;
    poll_until(
        &ctx.config().pods_poll,
        ctx.cancel_token(),
        "all Pods running in target cluster",
        move || async move { all_pods_running(target, roster_ref).await },
    )
    .await?;

    info!(pods = roster.len(), elapsed = ?ctx.elapsed(), "All Pods running in target cluster");
    Ok(roster.into_iter().map(|key| key.name).collect())
}
