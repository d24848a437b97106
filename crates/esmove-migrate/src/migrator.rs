//! Ordered migration pipeline
//!
//! Each phase consumes what earlier phases produced and runs to completion
//! before the next starts. The first failure stops the pipeline; nothing is
//! rolled back.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::{error, info};

use crate::cleanup::delete_source_volumes;
use crate::collect::collect_source;
use crate::context::{ElasticsearchRef, MigrationContext};
use crate::converge::wait_for_pods;
use crate::delete::delete_source;
use crate::error::MigrateError;
use crate::guard::protect_volumes;
use crate::identity::verify_cluster_uuid;
use crate::recreate::recreate_on_target;

/// Steps of a migration, in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Read the Elasticsearch resource, Pods, PVCs and PVs from the source
    Collect,
    /// Set `Retain` on the source PVs
    ProtectVolumes,
    /// Delete the Elasticsearch resource and its Pods on the source
    DeleteSource,
    /// Create PVs and the Elasticsearch resource on the target
    Recreate,
    /// Wait for the Pods to run on the target
    WaitForPods,
    /// Wait for the target to report the source cluster UUID
    VerifyClusterUuid,
    /// Delete the source PV objects
    Cleanup,
}

impl Phase {
    /// All phases in execution order
    pub const ALL: [Phase; 7] = [
        Phase::Collect,
        Phase::ProtectVolumes,
        Phase::DeleteSource,
        Phase::Recreate,
        Phase::WaitForPods,
        Phase::VerifyClusterUuid,
        Phase::Cleanup,
    ];

    /// Short name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Collect => "collect",
            Phase::ProtectVolumes => "protect-volumes",
            Phase::DeleteSource => "delete-source",
            Phase::Recreate => "recreate",
            Phase::WaitForPods => "wait-for-pods",
            Phase::VerifyClusterUuid => "verify-cluster-uuid",
            Phase::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful migration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MigrationReport {
    /// Migrated Elasticsearch resource
    pub elasticsearch: ElasticsearchRef,
    /// Cluster UUID reported by both source and target
    pub cluster_uuid: String,
    /// PVs recreated on the target
    pub volumes: Vec<String>,
    /// Pods observed running on the target
    pub pods: Vec<String>,
    /// Wall time of the migration
    pub elapsed: Duration,
}

/// Runs the migration phases against a source and a target cluster
pub struct Migrator {
    ctx: MigrationContext,
}

impl Migrator {
    /// Create a migrator over the given context
    pub fn new(ctx: MigrationContext) -> Self {
        Self { ctx }
    }

    /// Context shared by the phases
    pub fn context(&self) -> &MigrationContext {
        &self.ctx
    }

    /// Run every phase in order, stopping at the first failure.
    pub async fn run(&self) -> Result<MigrationReport, MigrateError> {
        let ctx = &self.ctx;

        let snapshot = self.phase(Phase::Collect, collect_source(ctx)).await?;
        self.phase(
            Phase::ProtectVolumes,
            protect_volumes(ctx, &snapshot.volumes),
        )
        .await?;
        self.phase(
            Phase::DeleteSource,
            delete_source(ctx, &snapshot.elasticsearch),
        )
        .await?;
        let volumes = self
            .phase(Phase::Recreate, recreate_on_target(ctx, &snapshot))
            .await?;
        let pods = self
            .phase(Phase::WaitForPods, wait_for_pods(ctx, &snapshot.pods))
            .await?;
        let cluster_uuid = self
            .phase(
                Phase::VerifyClusterUuid,
                verify_cluster_uuid(ctx, &snapshot.elasticsearch),
            )
            .await?;
        self.phase(
            Phase::Cleanup,
            delete_source_volumes(ctx, &snapshot.volumes),
        )
        .await?;

        let report = MigrationReport {
            elasticsearch: ctx.config().elasticsearch.clone(),
            cluster_uuid,
            volumes,
            pods,
            elapsed: ctx.elapsed(),
        };
        info!(
            elasticsearch = %report.elasticsearch,
            uuid = %report.cluster_uuid,
            volumes = report.volumes.len(),
            elapsed = ?report.elapsed,
            "Migration successful!"
        );
        Ok(report)
    }

    async fn phase<T>(
        &self,
        phase: Phase,
        step: impl Future<Output = Result<T, MigrateError>>,
    ) -> Result<T, MigrateError> {
        if self.ctx.cancel_token().is_cancelled() {
            error!(phase = %phase, "Migration cancelled before phase started");
            return Err(MigrateError::Cancelled {
                during: phase.to_string(),
            });
        }

        info!(phase = %phase, elapsed = ?self.ctx.elapsed(), "Starting phase");
        step.await.inspect_err(|e| {
            error!(
                phase = %phase,
                error = %e,
                elapsed = ?self.ctx.elapsed(),
                "Migration phase failed"
            );
        })
    }
}
