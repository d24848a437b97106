//! Elasticsearch move between Kubernetes clusters
//!
//! Moves an ECK-managed Elasticsearch cluster from one Kubernetes cluster to
//! another in the same region, reusing its cloud disks so the data and the
//! Elasticsearch cluster UUID are preserved.
//!
//! ## Pipeline
//!
//! ```text
//! Source                                 Target
//! ─────────────────                      ──────────────────
//! 1. Collect ES, Pods, PVCs, PVs
//! 2. Set PV reclaim policy to Retain
//! 3. Delete ES, force-delete Pods
//!                                        4. Create PVs (same disks, claimRef
//!                                           without uid/resourceVersion)
//!                                        5. Create ES (no annotations/status)
//!                                        6. Wait for every Pod to run
//!                                        7. Wait for the cluster UUID,
//!                                           must equal the source UUID
//! 8. Delete source PV objects
//! ```
//!
//! Any failure stops the pipeline. There is no rollback: the source PVs stay
//! `Retain` until step 8, so the disks survive whatever state the run ends in.

mod cleanup;
mod client;
mod collect;
mod context;
mod converge;
mod delete;
mod error;
mod guard;
mod identity;
mod migrator;
mod recreate;

#[cfg(test)]
mod fixtures;

pub use cleanup::delete_source_volumes;
pub use client::{ClusterClient, KubeClusterClient};
pub use collect::{collect_source, SourceSnapshot};
pub use context::{
    ElasticsearchRef, MigrationClock, MigrationConfig, MigrationContext, ParseRefError,
};
pub use converge::{wait_for_pods, PodKey, POD_RUNNING};
pub use delete::delete_source;
pub use error::MigrateError;
pub use guard::{is_retained, protect_volumes, RECLAIM_RETAIN};
pub use identity::verify_cluster_uuid;
pub use migrator::{MigrationReport, Migrator, Phase};
pub use recreate::{elasticsearch_for_target, recreate_on_target, volume_for_target};
