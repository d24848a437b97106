//! esmove CLI library

pub mod config;
pub mod error;

pub use config::Settings;
pub use error::{Error, Result};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use esmove_common::kube_utils::{create_client_for_context, probe_elasticsearch_api};
use esmove_migrate::{KubeClusterClient, MigrationContext, MigrationReport, Migrator};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// esmove - move an ECK Elasticsearch cluster to another Kubernetes cluster
/// in the same region, keeping its data volumes
#[derive(Parser, Debug)]
#[command(name = "esmove")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Elasticsearch resource to move
    #[arg(value_name = "NAMESPACE/NAME")]
    pub elasticsearch: String,

    /// Kubeconfig context of the source cluster
    #[arg(long = "from", env = "ESMOVE_FROM_CONTEXT")]
    pub from_context: String,

    /// Kubeconfig context of the target cluster
    #[arg(long = "to", env = "ESMOVE_TO_CONTEXT")]
    pub to_context: String,

    /// Kubeconfig file (defaults to $KUBECONFIG or ~/.kube/config)
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Seconds between two checks while waiting on the target cluster
    #[arg(long, value_name = "SECONDS", default_value_t = 5)]
    pub poll_interval: u64,

    /// Checks before giving up while waiting on the target cluster
    #[arg(long, default_value_t = 30)]
    pub poll_attempts: u32,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl Cli {
    /// Validate the arguments, connect to both clusters and run the migration
    pub async fn run(self) -> Result<MigrationReport> {
        let settings = Settings::try_from(&self)?;

        let source = connect(settings.kubeconfig.as_deref(), &settings.from_context).await?;
        let target = connect(settings.kubeconfig.as_deref(), &settings.to_context).await?;

        let cancel = CancellationToken::new();
        tokio::spawn(cancel_on_signal(cancel.clone()));

        let ctx = MigrationContext::new(Arc::new(source), Arc::new(target), settings.migration)
            .with_cancellation(cancel);
        let report = Migrator::new(ctx).run().await?;
        Ok(report)
    }
}

async fn connect(kubeconfig: Option<&Path>, context: &str) -> Result<KubeClusterClient> {
    let client = create_client_for_context(kubeconfig, context).await?;
    probe_elasticsearch_api(&client, context).await?;
    info!(context, "Connected to cluster");
    Ok(KubeClusterClient::new(client))
}

/// Cancel the migration on SIGINT (Ctrl+C) or SIGTERM.
async fn cancel_on_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if result.is_err() {
                return;
            }
            warn!("SIGINT (Ctrl+C) received, stopping the migration");
        }
        _ = terminate => {
            warn!("SIGTERM received, stopping the migration");
        }
    }
    cancel.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_defaults_to_text() {
        let cli = Cli::try_parse_from(["esmove", "ns/es1", "--from", "a", "--to", "b"])
            .expect("valid arguments");
        assert_eq!(cli.log_format, LogFormat::Text);
        assert_eq!(cli.poll_interval, 5);
        assert_eq!(cli.poll_attempts, 30);
        assert!(cli.kubeconfig.is_none());
    }

    #[test]
    fn parses_json_log_format() {
        let cli = Cli::try_parse_from([
            "esmove",
            "ns/es1",
            "--from",
            "a",
            "--to",
            "b",
            "--log-format",
            "json",
        ])
        .expect("valid arguments");
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
