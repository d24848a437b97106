//! Validated settings for one run

use std::path::PathBuf;
use std::time::Duration;

use esmove_common::poll::PollConfig;
use esmove_migrate::{ElasticsearchRef, MigrationConfig};

use crate::{Cli, Error, Result};

/// Everything a run needs, checked before any API call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Kubeconfig context of the source cluster
    pub from_context: String,
    /// Kubeconfig context of the target cluster
    pub to_context: String,
    /// Kubeconfig file, default resolution when unset
    pub kubeconfig: Option<PathBuf>,
    /// Migration tunables
    pub migration: MigrationConfig,
}

impl TryFrom<&Cli> for Settings {
    type Error = Error;

    fn try_from(cli: &Cli) -> Result<Self> {
        let elasticsearch: ElasticsearchRef = cli
            .elasticsearch
            .parse()
            .map_err(|e: esmove_migrate::ParseRefError| Error::validation(e.to_string()))?;

        if cli.from_context.is_empty() {
            return Err(Error::validation(
                "--from=<kubeconfig context name> is mandatory",
            ));
        }
        if cli.to_context.is_empty() {
            return Err(Error::validation(
                "--to=<kubeconfig context name> is mandatory",
            ));
        }
        if cli.poll_attempts == 0 {
            return Err(Error::validation("--poll-attempts must be at least 1"));
        }

        let poll = PollConfig::new(Duration::from_secs(cli.poll_interval), cli.poll_attempts);
        Ok(Self {
            from_context: cli.from_context.clone(),
            to_context: cli.to_context.clone(),
            kubeconfig: cli.kubeconfig.clone(),
            migration: MigrationConfig::new(elasticsearch).with_poll(poll),
        })
    }
}
