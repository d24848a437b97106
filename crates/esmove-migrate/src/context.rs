//! Per-migration state shared by every step

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use esmove_common::poll::PollConfig;
use tokio_util::sync::CancellationToken;

use crate::client::ClusterClient;

/// Namespace and name of the Elasticsearch resource to migrate
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElasticsearchRef {
    /// Namespace of the Elasticsearch resource
    pub namespace: String,
    /// Name of the Elasticsearch resource
    pub name: String,
}

impl ElasticsearchRef {
    /// Create a reference from namespace and name
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ElasticsearchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Error parsing a `namespace/name` reference
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid argument {0}. Expected 'namespace/name'")]
pub struct ParseRefError(String);

impl FromStr for ElasticsearchRef {
    type Err = ParseRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => {
                Ok(Self::new(namespace, name))
            }
            _ => Err(ParseRefError(s.to_string())),
        }
    }
}

/// Tunables of a migration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MigrationConfig {
    /// Elasticsearch resource to migrate
    pub elasticsearch: ElasticsearchRef,
    /// Poll budget while waiting for Pods to run in the target cluster
    pub pods_poll: PollConfig,
    /// Poll budget while waiting for the target to report the cluster UUID
    pub uuid_poll: PollConfig,
}

impl MigrationConfig {
    /// Create a config with the default poll budgets
    pub fn new(elasticsearch: ElasticsearchRef) -> Self {
        Self {
            elasticsearch,
            pods_poll: PollConfig::default(),
            uuid_poll: PollConfig::default(),
        }
    }

    /// Use the same poll budget for both waits
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.pods_poll = poll.clone();
        self.uuid_poll = poll;
        self
    }
}

/// Elapsed time since the migration started, for log lines
#[derive(Clone, Copy, Debug)]
pub struct MigrationClock {
    start: Instant,
}

impl MigrationClock {
    /// Start the clock now
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time since start, rounded down to whole seconds
    pub fn elapsed(&self) -> Duration {
        Duration::from_secs(self.start.elapsed().as_secs())
    }
}

/// Everything a step needs: both endpoints, the config, the clock and the
/// cancellation token.
pub struct MigrationContext {
    source: Arc<dyn ClusterClient>,
    target: Arc<dyn ClusterClient>,
    config: MigrationConfig,
    clock: MigrationClock,
    cancel: CancellationToken,
}

impl MigrationContext {
    /// Create a context; the clock starts now
    pub fn new(
        source: Arc<dyn ClusterClient>,
        target: Arc<dyn ClusterClient>,
        config: MigrationConfig,
    ) -> Self {
        Self {
            source,
            target,
            config,
            clock: MigrationClock::start(),
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Cluster the Elasticsearch resource is moved away from
    pub fn source(&self) -> &dyn ClusterClient {
        self.source.as_ref()
    }

    /// Cluster the Elasticsearch resource is moved to
    pub fn target(&self) -> &dyn ClusterClient {
        self.target.as_ref()
    }

    /// Migration tunables
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Time since the migration started
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    /// Cancellation token observed by polls and step boundaries
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}
