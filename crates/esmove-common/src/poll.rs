//! Fixed-interval polling with an attempt budget and cancellation
//!
//! Both convergence checks of a migration (pods running, cluster UUID
//! reported) are bounded polls: a fixed number of attempts separated by a
//! fixed interval, with no backoff. The caller may also cancel the poll
//! through a [`CancellationToken`].

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default number of poll attempts
pub const DEFAULT_POLL_ATTEMPTS: u32 = 30;
/// Default interval between poll attempts
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Attempt budget and interval for a poll
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollConfig {
    /// Time to wait between two attempts
    pub interval: Duration,
    /// Maximum number of attempts before giving up
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_POLL_ATTEMPTS,
        }
    }
}

impl PollConfig {
    /// Create a config with the given interval and attempt budget
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Upper bound of the time spent sleeping between attempts
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

/// Result type for poll check functions.
///
/// - `Ok(Some(value))` - condition met, stop polling
/// - `Ok(None)` - condition not met yet, keep polling
/// - `Err(e)` - fatal error, stop polling immediately
pub type PollResult<T, E> = Result<Option<T>, E>;

/// Why a poll did not produce a value
#[derive(Debug, Error)]
pub enum PollError<E> {
    /// The attempt budget ran out before the condition was met
    #[error("{description}: condition not met after {attempts} attempts")]
    Exhausted {
        /// What was being waited for
        description: String,
        /// Number of attempts made
        attempts: u32,
    },

    /// The cancellation token fired while polling
    #[error("{description}: polling cancelled")]
    Cancelled {
        /// What was being waited for
        description: String,
    },

    /// The check function returned a fatal error
    #[error("{0}")]
    Check(E),
}

/// Poll `check_fn` until it yields a value, fails, the budget is exhausted
/// or `cancel` fires.
///
/// No sleep follows the last attempt.
pub async fn poll_until<T, E, F, Fut>(
    config: &PollConfig,
    cancel: &CancellationToken,
    description: &str,
    mut check_fn: F,
) -> Result<T, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PollResult<T, E>>,
{
    for attempt in 1..=config.max_attempts {
        if cancel.is_cancelled() {
            return Err(PollError::Cancelled {
                description: description.to_string(),
            });
        }

        if let Some(value) = check_fn().await.map_err(PollError::Check)? {
            return Ok(value);
        }

        if attempt == config.max_attempts {
            break;
        }

        debug!(
            attempt = attempt,
            max_attempts = config.max_attempts,
            "Waiting for {}...",
            description
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(PollError::Cancelled {
                    description: description.to_string(),
                });
            }
            _ = tokio::time::sleep(config.interval) => {}
        }
    }

    Err(PollError::Exhausted {
        description: description.to_string(),
        attempts: config.max_attempts,
    })
}
