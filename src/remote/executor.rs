//! # Resilient Query Executor
//!
//! The single choke point through which all remote reads and writes pass.
//! Every store builds an operation closure and a per-call [`RetryPolicy`],
//! then delegates here.
//!
//! ## Behavior
//!
//! - **Offline fast-fail**: when the process is flagged offline the network
//!   is skipped entirely and the policy's fallback is returned immediately.
//! - **Sequential retries**: attempts for one logical call never overlap;
//!   each failed retryable attempt suspends for an exponential backoff
//!   delay, re-probes connectivity, then re-attempts.
//! - **Fallback substitution**: once attempts are exhausted (or the failure
//!   is classified non-retryable) the fallback is returned if one was
//!   supplied; otherwise the last underlying error propagates. An error is
//!   never silently swallowed when no fallback exists.
//!
//! Independent logical calls may run concurrently; they keep their own
//! attempt counters but share the process-wide [`ConnectionTracker`], so a
//! failure in one call can flip global offline mode for the others.

use crate::error::RemoteError;
use crate::remote::client::{RemoteClient, RemoteResult};
use crate::remote::connection::{ConnectionState, ConnectionTracker};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-call retry policy.
///
/// `retries` is the total number of network attempts permitted for one
/// logical call. Each call site picks its own budget and its own fallback
/// value; there is no global policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy<T> {
    /// Maximum number of network attempts (0 means never touch the network)
    pub retries: u32,
    /// Value substituted when the remote call cannot be completed
    pub fallback: Option<T>,
}

impl<T> RetryPolicy<T> {
    /// Policy with a retry budget and no fallback; exhaustion propagates
    /// the last error to the caller
    pub fn attempts(retries: u32) -> Self {
        Self {
            retries,
            fallback: None,
        }
    }

    /// Policy with a retry budget and a fallback value
    pub fn with_fallback(retries: u32, fallback: T) -> Self {
        Self {
            retries,
            fallback: Some(fallback),
        }
    }
}

/// Exponential backoff configuration
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Delay before the second attempt; doubles per attempt thereafter
    pub base: Duration,
    /// Upper bound on any single delay
    pub cap: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            cap: Duration::from_secs(10),
        }
    }
}

impl BackoffConfig {
    /// Delay to apply after the given failed attempt (1-based).
    ///
    /// Doubles per attempt, saturating at the cap: 1s, 2s, 4s, 8s, 10s, 10s...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base
            .checked_mul(factor)
            .map(|delay| delay.min(self.cap))
            .unwrap_or(self.cap)
    }
}

/// Executor mediating between stores and the remote backend
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    client: RemoteClient,
    connection: ConnectionTracker,
    backoff: BackoffConfig,
}

impl QueryExecutor {
    /// Create an executor over a remote client with default backoff
    pub fn new(client: RemoteClient) -> Self {
        Self {
            client,
            connection: ConnectionTracker::new(),
            backoff: BackoffConfig::default(),
        }
    }

    /// Override the backoff schedule
    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// The underlying remote client
    pub fn client(&self) -> &RemoteClient {
        &self.client
    }

    /// Handle to the shared connection state
    pub fn connection(&self) -> &ConnectionTracker {
        &self.connection
    }

    /// Current connection status
    pub fn status(&self) -> ConnectionState {
        self.connection.status()
    }

    /// Whether remote calls are currently skipped
    pub fn is_offline(&self) -> bool {
        self.connection.is_offline()
    }

    /// Probe whether the backend is reachable and minimally functional.
    ///
    /// Issues a lightweight single-row read against the configured probe
    /// table; if that fails, falls back to the auth user endpoint, since
    /// some deployments restrict direct table access. Best-effort: failures
    /// are never propagated, only reflected in the connection state.
    pub async fn test_connection(&self) -> bool {
        match self.client.health(&self.client.config().probe_table).await {
            Ok(()) => {
                debug!("probe succeeded");
                self.connection.mark_connected();
                return true;
            }
            Err(err) => {
                debug!(error = %err, "probe read failed, trying auth session");
            }
        }
        match self.client.auth_user().await {
            Ok(_) => {
                debug!("auth probe succeeded");
                self.connection.mark_connected();
                true
            }
            Err(err) => {
                warn!(error = %err, "backend unreachable");
                self.connection.mark_error();
                false
            }
        }
    }

    /// Execute a remote operation under a retry policy.
    ///
    /// The operation receives a clone of the client (clones share the
    /// connection pool and session) and performs exactly one remote call
    /// per invocation. At most `policy.retries` invocations are made.
    pub async fn execute<T, F, Fut>(&self, operation: F, policy: RetryPolicy<T>) -> RemoteResult<T>
    where
        F: Fn(RemoteClient) -> Fut,
        Fut: Future<Output = RemoteResult<T>>,
    {
        if self.connection.is_offline() {
            return match policy.fallback {
                Some(fallback) => {
                    debug!("offline, returning fallback without network attempt");
                    Ok(fallback)
                }
                None => Err(RemoteError::transient(
                    "offline mode active and no fallback supplied",
                )),
            };
        }

        if policy.retries == 0 {
            return match policy.fallback {
                Some(fallback) => Ok(fallback),
                None => Err(RemoteError::transient(
                    "retry policy permits no attempts and no fallback supplied",
                )),
            };
        }

        let mut attempt = 0u32;
        let last_error = loop {
            attempt += 1;
            match operation(self.client.clone()).await {
                Ok(value) => {
                    self.connection.mark_connected();
                    debug!(attempt, "remote operation succeeded");
                    return Ok(value);
                }
                Err(err) => {
                    warn!(
                        attempt,
                        budget = policy.retries,
                        retryable = err.is_retryable(),
                        error = %err,
                        "remote operation failed"
                    );
                    if err.is_retryable() && attempt < policy.retries {
                        self.connection.mark_retrying();
                        let delay = self.backoff.delay_for(attempt);
                        debug!(delay_ms = delay.as_millis() as u64, "backing off");
                        tokio::time::sleep(delay).await;
                        // Refresh shared state before the next attempt
                        self.test_connection().await;
                        continue;
                    }
                    break err;
                }
            }
        };

        self.connection.mark_error();
        match policy.fallback {
            Some(fallback) => {
                info!(attempts = attempt, error = %last_error, "returning fallback value");
                Ok(fallback)
            }
            None => Err(last_error),
        }
    }
}
