//! # Connection State Tracking
//!
//! Process-wide connection status shared by every call site. The tracker is
//! a cloneable handle over a single shared cell; it is mutated only by the
//! query executor and the connectivity probe, never directly by call sites.
//!
//! Concurrent calls race on the cell with last-writer-wins semantics. That
//! is intentional: a failure in one call may flip the whole process offline
//! and short-circuit concurrent calls until the next successful probe or
//! operation clears it.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Connection status of the remote backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No probe or operation has succeeded yet, or the process went offline
    Disconnected,
    /// Last probe or operation succeeded
    Connected,
    /// A backoff sequence is in progress
    Retrying,
    /// Retries exhausted or probe failed
    Error,
}

impl ConnectionState {
    /// Stable lowercase name, matching what UIs display
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
            Self::Retrying => "retrying",
            Self::Error => "error",
        }
    }
}

/// Cloneable handle to the process-wide connection state
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    state: Arc<RwLock<ConnectionState>>,
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionTracker {
    /// Create a tracker starting in `Disconnected`
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
        }
    }

    /// Current connection status
    pub fn status(&self) -> ConnectionState {
        *self.state.read().expect("connection state lock poisoned")
    }

    /// Whether remote calls should be skipped entirely
    pub fn is_offline(&self) -> bool {
        self.status() != ConnectionState::Connected
    }

    /// Record a successful probe or operation
    pub fn mark_connected(&self) {
        self.transition(ConnectionState::Connected);
    }

    /// Record that a backoff sequence is in progress
    pub fn mark_retrying(&self) {
        self.transition(ConnectionState::Retrying);
    }

    /// Record an exhausted retry sequence or failed probe
    pub fn mark_error(&self) {
        self.transition(ConnectionState::Error);
    }

    /// Reset to the initial disconnected state
    pub fn reset(&self) {
        self.transition(ConnectionState::Disconnected);
    }

    fn transition(&self, next: ConnectionState) {
        let mut state = self.state.write().expect("connection state lock poisoned");
        if *state != next {
            debug!(from = %state.as_str(), to = %next.as_str(), "connection state changed");
        }
        *state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_starts_disconnected() {
        let tracker = ConnectionTracker::new();
        assert_eq!(tracker.status(), ConnectionState::Disconnected);
        assert!(tracker.is_offline());
    }

    #[test]
    fn test_mark_connected_clears_offline() {
        let tracker = ConnectionTracker::new();
        tracker.mark_connected();
        assert_eq!(tracker.status(), ConnectionState::Connected);
        assert!(!tracker.is_offline());
    }

    #[test]
    fn test_retrying_and_error_are_offline() {
        let tracker = ConnectionTracker::new();
        tracker.mark_retrying();
        assert_eq!(tracker.status(), ConnectionState::Retrying);
        assert!(tracker.is_offline());

        tracker.mark_error();
        assert_eq!(tracker.status(), ConnectionState::Error);
        assert!(tracker.is_offline());
    }

    #[test]
    fn test_clones_share_state() {
        let tracker = ConnectionTracker::new();
        let other = tracker.clone();
        tracker.mark_connected();
        assert_eq!(other.status(), ConnectionState::Connected);
        other.reset();
        assert!(tracker.is_offline());
    }

    #[test]
    fn test_state_name() {
        assert_eq!(ConnectionState::Connected.as_str(), "connected");
        assert_eq!(ConnectionState::Retrying.as_str(), "retrying");
        assert_eq!(ConnectionState::Error.as_str(), "error");
        assert_eq!(ConnectionState::Disconnected.as_str(), "disconnected");
    }
}
