//! In-memory correlation of "before" and "after" tool events.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::task::JoinHandle;

use crate::pending::PendingCall;

/// Entries older than this are dropped without ever being consumed.
pub const PENDING_CALL_TTL: Duration = Duration::from_secs(60);

pub const SWEEP_INTERVAL: Duration = Duration::from_secs(10);

/// Pending calls keyed by the host's call identifier.
#[derive(Debug, Default)]
pub struct PendingCallTracker {
    calls: DashMap<String, PendingCall>,
}

impl PendingCallTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the call stamped with the current time. Last write wins.
    pub fn record(&self, call_id: &str, mut call: PendingCall) {
        call.created_at = Utc::now();
        if let Some(previous) = self.calls.insert(call_id.to_string(), call) {
            tracing::debug!(
                call_id,
                file = %previous.file_path,
                "Replaced pending call with the same id"
            );
        }
    }

    /// Remove and return the call, if it is still pending.
    pub fn take(&self, call_id: &str) -> Option<PendingCall> {
        self.calls.remove(call_id).map(|(_, call)| call)
    }

    /// Drop every entry older than [`PENDING_CALL_TTL`] as of `now`.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let ttl = chrono::Duration::seconds(PENDING_CALL_TTL.as_secs() as i64);
        let before = self.calls.len();
        self.calls.retain(|_, call| now.signed_duration_since(call.created_at) <= ttl);
        let removed = before.saturating_sub(self.calls.len());
        if removed > 0 {
            tracing::debug!(removed, "Swept stale pending calls");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Sweep every [`SWEEP_INTERVAL`] until the tracker is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            // First tick fires immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match weak.upgrade() {
                    Some(tracker) => {
                        tracker.sweep(Utc::now());
                    }
                    None => break,
                }
            }
        })
    }
}
