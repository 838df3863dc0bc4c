//! Per-session mutation locks.
//!
//! Every combat mutation holds its session's lock from load through save, so
//! two writers on one session run strictly one after the other. Sessions never
//! share a lock; work on different sessions proceeds in parallel.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use skirmish_domain::CombatSessionId;

#[derive(Default)]
pub struct SessionLocks {
    locks: DashMap<CombatSessionId, Arc<Mutex<()>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `session_id`.
    ///
    /// The guard releases on drop.
    pub async fn acquire(&self, session_id: CombatSessionId) -> OwnedMutexGuard<()> {
        // Clone out of the map before awaiting; a DashMap shard guard must not
        // be held across the await.
        let lock = self.locks.entry(session_id).or_default().value().clone();
        lock.lock_owned().await
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
