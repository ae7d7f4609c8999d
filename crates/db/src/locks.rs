//! Per-period reader/writer locks.
//!
//! Postings, voids and opening-balance posts hold the shared side of their
//! period's lock; recalculation and period close/reopen hold the exclusive
//! side. Locks are always taken before a database transaction begins.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use uuid::Uuid;

/// Registry of per-period locks, cheap to clone and share.
#[derive(Debug, Clone, Default)]
pub struct PeriodLocks {
    inner: Arc<DashMap<Uuid, Arc<RwLock<()>>>>,
}

impl PeriodLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, period_id: Uuid) -> Arc<RwLock<()>> {
        self.inner.entry(period_id).or_default().clone()
    }

    /// Acquires the shared side for a posting into `period_id`.
    pub async fn shared(&self, period_id: Uuid) -> OwnedRwLockReadGuard<()> {
        self.lock_for(period_id).read_owned().await
    }

    /// Acquires the exclusive side for a rebuild or state change of `period_id`.
    pub async fn exclusive(&self, period_id: Uuid) -> OwnedRwLockWriteGuard<()> {
        self.lock_for(period_id).write_owned().await
    }

    /// Number of periods that have been locked at least once.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if no period has been locked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
