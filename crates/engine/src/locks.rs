//! Per-aggregate mutual exclusion.
//!
//! Every write that reads a balance, checks it and writes it back holds the
//! lock of the aggregate it touches (a category, a budget or a goal) for the
//! whole database transaction. Operations on different aggregates never wait
//! on each other.
//!
//! Locks must be acquired **before** the database transaction starts: the
//! connection pool may hand out a single connection (in-memory SQLite), and a
//! task holding that connection must never wait on a lock.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
pub(crate) struct AggregateLocks {
    slots: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

/// Guards held for the duration of one operation.
#[derive(Debug)]
pub(crate) struct LockSet {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl AggregateLocks {
    fn slot(&self, id: Uuid) -> Arc<AsyncMutex<()>> {
        let mut slots = match self.slots.lock() {
            Ok(slots) => slots,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Drop slots nobody is holding or waiting on.
        slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        slots.entry(id).or_default().clone()
    }

    /// Lock a single aggregate.
    pub(crate) async fn lock(&self, id: Uuid) -> LockSet {
        self.lock_many(&[id]).await
    }

    /// Lock several aggregates in ascending id order so two operations over
    /// the same pair cannot deadlock.
    pub(crate) async fn lock_many(&self, ids: &[Uuid]) -> LockSet {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.slot(id).lock_owned().await);
        }
        LockSet { _guards: guards }
    }
}
