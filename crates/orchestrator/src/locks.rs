//! Per-trip mutual exclusion.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Serializes operations on the same trip within this process.
///
/// Each trip id maps to its own async mutex; operations on different trips
/// never wait on each other. Entries nobody holds are pruned on acquire.
#[derive(Debug, Default)]
pub struct TripLocks {
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

/// Held for the duration of one operation on a trip.
pub type TripGuard = OwnedMutexGuard<()>;

impl TripLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `trip_id`.
    pub async fn acquire(&self, trip_id: i64) -> TripGuard {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|id, lock| *id == trip_id || Arc::strong_count(lock) > 1);
            locks
                .entry(trip_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        lock.lock_owned().await
    }

    /// Number of trips currently tracked.
    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
