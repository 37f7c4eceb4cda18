use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per spot id. Bookings on the same spot queue up here for
/// the whole check-then-insert transaction; other spots are unaffected.
///
/// Entries only live while someone holds or waits on them, so the map stays
/// as small as the number of spots currently being booked.
#[derive(Clone, Default)]
pub struct SpotLocks {
    inner: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl SpotLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, spot_id: i64) -> SpotGuard {
        // Clone the Arc out before awaiting so no shard guard is held across it.
        let mutex = self
            .inner
            .entry(spot_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;
        SpotGuard {
            guard: Some(guard),
            spot_id,
            locks: Arc::clone(&self.inner),
        }
    }

    /// Number of spot ids that currently have a mutex allocated.
    pub fn tracked(&self) -> usize {
        self.inner.len()
    }
}

/// Holds a spot's mutex. Dropping it unlocks the spot and frees the map
/// entry when no other task is queued on it.
pub struct SpotGuard {
    guard: Option<OwnedMutexGuard<()>>,
    spot_id: i64,
    locks: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl Drop for SpotGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map's own Arc is left once nobody else cloned it; the
        // shard lock keeps this atomic with respect to `acquire`.
        self.locks
            .remove_if(&self.spot_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
