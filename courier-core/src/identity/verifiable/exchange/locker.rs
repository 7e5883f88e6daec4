use std::collections::HashMap;
use std::sync::Arc;

use rst_common::with_tokio::tokio::sync::{Mutex, OwnedMutexGuard};

/// `Locker` hands out one async lock per proof request id
///
/// Entries nobody holds anymore are pruned on the next acquisition
#[derive(Clone, Default)]
pub struct Locker {
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl Locker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|key, lock| key == id || Arc::strong_count(lock) > 1);
            locks
                .entry(id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}
