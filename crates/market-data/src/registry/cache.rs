//! Time-boxed cache with single-flight deduplication.
//!
//! Results are cached per key with a TTL; concurrent misses for the same
//! key share one in-flight fetch instead of issuing redundant external
//! calls. Failed fetches (`None`) are never stored, so the next caller
//! retries.
//!
//! The cache is the only shared mutable state in the crate; all access goes
//! through an async mutex held only for map bookkeeping, never across a
//! network call.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tokio::time::Instant;

enum Slot<T: Clone> {
    Ready { value: T, stored_at: Instant },
    InFlight(Shared<BoxFuture<'static, Option<T>>>),
}

/// TTL cache with single-flight fetch deduplication.
pub struct SingleFlightCache<T: Clone> {
    ttl: Duration,
    slots: Mutex<HashMap<String, Slot<T>>>,
}

impl<T: Clone + Send + Sync + 'static> SingleFlightCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Get the cached value for `key`, or run `fetch` to produce it.
    ///
    /// A fresh cached value is returned without touching the network. If a
    /// fetch for the same key is already in flight, its result is awaited
    /// and shared. A `None` result is returned to every waiter but not
    /// cached.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<T>> + Send + 'static,
    {
        let shared = {
            let mut slots = self.slots.lock().await;
            let in_flight = match slots.get(key) {
                Some(Slot::Ready { value, stored_at }) if stored_at.elapsed() < self.ttl => {
                    return Some(value.clone());
                }
                Some(Slot::InFlight(fut)) => Some(fut.clone()),
                _ => None,
            };
            match in_flight {
                Some(fut) => fut,
                None => {
                    let fut = fetch().boxed().shared();
                    slots.insert(key.to_string(), Slot::InFlight(fut.clone()));
                    fut
                }
            }
        };

        let result = shared.await;

        let mut slots = self.slots.lock().await;
        match &result {
            Some(value) => {
                slots.insert(
                    key.to_string(),
                    Slot::Ready {
                        value: value.clone(),
                        stored_at: Instant::now(),
                    },
                );
            }
            None => {
                // Drop the in-flight marker so the next caller retries.
                if matches!(slots.get(key), Some(Slot::InFlight(_))) {
                    slots.remove(key);
                }
            }
        }

        result
    }

    /// Drop every cached entry.
    pub async fn clear(&self) {
        self.slots.lock().await.clear();
    }

    /// Number of entries currently held (ready or in flight).
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }
}
