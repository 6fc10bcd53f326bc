//! Single-flight request deduplication.
//!
//! Concurrent client retries (double-clicks, network resubmissions) must not
//! execute the same turn twice. The in-flight table maps a request key to a
//! shared future; check-and-insert happens under one lock, so two callers can
//! never both become the executor for the same key.

use std::collections::HashMap;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;

type Flight<T> = Shared<BoxFuture<'static, T>>;

/// Collapses concurrent identical requests into a single execution.
///
/// All callers that join an in-flight key receive a clone of the same result
/// (success or failure). The entry is evicted as soon as the execution
/// resolves, so a later request with the same key runs fresh. Eviction is
/// identity-checked: a caller that raced with eviction never removes a
/// successor's entry.
pub struct SingleFlight<T: Clone> {
    inflight: Mutex<HashMap<String, Flight<T>>>,
}

impl<T: Clone> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> SingleFlight<T> {
    /// Create an empty in-flight table.
    pub fn new() -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Number of executions currently in flight.
    pub async fn in_flight(&self) -> usize {
        self.inflight.lock().await.len()
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Run `make()` once per key among concurrent callers.
    ///
    /// Returns the shared result and whether this caller started the
    /// execution (`true`) or joined one already in flight (`false`).
    pub async fn run<F>(&self, key: &str, make: F) -> (T, bool)
    where
        F: FnOnce() -> BoxFuture<'static, T>,
    {
        let (flight, leader) = {
            let mut inflight = self.inflight.lock().await;
            match inflight.get(key) {
                Some(existing) => (existing.clone(), false),
                None => {
                    let flight = make().shared();
                    inflight.insert(key.to_string(), flight.clone());
                    (flight, true)
                }
            }
        };

        let value = flight.clone().await;

        // Whoever observes completion first evicts the entry; the identity
        // check keeps a slow caller from removing a successor's flight.
        let mut inflight = self.inflight.lock().await;
        if let Some(current) = inflight.get(key) {
            if Flight::ptr_eq(current, &flight) {
                inflight.remove(key);
            }
        }

        (value, leader)
    }
}
