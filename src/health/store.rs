//! In-memory status store.
//!
//! # Responsibilities
//! - Map endpoint identifiers to their current [`EndpointStatus`]
//! - Serialize every read and write through one `RwLock`
//! - Hand out copies, never references into the map
//!
//! Each wholesale replacement bumps a generation counter. Writers pass the
//! generation they started under so a probe that outlives a reload cannot
//! write into the new map.

use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::health::state::EndpointStatus;

/// Why a write was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteRejected {
    /// The identifier is not configured.
    Missing,
    /// The store was replaced after the writer read its generation.
    Superseded,
}

#[derive(Debug, Default)]
struct Inner {
    generation: u64,
    statuses: HashMap<String, EndpointStatus>,
}

/// Thread-safe map of endpoint statuses.
#[derive(Debug, Default)]
pub struct StatusStore {
    inner: RwLock<Inner>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every entry with a fresh `Unknown` status. Returns the new generation.
    pub async fn replace<I, S>(&self, endpoints: I) -> u64
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.replace_with(endpoints, || {}).await
    }

    /// Like [`replace`](Self::replace), running `on_commit` while the write lock is held.
    pub async fn replace_with<I, S, F>(&self, endpoints: I, on_commit: F) -> u64
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce(),
    {
        let statuses: HashMap<String, EndpointStatus> = endpoints
            .into_iter()
            .map(|e| {
                let endpoint = e.into();
                (endpoint.clone(), EndpointStatus::unknown(endpoint))
            })
            .collect();

        let mut inner = self.inner.write().await;
        inner.generation += 1;
        inner.statuses = statuses;
        on_commit();
        inner.generation
    }

    /// Current status of `endpoint` together with the store generation.
    pub async fn lookup(&self, endpoint: &str) -> Option<(u64, EndpointStatus)> {
        let inner = self.inner.read().await;
        inner
            .statuses
            .get(endpoint)
            .map(|status| (inner.generation, status.clone()))
    }

    /// Atomically derive and store a new status from the current one.
    ///
    /// Returns the previous and the new status.
    pub async fn apply<F>(
        &self,
        endpoint: &str,
        generation: u64,
        update: F,
    ) -> Result<(EndpointStatus, EndpointStatus), WriteRejected>
    where
        F: FnOnce(&EndpointStatus) -> EndpointStatus,
    {
        let mut inner = self.inner.write().await;
        if inner.generation != generation {
            return Err(WriteRejected::Superseded);
        }
        let current = inner
            .statuses
            .get_mut(endpoint)
            .ok_or(WriteRejected::Missing)?;

        let next = update(current);
        let previous = std::mem::replace(current, next.clone());
        Ok((previous, next))
    }

    /// Point-in-time copy of every entry, sorted by identifier.
    pub async fn snapshot(&self) -> Vec<EndpointStatus> {
        let mut statuses: Vec<EndpointStatus> =
            self.inner.read().await.statuses.values().cloned().collect();
        statuses.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));
        statuses
    }

    /// Identifiers currently configured.
    pub async fn endpoints(&self) -> Vec<String> {
        self.inner.read().await.statuses.keys().cloned().collect()
    }

    pub async fn generation(&self) -> u64 {
        self.inner.read().await.generation
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.statuses.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::state::State;
    use std::sync::Arc;

    #[tokio::test]
    async fn replace_resets_entries() {
        let store = StatusStore::new();
        let g1 = store.replace(["a.test", "b.test"]).await;
        store
            .apply("a.test", g1, |s| s.advance(State::Passing, None))
            .await
            .unwrap();

        let g2 = store.replace(["a.test"]).await;
        assert_eq!(g2, g1 + 1);

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot, vec![EndpointStatus::unknown("a.test")]);
    }

    #[tokio::test]
    async fn apply_rejects_missing_endpoint() {
        let store = StatusStore::new();
        let generation = store.replace(["a.test"]).await;
        let result = store
            .apply("b.test", generation, |s| s.advance(State::Passing, None))
            .await;
        assert_eq!(result, Err(WriteRejected::Missing));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn apply_rejects_stale_generation() {
        let store = StatusStore::new();
        let stale = store.replace(["a.test"]).await;
        store.replace(["a.test"]).await;

        let result = store
            .apply("a.test", stale, |s| s.advance(State::Failing, None))
            .await;
        assert_eq!(result, Err(WriteRejected::Superseded));
        assert_eq!(store.snapshot().await[0].state, State::Unknown);
    }

    #[tokio::test]
    async fn snapshot_is_sorted() {
        let store = StatusStore::new();
        store.replace(["c.test", "a.test", "b.test"]).await;
        let names: Vec<String> = store.snapshot().await.into_iter().map(|s| s.endpoint).collect();
        assert_eq!(names, vec!["a.test", "b.test", "c.test"]);
    }

    #[tokio::test]
    async fn concurrent_writes_keep_streak_consistent() {
        let store = Arc::new(StatusStore::new());
        let generation = store.replace(["a.test"]).await;

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .apply("a.test", generation, |s| s.advance(State::Passing, None))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let (_, status) = store.lookup("a.test").await.unwrap();
        assert_eq!(status.streak, 50);
    }
}
