// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-scope memo of expensive enumeration results.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tether_core::Result;
use tokio::sync::{OnceCell, RwLock};
use tracing::debug;

/// Results keyed by the scope that produced them.
///
/// Concurrent callers for the same scope share one in-flight fetch. A
/// failed fetch leaves the slot empty so a later call retries.
#[derive(Debug)]
pub struct ScopeCache<T> {
    entries: RwLock<HashMap<String, Arc<OnceCell<T>>>>,
}

impl<T> Default for ScopeCache<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: Clone + Send + Sync> ScopeCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `scope`, running `fetch` on a miss.
    pub async fn get_or_fetch<F, Fut>(&self, scope: &str, fetch: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let cell = self.slot(scope).await;
        if let Some(hit) = cell.get() {
            debug!(scope, "scope cache hit");
            return Ok(hit.clone());
        }
        cell.get_or_try_init(fetch).await.cloned()
    }

    async fn slot(&self, scope: &str) -> Arc<OnceCell<T>> {
        if let Some(cell) = self.entries.read().await.get(scope) {
            return cell.clone();
        }
        let mut entries = self.entries.write().await;
        // Another caller may have inserted the slot while we waited.
        entries
            .entry(scope.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Value for `scope` if it has been fetched.
    pub async fn peek(&self, scope: &str) -> Option<T> {
        self.entries
            .read()
            .await
            .get(scope)
            .and_then(|cell| cell.get().cloned())
    }

    /// Drops one scope so the next call fetches again.
    pub async fn invalidate(&self, scope: &str) {
        self.entries.write().await.remove(scope);
    }

    /// Number of scopes holding a value.
    pub async fn len(&self) -> usize {
        self.entries
            .read()
            .await
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tether_core::TetherError;

    #[tokio::test]
    async fn second_call_is_served_from_cache() {
        let cache = ScopeCache::<Vec<u32>>::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let got = cache
                .get_or_fetch("t1", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2])
                })
                .await
                .unwrap();
            assert_eq!(got, vec![1, 2]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_one_fetch() {
        let cache = Arc::new(ScopeCache::<u32>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch("t1", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        Ok(7)
                    })
                    .await
            }));
        }
        for h in handles {
            assert_eq!(h.await.unwrap().unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = ScopeCache::<u32>::new();
        let err = cache
            .get_or_fetch("t1", || async { Err(TetherError::connectivity("test", "down")) })
            .await;
        assert!(err.is_err());
        assert!(cache.is_empty().await);
        let ok = cache.get_or_fetch("t1", || async { Ok(1) }).await.unwrap();
        assert_eq!(ok, 1);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let cache = ScopeCache::<u32>::new();
        cache.get_or_fetch("t1", || async { Ok(1) }).await.unwrap();
        assert_eq!(cache.peek("t1").await, Some(1));
        cache.invalidate("t1").await;
        assert_eq!(cache.peek("t1").await, None);
        assert_eq!(cache.get_or_fetch("t1", || async { Ok(2) }).await.unwrap(), 2);
    }
}
