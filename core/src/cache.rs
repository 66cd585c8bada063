//! List query cache and the fixed query policy.
//!
//! # Design
//! One `QueryCache` is built per process and shared by reference with the
//! orchestrator. Entries are immutable `Arc<TodoList>` snapshots keyed by
//! `ListQuery`, so readers never lock. Concurrent fetches of the same key
//! are coalesced by moka; invalidation drops every filter variant at once.
//!
//! Invalidation also bumps a generation counter. A fetch that was already
//! running when the counter moved still answers its callers, but its result
//! is evicted right after insertion so the next read goes to the network.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::error::ClientError;
use crate::types::{ListQuery, TodoList};

/// Retry and freshness settings, fixed at orchestrator construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPolicy {
    /// Automatic retries of a failed list fetch.
    pub retry: u8,
    /// How long a fetched list is served without a new network call.
    ///
    /// This is a hard TTL: once it passes, the entry is gone and the next
    /// read waits for a refetch. Stale data is never served while a refresh
    /// runs in the background.
    pub stale_time: Duration,
    /// Pause before a retry.
    pub retry_delay: Duration,
    pub max_entries: u64,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self {
            retry: 1,
            stale_time: Duration::from_secs(5),
            retry_delay: Duration::from_secs(1),
            max_entries: 256,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryCache {
    lists: Cache<ListQuery, Arc<TodoList>>,
    generation: Arc<AtomicU64>,
}

impl QueryCache {
    pub fn new(policy: &QueryPolicy) -> Self {
        Self {
            lists: Cache::builder()
                .max_capacity(policy.max_entries)
                .time_to_live(policy.stale_time)
                .build(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Return the fresh entry for `key`, or run `fetch` and cache its result.
    ///
    /// Failures are not cached. Callers racing on the same key share one
    /// `fetch`. A result that an invalidation overtook is returned but not
    /// kept.
    pub async fn get_or_fetch<F>(&self, key: ListQuery, fetch: F) -> Result<Arc<TodoList>, ClientError>
    where
        F: Future<Output = Result<TodoList, ClientError>>,
    {
        let overtaken = AtomicBool::new(false);
        let (generation, flag) = (&self.generation, &overtaken);
        let result = self
            .lists
            .try_get_with(key.clone(), async move {
                let started = generation.load(Ordering::Acquire);
                let list = fetch.await?;
                if generation.load(Ordering::Acquire) != started {
                    flag.store(true, Ordering::Relaxed);
                }
                Ok::<_, ClientError>(Arc::new(list))
            })
            .await
            .map_err(|err| ClientError::clone(&err));

        if overtaken.load(Ordering::Relaxed) {
            tracing::debug!(completed = ?key.completed, "list invalidated while in flight, evicting");
            self.lists.invalidate(&key).await;
        }
        result
    }

    pub async fn cached(&self, key: &ListQuery) -> Option<Arc<TodoList>> {
        self.lists.get(key).await
    }

    /// Mark every cached list stale; the next read of any filter refetches.
    pub fn invalidate_lists(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.lists.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::types::ListMeta;

    fn empty_list() -> TodoList {
        TodoList {
            data: Vec::new(),
            meta: ListMeta { total: 0 },
        }
    }

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let cache = QueryCache::new(&QueryPolicy::default());
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let fetch = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(empty_list())
        };

        cache.get_or_fetch(ListQuery::default(), fetch()).await.unwrap();
        cache.get_or_fetch(ListQuery::default(), fetch()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.get_or_fetch(ListQuery::completed(true), fetch()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidation_forces_a_refetch_of_every_variant() {
        let cache = QueryCache::new(&QueryPolicy::default());
        for query in [ListQuery::default(), ListQuery::completed(false)] {
            cache.get_or_fetch(query, async { Ok(empty_list()) }).await.unwrap();
        }

        cache.invalidate_lists();
        assert!(cache.cached(&ListQuery::default()).await.is_none());
        assert!(cache.cached(&ListQuery::completed(false)).await.is_none());
    }

    #[tokio::test]
    async fn fetch_overtaken_by_invalidation_is_returned_but_not_kept() {
        let cache = QueryCache::new(&QueryPolicy::default());
        let list = cache
            .get_or_fetch(ListQuery::default(), async {
                cache.invalidate_lists();
                Ok(empty_list())
            })
            .await
            .unwrap();

        assert!(list.data.is_empty());
        assert!(cache.cached(&ListQuery::default()).await.is_none());
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = QueryCache::new(&QueryPolicy::default());
        let err = cache
            .get_or_fetch(ListQuery::default(), async {
                Err(ClientError::Network("offline".to_string()))
            })
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::Network("offline".to_string()));
        assert!(cache.cached(&ListQuery::default()).await.is_none());
    }

    #[tokio::test]
    async fn entries_expire_after_stale_time() {
        let policy = QueryPolicy {
            stale_time: Duration::from_millis(20),
            ..QueryPolicy::default()
        };
        let cache = QueryCache::new(&policy);
        cache
            .get_or_fetch(ListQuery::default(), async { Ok(empty_list()) })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(cache.cached(&ListQuery::default()).await.is_none());
    }
}
