//! Single-flight LRU cache
//!
//! `SingleFlightCache` is the shared engine behind both cache decorators. A
//! key is either `Pending` (one fetch in flight, shared by every caller that
//! asks for the key meanwhile) or `Ready` (a completed value). The fetch runs
//! as its own task, so a caller giving up on its wait never aborts the fetch
//! other callers are waiting on.
//!
//! The table lock is a plain `std::sync::Mutex` and is never held across an
//! `.await`.

use std::future::Future;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use lru::LruCache;
use tracing::{debug, warn};

use crate::error::{SearchError, SearchResult};

pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

type SharedFetch<V> = Shared<BoxFuture<'static, SearchResult<V>>>;

enum Slot<V> {
    Pending { fetch_id: u64, fetch: SharedFetch<V> },
    Ready { value: V, cached_at: Instant },
}

enum Lookup<V> {
    Hit(V),
    InFlight(SharedFetch<V>),
    Absent,
}

#[derive(Debug, Clone, Copy)]
pub struct CacheSettings {
    pub capacity: NonZeroUsize,
    /// Ready entries older than this are treated as absent
    pub ttl: Option<Duration>,
}

impl CacheSettings {
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            capacity: NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            ttl,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, None)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub total_requests: u64,
    pub cache_hits: u64,
    /// Requests that joined a fetch already in flight
    pub coalesced: u64,
    pub evictions: u64,
    pub hit_rate_percent: f64,
}

struct Table<K: Hash + Eq, V> {
    /// Unbounded so that only `make_room` decides what leaves the table
    entries: LruCache<K, Slot<V>>,
    capacity: NonZeroUsize,
    /// Successful values failing this are handed to waiters but not stored
    retain: fn(&V) -> bool,
    total_requests: u64,
    cache_hits: u64,
    coalesced: u64,
    evictions: u64,
}

impl<K: Hash + Eq + Clone, V: Clone> Table<K, V> {
    fn lookup(&mut self, key: &K, ttl: Option<Duration>) -> Lookup<V> {
        let expired = match self.entries.get(key) {
            Some(Slot::Ready { value, cached_at }) => {
                if ttl.is_some_and(|ttl| cached_at.elapsed() >= ttl) {
                    true
                } else {
                    return Lookup::Hit(value.clone());
                }
            }
            Some(Slot::Pending { fetch, .. }) => return Lookup::InFlight(fetch.clone()),
            None => return Lookup::Absent,
        };

        if expired {
            self.entries.pop(key);
        }
        Lookup::Absent
    }

    /// Evict least recently used `Ready` entries until `incoming` more fit.
    /// `Pending` entries are never evicted, so the table may briefly exceed
    /// capacity while every slot has a fetch in flight.
    fn make_room(&mut self, incoming: usize) {
        while self.entries.len() + incoming > self.capacity.get() {
            let victim = self
                .entries
                .iter()
                .rev()
                .find_map(|(key, slot)| matches!(slot, Slot::Ready { .. }).then(|| key.clone()));

            let Some(victim) = victim else {
                debug!("Cache over capacity with every entry in flight");
                return;
            };
            self.entries.pop(&victim);
            self.evictions += 1;
            debug!("Cache full, evicted least recently used entry");
        }
    }

    fn owns(&self, key: &K, fetch_id: u64) -> bool {
        matches!(self.entries.peek(key), Some(Slot::Pending { fetch_id: id, .. }) if *id == fetch_id)
    }
}

pub struct SingleFlightCache<K: Hash + Eq, V> {
    table: Arc<Mutex<Table<K, V>>>,
    ttl: Option<Duration>,
    next_fetch_id: AtomicU64,
}

impl<K, V> SingleFlightCache<K, V>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            table: Arc::new(Mutex::new(Table {
                entries: LruCache::unbounded(),
                capacity: settings.capacity,
                retain: |_| true,
                total_requests: 0,
                cache_hits: 0,
                coalesced: 0,
                evictions: 0,
            })),
            ttl: settings.ttl,
            next_fetch_id: AtomicU64::new(0),
        }
    }

    /// Only store successful values for which `retain` holds. Others still
    /// reach every waiter of their fetch, and the next call fetches again.
    pub fn with_retain(self, retain: fn(&V) -> bool) -> Self {
        lock(&self.table).retain = retain;
        self
    }

    /// Return the cached value for `key`, join the fetch already running for
    /// it, or start `fetch` as the single fetch for it.
    ///
    /// Must be called from within a Tokio runtime. A failed fetch is not
    /// cached; the next call for the key starts a fresh one.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> SearchResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SearchResult<V>> + Send + 'static,
    {
        let in_flight = {
            let mut table = lock(&self.table);
            table.total_requests += 1;

            match table.lookup(&key, self.ttl) {
                Lookup::Hit(value) => {
                    table.cache_hits += 1;
                    debug!("Cache hit");
                    return Ok(value);
                }
                Lookup::InFlight(fetch) => {
                    table.coalesced += 1;
                    debug!("Cache pending, joining in-flight fetch");
                    fetch
                }
                Lookup::Absent => {
                    debug!("Cache miss, starting fetch");
                    let fetch_id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
                    let shared = self.spawn_fetch(key.clone(), fetch_id, fetch());

                    table.make_room(1);
                    table.entries.put(
                        key,
                        Slot::Pending {
                            fetch_id,
                            fetch: shared.clone(),
                        },
                    );
                    shared
                }
            }
        };

        in_flight.await
    }

    fn spawn_fetch<Fut>(&self, key: K, fetch_id: u64, fetch: Fut) -> SharedFetch<V>
    where
        Fut: Future<Output = SearchResult<V>> + Send + 'static,
    {
        let table = Arc::clone(&self.table);
        let task = tokio::spawn({
            let table = Arc::clone(&table);
            let key = key.clone();
            async move {
                let result = fetch.await;
                complete(&table, &key, fetch_id, &result);
                result
            }
        });

        task.map(move |joined| {
            joined.unwrap_or_else(|e| {
                warn!("Cache fetch task failed: {}", e);
                let failure = Err(SearchError::TaskFailed {
                    reason: e.to_string(),
                });
                complete(&table, &key, fetch_id, &failure);
                failure
            })
        })
        .boxed()
        .shared()
    }

    /// True when `key` holds a completed, unexpired value.
    pub fn contains(&self, key: &K) -> bool {
        let table = lock(&self.table);
        match table.entries.peek(key) {
            Some(Slot::Ready { cached_at, .. }) => {
                !self.ttl.is_some_and(|ttl| cached_at.elapsed() >= ttl)
            }
            _ => false,
        }
    }

    /// True when a fetch for `key` is in flight.
    pub fn is_pending(&self, key: &K) -> bool {
        matches!(lock(&self.table).entries.peek(key), Some(Slot::Pending { .. }))
    }

    pub fn len(&self) -> usize {
        lock(&self.table).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry. Fetches in flight still complete for their waiters
    /// but are not stored.
    pub fn clear(&self) {
        lock(&self.table).entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let table = lock(&self.table);
        let hit_rate_percent = if table.total_requests > 0 {
            (table.cache_hits as f64 / table.total_requests as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            total_entries: table.entries.len(),
            total_requests: table.total_requests,
            cache_hits: table.cache_hits,
            coalesced: table.coalesced,
            evictions: table.evictions,
            hit_rate_percent,
        }
    }
}

/// Pending -> Ready on success, Pending -> removed on failure. Only the
/// fetch that installed the entry may transition it.
fn complete<K, V>(table: &Mutex<Table<K, V>>, key: &K, fetch_id: u64, result: &SearchResult<V>)
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    let mut table = lock(table);
    if !table.owns(key, fetch_id) {
        return;
    }

    match result {
        Ok(value) if !(table.retain)(value) => {
            debug!("Fetched value not retained, dropping pending entry");
            table.entries.pop(key);
        }
        Ok(value) => {
            if let Some(slot) = table.entries.peek_mut(key) {
                *slot = Slot::Ready {
                    value: value.clone(),
                    cached_at: Instant::now(),
                };
            }
            // Shrink back if the table grew while every slot was in flight
            table.make_room(0);
        }
        Err(e) => {
            debug!("Fetch failed, dropping pending entry: {}", e);
            table.entries.pop(key);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn cache(capacity: usize) -> SingleFlightCache<String, u32> {
        SingleFlightCache::new(CacheSettings::new(capacity, None))
    }

    async fn never_called() -> SearchResult<u32> {
        panic!("fetch must not run for a cached or in-flight key")
    }

    async fn exploding() -> SearchResult<u32> {
        panic!("fetch exploded")
    }

    async fn failing() -> SearchResult<u32> {
        Err(SearchError::Transport {
            reason: "boom".to_string(),
        })
    }

    async fn fill(cache: &SingleFlightCache<String, u32>, key: &str, value: u32) -> u32 {
        cache
            .get_or_fetch(key.to_string(), move || async move { Ok(value) })
            .await
            .unwrap()
    }

    /// Start a fetch for `key` that counts into `calls` and holds until `gate` opens.
    fn gated(
        cache: &Arc<SingleFlightCache<String, u32>>,
        key: &str,
        calls: &Arc<AtomicUsize>,
        gate: &tokio::sync::watch::Receiver<bool>,
        value: u32,
    ) -> tokio::task::JoinHandle<SearchResult<u32>> {
        let cache = Arc::clone(cache);
        let calls = Arc::clone(calls);
        let gate = gate.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            cache
                .get_or_fetch(key, move || async move {
                    let mut gate = gate;
                    calls.fetch_add(1, Ordering::SeqCst);
                    let _ = gate.wait_for(|open| *open).await;
                    Ok(value)
                })
                .await
        })
    }

    #[tokio::test]
    async fn test_ready_value_is_served_without_fetch() {
        let cache = cache(4);
        assert_eq!(fill(&cache, "a", 1).await, 1);

        let value = cache
            .get_or_fetch("a".to_string(), never_called)
            .await
            .unwrap();

        assert_eq!(value, 1);
        let stats = cache.stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.hit_rate_percent, 50.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_fetch() {
        let cache = Arc::new(cache(4));
        let calls = Arc::new(AtomicUsize::new(0));
        let (release, gate) = tokio::sync::watch::channel(false);

        let mut waiters = Vec::new();
        for _ in 0..16 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            let gate = gate.clone();
            waiters.push(tokio::spawn(async move {
                cache
                    .get_or_fetch("key".to_string(), move || async move {
                        let mut gate = gate;
                        calls.fetch_add(1, Ordering::SeqCst);
                        let _ = gate.wait_for(|open| *open).await;
                        Ok(7)
                    })
                    .await
            }));
        }

        // Every waiter has registered before the fetch is allowed to finish
        while cache.stats().total_requests < 16 {
            tokio::task::yield_now().await;
        }
        release.send(true).unwrap();

        for waiter in waiters {
            assert_eq!(waiter.await.unwrap().unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().coalesced, 15);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = cache(4);

        let err = cache
            .get_or_fetch("a".to_string(), failing)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Transport { .. }));
        assert!(!cache.is_pending(&"a".to_string()));
        assert!(cache.is_empty());

        assert_eq!(fill(&cache, "a", 2).await, 2);
        assert!(cache.contains(&"a".to_string()));
    }

    #[tokio::test]
    async fn test_panicking_fetch_does_not_wedge_key() {
        let cache = cache(4);

        let err = cache
            .get_or_fetch("a".to_string(), exploding)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::TaskFailed { .. }));
        assert!(!cache.is_pending(&"a".to_string()));

        assert_eq!(fill(&cache, "a", 3).await, 3);
    }

    #[tokio::test]
    async fn test_least_recently_used_entry_is_evicted() {
        let cache = cache(2);
        fill(&cache, "a", 1).await;
        fill(&cache, "b", 2).await;

        // Touch "a" so "b" becomes least recently used
        fill(&cache, "a", 1).await;
        fill(&cache, "c", 3).await;

        assert!(cache.contains(&"a".to_string()));
        assert!(!cache.contains(&"b".to_string()));
        assert!(cache.contains(&"c".to_string()));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test]
    async fn test_expired_entries_are_refetched() {
        let cache: SingleFlightCache<String, u32> =
            SingleFlightCache::new(CacheSettings::new(4, Some(Duration::from_millis(20))));
        fill(&cache, "a", 1).await;
        assert!(cache.contains(&"a".to_string()));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(!cache.contains(&"a".to_string()));

        assert_eq!(fill(&cache, "a", 2).await, 2);
    }

    #[tokio::test]
    async fn test_cancelled_initiator_does_not_cancel_fetch() {
        let cache = Arc::new(cache(4));
        let (release, gate) = tokio::sync::oneshot::channel::<()>();

        let initiator = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move {
                cache
                    .get_or_fetch("a".to_string(), move || async move {
                        let _ = gate.await;
                        Ok(9)
                    })
                    .await
            }
        });

        while !cache.is_pending(&"a".to_string()) {
            tokio::task::yield_now().await;
        }
        initiator.abort();
        let _ = initiator.await;

        release.send(()).unwrap();
        let value = cache
            .get_or_fetch("a".to_string(), never_called)
            .await
            .unwrap();
        assert_eq!(value, 9);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_full_table_never_evicts_in_flight_fetch() {
        let cache = Arc::new(cache(1));
        let calls_a = Arc::new(AtomicUsize::new(0));
        let calls_b = Arc::new(AtomicUsize::new(0));
        let (release, gate) = tokio::sync::watch::channel(false);

        let first_a = gated(&cache, "a", &calls_a, &gate, 1);
        while !cache.is_pending(&"a".to_string()) {
            tokio::task::yield_now().await;
        }

        let b = gated(&cache, "b", &calls_b, &gate, 2);
        while !cache.is_pending(&"b".to_string()) {
            tokio::task::yield_now().await;
        }
        assert!(cache.is_pending(&"a".to_string()));

        let second_a = gated(&cache, "a", &calls_a, &gate, 1);
        while cache.stats().total_requests < 3 {
            tokio::task::yield_now().await;
        }
        release.send(true).unwrap();

        assert_eq!(first_a.await.unwrap().unwrap(), 1);
        assert_eq!(second_a.await.unwrap().unwrap(), 1);
        assert_eq!(b.await.unwrap().unwrap(), 2);
        assert_eq!(calls_a.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().coalesced, 1);

        // Back within capacity once nothing is in flight
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_values_failing_retain_are_not_stored() {
        let cache = cache(4).with_retain(|value| *value != 0);

        assert_eq!(fill(&cache, "a", 0).await, 0);
        assert!(!cache.contains(&"a".to_string()));
        assert!(cache.is_empty());

        assert_eq!(fill(&cache, "a", 5).await, 5);
        assert!(cache.contains(&"a".to_string()));
    }

    #[tokio::test]
    async fn test_clear_empties_table() {
        let cache = cache(4);
        fill(&cache, "a", 1).await;
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.stats().total_entries, 0);
    }
}
