//! Keyed query cache with a freshness window and explicit invalidation.
//!
//! An entry is served only while it is younger than the cache's freshness
//! window and has not been invalidated. Invalidation marks entries stale
//! instead of dropping them, so callers can still tell whether a key was
//! ever fetched.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

struct Entry<V> {
    value: V,
    fetched_at: Instant,
    invalidated: bool,
}

struct Entries<K, V> {
    map: HashMap<K, Entry<V>>,
    /// Bumped by every invalidation.
    generation: u64,
}

/// Cache for one family of queries (e.g. due words keyed by limit).
pub struct QueryCache<K, V> {
    fresh_for: Duration,
    entries: Mutex<Entries<K, V>>,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(fresh_for: Duration) -> Self {
        Self {
            fresh_for,
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                generation: 0,
            }),
        }
    }

    /// The freshness window of this cache.
    pub fn fresh_for(&self) -> Duration {
        self.fresh_for
    }

    /// Return the cached value if it is still fresh.
    pub fn get_fresh(&self, key: &K) -> Option<V> {
        let entries = self.lock();
        let entry = entries.map.get(key)?;
        if self.entry_is_fresh(entry) {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Current invalidation generation. Read it before starting a fetch and
    /// hand it to [`QueryCache::insert_fetched`].
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Store a freshly fetched value, clearing any invalidation.
    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.lock();
        let generation = entries.generation;
        Self::store(&mut entries, key, value, generation);
    }

    /// Store a value fetched since `generation`.
    ///
    /// If an invalidation happened while the fetch was in flight the value is
    /// kept but marked stale, so the next read goes back to the network.
    /// Returns `true` if the value was stored fresh.
    pub fn insert_fetched(&self, key: K, value: V, generation: u64) -> bool {
        let mut entries = self.lock();
        Self::store(&mut entries, key, value, generation)
    }

    /// Mark one key stale. Returns `true` if the key was cached.
    pub fn invalidate(&self, key: &K) -> bool {
        let mut entries = self.lock();
        entries.generation += 1;
        match entries.map.get_mut(key) {
            Some(entry) => {
                entry.invalidated = true;
                true
            }
            None => false,
        }
    }

    /// Mark every key stale. Returns the number of entries touched.
    pub fn invalidate_all(&self) -> usize {
        let mut entries = self.lock();
        entries.generation += 1;
        for entry in entries.map.values_mut() {
            entry.invalidated = true;
        }
        entries.map.len()
    }

    /// `true` if the next read of `key` has to go to the network.
    pub fn is_stale(&self, key: &K) -> bool {
        self.lock()
            .map
            .get(key)
            .map(|entry| !self.entry_is_fresh(entry))
            .unwrap_or(true)
    }

    /// `true` if `key` has been fetched at least once.
    pub fn contains(&self, key: &K) -> bool {
        self.lock().map.contains_key(key)
    }

    fn store(entries: &mut Entries<K, V>, key: K, value: V, generation: u64) -> bool {
        let fresh = generation == entries.generation;
        entries.map.insert(
            key,
            Entry {
                value,
                fetched_at: Instant::now(),
                invalidated: !fresh,
            },
        );
        fresh
    }

    fn entry_is_fresh(&self, entry: &Entry<V>) -> bool {
        !entry.invalidated && entry.fetched_at.elapsed() < self.fresh_for
    }

    fn lock(&self) -> MutexGuard<'_, Entries<K, V>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fresh_until_window_elapses() {
        let cache: QueryCache<u32, &str> = QueryCache::new(Duration::from_secs(30));
        assert!(cache.is_stale(&20));

        cache.insert(20, "words");
        assert_eq!(cache.get_fresh(&20), Some("words"));

        tokio::time::advance(Duration::from_secs(29)).await;
        assert_eq!(cache.get_fresh(&20), Some("words"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get_fresh(&20), None);
        assert!(cache.is_stale(&20));
        assert!(cache.contains(&20));
    }

    #[tokio::test(start_paused = true)]
    async fn invalidation_forces_refetch() {
        let cache: QueryCache<u32, u32> = QueryCache::new(Duration::from_secs(60));
        cache.insert(10, 1);
        cache.insert(20, 2);

        assert!(cache.invalidate(&10));
        assert!(cache.is_stale(&10));
        assert!(!cache.is_stale(&20));
        assert!(!cache.invalidate(&99));

        assert_eq!(cache.invalidate_all(), 2);
        assert!(cache.is_stale(&20));

        cache.insert(20, 3);
        assert_eq!(cache.get_fresh(&20), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_overtaken_by_invalidation_lands_stale() {
        let cache: QueryCache<u32, &str> = QueryCache::new(Duration::from_secs(30));
        cache.insert(20, "old");

        let generation = cache.generation();
        cache.invalidate_all();
        assert!(!cache.insert_fetched(20, "fetched before the write", generation));
        assert!(cache.is_stale(&20));
        assert!(cache.contains(&20));

        let generation = cache.generation();
        assert!(cache.insert_fetched(20, "fetched after the write", generation));
        assert_eq!(cache.get_fresh(&20), Some("fetched after the write"));

        // Invalidating a key that was never cached still overtakes its fetch.
        let generation = cache.generation();
        assert!(!cache.invalidate(&5));
        assert!(!cache.insert_fetched(5, "late", generation));
        assert!(cache.is_stale(&5));
    }
}
