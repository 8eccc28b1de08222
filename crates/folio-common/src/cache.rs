//! TTL cache used for per-session lookups.
//!
//! Wraps mini-moka-wasm's sync cache, which works on native and WASM targets.
//! The cache is an owned value: whoever creates it decides its lifetime and
//! when it is cleared. There is no process-wide instance.

use std::hash::Hash;
use std::time::Duration;

pub struct TtlCache<K, V> {
    inner: mini_moka_wasm::sync::Cache<K, V>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a new cache with the given capacity and TTL.
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: mini_moka_wasm::sync::Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key)
    }

    pub fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get() {
        let cache = TtlCache::<String, String>::new(16, Duration::from_secs(60));
        cache.insert("key".to_string(), "value".to_string());
        assert_eq!(cache.get(&"key".to_string()), Some("value".to_string()));
        assert_eq!(cache.get(&"missing".to_string()), None);
    }

    #[test]
    fn clear_forgets_entries() {
        let cache = TtlCache::<u32, u32>::new(16, Duration::from_secs(60));
        cache.insert(1, 10);
        cache.clear();
        assert_eq!(cache.get(&1), None);
    }
}
