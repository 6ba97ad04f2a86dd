use std::hash::Hash;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Concurrent map whose entries expire `ttl` after insertion.
pub struct TtlCache<K, V> {
    entries: DashMap<K, (Instant, V)>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Returns a clone of a live entry. Expired entries are removed on access.
    pub fn get(&self, key: &K) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.0.elapsed() < self.ttl => return Some(entry.1.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries
                .remove_if(key, |_, (inserted, _)| inserted.elapsed() >= self.ttl);
        }
        None
    }

    /// Stores `value` and evicts whatever else has expired, so keys that are
    /// never read again do not accumulate.
    pub fn insert(&self, key: K, value: V) {
        self.purge_expired();
        self.entries.insert(key, (Instant::now(), value));
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, (inserted, _)| inserted.elapsed() < self.ttl);
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a".to_string(), 1);
        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert_eq!(cache.get(&"b".to_string()), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert("a", 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let cache = TtlCache::new(Duration::from_millis(20));
        cache.insert(1, "old");
        cache.insert(2, "older");
        std::thread::sleep(Duration::from_millis(40));

        assert_eq!(cache.purge_expired(), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.purge_expired(), 0);
    }

    #[test]
    fn test_insert_evicts_stale_entries() {
        let cache = TtlCache::new(Duration::from_millis(20));
        for key in 0..5 {
            cache.insert(key, "stale");
        }
        std::thread::sleep(Duration::from_millis(40));
        cache.insert(99, "fresh");

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&99), Some("fresh"));
    }
}
