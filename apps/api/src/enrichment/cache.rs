use std::sync::Mutex;

use lru::LruCache;

/// Bounded in-memory cache for AI results.
///
/// Once an insert pushes the size past `capacity`, the least recently used
/// entries are dropped until only `capacity / 2` remain. The lock is never
/// held across an `.await`.
pub struct BoundedCache {
    entries: Mutex<LruCache<String, String>>,
    capacity: usize,
}

impl BoundedCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(LruCache::unbounded()),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.get(key).cloned()
    }

    pub fn insert(&self, key: String, value: String) {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.put(key, value);
        if entries.len() > self.capacity {
            let keep = self.capacity / 2;
            while entries.len() > keep {
                entries.pop_lru();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_inserted_value() {
        let cache = BoundedCache::new(4);
        cache.insert("react,sql".into(), "summary".into());
        assert_eq!(cache.get("react,sql").as_deref(), Some("summary"));
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let cache = BoundedCache::new(10);
        for i in 0..95 {
            cache.insert(format!("k{i}"), format!("v{i}"));
            assert!(cache.len() <= cache.capacity());
        }
    }

    #[test]
    fn test_overflow_keeps_most_recent_half() {
        let cache = BoundedCache::new(10);
        for i in 0..11 {
            cache.insert(format!("k{i}"), format!("v{i}"));
        }
        assert_eq!(cache.len(), 5);
        for i in 0..6 {
            assert!(cache.get(&format!("k{i}")).is_none(), "k{i} should be evicted");
        }
        for i in 6..11 {
            assert_eq!(cache.get(&format!("k{i}")), Some(format!("v{i}")));
        }
    }

    #[test]
    fn test_reads_refresh_recency() {
        let cache = BoundedCache::new(4);
        for i in 0..4 {
            cache.insert(format!("k{i}"), "v".into());
        }
        // Touch the oldest entry so it survives the next eviction.
        assert!(cache.get("k0").is_some());
        cache.insert("k4".into(), "v".into());
        assert_eq!(cache.len(), 2);
        assert!(cache.get("k0").is_some());
        assert!(cache.get("k4").is_some());
    }

    #[test]
    fn test_overwrite_does_not_grow() {
        let cache = BoundedCache::new(2);
        cache.insert("a".into(), "1".into());
        cache.insert("a".into(), "2".into());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").as_deref(), Some("2"));
    }
}
