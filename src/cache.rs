use crate::models::{CacheEntry, DataSource, ProductRecord};
use crate::storage::KeyValueStore;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

const CACHE_KEY_PREFIX: &str = "product:code:";
const RECENT_SCANS_KEY: &str = "recent_scans";
const CACHE_TTL_DAYS: i64 = 7;
const MAX_RECENT_SCANS: usize = 20;

fn product_cache_key(barcode: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, barcode)
}

/// Durable product-lookup cache with a 7-day TTL plus a bounded,
/// most-recent-first scan history. Every operation is best-effort: storage
/// failures are logged and degrade to a miss or no-op.
pub struct ProductCache {
    store: Arc<dyn KeyValueStore>,
}

impl ProductCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn put(&self, barcode: &str, record: ProductRecord, source: DataSource, trust_score: u8) {
        self.put_at(barcode, record, source, trust_score, Utc::now());
    }

    fn put_at(
        &self,
        barcode: &str,
        record: ProductRecord,
        source: DataSource,
        trust_score: u8,
        now: DateTime<Utc>,
    ) {
        let entry = CacheEntry {
            timestamp: now,
            data: record,
            source,
            trust_score,
        };
        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                warn!(code = %barcode, "Failed to serialize cache entry: {}", e);
                return;
            }
        };
        let key = product_cache_key(barcode);
        if let Err(e) = self.store.set(&key, &json) {
            warn!(code = %barcode, key = %key, "Failed to write cache entry: {}", e);
            return;
        }
        debug!(code = %barcode, key = %key, "Cached product lookup");
        self.push_recent(barcode);
    }

    pub fn get(&self, barcode: &str) -> Option<CacheEntry> {
        self.get_at(barcode, Utc::now())
    }

    fn get_at(&self, barcode: &str, now: DateTime<Utc>) -> Option<CacheEntry> {
        let key = product_cache_key(barcode);
        let json = match self.store.get(&key) {
            Ok(Some(json)) => json,
            Ok(None) => {
                debug!(code = %barcode, "Cache miss for product barcode");
                return None;
            }
            Err(e) => {
                warn!(code = %barcode, "Cache read failed: {}. Treating as miss.", e);
                return None;
            }
        };
        let entry: CacheEntry = match serde_json::from_str(&json) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(code = %barcode, "Failed to deserialize cache entry: {}. Removing.", e);
                let _ = self.store.remove(&key);
                return None;
            }
        };
        if now - entry.timestamp > Duration::days(CACHE_TTL_DAYS) {
            info!(code = %barcode, "Cache entry expired, removing");
            if let Err(e) = self.store.remove(&key) {
                warn!(code = %barcode, "Failed to remove stale cache entry: {}", e);
            }
            return None;
        }
        debug!(code = %barcode, "Cache hit for product barcode");
        Some(entry)
    }

    /// Recently scanned barcodes, most-recent-first, deduplicated, at most
    /// twenty entries.
    pub fn recent_scans(&self) -> Vec<String> {
        match self.store.get(RECENT_SCANS_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!("Failed to parse recent scans list: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read recent scans list: {}", e);
                Vec::new()
            }
        }
    }

    fn push_recent(&self, barcode: &str) {
        let mut scans = self.recent_scans();
        scans.retain(|code| code != barcode);
        scans.insert(0, barcode.to_string());
        scans.truncate(MAX_RECENT_SCANS);
        match serde_json::to_string(&scans) {
            Ok(json) => {
                if let Err(e) = self.store.set(RECENT_SCANS_KEY, &json) {
                    warn!("Failed to persist recent scans list: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize recent scans list: {}", e),
        }
    }

    /// Removes all cached product entries and the scan history.
    pub fn clear(&self) {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Failed to enumerate storage keys for clear: {}", e);
                return;
            }
        };
        for key in keys {
            if key.starts_with(CACHE_KEY_PREFIX) {
                if let Err(e) = self.store.remove(&key) {
                    warn!(key = %key, "Failed to remove cache entry: {}", e);
                }
            }
        }
        if let Err(e) = self.store.remove(RECENT_SCANS_KEY) {
            warn!("Failed to remove recent scans list: {}", e);
        }
        info!("Product cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn cache() -> ProductCache {
        ProductCache::new(Arc::new(MemoryStore::new()))
    }

    fn record(name: &str) -> ProductRecord {
        ProductRecord {
            product_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn put_then_get_returns_the_same_entry() {
        let cache = cache();
        cache.put("4000417025005", record("Chocolate"), DataSource::Primary, 87);
        let entry = cache.get("4000417025005").expect("entry should be cached");
        assert_eq!(entry.data.product_name.as_deref(), Some("Chocolate"));
        assert_eq!(entry.source, DataSource::Primary);
        assert_eq!(entry.trust_score, 87);
    }

    #[test]
    fn entries_expire_after_seven_days() {
        let cache = cache();
        let written = Utc::now();
        cache.put_at("123", record("Old"), DataSource::Primary, 70, written);

        let just_inside = written + Duration::days(7);
        assert!(cache.get_at("123", just_inside).is_some());

        let just_outside = written + Duration::days(7) + Duration::seconds(1);
        assert!(cache.get_at("123", just_outside).is_none());
        // Stale entry was removed as a side effect.
        assert!(cache.get_at("123", written).is_none());
    }

    #[test]
    fn rescanning_moves_a_barcode_to_the_front_without_duplicates() {
        let cache = cache();
        cache.put("111", record("a"), DataSource::Primary, 70);
        cache.put("222", record("b"), DataSource::Primary, 70);
        cache.put("111", record("a"), DataSource::Primary, 70);
        assert_eq!(cache.recent_scans(), vec!["111", "222"]);
    }

    #[test]
    fn recent_scans_are_bounded_at_twenty() {
        let cache = cache();
        for i in 0..25 {
            cache.put(&format!("{:013}", i), record("x"), DataSource::Primary, 70);
        }
        let scans = cache.recent_scans();
        assert_eq!(scans.len(), 20);
        assert_eq!(scans[0], format!("{:013}", 24));
        // Oldest entries were evicted from the tail.
        assert!(!scans.contains(&format!("{:013}", 0)));
    }

    #[test]
    fn corrupt_entry_degrades_to_a_miss() {
        let store = Arc::new(MemoryStore::new());
        store.set("product:code:999", "not-json").unwrap();
        let cache = ProductCache::new(store);
        assert!(cache.get("999").is_none());
    }

    #[test]
    fn clear_removes_entries_and_history() {
        let store = Arc::new(MemoryStore::new());
        store.set("unrelated", "keep-me").unwrap();
        let cache = ProductCache::new(store.clone());
        cache.put("111", record("a"), DataSource::Primary, 70);
        cache.put("222", record("b"), DataSource::Community, 40);
        cache.clear();
        assert!(cache.get("111").is_none());
        assert!(cache.get("222").is_none());
        assert!(cache.recent_scans().is_empty());
        // Keys outside the cache prefix are untouched.
        assert_eq!(store.get("unrelated").unwrap().as_deref(), Some("keep-me"));
    }
}
