//! Rendered image cache keyed by job identifier.
//!
//! A plain unordered map: no eviction policy, no TTL, no size limit. Growth is
//! controlled per job through the `cache_result` / `ignore_cache` flags, and
//! every entry goes away with the renderer.

use dashmap::DashMap;

use crate::metrics::CacheMetrics;
use crate::surface::RenderedImage;

/// In-memory result cache
pub struct ResultCache {
    entries: DashMap<String, RenderedImage>,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Look up a previously rendered image
    pub fn get(&self, key: &str) -> Option<RenderedImage> {
        let hit = self.entries.get(key).map(|entry| entry.value().clone());
        match hit {
            Some(_) => CacheMetrics::record_hit(),
            None => CacheMetrics::record_miss(),
        }
        hit
    }

    /// Store an image, overwriting any entry with the same key
    pub fn put(&self, key: impl Into<String>, image: RenderedImage) {
        if self.entries.insert(key.into(), image).is_none() {
            CacheMetrics::entry_added();
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&self) {
        let removed = self.entries.len();
        self.entries.clear();
        CacheMetrics::entries_removed(removed);

        if removed > 0 {
            tracing::debug!(removed = removed, "Result cache cleared");
        }
    }
}

impl Drop for ResultCache {
    fn drop(&mut self) {
        CacheMetrics::entries_removed(self.entries.len());
    }
}
