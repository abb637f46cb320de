//! Whole-page cache for the index listing.
//!
//! Rendered output is cached process-wide per request path+query for a
//! fixed interval. There is no per-entity invalidation: a cached page keeps
//! serving until its entry expires or [`PageCache::clear`] wipes the cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Cached page body.
#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    stored_at: Instant,
}

/// Process-wide page cache with a fixed TTL.
#[derive(Clone)]
pub struct PageCache {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl PageCache {
    /// Create a new page cache.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get a cached page if present and still fresh.
    pub async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;

        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }

        Some(entry.body.clone())
    }

    /// Store a rendered page.
    pub async fn put(&self, key: String, body: String) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                body,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every cached page.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }
}
