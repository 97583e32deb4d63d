//! Render caching keyed by content hash.
//!
//! Highlighting makes rendering far more expensive than reading a file, so
//! rendered HTML is cached by the BLAKE3 hash of its markdown source. A file
//! that changes on disk hashes differently and misses naturally; the cache
//! never needs explicit invalidation on edits.
//!
//! ## Features
//!
//! - Thread-safe access via `Arc<RwLock<>>`
//! - Time-based expiration with configurable max age
//! - Bounded capacity, evicting the oldest insertion first
//!
//! ## Example
//!
//! ```rust,ignore
//! use quire_store::cache::RenderCache;
//!
//! let cache = RenderCache::new();
//! let html = cache.get_or_render(entry.hash, &entry.source, &renderer);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use quire_core::ContentHash;
use quire_render::MarkdownRenderer;

/// Default maximum number of cached documents.
pub const DEFAULT_CAPACITY: usize = 256;

/// Default maximum cache age in seconds (10 minutes).
pub const DEFAULT_MAX_AGE_SECS: u64 = 600;

/// Configuration for cache behavior.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// Maximum number of cached documents.
    pub capacity: usize,
    /// Entries at least this old are expired.
    pub max_age: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_age: Duration::from_secs(DEFAULT_MAX_AGE_SECS),
        }
    }
}

impl CacheConfig {
    /// Creates a new configuration with custom settings.
    pub fn new(capacity: usize, max_age: Duration) -> Self {
        Self { capacity, max_age }
    }
}

/// Status of a cached render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    Expired,
}

/// A cached render with metadata.
#[derive(Debug, Clone)]
pub struct CachedRender {
    /// Rendered HTML.
    pub html: Arc<str>,
    /// When the render was cached.
    pub cached_at: Instant,
    /// Insertion order, used for eviction.
    seq: u64,
}

impl CachedRender {
    /// Determines the status of this cache entry.
    pub fn status(&self, config: &CacheConfig) -> CacheStatus {
        if self.cached_at.elapsed() >= config.max_age {
            CacheStatus::Expired
        } else {
            CacheStatus::Fresh
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<ContentHash, CachedRender>,
    next_seq: u64,
}

/// Thread-safe render cache.
#[derive(Debug, Clone)]
pub struct RenderCache {
    inner: Arc<RwLock<Inner>>,
    config: CacheConfig,
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderCache {
    /// Creates a new render cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a render cache with custom configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            config,
        }
    }

    /// Returns the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Gets cached HTML for a source hash.
    ///
    /// Returns `None` if not cached or expired.
    pub fn get(&self, hash: &ContentHash) -> Option<Arc<str>> {
        let inner = self.inner.read().ok()?;
        let entry = inner.entries.get(hash)?;

        if entry.status(&self.config) == CacheStatus::Expired {
            return None;
        }

        Some(Arc::clone(&entry.html))
    }

    /// Stores rendered HTML, evicting the oldest entries past capacity.
    pub fn insert(&self, hash: ContentHash, html: Arc<str>) {
        if self.config.capacity == 0 {
            return;
        }
        let Ok(mut inner) = self.inner.write() else {
            return;
        };

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(
            hash,
            CachedRender {
                html,
                cached_at: Instant::now(),
                seq,
            },
        );

        while inner.entries.len() > self.config.capacity {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.seq)
                .map(|(hash, _)| *hash);
            match oldest {
                Some(hash) => {
                    inner.entries.remove(&hash);
                }
                None => break,
            }
        }
    }

    /// Returns cached HTML, rendering and caching on a miss.
    ///
    /// Rendering happens outside the lock; two concurrent misses for the
    /// same source both render and the later insert wins.
    pub fn get_or_render(
        &self,
        hash: ContentHash,
        source: &str,
        renderer: &MarkdownRenderer,
    ) -> Arc<str> {
        if let Some(html) = self.get(&hash) {
            tracing::trace!(hash = %hash, "Render cache hit");
            return html;
        }

        tracing::debug!(hash = %hash, bytes = source.len(), "Render cache miss");
        let html: Arc<str> = Arc::from(renderer.render(source));
        self.insert(hash, Arc::clone(&html));
        html
    }

    /// Removes a cached render.
    pub fn invalidate(&self, hash: &ContentHash) -> bool {
        if let Ok(mut inner) = self.inner.write() {
            return inner.entries.remove(hash).is_some();
        }
        false
    }

    /// Clears all cached entries.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.entries.clear();
        }
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.read().map(|c| c.entries.len()).unwrap_or(0)
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn evict_expired(&self) -> usize {
        if let Ok(mut inner) = self.inner.write() {
            let before = inner.entries.len();
            inner
                .entries
                .retain(|_, entry| entry.status(&self.config) == CacheStatus::Fresh);
            before - inner.entries.len()
        } else {
            0
        }
    }

    /// Returns statistics about the cache.
    pub fn stats(&self) -> CacheStats {
        let Ok(inner) = self.inner.read() else {
            return CacheStats::default();
        };

        let total = inner.entries.len();
        let expired = inner
            .entries
            .values()
            .filter(|entry| entry.status(&self.config) == CacheStatus::Expired)
            .count();

        CacheStats {
            total,
            fresh: total - expired,
            expired,
        }
    }
}

/// Statistics about cache state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total: usize,
    pub fresh: usize,
    pub expired: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(s: &str) -> ContentHash {
        ContentHash::compute(s.as_bytes())
    }

    #[test]
    fn cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert_eq!(config.max_age, Duration::from_secs(DEFAULT_MAX_AGE_SECS));
    }

    #[test]
    fn insert_and_get() {
        let cache = RenderCache::new();
        cache.insert(hash("a"), Arc::from("<p>a</p>"));
        assert_eq!(cache.get(&hash("a")).as_deref(), Some("<p>a</p>"));
        assert!(cache.get(&hash("b")).is_none());
    }

    #[test]
    fn get_or_render_caches() {
        let renderer = MarkdownRenderer::new();
        let cache = RenderCache::new();
        let source = "# Cached\n";

        let first = cache.get_or_render(hash(source), source, &renderer);
        assert!(first.contains("<h1>Cached</h1>"));
        assert_eq!(cache.len(), 1);

        let second = cache.get_or_render(hash(source), source, &renderer);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn changed_source_misses() {
        let renderer = MarkdownRenderer::new();
        let cache = RenderCache::new();

        let v1 = cache.get_or_render(hash("# One"), "# One", &renderer);
        let v2 = cache.get_or_render(hash("# Two"), "# Two", &renderer);
        assert_ne!(v1, v2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let cache = RenderCache::with_config(CacheConfig::new(2, Duration::from_secs(60)));
        cache.insert(hash("1"), Arc::from("1"));
        cache.insert(hash("2"), Arc::from("2"));
        cache.insert(hash("3"), Arc::from("3"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&hash("1")).is_none());
        assert!(cache.get(&hash("2")).is_some());
        assert!(cache.get(&hash("3")).is_some());
    }

    #[test]
    fn zero_capacity_disables_cache() {
        let cache = RenderCache::with_config(CacheConfig::new(0, Duration::from_secs(60)));
        cache.insert(hash("1"), Arc::from("1"));
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_max_age_expires_immediately() {
        let cache = RenderCache::with_config(CacheConfig::new(8, Duration::ZERO));
        cache.insert(hash("x"), Arc::from("x"));

        assert!(cache.get(&hash("x")).is_none());
        assert_eq!(
            cache.stats(),
            CacheStats {
                total: 1,
                fresh: 0,
                expired: 1
            }
        );
        assert_eq!(cache.evict_expired(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_and_clear() {
        let cache = RenderCache::new();
        cache.insert(hash("a"), Arc::from("a"));
        cache.insert(hash("b"), Arc::from("b"));

        assert!(cache.invalidate(&hash("a")));
        assert!(!cache.invalidate(&hash("a")));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
