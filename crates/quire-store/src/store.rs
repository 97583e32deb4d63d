//! Store facade combining content, render cache, and insert log.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use quire_core::{Entry, EntryId, InsertRecord};
use quire_render::MarkdownRenderer;

use crate::cache::{CacheConfig, RenderCache};
use crate::content::ContentStore;
use crate::error::{StoreError, StoreResult};
use crate::insert_log::InsertLog;
use crate::retry::RetryConfig;

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory of markdown files.
    pub content_dir: PathBuf,
    /// Directory for persisted state (created if absent).
    pub storage_dir: PathBuf,
    /// Retry policy for file reads.
    pub retry: RetryConfig,
    /// Render cache settings.
    pub cache: CacheConfig,
}

impl StoreConfig {
    /// Creates a config with default retry and cache settings.
    pub fn new(content_dir: impl Into<PathBuf>, storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
            storage_dir: storage_dir.into(),
            retry: RetryConfig::default(),
            cache: CacheConfig::default(),
        }
    }

    /// Sets the number of read attempts.
    pub fn with_read_attempts(mut self, attempts: u32) -> Self {
        self.retry = RetryConfig::with_attempts(attempts);
        self
    }

    /// Sets the render cache capacity and max age.
    pub fn with_cache(mut self, capacity: usize, max_age: Duration) -> Self {
        self.cache = CacheConfig::new(capacity, max_age);
        self
    }
}

/// Content access for the HTTP layer.
#[derive(Debug)]
pub struct Store {
    content: ContentStore,
    inserts: InsertLog,
    cache: RenderCache,
    renderer: Arc<MarkdownRenderer>,
}

impl Store {
    /// Opens the content directory and storage directory.
    pub async fn open(config: StoreConfig) -> StoreResult<Self> {
        let content = ContentStore::open(&config.content_dir, config.retry.clone()).await?;
        let inserts = InsertLog::open(&config.storage_dir).await?;

        Ok(Self {
            content,
            inserts,
            cache: RenderCache::with_config(config.cache),
            renderer: Arc::new(MarkdownRenderer::new()),
        })
    }

    /// Returns the content index.
    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    /// Returns the insert log.
    pub fn inserts(&self) -> &InsertLog {
        &self.inserts
    }

    /// Returns the render cache.
    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// Returns the shared renderer.
    pub fn renderer(&self) -> &Arc<MarkdownRenderer> {
        &self.renderer
    }

    /// Reads an entry from disk and renders it to HTML.
    ///
    /// Rendering runs on the blocking pool on a cache miss.
    pub async fn render_entry(&self, id: EntryId) -> StoreResult<(Entry, Arc<str>)> {
        let entry = self.content.load(id).await?;

        if let Some(html) = self.cache.get(&entry.hash) {
            return Ok((entry, html));
        }

        let cache = self.cache.clone();
        let renderer = Arc::clone(&self.renderer);
        let hash = entry.hash;
        let source = entry.source.clone();
        let html = tokio::task::spawn_blocking(move || {
            cache.get_or_render(hash, &source, &renderer)
        })
        .await
        .map_err(|e| StoreError::Render(e.to_string()))?;

        Ok((entry, html))
    }

    /// Records an accepted insert.
    pub async fn record_insert(&self, record: &InsertRecord) -> StoreResult<()> {
        self.inserts.append(record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_store(files: &[(&str, &str)]) -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let content = dir.path().join("content");
        std::fs::create_dir(&content).unwrap();
        for (name, body) in files {
            std::fs::write(content.join(name), body).unwrap();
        }
        let store = Store::open(StoreConfig::new(&content, dir.path().join("db")))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_render_entry_uses_cache() {
        let (_dir, store) = open_store(&[("a.md", "# Alpha\n\nBody text.\n")]).await;

        let (entry, html) = store.render_entry(EntryId::new(0)).await.unwrap();
        assert_eq!(entry.title, "Alpha");
        assert!(html.contains("<h1>Alpha</h1>"));
        assert_eq!(store.cache().len(), 1);

        let (_, again) = store.render_entry(EntryId::new(0)).await.unwrap();
        assert!(Arc::ptr_eq(&html, &again));
    }

    #[tokio::test]
    async fn test_render_entry_not_found() {
        let (_dir, store) = open_store(&[]).await;
        let err = store.render_entry(EntryId::new(3)).await.unwrap_err();
        assert!(matches!(err, StoreError::EntryNotFound(_)));
    }

    #[tokio::test]
    async fn test_storage_dir_created() {
        let (dir, store) = open_store(&[]).await;
        assert!(dir.path().join("db").is_dir());
        assert!(store.inserts().path().starts_with(dir.path().join("db")));
    }
}
