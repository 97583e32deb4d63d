//! Markdown content directory.
//!
//! Files with a `.md` or `.markdown` extension directly under the content
//! root are loaded as entries, sorted by file name. An entry's id is its
//! position in that list. A rescan builds a new list and swaps it in
//! wholesale; readers holding the previous snapshot keep a consistent view.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;

use quire_core::{Entry, EntryFilter, EntryId, TitleSource};

use crate::error::{StoreError, StoreResult};
use crate::retry::{self, RetryConfig};

/// File extensions treated as markdown.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Index of the markdown files in a content directory.
#[derive(Debug)]
pub struct ContentStore {
    root: PathBuf,
    entries: RwLock<Arc<Vec<Entry>>>,
    retry: RetryConfig,
}

impl ContentStore {
    /// Opens a content directory, creating it if absent, and scans it.
    pub async fn open(root: impl Into<PathBuf>, retry: RetryConfig) -> StoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreError::io(&root, e))?;

        let store = Self {
            root,
            entries: RwLock::new(Arc::new(Vec::new())),
            retry,
        };
        store.rescan().await?;
        Ok(store)
    }

    /// Returns the content root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Rescans the directory and replaces the entry list.
    ///
    /// Files that fail to read are skipped with a warning so one bad file
    /// does not hide the rest. Returns the new entry count.
    pub async fn rescan(&self) -> StoreResult<usize> {
        let paths = self.list_markdown_files().await?;

        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            match retry::read_to_string(&path, &self.retry).await {
                Ok(source) => {
                    let id = EntryId::new(entries.len());
                    entries.push(Entry::new(id, path, source));
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable content file");
                }
            }
        }

        let count = entries.len();
        *self.entries.write().await = Arc::new(entries);
        tracing::info!(root = %self.root.display(), entries = count, "Scanned content directory");
        Ok(count)
    }

    async fn list_markdown_files(&self) -> StoreResult<Vec<PathBuf>> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::ContentDirMissing(self.root.clone()));
            }
            Err(e) => return Err(StoreError::io(&self.root, e)),
        };

        let mut paths = Vec::new();
        while let Some(item) = dir
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.root, e))?
        {
            let path = item.path();
            let is_file = item
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if is_file && is_markdown(&path) {
                paths.push(path);
            }
        }

        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(paths)
    }

    /// Returns a snapshot of the current entry list.
    pub async fn entries(&self) -> Arc<Vec<Entry>> {
        Arc::clone(&*self.entries.read().await)
    }

    /// Returns the entries matching a filter.
    pub async fn list(&self, filter: EntryFilter) -> Vec<Entry> {
        let snapshot = self.entries().await;
        snapshot
            .iter()
            .filter(|entry| match filter {
                EntryFilter::All => true,
                EntryFilter::Titled => entry.title_source == TitleSource::Heading,
            })
            .cloned()
            .collect()
    }

    /// Returns the number of loaded entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if no entries are loaded.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Resolves an id to the path of its backing file.
    pub async fn path_of(&self, id: EntryId) -> StoreResult<PathBuf> {
        self.entries
            .read()
            .await
            .get(id.index())
            .map(|entry| entry.path.clone())
            .ok_or(StoreError::EntryNotFound(id))
    }

    /// Reads an entry fresh from disk.
    ///
    /// The returned entry reflects the file's current contents, which may
    /// differ from the snapshot taken at the last scan.
    pub async fn load(&self, id: EntryId) -> StoreResult<Entry> {
        let path = self.path_of(id).await?;
        let source = retry::read_to_string(&path, &self.retry)
            .await
            .map_err(|e| StoreError::io(&path, e))?;
        Ok(Entry::new(id, path, source))
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[tokio::test]
    async fn test_scan_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.md", "# Bravo\n");
        write(dir.path(), "a.md", "# Alpha\n");
        write(dir.path(), "c.markdown", "no heading\n");
        write(dir.path(), "notes.txt", "ignored\n");
        std::fs::create_dir(dir.path().join("sub.md")).unwrap();

        let store = ContentStore::open(dir.path(), RetryConfig::default())
            .await
            .unwrap();
        let entries = store.entries().await;

        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Bravo", "c"]);
        assert_eq!(entries[1].id, EntryId::new(1));
    }

    #[tokio::test]
    async fn test_open_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("content");
        let store = ContentStore::open(&root, RetryConfig::default())
            .await
            .unwrap();
        assert!(root.is_dir());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_path_of_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "only.md", "# Only\n");
        let store = ContentStore::open(dir.path(), RetryConfig::default())
            .await
            .unwrap();

        assert!(store.path_of(EntryId::new(0)).await.is_ok());
        let err = store.path_of(EntryId::new(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::EntryNotFound(id) if id == EntryId::new(1)));
    }

    #[tokio::test]
    async fn test_load_reads_current_contents() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "doc.md", "# First\n");
        let store = ContentStore::open(dir.path(), RetryConfig::default())
            .await
            .unwrap();

        write(dir.path(), "doc.md", "# Second\n");
        let entry = store.load(EntryId::new(0)).await.unwrap();
        assert_eq!(entry.title, "Second");
        // The scanned snapshot is unchanged until a rescan.
        assert_eq!(store.entries().await[0].title, "First");
    }

    #[tokio::test]
    async fn test_load_deleted_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "gone.md", "# Gone\n");
        let store = ContentStore::open(dir.path(), RetryConfig::default())
            .await
            .unwrap();

        std::fs::remove_file(dir.path().join("gone.md")).unwrap();
        let err = store.load(EntryId::new(0)).await.unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[tokio::test]
    async fn test_rescan_replaces_entries() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "# A\n");
        let store = ContentStore::open(dir.path(), RetryConfig::default())
            .await
            .unwrap();
        let before = store.entries().await;

        write(dir.path(), "b.md", "# B\n");
        assert_eq!(store.rescan().await.unwrap(), 2);
        assert_eq!(before.len(), 1);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_rescan_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("content");
        let store = ContentStore::open(&root, RetryConfig::default())
            .await
            .unwrap();

        std::fs::remove_dir(&root).unwrap();
        let err = store.rescan().await.unwrap_err();
        assert!(matches!(err, StoreError::ContentDirMissing(_)));
    }

    #[tokio::test]
    async fn test_list_titled_filter() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "# Titled\n");
        write(dir.path(), "b.md", "plain\n");
        let store = ContentStore::open(dir.path(), RetryConfig::default())
            .await
            .unwrap();

        assert_eq!(store.list(EntryFilter::All).await.len(), 2);
        let titled = store.list(EntryFilter::Titled).await;
        assert_eq!(titled.len(), 1);
        assert_eq!(titled[0].title, "Titled");
    }
}
