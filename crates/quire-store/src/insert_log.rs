//! Append-only log of accepted inserts.
//!
//! Each record is one JSON line in `inserts.jsonl` under the storage
//! directory. This is the data-access placeholder behind `PUT /insert`; it
//! keeps what was accepted without defining a schema beyond the record.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use quire_core::InsertRecord;

use crate::error::{StoreError, StoreResult};

/// File name of the log inside the storage directory.
pub const INSERT_LOG_FILE: &str = "inserts.jsonl";

/// JSON-lines insert log.
#[derive(Debug)]
pub struct InsertLog {
    path: PathBuf,
    // Serializes appends so lines never interleave.
    write_lock: Mutex<()>,
}

impl InsertLog {
    /// Opens the log in `storage_dir`, creating the directory if absent.
    pub async fn open(storage_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = storage_dir.as_ref();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| StoreError::io(dir, e))?;

        Ok(Self {
            path: dir.join(INSERT_LOG_FILE),
            write_lock: Mutex::new(()),
        })
    }

    /// Returns the log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a record as one JSON line.
    pub async fn append(&self, record: &InsertRecord) -> StoreResult<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        file.write_all(&line)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        file.flush()
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;

        tracing::debug!(record_id = %record.id, "Appended insert record");
        Ok(())
    }

    /// Reads every record in the log, oldest first.
    pub async fn read_all(&self) -> StoreResult<Vec<InsertRecord>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(StoreError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_core::InsertBody;

    fn record(username: &str, content: &str) -> InsertRecord {
        InsertRecord::new(InsertBody {
            username: username.into(),
            content: content.into(),
        })
    }

    #[tokio::test]
    async fn test_open_creates_storage_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("db");
        let log = InsertLog::open(&storage).await.unwrap();
        assert!(storage.is_dir());
        assert!(log.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let log = InsertLog::open(dir.path()).await.unwrap();

        let first = record("ada", "one");
        let second = record("grace", "two\nlines");
        log.append(&first).await.unwrap();
        log.append(&second).await.unwrap();

        let records = log.read_all().await.unwrap();
        assert_eq!(records, vec![first, second]);
    }

    #[tokio::test]
    async fn test_concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let log = std::sync::Arc::new(InsertLog::open(dir.path()).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..16 {
            let log = log.clone();
            handles.push(tokio::spawn(async move {
                log.append(&record(&format!("user{i}"), &"x".repeat(4096)))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(log.read_all().await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_append_fails_when_storage_removed() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("db");
        let log = InsertLog::open(&storage).await.unwrap();

        std::fs::remove_dir_all(&storage).unwrap();
        let err = log.append(&record("ada", "lost")).await.unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
