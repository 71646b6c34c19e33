//! Sandboxed file store
//!
//! UTF-8 text read/write on paths confined by a [`Sandbox`]. Paths are
//! resolved before any I/O; a rejected path never reaches the filesystem.

use crate::audit::{AuditLog, AuditRecord};
use crate::error::StoreError;
use crate::sandbox::Sandbox;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Successful read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadOutcome {
    pub content: String,
    pub path: PathBuf,
}

/// Successful write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub path: PathBuf,
    pub base_dir: PathBuf,
    pub bytes_written: usize,
}

/// Text store confined to one base directory
///
/// No locking: one editor session per target path is assumed.
#[derive(Debug, Clone)]
pub struct FileStore {
    sandbox: Sandbox,
    audit: Arc<AuditLog>,
}

impl FileStore {
    /// Create a store over `sandbox` with a fresh audit log
    #[must_use]
    pub fn new(sandbox: Sandbox) -> Self {
        Self::with_audit(sandbox, Arc::new(AuditLog::new()))
    }

    /// Create a store sharing an existing audit log
    #[must_use]
    pub fn with_audit(sandbox: Sandbox, audit: Arc<AuditLog>) -> Self {
        Self { sandbox, audit }
    }

    /// Base directory
    #[inline]
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        self.sandbox.base()
    }

    /// Audit trail of writes made through this store
    #[inline]
    #[must_use]
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Resolve without touching file contents
    ///
    /// # Errors
    /// See [`Sandbox::resolve`]
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, StoreError> {
        self.sandbox.resolve(relative)
    }

    /// Read a UTF-8 file
    ///
    /// # Errors
    /// - `StoreError::InvalidInput` / `StoreError::InvalidPath` from resolution
    /// - `StoreError::NotFound` if the file does not exist
    /// - `StoreError::Io` for any other read failure, including invalid UTF-8
    pub async fn read(&self, relative: &str) -> Result<ReadOutcome, StoreError> {
        let path = self.sandbox.resolve(relative)?;

        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound { path: path.clone() }
            } else {
                StoreError::io_error(&path, e)
            }
        })?;

        tracing::info!(path = %path.display(), bytes = content.len(), "file read");
        Ok(ReadOutcome { content, path })
    }

    /// Write `content`, replacing any existing file
    ///
    /// Missing parent directories are created. The previous content is gone
    /// once this returns.
    ///
    /// # Errors
    /// - `StoreError::InvalidInput` if `content` is empty, or from resolution
    /// - `StoreError::InvalidPath` from resolution
    /// - `StoreError::Io` if directory creation or the write fails
    pub async fn write(&self, relative: &str, content: &str) -> Result<WriteOutcome, StoreError> {
        if content.is_empty() {
            return Err(StoreError::InvalidInput("missing content".to_string()));
        }
        let path = self.sandbox.resolve(relative)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io_error(parent, e))?;
        }
        tokio::fs::write(&path, content.as_bytes())
            .await
            .map_err(|e| StoreError::io_error(&path, e))?;

        let record: AuditRecord = self.audit.append(&path, content);
        tracing::info!(
            path = %path.display(),
            bytes = record.bytes_written,
            sequence = record.sequence,
            "file written"
        );

        Ok(WriteOutcome {
            path,
            base_dir: self.sandbox.base().to_path_buf(),
            bytes_written: record.bytes_written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(Sandbox::new(dir.path()).unwrap());
        (dir, store)
    }

    #[tokio::test]
    async fn write_creates_parents_and_audits() {
        let (_dir, store) = store();
        let out = store.write("M5Stampfly/src/seq.hpp", "hello").await.unwrap();

        assert!(out.path.ends_with("M5Stampfly/src/seq.hpp"));
        assert_eq!(out.base_dir, store.base_dir());
        assert_eq!(store.audit().len(), 1);
        assert_eq!(store.audit().records()[0].resolved_path, out.path);

        let back = store.read("M5Stampfly/src/seq.hpp").await.unwrap();
        assert_eq!(back.content, "hello");
    }

    #[tokio::test]
    async fn write_replaces_existing() {
        let (_dir, store) = store();
        store.write("a.txt", "first version, longer").await.unwrap();
        store.write("a.txt", "second").await.unwrap();

        assert_eq!(store.read("a.txt").await.unwrap().content, "second");
        assert!(store.audit().verify_integrity().is_ok());
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let (_dir, store) = store();
        assert!(matches!(
            store.read("nope.hpp").await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn empty_content_is_rejected_without_io() {
        let (dir, store) = store();
        assert!(matches!(
            store.write("x/y.txt", "").await,
            Err(StoreError::InvalidInput(_))
        ));
        assert!(!dir.path().join("x").exists());
        assert!(store.audit().is_empty());
    }

    #[tokio::test]
    async fn reading_a_directory_is_io_error() {
        let (dir, store) = store();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        assert!(matches!(store.read("sub").await, Err(StoreError::Io { .. })));
    }
}
