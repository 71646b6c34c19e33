//! Write audit trail
//!
//! Every successful write through the store appends a record naming the
//! resolved absolute path. Records are hash-chained so that later edits to
//! the in-memory trail are detectable.

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// One audited write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub resolved_path: PathBuf,
    pub bytes_written: usize,
    /// SHA-256 of the written content, hex encoded
    pub content_hash: String,
    #[serde(with = "hex_bytes")]
    pub prev_hash: [u8; 32],
    #[serde(with = "hex_bytes")]
    pub hash: [u8; 32],
}

/// Append-only, hash-chained list of writes
#[derive(Debug, Default)]
pub struct AuditLog {
    inner: Mutex<Vec<AuditRecord>>,
}

impl AuditLog {
    /// Empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed write
    pub fn append(&self, resolved_path: &Path, content: &str) -> AuditRecord {
        let mut guard = self.inner.lock();
        let prev_hash = guard.last().map_or([0u8; 32], |r| r.hash);

        let mut record = AuditRecord {
            sequence: guard.len() as u64,
            timestamp: Utc::now(),
            resolved_path: resolved_path.to_path_buf(),
            bytes_written: content.len(),
            content_hash: hex::encode(Sha256::digest(content.as_bytes())),
            prev_hash,
            hash: [0u8; 32],
        };
        record.hash = compute_hash(&record);
        guard.push(record.clone());
        record
    }

    /// Snapshot of all records
    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        self.inner.lock().clone()
    }

    /// Number of recorded writes
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether nothing has been written yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Re-derive every hash and check the chain links
    ///
    /// # Errors
    /// Returns `StoreError::AuditTampered` naming the first record that fails
    pub fn verify_integrity(&self) -> Result<(), StoreError> {
        let guard = self.inner.lock();
        let mut prev = [0u8; 32];
        for record in guard.iter() {
            if record.prev_hash != prev || record.hash != compute_hash(record) {
                return Err(StoreError::AuditTampered {
                    sequence: record.sequence,
                });
            }
            prev = record.hash;
        }
        Ok(())
    }
}

fn compute_hash(record: &AuditRecord) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(record.sequence.to_le_bytes());
    hasher.update(record.timestamp.timestamp_micros().to_le_bytes());
    hasher.update(record.resolved_path.to_string_lossy().as_bytes());
    hasher.update([0]);
    hasher.update((record.bytes_written as u64).to_le_bytes());
    hasher.update(record.content_hash.as_bytes());
    hasher.update([0]);
    hasher.update(record.prev_hash);
    hasher.finalize().into()
}

mod hex_bytes {
    use serde::Serializer;

    pub(super) fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_verifies() {
        let log = AuditLog::new();
        log.append(Path::new("/fw/a.hpp"), "one");
        log.append(Path::new("/fw/b.hpp"), "two");

        let records = log.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].prev_hash, records[0].hash);
        assert_eq!(records[1].sequence, 1);
        assert!(log.verify_integrity().is_ok());
    }

    #[test]
    fn tampering_is_detected() {
        let log = AuditLog::new();
        log.append(Path::new("/fw/a.hpp"), "one");
        log.append(Path::new("/fw/a.hpp"), "two");

        log.inner.lock()[0].resolved_path = PathBuf::from("/etc/passwd");

        assert!(matches!(
            log.verify_integrity(),
            Err(StoreError::AuditTampered { sequence: 0 })
        ));
    }

    #[test]
    fn content_hash_is_sha256_hex() {
        let log = AuditLog::new();
        let record = log.append(Path::new("/fw/x"), "");
        assert_eq!(
            record.content_hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(record.bytes_written, 0);
    }
}
