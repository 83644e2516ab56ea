//! Journal document persistence
//!
//! Reads and writes the journal file: a single JSON array of entries,
//! pretty-printed with 4-space indentation. Every write replaces the
//! whole file, using an atomic temp-file-and-rename so a crash mid-write
//! cannot leave a truncated document behind.
//!
//! Storage location: `~/.local/share/daybook/` (configurable via `Config`)
//!
//! Files:
//! - `diary_entries.json` - the journal document
//! - `diary_entries.json.corrupt` - sidecar copy kept when the document
//!   fails to parse

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

use crate::config::Config;
use crate::models::Entry;
use crate::storage::error::{StoreError, StoreResult};

/// Persistence layer for the journal document
pub struct JournalPersistence {
    config: Config,
}

impl JournalPersistence {
    /// Create a new persistence handler with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path of the journal document
    pub fn journal_path(&self) -> PathBuf {
        self.config.journal_path()
    }

    /// Check if a journal document exists on disk
    pub fn exists(&self) -> bool {
        self.journal_path().exists()
    }

    /// Read the full journal document
    ///
    /// A missing or empty file is an empty collection, not an error;
    /// the journal is created implicitly by the first write. A file
    /// that exists but cannot be parsed is `StoreError::Corrupt`.
    pub fn read_document(&self) -> StoreResult<Vec<Entry>> {
        let path = self.journal_path();

        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            path,
            details: e.to_string(),
        })
    }

    /// Replace the journal document with the given entries
    pub fn write_document(&self, entries: &[Entry]) -> StoreResult<()> {
        let bytes = encode_document(entries)?;
        atomic_write(&self.journal_path(), &bytes)
    }

    /// Keep a copy of an unparseable document next to the journal file
    ///
    /// Called before the store continues with an empty collection, so
    /// the next write does not destroy whatever was on disk. Returns
    /// the sidecar path, or `None` if even the copy failed.
    pub fn quarantine_corrupt(&self) -> Option<PathBuf> {
        let path = self.journal_path();
        let sidecar = path.with_extension("json.corrupt");

        match fs::copy(&path, &sidecar) {
            Ok(_) => Some(sidecar),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not preserve corrupt journal document");
                None
            }
        }
    }
}

/// Encode entries as a pretty-printed JSON array (4-space indent)
///
/// The indent width matches what the journal format has always used;
/// readers only care that it parses.
fn encode_document(entries: &[Entry]) -> StoreResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    entries
        .serialize(&mut serializer)
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?;
    Ok(buf)
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file over the target path
///
/// This ensures the target file is never left in a partially-written state.
fn atomic_write(path: &Path, data: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)
        .map_err(|e| StoreError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| StoreError::from_io(e, temp_path.clone()))?;

    file.sync_all()
        .map_err(|e| StoreError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StoreError::AtomicWriteFailed {
        from: temp_path,
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            log_file: None,
        }
    }

    #[test]
    fn test_missing_document_is_empty_collection() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JournalPersistence::new(test_config(&temp_dir));

        assert!(!persistence.exists());
        assert!(persistence.read_document().unwrap().is_empty());
    }

    #[test]
    fn test_write_and_read_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JournalPersistence::new(test_config(&temp_dir));

        let entries = vec![
            Entry::new(1, "first", None),
            Entry::new(2, "", Some("res://photo1".into())),
        ];

        persistence.write_document(&entries).unwrap();
        assert!(persistence.exists());

        let loaded = persistence.read_document().unwrap();
        assert_eq!(loaded, entries);
    }

    #[test]
    fn test_document_is_pretty_printed_with_wire_names() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JournalPersistence::new(test_config(&temp_dir));

        persistence
            .write_document(&[Entry::new(7, "hello", Some("res://p".into()))])
            .unwrap();

        let raw = fs::read_to_string(persistence.journal_path()).unwrap();
        assert!(raw.starts_with('['));
        assert!(raw.contains("    \"uniqueId\": 7"));
        assert!(raw.contains("\"imageUri\""));
        assert!(raw.contains("\"timestamp\""));
    }

    #[test]
    fn test_empty_file_is_empty_collection() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JournalPersistence::new(test_config(&temp_dir));

        fs::write(persistence.journal_path(), "").unwrap();
        assert!(persistence.read_document().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_document_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JournalPersistence::new(test_config(&temp_dir));

        fs::write(persistence.journal_path(), "{not json").unwrap();

        let err = persistence.read_document().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_quarantine_keeps_a_copy() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JournalPersistence::new(test_config(&temp_dir));

        fs::write(persistence.journal_path(), "{not json").unwrap();

        let sidecar = persistence.quarantine_corrupt().unwrap();
        assert!(sidecar.exists());
        assert_eq!(fs::read_to_string(sidecar).unwrap(), "{not json");
    }

    #[test]
    fn test_write_replaces_whole_document() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JournalPersistence::new(test_config(&temp_dir));

        persistence
            .write_document(&[Entry::new(1, "one", None), Entry::new(2, "two", None)])
            .unwrap();
        persistence
            .write_document(&[Entry::new(3, "three", None)])
            .unwrap();

        let loaded = persistence.read_document().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 3);
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("journal.json");

        atomic_write(&nested_path, b"[]").unwrap();

        assert!(nested_path.exists());
        assert_eq!(fs::read_to_string(&nested_path).unwrap(), "[]");
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JournalPersistence::new(test_config(&temp_dir));

        persistence.write_document(&[Entry::new(1, "x", None)]).unwrap();

        let tmp = persistence.journal_path().with_extension("tmp");
        assert!(!tmp.exists());
    }
}
