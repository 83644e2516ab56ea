//! Store error handling
//!
//! Typed errors for journal operations. Nothing here is fatal to the
//! process: corruption is recovered by the store, and everything else
//! is surfaced to the immediate caller.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during journal operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to create the data directory
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read the journal document
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write the journal document
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The journal document cannot be parsed
    ///
    /// The store recovers from this by starting over with an empty
    /// collection; it never propagates as a fatal failure.
    #[error("Journal document at '{path}' is corrupt: {details}")]
    Corrupt { path: PathBuf, details: String },

    /// No entry with the given id exists
    #[error("No entry found with id {id}")]
    NotFound { id: i64 },

    /// The entry has neither text nor an image attachment
    #[error("Entry is empty: write some text or attach an image before saving")]
    EmptyEntry,

    /// An allocated id is already present in the collection
    ///
    /// Indicates an allocator bug; the store refuses to overwrite.
    #[error("Duplicate entry id {id}: refusing to overwrite an existing entry")]
    DuplicateId { id: i64 },

    /// Atomic write failed during rename
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StoreError {
    /// Create an error from an I/O error with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StoreError::PermissionDenied {
                path,
                source: error,
            },
            _ if is_disk_full_error(&error) => StoreError::DiskFull {
                path,
                source: error,
            },
            _ => StoreError::Write {
                path,
                source: error,
            },
        }
    }

    /// Whether callers must treat this as potential data loss
    ///
    /// A failed write may have happened after the old document was
    /// already replaced, so it is never just "retry".
    pub fn is_write_failure(&self) -> bool {
        matches!(
            self,
            StoreError::Write { .. }
                | StoreError::DiskFull { .. }
                | StoreError::AtomicWriteFailed { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::DiskFull { .. } => Some("Free up disk space and try again."),
            StoreError::PermissionDenied { .. } => {
                Some("Check file and directory permissions on the data directory.")
            }
            StoreError::Corrupt { .. } => Some(
                "A copy of the corrupt document was kept next to the journal file. You can try to recover entries from it manually.",
            ),
            StoreError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            _ => None,
        }
    }
}

/// Check if an I/O error indicates a disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for journal operations
pub type StoreResult<T> = Result<T, StoreError>;
