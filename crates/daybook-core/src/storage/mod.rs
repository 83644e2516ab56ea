//! Storage layer
//!
//! Handles persistence of the journal document: one JSON array holding
//! every entry, rewritten in full on each mutation. Writes go through
//! an atomic temp-file-and-rename so the document is never left
//! half-written on disk.

pub mod error;
pub mod persistence;

pub use error::{StoreError, StoreResult};
pub use persistence::JournalPersistence;
