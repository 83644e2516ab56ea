//! Daybook Core Library
//!
//! This crate provides the core functionality for daybook, a personal
//! journal that keeps its entries in a single JSON document on disk.
//!
//! # Architecture
//!
//! - **Store**: whole-document read-modify-write CRUD over the journal
//! - **AttachmentManager**: durable references to externally-owned images
//!
//! Every mutation re-reads the full document, applies one change in
//! memory, and atomically rewrites the file. There is no cache layer
//! and no background work; callers drive everything.
//!
//! # Quick Start
//!
//! ```text
//! let store = Store::open()?;
//!
//! // Append an entry
//! let entry = store.append(EntryDraft::text("Day one"))?;
//!
//! // Read everything back
//! let outcome = store.load()?;
//! ```
//!
//! # Modules
//!
//! - `store`: journal entry store (main entry point)
//! - `models`: entry data structures and the wire format
//! - `identity`: entry id allocation
//! - `attachment`: attachment-reference lifecycle and grants
//! - `storage`: document persistence and typed errors
//! - `config`: application configuration

pub mod attachment;
pub mod config;
pub mod identity;
pub mod models;
pub mod storage;
pub mod store;

pub use attachment::{
    AttachOutcome, AttachmentError, AttachmentManager, AttachmentRef, FsGrantProvider,
    GrantProvider,
};
pub use config::Config;
pub use identity::IdAllocator;
pub use models::{Entry, EntryDraft, ImageUpdate};
pub use storage::{JournalPersistence, StoreError, StoreResult};
pub use store::{LoadOutcome, Store};
