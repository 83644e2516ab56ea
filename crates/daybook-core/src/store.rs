//! Journal entry store
//!
//! The `Store` owns the journal document and exposes load, append,
//! update, and delete. Each mutation is one read-modify-write
//! transaction: read the whole document, apply a single change in
//! memory, write the whole document back. No merge is attempted with
//! writes that happen in between, so the store serializes its own
//! operations behind an internal mutex; callers sharing a `Store`
//! across threads keep the single-writer guarantee for free. The
//! backing file must never be touched directly.
//!
//! ## Corruption recovery
//!
//! An unparseable document is treated as an empty collection, never a
//! fatal error. The unreadable bytes are preserved in a `.corrupt`
//! sidecar before any subsequent write can replace them.
//!
//! ## Usage
//!
//! ```ignore
//! let store = Store::open()?;
//!
//! let entry = store.append(EntryDraft::text("Day one"))?;
//! store.update(entry.id, "Day one, edited", ImageUpdate::Keep)?;
//! store.delete(entry.id)?;
//! ```

use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::config::Config;
use crate::identity::IdAllocator;
use crate::models::{Entry, EntryDraft, ImageUpdate};
use crate::storage::{JournalPersistence, StoreError, StoreResult};

/// Result of loading the journal document
#[derive(Debug)]
pub struct LoadOutcome {
    /// All entries, in storage (creation) order
    pub entries: Vec<Entry>,
    /// Parse failure detail when the document was corrupt and the
    /// store recovered with an empty collection
    pub corruption: Option<String>,
}

/// Durable CRUD over the journal entry collection
pub struct Store {
    persistence: JournalPersistence,
    /// Guards every read-modify-write cycle; also owns the id
    /// allocator so id issue happens under the same lock.
    alloc: Mutex<IdAllocator>,
}

impl Store {
    /// Open the store using the default configuration
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::with_config(config))
    }

    /// Open the store with a specific configuration
    pub fn with_config(config: Config) -> Self {
        Self {
            persistence: JournalPersistence::new(config),
            alloc: Mutex::new(IdAllocator::new()),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        self.persistence.config()
    }

    /// Load the full collection
    ///
    /// A missing document is an empty collection. A corrupt document
    /// is also an empty collection, with the parse failure reported in
    /// the outcome so the caller can tell the user; it never
    /// propagates as an error.
    pub fn load(&self) -> StoreResult<LoadOutcome> {
        let _guard = self.lock();
        let (entries, corruption) = self.read_recovering()?;
        Ok(LoadOutcome {
            entries,
            corruption,
        })
    }

    /// Load entries, discarding the corruption notice (a recovered
    /// corruption is still logged)
    pub fn entries(&self) -> StoreResult<Vec<Entry>> {
        Ok(self.load()?.entries)
    }

    /// Append a new entry to the journal
    ///
    /// Rejects the draft before any I/O if it has neither trimmed text
    /// nor an image reference. Otherwise allocates an id, stamps the
    /// creation time, and persists the grown collection.
    pub fn append(&self, draft: EntryDraft) -> StoreResult<Entry> {
        if !draft.has_content() {
            return Err(StoreError::EmptyEntry);
        }

        let mut alloc = self.lock();
        let (mut entries, _) = self.read_recovering()?;

        let floor = entries.iter().map(|e| e.id).max().unwrap_or(0);
        let id = alloc.next(floor);
        if entries.iter().any(|e| e.id == id) {
            return Err(StoreError::DuplicateId { id });
        }

        let entry = Entry::new(id, draft.text, draft.image_ref);
        entries.push(entry.clone());
        self.persistence.write_document(&entries)?;

        debug!(id, total = entries.len(), "appended journal entry");
        Ok(entry)
    }

    /// Update the text and (optionally) the image of an existing entry
    ///
    /// Text is replaced unconditionally. The image field follows the
    /// explicit `ImageUpdate` intent. `id` and `created_at` are never
    /// touched. Fails with `NotFound` if no entry matches, and with
    /// `EmptyEntry` if the result would have neither text nor image.
    pub fn update(
        &self,
        id: i64,
        text: impl Into<String>,
        image: ImageUpdate,
    ) -> StoreResult<Entry> {
        let text = text.into();

        // Decidable without touching the document
        if text.trim().is_empty() && image == ImageUpdate::Remove {
            return Err(StoreError::EmptyEntry);
        }

        let _guard = self.lock();
        let (mut entries, _) = self.read_recovering()?;

        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StoreError::NotFound { id })?;

        let new_image = match image {
            ImageUpdate::Keep => entry.image_ref.clone(),
            ImageUpdate::Replace(locator) => Some(locator),
            ImageUpdate::Remove => None,
        };

        if text.trim().is_empty() && new_image.is_none() {
            return Err(StoreError::EmptyEntry);
        }

        entry.text = text;
        entry.image_ref = new_image;
        let updated = entry.clone();

        self.persistence.write_document(&entries)?;

        debug!(id, "updated journal entry");
        Ok(updated)
    }

    /// Delete an entry
    ///
    /// Removes exactly the entry matching `id`, leaving every other
    /// entry untouched. Fails with `NotFound` if no entry matches; in
    /// that case nothing is written.
    pub fn delete(&self, id: i64) -> StoreResult<()> {
        let _guard = self.lock();
        let (mut entries, _) = self.read_recovering()?;

        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Err(StoreError::NotFound { id });
        }

        self.persistence.write_document(&entries)?;

        debug!(id, remaining = entries.len(), "deleted journal entry");
        Ok(())
    }

    /// Read the document, recovering from corruption
    ///
    /// Mutations use this too: after a corrupted write the user can
    /// still append, starting over from an empty collection, with the
    /// old bytes preserved in the sidecar.
    fn read_recovering(&self) -> StoreResult<(Vec<Entry>, Option<String>)> {
        match self.persistence.read_document() {
            Ok(entries) => Ok((entries, None)),
            Err(StoreError::Corrupt { path, details }) => {
                warn!(
                    path = %path.display(),
                    %details,
                    "journal document is corrupt; continuing with an empty collection"
                );
                if let Some(sidecar) = self.persistence.quarantine_corrupt() {
                    warn!(sidecar = %sidecar.display(), "corrupt document preserved");
                }
                Ok((Vec::new(), Some(details)))
            }
            Err(e) => Err(e),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IdAllocator> {
        // A poisoned lock only means another thread panicked mid-write;
        // the on-disk document is still either old or new.
        self.alloc
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn test_store(temp_dir: &TempDir) -> Store {
        Store::with_config(test_config(temp_dir))
    }

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            log_file: None,
        }
    }

    #[test]
    fn test_load_without_document_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let outcome = store.load().unwrap();
        assert!(outcome.entries.is_empty());
        assert!(outcome.corruption.is_none());
    }

    #[test]
    fn test_append_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let first = store.append(EntryDraft::text("Day one")).unwrap();
        let second = store
            .append(EntryDraft::with_image("", "res://photo1"))
            .unwrap();

        let entries = store.entries().unwrap();
        assert_eq!(entries, vec![first, second]);
    }

    #[test]
    fn test_append_rejects_empty_draft_without_touching_disk() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let err = store.append(EntryDraft::text("   ")).unwrap_err();
        assert!(matches!(err, StoreError::EmptyEntry));
        assert!(!store.config().journal_path().exists());
    }

    #[test]
    fn test_append_rejects_empty_draft_leaving_document_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.append(EntryDraft::text("keep me")).unwrap();
        let before = fs::read_to_string(store.config().journal_path()).unwrap();

        assert!(store.append(EntryDraft::default()).is_err());

        let after = fs::read_to_string(store.config().journal_path()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_repeated_appends_produce_unique_ids() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let mut ids = std::collections::HashSet::new();
        for i in 0..50 {
            let entry = store.append(EntryDraft::text(format!("entry {}", i))).unwrap();
            assert!(ids.insert(entry.id), "duplicate id {}", entry.id);
        }
    }

    #[test]
    fn test_ids_stay_unique_across_reopen() {
        let temp_dir = TempDir::new().unwrap();

        let first = {
            let store = test_store(&temp_dir);
            store.append(EntryDraft::text("before restart")).unwrap()
        };

        // Fresh store simulates a process restart with a reset allocator
        let store = test_store(&temp_dir);
        let second = store.append(EntryDraft::text("after restart")).unwrap();

        assert_ne!(first.id, second.id);
        assert!(second.id > first.id);
    }

    #[test]
    fn test_update_replaces_text_and_freezes_creation_fields() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let entry = store.append(EntryDraft::text("Day one")).unwrap();
        let updated = store
            .update(entry.id, "Day one, edited", ImageUpdate::Keep)
            .unwrap();

        assert_eq!(updated.id, entry.id);
        assert_eq!(updated.created_at, entry.created_at);
        assert_eq!(updated.text, "Day one, edited");

        let reloaded = store.entries().unwrap();
        assert_eq!(reloaded, vec![updated]);
    }

    #[test]
    fn test_update_image_keep() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let entry = store
            .append(EntryDraft::with_image("text", "res://original"))
            .unwrap();
        let updated = store.update(entry.id, "new text", ImageUpdate::Keep).unwrap();

        assert_eq!(updated.image_ref.as_deref(), Some("res://original"));
    }

    #[test]
    fn test_update_image_replace() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let entry = store
            .append(EntryDraft::with_image("text", "res://original"))
            .unwrap();
        let updated = store
            .update(
                entry.id,
                "text",
                ImageUpdate::Replace("res://replacement".into()),
            )
            .unwrap();

        assert_eq!(updated.image_ref.as_deref(), Some("res://replacement"));
    }

    #[test]
    fn test_update_image_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let entry = store
            .append(EntryDraft::with_image("text", "res://original"))
            .unwrap();
        let updated = store.update(entry.id, "text", ImageUpdate::Remove).unwrap();

        assert!(updated.image_ref.is_none());
    }

    #[test]
    fn test_update_rejects_entry_emptied_of_everything() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let entry = store
            .append(EntryDraft::with_image("text", "res://photo"))
            .unwrap();

        // Clearing both text and image must fail
        let err = store.update(entry.id, "", ImageUpdate::Remove).unwrap_err();
        assert!(matches!(err, StoreError::EmptyEntry));

        // Clearing text while keeping no image must also fail
        let text_only = store.append(EntryDraft::text("words")).unwrap();
        let err = store
            .update(text_only.id, "  ", ImageUpdate::Keep)
            .unwrap_err();
        assert!(matches!(err, StoreError::EmptyEntry));

        // Clearing text is fine when an image remains
        let updated = store.update(entry.id, "", ImageUpdate::Keep).unwrap();
        assert_eq!(updated.text, "");
        assert!(updated.image_ref.is_some());
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.append(EntryDraft::text("something")).unwrap();
        let before = store.entries().unwrap();

        let err = store.update(12345, "nope", ImageUpdate::Keep).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: 12345 }));
        assert_eq!(store.entries().unwrap(), before);
    }

    #[test]
    fn test_delete_removes_exactly_one_entry() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let keep_a = store.append(EntryDraft::text("keep a")).unwrap();
        let doomed = store.append(EntryDraft::text("doomed")).unwrap();
        let keep_b = store
            .append(EntryDraft::with_image("keep b", "res://photo"))
            .unwrap();

        store.delete(doomed.id).unwrap();

        let remaining = store.entries().unwrap();
        assert_eq!(remaining, vec![keep_a, keep_b]);
    }

    #[test]
    fn test_delete_unknown_id_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.append(EntryDraft::text("only entry")).unwrap();

        let err = store.delete(999).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: 999 }));
        assert_eq!(store.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_document_loads_as_empty_collection() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        fs::write(store.config().journal_path(), "{not json").unwrap();

        let outcome = store.load().unwrap();
        assert!(outcome.entries.is_empty());
        assert!(outcome.corruption.is_some());

        // The original bytes survive in the sidecar
        let sidecar = store
            .config()
            .journal_path()
            .with_extension("json.corrupt");
        assert_eq!(fs::read_to_string(sidecar).unwrap(), "{not json");
    }

    #[test]
    fn test_append_after_corruption_starts_fresh() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        fs::write(store.config().journal_path(), "][[[").unwrap();

        let entry = store.append(EntryDraft::text("fresh start")).unwrap();
        let entries = store.entries().unwrap();
        assert_eq!(entries, vec![entry]);
    }

    #[test]
    fn test_data_persists_across_reopens() {
        let temp_dir = TempDir::new().unwrap();

        let entry = {
            let store = test_store(&temp_dir);
            store
                .append(EntryDraft::with_image("persistent", "res://photo"))
                .unwrap()
        };

        let store = test_store(&temp_dir);
        let entries = store.entries().unwrap();
        assert_eq!(entries, vec![entry]);
    }

    #[test]
    fn test_full_lifecycle_scenario() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let entry1 = store.append(EntryDraft::text("Day one")).unwrap();
        assert_eq!(store.entries().unwrap().len(), 1);

        let entry2 = store
            .append(EntryDraft::with_image("", "res://photo1"))
            .unwrap();
        assert_eq!(store.entries().unwrap().len(), 2);

        let edited = store
            .update(entry1.id, "Day one, edited", ImageUpdate::Keep)
            .unwrap();
        assert_eq!(edited.text, "Day one, edited");
        assert_eq!(edited.created_at, entry1.created_at);

        store.delete(entry2.id).unwrap();

        let remaining = store.entries().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, entry1.id);
        assert_eq!(remaining[0].text, "Day one, edited");
    }

    #[test]
    fn test_store_is_shareable_across_threads() {
        let temp_dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(test_store(&temp_dir));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..10 {
                        store
                            .append(EntryDraft::text(format!("thread {} entry {}", t, i)))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 40);

        let ids: std::collections::HashSet<_> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 40);
    }
}
