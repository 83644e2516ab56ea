//! Entry command handlers
//!
//! Each handler drives one store operation and re-renders from a fresh
//! `load()` where the original flow would; the store hands out no
//! incremental deltas.

use anyhow::{bail, Context, Result};

use daybook_core::{AttachmentManager, EntryDraft, ImageUpdate, Store};

use crate::editor::{confirm, edit_text};
use crate::output::{ImageStatus, Output};

/// Write a new entry
pub fn add(
    store: &Store,
    attachments: &AttachmentManager,
    text: Option<String>,
    image: Option<String>,
    output: &Output,
) -> Result<()> {
    let text = match text {
        Some(t) => t,
        // With an image the text may stay empty; otherwise open the editor
        None if image.is_some() => String::new(),
        None => edit_text("")
            .context("Failed to edit entry text")?
            .trim()
            .to_string(),
    };

    let image_ref = match image {
        Some(locator) => {
            let outcome = attachments.attach(&locator);
            if let Some(e) = outcome.grant_error {
                output.warn(&format!(
                    "Image saved without a durable read grant; it may not display after a restart: {}",
                    e
                ));
            }
            Some(outcome.reference.locator)
        }
        None => None,
    };

    let entry = store
        .append(EntryDraft { text, image_ref })
        .context("Failed to save entry")?;

    output.success(&format!("Saved entry {}", entry.id));
    Ok(())
}

/// List all entries, most recent first
pub fn list(store: &Store, output: &Output) -> Result<()> {
    let outcome = store.load().context("Failed to load journal")?;

    if let Some(details) = &outcome.corruption {
        output.warn(&format!(
            "Journal file was unreadable and has been reset; a copy was kept next to it ({})",
            details
        ));
    }

    output.print_entries(&outcome.entries);
    Ok(())
}

/// Show one entry in full
pub fn show(
    store: &Store,
    attachments: &AttachmentManager,
    id: i64,
    output: &Output,
) -> Result<()> {
    let entry = find_entry(store, id)?;

    let image = entry.image_ref.as_ref().map(|locator| {
        match attachments.resolve(locator) {
            Ok(path) => ImageStatus::Resolved(path),
            Err(e) => ImageStatus::Unavailable(e.to_string()),
        }
    });

    output.print_entry(&entry, image.as_ref());
    Ok(())
}

/// Edit an entry's text and/or image
pub fn edit(
    store: &Store,
    attachments: &AttachmentManager,
    id: i64,
    text: Option<String>,
    image: Option<String>,
    remove_image: bool,
    output: &Output,
) -> Result<()> {
    let current = find_entry(store, id)?;

    let new_text = match text {
        Some(t) => t,
        None => edit_text(&current.text)
            .context("Failed to edit entry text")?
            .trim()
            .to_string(),
    };

    let image_update = if remove_image {
        ImageUpdate::Remove
    } else if let Some(locator) = image {
        let outcome = attachments.attach(&locator);
        if let Some(e) = outcome.grant_error {
            output.warn(&format!(
                "Image saved without a durable read grant; it may not display after a restart: {}",
                e
            ));
        }
        ImageUpdate::Replace(outcome.reference.locator)
    } else {
        ImageUpdate::Keep
    };

    let updated = store
        .update(id, new_text, image_update)
        .context("Failed to update entry")?;

    output.success(&format!("Updated entry {}", updated.id));
    Ok(())
}

/// Delete an entry, with confirmation
pub fn delete(store: &Store, id: i64, yes: bool, output: &Output) -> Result<()> {
    let entry = find_entry(store, id)?;

    if !yes && output.should_prompt() {
        let preview = if entry.text.chars().count() > 50 {
            let cut: String = entry.text.chars().take(50).collect();
            format!("{}...", cut)
        } else {
            entry.text.clone()
        };
        println!(
            "Delete entry {} ({}): {}",
            entry.id,
            entry.created_at,
            preview.replace('\n', " ")
        );
        if !confirm("This cannot be undone. Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.delete(id).context("Failed to delete entry")?;

    output.success(&format!("Deleted entry {}", id));
    Ok(())
}

/// Load the collection and pick out one entry
fn find_entry(store: &Store, id: i64) -> Result<daybook_core::Entry> {
    let entries = store.entries().context("Failed to load journal")?;
    match entries.into_iter().find(|e| e.id == id) {
        Some(entry) => Ok(entry),
        None => bail!("No entry found with id {}", id),
    }
}
