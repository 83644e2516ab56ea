//! Data models for daybook
//!
//! Defines the journal entry and the intents used to create and update
//! one. The serialized field names (`uniqueId`, `timestamp`, `text`,
//! `imageUri`) are the journal's on-disk wire format and must not
//! change; unknown fields in stored objects are ignored on read.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Display format for entry creation timestamps.
///
/// This is a presentation string, not a sortable key. It is assigned
/// once at creation and never updated.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A single journal entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    /// Unique identifier, assigned at creation, immutable thereafter
    #[serde(rename = "uniqueId")]
    pub id: i64,
    /// Display-formatted creation timestamp, never updated on edit
    #[serde(rename = "timestamp")]
    pub created_at: String,
    /// Free text, may be empty when an image is attached
    #[serde(default)]
    pub text: String,
    /// Opaque locator for an externally-owned image, if one is attached
    #[serde(rename = "imageUri", default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl Entry {
    /// Create a new entry with the given id, stamped with the current
    /// local time
    pub fn new(id: i64, text: impl Into<String>, image_ref: Option<String>) -> Self {
        Self {
            id,
            created_at: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            text: text.into(),
            image_ref,
        }
    }

    /// An entry is persistable only if it has trimmed text or an image
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty() || self.image_ref.is_some()
    }
}

/// Candidate for a new entry, before id and timestamp are assigned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    /// Entry text, may be empty if an image is given
    pub text: String,
    /// Attachment reference, if an image was selected
    pub image_ref: Option<String>,
}

impl EntryDraft {
    /// Draft with text only
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image_ref: None,
        }
    }

    /// Draft with text and an image reference
    pub fn with_image(text: impl Into<String>, image_ref: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image_ref: Some(image_ref.into()),
        }
    }

    /// Whether this draft can be persisted at all
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty() || self.image_ref.is_some()
    }
}

/// Intent for the image field of an update
///
/// "No new image selected" and "remove the image" are different user
/// actions, so the update API makes all three outcomes explicit
/// instead of inferring them from an optional value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageUpdate {
    /// Leave the existing image reference untouched
    Keep,
    /// Replace the image reference with a new one
    Replace(String),
    /// Remove the image reference entirely
    Remove,
}
