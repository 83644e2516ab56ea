//! Attachment-reference lifecycle
//!
//! Journal entries can point at an image the app does not own: the
//! locator is selected once, outside the store's control, and must
//! keep resolving across process restarts. The manager converts that
//! transient locator into a durable reference by persisting a read
//! grant for it *before* the locator is ever written into an entry.
//!
//! The platform half of the grant (whatever actually owns the
//! resource) sits behind the `GrantProvider` trait; the default
//! implementation treats locators as filesystem paths. Grants the
//! manager has persisted are recorded in a ledger file next to the
//! journal document.
//!
//! Resolution failures are render-time events: the caller shows the
//! entry without its image, nothing more.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

/// Errors in the attachment-reference lifecycle
///
/// Both variants are non-fatal: a failed grant degrades the reference,
/// a failed resolution degrades the rendering.
#[derive(Error, Debug)]
pub enum AttachmentError {
    /// A durable read grant could not be obtained or persisted
    #[error("Could not persist a read grant for '{locator}': {reason}")]
    Grant { locator: String, reason: String },

    /// A previously stored reference no longer resolves
    #[error("Cannot resolve attachment '{locator}': {reason}")]
    Resolution { locator: String, reason: String },
}

/// A durable reference to an externally-owned resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    /// Opaque resource locator, exactly as stored in the entry
    pub locator: String,
    /// Whether a read grant was persisted for it
    ///
    /// When false, the reference may stop resolving after a restart.
    pub durable: bool,
}

/// Result of attaching a locator
///
/// The locator is always usable for saving (the entry is worth more
/// than the image), but a grant failure is reported so the caller can
/// warn the user that the attachment may not survive a restart.
#[derive(Debug)]
pub struct AttachOutcome {
    pub reference: AttachmentRef,
    pub grant_error: Option<AttachmentError>,
}

/// Platform side of the grant: owns the actual resource access
pub trait GrantProvider {
    /// Acquire a long-lived read grant for the locator
    fn persist_read_grant(&self, locator: &str) -> Result<(), AttachmentError>;

    /// Open the resource behind a granted locator
    fn open(&self, locator: &str) -> Result<PathBuf, AttachmentError>;
}

/// Default provider: locators are plain filesystem paths
///
/// The "grant" amounts to verifying the file is readable now; the
/// durable half is the manager's ledger. External deletion or a
/// permission change later surfaces as a `Resolution` error.
#[derive(Debug, Default)]
pub struct FsGrantProvider;

impl GrantProvider for FsGrantProvider {
    fn persist_read_grant(&self, locator: &str) -> Result<(), AttachmentError> {
        let path = Path::new(locator);
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => Ok(()),
            Ok(_) => Err(AttachmentError::Grant {
                locator: locator.to_string(),
                reason: "not a regular file".to_string(),
            }),
            Err(e) => Err(AttachmentError::Grant {
                locator: locator.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn open(&self, locator: &str) -> Result<PathBuf, AttachmentError> {
        let path = Path::new(locator);
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => Ok(path.to_path_buf()),
            Ok(_) => Err(AttachmentError::Resolution {
                locator: locator.to_string(),
                reason: "not a regular file".to_string(),
            }),
            Err(e) => Err(AttachmentError::Resolution {
                locator: locator.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

/// Makes externally-selected resource locators usable indefinitely
pub struct AttachmentManager<P: GrantProvider = FsGrantProvider> {
    grants_path: PathBuf,
    provider: P,
}

impl AttachmentManager<FsGrantProvider> {
    /// Create a manager with the default filesystem provider
    pub fn new(config: &Config) -> Self {
        Self::with_provider(config.grants_path(), FsGrantProvider)
    }
}

impl<P: GrantProvider> AttachmentManager<P> {
    /// Create a manager with a specific provider and ledger location
    pub fn with_provider(grants_path: PathBuf, provider: P) -> Self {
        Self {
            grants_path,
            provider,
        }
    }

    /// Convert a freshly selected locator into a durable reference
    ///
    /// The grant is requested and recorded before the locator is
    /// returned for storage. On failure the locator still comes back,
    /// degraded, with the error attached for the caller to surface.
    pub fn attach(&self, locator: &str) -> AttachOutcome {
        let granted = self
            .provider
            .persist_read_grant(locator)
            .and_then(|()| self.record_grant(locator));

        match granted {
            Ok(()) => {
                debug!(locator, "persisted read grant for attachment");
                AttachOutcome {
                    reference: AttachmentRef {
                        locator: locator.to_string(),
                        durable: true,
                    },
                    grant_error: None,
                }
            }
            Err(e) => {
                warn!(locator, error = %e, "attachment reference saved without a durable grant");
                AttachOutcome {
                    reference: AttachmentRef {
                        locator: locator.to_string(),
                        durable: false,
                    },
                    grant_error: Some(e),
                }
            }
        }
    }

    /// Resolve a stored reference to the resource it points at
    ///
    /// Fails when no grant was ever persisted, when the grant was
    /// revoked externally, or when the resource itself is gone.
    pub fn resolve(&self, locator: &str) -> Result<PathBuf, AttachmentError> {
        if !self.is_granted(locator) {
            return Err(AttachmentError::Resolution {
                locator: locator.to_string(),
                reason: "no persisted read grant".to_string(),
            });
        }
        self.provider.open(locator)
    }

    /// Whether a grant for the locator is recorded in the ledger
    pub fn is_granted(&self, locator: &str) -> bool {
        self.load_grants().iter().any(|g| g == locator)
    }

    /// Append a locator to the grants ledger
    fn record_grant(&self, locator: &str) -> Result<(), AttachmentError> {
        let mut grants = self.load_grants();
        if grants.iter().any(|g| g == locator) {
            return Ok(());
        }
        grants.push(locator.to_string());
        self.write_grants(&grants).map_err(|reason| AttachmentError::Grant {
            locator: locator.to_string(),
            reason,
        })
    }

    /// Read the grants ledger
    ///
    /// Same recovery posture as the journal itself: missing or
    /// unreadable ledger is an empty one. Old grants are then gone,
    /// which shows up later as resolution failures, not as a crash.
    fn load_grants(&self) -> Vec<String> {
        if !self.grants_path.exists() {
            return Vec::new();
        }
        let content = match fs::read_to_string(&self.grants_path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %self.grants_path.display(), error = %e, "could not read grants ledger");
                return Vec::new();
            }
        };
        match serde_json::from_str(&content) {
            Ok(grants) => grants,
            Err(e) => {
                warn!(path = %self.grants_path.display(), error = %e, "grants ledger is corrupt; treating as empty");
                Vec::new()
            }
        }
    }

    fn write_grants(&self, grants: &[String]) -> Result<(), String> {
        if let Some(parent) = self.grants_path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        // Same temp-and-rename pattern as the journal document
        let temp_path = self.grants_path.with_extension("tmp");
        let bytes = serde_json::to_vec_pretty(grants).map_err(|e| e.to_string())?;
        fs::write(&temp_path, bytes).map_err(|e| e.to_string())?;
        fs::rename(&temp_path, &self.grants_path).map_err(|e| e.to_string())
    }
}
