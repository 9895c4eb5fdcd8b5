//! Storage for downloaded files.
//!
//! Downloads are written straight into the destination directory. The
//! directory contents double as the record of what was already saved: a
//! file's digest is recomputed from disk whenever its name comes up again.

pub mod local;

use std::path::{Path, PathBuf};

// Re-export for convenience
pub use local::{LocalStore, content_digest};

/// What happened to a downloaded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// Written to `path`.
    Saved { path: PathBuf, digest: String },
    /// Byte-identical content already exists at `path`; nothing written.
    Duplicate { path: PathBuf, digest: String },
}

impl StoreOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Saved { path, .. } | Self::Duplicate { path, .. } => path,
        }
    }

    pub fn digest(&self) -> &str {
        match self {
            Self::Saved { digest, .. } | Self::Duplicate { digest, .. } => digest,
        }
    }
}
