// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path utilities for the flat storage layout.
//!
//! ```text
//! {root}/
//!   {uuid}.{ext}        # one ciphertext file per stored file
//!   .{uuid}.{ext}.tmp   # in-flight write, renamed over the target
//! ```

use std::path::{Path, PathBuf};

/// Default storage root, relative to the working directory.
pub const DEFAULT_ROOT: &str = "upload-dir";

#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

impl StoragePaths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the ciphertext for `id`.
    ///
    /// Callers must check [`is_valid_id`] first.
    pub fn file(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    /// Scratch path used while writing `id`.
    pub fn temp_file(&self, id: &str) -> PathBuf {
        self.root.join(format!(".{id}.tmp"))
    }

    /// Path of a readiness probe artifact. Each check uses its own `token`
    /// so concurrent checks never share a file.
    pub fn health_probe(&self, token: &str) -> PathBuf {
        self.root.join(format!(".health_check.{token}"))
    }

    /// Display form used in listings: `{root}/{id}`.
    pub fn display_path(&self, id: &str) -> String {
        format!("{}/{}", self.root.display(), id)
    }
}

/// Whether `id` can name a stored file.
///
/// Identifiers are single path components: non-empty, no separators, no
/// leading dot, no control characters.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && !id.contains(['/', '\\'])
        && !id.chars().any(char::is_control)
}
