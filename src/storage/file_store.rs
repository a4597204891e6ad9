// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Encrypted, ownership-gated file store.
//!
//! ## Write Path
//!
//! 1. Validate declared format and client secret
//! 2. Encrypt with the process key
//! 3. Write to a scratch file and rename it over `{root}/{id}`
//! 4. Record `(id, secret)` in the ownership ledger
//!
//! The ledger is only touched after the disk step succeeded, so a ledger
//! entry never points at missing content. The reverse (ciphertext on disk
//! with no ledger entry, e.g. after a restart) is tolerated: such files are
//! readable by id but never listed and never mutable.
//!
//! ## Concurrency
//!
//! Create, replace and delete hold the identifier's lock for the whole
//! disk-plus-ledger unit. Reads take no identifier lock; the atomic rename
//! means they observe either the old or the new ciphertext.

use std::fs::{self, File};
use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::crypto::{CryptoEngine, CryptoError};
use super::format::{self, extension_of, probe_content_type, upload_extension};
use super::ledger::OwnershipLedger;
use super::locks::KeyedLocks;
use super::paths::{is_valid_id, StoragePaths};

/// Error taxonomy of the file store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Uploaded file name has no usable extension.
    #[error("file name {0:?} has no usable extension")]
    InvalidFilename(Option<String>),
    /// Declared content type is not on the allow-list.
    #[error("content type {0:?} is not allowed")]
    UnsupportedFormat(Option<String>),
    /// No client secret supplied.
    #[error("client secret is required")]
    AuthorizationRequired,
    /// Client secret does not own the file.
    #[error("client secret does not own {0}")]
    Forbidden(String),
    /// No stored file has this identifier.
    #[error("file not found: {0}")]
    NotFound(String),
    /// Encryption or decryption failed (including tampered ciphertext).
    #[error("crypto failure: {0}")]
    CryptoFailure(#[from] CryptoError),
    /// Filesystem error while reading or writing the storage root.
    #[error("storage failure: {0}")]
    StorageFailure(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One row of the file listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct FileEntry {
    /// File identifier (also the on-disk file name).
    pub name: String,
    /// Location of the ciphertext: `{root}/{id}`.
    pub path: String,
    /// Size of the stored ciphertext in bytes (0 if it could not be read).
    pub size: u64,
    /// File extension of the identifier.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Decrypted file returned by [`FileStore::retrieve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedFile {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

#[derive(Debug)]
pub struct FileStore {
    paths: StoragePaths,
    crypto: CryptoEngine,
    ledger: OwnershipLedger,
    locks: KeyedLocks,
}

impl FileStore {
    pub fn new(paths: StoragePaths, crypto: CryptoEngine) -> Self {
        Self {
            paths,
            crypto,
            ledger: OwnershipLedger::new(),
            locks: KeyedLocks::default(),
        }
    }

    /// Provision the storage root and generate the process key.
    ///
    /// With `purge`, everything under the root is removed first. Leftovers
    /// from a previous process cannot be decrypted anyway.
    pub fn initialize(paths: StoragePaths, purge: bool) -> StoreResult<Self> {
        if purge {
            match fs::remove_dir_all(paths.root()) {
                Ok(()) => tracing::info!(root = %paths.root().display(), "Purged storage root"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        fs::create_dir_all(paths.root())?;

        let crypto = CryptoEngine::generate()?;
        tracing::info!(
            root = %paths.root().display(),
            cipher = crypto.algorithm(),
            "File store initialized"
        );
        Ok(Self::new(paths, crypto))
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn ledger(&self) -> &OwnershipLedger {
        &self.ledger
    }

    // ========== Operations ==========

    /// List every file in the ownership ledger.
    pub fn list(&self) -> Vec<FileEntry> {
        self.ledger
            .ids()
            .into_iter()
            .map(|id| {
                let size = match fs::metadata(self.paths.file(&id)) {
                    Ok(meta) => meta.len(),
                    Err(e) => {
                        tracing::warn!(file_id = %id, error = %e, "Ledger entry has no readable artifact");
                        0
                    }
                };
                FileEntry {
                    path: self.paths.display_path(&id),
                    kind: extension_of(&id).unwrap_or_default().to_string(),
                    size,
                    name: id,
                }
            })
            .collect()
    }

    /// Store a new file and return its identifier.
    pub fn create(
        &self,
        plaintext: &[u8],
        content_type: Option<&str>,
        original_filename: Option<&str>,
        owner_secret: Option<&str>,
    ) -> StoreResult<String> {
        ensure_allowed(content_type)?;
        let secret = owner_secret.ok_or(StoreError::AuthorizationRequired)?;
        let extension = original_filename
            .and_then(upload_extension)
            .ok_or_else(|| StoreError::InvalidFilename(original_filename.map(str::to_string)))?;

        let id = format!("{}.{}", Uuid::new_v4(), extension);
        let _guard = self.locks.lock(&id);

        let ciphertext = self.crypto.encrypt(plaintext)?;
        self.write_atomic(&id, &ciphertext)?;
        self.ledger.record(&id, secret);

        tracing::info!(file_id = %id, size = plaintext.len(), "File created");
        Ok(id)
    }

    /// Read and decrypt a file. Not gated by ownership.
    pub fn retrieve(&self, id: &str) -> StoreResult<RetrievedFile> {
        if !self.artifact_exists(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let ciphertext = match fs::read(self.paths.file(id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let bytes = self.crypto.decrypt(&ciphertext)?;

        tracing::debug!(file_id = %id, size = bytes.len(), "File retrieved");
        Ok(RetrievedFile {
            bytes,
            content_type: probe_content_type(id),
        })
    }

    /// Overwrite the content of an existing file owned by `owner_secret`.
    ///
    /// The identifier (and with it the extension) is preserved.
    pub fn replace(
        &self,
        id: &str,
        plaintext: &[u8],
        content_type: Option<&str>,
        owner_secret: &str,
    ) -> StoreResult<()> {
        let _guard = self.lock_existing(id)?;
        self.ensure_owner(id, owner_secret)?;
        ensure_allowed(content_type)?;

        let ciphertext = self.crypto.encrypt(plaintext)?;
        self.write_atomic(id, &ciphertext)?;
        self.ledger.record(id, owner_secret);

        tracing::info!(file_id = %id, size = plaintext.len(), "File replaced");
        Ok(())
    }

    /// Remove a file owned by `owner_secret`.
    pub fn delete(&self, id: &str, owner_secret: &str) -> StoreResult<()> {
        let _guard = self.lock_existing(id)?;
        self.ensure_owner(id, owner_secret)?;

        fs::remove_file(self.paths.file(id)).map_err(|e| {
            tracing::error!(file_id = %id, error = %e, "Failed to remove validated file");
            StoreError::StorageFailure(e)
        })?;
        self.ledger.forget(id);

        tracing::info!(file_id = %id, "File deleted");
        Ok(())
    }

    /// Encrypt, write, read back and decrypt a probe file.
    pub fn health_check(&self) -> StoreResult<()> {
        let probe = self.paths.health_probe(&Uuid::new_v4().simple().to_string());
        let payload = b"health_check_data";

        fs::write(&probe, self.crypto.encrypt(payload)?)?;
        let read_back = fs::read(&probe);
        fs::remove_file(&probe)?;

        if self.crypto.decrypt(&read_back?)? != payload {
            return Err(StoreError::StorageFailure(io::Error::new(
                io::ErrorKind::InvalidData,
                "health check data mismatch",
            )));
        }
        Ok(())
    }

    // ========== Helpers ==========

    fn artifact_exists(&self, id: &str) -> bool {
        is_valid_id(id) && self.paths.file(id).is_file()
    }

    /// Take the identifier lock, then confirm the artifact is still there.
    fn lock_existing(&self, id: &str) -> StoreResult<std::sync::MutexGuard<'_, ()>> {
        if !is_valid_id(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let guard = self.locks.lock(id);
        if !self.artifact_exists(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(guard)
    }

    fn ensure_owner(&self, id: &str, secret: &str) -> StoreResult<()> {
        if self.ledger.owner_matches(id, secret) {
            Ok(())
        } else {
            tracing::warn!(file_id = %id, "Client secret does not own file");
            Err(StoreError::Forbidden(id.to_string()))
        }
    }

    fn write_atomic(&self, id: &str, data: &[u8]) -> StoreResult<()> {
        let temp_path = self.paths.temp_file(id);
        let write = || -> io::Result<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(data)?;
            file.sync_all()?;
            fs::rename(&temp_path, self.paths.file(id))
        };

        write().map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            tracing::error!(file_id = %id, error = %e, "Failed to persist file");
            StoreError::StorageFailure(e)
        })
    }
}

fn ensure_allowed(content_type: Option<&str>) -> StoreResult<()> {
    if format::is_allowed(content_type) {
        Ok(())
    } else {
        Err(StoreError::UnsupportedFormat(content_type.map(str::to_string)))
    }
}
