// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Encrypted Storage Module
//!
//! Flat, encrypted-at-rest file storage gated by client-secret ownership.
//!
//! ## Security Model
//!
//! - File content is encrypted with AES-256-GCM before it reaches the disk
//! - The key is generated at startup and held only in memory
//! - Mutations require the client secret that created the file
//! - Reads are not ownership-gated: anyone holding an id may download it
//!
//! ## Volatility
//!
//! Both the key and the ownership ledger are lost on restart. Artifacts left
//! on disk by a previous process can neither be decrypted nor mutated.

pub mod crypto;
pub mod file_store;
pub mod format;
pub mod ledger;
pub mod locks;
pub mod paths;

pub use crypto::{CryptoEngine, CryptoError};
pub use file_store::{FileEntry, FileStore, RetrievedFile, StoreError, StoreResult};
pub use format::FileFormat;
pub use ledger::OwnershipLedger;
pub use paths::StoragePaths;
