// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership ledger: which client secret created which file.
//!
//! The ledger is the authoritative index of stored files. It lives only in
//! memory and starts empty on every boot, so files written by a previous
//! process are neither listed nor mutable.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory map from file identifier to owner secret.
#[derive(Debug, Default)]
pub struct OwnershipLedger {
    owners: RwLock<HashMap<String, String>>,
}

impl OwnershipLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the map half-updated
    // (every mutation is a single insert/remove), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.owners.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.owners.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or overwrite the owner of `id`.
    pub fn record(&self, id: &str, secret: &str) {
        self.write().insert(id.to_string(), secret.to_string());
    }

    /// True iff `id` is recorded with exactly this secret.
    pub fn owner_matches(&self, id: &str, secret: &str) -> bool {
        self.read()
            .get(id)
            .is_some_and(|owner| owner.as_bytes() == secret.as_bytes())
    }

    /// Drop the entry for `id`, if any.
    pub fn forget(&self, id: &str) {
        self.write().remove(id);
    }

    pub fn exists(&self, id: &str) -> bool {
        self.read().contains_key(id)
    }

    /// Sorted snapshot of every recorded identifier.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
