// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identifier-scoped mutual exclusion for store mutations.
//!
//! A fixed table of mutexes is indexed by a hash of the identifier. Two
//! mutations on the same identifier always contend for the same shard;
//! unrelated identifiers only collide when they hash to the same shard.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default number of lock shards.
pub const DEFAULT_SHARDS: usize = 64;

#[derive(Debug)]
pub struct KeyedLocks {
    shards: Vec<Mutex<()>>,
}

impl Default for KeyedLocks {
    fn default() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }
}

impl KeyedLocks {
    pub fn with_shards(count: usize) -> Self {
        let shards = (0..count.max(1)).map(|_| Mutex::new(())).collect();
        Self { shards }
    }

    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.shards.len() as u64) as usize
    }

    /// Block until the lock guarding `key` is held.
    pub fn lock(&self, key: &str) -> MutexGuard<'_, ()> {
        self.shards[self.shard_index(key)]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn same_key_maps_to_same_shard() {
        let locks = KeyedLocks::default();
        assert_eq!(locks.shard_index("a.png"), locks.shard_index("a.png"));
    }

    #[test]
    fn zero_shards_is_clamped() {
        let locks = KeyedLocks::with_shards(0);
        let _guard = locks.lock("anything");
    }

    #[test]
    fn same_key_is_mutually_exclusive() {
        let locks = Arc::new(KeyedLocks::default());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let max_seen = Arc::clone(&max_seen);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let _guard = locks.lock("shared.png");
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }
}
