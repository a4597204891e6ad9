// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! At-rest encryption for stored files.
//!
//! A single AES-256-GCM key is drawn from the OS CSPRNG when the engine is
//! created and lives only in process memory. It is never written to disk and
//! never logged: after a restart every previously stored artifact becomes
//! undecryptable.
//!
//! ## Ciphertext Layout
//!
//! ```text
//! [ nonce (12 bytes) ][ ciphertext ][ GCM tag (16 bytes) ]
//! ```

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Size of the AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Bytes added to every plaintext by `encrypt` (nonce + tag).
pub const CIPHERTEXT_OVERHEAD: usize = NONCE_LEN + 16;

/// Errors raised by the crypto engine.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("secure random source unavailable")]
    Randomness,
    #[error("cipher rejected the key")]
    InvalidKey,
    #[error("encryption failed")]
    Seal,
    #[error("ciphertext too short ({0} bytes)")]
    Truncated(usize),
    #[error("decryption failed: wrong key or tampered ciphertext")]
    Open,
}

/// Process-lifetime symmetric cipher.
pub struct CryptoEngine {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl std::fmt::Debug for CryptoEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoEngine")
            .field("algorithm", &"AES-256-GCM")
            .finish_non_exhaustive()
    }
}

impl CryptoEngine {
    /// Generate a fresh random key.
    pub fn generate() -> Result<Self, CryptoError> {
        let rng = SystemRandom::new();
        let mut raw = Zeroizing::new([0u8; KEY_LEN]);
        rng.fill(&mut raw[..]).map_err(|_| CryptoError::Randomness)?;
        Self::from_key_bytes(&raw, rng)
    }

    fn from_key_bytes(raw: &[u8; KEY_LEN], rng: SystemRandom) -> Result<Self, CryptoError> {
        let unbound = UnboundKey::new(&AES_256_GCM, raw).map_err(|_| CryptoError::InvalidKey)?;
        Ok(Self {
            key: LessSafeKey::new(unbound),
            rng,
        })
    }

    /// Encrypt a whole buffer. A fresh nonce is drawn for every call.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| CryptoError::Randomness)?;
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut output = Vec::with_capacity(plaintext.len() + CIPHERTEXT_OVERHEAD);
        output.extend_from_slice(&nonce_bytes);
        output.extend_from_slice(plaintext);

        let tag = self
            .key
            .seal_in_place_separate_tag(nonce, Aad::empty(), &mut output[NONCE_LEN..])
            .map_err(|_| CryptoError::Seal)?;
        output.extend_from_slice(tag.as_ref());
        Ok(output)
    }

    /// Decrypt a buffer produced by [`CryptoEngine::encrypt`] under this key.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if ciphertext.len() < CIPHERTEXT_OVERHEAD {
            return Err(CryptoError::Truncated(ciphertext.len()));
        }

        let (nonce_bytes, sealed) = ciphertext.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| CryptoError::Open)?;

        let mut buffer = sealed.to_vec();
        let plaintext_len = self
            .key
            .open_in_place(nonce, Aad::empty(), &mut buffer)
            .map_err(|_| CryptoError::Open)?
            .len();
        buffer.truncate(plaintext_len);
        Ok(buffer)
    }

    /// Name of the cipher, for startup logs.
    pub fn algorithm(&self) -> &'static str {
        "AES-256-GCM"
    }
}
