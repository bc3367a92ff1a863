// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! Sealed blobs are laid out as `nonce (12) || ciphertext || tag (16)`.
//! Every call to [`encrypt`] draws a fresh random 96-bit nonce from the system
//! CSPRNG. Nonce reuse would be catastrophic for GCM security.

use coffer_core::{CofferError, Result};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN as RING_NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Required key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// GCM nonce length in bytes.
pub const NONCE_LEN: usize = RING_NONCE_LEN;

/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Fill `buf` from the operating system CSPRNG.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    SystemRandom::new()
        .fill(buf)
        .map_err(|_| CofferError::RandomSourceUnavailable)
}

/// Build the AEAD key, rejecting anything but a 256-bit key before the
/// cipher is touched.
fn aead_key(key: &[u8]) -> Result<LessSafeKey> {
    if key.len() != KEY_LEN {
        return Err(CofferError::InvalidKeySize {
            expected: KEY_LEN,
            actual: key.len(),
        });
    }
    let unbound = UnboundKey::new(&AES_256_GCM, key).map_err(|_| CofferError::InvalidKeySize {
        expected: KEY_LEN,
        actual: key.len(),
    })?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under `key`, returning `nonce || ciphertext || tag`.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    let key = aead_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    fill_random(&mut nonce_bytes)?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + plaintext.len() + TAG_LEN);
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(plaintext);

    let tag = key
        .seal_in_place_separate_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::empty(),
            &mut sealed[NONCE_LEN..],
        )
        .map_err(|_| CofferError::Internal("AES-256-GCM encryption failed".to_string()))?;
    sealed.extend_from_slice(tag.as_ref());

    Ok(sealed)
}

/// Decrypt a blob produced by [`encrypt`].
///
/// Truncation, tampering, and a wrong key all yield the same
/// [`CofferError::DecryptionFailed`]. The plaintext is returned in a buffer
/// that is wiped when dropped.
pub fn decrypt(sealed: &[u8], key: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let key = aead_key(key)?;

    if sealed.len() < NONCE_LEN {
        return Err(CofferError::DecryptionFailed);
    }
    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
    let nonce =
        Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| CofferError::DecryptionFailed)?;

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let plaintext_len = key
        .open_in_place(nonce, Aad::empty(), in_out.as_mut_slice())
        .map_err(|_| CofferError::DecryptionFailed)?
        .len();
    in_out.truncate(plaintext_len);

    Ok(in_out)
}
