// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id key derivation from a master password.
//!
//! The parameters (cost, salt, output length) travel with the vault file as a
//! small JSON record, so a vault can always be reopened with exactly the
//! settings it was created with, even after the defaults change.

use std::fmt;

use coffer_core::{CofferError, CorruptReason, Result};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::{self, KEY_LEN};

/// The only supported algorithm identifier.
pub const ALGORITHM: &str = "argon2id";

/// Salt length generated for new vaults.
pub const SALT_LEN: usize = 32;

/// Argon2 rejects salts shorter than this.
const MIN_SALT_LEN: usize = 8;

/// Largest memory cost accepted from a vault header (4 GiB).
pub const MAX_MEMORY_KIB: u32 = 4 * 1024 * 1024;

/// Largest pass count accepted from a vault header.
pub const MAX_ITERATIONS: u32 = 64;

/// Largest lane count accepted from a vault header.
pub const MAX_PARALLELISM: u32 = 64;

/// Tunable Argon2id cost factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfCost {
    pub iterations: u32,
    pub memory_kib: u32,
    pub parallelism: u32,
}

impl Default for KdfCost {
    fn default() -> Self {
        Self {
            iterations: 3,
            memory_kib: 64 * 1024,
            parallelism: 4,
        }
    }
}

/// Parameters needed to re-derive a vault's master key.
///
/// Serialized as JSON with the salt encoded as standard base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub algorithm: String,
    pub iterations: u32,
    /// Memory cost in KiB.
    pub memory: u32,
    pub parallelism: u32,
    #[serde(with = "base64_bytes")]
    pub salt: Vec<u8>,
    pub key_length: u32,
}

impl KdfParams {
    /// Fresh parameters with a random salt. Fails when `cost` is outside what
    /// [`KdfParams::validate`] accepts, so no vault is written that could not
    /// be reopened.
    pub fn generate(cost: KdfCost) -> Result<Self> {
        let mut salt = vec![0u8; SALT_LEN];
        crypto::fill_random(&mut salt)?;
        let params = Self {
            algorithm: ALGORITHM.to_string(),
            iterations: cost.iterations,
            memory: cost.memory_kib,
            parallelism: cost.parallelism,
            salt,
            key_length: KEY_LEN as u32,
        };
        params.validate()?;
        Ok(params)
    }

    /// Fresh parameters at the default cost.
    pub fn default_params() -> Result<Self> {
        Self::generate(KdfCost::default())
    }

    pub fn cost(&self) -> KdfCost {
        KdfCost {
            iterations: self.iterations,
            memory_kib: self.memory,
            parallelism: self.parallelism,
        }
    }

    /// Check that these parameters can actually drive Argon2id and produce a
    /// 256-bit key at a cost this machine can pay. The record comes from the
    /// file header, so an absurd cost is treated as corruption rather than
    /// handed to the allocator.
    pub fn validate(&self) -> Result<()> {
        let malformed = |msg: String| CofferError::CorruptVault(CorruptReason::MalformedParams(msg));

        if self.algorithm != ALGORITHM {
            return Err(malformed(format!(
                "unsupported algorithm '{}'",
                self.algorithm
            )));
        }
        if self.key_length as usize != KEY_LEN {
            return Err(malformed(format!(
                "key_length must be {KEY_LEN}, got {}",
                self.key_length
            )));
        }
        if self.salt.len() < MIN_SALT_LEN {
            return Err(malformed(format!(
                "salt must be at least {MIN_SALT_LEN} bytes, got {}",
                self.salt.len()
            )));
        }
        if self.memory > MAX_MEMORY_KIB {
            return Err(malformed(format!(
                "memory must be at most {MAX_MEMORY_KIB} KiB, got {}",
                self.memory
            )));
        }
        if self.iterations > MAX_ITERATIONS {
            return Err(malformed(format!(
                "iterations must be at most {MAX_ITERATIONS}, got {}",
                self.iterations
            )));
        }
        if self.parallelism > MAX_PARALLELISM {
            return Err(malformed(format!(
                "parallelism must be at most {MAX_PARALLELISM}, got {}",
                self.parallelism
            )));
        }
        argon2_params(self).map(|_| ())
    }

    /// Encode as the JSON record stored in the vault header.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| CofferError::Serialization(format!("KDF parameters: {e}")))
    }

    /// Decode and validate a JSON parameter record.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let params: Self = serde_json::from_slice(bytes).map_err(|e| {
            CofferError::CorruptVault(CorruptReason::MalformedParams(e.to_string()))
        })?;
        params.validate()?;
        Ok(params)
    }
}

fn argon2_params(params: &KdfParams) -> Result<argon2::Params> {
    argon2::Params::new(
        params.memory,
        params.iterations,
        params.parallelism,
        Some(params.key_length as usize),
    )
    .map_err(|e| CofferError::CorruptVault(CorruptReason::MalformedParams(e.to_string())))
}

/// A derived 256-bit master key, wiped from memory on drop.
#[derive(Clone)]
pub struct MasterKey(Zeroizing<[u8; KEY_LEN]>);

impl MasterKey {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// Derive the master key for `password` with Argon2id (version 0x13).
///
/// Deterministic for a given password and parameter record.
pub fn derive_key(password: &[u8], params: &KdfParams) -> Result<MasterKey> {
    params.validate()?;
    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params(params)?,
    );

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password, &params.salt, output.as_mut())
        .map_err(|e| CofferError::Internal(format!("Argon2id key derivation failed: {e}")))?;

    Ok(MasterKey(output))
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
