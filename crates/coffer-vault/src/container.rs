// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Binary layout of a vault file.
//!
//! ```text
//! magic (8) | version u32 LE | params_len u32 LE | params (params_len) | sealed payload
//! ```
//!
//! The sealed payload is the AES-GCM blob produced by [`crate::crypto::encrypt`].

use coffer_core::{CofferError, CorruptReason, Result};

/// Fixed file signature.
pub const MAGIC: &[u8; 8] = b"PMVAULT1";

/// The single supported format version.
pub const FORMAT_VERSION: u32 = 1;

/// Smallest well-formed file: magic, version and the params length prefix.
pub const MIN_LEN: usize = MAGIC.len() + 4 + 4;

/// Borrowed view of a decoded container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container<'a> {
    pub params: &'a [u8],
    pub sealed: &'a [u8],
}

/// Assemble a vault file from the params record and the sealed payload.
pub fn encode(params: &[u8], sealed: &[u8]) -> Result<Vec<u8>> {
    let params_len = u32::try_from(params.len())
        .map_err(|_| CofferError::Serialization("KDF parameter record too large".to_string()))?;

    let mut out = Vec::with_capacity(MIN_LEN + params.len() + sealed.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&params_len.to_le_bytes());
    out.extend_from_slice(params);
    out.extend_from_slice(sealed);
    Ok(out)
}

/// Split a vault file into its params record and sealed payload.
///
/// Checks run in a fixed order (size, magic, version, params length) and
/// the first failure is reported.
pub fn decode(bytes: &[u8]) -> Result<Container<'_>> {
    if bytes.len() < MIN_LEN {
        return Err(CorruptReason::TooSmall.into());
    }
    let (magic, rest) = bytes.split_at(MAGIC.len());
    if magic != MAGIC {
        return Err(CorruptReason::BadMagic.into());
    }
    let (version, rest) = split_u32(rest);
    if version != FORMAT_VERSION {
        return Err(CorruptReason::BadVersion(version).into());
    }
    let (params_len, rest) = split_u32(rest);
    let params_len = params_len as usize;
    if rest.len() < params_len {
        return Err(CorruptReason::TruncatedParams.into());
    }
    let (params, sealed) = rest.split_at(params_len);
    Ok(Container { params, sealed })
}

/// Only the params record, for callers that need to derive a key before
/// touching the payload.
pub fn peek_params(bytes: &[u8]) -> Result<&[u8]> {
    decode(bytes).map(|container| container.params)
}

fn split_u32(bytes: &[u8]) -> (u32, &[u8]) {
    let (head, rest) = bytes.split_at(4);
    let mut word = [0u8; 4];
    word.copy_from_slice(head);
    (u32::from_le_bytes(word), rest)
}
