// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Coffer secrets vault.

use strum::Display;
use thiserror::Error;

/// Which structural check rejected a vault file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorruptReason {
    /// File is shorter than magic + version + params length prefix.
    #[error("file too small")]
    TooSmall,

    /// The leading magic literal did not match.
    #[error("bad magic header")]
    BadMagic,

    /// The format version is not the single supported one.
    #[error("unsupported format version {0}")]
    BadVersion(u32),

    /// The declared KDF parameter length runs past the end of the file.
    #[error("KDF parameters truncated")]
    TruncatedParams,

    /// The KDF parameter record could not be parsed or is out of range.
    #[error("malformed KDF parameters: {0}")]
    MalformedParams(String),

    /// Decryption succeeded but the plaintext is not a vault document.
    #[error("malformed vault payload: {0}")]
    MalformedPayload(String),
}

/// Kinds of vault objects addressable by identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ObjectKind {
    Entry,
    Folder,
}

/// The primary error type used across all Coffer crates.
#[derive(Debug, Error)]
pub enum CofferError {
    /// A cipher key was not exactly 256 bits. Indicates caller misuse.
    #[error("invalid key size: expected {expected} bytes, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    /// Authenticated decryption failed. Deliberately does not say whether the
    /// key was wrong or the data was damaged.
    #[error("wrong password or corrupted file")]
    DecryptionFailed,

    /// The on-disk container failed structural validation.
    #[error("corrupt vault: {0}")]
    CorruptVault(#[from] CorruptReason),

    /// The operating system CSPRNG could not be read.
    #[error("system random source unavailable")]
    RandomSourceUnavailable,

    /// Filesystem failure while loading or persisting.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Encoding a value for storage failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// User input rejected by a domain rule; safe to re-prompt.
    #[error("{0}")]
    Validation(String),

    /// An operation needed the master key but the session is locked.
    #[error("vault is locked")]
    VaultLocked,

    /// The on-disk KDF parameters no longer match the ones this session's key
    /// was derived from.
    #[error("vault file was rekeyed outside this session; unlock again")]
    StaleSession,

    /// Too many failed unlock attempts; retry after the cooldown.
    #[error("too many failed unlock attempts, retry in {remaining_secs}s")]
    UnlockThrottled { remaining_secs: u64 },

    /// Lookup by identifier or name found nothing.
    #[error("{kind} not found: {id}")]
    NotFound { kind: ObjectKind, id: String },

    /// One-time code generation or URI parsing failed.
    #[error("totp error: {0}")]
    Totp(String),

    /// Configuration could not be applied.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CofferError {
    /// Wrap an I/O error with a short description of the failed step.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// True for failures a user can fix by retyping input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DecryptionFailed | Self::Validation(_) | Self::UnlockThrottled { .. }
        )
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, CofferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decryption_failed_message_is_generic() {
        let msg = CofferError::DecryptionFailed.to_string();
        assert_eq!(msg, "wrong password or corrupted file");
    }

    #[test]
    fn corrupt_vault_names_failed_check() {
        let err = CofferError::from(CorruptReason::BadVersion(7));
        assert_eq!(err.to_string(), "corrupt vault: unsupported format version 7");

        let err = CofferError::CorruptVault(CorruptReason::TruncatedParams);
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn not_found_renders_kind_lowercase() {
        let err = CofferError::NotFound {
            kind: ObjectKind::Folder,
            id: "abc".into(),
        };
        assert_eq!(err.to_string(), "folder not found: abc");
    }

    #[test]
    fn recoverable_classification() {
        assert!(CofferError::DecryptionFailed.is_recoverable());
        assert!(CofferError::Validation("empty name".into()).is_recoverable());
        assert!(!CofferError::RandomSourceUnavailable.is_recoverable());
        assert!(!CofferError::CorruptVault(CorruptReason::BadMagic).is_recoverable());
    }

    #[test]
    fn io_helper_keeps_source() {
        use std::error::Error as _;
        let err = CofferError::io("failed to rename", std::io::Error::other("boom"));
        assert_eq!(err.to_string(), "failed to rename: boom");
        assert!(err.source().is_some());
    }
}
