// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted storage engine for the Coffer secrets vault.
//!
//! A vault file is a small binary container holding the Argon2id parameters
//! used to derive the master key and the AES-256-GCM sealed JSON document.
//! Writes go through a temp-file-and-rename protocol so the file on disk is
//! always either the previous complete vault or the new complete vault.

pub mod backup;
pub mod container;
pub mod crypto;
pub mod kdf;
pub mod model;
pub mod persist;
pub mod prompt;
pub mod repository;
pub mod session;

pub use backup::BackupPolicy;
pub use kdf::{KdfCost, KdfParams, MasterKey};
pub use model::{Entry, EntryKind, EntryType, Folder, Settings, Vault, mask_secret};
pub use repository::FileRepository;
pub use session::{Session, SessionOptions, validate_new_password};
