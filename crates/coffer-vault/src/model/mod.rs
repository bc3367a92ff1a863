// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory representation of a decrypted vault.

pub mod entry;
pub mod folder;
pub mod vault;

pub use entry::{CardData, Entry, EntryKind, EntryType, IdentityData, LoginData, mask_secret};
pub use folder::Folder;
pub use vault::{Settings, VAULT_VERSION, Vault};
