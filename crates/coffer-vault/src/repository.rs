// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The vault file on disk: load and save pipelines.
//!
//! Save: vault -> JSON -> AES-GCM seal -> container encode -> atomic write.
//! Load: read -> container decode -> AES-GCM open -> JSON -> structural check.

use std::fs;
use std::path::{Path, PathBuf};

use coffer_core::{CofferError, CorruptReason, Result};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::backup::{self, BackupPolicy};
use crate::kdf::{KdfParams, MasterKey};
use crate::model::Vault;
use crate::{container, crypto, persist};

/// Serialize, encrypt and frame a vault into file bytes.
pub fn seal_vault(vault: &Vault, key: &MasterKey, params: &KdfParams) -> Result<Vec<u8>> {
    let plaintext = Zeroizing::new(
        serde_json::to_vec(vault).map_err(|e| CofferError::Serialization(format!("vault: {e}")))?,
    );
    let sealed = crypto::encrypt(&plaintext, key.as_bytes())?;
    container::encode(&params.to_bytes()?, &sealed)
}

/// Decrypt and parse vault file bytes with an already derived key.
pub fn open_vault(file: &[u8], key: &MasterKey) -> Result<Vault> {
    let parts = container::decode(file)?;
    let plaintext = crypto::decrypt(parts.sealed, key.as_bytes())?;
    let vault: Vault = serde_json::from_slice(&plaintext)
        .map_err(|e| CofferError::CorruptVault(CorruptReason::MalformedPayload(e.to_string())))?;
    vault.validate_structure()?;
    Ok(vault)
}

/// Parse the KDF parameters from vault file bytes without decrypting.
pub fn read_params(file: &[u8]) -> Result<KdfParams> {
    KdfParams::from_bytes(container::peek_params(file)?)
}

/// A vault stored as a single file.
#[derive(Debug, Clone)]
pub struct FileRepository {
    path: PathBuf,
    backups: Option<BackupPolicy>,
}

impl FileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backups: None,
        }
    }

    /// Copy the previous file aside before every save.
    pub fn with_backups(mut self, policy: BackupPolicy) -> Self {
        self.backups = Some(policy);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_policy(&self) -> Option<&BackupPolicy> {
        self.backups.as_ref()
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).map_err(|e| {
            CofferError::io(format!("failed to read vault {}", self.path.display()), e)
        })
    }

    /// The KDF parameters currently stored on disk.
    pub fn load_params(&self) -> Result<KdfParams> {
        read_params(&self.read()?)
    }

    pub fn load(&self, key: &MasterKey) -> Result<Vault> {
        let vault = open_vault(&self.read()?, key)?;
        debug!(path = %self.path.display(), entries = vault.entries().len(), "vault loaded");
        Ok(vault)
    }

    pub fn save(&self, vault: &Vault, key: &MasterKey, params: &KdfParams) -> Result<()> {
        let bytes = seal_vault(vault, key, params)?;
        if let Some(policy) = &self.backups {
            backup::backup_file(&self.path, policy)?;
        }
        persist::atomic_write(&self.path, &bytes)?;
        info!(path = %self.path.display(), entries = vault.entries().len(), "vault saved");
        Ok(())
    }
}
