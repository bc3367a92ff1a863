// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The unlock session: sole owner of the master key and the open vault.
//!
//! A [`Session`] is either locked (holds nothing secret) or unlocked (holds
//! the derived key, the KDF parameters it came from, and the decrypted
//! vault). Locking wipes both the key and the vault contents.

use std::time::{Duration, Instant};

use coffer_core::{CofferError, Result};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use crate::kdf::{self, KdfCost, KdfParams, MasterKey};
use crate::model::{Settings, Vault};
use crate::repository::{self, FileRepository};

/// Knobs the application supplies from its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Cost used for newly generated KDF parameters.
    pub kdf_cost: KdfCost,
    pub min_password_length: usize,
    /// Consecutive wrong passwords allowed before unlocking is paused.
    /// Zero disables throttling.
    pub max_unlock_attempts: u32,
    pub unlock_cooldown: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            kdf_cost: KdfCost::default(),
            min_password_length: 8,
            max_unlock_attempts: 5,
            unlock_cooldown: Duration::from_secs(300),
        }
    }
}

/// Check a new master password and its confirmation.
pub fn validate_new_password(password: &str, confirm: &str, min_length: usize) -> Result<()> {
    if password != confirm {
        return Err(CofferError::Validation("passwords do not match".to_string()));
    }
    check_length(password, min_length)
}

fn check_length(password: &str, min_length: usize) -> Result<()> {
    if password.chars().count() < min_length {
        return Err(CofferError::Validation(format!(
            "password must be at least {min_length} characters"
        )));
    }
    Ok(())
}

#[derive(Debug, Default)]
struct UnlockThrottle {
    failures: u32,
    paused_until: Option<Instant>,
}

impl UnlockThrottle {
    fn check(&mut self, now: Instant) -> Result<()> {
        match self.paused_until {
            Some(until) if now < until => Err(CofferError::UnlockThrottled {
                remaining_secs: (until - now).as_secs().max(1),
            }),
            Some(_) => {
                self.paused_until = None;
                self.failures = 0;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn record_failure(&mut self, now: Instant, options: &SessionOptions) {
        self.failures += 1;
        if options.max_unlock_attempts > 0 && self.failures >= options.max_unlock_attempts {
            warn!(
                failures = self.failures,
                cooldown_secs = options.unlock_cooldown.as_secs(),
                "too many failed unlock attempts"
            );
            self.paused_until = Some(now + options.unlock_cooldown);
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

struct Unlocked {
    key: MasterKey,
    params: KdfParams,
    vault: Vault,
}

pub struct Session {
    repository: FileRepository,
    options: SessionOptions,
    unlocked: Option<Unlocked>,
    throttle: UnlockThrottle,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("path", &self.repository.path())
            .field("unlocked", &self.is_unlocked())
            .field("master_key", &"[REDACTED]")
            .finish()
    }
}

impl Session {
    pub fn new(repository: FileRepository, options: SessionOptions) -> Self {
        Self {
            repository,
            options,
            unlocked: None,
            throttle: UnlockThrottle::default(),
        }
    }

    pub fn repository(&self) -> &FileRepository {
        &self.repository
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn vault_exists(&self) -> bool {
        self.repository.exists()
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked.is_some()
    }

    pub fn vault(&self) -> Result<&Vault> {
        self.unlocked
            .as_ref()
            .map(|u| &u.vault)
            .ok_or(CofferError::VaultLocked)
    }

    pub fn vault_mut(&mut self) -> Result<&mut Vault> {
        self.unlocked
            .as_mut()
            .map(|u| &mut u.vault)
            .ok_or(CofferError::VaultLocked)
    }

    /// Create and persist a new empty vault protected by `password`.
    pub fn create_vault(&mut self, password: &SecretString) -> Result<&mut Vault> {
        self.create_vault_with(password, Settings::default())
    }

    pub fn create_vault_with(
        &mut self,
        password: &SecretString,
        settings: Settings,
    ) -> Result<&mut Vault> {
        if self.repository.exists() {
            return Err(CofferError::Validation(format!(
                "a vault already exists at {}",
                self.repository.path().display()
            )));
        }
        check_length(password.expose_secret(), self.options.min_password_length)?;

        self.lock();
        let params = KdfParams::generate(self.options.kdf_cost)?;
        let key = kdf::derive_key(password.expose_secret().as_bytes(), &params)?;
        let vault = Vault::with_settings(settings);
        self.repository.save(&vault, &key, &params)?;

        info!(path = %self.repository.path().display(), "vault created");
        Ok(&mut self.unlocked.insert(Unlocked { key, params, vault }).vault)
    }

    /// Unlock the vault file with `password`.
    ///
    /// The key is always derived from the parameters stored in the file,
    /// never from the current defaults.
    pub fn unlock(&mut self, password: &SecretString) -> Result<&mut Vault> {
        self.throttle.check(Instant::now())?;
        self.lock();

        let file = self.repository.read()?;
        let params = repository::read_params(&file)?;
        let key = kdf::derive_key(password.expose_secret().as_bytes(), &params)?;

        let vault = match repository::open_vault(&file, &key) {
            Ok(vault) => vault,
            Err(CofferError::DecryptionFailed) => {
                self.throttle.record_failure(Instant::now(), &self.options);
                warn!(path = %self.repository.path().display(), "unlock failed");
                return Err(CofferError::DecryptionFailed);
            }
            Err(e) => return Err(e),
        };

        self.throttle.reset();
        info!(
            path = %self.repository.path().display(),
            entries = vault.entries().len(),
            "vault unlocked"
        );
        Ok(&mut self.unlocked.insert(Unlocked { key, params, vault }).vault)
    }

    /// Persist the open vault.
    ///
    /// The KDF parameters are re-read from disk first. If another process
    /// re-keyed the file since this session unlocked it, saving with the old
    /// key would make the file unreadable, so the save is refused.
    pub fn save(&mut self) -> Result<()> {
        let state = self.unlocked.as_ref().ok_or(CofferError::VaultLocked)?;

        if self.repository.exists() {
            let on_disk = self.repository.load_params()?;
            if on_disk != state.params {
                warn!(path = %self.repository.path().display(), "vault parameters changed on disk");
                return Err(CofferError::StaleSession);
            }
            self.repository.save(&state.vault, &state.key, &on_disk)
        } else {
            self.repository.save(&state.vault, &state.key, &state.params)
        }
    }

    /// Re-encrypt the vault under a new password with fresh KDF parameters.
    pub fn change_password(&mut self, current: &SecretString, new: &SecretString) -> Result<()> {
        let state = self.unlocked.as_ref().ok_or(CofferError::VaultLocked)?;

        // Verify against what is on disk, not against the in-memory key.
        let file = self.repository.read()?;
        let params = repository::read_params(&file)?;
        if params != state.params {
            return Err(CofferError::StaleSession);
        }
        let check_key = kdf::derive_key(current.expose_secret().as_bytes(), &params)?;
        drop(repository::open_vault(&file, &check_key)?);

        check_length(new.expose_secret(), self.options.min_password_length)?;

        let new_params = KdfParams::generate(self.options.kdf_cost)?;
        let new_key = kdf::derive_key(new.expose_secret().as_bytes(), &new_params)?;
        self.repository.save(&state.vault, &new_key, &new_params)?;

        if let Some(state) = self.unlocked.as_mut() {
            state.key = new_key;
            state.params = new_params;
        }
        info!(path = %self.repository.path().display(), "master password changed");
        Ok(())
    }

    /// Wipe the key and the decrypted vault. Returns whether anything was
    /// unlocked; calling it on a locked session does nothing.
    pub fn lock(&mut self) -> bool {
        match self.unlocked.take() {
            // Dropping zeroes the key buffer and the vault contents.
            Some(state) => {
                drop(state);
                info!("vault locked");
                true
            }
            None => false,
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.lock();
    }
}
