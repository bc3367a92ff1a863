// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed configuration sections.
//!
//! Every section denies unknown keys so a misspelt setting fails loudly
//! instead of silently keeping its default.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Coffer configuration. Every section may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CofferConfig {
    /// Auto-lock, clipboard, and unlock throttling settings.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Defaults for the random password generator.
    #[serde(default)]
    pub password_generator: PasswordGeneratorConfig,

    /// Defaults for the word-based passphrase generator.
    #[serde(default)]
    pub passphrase_generator: PassphraseGeneratorConfig,

    /// Vault file location and backups.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Argon2id cost used when generating fresh parameters.
    #[serde(default)]
    pub kdf: KdfConfig,

    /// Terminal presentation settings.
    #[serde(default)]
    pub ui: UiConfig,
}

/// Security-related settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// Minutes of inactivity before the vault locks itself (0 disables).
    #[serde(default = "default_auto_lock_minutes")]
    pub auto_lock_minutes: u64,

    /// Seconds before copied secrets are wiped from the clipboard (0 disables).
    #[serde(default = "default_clipboard_clear_seconds")]
    pub clipboard_clear_seconds: u64,

    /// Wipe the clipboard when the vault locks.
    #[serde(default = "default_true")]
    pub clear_clipboard_on_lock: bool,

    /// Wipe the clipboard when the shell exits.
    #[serde(default = "default_true")]
    pub clear_clipboard_on_exit: bool,

    /// Consecutive failed unlocks tolerated before a cooldown starts.
    #[serde(default = "default_max_unlock_attempts")]
    pub max_unlock_attempts: u32,

    /// Cooldown length after too many failed unlocks.
    #[serde(default = "default_unlock_cooldown_seconds")]
    pub unlock_cooldown_seconds: u64,

    /// Shortest master password accepted when creating or changing a vault.
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            auto_lock_minutes: default_auto_lock_minutes(),
            clipboard_clear_seconds: default_clipboard_clear_seconds(),
            clear_clipboard_on_lock: true,
            clear_clipboard_on_exit: true,
            max_unlock_attempts: default_max_unlock_attempts(),
            unlock_cooldown_seconds: default_unlock_cooldown_seconds(),
            min_password_length: default_min_password_length(),
        }
    }
}

fn default_auto_lock_minutes() -> u64 {
    5
}

fn default_clipboard_clear_seconds() -> u64 {
    30
}

fn default_max_unlock_attempts() -> u32 {
    5
}

fn default_unlock_cooldown_seconds() -> u64 {
    300
}

fn default_min_password_length() -> usize {
    8
}

fn default_true() -> bool {
    true
}

/// Password generator defaults.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordGeneratorConfig {
    #[serde(default = "default_password_length")]
    pub length: usize,

    #[serde(default = "default_true")]
    pub include_uppercase: bool,

    #[serde(default = "default_true")]
    pub include_lowercase: bool,

    #[serde(default = "default_true")]
    pub include_numbers: bool,

    #[serde(default = "default_true")]
    pub include_symbols: bool,

    /// Drop look-alike characters such as `0`/`O` and `1`/`l`.
    #[serde(default = "default_true")]
    pub exclude_ambiguous: bool,
}

impl Default for PasswordGeneratorConfig {
    fn default() -> Self {
        Self {
            length: default_password_length(),
            include_uppercase: true,
            include_lowercase: true,
            include_numbers: true,
            include_symbols: true,
            exclude_ambiguous: true,
        }
    }
}

fn default_password_length() -> usize {
    16
}

/// Passphrase generator defaults.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PassphraseGeneratorConfig {
    #[serde(default = "default_word_count")]
    pub word_count: usize,

    #[serde(default = "default_separator")]
    pub separator: String,

    #[serde(default = "default_true")]
    pub capitalize: bool,

    #[serde(default = "default_true")]
    pub include_number: bool,
}

impl Default for PassphraseGeneratorConfig {
    fn default() -> Self {
        Self {
            word_count: default_word_count(),
            separator: default_separator(),
            capitalize: true,
            include_number: true,
        }
    }
}

fn default_word_count() -> usize {
    4
}

fn default_separator() -> String {
    "-".to_string()
}

/// Vault storage settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the encrypted vault file.
    #[serde(default = "default_vault_path")]
    pub vault_path: PathBuf,

    /// Directory receiving pre-save copies of the vault file.
    #[serde(default = "default_backup_path")]
    pub backup_path: PathBuf,

    /// Copy the previous vault file into `backup_path` before every save.
    #[serde(default)]
    pub auto_backup: bool,

    /// Number of backups kept; older ones are pruned.
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            vault_path: default_vault_path(),
            backup_path: default_backup_path(),
            auto_backup: false,
            max_backups: default_max_backups(),
        }
    }
}

/// Per-user Coffer directory, `~/.config/coffer` on Linux.
pub fn coffer_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("coffer")
}

fn default_vault_path() -> PathBuf {
    coffer_config_dir().join("vault.enc")
}

fn default_backup_path() -> PathBuf {
    coffer_config_dir().join("backups")
}

fn default_max_backups() -> usize {
    10
}

/// Argon2id cost parameters applied when fresh key-derivation parameters are
/// generated (vault creation and password change). Existing vaults always
/// unlock with the parameters stored in their own file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KdfConfig {
    /// Argon2id iteration count (default: 3).
    #[serde(default = "default_kdf_iterations")]
    pub iterations: u32,

    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB).
    #[serde(default = "default_kdf_memory_kib")]
    pub memory_kib: u32,

    /// Argon2id parallelism lanes (default: 4).
    #[serde(default = "default_kdf_parallelism")]
    pub parallelism: u32,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            iterations: default_kdf_iterations(),
            memory_kib: default_kdf_memory_kib(),
            parallelism: default_kdf_parallelism(),
        }
    }
}

fn default_kdf_iterations() -> u32 {
    3
}

fn default_kdf_memory_kib() -> u32 {
    64 * 1024
}

fn default_kdf_parallelism() -> u32 {
    4
}

/// Terminal presentation settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UiConfig {
    /// Show seconds remaining next to one-time codes.
    #[serde(default = "default_true")]
    pub show_totp_countdown: bool,

    /// `chrono` format string for timestamps.
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_totp_countdown: true,
            date_format: default_date_format(),
            log_level: default_log_level(),
        }
    }
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}
