// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered loading with figment.
//!
//! Precedence, highest first: `COFFER_*` variables, `./coffer.toml`, the
//! per-user file, `/etc/coffer/coffer.toml`, compiled defaults.

#![allow(clippy::result_large_err)] // figment::Error

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::{coffer_config_dir, CofferConfig};

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/coffer/coffer.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "coffer.toml";

/// Path of the per-user configuration file.
pub fn user_config_path() -> PathBuf {
    coffer_config_dir().join("coffer.toml")
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/coffer/coffer.toml` (system-wide)
/// 3. `~/.config/coffer/coffer.toml` (user XDG config)
/// 4. `./coffer.toml` (local directory)
/// 5. `COFFER_*` environment variables
pub fn load_config() -> Result<CofferConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<CofferConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CofferConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CofferConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CofferConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CofferConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `COFFER_SECURITY_AUTO_LOCK_MINUTES` must map to
/// `security.auto_lock_minutes`, not `security.auto.lock.minutes`.
fn env_provider() -> Env {
    Env::prefixed("COFFER_")
        .ignore(&["password"])
        .map(|key| {
            let key_str = key.as_str();
            let mapped = key_str
                .replacen("security_", "security.", 1)
                .replacen("password_generator_", "password_generator.", 1)
                .replacen("passphrase_generator_", "passphrase_generator.", 1)
                .replacen("storage_", "storage.", 1)
                .replacen("kdf_", "kdf.", 1)
                .replacen("ui_", "ui.", 1);
            mapped.into()
        })
}
