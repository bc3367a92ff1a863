// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Coffer configuration.
//!
//! Settings come from TOML files and `COFFER_*` environment variables,
//! merged with figment over compiled defaults. Every section rejects
//! unknown keys, and all problems (parse and semantic) are returned
//! together as [`ConfigError`] diagnostics.
//!
//! The vault crates never read configuration themselves; the binary loads a
//! [`CofferConfig`] here and hands the relevant values down.
//!
//! ```no_run
//! let config = coffer_config::load_and_validate().expect("config errors");
//! println!("vault: {}", config.storage.vault_path.display());
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::CofferConfig;

fn checked(
    loaded: Result<CofferConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<CofferConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| ConfigError::from_figment(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Load configuration from the standard file hierarchy and validate it.
pub fn load_and_validate() -> Result<CofferConfig, Vec<ConfigError>> {
    checked(loader::load_config(), hierarchy_sources)
}

/// Load an explicitly named file (plus env overrides) and validate it. The
/// file must exist.
pub fn load_and_validate_path(path: &Path) -> Result<CofferConfig, Vec<ConfigError>> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        vec![ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        }]
    })?;
    checked(loader::load_config_from_path(path), || {
        vec![(path.display().to_string(), content)]
    })
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<CofferConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Contents of whichever hierarchy files exist, for error spans.
fn hierarchy_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|dir| dir.join(loader::LOCAL_CONFIG_FILE))
        .unwrap_or_else(|_| loader::LOCAL_CONFIG_FILE.into());

    [
        local,
        loader::user_config_path(),
        loader::SYSTEM_CONFIG_PATH.into(),
    ]
    .into_iter()
    .filter_map(|path| {
        let content = std::fs::read_to_string(&path).ok()?;
        Some((path.display().to_string(), content))
    })
    .collect()
}
