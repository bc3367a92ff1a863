// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::CofferConfig;

/// Smallest Argon2id memory cost accepted from configuration (8 MiB).
pub const MIN_KDF_MEMORY_KIB: u32 = 8 * 1024;

/// Largest Argon2id memory cost a vault header may carry (4 GiB).
pub const MAX_KDF_MEMORY_KIB: u32 = 4 * 1024 * 1024;

/// Largest Argon2id pass or lane count a vault header may carry.
pub const MAX_KDF_ITERATIONS: u32 = 64;
pub const MAX_KDF_PARALLELISM: u32 = 64;

/// Shortest generated password the generator supports.
pub const MIN_GENERATED_LENGTH: usize = 4;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns all collected validation errors rather than failing on the first.
pub fn validate_config(config: &CofferConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut invalid = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.vault_path.as_os_str().is_empty() {
        invalid("storage.vault_path must not be empty".to_string());
    }

    let generator = &config.password_generator;
    if generator.length < MIN_GENERATED_LENGTH {
        invalid(format!(
            "password_generator.length must be at least {MIN_GENERATED_LENGTH}, got {}",
            generator.length
        ));
    }
    if !(generator.include_uppercase
        || generator.include_lowercase
        || generator.include_numbers
        || generator.include_symbols)
    {
        invalid("password_generator must enable at least one character set".to_string());
    }

    if config.passphrase_generator.word_count < 1 {
        invalid("passphrase_generator.word_count must be at least 1".to_string());
    }

    if config.kdf.memory_kib < MIN_KDF_MEMORY_KIB {
        invalid(format!(
            "kdf.memory_kib must be at least {MIN_KDF_MEMORY_KIB} (8 MiB), got {}",
            config.kdf.memory_kib
        ));
    }
    if config.kdf.memory_kib > MAX_KDF_MEMORY_KIB {
        invalid(format!(
            "kdf.memory_kib must be at most {MAX_KDF_MEMORY_KIB} (4 GiB), got {}",
            config.kdf.memory_kib
        ));
    }
    if !(1..=MAX_KDF_ITERATIONS).contains(&config.kdf.iterations) {
        invalid(format!(
            "kdf.iterations must be between 1 and {MAX_KDF_ITERATIONS}, got {}",
            config.kdf.iterations
        ));
    }
    if !(1..=MAX_KDF_PARALLELISM).contains(&config.kdf.parallelism) {
        invalid(format!(
            "kdf.parallelism must be between 1 and {MAX_KDF_PARALLELISM}, got {}",
            config.kdf.parallelism
        ));
    }

    if config.security.min_password_length < 1 {
        invalid("security.min_password_length must be at least 1".to_string());
    }

    if config.storage.auto_backup && config.storage.max_backups == 0 {
        invalid("storage.max_backups must be at least 1 when auto_backup is on".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&CofferConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_violation() {
        let mut config = CofferConfig::default();
        config.password_generator.length = 2;
        config.kdf.memory_kib = 1024;
        config.kdf.parallelism = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn rejects_kdf_cost_above_header_limits() {
        let mut config = CofferConfig::default();
        config.kdf.memory_kib = MAX_KDF_MEMORY_KIB + 1;
        config.kdf.iterations = 65;
        config.kdf.parallelism = 1000;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].to_string().contains("at most"));
    }

    #[test]
    fn rejects_generator_without_character_sets() {
        let mut config = CofferConfig::default();
        config.password_generator.include_uppercase = false;
        config.password_generator.include_lowercase = false;
        config.password_generator.include_numbers = false;
        config.password_generator.include_symbols = false;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("at least one character set"));
    }
}
