// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Random passwords drawn from selectable character classes.

use coffer_config::model::PasswordGeneratorConfig;
use coffer_core::{CofferError, Result};
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::{CryptoRng, Rng};

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const NUMBERS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()-_=+[]{}|;:,.<>?";
/// Characters that are easy to confuse in many fonts.
pub const AMBIGUOUS: &str = "0O1lI";

pub const MIN_LENGTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordOptions {
    pub length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub symbols: bool,
    pub exclude_ambiguous: bool,
    /// Minimum characters from each enabled class.
    pub min_uppercase: usize,
    pub min_lowercase: usize,
    pub min_numbers: usize,
    pub min_symbols: usize,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            length: 16,
            uppercase: true,
            lowercase: true,
            numbers: true,
            symbols: true,
            exclude_ambiguous: true,
            min_uppercase: 1,
            min_lowercase: 1,
            min_numbers: 1,
            min_symbols: 1,
        }
    }
}

impl From<&PasswordGeneratorConfig> for PasswordOptions {
    fn from(config: &PasswordGeneratorConfig) -> Self {
        Self {
            length: config.length,
            uppercase: config.include_uppercase,
            lowercase: config.include_lowercase,
            numbers: config.include_numbers,
            symbols: config.include_symbols,
            exclude_ambiguous: config.exclude_ambiguous,
            ..Self::default()
        }
    }
}

impl PasswordOptions {
    fn classes(&self) -> Vec<(Vec<char>, usize)> {
        let filter = |set: &str| -> Vec<char> {
            set.chars()
                .filter(|c| !(self.exclude_ambiguous && AMBIGUOUS.contains(*c)))
                .collect()
        };
        [
            (self.uppercase, UPPERCASE, self.min_uppercase),
            (self.lowercase, LOWERCASE, self.min_lowercase),
            (self.numbers, NUMBERS, self.min_numbers),
            (self.symbols, SYMBOLS, self.min_symbols),
        ]
        .into_iter()
        .filter(|(enabled, _, _)| *enabled)
        .map(|(_, set, min)| (filter(set), min))
        .collect()
    }
}

/// Generate a password from the operating system CSPRNG.
pub fn generate_password(options: &PasswordOptions) -> Result<String> {
    generate_password_with(&mut OsRng, options)
}

pub fn generate_password_with<R: Rng + CryptoRng>(
    rng: &mut R,
    options: &PasswordOptions,
) -> Result<String> {
    if options.length < MIN_LENGTH {
        return Err(CofferError::Validation(format!(
            "password length must be at least {MIN_LENGTH}"
        )));
    }
    let classes = options.classes();
    if classes.is_empty() {
        return Err(CofferError::Validation(
            "no character sets selected".to_string(),
        ));
    }
    let required: usize = classes.iter().map(|(_, min)| min).sum();
    if required > options.length {
        return Err(CofferError::Validation(
            "minimum character requirements exceed password length".to_string(),
        ));
    }

    let pool: Vec<char> = classes.iter().flat_map(|(set, _)| set.iter().copied()).collect();

    let mut password: Vec<char> = Vec::with_capacity(options.length);
    for (set, min) in &classes {
        for _ in 0..*min {
            password.push(set[rng.gen_range(0..set.len())]);
        }
    }
    while password.len() < options.length {
        password.push(pool[rng.gen_range(0..pool.len())]);
    }
    password.shuffle(rng);

    Ok(password.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn default_password_has_every_class() {
        let password = generate_password(&PasswordOptions::default()).unwrap();
        assert_eq!(password.chars().count(), 16);
        assert!(password.chars().any(|c| c.is_ascii_uppercase()));
        assert!(password.chars().any(|c| c.is_ascii_lowercase()));
        assert!(password.chars().any(|c| c.is_ascii_digit()));
        assert!(password.chars().any(|c| SYMBOLS.contains(c)));
        assert!(!password.chars().any(|c| AMBIGUOUS.contains(c)));
    }

    #[test]
    fn too_short_rejected() {
        let options = PasswordOptions {
            length: 3,
            ..PasswordOptions::default()
        };
        assert!(matches!(generate_password(&options), Err(CofferError::Validation(_))));
    }

    #[test]
    fn no_classes_rejected() {
        let options = PasswordOptions {
            uppercase: false,
            lowercase: false,
            numbers: false,
            symbols: false,
            ..PasswordOptions::default()
        };
        assert!(generate_password(&options).is_err());
    }

    #[test]
    fn minimums_exceeding_length_rejected() {
        let options = PasswordOptions {
            length: 5,
            min_numbers: 3,
            min_symbols: 3,
            ..PasswordOptions::default()
        };
        assert!(generate_password(&options).is_err());
    }

    #[test]
    fn digits_only_with_ambiguous_excluded() {
        let options = PasswordOptions {
            length: 32,
            uppercase: false,
            lowercase: false,
            symbols: false,
            ..PasswordOptions::default()
        };
        let password = generate_password(&options).unwrap();
        assert!(password.chars().all(|c| c.is_ascii_digit() && c != '0' && c != '1'));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let options = PasswordOptions::default();
        let a = generate_password_with(&mut StdRng::seed_from_u64(7), &options).unwrap();
        let b = generate_password_with(&mut StdRng::seed_from_u64(7), &options).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn config_maps_to_options() {
        let config = PasswordGeneratorConfig {
            length: 24,
            include_symbols: false,
            ..PasswordGeneratorConfig::default()
        };
        let options = PasswordOptions::from(&config);
        assert_eq!(options.length, 24);
        assert!(!options.symbols);
        let password = generate_password(&options).unwrap();
        assert!(!password.chars().any(|c| SYMBOLS.contains(c)));
    }

    proptest! {
        #[test]
        fn length_is_exact(length in MIN_LENGTH..128, seed in any::<u64>()) {
            let options = PasswordOptions { length, ..PasswordOptions::default() };
            let password = generate_password_with(&mut StdRng::seed_from_u64(seed), &options).unwrap();
            prop_assert_eq!(password.chars().count(), length);
        }
    }
}
