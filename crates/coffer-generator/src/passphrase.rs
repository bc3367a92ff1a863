// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Word-based passphrases such as `Copper-Otter-Lantern-Fig-42`.

use coffer_config::model::PassphraseGeneratorConfig;
use coffer_core::{CofferError, Result};
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::{CryptoRng, Rng};

use crate::wordlist::WORDS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassphraseOptions {
    pub word_count: usize,
    pub separator: String,
    /// Uppercase the first letter of every word.
    pub capitalize: bool,
    /// Append a two-digit number as a final element.
    pub include_number: bool,
}

impl Default for PassphraseOptions {
    fn default() -> Self {
        Self {
            word_count: 4,
            separator: "-".to_string(),
            capitalize: true,
            include_number: true,
        }
    }
}

impl From<&PassphraseGeneratorConfig> for PassphraseOptions {
    fn from(config: &PassphraseGeneratorConfig) -> Self {
        Self {
            word_count: config.word_count,
            separator: config.separator.clone(),
            capitalize: config.capitalize,
            include_number: config.include_number,
        }
    }
}

pub fn generate_passphrase(options: &PassphraseOptions) -> Result<String> {
    generate_passphrase_with(&mut OsRng, options)
}

pub fn generate_passphrase_with<R: Rng + CryptoRng>(
    rng: &mut R,
    options: &PassphraseOptions,
) -> Result<String> {
    if options.word_count < 1 {
        return Err(CofferError::Validation(
            "word count must be at least 1".to_string(),
        ));
    }

    let mut parts: Vec<String> = (0..options.word_count)
        .filter_map(|_| WORDS.choose(&mut *rng))
        .map(|word| {
            if options.capitalize {
                capitalize(word)
            } else {
                (*word).to_string()
            }
        })
        .collect();

    if options.include_number {
        parts.push(format!("{:02}", rng.gen_range(0..100u8)));
    }

    Ok(parts.join(&options.separator))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn default_shape() {
        let phrase = generate_passphrase(&PassphraseOptions::default()).unwrap();
        let parts: Vec<&str> = phrase.split('-').collect();
        assert_eq!(parts.len(), 5);
        for word in &parts[..4] {
            assert!(word.chars().next().unwrap().is_ascii_uppercase());
            assert!(WORDS.contains(&word.to_lowercase().as_str()));
        }
        assert_eq!(parts[4].len(), 2);
        assert!(parts[4].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn plain_words_with_custom_separator() {
        let options = PassphraseOptions {
            word_count: 6,
            separator: " ".into(),
            capitalize: false,
            include_number: false,
        };
        let phrase = generate_passphrase(&options).unwrap();
        let words: Vec<&str> = phrase.split(' ').collect();
        assert_eq!(words.len(), 6);
        assert!(words.iter().all(|w| WORDS.contains(w)));
    }

    #[test]
    fn zero_words_rejected() {
        let options = PassphraseOptions {
            word_count: 0,
            ..PassphraseOptions::default()
        };
        assert!(matches!(
            generate_passphrase(&options),
            Err(CofferError::Validation(_))
        ));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let options = PassphraseOptions::default();
        let a = generate_passphrase_with(&mut StdRng::seed_from_u64(1), &options).unwrap();
        let b = generate_passphrase_with(&mut StdRng::seed_from_u64(1), &options).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn capitalize_first_letter_only() {
        assert_eq!(capitalize("otter"), "Otter");
        assert_eq!(capitalize(""), "");
    }
}
