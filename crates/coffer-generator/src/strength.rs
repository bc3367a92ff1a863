// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entropy-based password strength estimates.
//!
//! Entropy is `length * log2(pool)`, where the pool is the sum of the
//! character classes present: lowercase 26, uppercase 26, digits 10 and
//! everything else 32.

use coffer_core::{CofferError, Result};
use strum::Display;

/// Guess rate assumed for crack-time estimates.
const GUESSES_PER_SECOND: f64 = 1e9;

/// Frequently used passwords, rejected outright (also as substrings).
pub const COMMON_PASSWORDS: &[&str] = &[
    "password", "123456", "12345678", "qwerty", "abc123", "monkey", "1234567", "letmein",
    "trustno1", "dragon", "baseball", "111111", "iloveyou", "master", "sunshine", "ashley",
    "bailey", "passw0rd", "shadow", "123123", "654321", "superman", "qazwsx", "michael",
    "football",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum Strength {
    Weak,
    Fair,
    Good,
    Strong,
    Excellent,
}

impl Strength {
    pub fn from_entropy(bits: f64) -> Self {
        match bits {
            b if b < 40.0 => Self::Weak,
            b if b < 60.0 => Self::Fair,
            b if b < 80.0 => Self::Good,
            b if b < 100.0 => Self::Strong,
            _ => Self::Excellent,
        }
    }
}

/// Estimated entropy in bits.
pub fn password_entropy(password: &str) -> f64 {
    let (mut lower, mut upper, mut digit, mut other) = (false, false, false, false);
    let mut length = 0usize;
    for c in password.chars() {
        length += 1;
        if c.is_lowercase() {
            lower = true;
        } else if c.is_uppercase() {
            upper = true;
        } else if c.is_numeric() {
            digit = true;
        } else {
            other = true;
        }
    }
    if length == 0 {
        return 0.0;
    }

    let pool = [(lower, 26u32), (upper, 26), (digit, 10), (other, 32)]
        .into_iter()
        .filter(|(present, _)| *present)
        .map(|(_, size)| size)
        .sum::<u32>();
    length as f64 * f64::from(pool).log2()
}

pub fn password_strength(password: &str) -> Strength {
    Strength::from_entropy(password_entropy(password))
}

/// Average time to brute-force a password with the given entropy, as a
/// phrase like `"3 hours"` or `"12 million years"`.
pub fn estimate_crack_time(entropy_bits: f64) -> String {
    if entropy_bits <= 0.0 {
        return "instantly".to_string();
    }
    let seconds = 2f64.powf(entropy_bits) / GUESSES_PER_SECOND / 2.0;

    const MINUTE: f64 = 60.0;
    const HOUR: f64 = 3_600.0;
    const DAY: f64 = 86_400.0;
    const YEAR: f64 = 31_536_000.0;

    match seconds {
        s if s < 1.0 => "instantly".to_string(),
        s if s < MINUTE => format!("{s:.0} seconds"),
        s if s < HOUR => format!("{:.0} minutes", s / MINUTE),
        s if s < DAY => format!("{:.0} hours", s / HOUR),
        s if s < YEAR => format!("{:.0} days", s / DAY),
        s if s < YEAR * 1e3 => format!("{:.0} years", s / YEAR),
        s if s < YEAR * 1e6 => format!("{:.0} thousand years", s / (YEAR * 1e3)),
        s if s < YEAR * 1e9 => format!("{:.0} million years", s / (YEAR * 1e6)),
        s => format!("{:.0} billion years", s / (YEAR * 1e9)),
    }
}

/// Check a candidate master password. Returns its strength when acceptable.
pub fn validate_password(password: &str, min_length: usize) -> Result<Strength> {
    if password.chars().count() < min_length {
        return Err(CofferError::Validation(format!(
            "password must be at least {min_length} characters"
        )));
    }
    let lower = password.to_lowercase();
    if COMMON_PASSWORDS.iter().any(|common| lower.contains(common)) {
        return Err(CofferError::Validation("password is too common".to_string()));
    }
    let strength = password_strength(password);
    if strength == Strength::Weak {
        return Err(CofferError::Validation("password is too weak".to_string()));
    }
    Ok(strength)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_has_no_entropy() {
        assert_eq!(password_entropy(""), 0.0);
        assert_eq!(estimate_crack_time(0.0), "instantly");
    }

    #[test]
    fn pool_sizes() {
        // 8 lowercase letters: 8 * log2(26)
        let bits = password_entropy("abcdefgh");
        assert!((bits - 8.0 * 26f64.log2()).abs() < 1e-9);

        // All four classes: pool 94.
        let bits = password_entropy("aA1!");
        assert!((bits - 4.0 * 94f64.log2()).abs() < 1e-9);
    }

    #[test]
    fn strength_thresholds() {
        assert_eq!(Strength::from_entropy(39.9), Strength::Weak);
        assert_eq!(Strength::from_entropy(40.0), Strength::Fair);
        assert_eq!(Strength::from_entropy(60.0), Strength::Good);
        assert_eq!(Strength::from_entropy(80.0), Strength::Strong);
        assert_eq!(Strength::from_entropy(100.0), Strength::Excellent);
    }

    #[test]
    fn generated_default_password_is_strong() {
        let password =
            crate::generate_password(&crate::PasswordOptions::default()).unwrap();
        assert!(password_strength(&password) >= Strength::Excellent);
    }

    #[test]
    fn crack_time_buckets() {
        // 2^40 / 1e9 / 2 ~ 550 seconds
        assert_eq!(estimate_crack_time(40.0), "9 minutes");
        assert!(estimate_crack_time(128.0).ends_with("billion years"));
    }

    #[test]
    fn validation_rules() {
        assert!(validate_password("short", 8).is_err());
        assert!(matches!(
            validate_password("MyPassword123!", 8),
            Err(CofferError::Validation(ref m)) if m.contains("common")
        ));
        assert!(matches!(
            validate_password("aaaaaaaa", 8),
            Err(CofferError::Validation(ref m)) if m.contains("weak")
        ));
        assert_eq!(validate_password("CorrectHorse1!", 8).unwrap(), Strength::Strong);
    }
}
