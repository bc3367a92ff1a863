// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Code generation and validation.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use coffer_core::CofferError;
use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use strum::{Display, EnumString};

pub const DEFAULT_PERIOD: u64 = 30;
pub const DEFAULT_DIGITS: u32 = 6;

/// Accepted code lengths.
const DIGIT_RANGE: std::ops::RangeInclusive<u32> = 6..=8;

/// HMAC hash used for code generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Algorithm {
    #[default]
    #[strum(to_string = "SHA1")]
    Sha1,
    #[strum(to_string = "SHA256")]
    Sha256,
    #[strum(to_string = "SHA512")]
    Sha512,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TotpError {
    #[error("secret is not valid base32")]
    InvalidSecret,
    #[error("digits must be between 6 and 8, got {0}")]
    UnsupportedDigits(u32),
    #[error("period must be greater than zero")]
    InvalidPeriod,
    #[error("unsupported algorithm '{0}'")]
    UnsupportedAlgorithm(String),
    #[error("invalid otpauth URI: {0}")]
    InvalidUri(String),
    #[error("missing secret parameter")]
    MissingSecret,
}

impl From<TotpError> for CofferError {
    fn from(e: TotpError) -> Self {
        CofferError::Totp(e.to_string())
    }
}

/// A generated code and the seconds left until it rolls over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotpCode {
    pub code: String,
    pub remaining_secs: u64,
}

/// Parameters for one TOTP credential.
#[derive(Clone, PartialEq, Eq)]
pub struct TotpConfig {
    /// Base32 secret as entered or imported.
    pub secret: String,
    /// Window length in seconds.
    pub period: u64,
    pub digits: u32,
    pub algorithm: Algorithm,
    pub issuer: Option<String>,
    pub account: Option<String>,
}

impl fmt::Debug for TotpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TotpConfig")
            .field("secret", &"[REDACTED]")
            .field("period", &self.period)
            .field("digits", &self.digits)
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("account", &self.account)
            .finish()
    }
}

impl TotpConfig {
    /// Standard parameters: 30 second period, 6 digits, SHA1.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            period: DEFAULT_PERIOD,
            digits: DEFAULT_DIGITS,
            algorithm: Algorithm::Sha1,
            issuer: None,
            account: None,
        }
    }

    /// Accept either a bare base32 secret or a full `otpauth://` URI, as
    /// stored in an entry's TOTP field.
    pub fn from_stored(value: &str) -> Result<Self, TotpError> {
        let value = value.trim();
        let config = if value.starts_with("otpauth://") {
            Self::parse_uri(value)?
        } else {
            Self::new(value)
        };
        config.check()?;
        Ok(config)
    }

    /// Reject parameters that cannot produce a code.
    pub fn check(&self) -> Result<(), TotpError> {
        if self.period == 0 {
            return Err(TotpError::InvalidPeriod);
        }
        if !DIGIT_RANGE.contains(&self.digits) {
            return Err(TotpError::UnsupportedDigits(self.digits));
        }
        decode_secret(&self.secret).map(|_| ())
    }

    /// Code for the window containing `unix_secs`.
    pub fn generate_code_at(&self, unix_secs: u64) -> Result<TotpCode, TotpError> {
        self.check()?;
        let key = decode_secret(&self.secret)?;
        let counter = unix_secs / self.period;
        let code = hotp(self.algorithm, &key, counter, self.digits)?;
        let remaining_secs = self.period - unix_secs % self.period;
        Ok(TotpCode {
            code,
            remaining_secs,
        })
    }

    pub fn generate_code(&self) -> Result<TotpCode, TotpError> {
        self.generate_code_at(unix_now())
    }

    /// Accept `code` if it matches the window at `unix_secs` or one of the
    /// two adjacent windows.
    pub fn validate_at(&self, code: &str, unix_secs: u64) -> bool {
        let Ok(key) = self.check().and_then(|()| decode_secret(&self.secret)) else {
            return false;
        };
        let counter = unix_secs / self.period;
        [counter.checked_sub(1), Some(counter), counter.checked_add(1)]
            .into_iter()
            .flatten()
            .filter_map(|c| hotp(self.algorithm, &key, c, self.digits).ok())
            .any(|candidate| constant_time_eq(candidate.as_bytes(), code.as_bytes()))
    }

    pub fn validate(&self, code: &str) -> bool {
        self.validate_at(code, unix_now())
    }
}

/// Decode a base32 secret, ignoring whitespace, case and `=` padding.
pub fn decode_secret(secret: &str) -> Result<Vec<u8>, TotpError> {
    let normalized: String = secret
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace() && *ch != '=' && *ch != '-')
        .map(|ch| ch.to_ascii_uppercase())
        .collect();
    if normalized.is_empty() {
        return Err(TotpError::InvalidSecret);
    }
    BASE32_NOPAD
        .decode(normalized.as_bytes())
        .map_err(|_| TotpError::InvalidSecret)
}

/// RFC 4226 HOTP with dynamic truncation.
fn hotp(algorithm: Algorithm, key: &[u8], counter: u64, digits: u32) -> Result<String, TotpError> {
    let mac = hmac_digest(algorithm, key, &counter.to_be_bytes())?;

    let offset = (mac[mac.len() - 1] & 0x0f) as usize;
    let binary = u32::from_be_bytes([
        mac[offset],
        mac[offset + 1],
        mac[offset + 2],
        mac[offset + 3],
    ]) & 0x7fff_ffff;

    let value = binary % 10u32.pow(digits);
    Ok(format!("{value:0width$}", width = digits as usize))
}

fn hmac_digest(algorithm: Algorithm, key: &[u8], message: &[u8]) -> Result<Vec<u8>, TotpError> {
    fn run<M: Mac + hmac::digest::KeyInit>(key: &[u8], message: &[u8]) -> Result<Vec<u8>, TotpError> {
        let mut mac = <M as Mac>::new_from_slice(key).map_err(|_| TotpError::InvalidSecret)?;
        mac.update(message);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    match algorithm {
        Algorithm::Sha1 => run::<Hmac<sha1::Sha1>>(key, message),
        Algorithm::Sha256 => run::<Hmac<sha2::Sha256>>(key, message),
        Algorithm::Sha512 => run::<Hmac<sha2::Sha512>>(key, message),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
