// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `otpauth://totp/<label>?secret=...` parsing and formatting.
//!
//! The label is `issuer:account` or just `account`. The separator is the
//! first literal `:`; a colon inside either part is written as `%3A`. Query
//! parameters equal to their defaults are left out when formatting.

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use url::Url;
use url::form_urlencoded;

use crate::code::{Algorithm, DEFAULT_DIGITS, DEFAULT_PERIOD, TotpConfig, TotpError};

const SCHEME: &str = "otpauth";
const KIND: &str = "totp";

/// Characters escaped inside the label path segment.
const LABEL: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b',')
    .add(b';')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Characters escaped inside the issuer or account half of the label.
const LABEL_PART: &AsciiSet = &LABEL.add(b':');

impl TotpConfig {
    pub fn parse_uri(uri: &str) -> Result<Self, TotpError> {
        let url = Url::parse(uri).map_err(|e| TotpError::InvalidUri(e.to_string()))?;

        if url.scheme() != SCHEME {
            return Err(TotpError::InvalidUri(format!(
                "expected scheme {SCHEME}, got {}",
                url.scheme()
            )));
        }
        match url.host_str() {
            Some(KIND) => {}
            other => {
                return Err(TotpError::InvalidUri(format!(
                    "expected type {KIND}, got {}",
                    other.unwrap_or("")
                )));
            }
        }

        let mut secret = None;
        let mut issuer = None;
        let mut period = None;
        let mut digits = None;
        let mut algorithm = None;
        for (key, value) in url.query_pairs() {
            let value = value.into_owned();
            match key.as_ref() {
                "secret" => secret = Some(value),
                "issuer" => issuer = Some(value),
                "period" => period = Some(value),
                "digits" => digits = Some(value),
                "algorithm" => algorithm = Some(value),
                _ => {}
            }
        }

        let secret = secret
            .filter(|s| !s.is_empty())
            .ok_or(TotpError::MissingSecret)?;
        let mut config = TotpConfig::new(secret);
        config.issuer = issuer.filter(|s| !s.is_empty());

        if let Some(period) = period.filter(|s| !s.is_empty()) {
            config.period = period
                .parse()
                .map_err(|_| TotpError::InvalidUri(format!("invalid period '{period}'")))?;
        }
        if let Some(digits) = digits.filter(|s| !s.is_empty()) {
            config.digits = digits
                .parse()
                .map_err(|_| TotpError::InvalidUri(format!("invalid digits '{digits}'")))?;
        }
        if let Some(name) = algorithm.filter(|s| !s.is_empty()) {
            config.algorithm = name
                .parse::<Algorithm>()
                .map_err(|_| TotpError::UnsupportedAlgorithm(name.clone()))?;
        }

        let raw_label = raw_label(uri);
        if !raw_label.is_empty() {
            match raw_label.split_once(':') {
                Some((label_issuer, account)) => {
                    let label_issuer = decode_label(label_issuer)?;
                    if config.issuer.is_none() && !label_issuer.is_empty() {
                        config.issuer = Some(label_issuer);
                    }
                    // Spaces may follow the separator; encoded ones belong to the account.
                    let account = decode_label(account.trim_start_matches([' ', '\t']))?;
                    config.account = Some(account).filter(|a| !a.is_empty());
                }
                None => config.account = Some(decode_label(raw_label)?),
            }
        }

        config.check()?;
        Ok(config)
    }

    pub fn to_uri(&self) -> String {
        let part = |s: &str| utf8_percent_encode(s, LABEL_PART).to_string();
        let label = match (self.issuer.as_deref(), self.account.as_deref()) {
            (Some(issuer), Some(account)) => format!("{}:{}", part(issuer), part(account)),
            (Some(issuer), None) => format!("{}:", part(issuer)),
            (None, Some(account)) => part(account),
            (None, None) => String::new(),
        };

        // Keys in alphabetical order.
        let mut query = form_urlencoded::Serializer::new(String::new());
        if self.algorithm != Algorithm::Sha1 {
            query.append_pair("algorithm", &self.algorithm.to_string());
        }
        if self.digits != DEFAULT_DIGITS {
            query.append_pair("digits", &self.digits.to_string());
        }
        if let Some(issuer) = &self.issuer {
            query.append_pair("issuer", issuer);
        }
        if self.period != DEFAULT_PERIOD {
            query.append_pair("period", &self.period.to_string());
        }
        query.append_pair("secret", &self.secret);

        format!("{SCHEME}://{KIND}/{label}?{}", query.finish())
    }
}

/// The label exactly as written, before any percent-decoding.
fn raw_label(uri: &str) -> &str {
    let after_scheme = uri.split_once("://").map_or("", |(_, rest)| rest);
    let path = after_scheme.split_once('/').map_or("", |(_, path)| path);
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].trim_start_matches('/')
}

fn decode_label(raw: &str) -> Result<String, TotpError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|label| label.into_owned())
        .map_err(|e| TotpError::InvalidUri(format!("label is not UTF-8: {e}")))
}
