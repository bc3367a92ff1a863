// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration errors as miette diagnostics.
//!
//! Figment reports problems against a dotted key path. Here they become
//! [`ConfigError`]s that point at the offending line of the TOML file and,
//! for misspelt keys, suggest the closest valid key.

#![allow(unused_assignments)] // triggered by the Diagnostic derive

use std::path::PathBuf;

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a valid key must beat to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {section}")]
    #[diagnostic(
        code(coffer::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// `[section]` header, or "top level".
        section: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a coffer setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(coffer::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
    },

    /// An explicitly requested config file could not be read.
    #[error("cannot read config file {}", path.display())]
    #[diagnostic(code(coffer::config::unreadable))]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid setting: {message}")]
    #[diagnostic(code(coffer::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(coffer::config::other))]
    Other(String),
}

impl From<ConfigError> for coffer_core::CofferError {
    fn from(err: ConfigError) -> Self {
        coffer_core::CofferError::Config(err.to_string())
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(key) => format!("did you mean `{key}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

impl ConfigError {
    /// Convert every error figment collected during extraction. `sources`
    /// holds `(name, contents)` of the TOML files that were merged, used to
    /// attach source spans.
    pub fn from_figment(err: figment::Error, sources: &[(String, String)]) -> Vec<Self> {
        err.into_iter()
            .map(|error| Self::from_figment_error(&error, sources))
            .collect()
    }

    fn from_figment_error(error: &figment::Error, sources: &[(String, String)]) -> Self {
        match &error.kind {
            Kind::UnknownField(key, expected) => {
                let section = error.path.first().map(String::as_str);
                let (span, src) = source_span(error, section, key, sources);
                Self::UnknownKey {
                    key: key.clone(),
                    section: section.map_or_else(|| "top level".to_string(), |s| format!("[{s}]")),
                    suggestion: suggest_key(key, expected),
                    valid_keys: expected.join(", "),
                    span,
                    src,
                }
            }
            Kind::InvalidType(found, expected) | Kind::InvalidValue(found, expected) => {
                Self::InvalidType {
                    key: error.path.join("."),
                    found: found.to_string(),
                    expected: expected.clone(),
                }
            }
            _ => Self::Other(error.to_string()),
        }
    }
}

fn source_span(
    error: &figment::Error,
    section: Option<&str>,
    key: &str,
    sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let file = error
        .metadata
        .as_ref()
        .and_then(|meta| meta.source.as_ref())
        .and_then(|source| source.file_path())
        .map(|path| path.display().to_string());

    // A single source is the answer whatever figment called it.
    let source = match (file, sources) {
        (_, [only]) => Some(only),
        (Some(file), _) => sources.iter().find(|(name, _)| *name == file),
        (None, _) => None,
    };

    source
        .and_then(|(name, content)| {
            let offset = locate_key(content, section, key)?;
            Some((
                Some(SourceSpan::new(offset.into(), key.len())),
                Some(NamedSource::new(name, content.clone())),
            ))
        })
        .unwrap_or((None, None))
}

/// Byte offset of `key = ...` inside `[section]` (or before any header when
/// `section` is `None`).
pub fn locate_key(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let mut offset = 0;
    let mut current = None;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
            current = Some(header.trim());
        } else if current == section {
            let indent = line.len() - line.trim_start().len();
            let is_key = line[indent..]
                .strip_prefix(key)
                .is_some_and(|after| after.trim_start().starts_with('='));
            if is_key {
                return Some(offset + indent);
            }
        }
        offset += line.len();
    }
    None
}

/// Closest valid key by Jaro-Winkler similarity, if any is close enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print every error to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    let mut out = String::new();
    for error in errors {
        out.clear();
        match handler.render_report(&mut out, error) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("config error: {error}"),
        }
    }
    if errors.len() > 1 {
        eprintln!("{} configuration problems found", errors.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_typo() {
        let valid = &["auto_lock_minutes", "clipboard_clear_seconds", "max_unlock_attempts"];
        assert_eq!(
            suggest_key("auto_lok_minutes", valid).as_deref(),
            Some("auto_lock_minutes")
        );
        assert_eq!(suggest_key("zzzzzz", &["length", "include_symbols"]), None);
    }

    #[test]
    fn locates_key_in_its_own_section() {
        let content = "[ui]\nauto_lok = 1\n\n[security]\n  auto_lok = 3\n";
        let offset = locate_key(content, Some("security"), "auto_lok").unwrap();
        assert_eq!(&content[offset..offset + 8], "auto_lok");
        assert!(offset > content.find("[security]").unwrap());
    }

    #[test]
    fn key_prefix_is_not_a_match() {
        let content = "[kdf]\niterations_extra = 1\n";
        assert_eq!(locate_key(content, Some("kdf"), "iterations"), None);
    }

    #[test]
    fn top_level_keys_stop_at_first_header() {
        let content = "colour = 1\n[ui]\ncolour = 2\n";
        assert_eq!(locate_key(content, None, "colour"), Some(0));
        assert_eq!(locate_key("[ui]\ncolour = 2\n", None, "colour"), None);
    }

    #[test]
    fn unknown_key_help_lists_valid_keys() {
        let help = unknown_key_help(Some("length"), "length, include_symbols");
        assert!(help.starts_with("did you mean `length`?"));
        assert_eq!(unknown_key_help(None, "a, b"), "valid keys: a, b");
    }
}
