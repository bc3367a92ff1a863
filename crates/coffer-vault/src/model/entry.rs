// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault entries: a shared base record plus a kind-specific payload.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use coffer_core::{CofferError, Result};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use zeroize::Zeroize;

/// Discriminant of [`EntryKind`], for filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum EntryType {
    Login,
    #[strum(to_string = "Secure Note", serialize = "note", serialize = "secure-note")]
    SecureNote,
    Card,
    Identity,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
#[serde(default)]
pub struct LoginData {
    pub username: Option<String>,
    pub password: Option<String>,
    pub uri: Option<String>,
    pub totp_secret: Option<String>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
#[serde(default)]
pub struct CardData {
    pub cardholder_name: Option<String>,
    pub number: Option<String>,
    pub brand: Option<String>,
    pub exp_month: Option<String>,
    pub exp_year: Option<String>,
    pub cvv: Option<String>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
#[serde(default)]
pub struct IdentityData {
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub ssn: Option<String>,
    pub passport_number: Option<String>,
}

impl IdentityData {
    /// First, middle and last name joined with single spaces.
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Kind-specific entry payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    Login(LoginData),
    SecureNote,
    Card(CardData),
    Identity(IdentityData),
}

impl EntryKind {
    pub fn entry_type(&self) -> EntryType {
        match self {
            Self::Login(_) => EntryType::Login,
            Self::SecureNote => EntryType::SecureNote,
            Self::Card(_) => EntryType::Card,
            Self::Identity(_) => EntryType::Identity,
        }
    }

    /// An empty payload of the given type.
    pub fn empty(entry_type: EntryType) -> Self {
        match entry_type {
            EntryType::Login => Self::Login(LoginData::default()),
            EntryType::SecureNote => Self::SecureNote,
            EntryType::Card => Self::Card(CardData::default()),
            EntryType::Identity => Self::Identity(IdentityData::default()),
        }
    }
}

/// A single credential record.
///
/// The identifier is assigned at construction and never changes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    id: String,
    pub name: String,
    pub kind: EntryKind,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, String>,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    accessed_at: Option<DateTime<Utc>>,
}

impl Entry {
    /// Create an entry with a fresh UUID v4 identifier.
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        let now = Utc::now();
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            kind,
            notes: None,
            custom_fields: BTreeMap::new(),
            folder_id: None,
            favorite: false,
            tags: BTreeSet::new(),
            created_at: now,
            updated_at: now,
            accessed_at: None,
        })
    }

    /// Shorthand for a login with username and password.
    pub fn login(
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Self::new(
            name,
            EntryKind::Login(LoginData {
                username: Some(username.into()),
                password: Some(password.into()),
                ..LoginData::default()
            }),
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn entry_type(&self) -> EntryType {
        self.kind.entry_type()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn accessed_at(&self) -> Option<DateTime<Utc>> {
        self.accessed_at
    }

    pub fn login_data(&self) -> Option<&LoginData> {
        match &self.kind {
            EntryKind::Login(data) => Some(data),
            _ => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.login_data().and_then(|d| d.username.as_deref())
    }

    pub fn password(&self) -> Option<&str> {
        self.login_data().and_then(|d| d.password.as_deref())
    }

    pub fn uri(&self) -> Option<&str> {
        self.login_data().and_then(|d| d.uri.as_deref())
    }

    pub fn totp_secret(&self) -> Option<&str> {
        self.login_data()
            .and_then(|d| d.totp_secret.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Rename, rejecting blank names.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        self.touch();
        Ok(())
    }

    /// Record a direct modification of this entry.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }

    /// Record that this entry was viewed.
    pub fn update_access_time(&mut self) {
        self.accessed_at = Some(Utc::now());
    }

    /// Case-insensitive substring match over name, username, URI, notes and
    /// tags. `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        let hit = |s: &str| s.to_lowercase().contains(needle);
        hit(&self.name)
            || self.username().is_some_and(hit)
            || self.uri().is_some_and(hit)
            || self.notes.as_deref().is_some_and(hit)
            || self.tags.iter().any(|t| hit(t))
    }

    /// Validate fields that deserialization alone cannot guarantee.
    pub(crate) fn check(&self) -> Result<()> {
        validate_name(&self.name)?;
        if self.updated_at < self.created_at {
            return Err(CofferError::Validation(format!(
                "entry '{}' was updated before it was created",
                self.name
            )));
        }
        Ok(())
    }
}

impl Zeroize for Entry {
    fn zeroize(&mut self) {
        self.name.zeroize();
        self.kind.zeroize();
        self.notes.zeroize();
        let fields = std::mem::take(&mut self.custom_fields);
        for (mut key, mut value) in fields {
            key.zeroize();
            value.zeroize();
        }
        let tags = std::mem::take(&mut self.tags);
        for mut tag in tags {
            tag.zeroize();
        }
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type", &self.entry_type())
            .field("secrets", &"[REDACTED]")
            .finish()
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CofferError::Validation("entry name cannot be empty".to_string()));
    }
    Ok(())
}

/// Masked preview of a secret for list views.
///
/// Values shorter than 10 characters are fully masked; longer ones keep
/// only their last four characters.
pub fn mask_secret(value: &str) -> String {
    let chars = value.chars().count();
    if chars < 10 {
        return "****".to_string();
    }
    let suffix: String = value.chars().skip(chars - 4).collect();
    format!("****{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn new_entry_has_uuid_and_equal_timestamps() {
        let entry = Entry::login("GitHub", "octocat", "hunter2").unwrap();
        assert!(uuid::Uuid::parse_str(entry.id()).is_ok());
        assert_eq!(entry.created_at(), entry.updated_at());
        assert!(entry.accessed_at().is_none());
        assert_eq!(entry.username(), Some("octocat"));
        assert_eq!(entry.password(), Some("hunter2"));
    }

    #[test]
    fn ids_are_unique() {
        let a = Entry::new("a", EntryKind::SecureNote).unwrap();
        let b = Entry::new("a", EntryKind::SecureNote).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn blank_name_rejected() {
        assert!(matches!(
            Entry::new("   ", EntryKind::SecureNote),
            Err(CofferError::Validation(_))
        ));
        let mut entry = Entry::new("ok", EntryKind::SecureNote).unwrap();
        assert!(entry.rename("").is_err());
        assert_eq!(entry.name, "ok");
    }

    #[test]
    fn touch_keeps_timestamps_monotonic() {
        let mut entry = Entry::new("note", EntryKind::SecureNote).unwrap();
        entry.touch();
        assert!(entry.updated_at() >= entry.created_at());
    }

    #[test]
    fn access_time_is_independent_of_update_time() {
        let mut entry = Entry::new("note", EntryKind::SecureNote).unwrap();
        let updated = entry.updated_at();
        entry.update_access_time();
        assert!(entry.accessed_at().is_some());
        assert_eq!(entry.updated_at(), updated);
    }

    #[test]
    fn login_accessors_are_none_for_other_kinds() {
        let card = Entry::new(
            "Visa",
            EntryKind::Card(CardData {
                number: Some("4111111111111111".into()),
                ..CardData::default()
            }),
        )
        .unwrap();
        assert_eq!(card.entry_type(), EntryType::Card);
        assert!(card.username().is_none());
        assert!(card.password().is_none());
        assert!(card.totp_secret().is_none());
    }

    #[test]
    fn type_display_names() {
        let names: Vec<String> = EntryType::iter().map(|t| t.to_string()).collect();
        assert_eq!(names, ["Login", "Secure Note", "Card", "Identity"]);
        assert_eq!("note".parse::<EntryType>().unwrap(), EntryType::SecureNote);
        assert_eq!("CARD".parse::<EntryType>().unwrap(), EntryType::Card);
    }

    #[test]
    fn kind_serializes_with_type_tag() {
        let entry = Entry::new("memo", EntryKind::SecureNote).unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"]["type"], "secure_note");

        let back: Entry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn search_matches_are_case_insensitive() {
        let mut entry = Entry::login("GitHub", "Octocat", "pw").unwrap();
        entry.tags.insert("Work".into());
        entry.notes = Some("Recovery codes in the safe".into());

        assert!(entry.matches("github"));
        assert!(entry.matches("octo"));
        assert!(entry.matches("work"));
        assert!(entry.matches("safe"));
        assert!(!entry.matches("gitlab"));
    }

    #[test]
    fn identity_full_name_skips_missing_parts() {
        let identity = IdentityData {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            ..IdentityData::default()
        };
        assert_eq!(identity.full_name(), "Ada Lovelace");
    }

    #[test]
    fn zeroize_clears_secrets() {
        let mut entry = Entry::login("GitHub", "octocat", "hunter2").unwrap();
        entry.custom_fields.insert("pin".into(), "1234".into());
        entry.zeroize();
        assert!(entry.name.is_empty());
        assert!(entry.password().is_none());
        assert!(entry.custom_fields.is_empty());
    }

    #[test]
    fn debug_hides_secrets() {
        let entry = Entry::login("GitHub", "octocat", "hunter2").unwrap();
        let debug = format!("{entry:?}");
        assert!(debug.contains("GitHub"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn mask_secret_short_value() {
        assert_eq!(mask_secret("short"), "****");
    }

    #[test]
    fn mask_secret_long_value_keeps_suffix() {
        assert_eq!(mask_secret("4111111111111111"), "****1111");
        assert_eq!(mask_secret("1234567890"), "****7890");
    }

    #[test]
    fn mask_secret_handles_multibyte() {
        assert_eq!(mask_secret("pässwörd-ünïcödé"), "****cödé");
    }
}
