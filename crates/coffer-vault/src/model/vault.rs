// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The vault document: entries, folders and per-vault settings.
//!
//! Lookups are linear scans. Vaults hold hundreds to low thousands of
//! entries, so an index would not pay for itself.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use coffer_core::{CofferError, CorruptReason, ObjectKind, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroize;

use super::entry::Entry;
use super::folder::Folder;

/// Document version written into every new vault.
pub const VAULT_VERSION: &str = "1.0";

/// Preferences stored inside the encrypted vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub auto_lock_minutes: u64,
    pub clipboard_clear_seconds: u64,
    pub generator_length: usize,
    pub use_uppercase: bool,
    pub use_lowercase: bool,
    pub use_numbers: bool,
    pub use_symbols: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_lock_minutes: 5,
            clipboard_clear_seconds: 30,
            generator_length: 16,
            use_uppercase: true,
            use_lowercase: true,
            use_numbers: true,
            use_symbols: true,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    pub version: String,
    entries: Vec<Entry>,
    folders: Vec<Folder>,
    #[serde(default)]
    pub settings: Settings,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Default for Vault {
    fn default() -> Self {
        Self::new()
    }
}

impl Vault {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let now = Utc::now();
        Self {
            version: VAULT_VERSION.to_string(),
            entries: Vec::new(),
            folders: Vec::new(),
            settings,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Record a structural change to the vault.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }

    // --- entries ---

    pub fn add_entry(&mut self, entry: Entry) -> Result<&Entry> {
        if self.find_entry(entry.id()).is_some() {
            return Err(CofferError::Validation(format!(
                "duplicate entry id {}",
                entry.id()
            )));
        }
        if let Some(folder_id) = entry.folder_id.as_deref() {
            self.require_folder(folder_id)?;
        }
        debug!(entry_id = entry.id(), kind = %entry.entry_type(), "entry added");
        self.entries.push(entry);
        self.touch();
        let last = self.entries.len() - 1;
        Ok(&self.entries[last])
    }

    /// Remove and return an entry. The caller owns (and should zeroize) it.
    pub fn remove_entry(&mut self, id: &str) -> Result<Entry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id() == id)
            .ok_or_else(|| not_found(ObjectKind::Entry, id))?;
        let entry = self.entries.remove(index);
        self.touch();
        debug!(entry_id = id, "entry removed");
        Ok(entry)
    }

    pub fn find_entry(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    /// Fetch an entry for display, recording the access.
    pub fn view_entry(&mut self, id: &str) -> Result<&Entry> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or_else(|| not_found(ObjectKind::Entry, id))?;
        entry.update_access_time();
        Ok(entry)
    }

    /// Apply `edit` to an entry. The change is only kept if the edited entry
    /// still satisfies the vault's invariants.
    pub fn update_entry<F>(&mut self, id: &str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Entry) -> Result<()>,
    {
        let index = self
            .entries
            .iter()
            .position(|e| e.id() == id)
            .ok_or_else(|| not_found(ObjectKind::Entry, id))?;

        let mut draft = self.entries[index].clone();
        let outcome = edit(&mut draft).and_then(|()| {
            draft.check()?;
            match draft.folder_id.as_deref() {
                Some(folder_id) => self.require_folder(folder_id).map(|_| ()),
                None => Ok(()),
            }
        });
        if let Err(e) = outcome {
            draft.zeroize();
            return Err(e);
        }

        draft.touch();
        let mut previous = std::mem::replace(&mut self.entries[index], draft);
        previous.zeroize();
        self.touch();
        Ok(())
    }

    /// Exact name match first, then case-insensitive.
    pub fn find_entry_by_name(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name).or_else(|| {
            let lower = name.to_lowercase();
            self.entries.iter().find(|e| e.name.to_lowercase() == lower)
        })
    }

    /// Case-insensitive substring search. An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Entry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries.iter().filter(|e| e.matches(&needle)).collect()
    }

    /// Entries directly inside `folder_id`, or at the root for `None`.
    pub fn entries_in_folder(&self, folder_id: Option<&str>) -> Vec<&Entry> {
        self.entries
            .iter()
            .filter(|e| e.folder_id.as_deref() == folder_id)
            .collect()
    }

    pub fn favorites(&self) -> Vec<&Entry> {
        self.entries.iter().filter(|e| e.favorite).collect()
    }

    // --- folders ---

    pub fn add_folder(&mut self, folder: Folder) -> Result<&Folder> {
        if self.find_folder(folder.id()).is_some() {
            return Err(CofferError::Validation(format!(
                "duplicate folder id {}",
                folder.id()
            )));
        }
        if let Some(parent) = folder.parent_id() {
            if parent == folder.id() {
                return Err(CofferError::Validation(
                    "a folder cannot be its own parent".to_string(),
                ));
            }
            self.require_folder(parent)?;
        }
        self.folders.push(folder);
        self.touch();
        let last = self.folders.len() - 1;
        Ok(&self.folders[last])
    }

    pub fn find_folder(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id() == id)
    }

    pub fn find_folder_by_name(&self, name: &str) -> Option<&Folder> {
        let lower = name.to_lowercase();
        self.folders.iter().find(|f| f.name.to_lowercase() == lower)
    }

    /// Reparent a folder. Moving a folder under itself or one of its
    /// descendants is rejected.
    pub fn move_folder(&mut self, id: &str, new_parent: Option<&str>) -> Result<()> {
        self.require_folder(id)?;
        if let Some(parent) = new_parent {
            self.require_folder(parent)?;
            if parent == id || self.ancestors(parent).any(|a| a == id) {
                return Err(CofferError::Validation(
                    "a folder cannot be moved inside itself".to_string(),
                ));
            }
        }
        if let Some(folder) = self.folders.iter_mut().find(|f| f.id() == id) {
            folder.parent_id = new_parent.map(str::to_string);
        }
        self.touch();
        Ok(())
    }

    /// Remove a folder. Its entries move to the root and its child folders
    /// move up to its parent.
    pub fn remove_folder(&mut self, id: &str) -> Result<Folder> {
        let index = self
            .folders
            .iter()
            .position(|f| f.id() == id)
            .ok_or_else(|| not_found(ObjectKind::Folder, id))?;
        let removed = self.folders.remove(index);

        for entry in self.entries.iter_mut().filter(|e| e.folder_id.as_deref() == Some(id)) {
            entry.folder_id = None;
        }
        for child in self.folders.iter_mut().filter(|f| f.parent_id() == Some(id)) {
            child.parent_id = removed.parent_id.clone();
        }
        self.touch();
        Ok(removed)
    }

    /// Human-readable path such as `Work / Servers`.
    pub fn folder_path(&self, id: &str) -> Option<String> {
        let leaf = self.find_folder(id)?;
        let mut names = vec![leaf.name.as_str()];
        names.extend(
            self.ancestors(id)
                .filter_map(|a| self.find_folder(a))
                .map(|f| f.name.as_str()),
        );
        names.reverse();
        Some(names.join(" / "))
    }

    /// Ids of the ancestors of `id`, nearest first. Stops on a repeated id so
    /// a damaged tree cannot loop forever.
    fn ancestors<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let mut seen = HashSet::new();
        let mut current = self.find_folder(id).and_then(Folder::parent_id);
        std::iter::from_fn(move || {
            let next = current?;
            if !seen.insert(next) {
                return None;
            }
            current = self.find_folder(next).and_then(Folder::parent_id);
            Some(next)
        })
    }

    fn require_folder(&self, id: &str) -> Result<&Folder> {
        self.find_folder(id)
            .ok_or_else(|| not_found(ObjectKind::Folder, id))
    }

    /// Structural checks for a freshly decrypted document.
    pub(crate) fn validate_structure(&self) -> Result<()> {
        let malformed = |msg: String| CofferError::CorruptVault(CorruptReason::MalformedPayload(msg));

        let mut entry_ids = HashSet::new();
        for entry in &self.entries {
            if !entry_ids.insert(entry.id()) {
                return Err(malformed(format!("duplicate entry id {}", entry.id())));
            }
        }
        let mut folder_ids = HashSet::new();
        for folder in &self.folders {
            if !folder_ids.insert(folder.id()) {
                return Err(malformed(format!("duplicate folder id {}", folder.id())));
            }
        }
        for folder in &self.folders {
            if self.ancestors(folder.id()).any(|a| a == folder.id()) {
                return Err(malformed(format!("folder {} is its own ancestor", folder.id())));
            }
        }
        Ok(())
    }
}

impl Zeroize for Vault {
    fn zeroize(&mut self) {
        for entry in &mut self.entries {
            entry.zeroize();
        }
        self.entries.clear();
        for folder in &mut self.folders {
            folder.name.zeroize();
        }
        self.folders.clear();
    }
}

impl Drop for Vault {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("version", &self.version)
            .field("entries", &self.entries.len())
            .field("folders", &self.folders.len())
            .finish()
    }
}

fn not_found(kind: ObjectKind, id: &str) -> CofferError {
    CofferError::NotFound {
        kind,
        id: id.to_string(),
    }
}
