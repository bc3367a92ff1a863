// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{DateTime, Utc};
use coffer_core::{CofferError, Result};
use serde::{Deserialize, Serialize};

/// A named grouping of entries. Folders nest through `parent_id`; `None`
/// places the folder at the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    id: String,
    pub name: String,
    pub(crate) parent_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl Folder {
    pub fn new(name: impl Into<String>, parent_id: Option<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CofferError::Validation("folder name cannot be empty".to_string()));
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            parent_id,
            created_at: Utc::now(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
