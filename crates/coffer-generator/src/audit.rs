// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Whole-vault password hygiene report.

use std::collections::HashMap;

use coffer_vault::Vault;

use crate::strength::{Strength, password_strength};

/// Findings reference entries by id.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditReport {
    /// Entries whose password rates as [`Strength::Weak`].
    pub weak: Vec<String>,
    /// Groups of two or more entries sharing one password, in vault order.
    pub duplicates: Vec<Vec<String>>,
    /// 0 to 100; each weak entry and each duplicate group costs an equal share.
    pub score: f64,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.weak.is_empty() && self.duplicates.is_empty()
    }
}

pub fn audit_vault(vault: &Vault) -> AuditReport {
    let with_passwords: Vec<(&str, &str)> = vault
        .entries()
        .iter()
        .filter_map(|e| e.password().filter(|p| !p.is_empty()).map(|p| (e.id(), p)))
        .collect();

    let weak: Vec<String> = with_passwords
        .iter()
        .filter(|(_, password)| password_strength(password) == Strength::Weak)
        .map(|(id, _)| id.to_string())
        .collect();

    let mut group_of: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<String>> = Vec::new();
    for (id, password) in &with_passwords {
        let index = *group_of.entry(*password).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[index].push(id.to_string());
    }
    let duplicates: Vec<Vec<String>> = groups.into_iter().filter(|g| g.len() > 1).collect();

    let total = vault.entries().len();
    let score = if total == 0 {
        100.0
    } else {
        let issues = (weak.len() + duplicates.len()) as f64;
        (100.0 - issues / total as f64 * 100.0).max(0.0)
    };

    AuditReport {
        weak,
        duplicates,
        score,
    }
}
