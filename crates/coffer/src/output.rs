// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text rendering for entries, folders and reports.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use coffer_generator::{AuditReport, estimate_crack_time, password_entropy, password_strength};
use coffer_vault::model::{CardData, IdentityData, LoginData};
use coffer_vault::{Entry, EntryKind, Settings, Vault, mask_secret};
use colored::Colorize;

/// One row per entry: favourite marker, name, kind, username and folder.
pub fn entry_list(vault: &Vault, entries: &[&Entry]) -> String {
    if entries.is_empty() {
        return format!("{}\n", "no entries".dimmed());
    }

    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|e| e.name.to_lowercase());

    let mut out = String::new();
    for entry in sorted {
        let star = if entry.favorite { "*".yellow() } else { " ".normal() };
        let folder = entry
            .folder_id
            .as_deref()
            .and_then(|id| vault.folder_path(id))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{star} {} {} {} {}",
            format!("{:<28}", entry.name).bold(),
            format!("{:<12}", entry.entry_type()).cyan(),
            format!("{:<24}", entry.username().unwrap_or("")),
            folder.dimmed(),
        );
    }
    let _ = writeln!(out, "{}", format!("{} entries", entries.len()).dimmed());
    out
}

fn field(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        let _ = writeln!(out, "  {:<12} {value}", format!("{label}:").dimmed());
    }
}

fn secret_field(out: &mut String, label: &str, value: Option<&str>, reveal: bool) {
    let shown = value.map(|v| if reveal { v.to_string() } else { mask_secret(v) });
    field(out, label, shown.as_deref());
}

fn date(value: DateTime<Utc>, format: &str) -> String {
    value.format(format).to_string()
}

/// Full view of one entry. Secrets are masked unless `reveal` is set.
pub fn entry_detail(vault: &Vault, entry: &Entry, reveal: bool, date_format: &str) -> String {
    let mut out = String::new();
    let marker = if entry.favorite { " *" } else { "" };
    let _ = writeln!(out, "{}{}", entry.name.bold(), marker.yellow());
    field(&mut out, "Type", Some(&entry.entry_type().to_string()));
    let folder = entry.folder_id.as_deref().and_then(|id| vault.folder_path(id));
    field(&mut out, "Folder", folder.as_deref());

    match &entry.kind {
        EntryKind::Login(login) => login_fields(&mut out, login, reveal),
        EntryKind::Card(card) => card_fields(&mut out, card, reveal),
        EntryKind::Identity(identity) => identity_fields(&mut out, identity, reveal),
        EntryKind::SecureNote => {}
    }

    if let Some(notes) = entry.notes.as_deref().filter(|n| !n.is_empty()) {
        let _ = writeln!(out, "  {}", "Notes:".dimmed());
        for line in notes.lines() {
            let _ = writeln!(out, "    {line}");
        }
    }
    for (key, value) in &entry.custom_fields {
        field(&mut out, key, Some(value));
    }
    if !entry.tags.is_empty() {
        let tags: Vec<&str> = entry.tags.iter().map(String::as_str).collect();
        field(&mut out, "Tags", Some(&tags.join(", ")));
    }

    field(&mut out, "Created", Some(&date(entry.created_at(), date_format)));
    field(&mut out, "Updated", Some(&date(entry.updated_at(), date_format)));
    let viewed = entry.accessed_at().map(|at| date(at, date_format));
    field(&mut out, "Viewed", viewed.as_deref());
    out
}

fn login_fields(out: &mut String, login: &LoginData, reveal: bool) {
    field(out, "Username", login.username.as_deref());
    secret_field(out, "Password", login.password.as_deref(), reveal);
    field(out, "URL", login.uri.as_deref());
    if login.totp_secret.as_deref().is_some_and(|s| !s.is_empty()) {
        field(out, "TOTP", Some("configured"));
    }
}

fn card_fields(out: &mut String, card: &CardData, reveal: bool) {
    field(out, "Cardholder", card.cardholder_name.as_deref());
    field(out, "Brand", card.brand.as_deref());
    secret_field(out, "Number", card.number.as_deref(), reveal);
    if let (Some(month), Some(year)) = (card.exp_month.as_deref(), card.exp_year.as_deref()) {
        field(out, "Expires", Some(&format!("{month}/{year}")));
    }
    secret_field(out, "CVV", card.cvv.as_deref(), reveal);
}

fn identity_fields(out: &mut String, identity: &IdentityData, reveal: bool) {
    let name = identity.full_name();
    field(out, "Name", Some(&name));
    field(out, "Email", identity.email.as_deref());
    field(out, "Phone", identity.phone.as_deref());
    let address: Vec<&str> = [
        &identity.address1,
        &identity.address2,
        &identity.city,
        &identity.state,
        &identity.postal_code,
        &identity.country,
    ]
    .into_iter()
    .filter_map(|part| part.as_deref().filter(|p| !p.is_empty()))
    .collect();
    if !address.is_empty() {
        field(out, "Address", Some(&address.join(", ")));
    }
    secret_field(out, "SSN", identity.ssn.as_deref(), reveal);
    secret_field(out, "Passport", identity.passport_number.as_deref(), reveal);
}

/// Every folder as a full path, with the number of entries directly in it.
pub fn folder_list(vault: &Vault) -> String {
    let mut rows: Vec<(String, usize)> = vault
        .folders()
        .iter()
        .filter_map(|folder| {
            let path = vault.folder_path(folder.id())?;
            Some((path, vault.entries_in_folder(Some(folder.id())).len()))
        })
        .collect();
    if rows.is_empty() {
        return format!("{}\n", "no folders".dimmed());
    }
    rows.sort_by_key(|(path, _)| path.to_lowercase());

    let mut out = String::new();
    for (path, count) in rows {
        let _ = writeln!(out, "{} {}", path.bold(), format!("({count})").dimmed());
    }
    out
}

/// One line rating a password, e.g. `Strong, about 97 bits, centuries to crack`.
pub fn strength_line(password: &str) -> String {
    let bits = password_entropy(password);
    format!(
        "{}, about {:.0} bits, {} to crack",
        password_strength(password),
        bits,
        estimate_crack_time(bits)
    )
}

fn entry_name(vault: &Vault, id: &str) -> String {
    vault
        .find_entry(id)
        .map(|e| e.name.clone())
        .unwrap_or_else(|| id.to_string())
}

pub fn audit_summary(vault: &Vault, report: &AuditReport) -> String {
    let mut out = String::new();
    let score = format!("{:.0}/100", report.score);
    let score = if report.is_clean() { score.green() } else { score.yellow() };
    let _ = writeln!(out, "Security score: {score}");

    if report.is_clean() {
        let _ = writeln!(out, "{}", "no weak or reused passwords".green());
        return out;
    }
    if !report.weak.is_empty() {
        let _ = writeln!(out, "{}", "Weak passwords:".red());
        for id in &report.weak {
            let _ = writeln!(out, "  {}", entry_name(vault, id));
        }
    }
    if !report.duplicates.is_empty() {
        let _ = writeln!(out, "{}", "Reused passwords:".red());
        for group in &report.duplicates {
            let names: Vec<String> = group.iter().map(|id| entry_name(vault, id)).collect();
            let _ = writeln!(out, "  {}", names.join(", "));
        }
    }
    out
}

fn minutes_or_off(value: u64, unit: &str) -> String {
    if value == 0 {
        "off".to_string()
    } else {
        format!("{value} {unit}")
    }
}

pub fn settings_summary(settings: &Settings) -> String {
    let mut out = String::new();
    let rows = [
        ("Auto-lock", minutes_or_off(settings.auto_lock_minutes, "min")),
        (
            "Clipboard",
            minutes_or_off(settings.clipboard_clear_seconds, "s"),
        ),
        ("Gen length", settings.generator_length.to_string()),
        ("Uppercase", settings.use_uppercase.to_string()),
        ("Lowercase", settings.use_lowercase.to_string()),
        ("Numbers", settings.use_numbers.to_string()),
        ("Symbols", settings.use_symbols.to_string()),
    ];
    for (label, value) in rows {
        field(&mut out, label, Some(&value));
    }
    out
}
