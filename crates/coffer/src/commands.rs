// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot subcommands: each opens the vault, does one thing and exits.

use std::time::Duration;

use coffer_config::CofferConfig;
use coffer_core::error::ObjectKind;
use coffer_core::{CofferError, Result};
use coffer_generator::{PassphraseOptions, PasswordOptions, generate_passphrase, generate_password};
use coffer_totp::TotpConfig;
use coffer_vault::container::{FORMAT_VERSION, MAGIC};
use coffer_vault::{
    BackupPolicy, Entry, FileRepository, KdfCost, Session, SessionOptions, Settings, Vault,
    prompt,
};
use colored::Colorize;
use secrecy::ExposeSecret;
use zeroize::Zeroizing;

use crate::clipboard::{self, ClipboardManager, Osc52Clipboard};
use crate::events::{self, ShellEvent};
use crate::output;

pub fn session_options(config: &CofferConfig) -> SessionOptions {
    SessionOptions {
        kdf_cost: KdfCost {
            iterations: config.kdf.iterations,
            memory_kib: config.kdf.memory_kib,
            parallelism: config.kdf.parallelism,
        },
        min_password_length: config.security.min_password_length,
        max_unlock_attempts: config.security.max_unlock_attempts,
        unlock_cooldown: Duration::from_secs(config.security.unlock_cooldown_seconds),
    }
}

/// Build a locked session for the configured vault file.
pub fn open_session(config: &CofferConfig) -> Session {
    let mut repository = FileRepository::new(&config.storage.vault_path);
    if config.storage.auto_backup {
        repository = repository.with_backups(BackupPolicy {
            dir: config.storage.backup_path.clone(),
            max_backups: config.storage.max_backups,
        });
    }
    Session::new(repository, session_options(config))
}

/// Settings a new vault starts with.
pub fn initial_settings(config: &CofferConfig) -> Settings {
    let generator = &config.password_generator;
    Settings {
        auto_lock_minutes: config.security.auto_lock_minutes,
        clipboard_clear_seconds: config.security.clipboard_clear_seconds,
        generator_length: generator.length,
        use_uppercase: generator.include_uppercase,
        use_lowercase: generator.include_lowercase,
        use_numbers: generator.include_numbers,
        use_symbols: generator.include_symbols,
    }
}

fn no_vault(session: &Session) -> CofferError {
    CofferError::Validation(format!(
        "no vault at {}; run `coffer init` first",
        session.repository().path().display()
    ))
}

fn unlocked(config: &CofferConfig) -> Result<Session> {
    let mut session = open_session(config);
    if !session.vault_exists() {
        return Err(no_vault(&session));
    }
    let password = prompt::read_password()?;
    session.unlock(&password)?;
    Ok(session)
}

pub fn entry_by_name<'a>(vault: &'a Vault, name: &str) -> Result<&'a Entry> {
    vault.find_entry_by_name(name).ok_or_else(|| CofferError::NotFound {
        kind: ObjectKind::Entry,
        id: name.to_string(),
    })
}

pub fn run_init(config: &CofferConfig) -> Result<()> {
    let mut session = open_session(config);
    if session.vault_exists() {
        return Err(CofferError::Validation(format!(
            "a vault already exists at {}",
            session.repository().path().display()
        )));
    }
    let min_length = config.security.min_password_length;
    let password = prompt::read_new_password(min_length)?;
    let strength = coffer_generator::validate_password(password.expose_secret(), min_length)?;
    session.create_vault_with(&password, initial_settings(config))?;
    println!(
        "created vault at {} (password strength: {strength})",
        session.repository().path().display()
    );
    Ok(())
}

pub fn run_list(
    config: &CofferConfig,
    query: Option<&str>,
    folder: Option<&str>,
    favorites: bool,
) -> Result<()> {
    let session = unlocked(config)?;
    let vault = session.vault()?;
    let folder_id = match folder {
        Some(name) => Some(
            vault
                .find_folder_by_name(name)
                .ok_or_else(|| CofferError::NotFound {
                    kind: ObjectKind::Folder,
                    id: name.to_string(),
                })?
                .id()
                .to_string(),
        ),
        None => None,
    };

    let entries: Vec<&Entry> = vault
        .search(query.unwrap_or(""))
        .into_iter()
        .filter(|e| folder_id.is_none() || e.folder_id == folder_id)
        .filter(|e| !favorites || e.favorite)
        .collect();
    print!("{}", output::entry_list(vault, &entries));
    Ok(())
}

/// Print one entry. Access times are not written back from here; reading
/// should not rewrite the vault file.
pub async fn run_get(config: &CofferConfig, name: &str, show: bool, copy: bool) -> Result<()> {
    let session = unlocked(config)?;
    let vault = session.vault()?;
    let entry = entry_by_name(vault, name)?;

    if copy {
        let password = entry
            .password()
            .filter(|p| !p.is_empty())
            .map(|p| Zeroizing::new(p.to_string()))
            .ok_or_else(|| {
                CofferError::Validation(format!("'{}' has no password to copy", entry.name))
            })?;
        let clear_after = clipboard::seconds(vault.settings.clipboard_clear_seconds);
        drop(session);
        return copy_and_wait(&password, clear_after).await;
    }

    print!(
        "{}",
        output::entry_detail(vault, entry, show, &config.ui.date_format)
    );
    Ok(())
}

/// Copy `text`, then keep the process alive until the clear timer fires or
/// the user presses Ctrl-C.
async fn copy_and_wait(text: &str, clear_after: Option<Duration>) -> Result<()> {
    let (tx, mut rx) = events::channel();
    let mut clipboard = ClipboardManager::new(Box::new(Osc52Clipboard::stderr()), clear_after, tx);
    clipboard.copy(text)?;

    let Some(delay) = clear_after else {
        eprintln!("copied to clipboard");
        return Ok(());
    };
    eprintln!(
        "copied to clipboard; clearing in {}s (Ctrl-C clears now)",
        delay.as_secs()
    );
    tokio::select! {
        Some(ShellEvent::ClearClipboard { generation }) = rx.recv() => {
            clipboard.on_timer(generation)?;
        }
        _ = tokio::signal::ctrl_c() => {
            clipboard.clear_now()?;
        }
    }
    eprintln!("{}", "clipboard cleared".dimmed());
    Ok(())
}

pub struct GenerateArgs {
    pub length: Option<usize>,
    pub passphrase: bool,
    pub words: Option<usize>,
    pub no_symbols: bool,
}

/// Generate a password or passphrase from the configured defaults with any
/// overrides applied. Does not touch the vault.
pub fn generate(config: &CofferConfig, args: &GenerateArgs) -> Result<Zeroizing<String>> {
    if args.passphrase {
        let mut options = PassphraseOptions::from(&config.passphrase_generator);
        if let Some(words) = args.words {
            options.word_count = words;
        }
        return generate_passphrase(&options).map(Zeroizing::new);
    }
    let mut options = PasswordOptions::from(&config.password_generator);
    if let Some(length) = args.length {
        options.length = length;
    }
    if args.no_symbols {
        options.symbols = false;
    }
    generate_password(&options).map(Zeroizing::new)
}

pub fn run_generate(config: &CofferConfig, args: &GenerateArgs) -> Result<()> {
    let secret = generate(config, args)?;
    println!("{}", secret.as_str());
    eprintln!("{}", output::strength_line(&secret).dimmed());
    Ok(())
}

pub fn totp_code_for(entry: &Entry) -> Result<coffer_totp::TotpCode> {
    let secret = entry
        .totp_secret()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| CofferError::Validation(format!("'{}' has no TOTP secret", entry.name)))?;
    let config = TotpConfig::from_stored(secret)?;
    Ok(config.generate_code()?)
}

pub fn run_totp(config: &CofferConfig, name: &str) -> Result<()> {
    let session = unlocked(config)?;
    let entry = entry_by_name(session.vault()?, name)?;
    let code = totp_code_for(entry)?;
    println!("{}", code.code);
    if config.ui.show_totp_countdown {
        eprintln!("{}", format!("valid for {}s", code.remaining_secs).dimmed());
    }
    Ok(())
}

pub fn run_audit(config: &CofferConfig) -> Result<()> {
    let session = unlocked(config)?;
    let vault = session.vault()?;
    let report = coffer_generator::audit_vault(vault);
    print!("{}", output::audit_summary(vault, &report));
    Ok(())
}

pub fn run_passwd(config: &CofferConfig) -> Result<()> {
    let mut session = open_session(config);
    if !session.vault_exists() {
        return Err(no_vault(&session));
    }
    let current = prompt::prompt_secret("Current master password: ")?;
    session.unlock(&current)?;

    let min_length = config.security.min_password_length;
    let new = prompt::read_new_password(min_length)?;
    coffer_generator::validate_password(new.expose_secret(), min_length)?;
    session.change_password(&current, &new)?;
    println!("master password changed");
    Ok(())
}

pub fn version_text() -> String {
    format!(
        "coffer {}\nvault format: {} v{FORMAT_VERSION}, AES-256-GCM, Argon2id",
        env!("CARGO_PKG_VERSION"),
        String::from_utf8_lossy(MAGIC),
    )
}
