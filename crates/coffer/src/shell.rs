// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `coffer shell` command implementation.
//!
//! An interactive session over one unlocked vault. Input, the auto-lock
//! timer and the clipboard timer all feed a single event channel; the loop
//! here is the only place that locks the session or clears the clipboard.

use coffer_config::CofferConfig;
use coffer_core::{CofferError, Result};
use coffer_generator::{PassphraseOptions, PasswordOptions, generate_passphrase, generate_password};
use coffer_totp::TotpConfig;
use coffer_vault::model::LoginData;
use coffer_vault::{Entry, EntryKind, Folder, Session, validate_new_password};
use colored::Colorize;
use secrecy::{ExposeSecret, SecretString};
use strum::{Display, EnumString};
use tracing::{debug, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::autolock::{self, AutoLock};
use crate::clipboard::{self, ClipboardManager, Osc52Clipboard};
use crate::commands;
use crate::events::{self, EventReceiver, InputReply, ShellEvent};
use crate::input::{InputRequest, InputSource, TerminalInput};
use crate::output;

const HELP: &str = "\
  list [query]        list entries, optionally filtered
  favorites           list favourite entries
  show <name>         show an entry with secrets masked
  reveal <name>       show an entry with secrets visible
  copy <name>         copy the password (also: copy-user, copy-totp)
  totp <name>         print the current one-time code
  add <name>          add a login
  rm <name>           delete an entry
  fav <name>          toggle favourite
  mv <name>           move an entry to a folder
  folders             list folders
  mkdir <name>        create a folder
  rmdir <name>        delete a folder, keeping its entries
  gen [length]        generate a password
  phrase [words]      generate a passphrase
  audit               report weak and reused passwords
  settings            show vault settings
  set <key> <value>   change auto-lock, clipboard or generator-length
  save                write the vault to disk
  lock | unlock       lock or unlock the vault
  passwd              change the master password
  quit                leave the shell";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum CopyField {
    Password,
    Username,
    #[strum(to_string = "one-time code")]
    Totp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum SettingKey {
    #[strum(to_string = "auto-lock", serialize = "autolock")]
    AutoLock,
    Clipboard,
    GeneratorLength,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    List(Option<String>),
    Favorites,
    Show { name: String, reveal: bool },
    Copy { name: String, field: CopyField },
    Totp(String),
    Add(String),
    Remove(String),
    ToggleFavorite(String),
    Move(String),
    Folders,
    MakeFolder(String),
    RemoveFolder(String),
    Generate(Option<usize>),
    Passphrase(Option<usize>),
    Audit,
    Settings,
    Set { key: SettingKey, value: u64 },
    Save,
    Lock,
    Unlock,
    Passwd,
    Quit,
}

fn usage(text: &str) -> CofferError {
    CofferError::Validation(format!("usage: {text}"))
}

fn number<T: std::str::FromStr>(value: &str, what: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CofferError::Validation(format!("{what} must be a whole number")))
}

fn optional_number(rest: &str, what: &str) -> Result<Option<usize>> {
    if rest.is_empty() {
        Ok(None)
    } else {
        number(rest, what).map(Some)
    }
}

/// Parse one shell line. Everything after the command word is taken as a
/// single argument, so entry names may contain spaces.
pub fn parse_command(line: &str) -> Result<ShellCommand> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let name = |text: &str| {
        if rest.is_empty() {
            Err(usage(text))
        } else {
            Ok(rest.to_string())
        }
    };

    let command = match word.to_lowercase().as_str() {
        "help" | "?" => ShellCommand::Help,
        "list" | "ls" => ShellCommand::List((!rest.is_empty()).then(|| rest.to_string())),
        "favorites" | "favs" => ShellCommand::Favorites,
        "show" => ShellCommand::Show {
            name: name("show <name>")?,
            reveal: false,
        },
        "reveal" => ShellCommand::Show {
            name: name("reveal <name>")?,
            reveal: true,
        },
        "copy" => ShellCommand::Copy {
            name: name("copy <name>")?,
            field: CopyField::Password,
        },
        "copy-user" => ShellCommand::Copy {
            name: name("copy-user <name>")?,
            field: CopyField::Username,
        },
        "copy-totp" => ShellCommand::Copy {
            name: name("copy-totp <name>")?,
            field: CopyField::Totp,
        },
        "totp" => ShellCommand::Totp(name("totp <name>")?),
        "add" => ShellCommand::Add(name("add <name>")?),
        "rm" | "delete" => ShellCommand::Remove(name("rm <name>")?),
        "fav" => ShellCommand::ToggleFavorite(name("fav <name>")?),
        "mv" | "move" => ShellCommand::Move(name("mv <name>")?),
        "folders" => ShellCommand::Folders,
        "mkdir" => ShellCommand::MakeFolder(name("mkdir <name>")?),
        "rmdir" => ShellCommand::RemoveFolder(name("rmdir <name>")?),
        "gen" | "generate" => ShellCommand::Generate(optional_number(rest, "length")?),
        "phrase" | "passphrase" => ShellCommand::Passphrase(optional_number(rest, "word count")?),
        "audit" => ShellCommand::Audit,
        "settings" => ShellCommand::Settings,
        "set" => {
            let (key, value) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| usage("set <auto-lock|clipboard|generator-length> <value>"))?;
            let key: SettingKey = key.parse().map_err(|_| {
                CofferError::Validation(format!(
                    "unknown setting '{key}'; expected auto-lock, clipboard or generator-length"
                ))
            })?;
            ShellCommand::Set {
                key,
                value: number(value.trim(), "value")?,
            }
        }
        "save" => ShellCommand::Save,
        "lock" => ShellCommand::Lock,
        "unlock" => ShellCommand::Unlock,
        "passwd" => ShellCommand::Passwd,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => {
            return Err(CofferError::Validation(format!(
                "unknown command '{other}'; type help for a list"
            )));
        }
    };
    Ok(command)
}

impl ShellCommand {
    /// Commands that work without an unlocked vault.
    fn runs_locked(&self) -> bool {
        matches!(
            self,
            Self::Help
                | Self::Generate(_)
                | Self::Passphrase(_)
                | Self::Lock
                | Self::Unlock
                | Self::Quit
        )
    }
}

enum Flow {
    Continue,
    Quit,
}

fn report(error: &CofferError) {
    eprintln!("{}: {error}", "error".red());
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Runs the `coffer shell` interactive session.
pub async fn run_shell(config: CofferConfig) -> Result<()> {
    let (tx, rx) = events::channel();
    let input = TerminalInput::spawn(tx.clone())?;
    let session = commands::open_session(&config);
    let clipboard = ClipboardManager::new(Box::new(Osc52Clipboard::stderr()), None, tx.clone());
    let autolock = AutoLock::spawn(None, tx);

    let mut shell = Shell::new(config, session, input, rx, autolock, clipboard);
    shell.run().await
}

pub struct Shell<I: InputSource> {
    config: CofferConfig,
    session: Session,
    input: I,
    events: EventReceiver,
    autolock: AutoLock,
    clipboard: ClipboardManager,
}

impl<I: InputSource> Shell<I> {
    pub fn new(
        config: CofferConfig,
        session: Session,
        input: I,
        events: EventReceiver,
        autolock: AutoLock,
        clipboard: ClipboardManager,
    ) -> Self {
        Self {
            config,
            session,
            input,
            events,
            autolock,
            clipboard,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        println!("{}", "coffer shell".bold().green());
        println!("Type {} for commands, {} to exit.\n", "help".yellow(), "quit".yellow());

        let result = match self.open().await {
            Ok(true) => self.repl().await,
            Ok(false) => Ok(()),
            Err(e) => Err(e),
        };
        self.shutdown();
        result
    }

    async fn repl(&mut self) -> Result<()> {
        loop {
            let prompt = self.prompt();
            let Some(line) = self.read_line(&prompt).await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            self.autolock.activity();

            let command = match parse_command(&line) {
                Ok(command) => command,
                Err(e) => {
                    report(&e);
                    continue;
                }
            };
            match self.execute(command).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => report(&e),
            }
        }
        println!("{}", "goodbye".dimmed());
        Ok(())
    }

    fn prompt(&self) -> String {
        if self.session.is_unlocked() {
            format!("{}> ", "coffer".green())
        } else {
            format!("{}> ", "coffer (locked)".yellow())
        }
    }

    fn shutdown(&mut self) {
        if self.config.security.clear_clipboard_on_exit {
            if let Err(e) = self.clipboard.clear_now() {
                warn!(error = %e, "failed to clear clipboard on exit");
            }
        }
        self.session.lock();
        self.autolock.stop();
    }

    // --- events ---

    /// Wait for the reply to the last input request, handling timer events
    /// that arrive in the meantime.
    async fn next_input(&mut self) -> Result<InputReply> {
        loop {
            let event = self
                .events
                .recv()
                .await
                .ok_or_else(|| CofferError::Internal("event channel closed".to_string()))?;
            if let Some(reply) = self.handle_event(event) {
                return Ok(reply);
            }
        }
    }

    fn handle_event(&mut self, event: ShellEvent) -> Option<InputReply> {
        match event {
            ShellEvent::Input(reply) => return Some(reply),
            ShellEvent::AutoLock => {
                if self.session.lock() {
                    println!();
                    println!("{}", "vault locked after inactivity".yellow());
                    self.clear_clipboard_on_lock();
                }
            }
            ShellEvent::ClearClipboard { generation } => match self.clipboard.on_timer(generation) {
                Ok(true) => debug!(generation, "clipboard clear timer fired"),
                Ok(false) => {}
                Err(e) => warn!(error = %e, "failed to clear clipboard"),
            },
        }
        None
    }

    fn clear_clipboard_on_lock(&mut self) {
        if self.config.security.clear_clipboard_on_lock {
            if let Err(e) = self.clipboard.clear_now() {
                warn!(error = %e, "failed to clear clipboard on lock");
            }
        }
    }

    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.input.request(InputRequest::Line {
            prompt: prompt.to_string(),
        })?;
        match self.next_input().await? {
            InputReply::Line(line) => Ok(Some(line)),
            InputReply::Interrupted | InputReply::Eof => Ok(None),
            InputReply::Failed(e) => Err(CofferError::Internal(format!("readline error: {e}"))),
            InputReply::Secret(_) => Err(CofferError::Internal("unexpected secret input".to_string())),
        }
    }

    async fn read_secret(&mut self, prompt: &str) -> Result<Option<SecretString>> {
        self.input.request(InputRequest::Secret {
            prompt: prompt.to_string(),
        })?;
        match self.next_input().await? {
            InputReply::Secret(secret) => Ok(Some(secret)),
            InputReply::Interrupted | InputReply::Eof => Ok(None),
            InputReply::Failed(e) => Err(CofferError::Internal(format!("password prompt failed: {e}"))),
            InputReply::Line(_) => Err(CofferError::Internal("unexpected echoed input".to_string())),
        }
    }

    // --- session ---

    async fn open(&mut self) -> Result<bool> {
        if self.session.vault_exists() {
            return self.unlock().await;
        }
        println!(
            "No vault at {}. Creating a new one.",
            self.session.repository().path().display()
        );
        self.create().await
    }

    async fn create(&mut self) -> Result<bool> {
        let min_length = self.config.security.min_password_length;
        loop {
            let Some(first) = self.read_secret("New master password: ").await? else {
                return Ok(false);
            };
            let Some(second) = self.read_secret("Confirm master password: ").await? else {
                return Ok(false);
            };
            let checked = validate_new_password(first.expose_secret(), second.expose_secret(), min_length)
                .and_then(|()| coffer_generator::validate_password(first.expose_secret(), min_length));
            match checked {
                Ok(strength) => {
                    let settings = commands::initial_settings(&self.config);
                    self.session.create_vault_with(&first, settings)?;
                    println!("vault created (password strength: {strength})");
                    self.apply_settings();
                    return Ok(true);
                }
                Err(e) if e.is_recoverable() => report(&e),
                Err(e) => return Err(e),
            }
        }
    }

    /// Prompt until the vault opens. Wrong passwords re-prompt; throttling
    /// and file errors end the attempt.
    async fn unlock(&mut self) -> Result<bool> {
        loop {
            let Some(password) = self.read_secret("Master password: ").await? else {
                return Ok(false);
            };
            match self.session.unlock(&password) {
                Ok(vault) => {
                    println!("{}", format!("unlocked, {} entries", vault.entries().len()).dimmed());
                    self.apply_settings();
                    return Ok(true);
                }
                Err(CofferError::DecryptionFailed) => report(&CofferError::DecryptionFailed),
                Err(e) => return Err(e),
            }
        }
    }

    /// Point the timers at the open vault's settings.
    fn apply_settings(&mut self) {
        let Ok(vault) = self.session.vault() else {
            return;
        };
        let settings = &vault.settings;
        self.autolock
            .set_timeout(autolock::minutes(settings.auto_lock_minutes));
        self.clipboard
            .set_clear_after(clipboard::seconds(settings.clipboard_clear_seconds));
    }

    fn persist(&mut self) -> Result<()> {
        self.session.save()?;
        println!("{}", "saved".dimmed());
        Ok(())
    }

    fn entry_id(&self, name: &str) -> Result<String> {
        Ok(commands::entry_by_name(self.session.vault()?, name)?.id().to_string())
    }

    fn folder_id(&self, name: &str) -> Result<Option<String>> {
        let name = name.trim();
        if name.is_empty() || name == "/" {
            return Ok(None);
        }
        let vault = self.session.vault()?;
        let folder = vault.find_folder_by_name(name).ok_or_else(|| CofferError::NotFound {
            kind: coffer_core::ObjectKind::Folder,
            id: name.to_string(),
        })?;
        Ok(Some(folder.id().to_string()))
    }

    // --- commands ---

    async fn execute(&mut self, command: ShellCommand) -> Result<Flow> {
        if !command.runs_locked() && !self.session.is_unlocked() {
            println!("{}", "vault is locked".yellow());
            if !self.unlock().await? {
                return Ok(Flow::Continue);
            }
        }

        match command {
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Quit => return Ok(Flow::Quit),
            ShellCommand::Lock => {
                if self.session.lock() {
                    println!("vault locked");
                }
                self.clear_clipboard_on_lock();
            }
            ShellCommand::Unlock => {
                if self.session.is_unlocked() {
                    println!("vault is already unlocked");
                } else {
                    self.unlock().await?;
                }
            }
            ShellCommand::Generate(length) => self.generate(length)?,
            ShellCommand::Passphrase(words) => {
                let mut options = PassphraseOptions::from(&self.config.passphrase_generator);
                if let Some(words) = words {
                    options.word_count = words;
                }
                let phrase = Zeroizing::new(generate_passphrase(&options)?);
                println!("{}", phrase.as_str());
                println!("{}", output::strength_line(&phrase).dimmed());
            }
            ShellCommand::List(query) => {
                let vault = self.session.vault()?;
                let entries = vault.search(query.as_deref().unwrap_or(""));
                print!("{}", output::entry_list(vault, &entries));
            }
            ShellCommand::Favorites => {
                let vault = self.session.vault()?;
                print!("{}", output::entry_list(vault, &vault.favorites()));
            }
            ShellCommand::Show { name, reveal } => {
                let id = self.entry_id(&name)?;
                self.session.vault_mut()?.view_entry(&id)?;
                let vault = self.session.vault()?;
                if let Some(entry) = vault.find_entry(&id) {
                    print!(
                        "{}",
                        output::entry_detail(vault, entry, reveal, &self.config.ui.date_format)
                    );
                }
            }
            ShellCommand::Copy { name, field } => self.copy(&name, field)?,
            ShellCommand::Totp(name) => {
                let entry = commands::entry_by_name(self.session.vault()?, &name)?;
                let code = commands::totp_code_for(entry)?;
                if self.config.ui.show_totp_countdown {
                    println!("{}  {}", code.code.bold(), format!("({}s)", code.remaining_secs).dimmed());
                } else {
                    println!("{}", code.code.bold());
                }
            }
            ShellCommand::Add(name) => self.add_login(name).await?,
            ShellCommand::Remove(name) => self.remove(&name).await?,
            ShellCommand::ToggleFavorite(name) => {
                let id = self.entry_id(&name)?;
                self.session.vault_mut()?.update_entry(&id, |entry| {
                    entry.favorite = !entry.favorite;
                    Ok(())
                })?;
                self.persist()?;
            }
            ShellCommand::Move(name) => {
                let id = self.entry_id(&name)?;
                let Some(target) = self.read_line("Folder (empty for top level): ").await? else {
                    return Ok(Flow::Continue);
                };
                let folder_id = self.folder_id(&target)?;
                self.session.vault_mut()?.update_entry(&id, |entry| {
                    entry.folder_id = folder_id;
                    Ok(())
                })?;
                self.persist()?;
            }
            ShellCommand::Folders => print!("{}", output::folder_list(self.session.vault()?)),
            ShellCommand::MakeFolder(name) => {
                let Some(parent) = self.read_line("Parent folder (empty for top level): ").await?
                else {
                    return Ok(Flow::Continue);
                };
                let parent_id = self.folder_id(&parent)?;
                self.session.vault_mut()?.add_folder(Folder::new(name, parent_id)?)?;
                self.persist()?;
            }
            ShellCommand::RemoveFolder(name) => {
                let Some(id) = self.folder_id(&name)? else {
                    return Err(usage("rmdir <name>"));
                };
                let removed = self.session.vault_mut()?.remove_folder(&id)?;
                println!("removed folder '{}'; its entries moved up", removed.name);
                self.persist()?;
            }
            ShellCommand::Audit => {
                let vault = self.session.vault()?;
                let report = coffer_generator::audit_vault(vault);
                print!("{}", output::audit_summary(vault, &report));
            }
            ShellCommand::Settings => {
                print!("{}", output::settings_summary(&self.session.vault()?.settings));
            }
            ShellCommand::Set { key, value } => {
                let settings = &mut self.session.vault_mut()?.settings;
                match key {
                    SettingKey::AutoLock => settings.auto_lock_minutes = value,
                    SettingKey::Clipboard => settings.clipboard_clear_seconds = value,
                    SettingKey::GeneratorLength => {
                        let length = usize::try_from(value)
                            .ok()
                            .filter(|l| *l >= coffer_generator::password::MIN_LENGTH)
                            .ok_or_else(|| {
                                CofferError::Validation(format!(
                                    "generator length must be at least {}",
                                    coffer_generator::password::MIN_LENGTH
                                ))
                            })?;
                        settings.generator_length = length;
                    }
                }
                self.session.vault_mut()?.touch();
                self.apply_settings();
                self.persist()?;
            }
            ShellCommand::Save => self.persist()?,
            ShellCommand::Passwd => self.change_password().await?,
        }
        Ok(Flow::Continue)
    }

    /// Generator defaults come from the config, overridden by the open
    /// vault's own settings.
    fn generate(&self, length: Option<usize>) -> Result<()> {
        let mut options = PasswordOptions::from(&self.config.password_generator);
        if let Ok(vault) = self.session.vault() {
            let settings = &vault.settings;
            options.length = settings.generator_length;
            options.uppercase = settings.use_uppercase;
            options.lowercase = settings.use_lowercase;
            options.numbers = settings.use_numbers;
            options.symbols = settings.use_symbols;
        }
        if let Some(length) = length {
            options.length = length;
        }
        let password = Zeroizing::new(generate_password(&options)?);
        println!("{}", password.as_str());
        println!("{}", output::strength_line(&password).dimmed());
        Ok(())
    }

    fn copy(&mut self, name: &str, field: CopyField) -> Result<()> {
        let entry = commands::entry_by_name(self.session.vault()?, name)?;
        let value = match field {
            CopyField::Password => entry.password().map(|p| Zeroizing::new(p.to_string())),
            CopyField::Username => entry.username().map(|u| Zeroizing::new(u.to_string())),
            CopyField::Totp => Some(Zeroizing::new(commands::totp_code_for(entry)?.code)),
        };
        let value = value
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CofferError::Validation(format!("'{}' has no {field}", entry.name)))?;
        let label = entry.name.clone();

        self.clipboard.copy(&value)?;
        match self.clipboard.clear_after() {
            Some(delay) => println!("copied {field} for {label}; clearing in {}s", delay.as_secs()),
            None => println!("copied {field} for {label}"),
        }
        Ok(())
    }

    async fn add_login(&mut self, name: String) -> Result<()> {
        if self.session.vault()?.find_entry_by_name(&name).is_some() {
            return Err(CofferError::Validation(format!(
                "an entry named '{name}' already exists"
            )));
        }
        let Some(username) = self.read_line("Username: ").await? else {
            return Ok(());
        };
        let Some(password) = self.read_secret("Password (empty to generate): ").await? else {
            return Ok(());
        };
        let Some(uri) = self.read_line("URL: ").await? else {
            return Ok(());
        };
        let Some(totp) = self.read_secret("TOTP secret or otpauth URI (optional): ").await? else {
            return Ok(());
        };

        let totp = non_empty(totp.expose_secret());
        if let Some(secret) = totp.as_deref() {
            TotpConfig::from_stored(secret)?;
        }
        let password = if password.expose_secret().is_empty() {
            let vault = self.session.vault()?;
            let mut options = PasswordOptions::from(&self.config.password_generator);
            options.length = vault.settings.generator_length;
            let generated = generate_password(&options)?;
            println!("generated password: {}", output::strength_line(&generated).dimmed());
            generated
        } else {
            password.expose_secret().to_string()
        };

        let entry = Entry::new(
            name,
            EntryKind::Login(LoginData {
                username: non_empty(&username),
                password: Some(password),
                uri: non_empty(&uri),
                totp_secret: totp,
            }),
        )?;
        let name = entry.name.clone();
        self.session.vault_mut()?.add_entry(entry)?;
        println!("added {}", name.bold());
        self.persist()
    }

    async fn remove(&mut self, name: &str) -> Result<()> {
        let id = self.entry_id(name)?;
        let Some(answer) = self.read_line(&format!("Delete '{name}'? [y/N] ")).await? else {
            return Ok(());
        };
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            println!("kept");
            return Ok(());
        }
        let mut removed = self.session.vault_mut()?.remove_entry(&id)?;
        removed.zeroize();
        self.persist()
    }

    async fn change_password(&mut self) -> Result<()> {
        let Some(current) = self.read_secret("Current master password: ").await? else {
            return Ok(());
        };
        let Some(first) = self.read_secret("New master password: ").await? else {
            return Ok(());
        };
        let Some(second) = self.read_secret("Confirm master password: ").await? else {
            return Ok(());
        };
        let min_length = self.config.security.min_password_length;
        validate_new_password(first.expose_secret(), second.expose_secret(), min_length)?;
        coffer_generator::validate_password(first.expose_secret(), min_length)?;
        self.session.change_password(&current, &first)?;
        println!("master password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::commands::tests::test_config;
    use crate::input::ScriptedInput;

    const PASSWORD: &str = "CorrectHorse1!";

    fn secret(value: &str) -> InputReply {
        InputReply::Secret(SecretString::from(value.to_string()))
    }

    fn line(value: &str) -> InputReply {
        InputReply::Line(value.to_string())
    }

    fn shell(
        config: &CofferConfig,
        replies: Vec<InputReply>,
    ) -> (Shell<ScriptedInput>, MemoryClipboard) {
        let (tx, rx) = events::channel();
        let input = ScriptedInput::new(tx.clone(), replies);
        let memory = MemoryClipboard::default();
        let clipboard = ClipboardManager::new(Box::new(memory.clone()), None, tx.clone());
        let autolock = AutoLock::spawn(None, tx);
        let session = commands::open_session(config);
        (
            Shell::new(config.clone(), session, input, rx, autolock, clipboard),
            memory,
        )
    }

    fn reopen(config: &CofferConfig) -> Session {
        let mut session = commands::open_session(config);
        session
            .unlock(&SecretString::from(PASSWORD.to_string()))
            .unwrap();
        session
    }

    #[test]
    fn parses_commands_with_spaced_names() {
        assert_eq!(
            parse_command("show  My Bank ").unwrap(),
            ShellCommand::Show {
                name: "My Bank".into(),
                reveal: false
            }
        );
        assert_eq!(
            parse_command("copy-user GitHub").unwrap(),
            ShellCommand::Copy {
                name: "GitHub".into(),
                field: CopyField::Username
            }
        );
        assert_eq!(parse_command("ls").unwrap(), ShellCommand::List(None));
        assert_eq!(parse_command("gen 24").unwrap(), ShellCommand::Generate(Some(24)));
        assert_eq!(parse_command("QUIT").unwrap(), ShellCommand::Quit);
    }

    #[test]
    fn parses_settings() {
        assert_eq!(
            parse_command("set auto-lock 10").unwrap(),
            ShellCommand::Set {
                key: SettingKey::AutoLock,
                value: 10
            }
        );
        assert_eq!(
            parse_command("set Clipboard 0").unwrap(),
            ShellCommand::Set {
                key: SettingKey::Clipboard,
                value: 0
            }
        );
        assert!(parse_command("set colour 3").is_err());
        assert!(parse_command("set clipboard soon").is_err());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_command("show").unwrap_err().to_string().starts_with("usage"));
        assert!(parse_command("frobnicate").unwrap_err().to_string().contains("unknown command"));
        assert!(parse_command("gen many").is_err());
    }

    #[tokio::test]
    async fn creates_vault_and_adds_login() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let (mut shell, _) = shell(
            &config,
            vec![
                secret(PASSWORD),
                secret(PASSWORD),
                line("add GitHub"),
                line("octocat"),
                secret("hunter2hunter2"),
                line("https://github.com"),
                secret(""),
                line("quit"),
            ],
        );
        shell.run().await.unwrap();
        assert!(!shell.session.is_unlocked());

        let session = reopen(&config);
        let entry = session.vault().unwrap().find_entry_by_name("github").unwrap();
        assert_eq!(entry.username(), Some("octocat"));
        assert_eq!(entry.password(), Some("hunter2hunter2"));
        assert_eq!(entry.uri(), Some("https://github.com"));
        assert_eq!(entry.totp_secret(), None);
    }

    #[tokio::test]
    async fn mismatched_confirmation_reprompts() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let (mut shell, _) = shell(
            &config,
            vec![
                secret(PASSWORD),
                secret("something else"),
                secret(PASSWORD),
                secret(PASSWORD),
                line("quit"),
            ],
        );
        shell.run().await.unwrap();
        assert!(config.storage.vault_path.exists());
        assert_eq!(shell.input.prompts.len(), 5);
    }

    #[tokio::test]
    async fn locked_command_prompts_for_unlock() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let (mut shell, _) = shell(
            &config,
            vec![
                secret(PASSWORD),
                secret(PASSWORD),
                line("lock"),
                line("list"),
                secret("WrongPassword"),
                secret(PASSWORD),
                line("quit"),
            ],
        );
        shell.run().await.unwrap();

        let secret_prompts = shell
            .input
            .prompts
            .iter()
            .filter(|p| matches!(p, InputRequest::Secret { prompt } if prompt == "Master password: "))
            .count();
        assert_eq!(secret_prompts, 2);
    }

    #[tokio::test]
    async fn auto_lock_event_locks_and_clears_clipboard() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let (mut shell, memory) = shell(&config, vec![]);
        shell
            .session
            .create_vault(&SecretString::from(PASSWORD.to_string()))
            .unwrap();
        shell.clipboard.copy("s3cret").unwrap();

        assert!(shell.handle_event(ShellEvent::AutoLock).is_none());
        assert!(!shell.session.is_unlocked());
        assert_eq!(memory.contents(), None);

        // A second lock request is harmless.
        assert!(shell.handle_event(ShellEvent::AutoLock).is_none());
        assert!(!shell.session.is_unlocked());
    }

    #[tokio::test]
    async fn stale_clipboard_timer_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let (mut shell, memory) = shell(&config, vec![]);
        shell.clipboard.copy("first").unwrap();
        shell.clipboard.copy("second").unwrap();

        shell.handle_event(ShellEvent::ClearClipboard { generation: 1 });
        assert_eq!(memory.contents().as_deref(), Some("second"));

        shell.handle_event(ShellEvent::ClearClipboard { generation: 2 });
        assert_eq!(memory.contents(), None);
    }

    #[tokio::test]
    async fn copy_puts_password_on_clipboard() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.security.clear_clipboard_on_exit = false;
        let (mut shell, memory) = shell(
            &config,
            vec![
                secret(PASSWORD),
                secret(PASSWORD),
                line("add GitHub"),
                line("octocat"),
                secret("hunter2hunter2"),
                line(""),
                secret(""),
                line("copy github"),
                line("quit"),
            ],
        );
        shell.run().await.unwrap();
        assert_eq!(memory.contents().as_deref(), Some("hunter2hunter2"));
    }

    #[tokio::test]
    async fn settings_change_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let (mut shell, _) = shell(
            &config,
            vec![
                secret(PASSWORD),
                secret(PASSWORD),
                line("set auto-lock 15"),
                line("set generator-length 2"),
                line("quit"),
            ],
        );
        shell.run().await.unwrap();

        let session = reopen(&config);
        let settings = &session.vault().unwrap().settings;
        assert_eq!(settings.auto_lock_minutes, 15);
        assert_eq!(settings.generator_length, 16);
    }

    #[tokio::test]
    async fn folders_and_moves_persist() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let (mut shell, _) = shell(
            &config,
            vec![
                secret(PASSWORD),
                secret(PASSWORD),
                line("mkdir Work"),
                line(""),
                line("add Jira"),
                line("ada"),
                secret(""),
                line(""),
                secret(""),
                line("mv Jira"),
                line("Work"),
                line("fav Jira"),
                line("quit"),
            ],
        );
        shell.run().await.unwrap();

        let session = reopen(&config);
        let vault = session.vault().unwrap();
        let work = vault.find_folder_by_name("Work").unwrap();
        let jira = vault.find_entry_by_name("Jira").unwrap();
        assert_eq!(jira.folder_id.as_deref(), Some(work.id()));
        assert!(jira.favorite);
        // Empty password input generates one.
        assert_eq!(jira.password().map(|p| p.chars().count()), Some(16));
    }

    #[tokio::test]
    async fn remove_requires_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let (mut shell, _) = shell(
            &config,
            vec![
                secret(PASSWORD),
                secret(PASSWORD),
                line("add Old"),
                line(""),
                secret("hunter2hunter2"),
                line(""),
                secret(""),
                line("rm Old"),
                line("n"),
                line("rm Old"),
                line("yes"),
                line("quit"),
            ],
        );
        shell.run().await.unwrap();

        let session = reopen(&config);
        assert!(session.vault().unwrap().entries().is_empty());
    }

    #[tokio::test]
    async fn eof_at_password_prompt_exits_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let (mut shell, _) = shell(&config, vec![]);
        shell.run().await.unwrap();
        assert!(!config.storage.vault_path.exists());
    }
}
