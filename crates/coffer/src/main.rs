// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Coffer - a local, single-user secrets vault.
//!
//! This is the binary entry point. Running without a subcommand starts the
//! interactive shell.

mod autolock;
mod clipboard;
mod commands;
mod events;
mod input;
mod output;
mod shell;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::commands::GenerateArgs;

/// Coffer - a local, single-user secrets vault.
#[derive(Parser, Debug)]
#[command(name = "coffer", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Use this vault file instead of the configured one.
    #[arg(long, global = true, value_name = "PATH")]
    vault: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new, empty vault.
    Init,
    /// List entries, optionally filtered by a search query.
    List {
        query: Option<String>,
        /// Only entries directly in this folder.
        #[arg(long)]
        folder: Option<String>,
        /// Only favourite entries.
        #[arg(long)]
        favorites: bool,
    },
    /// Show one entry by name.
    Get {
        name: String,
        /// Print secrets instead of masking them.
        #[arg(long)]
        show: bool,
        /// Copy the password to the clipboard and clear it after the
        /// configured delay.
        #[arg(long, conflicts_with = "show")]
        copy: bool,
    },
    /// Generate a random password or passphrase.
    Generate {
        #[arg(long, short)]
        length: Option<usize>,
        /// Generate a word-based passphrase instead.
        #[arg(long)]
        passphrase: bool,
        /// Number of passphrase words.
        #[arg(long, requires = "passphrase")]
        words: Option<usize>,
        #[arg(long)]
        no_symbols: bool,
    },
    /// Print the current one-time code for an entry.
    Totp { name: String },
    /// Report weak and reused passwords.
    Audit,
    /// Change the master password.
    Passwd,
    /// Start an interactive session with auto-lock.
    Shell,
    /// Print version and vault format information.
    Version,
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("coffer={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    if matches!(cli.command, Some(Commands::Version)) {
        println!("{}", commands::version_text());
        return;
    }

    let loaded = match cli.config.as_deref() {
        Some(path) => coffer_config::load_and_validate_path(path),
        None => coffer_config::load_and_validate(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            coffer_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    if let Some(vault) = cli.vault {
        config.storage.vault_path = vault;
    }

    init_tracing(&config.ui.log_level);

    let result = match cli.command {
        Some(Commands::Init) => commands::run_init(&config),
        Some(Commands::List {
            query,
            folder,
            favorites,
        }) => commands::run_list(&config, query.as_deref(), folder.as_deref(), favorites),
        Some(Commands::Get { name, show, copy }) => {
            commands::run_get(&config, &name, show, copy).await
        }
        Some(Commands::Generate {
            length,
            passphrase,
            words,
            no_symbols,
        }) => commands::run_generate(
            &config,
            &GenerateArgs {
                length,
                passphrase,
                words,
                no_symbols,
            },
        ),
        Some(Commands::Totp { name }) => commands::run_totp(&config, &name),
        Some(Commands::Audit) => commands::run_audit(&config),
        Some(Commands::Passwd) => commands::run_passwd(&config),
        Some(Commands::Shell) | None => shell::run_shell(config).await,
        Some(Commands::Version) => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_get_with_global_vault_flag() {
        let cli = Cli::try_parse_from(["coffer", "get", "GitHub", "--vault", "/tmp/v.enc"]).unwrap();
        assert_eq!(cli.vault, Some(PathBuf::from("/tmp/v.enc")));
        match cli.command {
            Some(Commands::Get { name, show, copy }) => {
                assert_eq!(name, "GitHub");
                assert!(!show);
                assert!(!copy);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_and_copy_conflict() {
        assert!(Cli::try_parse_from(["coffer", "get", "x", "--show", "--copy"]).is_err());
    }

    #[test]
    fn words_requires_passphrase() {
        assert!(Cli::try_parse_from(["coffer", "generate", "--words", "5"]).is_err());
        assert!(Cli::try_parse_from(["coffer", "generate", "--passphrase", "--words", "5"]).is_ok());
    }

    #[test]
    fn no_subcommand_means_shell() {
        let cli = Cli::try_parse_from(["coffer"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = coffer_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.security.auto_lock_minutes, 5);
    }
}
