// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password acquisition via TTY prompt or the COFFER_PASSWORD
//! environment variable.

use coffer_core::{CofferError, Result};
use secrecy::{ExposeSecret, SecretString};

use crate::session::validate_new_password;

/// The environment variable name for providing the master password.
pub const PASSWORD_ENV_VAR: &str = "COFFER_PASSWORD";

fn from_env() -> Option<SecretString> {
    match std::env::var(PASSWORD_ENV_VAR) {
        Ok(value) if !value.is_empty() => Some(SecretString::from(value)),
        _ => None,
    }
}

fn stdin_is_terminal() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdin())
}

fn no_password_source() -> CofferError {
    CofferError::Validation(format!(
        "no master password provided; set {PASSWORD_ENV_VAR} or run interactively"
    ))
}

/// Read one secret line from the terminal without echo.
pub fn prompt_secret(label: &str) -> Result<SecretString> {
    rpassword::prompt_password(label)
        .map(SecretString::from)
        .map_err(|e| CofferError::io("failed to read password", e))
}

/// Get the master password from the environment or an interactive prompt.
///
/// Priority:
/// 1. `COFFER_PASSWORD` environment variable (for scripts)
/// 2. Interactive TTY prompt via `rpassword`
pub fn read_password() -> Result<SecretString> {
    if let Some(password) = from_env() {
        return Ok(password);
    }
    if stdin_is_terminal() {
        let password = prompt_secret("Master password: ")?;
        if password.expose_secret().is_empty() {
            return Err(CofferError::Validation("empty password not allowed".to_string()));
        }
        return Ok(password);
    }
    Err(no_password_source())
}

/// Get a new master password, prompting twice on a terminal.
///
/// A password taken from the environment skips confirmation but still has
/// to meet `min_length`.
pub fn read_new_password(min_length: usize) -> Result<SecretString> {
    if let Some(password) = from_env() {
        validate_new_password(password.expose_secret(), password.expose_secret(), min_length)?;
        return Ok(password);
    }
    if stdin_is_terminal() {
        let first = prompt_secret("New master password: ")?;
        let second = prompt_secret("Confirm master password: ")?;
        validate_new_password(first.expose_secret(), second.expose_secret(), min_length)?;
        return Ok(first);
    }
    Err(no_password_source())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn password_from_env_var() {
        // SAFETY: test-only env mutation, serialized with other env tests.
        unsafe { std::env::set_var(PASSWORD_ENV_VAR, "CorrectHorse1!") };
        let result = read_password();
        unsafe { std::env::remove_var(PASSWORD_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "CorrectHorse1!");
    }

    #[test]
    #[serial]
    fn new_password_from_env_checks_length() {
        unsafe { std::env::set_var(PASSWORD_ENV_VAR, "short") };
        let result = read_new_password(8);
        unsafe { std::env::remove_var(PASSWORD_ENV_VAR) };

        assert!(matches!(result, Err(CofferError::Validation(_))));
    }

    #[test]
    #[serial]
    fn empty_env_var_is_ignored() {
        unsafe { std::env::set_var(PASSWORD_ENV_VAR, "") };
        let result = from_env();
        unsafe { std::env::remove_var(PASSWORD_ENV_VAR) };

        assert!(result.is_none());
    }
}
