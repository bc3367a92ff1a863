// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password tooling: random password and passphrase generation, entropy
//! based strength estimates, and a security audit over a whole vault.

pub mod audit;
pub mod passphrase;
pub mod password;
pub mod strength;
mod wordlist;

pub use audit::{AuditReport, audit_vault};
pub use passphrase::{PassphraseOptions, generate_passphrase};
pub use password::{PasswordOptions, generate_password};
pub use strength::{Strength, estimate_crack_time, password_entropy, password_strength, validate_password};
