// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-based one-time passwords (RFC 6238) and `otpauth://` URIs.
//!
//! Everything here is a pure function of the secret, the clock reading and
//! the code parameters. Nothing is persisted.

pub mod code;
pub mod uri;

pub use code::{Algorithm, TotpCode, TotpConfig, TotpError, DEFAULT_DIGITS, DEFAULT_PERIOD};
