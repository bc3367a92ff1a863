// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Coffer secrets vault.
//!
//! Holds the error taxonomy shared by every crate in the workspace so that
//! cryptographic, codec, and storage failures surface to callers with one
//! consistent type.

pub mod error;

pub use error::{CofferError, CorruptReason, ObjectKind, Result};
