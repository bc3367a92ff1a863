// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messages delivered to the shell's event loop.
//!
//! Terminal input, the inactivity timer and the clipboard timer all run
//! outside the loop and report back through one channel, so every state
//! change happens on the loop itself.

use secrecy::SecretString;
use tokio::sync::mpsc;

#[derive(Debug)]
pub enum ShellEvent {
    /// The answer to the most recent input request.
    Input(InputReply),
    /// No activity for the configured auto-lock period.
    AutoLock,
    /// A clipboard clear timer elapsed. Only the timer started by the most
    /// recent copy carries the current generation.
    ClearClipboard { generation: u64 },
}

#[derive(Debug)]
pub enum InputReply {
    Line(String),
    Secret(SecretString),
    /// Ctrl-C at the prompt.
    Interrupted,
    /// Ctrl-D or closed stdin.
    Eof,
    Failed(String),
}

pub type EventSender = mpsc::UnboundedSender<ShellEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ShellEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
