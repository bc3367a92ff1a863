// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal input on a dedicated thread.
//!
//! Reading a line blocks, so the shell asks for input with an
//! [`InputRequest`] and keeps serving timer events until the matching
//! [`ShellEvent::Input`] arrives.

use std::sync::mpsc;

use coffer_core::{CofferError, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use secrecy::SecretString;
use tracing::warn;

use crate::events::{EventSender, InputReply, ShellEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputRequest {
    /// An echoed line with history.
    Line { prompt: String },
    /// A line read without echo.
    Secret { prompt: String },
}

/// Where the shell's input comes from. Every request is answered with
/// exactly one [`ShellEvent::Input`] on the event channel.
pub trait InputSource {
    fn request(&mut self, request: InputRequest) -> Result<()>;
}

pub struct TerminalInput {
    requests: mpsc::Sender<InputRequest>,
}

impl TerminalInput {
    pub fn spawn(events: EventSender) -> Result<Self> {
        let (requests, incoming) = mpsc::channel();
        std::thread::Builder::new()
            .name("coffer-input".to_string())
            .spawn(move || reader_loop(incoming, events))
            .map_err(|e| CofferError::io("failed to start input thread", e))?;
        Ok(Self { requests })
    }
}

impl InputSource for TerminalInput {
    fn request(&mut self, request: InputRequest) -> Result<()> {
        self.requests
            .send(request)
            .map_err(|_| CofferError::Internal("input thread exited".to_string()))
    }
}

fn reader_loop(incoming: mpsc::Receiver<InputRequest>, events: EventSender) {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => Some(editor),
        Err(e) => {
            warn!(error = %e, "failed to initialize readline");
            None
        }
    };

    for request in incoming {
        let reply = match request {
            InputRequest::Line { prompt } => match editor.as_mut() {
                Some(editor) => read_line(editor, &prompt),
                None => InputReply::Failed("readline unavailable".to_string()),
            },
            InputRequest::Secret { prompt } => read_secret(&prompt),
        };
        if events.send(ShellEvent::Input(reply)).is_err() {
            break;
        }
    }
}

fn read_line(editor: &mut DefaultEditor, prompt: &str) -> InputReply {
    match editor.readline(prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                let _ = editor.add_history_entry(line.as_str());
            }
            InputReply::Line(line)
        }
        Err(ReadlineError::Interrupted) => InputReply::Interrupted,
        Err(ReadlineError::Eof) => InputReply::Eof,
        Err(e) => InputReply::Failed(e.to_string()),
    }
}

fn read_secret(prompt: &str) -> InputReply {
    match rpassword::prompt_password(prompt) {
        Ok(secret) => InputReply::Secret(SecretString::from(secret)),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => InputReply::Eof,
        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => InputReply::Interrupted,
        Err(e) => InputReply::Failed(e.to_string()),
    }
}

/// Replays canned answers, for driving the shell in tests.
#[cfg(test)]
pub(crate) struct ScriptedInput {
    replies: std::collections::VecDeque<InputReply>,
    events: EventSender,
    pub(crate) prompts: Vec<InputRequest>,
}

#[cfg(test)]
impl ScriptedInput {
    pub(crate) fn new(events: EventSender, replies: Vec<InputReply>) -> Self {
        Self {
            replies: replies.into(),
            events,
            prompts: Vec::new(),
        }
    }
}

#[cfg(test)]
impl InputSource for ScriptedInput {
    fn request(&mut self, request: InputRequest) -> Result<()> {
        self.prompts.push(request);
        let reply = self.replies.pop_front().unwrap_or(InputReply::Eof);
        self.events
            .send(ShellEvent::Input(reply))
            .map_err(|_| CofferError::Internal("event loop closed".to_string()))
    }
}
