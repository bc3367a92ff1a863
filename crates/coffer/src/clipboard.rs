// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Copying secrets to the clipboard and clearing them again.
//!
//! Each copy bumps a generation counter and schedules a clear timer tagged
//! with that generation. A timer from an earlier copy finds a newer
//! generation when it fires and does nothing, so copying twice in a row
//! never clears the second value early.

use std::io::Write;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use coffer_core::{CofferError, Result};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::events::{EventSender, ShellEvent};

/// Something that can hold clipboard text.
pub trait ClipboardBackend: Send {
    fn set_text(&mut self, text: &str) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// Sets the system clipboard through the terminal with OSC 52 escape
/// sequences. Works over SSH and needs no display server access.
pub struct Osc52Clipboard<W: Write + Send> {
    out: W,
}

impl Osc52Clipboard<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn emit(&mut self, payload: &str) -> Result<()> {
        let sequence = Zeroizing::new(format!("\x1b]52;c;{payload}\x07"));
        self.out
            .write_all(sequence.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|e| CofferError::io("failed to write clipboard sequence", e))
    }
}

impl<W: Write + Send> ClipboardBackend for Osc52Clipboard<W> {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let encoded = Zeroizing::new(STANDARD.encode(text.as_bytes()));
        self.emit(&encoded)
    }

    fn clear(&mut self) -> Result<()> {
        self.emit("")
    }
}

/// Clipboard clear delay for a seconds setting; zero disables.
pub fn seconds(value: u64) -> Option<Duration> {
    (value > 0).then(|| Duration::from_secs(value))
}

pub struct ClipboardManager {
    backend: Box<dyn ClipboardBackend>,
    clear_after: Option<Duration>,
    generation: u64,
    holding: bool,
    pending: Option<JoinHandle<()>>,
    events: EventSender,
}

impl ClipboardManager {
    pub fn new(
        backend: Box<dyn ClipboardBackend>,
        clear_after: Option<Duration>,
        events: EventSender,
    ) -> Self {
        Self {
            backend,
            clear_after,
            generation: 0,
            holding: false,
            pending: None,
            events,
        }
    }

    pub fn clear_after(&self) -> Option<Duration> {
        self.clear_after
    }

    /// Applies to the next copy; a running timer keeps its delay.
    pub fn set_clear_after(&mut self, clear_after: Option<Duration>) {
        self.clear_after = clear_after;
    }

    /// True while a copied secret may still be on the clipboard.
    #[cfg(test)]
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    pub fn copy(&mut self, text: &str) -> Result<()> {
        self.backend.set_text(text)?;
        self.generation += 1;
        self.holding = true;
        self.cancel_pending();

        if let Some(delay) = self.clear_after {
            let events = self.events.clone();
            let generation = self.generation;
            self.pending = Some(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = events.send(ShellEvent::ClearClipboard { generation });
            }));
        }
        debug!(generation = self.generation, "secret copied to clipboard");
        Ok(())
    }

    /// Handle an elapsed clear timer. Returns whether the clipboard was
    /// cleared.
    pub fn on_timer(&mut self, generation: u64) -> Result<bool> {
        if generation != self.generation {
            debug!(generation, current = self.generation, "ignoring stale clipboard timer");
            return Ok(false);
        }
        self.pending = None;
        self.clear_now()
    }

    /// Clear immediately, for lock and exit. Does nothing when no secret is
    /// held.
    pub fn clear_now(&mut self) -> Result<bool> {
        self.cancel_pending();
        if !self.holding {
            return Ok(false);
        }
        self.backend.clear()?;
        self.holding = false;
        info!("clipboard cleared");
        Ok(true)
    }

    fn cancel_pending(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

impl Drop for ClipboardManager {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

/// In-memory clipboard shared with the test that created it.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct MemoryClipboard {
    contents: std::sync::Arc<std::sync::Mutex<Option<String>>>,
}

#[cfg(test)]
impl MemoryClipboard {
    pub(crate) fn contents(&self) -> Option<String> {
        self.contents.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ClipboardBackend for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        *self.contents.lock().unwrap() = Some(text.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        *self.contents.lock().unwrap() = None;
        Ok(())
    }
}
