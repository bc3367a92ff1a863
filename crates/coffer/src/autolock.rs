// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inactivity timer that asks the shell to lock the vault.
//!
//! The timer runs as a background task and never touches the session. When
//! the deadline passes it posts [`ShellEvent::AutoLock`] and disarms until
//! the next activity report.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::events::{EventSender, ShellEvent};

#[derive(Debug)]
enum Control {
    Activity,
    SetTimeout(Option<Duration>),
}

/// Auto-lock period for a minutes setting; zero disables.
pub fn minutes(value: u64) -> Option<Duration> {
    (value > 0).then(|| Duration::from_secs(value.saturating_mul(60)))
}

pub struct AutoLock {
    control: mpsc::UnboundedSender<Control>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl AutoLock {
    /// Start the timer task. `None` starts it disarmed.
    pub fn spawn(timeout: Option<Duration>, events: EventSender) -> Self {
        let (control, control_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(timeout, control_rx, events, cancel.clone()));
        Self {
            control,
            cancel,
            task,
        }
    }

    /// Restart the inactivity countdown.
    pub fn activity(&self) {
        let _ = self.control.send(Control::Activity);
    }

    /// Change the period and restart the countdown from now.
    pub fn set_timeout(&self, timeout: Option<Duration>) {
        let _ = self.control.send(Control::SetTimeout(timeout));
    }

    /// Stop the task. Safe to call more than once.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    #[cfg(test)]
    pub fn is_stopped(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for AutoLock {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn run(
    mut timeout: Option<Duration>,
    mut control: mpsc::UnboundedReceiver<Control>,
    events: EventSender,
    cancel: CancellationToken,
) {
    let mut deadline = timeout.map(|t| Instant::now() + t);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("auto-lock timer stopped");
                break;
            }
            message = control.recv() => match message {
                Some(Control::Activity) => {
                    deadline = timeout.map(|t| Instant::now() + t);
                }
                Some(Control::SetTimeout(new_timeout)) => {
                    debug!(timeout_secs = ?new_timeout.map(|t| t.as_secs()), "auto-lock period changed");
                    timeout = new_timeout;
                    deadline = timeout.map(|t| Instant::now() + t);
                }
                None => break,
            },
            _ = sleep_until_deadline(deadline) => {
                deadline = None;
                debug!("inactivity period elapsed");
                if events.send(ShellEvent::AutoLock).is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events;

    /// Let the timer task observe pending control messages.
    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    fn fired(rx: &mut events::EventReceiver) -> usize {
        let mut count = 0;
        while let Ok(event) = rx.try_recv() {
            assert!(matches!(event, ShellEvent::AutoLock));
            count += 1;
        }
        count
    }

    #[test]
    fn zero_minutes_disables() {
        assert_eq!(minutes(0), None);
        assert_eq!(minutes(5), Some(Duration::from_secs(300)));
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_inactivity() {
        let (tx, mut rx) = events::channel();
        let timer = AutoLock::spawn(minutes(5), tx);
        settle().await;

        tokio::time::advance(Duration::from_secs(299)).await;
        settle().await;
        assert_eq!(fired(&mut rx), 0);

        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(fired(&mut rx), 1);

        // Disarmed until the next activity.
        tokio::time::advance(Duration::from_secs(900)).await;
        settle().await;
        assert_eq!(fired(&mut rx), 0);
        timer.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn activity_pushes_deadline_back() {
        let (tx, mut rx) = events::channel();
        let timer = AutoLock::spawn(minutes(5), tx);
        settle().await;

        tokio::time::advance(Duration::from_secs(240)).await;
        timer.activity();
        settle().await;

        tokio::time::advance(Duration::from_secs(240)).await;
        settle().await;
        assert_eq!(fired(&mut rx), 0);

        tokio::time::advance(Duration::from_secs(61)).await;
        settle().await;
        assert_eq!(fired(&mut rx), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn new_timeout_resets_countdown() {
        let (tx, mut rx) = events::channel();
        let timer = AutoLock::spawn(minutes(5), tx);
        settle().await;

        tokio::time::advance(Duration::from_secs(200)).await;
        timer.set_timeout(minutes(1));
        settle().await;

        tokio::time::advance(Duration::from_secs(59)).await;
        settle().await;
        assert_eq!(fired(&mut rx), 0);

        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(fired(&mut rx), 1);

        timer.set_timeout(None);
        settle().await;
        tokio::time::advance(Duration::from_secs(3600)).await;
        settle().await;
        assert_eq!(fired(&mut rx), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let (tx, mut rx) = events::channel();
        let timer = AutoLock::spawn(minutes(1), tx);
        timer.stop();
        timer.stop();
        settle().await;
        assert!(timer.is_stopped());

        tokio::time::advance(Duration::from_secs(120)).await;
        settle().await;
        assert_eq!(fired(&mut rx), 0);
    }
}
