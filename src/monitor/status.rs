//! Displayed bot status and the board that publishes it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;

use crate::client::BotStatusResponse;

/// Bot run-state as shown to the operator.
///
/// A PID only exists inside `Running`, so "stopped with a PID" cannot be
/// represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum BotStatus {
    /// Process is alive.
    Running {
        /// Process id, when the bot reported one.
        pid: Option<u32>,
    },
    /// Process is not running.
    #[default]
    Stopped,
}

impl BotStatus {
    /// Whether the bot is shown running.
    pub fn is_running(&self) -> bool {
        matches!(self, BotStatus::Running { .. })
    }

    /// PID on display, if any.
    pub fn pid(&self) -> Option<u32> {
        match self {
            BotStatus::Running { pid } => *pid,
            BotStatus::Stopped => None,
        }
    }
}

impl From<BotStatusResponse> for BotStatus {
    fn from(response: BotStatusResponse) -> Self {
        if response.running {
            BotStatus::Running { pid: response.pid }
        } else {
            BotStatus::Stopped
        }
    }
}

impl fmt::Display for BotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotStatus::Running { pid: Some(pid) } => write!(f, "Bot Running (PID: {})", pid),
            BotStatus::Running { pid: None } => write!(f, "Bot Running"),
            BotStatus::Stopped => write!(f, "Bot Stopped"),
        }
    }
}

/// Latest bot status plus a subscription for watchers.
///
/// Start/stop results bump an epoch; a poll result is only applied if no
/// action landed while its request was in flight.
#[derive(Debug)]
pub struct StatusBoard {
    tx: watch::Sender<BotStatus>,
    epoch: AtomicU64,
}

impl StatusBoard {
    /// Board showing `Stopped` until the first poll.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(BotStatus::Stopped);
        Self {
            tx,
            epoch: AtomicU64::new(0),
        }
    }

    /// Status currently on display.
    pub fn current(&self) -> BotStatus {
        *self.tx.borrow()
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<BotStatus> {
        self.tx.subscribe()
    }

    /// Epoch to capture before issuing a poll request.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Apply a poll result fetched since `started_at`.
    ///
    /// Returns `false` if an action superseded the poll, in which case the
    /// result is discarded.
    pub fn apply_poll(&self, started_at: u64, status: BotStatus) -> bool {
        let mut applied = false;
        self.tx.send_if_modified(|current| {
            if self.epoch.load(Ordering::SeqCst) != started_at {
                return false;
            }
            applied = true;
            let changed = *current != status;
            *current = status;
            changed
        });
        applied
    }

    /// Apply the optimistic result of a start/stop action.
    pub fn apply_action(&self, status: BotStatus) {
        self.tx.send_modify(|current| {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            *current = status;
        });
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}
