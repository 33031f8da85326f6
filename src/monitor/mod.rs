//! Bot run-state monitoring and control.
//!
//! This module handles:
//! - The displayed bot status and its subscription
//! - Periodic status polling with de-duplicated refreshes
//! - Start/stop/reload actions with optimistic updates

pub mod control;
pub mod poller;
pub mod status;

pub use control::{Banners, BotAction, ControlPanel, ControlSnapshot};
pub use poller::{PollerHandle, StatusPoller};
pub use status::{BotStatus, StatusBoard};
