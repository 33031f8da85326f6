//! Operator control panel for an external trading bot.
//!
//! The bot runs as its own process and exposes a small HTTP API. This crate
//! serves a password-protected dashboard on top of it: operators log in,
//! watch whether the bot is running, start it with a request token and
//! trading parameters, stop it, and read its profit/loss and raw logs.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`client`]: Bot API client and its response shapes
//! - [`session`]: Operator login, sessions and the page gate
//! - [`monitor`]: Status polling and start/stop actions
//! - [`logs`]: Profit/loss table layout and cell formatting
//! - [`views`]: Server-rendered HTML
//! - [`api`]: HTTP routes and handlers
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod logs;
pub mod metrics;
pub mod monitor;
pub mod session;
pub mod utils;
pub mod views;

pub use config::Config;
pub use error::{DashboardError, Result};
