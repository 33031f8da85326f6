//! Client for the external bot's HTTP API.
//!
//! This module handles:
//! - Endpoint resolution (base URL plus per-endpoint overrides)
//! - Request/response handling and shape validation
//! - Mock client for testing

pub mod endpoints;
pub mod http;
pub mod mock;
pub mod types;

pub use http::{BotApi, HttpBotApi};
pub use endpoints::{Endpoint, Endpoints};
pub use mock::MockBotApi;
pub use types::{
    ApiBody, BotStatusResponse, EnvConfig, LogRecord, LogsResponse, StartBotResponse,
    StopBotResponse,
};
