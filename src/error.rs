//! Unified error types for the bot manager.

use thiserror::Error;

/// Unified error type for the bot manager.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Bot API error.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Bot control action error.
    #[error(transparent)]
    Control(#[from] ControlError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while talking to the bot's HTTP API.
///
/// The `Display` text is what the operator sees in the error banner, so the
/// status variant keeps the `API Error: {status} - {body}` wording.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (connect failure, timeout,
    /// broken body stream).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The bot answered with a non-2xx status.
    #[error("API Error: {status} - {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, or the reason phrase when the body was empty.
        body: String,
    },

    /// The response succeeded but did not carry the expected fields.
    #[error("{0}")]
    Format(String),

    /// The bot replied `success: false` to a start/stop command.
    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    /// HTTP status code, when the error came from a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised by the start/stop/reload actions of the control panel.
#[derive(Error, Debug)]
pub enum ControlError {
    /// Another action is still waiting on the bot API.
    #[error("another action is already in progress")]
    Busy,

    /// Start requested while the bot is shown running.
    #[error("bot is already running")]
    AlreadyRunning,

    /// Stop requested while the bot is shown stopped.
    #[error("bot is not running")]
    AlreadyStopped,

    /// The underlying API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, DashboardError>;
