//! Application configuration loaded from environment variables.

use serde::Deserialize;
use url::Url;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Bot API ===
    /// Base URL of the bot's HTTP API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Override for the profit/loss logs endpoint.
    #[serde(default)]
    pub api_logs_endpoint: Option<String>,

    /// Override for the raw bot logs endpoint.
    #[serde(default)]
    pub api_bot_logs_endpoint: Option<String>,

    /// Override for the environment config endpoint.
    #[serde(default)]
    pub api_get_env_endpoint: Option<String>,

    /// Override for the start-bot endpoint.
    #[serde(default)]
    pub api_start_bot_endpoint: Option<String>,

    /// Override for the stop-bot endpoint.
    #[serde(default)]
    pub api_stop_bot_endpoint: Option<String>,

    /// Override for the bot status endpoint.
    #[serde(default)]
    pub api_bot_status_endpoint: Option<String>,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    // === Login ===
    /// Operator username.
    #[serde(default)]
    pub login_username: String,

    /// Operator password.
    #[serde(default)]
    pub login_password: String,

    /// Mark the session cookie `Secure` (enable behind TLS).
    #[serde(default)]
    pub cookie_secure: bool,

    /// Hours a login stays valid.
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,

    // === Control Panel ===
    /// Zerodha Kite API key used in the login link.
    #[serde(default = "default_kite_api_key")]
    pub kite_api_key: String,

    /// Seconds between status polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Delay before re-polling status after a start/stop action.
    #[serde(default = "default_repoll_delay_ms")]
    pub repoll_delay_ms: u64,

    // === Server Configuration ===
    /// HTTP server port for the dashboard.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Serve Prometheus metrics at /metrics.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_api_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_http_timeout_ms() -> u64 {
    10_000
}

fn default_session_ttl_hours() -> u64 {
    12
}

fn default_kite_api_key() -> String {
    "q8honpauyce77qm9".to_string()
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_repoll_delay_ms() -> u64 {
    1000
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_logs_endpoint: None,
            api_bot_logs_endpoint: None,
            api_get_env_endpoint: None,
            api_start_bot_endpoint: None,
            api_stop_bot_endpoint: None,
            api_bot_status_endpoint: None,
            http_timeout_ms: default_http_timeout_ms(),
            login_username: String::new(),
            login_password: String::new(),
            cookie_secure: false,
            session_ttl_hours: default_session_ttl_hours(),
            kite_api_key: default_kite_api_key(),
            poll_interval_secs: default_poll_interval_secs(),
            repoll_delay_ms: default_repoll_delay_ms(),
            port: default_port(),
            metrics_enabled: true,
            rust_log: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if let Err(e) = Url::parse(&self.api_base_url) {
            return Err(format!("API_BASE_URL is not a valid URL: {}", e));
        }

        if self.poll_interval_secs == 0 {
            return Err("POLL_INTERVAL_SECS must be at least 1".to_string());
        }

        if self.session_ttl_hours == 0 {
            return Err("SESSION_TTL_HOURS must be at least 1".to_string());
        }

        if self.login_username.is_empty() || self.login_password.is_empty() {
            return Err("LOGIN_USERNAME and LOGIN_PASSWORD are required".to_string());
        }

        Ok(())
    }

    /// Link that sends the operator to the Kite login page.
    pub fn kite_login_url(&self) -> String {
        format!(
            "https://kite.zerodha.com/connect/login?v=3&api_key={}",
            self.kite_api_key
        )
    }
}
