//! Bot API endpoint table and URL resolution.

use reqwest::Method;
use strum::{Display, EnumIter, IntoStaticStr};

use crate::config::Config;

/// One logical operation of the bot's HTTP API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Endpoint {
    /// Profit/loss log records.
    Logs,
    /// Raw bot process output.
    BotLogs,
    /// Editable environment fields.
    GetEnv,
    /// Start the bot process.
    StartBot,
    /// Stop the bot process.
    StopBot,
    /// Bot run-state.
    BotStatus,
}

impl Endpoint {
    /// Path used when no override is configured.
    pub fn default_path(&self) -> &'static str {
        match self {
            Endpoint::Logs => "/api/logs",
            Endpoint::BotLogs => "/api/bot/logs",
            Endpoint::GetEnv => "/api/env",
            Endpoint::StartBot => "/api/bot/start",
            Endpoint::StopBot => "/api/bot/stop",
            Endpoint::BotStatus => "/api/bot/status",
        }
    }

    /// HTTP method of the operation.
    pub fn method(&self) -> Method {
        match self {
            Endpoint::StartBot | Endpoint::StopBot => Method::POST,
            _ => Method::GET,
        }
    }
}

/// Resolved base URL plus per-endpoint overrides.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
    logs: Option<String>,
    bot_logs: Option<String>,
    get_env: Option<String>,
    start_bot: Option<String>,
    stop_bot: Option<String>,
    bot_status: Option<String>,
}

impl Endpoints {
    /// Endpoints with the default paths under `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            logs: None,
            bot_logs: None,
            get_env: None,
            start_bot: None,
            stop_bot: None,
            bot_status: None,
        }
    }

    /// Build from configuration, keeping only non-empty overrides.
    pub fn from_config(config: &Config) -> Self {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        Self {
            base_url: config.api_base_url.clone(),
            logs: non_empty(&config.api_logs_endpoint),
            bot_logs: non_empty(&config.api_bot_logs_endpoint),
            get_env: non_empty(&config.api_get_env_endpoint),
            start_bot: non_empty(&config.api_start_bot_endpoint),
            stop_bot: non_empty(&config.api_stop_bot_endpoint),
            bot_status: non_empty(&config.api_bot_status_endpoint),
        }
    }

    /// Set an override for one endpoint.
    pub fn with_override(mut self, endpoint: Endpoint, value: impl Into<String>) -> Self {
        let slot = match endpoint {
            Endpoint::Logs => &mut self.logs,
            Endpoint::BotLogs => &mut self.bot_logs,
            Endpoint::GetEnv => &mut self.get_env,
            Endpoint::StartBot => &mut self.start_bot,
            Endpoint::StopBot => &mut self.stop_bot,
            Endpoint::BotStatus => &mut self.bot_status,
        };
        *slot = Some(value.into());
        self
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn override_for(&self, endpoint: Endpoint) -> Option<&str> {
        match endpoint {
            Endpoint::Logs => self.logs.as_deref(),
            Endpoint::BotLogs => self.bot_logs.as_deref(),
            Endpoint::GetEnv => self.get_env.as_deref(),
            Endpoint::StartBot => self.start_bot.as_deref(),
            Endpoint::StopBot => self.stop_bot.as_deref(),
            Endpoint::BotStatus => self.bot_status.as_deref(),
        }
    }

    /// Full URL for an endpoint.
    ///
    /// Absolute overrides are used verbatim; anything else is joined onto the
    /// base URL with exactly one `/` in between.
    pub fn resolve(&self, endpoint: Endpoint) -> String {
        let path = self
            .override_for(endpoint)
            .unwrap_or_else(|| endpoint.default_path());

        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn defaults_resolve_under_base_url() {
        let endpoints = Endpoints::new("http://localhost:3001");
        assert_eq!(
            endpoints.resolve(Endpoint::Logs),
            "http://localhost:3001/api/logs"
        );
        assert_eq!(
            endpoints.resolve(Endpoint::BotStatus),
            "http://localhost:3001/api/bot/status"
        );
    }

    #[test]
    fn relative_override_gets_leading_slash() {
        let endpoints = Endpoints::new("http://bot:9000/").with_override(Endpoint::Logs, "v2/logs");
        assert_eq!(endpoints.resolve(Endpoint::Logs), "http://bot:9000/v2/logs");
    }

    #[test]
    fn absolute_override_used_verbatim() {
        let endpoints = Endpoints::new("http://localhost:3001")
            .with_override(Endpoint::StartBot, "https://other.host/launch");
        assert_eq!(
            endpoints.resolve(Endpoint::StartBot),
            "https://other.host/launch"
        );
        assert_eq!(
            endpoints.resolve(Endpoint::StopBot),
            "http://localhost:3001/api/bot/stop"
        );
    }

    #[test]
    fn blank_config_overrides_are_ignored() {
        let config = Config {
            api_logs_endpoint: Some("  ".to_string()),
            ..Config::default()
        };
        let endpoints = Endpoints::from_config(&config);
        assert_eq!(
            endpoints.resolve(Endpoint::Logs),
            "http://localhost:3001/api/logs"
        );
    }

    #[test]
    fn only_control_commands_are_posts() {
        for endpoint in Endpoint::iter() {
            let expected = matches!(endpoint, Endpoint::StartBot | Endpoint::StopBot);
            assert_eq!(endpoint.method() == Method::POST, expected, "{}", endpoint);
        }
    }
}
