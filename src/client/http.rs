//! HTTP client for the bot's API.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::metrics;

use super::endpoints::{Endpoint, Endpoints};
use super::types::{
    ApiBody, BotStatusResponse, EnvConfig, LogsResponse, StartBotResponse, StopBotResponse,
};

/// Operations the dashboard needs from the bot.
///
/// Implemented by [`HttpBotApi`] for the real bot and by
/// [`MockBotApi`](super::MockBotApi) in tests.
pub trait BotApi: Send + Sync + 'static {
    /// Fetch profit/loss log records.
    fn fetch_logs(&self) -> impl Future<Output = Result<LogsResponse, ApiError>> + Send;

    /// Fetch raw bot output as newline-joined text.
    fn fetch_bot_logs(&self) -> impl Future<Output = Result<String, ApiError>> + Send;

    /// Fetch the editable environment fields.
    fn fetch_env(&self) -> impl Future<Output = Result<EnvConfig, ApiError>> + Send;

    /// Start the bot with the given environment fields.
    fn start_bot(
        &self,
        env: &EnvConfig,
    ) -> impl Future<Output = Result<StartBotResponse, ApiError>> + Send;

    /// Stop the bot.
    fn stop_bot(&self) -> impl Future<Output = Result<StopBotResponse, ApiError>> + Send;

    /// Query whether the bot is running.
    fn bot_status(&self) -> impl Future<Output = Result<BotStatusResponse, ApiError>> + Send;
}

/// reqwest-backed client for the bot API.
#[derive(Debug, Clone)]
pub struct HttpBotApi {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Endpoint table.
    endpoints: Endpoints,
}

impl HttpBotApi {
    /// Create a client from config.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self::with_endpoints(http, Endpoints::from_config(config)))
    }

    /// Create a client from an existing reqwest client and endpoint table.
    pub fn with_endpoints(http: reqwest::Client, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }

    /// Endpoint table in use.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Perform one request and decode the body by content type.
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    async fn call<B: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        body: Option<&B>,
    ) -> Result<ApiBody, ApiError> {
        let _timer = metrics::timer_api_request(endpoint);
        let url = self.endpoints.resolve(endpoint);
        debug!(%url, "Calling bot API");

        let mut request = self
            .http
            .request(endpoint.method(), &url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(body) = body {
            request = request.json(body);
        }

        let result = self.send(request).await;
        if let Err(e) = &result {
            metrics::inc_api_failures(endpoint);
            warn!(%url, error = %e, "Bot API call failed");
        }
        result
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<ApiBody, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = if text.is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                text
            };
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);

        let text = response.text().await?;
        if is_json {
            serde_json::from_str(&text)
                .map(ApiBody::Json)
                .map_err(|e| ApiError::Format(format!("Invalid JSON response: {}", e)))
        } else {
            Ok(ApiBody::Text(text))
        }
    }
}

impl BotApi for HttpBotApi {
    async fn fetch_logs(&self) -> Result<LogsResponse, ApiError> {
        let body = self.call::<()>(Endpoint::Logs, None).await?;
        LogsResponse::from_body(body)
    }

    async fn fetch_bot_logs(&self) -> Result<String, ApiError> {
        let body = self.call::<()>(Endpoint::BotLogs, None).await?;
        Ok(body.into_log_text())
    }

    async fn fetch_env(&self) -> Result<EnvConfig, ApiError> {
        let body = self.call::<()>(Endpoint::GetEnv, None).await?;
        EnvConfig::from_body(body)
    }

    async fn start_bot(&self, env: &EnvConfig) -> Result<StartBotResponse, ApiError> {
        let body = self.call(Endpoint::StartBot, Some(env)).await?;
        StartBotResponse::from_body(body)
    }

    async fn stop_bot(&self) -> Result<StopBotResponse, ApiError> {
        let body = self.call::<()>(Endpoint::StopBot, None).await?;
        StopBotResponse::from_body(body)
    }

    async fn bot_status(&self) -> Result<BotStatusResponse, ApiError> {
        let body = self.call::<()>(Endpoint::BotStatus, None).await?;
        BotStatusResponse::from_body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation_works() {
        let config = Config {
            api_base_url: "http://bot.internal:3001".to_string(),
            ..Config::default()
        };
        let client = HttpBotApi::new(&config).unwrap();
        assert_eq!(client.endpoints().base_url(), "http://bot.internal:3001");
        assert_eq!(
            client.endpoints().resolve(Endpoint::GetEnv),
            "http://bot.internal:3001/api/env"
        );
    }

    #[tokio::test]
    async fn unreachable_bot_is_network_error() {
        let config = Config {
            // Nothing listens on the discard port.
            api_base_url: "http://127.0.0.1:9".to_string(),
            http_timeout_ms: 2000,
            ..Config::default()
        };
        let client = HttpBotApi::new(&config).unwrap();
        let err = client.bot_status().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)), "got {:?}", err);
    }
}
