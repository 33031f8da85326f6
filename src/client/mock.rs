//! Mock bot API for unit testing.
//!
//! Keeps a tiny in-memory bot (running flag, pid, env, logs) so the poller,
//! the control actions and the router can be tested without a network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde_json::Value;

use crate::error::ApiError;

use super::http::BotApi;
use super::endpoints::Endpoint;
use super::types::{
    BotStatusResponse, EnvConfig, LogRecord, LogsResponse, StartBotResponse, StopBotResponse,
};

#[derive(Debug, Default)]
struct MockBot {
    running: bool,
    pid: Option<u32>,
    next_pid: u32,
    env: EnvConfig,
    logs: Vec<LogRecord>,
    bot_output: String,
    last_start_env: Option<EnvConfig>,
    /// Status reply that ignores the simulated process state.
    forced_status: Option<BotStatusResponse>,
}

/// Mock bot API for testing.
#[derive(Debug, Clone)]
pub struct MockBotApi {
    bot: Arc<Mutex<MockBot>>,
    /// HTTP status to fail each endpoint with.
    failures: Arc<Mutex<HashMap<Endpoint, u16>>>,
    /// Simulated latency per endpoint.
    latency: Arc<Mutex<HashMap<Endpoint, Duration>>>,
    calls: Arc<Mutex<HashMap<Endpoint, usize>>>,
}

impl MockBotApi {
    /// Create a stopped mock bot.
    pub fn new() -> Self {
        Self {
            bot: Arc::new(Mutex::new(MockBot {
                next_pid: 4242,
                ..MockBot::default()
            })),
            failures: Arc::new(Mutex::new(HashMap::new())),
            latency: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn bot(&self) -> MutexGuard<'_, MockBot> {
        self.bot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Mark the bot as already running.
    pub fn with_running(self, pid: u32) -> Self {
        {
            let mut bot = self.bot();
            bot.running = true;
            bot.pid = Some(pid);
        }
        self
    }

    /// Set the env fields the bot reports.
    pub fn with_env(self, env: EnvConfig) -> Self {
        self.bot().env = env;
        self
    }

    /// Set the profit/loss records the bot reports.
    pub fn with_logs(self, logs: Vec<Value>) -> Self {
        self.bot().logs = logs
            .into_iter()
            .map(|v| match v {
                Value::Object(map) => map,
                _ => LogRecord::new(),
            })
            .collect();
        self
    }

    /// Set the raw bot output.
    pub fn with_bot_output(self, output: impl Into<String>) -> Self {
        self.bot().bot_output = output.into();
        self
    }

    /// Fail every call to `endpoint` with the given HTTP status.
    pub fn fail(&self, endpoint: Endpoint, status: u16) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(endpoint, status);
    }

    /// Stop failing calls to `endpoint`.
    pub fn recover(&self, endpoint: Endpoint) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&endpoint);
    }

    /// Delay every call to `endpoint`.
    pub fn delay(&self, endpoint: Endpoint, latency: Duration) {
        self.latency
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(endpoint, latency);
    }

    /// Make the status endpoint report a fixed state.
    pub fn force_status(&self, running: bool, pid: Option<u32>) {
        self.bot().forced_status = Some(BotStatusResponse { running, pid });
    }

    /// Number of calls made to `endpoint`.
    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&endpoint)
            .copied()
            .unwrap_or(0)
    }

    /// Env the last start call carried.
    pub fn last_start_env(&self) -> Option<EnvConfig> {
        self.bot().last_start_env.clone()
    }

    /// Whether the simulated process is running.
    pub fn is_running(&self) -> bool {
        self.bot().running
    }

    async fn enter(&self, endpoint: Endpoint) -> Result<(), ApiError> {
        *self
            .calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(endpoint)
            .or_default() += 1;

        let latency = self
            .latency
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&endpoint)
            .copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let failure = self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&endpoint)
            .copied();
        match failure {
            Some(status) => Err(ApiError::Status {
                status,
                body: "mock failure".to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Default for MockBotApi {
    fn default() -> Self {
        Self::new()
    }
}

impl BotApi for MockBotApi {
    async fn fetch_logs(&self) -> Result<LogsResponse, ApiError> {
        self.enter(Endpoint::Logs).await?;
        let data = self.bot().logs.clone();
        Ok(LogsResponse {
            count: data.len(),
            data,
        })
    }

    async fn fetch_bot_logs(&self) -> Result<String, ApiError> {
        self.enter(Endpoint::BotLogs).await?;
        Ok(self.bot().bot_output.clone())
    }

    async fn fetch_env(&self) -> Result<EnvConfig, ApiError> {
        self.enter(Endpoint::GetEnv).await?;
        Ok(self.bot().env.clone())
    }

    async fn start_bot(&self, env: &EnvConfig) -> Result<StartBotResponse, ApiError> {
        self.enter(Endpoint::StartBot).await?;
        let mut bot = self.bot();
        let pid = bot.next_pid;
        bot.next_pid += 1;
        bot.running = true;
        bot.pid = Some(pid);
        bot.env = env.clone();
        bot.last_start_env = Some(env.clone());
        Ok(StartBotResponse {
            message: "Bot started".to_string(),
            pid: Some(pid),
        })
    }

    async fn stop_bot(&self) -> Result<StopBotResponse, ApiError> {
        self.enter(Endpoint::StopBot).await?;
        let mut bot = self.bot();
        bot.running = false;
        bot.pid = None;
        Ok(StopBotResponse {
            message: "Bot stopped".to_string(),
        })
    }

    async fn bot_status(&self) -> Result<BotStatusResponse, ApiError> {
        self.enter(Endpoint::BotStatus).await?;
        let bot = self.bot();
        Ok(bot.forced_status.unwrap_or(BotStatusResponse {
            running: bot.running,
            pid: bot.pid,
        }))
    }
}
