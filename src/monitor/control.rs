//! Start/stop actions and the control panel's view state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use strum::{Display, IntoStaticStr};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::client::{BotApi, EnvConfig, StartBotResponse, StopBotResponse};
use crate::config::Config;
use crate::error::ControlError;
use crate::metrics;

use super::poller::{PollerHandle, StatusPoller};
use super::status::{BotStatus, StatusBoard};

/// Operator actions that talk to the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum BotAction {
    /// Start the bot with the form's env fields.
    Start,
    /// Stop the bot.
    Stop,
    /// Reload env fields from the bot.
    ReloadEnv,
}

/// Success and error banners of the control view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Banners {
    /// Error banner text.
    pub error: Option<String>,
    /// Success banner text.
    pub success: Option<String>,
}

/// Everything the control view renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSnapshot {
    /// Status on display.
    pub status: BotStatus,
    /// Env form values.
    pub env: EnvConfig,
    /// Current banners.
    pub banners: Banners,
    /// Action waiting on the bot, if any.
    pub in_flight: Option<BotAction>,
}

impl ControlSnapshot {
    /// Whether an action is waiting on the bot.
    pub fn busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the start button is enabled.
    pub fn can_start(&self) -> bool {
        !self.busy() && !self.status.is_running()
    }

    /// Whether the stop button is enabled.
    pub fn can_stop(&self) -> bool {
        !self.busy() && self.status.is_running()
    }
}

#[derive(Debug, Default)]
struct FormState {
    env: EnvConfig,
    banners: Banners,
    auto_load_attempted: bool,
}

/// Clears the in-flight action when dropped.
struct ActionSlot<'a> {
    slot: &'a Mutex<Option<BotAction>>,
}

impl Drop for ActionSlot<'_> {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// Shared control panel: status, env form, banners and the bot actions.
#[derive(Debug)]
pub struct ControlPanel<A> {
    api: Arc<A>,
    poller: Arc<StatusPoller<A>>,
    form: RwLock<FormState>,
    in_flight: Mutex<Option<BotAction>>,
    repoll_delay: Duration,
}

impl<A: BotApi> ControlPanel<A> {
    /// Create a panel with its own status board.
    pub fn new(api: Arc<A>, repoll_delay: Duration) -> Self {
        let board = Arc::new(StatusBoard::new());
        let poller = Arc::new(StatusPoller::new(Arc::clone(&api), board));
        Self {
            api,
            poller,
            form: RwLock::new(FormState::default()),
            in_flight: Mutex::new(None),
            repoll_delay,
        }
    }

    /// Create a panel using the configured re-poll delay.
    pub fn from_config(api: Arc<A>, config: &Config) -> Self {
        Self::new(api, Duration::from_millis(config.repoll_delay_ms))
    }

    /// Status board the panel publishes to.
    pub fn board(&self) -> &Arc<StatusBoard> {
        self.poller.board()
    }

    /// Status poller shared with the panel.
    pub fn poller(&self) -> &Arc<StatusPoller<A>> {
        &self.poller
    }

    /// Start background polling every `interval`.
    pub fn start_polling(&self, interval: Duration) -> PollerHandle {
        self.poller.spawn(interval)
    }

    /// Refresh status now, sharing any fetch already in flight.
    pub async fn refresh_status(&self) -> BotStatus {
        self.poller.refresh().await
    }

    /// Current view state.
    pub async fn snapshot(&self) -> ControlSnapshot {
        let form = self.form.read().await;
        ControlSnapshot {
            status: self.board().current(),
            env: form.env.clone(),
            banners: form.banners.clone(),
            in_flight: *self.in_flight.lock().unwrap_or_else(|e| e.into_inner()),
        }
    }

    fn begin(&self, action: BotAction) -> Result<ActionSlot<'_>, ControlError> {
        let mut slot = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(current) = *slot {
            warn!(%action, %current, "Rejecting action while another is in flight");
            return Err(ControlError::Busy);
        }
        *slot = Some(action);
        Ok(ActionSlot {
            slot: &self.in_flight,
        })
    }

    async fn fail<T>(&self, action: BotAction, err: ControlError) -> Result<T, ControlError> {
        warn!(%action, error = %err, "Bot action failed");
        metrics::inc_bot_actions(action.into(), "error");
        self.form.write().await.banners.error = Some(err.to_string());
        Err(err)
    }

    async fn succeed(&self, action: BotAction, message: String) {
        info!(%action, "{}", message);
        metrics::inc_bot_actions(action.into(), "ok");
        self.form.write().await.banners.success = Some(message);
    }

    /// Start the bot with `env`.
    ///
    /// On success the board shows the bot running right away and a status
    /// refresh follows after the re-poll delay. On failure the error banner
    /// is set and the board is left alone.
    #[instrument(skip(self, env))]
    pub async fn start(&self, env: EnvConfig) -> Result<StartBotResponse, ControlError> {
        let _slot = self.begin(BotAction::Start)?;
        {
            let mut form = self.form.write().await;
            form.banners = Banners::default();
            form.env = env.clone();
            // Submitted values win over the first-view load.
            form.auto_load_attempted = true;
        }

        if self.board().current().is_running() {
            return self.fail(BotAction::Start, ControlError::AlreadyRunning).await;
        }

        match self.api.start_bot(&env).await {
            Ok(response) => {
                self.board().apply_action(BotStatus::Running { pid: response.pid });
                let message = match response.pid {
                    Some(pid) => format!("Bot started successfully! PID: {}", pid),
                    None => "Bot started successfully!".to_string(),
                };
                self.succeed(BotAction::Start, message).await;
                self.poller.refresh_after(self.repoll_delay);
                Ok(response)
            }
            Err(e) => self.fail(BotAction::Start, e.into()).await,
        }
    }

    /// Stop the bot.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<StopBotResponse, ControlError> {
        let _slot = self.begin(BotAction::Stop)?;
        self.form.write().await.banners = Banners::default();

        if !self.board().current().is_running() {
            return self.fail(BotAction::Stop, ControlError::AlreadyStopped).await;
        }

        match self.api.stop_bot().await {
            Ok(response) => {
                self.board().apply_action(BotStatus::Stopped);
                self.succeed(BotAction::Stop, "Bot stopped successfully!".to_string())
                    .await;
                self.poller.refresh_after(self.repoll_delay);
                Ok(response)
            }
            Err(e) => self.fail(BotAction::Stop, e.into()).await,
        }
    }

    /// Replace the env form with the values the bot reports.
    #[instrument(skip(self))]
    pub async fn reload_env(&self) -> Result<EnvConfig, ControlError> {
        let _slot = self.begin(BotAction::ReloadEnv)?;
        {
            let mut form = self.form.write().await;
            form.banners.error = None;
            form.auto_load_attempted = true;
        }

        match self.api.fetch_env().await {
            Ok(env) => {
                self.form.write().await.env = env.clone();
                metrics::inc_bot_actions(BotAction::ReloadEnv.into(), "ok");
                Ok(env)
            }
            Err(e) => self.fail(BotAction::ReloadEnv, e.into()).await,
        }
    }

    /// Load env fields the first time the control view is opened.
    ///
    /// Later loads only happen through [`reload_env`](Self::reload_env). The
    /// first load leaves existing banners in place, so the result of an action
    /// taken before the view was ever rendered survives the redirect.
    pub async fn ensure_env_loaded(&self) {
        if self.form.read().await.auto_load_attempted {
            return;
        }
        let Ok(_slot) = self.begin(BotAction::ReloadEnv) else {
            return;
        };
        {
            let mut form = self.form.write().await;
            if form.auto_load_attempted {
                return;
            }
            form.auto_load_attempted = true;
        }

        match self.api.fetch_env().await {
            Ok(env) => {
                self.form.write().await.env = env;
                metrics::inc_bot_actions(BotAction::ReloadEnv.into(), "ok");
            }
            Err(e) => {
                let err = ControlError::from(e);
                warn!(error = %err, "Initial env load failed");
                metrics::inc_bot_actions(BotAction::ReloadEnv.into(), "error");
                self.form
                    .write()
                    .await
                    .banners
                    .error
                    .get_or_insert_with(|| err.to_string());
            }
        }
    }
}
