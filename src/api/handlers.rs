//! HTTP handlers for the login page, dashboard and bot actions.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::FormRejection, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Redirect, Response,
    },
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use futures::Stream;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{BotApi, EnvConfig};
use crate::config::Config;
use crate::logs::LogTable;
use crate::monitor::{BotStatus, ControlPanel};
use crate::session::{Credentials, GuardDecision, Page, SessionManager, INVALID_CREDENTIALS};
use crate::views::{self, LogSource, View};

/// Where form actions land after they finish.
pub const CONTROL_VIEW_PATH: &str = "/dashboard?view=control";

/// Application state shared with handlers.
pub struct AppState<A> {
    /// Loaded configuration.
    pub config: Arc<Config>,
    /// Session handling.
    pub sessions: SessionManager,
    /// Status, env form and bot actions.
    pub panel: Arc<ControlPanel<A>>,
    /// Bot API client for the log views.
    pub api: Arc<A>,
    /// Prometheus handle, when metrics are enabled.
    pub metrics: Option<PrometheusHandle>,
}

// Manual impl: `A` itself need not be `Clone`.
impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            sessions: self.sessions.clone(),
            panel: Arc::clone(&self.panel),
            api: Arc::clone(&self.api),
            metrics: self.metrics.clone(),
        }
    }
}

impl<A: BotApi> AppState<A> {
    /// Create new app state with an in-memory session store.
    pub fn new(config: Config, api: A) -> Self {
        let api = Arc::new(api);
        let panel = Arc::new(ControlPanel::from_config(Arc::clone(&api), &config));
        Self {
            sessions: SessionManager::from_config(&config),
            config: Arc::new(config),
            panel,
            api,
            metrics: None,
        }
    }

    /// Replace the session manager.
    pub fn with_sessions(mut self, sessions: SessionManager) -> Self {
        self.sessions = sessions;
        self
    }

    /// Serve `/metrics` from `handle`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    fn authenticated(&self, jar: &CookieJar) -> bool {
        self.sessions.context(jar).authenticated
    }
}

/// Query string of the dashboard.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// `home`, `logs` or `control`.
    pub view: Option<String>,
    /// `pnl` or `raw`, for the logs view.
    pub source: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Displayed status as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusPayload {
    /// Whether the bot is shown running.
    pub running: bool,
    /// PID on display.
    pub pid: Option<u32>,
    /// Status line text.
    pub label: String,
}

impl From<BotStatus> for StatusPayload {
    fn from(status: BotStatus) -> Self {
        Self {
            running: status.is_running(),
            pid: status.pid(),
            label: status.to_string(),
        }
    }
}

fn redirect_to(page: Page) -> Response {
    Redirect::to(page.path()).into_response()
}

/// Landing page: the login form, or the dashboard when already logged in.
pub async fn landing<A: BotApi>(State(state): State<AppState<A>>, jar: CookieJar) -> Response {
    match state.sessions.context(&jar).enter(Page::Landing) {
        GuardDecision::Redirect(page) => redirect_to(page),
        GuardDecision::Render => Html(views::login_page(None, "").into_string()).into_response(),
    }
}

/// Check credentials and start a session.
pub async fn login<A: BotApi>(
    State(state): State<AppState<A>>,
    jar: CookieJar,
    Form(credentials): Form<Credentials>,
) -> Response {
    match state.sessions.login(jar, &credentials) {
        Ok(jar) => (jar, Redirect::to(Page::Dashboard.path())).into_response(),
        Err(jar) => {
            let page = views::login_page(Some(INVALID_CREDENTIALS), &credentials.username);
            (StatusCode::UNAUTHORIZED, jar, Html(page.into_string())).into_response()
        }
    }
}

/// End the session and return to the login form.
pub async fn logout<A: BotApi>(State(state): State<AppState<A>>, jar: CookieJar) -> Response {
    (state.sessions.logout(jar), Redirect::to(Page::Landing.path())).into_response()
}

/// Dashboard with the panel selected by `?view=`.
pub async fn dashboard<A: BotApi>(
    State(state): State<AppState<A>>,
    jar: CookieJar,
    Query(query): Query<DashboardQuery>,
) -> Response {
    if let GuardDecision::Redirect(page) = state.sessions.context(&jar).enter(Page::Dashboard) {
        return redirect_to(page);
    }

    let view = View::from_query(query.view.as_deref());
    debug!(%view, "Rendering dashboard");

    let content = match view {
        View::Home => views::home_view(),
        View::Logs => match LogSource::from_query(query.source.as_deref()) {
            LogSource::Pnl => {
                let table = state
                    .api
                    .fetch_logs()
                    .await
                    .map(|logs| LogTable::from_response(&logs))
                    .map_err(|e| e.to_string());
                views::pnl_logs_view(table)
            }
            LogSource::Raw => {
                let text = state.api.fetch_bot_logs().await.map_err(|e| e.to_string());
                views::raw_logs_view(text)
            }
        },
        View::Control => {
            state.panel.ensure_env_loaded().await;
            let snapshot = state.panel.snapshot().await;
            views::control_view(&snapshot, &state.config.kite_login_url())
        }
    };

    Html(views::dashboard_page(view, content).into_string()).into_response()
}

/// Start the bot with the submitted env fields.
pub async fn start_bot<A: BotApi>(
    State(state): State<AppState<A>>,
    jar: CookieJar,
    form: Result<Form<EnvConfig>, FormRejection>,
) -> Response {
    if !state.authenticated(&jar) {
        return redirect_to(Page::Landing);
    }
    let Form(env) = match form {
        Ok(form) => form,
        Err(rejection) => return rejection.into_response(),
    };
    // The outcome is shown through the panel's banners.
    let _ = state.panel.start(env).await;
    Redirect::to(CONTROL_VIEW_PATH).into_response()
}

/// Stop the bot.
pub async fn stop_bot<A: BotApi>(State(state): State<AppState<A>>, jar: CookieJar) -> Response {
    if !state.authenticated(&jar) {
        return redirect_to(Page::Landing);
    }
    let _ = state.panel.stop().await;
    Redirect::to(CONTROL_VIEW_PATH).into_response()
}

/// Reload the env form from the bot.
pub async fn reload_env<A: BotApi>(State(state): State<AppState<A>>, jar: CookieJar) -> Response {
    if !state.authenticated(&jar) {
        return redirect_to(Page::Landing);
    }
    let _ = state.panel.reload_env().await;
    Redirect::to(CONTROL_VIEW_PATH).into_response()
}

/// Poll the bot status now.
pub async fn refresh_status<A: BotApi>(
    State(state): State<AppState<A>>,
    jar: CookieJar,
) -> Response {
    if !state.authenticated(&jar) {
        return redirect_to(Page::Landing);
    }
    state.panel.refresh_status().await;
    Redirect::to(CONTROL_VIEW_PATH).into_response()
}

/// Current displayed status as JSON.
pub async fn status<A: BotApi>(State(state): State<AppState<A>>, jar: CookieJar) -> Response {
    if !state.authenticated(&jar) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(StatusPayload::from(state.panel.board().current())).into_response()
}

/// Server-sent `status` events, one per displayed status change.
pub async fn status_stream<A: BotApi>(
    State(state): State<AppState<A>>,
    jar: CookieJar,
) -> Response {
    if !state.authenticated(&jar) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let rx = state.panel.board().subscribe();
    Sse::new(status_events(rx))
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
        .into_response()
}

fn status_events(
    mut rx: tokio::sync::watch::Receiver<BotStatus>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        loop {
            let payload = StatusPayload::from(*rx.borrow_and_update());
            yield Ok(
                Event::default()
                    .event("status")
                    .data(serde_json::to_string(&payload).unwrap_or_default())
            );
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Prometheus exposition, or 404 when metrics are disabled.
pub async fn metrics<A: BotApi>(State(state): State<AppState<A>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_payload_carries_label() {
        let payload = StatusPayload::from(BotStatus::Running { pid: Some(9) });
        assert_eq!(
            payload,
            StatusPayload {
                running: true,
                pid: Some(9),
                label: "Bot Running (PID: 9)".to_string(),
            }
        );
        assert_eq!(StatusPayload::from(BotStatus::Stopped).pid, None);
    }

    #[tokio::test]
    async fn status_events_follow_the_board() {
        let board = crate::monitor::StatusBoard::new();
        let stream = status_events(board.subscribe());
        futures::pin_mut!(stream);

        assert!(stream.next().await.is_some());
        board.apply_action(BotStatus::Running { pid: Some(5) });
        assert!(stream.next().await.is_some());
    }
}
