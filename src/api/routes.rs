//! HTTP route definitions.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::client::BotApi;

use super::handlers::{
    dashboard, health, landing, login, logout, metrics, refresh_status, reload_env, start_bot,
    status, status_stream, stop_bot, AppState,
};

/// Create the dashboard router.
pub fn create_router<A: BotApi>(state: AppState<A>) -> Router {
    Router::new()
        // Login
        .route("/", get(landing::<A>))
        .route("/login", post(login::<A>))
        .route("/logout", post(logout::<A>))
        // Dashboard
        .route("/dashboard", get(dashboard::<A>))
        .route("/dashboard/bot/start", post(start_bot::<A>))
        .route("/dashboard/bot/stop", post(stop_bot::<A>))
        .route("/dashboard/env/reload", post(reload_env::<A>))
        .route("/dashboard/status", get(status::<A>))
        .route("/dashboard/status/refresh", post(refresh_status::<A>))
        .route("/dashboard/status/stream", get(status_stream::<A>))
        // Operations
        .route("/health", get(health))
        .route("/metrics", get(metrics::<A>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
