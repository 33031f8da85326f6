//! Integration tests for the bot manager.
//!
//! Each test starts a fake bot API on a loopback port and talks to it through
//! the real HTTP client, or through the full dashboard router.

use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};
use tower::ServiceExt;

use bot_manager::api::{create_router, AppState};
use bot_manager::client::{BotApi, Endpoint, Endpoints, EnvConfig, HttpBotApi};
use bot_manager::config::Config;
use bot_manager::error::ApiError;
use bot_manager::logs::LogTable;
use bot_manager::monitor::BotStatus;

/// Mutable state of the fake bot.
#[derive(Debug, Default)]
struct FakeBot {
    running: bool,
    pid: Option<u32>,
    start_bodies: Vec<Value>,
    reject_start: bool,
}

type Shared = Arc<Mutex<FakeBot>>;

async fn logs() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": [
            {"trade_id": "T1", "trade_type": "LONG", "pnl": 150.255, "exit_reason": "Take Profit"},
            {"trade_id": "T2", "trade_type": "SHORT", "pnl": -75, "exit_reason": "Stop Loss"},
        ],
        "count": 2,
    }))
}

async fn bot_logs_text() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "booting\nconnected to kite")
}

async fn bot_logs_lines() -> impl IntoResponse {
    Json(json!({"success": true, "data": ["line one", "line two"]}))
}

async fn env() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": {
            "KITE_REQUEST_TOKEN": "stored-token",
            "TRADING_QUANTITY": 75,
            "OPTION_EXPIRY": "25JAN",
        },
    }))
}

async fn start(State(bot): State<Shared>, Json(body): Json<Value>) -> impl IntoResponse {
    let mut bot = bot.lock().unwrap();
    bot.start_bodies.push(body);
    if bot.reject_start {
        return Json(json!({"success": false, "message": "Bot is already running"}));
    }
    bot.running = true;
    bot.pid = Some(31337);
    Json(json!({"success": true, "message": "Bot started", "pid": 31337}))
}

async fn stop(State(bot): State<Shared>) -> impl IntoResponse {
    let mut bot = bot.lock().unwrap();
    bot.running = false;
    bot.pid = None;
    Json(json!({"success": true, "message": "Bot stopped"}))
}

async fn status(State(bot): State<Shared>) -> impl IntoResponse {
    let bot = bot.lock().unwrap();
    Json(json!({"success": true, "running": bot.running, "pid": bot.pid}))
}

async fn broken_status() -> impl IntoResponse {
    Json(json!({"success": true, "state": "up"}))
}

async fn server_error() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "bot crashed")
}

/// Serve the fake bot and return its base URL.
async fn spawn_fake_bot(bot: Shared) -> String {
    let router = Router::new()
        .route("/api/logs", get(logs))
        .route("/api/bot/logs", get(bot_logs_text))
        .route("/api/bot/lines", get(bot_logs_lines))
        .route("/api/env", get(env))
        .route("/api/bot/start", post(start))
        .route("/api/bot/stop", post(stop))
        .route("/api/bot/status", get(status))
        .route("/api/bot/broken-status", get(broken_status))
        .route("/api/fail", get(server_error).post(server_error))
        .with_state(bot);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn config(base_url: &str) -> Config {
    Config {
        api_base_url: base_url.to_string(),
        login_username: "operator".to_string(),
        login_password: "hunter2".to_string(),
        http_timeout_ms: 5000,
        ..Config::default()
    }
}

fn client_with(base_url: &str, overrides: &[(Endpoint, &str)]) -> HttpBotApi {
    let endpoints = overrides
        .iter()
        .fold(Endpoints::new(base_url), |e, (endpoint, path)| {
            e.with_override(*endpoint, *path)
        });
    HttpBotApi::with_endpoints(reqwest::Client::new(), endpoints)
}

#[tokio::test]
async fn status_and_actions_round_trip_through_the_bot() {
    let bot = Shared::default();
    let base = spawn_fake_bot(bot.clone()).await;
    let client = assert_ok!(HttpBotApi::new(&config(&base)));

    let status = BotStatus::from(assert_ok!(client.bot_status().await));
    assert_eq!(status, BotStatus::Stopped);

    let env = EnvConfig {
        kite_request_token: "fresh-token".to_string(),
        trading_quantity: "50".to_string(),
        option_expiry: "25FEB".to_string(),
    };
    let started = assert_ok!(client.start_bot(&env).await);
    assert_eq!(started.pid, Some(31337));

    let status = BotStatus::from(assert_ok!(client.bot_status().await));
    assert_eq!(status.to_string(), "Bot Running (PID: 31337)");

    assert_ok!(client.stop_bot().await);
    let status = BotStatus::from(assert_ok!(client.bot_status().await));
    assert_eq!(status, BotStatus::Stopped);

    let bodies = bot.lock().unwrap().start_bodies.clone();
    assert_eq!(
        bodies,
        vec![json!({
            "KITE_REQUEST_TOKEN": "fresh-token",
            "TRADING_QUANTITY": "50",
            "OPTION_EXPIRY": "25FEB",
        })]
    );
}

#[tokio::test]
async fn logs_and_env_are_decoded() {
    let base = spawn_fake_bot(Shared::default()).await;
    let client = client_with(&base, &[]);

    let table = LogTable::from_response(&assert_ok!(client.fetch_logs().await));
    assert_eq!(table.count, 2);
    assert_eq!(table.rows.len(), 2);
    let pnl = table.columns.iter().position(|c| c.key == "pnl").unwrap();
    assert_eq!(table.rows[0][pnl].text, "150.26");
    assert_eq!(table.rows[1][pnl].text, "-75.00");

    let env = assert_ok!(client.fetch_env().await);
    assert_eq!(env.kite_request_token, "stored-token");
    assert_eq!(env.trading_quantity, "75");

    assert_eq!(
        assert_ok!(client.fetch_bot_logs().await),
        "booting\nconnected to kite"
    );
}

#[tokio::test]
async fn overrides_redirect_single_endpoints() {
    let base = spawn_fake_bot(Shared::default()).await;
    let absolute = format!("{}/api/bot/lines", base);
    let client = client_with(&base, &[(Endpoint::BotLogs, absolute.as_str())]);

    assert_eq!(assert_ok!(client.fetch_bot_logs().await), "line one\nline two");
    // Other endpoints keep their default paths.
    assert_ok!(client.fetch_env().await);
}

#[tokio::test]
async fn non_success_status_carries_code_and_body() {
    let base = spawn_fake_bot(Shared::default()).await;
    let client = client_with(&base, &[(Endpoint::Logs, "api/fail"), (Endpoint::StopBot, "/api/fail")]);

    let err = assert_err!(client.fetch_logs().await);
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "API Error: 500 - bot crashed");

    let err = assert_err!(client.stop_bot().await);
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
}

#[tokio::test]
async fn malformed_and_rejected_responses_are_typed() {
    let bot = Shared::default();
    bot.lock().unwrap().reject_start = true;
    let base = spawn_fake_bot(bot).await;
    let client = client_with(&base, &[(Endpoint::BotStatus, "/api/bot/broken-status")]);

    let err = assert_err!(client.bot_status().await);
    assert!(matches!(err, ApiError::Format(_)), "got {:?}", err);

    let err = assert_err!(client.start_bot(&EnvConfig::default()).await);
    assert_eq!(err.to_string(), "Bot is already running");
}

#[tokio::test]
async fn dashboard_drives_the_bot_end_to_end() {
    let bot = Shared::default();
    let base = spawn_fake_bot(bot.clone()).await;
    let cfg = config(&base);
    let client = assert_ok!(HttpBotApi::new(&cfg));
    let app = create_router(AppState::new(cfg, client));

    let login = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=operator&password=hunter2"))
        .unwrap();
    let response = app.clone().oneshot(login).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let start = Request::builder()
        .method("POST")
        .uri("/dashboard/bot/start")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::COOKIE, &cookie)
        .body(Body::from(
            "KITE_REQUEST_TOKEN=from-form&TRADING_QUANTITY=25&OPTION_EXPIRY=25MAR",
        ))
        .unwrap();
    let response = app.clone().oneshot(start).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/dashboard?view=control"
    );
    assert!(bot.lock().unwrap().running);

    let view = Request::builder()
        .uri("/dashboard?view=control")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(view).await.unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Bot started successfully! PID: 31337"));
    assert!(html.contains("Bot Running (PID: 31337)"));
    // The submitted values stay in the form instead of the bot's stored env.
    assert!(html.contains(r#"value="from-form""#));
    assert!(!html.contains(r#"value="stored-token""#));

    let reload = Request::builder()
        .method("POST")
        .uri("/dashboard/env/reload")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(reload).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let view = Request::builder()
        .uri("/dashboard?view=control")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(view).await.unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains(r#"value="stored-token""#));
}
