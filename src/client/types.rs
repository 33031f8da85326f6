//! Response types of the bot API and their shape checks.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// One profit/loss record. The schema belongs to the bot, so fields stay
/// untyped and are rendered by column name.
pub type LogRecord = Map<String, Value>;

/// Response body, decoded according to its declared content type.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiBody {
    /// `application/json` body.
    Json(Value),
    /// Any other body.
    Text(String),
}

impl ApiBody {
    fn json(&self) -> Option<&Value> {
        match self {
            ApiBody::Json(v) => Some(v),
            ApiBody::Text(_) => None,
        }
    }

    /// Flatten a bot-output body into newline-separated text.
    ///
    /// Accepts a plain string, an array of lines, or an object wrapping
    /// either under `data`.
    pub fn into_log_text(self) -> String {
        match self {
            ApiBody::Text(text) => text,
            ApiBody::Json(value) => normalize_log_value(value),
        }
    }
}

fn normalize_log_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(mut map) if map.contains_key("data") => {
            normalize_log_value(map.remove("data").unwrap_or(Value::Null))
        }
        Value::Null => String::new(),
        other => serde_json::to_string_pretty(&other).unwrap_or_default(),
    }
}

fn is_true(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

fn message_of(value: &Value) -> Option<String> {
    value
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Process id as reported by the bot; zero and non-integers mean "none".
fn pid_of(value: &Value) -> Option<u32> {
    value
        .get("pid")
        .and_then(Value::as_u64)
        .and_then(|pid| u32::try_from(pid).ok())
        .filter(|pid| *pid != 0)
}

/// `GET /api/logs` response.
#[derive(Debug, Clone, PartialEq)]
pub struct LogsResponse {
    /// Log records, in API order.
    pub data: Vec<LogRecord>,
    /// Total reported by the bot, or `data.len()` when absent.
    pub count: usize,
}

impl LogsResponse {
    /// Validate `{success: true, data: [...], count?}`.
    pub fn from_body(body: ApiBody) -> Result<Self, ApiError> {
        let invalid = || ApiError::Format("Invalid logs response format".to_string());
        let value = body.json().ok_or_else(invalid)?;

        if !is_true(value.get("success")) {
            return Err(invalid());
        }
        let items = value.get("data").and_then(Value::as_array).ok_or_else(invalid)?;

        let data: Vec<LogRecord> = items
            .iter()
            .map(|item| match item {
                Value::Object(map) => map.clone(),
                _ => LogRecord::new(),
            })
            .collect();

        let count = value
            .get("count")
            .and_then(Value::as_u64)
            .filter(|c| *c > 0)
            .map(|c| c as usize)
            .unwrap_or(data.len());

        Ok(Self { data, count })
    }
}

/// The three environment fields forwarded to the bot on start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Kite Connect request token.
    #[serde(rename = "KITE_REQUEST_TOKEN", default)]
    pub kite_request_token: String,
    /// Lot quantity per trade.
    #[serde(rename = "TRADING_QUANTITY", default)]
    pub trading_quantity: String,
    /// Option expiry the bot trades.
    #[serde(rename = "OPTION_EXPIRY", default)]
    pub option_expiry: String,
}

impl EnvConfig {
    /// Validate `{success: true, data: {...}}`.
    pub fn from_body(body: ApiBody) -> Result<Self, ApiError> {
        let invalid = || ApiError::Format("Invalid env response format".to_string());
        let value = body.json().ok_or_else(invalid)?;

        if !is_true(value.get("success")) {
            return Err(invalid());
        }
        let Some(Value::Object(data)) = value.get("data") else {
            return Err(invalid());
        };

        Ok(Self {
            kite_request_token: env_field(data, "KITE_REQUEST_TOKEN"),
            trading_quantity: env_field(data, "TRADING_QUANTITY"),
            option_expiry: env_field(data, "OPTION_EXPIRY"),
        })
    }
}

/// Env values are strings on the wire, but bots sometimes send bare numbers.
fn env_field(data: &Map<String, Value>, key: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// `POST /api/bot/start` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartBotResponse {
    /// Message from the bot.
    pub message: String,
    /// Process id of the started bot.
    pub pid: Option<u32>,
}

impl StartBotResponse {
    /// Validate `{success: true, message, pid}`.
    pub fn from_body(body: ApiBody) -> Result<Self, ApiError> {
        let value = body.json().cloned().unwrap_or(Value::Null);
        if !is_true(value.get("success")) {
            return Err(ApiError::Rejected(
                message_of(&value).unwrap_or_else(|| "Failed to start bot".to_string()),
            ));
        }
        Ok(Self {
            message: message_of(&value).unwrap_or_default(),
            pid: pid_of(&value),
        })
    }
}

/// `POST /api/bot/stop` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopBotResponse {
    /// Message from the bot.
    pub message: String,
}

impl StopBotResponse {
    /// Validate `{success: true, message}`.
    pub fn from_body(body: ApiBody) -> Result<Self, ApiError> {
        let value = body.json().cloned().unwrap_or(Value::Null);
        if !is_true(value.get("success")) {
            return Err(ApiError::Rejected(
                message_of(&value).unwrap_or_else(|| "Failed to stop bot".to_string()),
            ));
        }
        Ok(Self {
            message: message_of(&value).unwrap_or_default(),
        })
    }
}

/// `GET /api/bot/status` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotStatusResponse {
    /// Whether the bot process is alive.
    pub running: bool,
    /// Process id, when reported.
    pub pid: Option<u32>,
}

impl BotStatusResponse {
    /// Validate `{success, running: bool, pid?}`. Only the presence of
    /// `success` is checked, not its value.
    pub fn from_body(body: ApiBody) -> Result<Self, ApiError> {
        let invalid = || ApiError::Format("Invalid bot status response format".to_string());
        let value = body.json().ok_or_else(invalid)?;

        if value.get("success").is_none() {
            return Err(invalid());
        }
        let running = value.get("running").and_then(Value::as_bool).ok_or_else(invalid)?;

        Ok(Self {
            running,
            pid: pid_of(value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn logs_count_falls_back_to_length() {
        let body = ApiBody::Json(json!({
            "success": true,
            "data": [{"trade_id": "T1"}, {"trade_id": "T2"}]
        }));
        let logs = LogsResponse::from_body(body).unwrap();
        assert_eq!(logs.count, 2);
        assert_eq!(logs.data[1]["trade_id"], json!("T2"));
    }

    #[test]
    fn logs_without_data_array_is_format_error() {
        let body = ApiBody::Json(json!({"success": true, "data": {"a": 1}}));
        let err = LogsResponse::from_body(body).unwrap_err();
        assert_eq!(err.to_string(), "Invalid logs response format");

        let err = LogsResponse::from_body(ApiBody::Text("oops".into())).unwrap_err();
        assert!(matches!(err, ApiError::Format(_)));
    }

    #[test]
    fn env_fields_round_trip_with_upper_case_names() {
        let body = ApiBody::Json(json!({
            "success": true,
            "data": {"KITE_REQUEST_TOKEN": "tok", "TRADING_QUANTITY": 75}
        }));
        let env = EnvConfig::from_body(body).unwrap();
        assert_eq!(
            env,
            EnvConfig {
                kite_request_token: "tok".into(),
                trading_quantity: "75".into(),
                option_expiry: String::new(),
            }
        );
        let wire = serde_json::to_value(&env).unwrap();
        assert_eq!(wire["OPTION_EXPIRY"], json!(""));
    }

    #[test]
    fn start_rejection_uses_bot_message() {
        let body = ApiBody::Json(json!({"success": false, "message": "token expired"}));
        let err = StartBotResponse::from_body(body).unwrap_err();
        assert_eq!(err.to_string(), "token expired");

        let err = StopBotResponse::from_body(ApiBody::Json(json!({"success": false}))).unwrap_err();
        assert_eq!(err.to_string(), "Failed to stop bot");
    }

    #[test]
    fn status_requires_boolean_running() {
        let ok = BotStatusResponse::from_body(ApiBody::Json(
            json!({"success": false, "running": true, "pid": 1234}),
        ))
        .unwrap();
        assert_eq!(ok, BotStatusResponse { running: true, pid: Some(1234) });

        let err = BotStatusResponse::from_body(ApiBody::Json(json!({"success": true, "running": "yes"})))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid bot status response format");
    }

    #[test]
    fn bot_output_is_flattened() {
        let array = ApiBody::Json(json!(["started", {"level": "info"}]));
        assert_eq!(array.into_log_text(), "started\n{\"level\":\"info\"}");

        let wrapped = ApiBody::Json(json!({"data": ["a", "b"]}));
        assert_eq!(wrapped.into_log_text(), "a\nb");

        let text = ApiBody::Text("plain\noutput".into());
        assert_eq!(text.into_log_text(), "plain\noutput");
    }
}
