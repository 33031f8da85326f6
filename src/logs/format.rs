//! Cell formatting by column-name heuristics.

use chrono::{DateTime, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

/// Placeholder for empty cells.
pub const EMPTY_CELL: &str = "-";

const TIMESTAMP_FORMAT: &str = "%m/%d/%Y, %I:%M:%S %p";

/// How a column's values are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Date/time values.
    Timestamp,
    /// Prices and money amounts.
    Amount,
    /// Anything else.
    Plain,
}

impl ColumnKind {
    /// Classify a column by its name.
    pub fn of(key: &str) -> Self {
        let key = key.to_ascii_lowercase();
        if key.ends_with("_time") || key.ends_with("_at") || key == "timestamp" {
            ColumnKind::Timestamp
        } else if key.contains("price") || key.contains("pnl") || key.contains("balance") {
            ColumnKind::Amount
        } else {
            ColumnKind::Plain
        }
    }
}

/// Whether a value renders as the empty placeholder.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Render one cell of column `key`.
pub fn format_cell(key: &str, value: Option<&Value>) -> String {
    let value = match value {
        Some(v) if !is_blank(v) => v,
        _ => return EMPTY_CELL.to_string(),
    };

    match (ColumnKind::of(key), value) {
        (ColumnKind::Timestamp, Value::String(s)) => {
            format_timestamp(s).unwrap_or_else(|| s.clone())
        }
        (ColumnKind::Amount, Value::Number(n)) => format_amount(n),
        (_, Value::String(s)) => s.clone(),
        (_, other) => other.to_string(),
    }
}

/// Format `MM/DD/YYYY, HH:MM:SS AM` from RFC 3339 or `YYYY-MM-DD HH:MM:SS`.
///
/// Offsets are kept as sent; no conversion to server local time.
pub fn format_timestamp(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.format(TIMESTAMP_FORMAT).to_string());
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
}

/// Two decimals, half away from zero.
fn format_amount(n: &serde_json::Number) -> String {
    match n.to_string().parse::<Decimal>() {
        Ok(d) => format!(
            "{:.2}",
            d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        ),
        Err(_) => n
            .as_f64()
            .map(|f| format!("{:.2}", f))
            .unwrap_or_else(|| n.to_string()),
    }
}
