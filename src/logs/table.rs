//! Profit/loss log table: column order, labels and row tones.

use crate::client::{LogRecord, LogsResponse};

use super::format::format_cell;

/// Columns shown first, in this order, when present.
pub const PREFERRED_COLUMNS: [&str; 12] = [
    "trade_id",
    "option_name",
    "trade_type",
    "buy_nifty_price",
    "buy_option_price",
    "sell_nifty_price",
    "sell_option_price",
    "exit_reason",
    "buy_time",
    "sell_time",
    "pnl",
    "balance",
];

/// Preferred columns shown even when no record carries them.
const ALWAYS_SHOWN: usize = 10;

/// Emphasis applied to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Long trade.
    Long,
    /// Short trade.
    Short,
    /// Exit at take-profit.
    Profit,
    /// Exit at stop-loss.
    Loss,
}

impl Tone {
    /// CSS class for the tone.
    pub fn class(&self) -> &'static str {
        match self {
            Tone::Long => "tone-long",
            Tone::Short => "tone-short",
            Tone::Profit => "tone-profit",
            Tone::Loss => "tone-loss",
        }
    }
}

/// One table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Record key.
    pub key: String,
    /// Header text.
    pub label: String,
}

/// One rendered cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Display text.
    pub text: String,
    /// Optional emphasis.
    pub tone: Option<Tone>,
}

/// A rendered profit/loss table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTable {
    /// Columns in display order.
    pub columns: Vec<Column>,
    /// One row per record, cells aligned with `columns`.
    pub rows: Vec<Vec<Cell>>,
    /// Entry count reported by the bot.
    pub count: usize,
}

impl LogTable {
    /// Build the table for a logs response.
    pub fn from_response(response: &LogsResponse) -> Self {
        let columns: Vec<Column> = column_order(&response.data)
            .into_iter()
            .map(|key| Column {
                label: column_label(&key),
                key,
            })
            .collect();

        let rows = response
            .data
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|col| Cell {
                        text: format_cell(&col.key, record.get(&col.key)),
                        tone: tone_for(&col.key, record),
                    })
                    .collect()
            })
            .collect();

        Self {
            columns,
            rows,
            count: response.count,
        }
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Preferred columns first, then unknown keys in first-seen order.
pub fn column_order(records: &[LogRecord]) -> Vec<String> {
    let present = |key: &str| records.iter().any(|r| r.contains_key(key));

    let mut columns: Vec<String> = PREFERRED_COLUMNS
        .iter()
        .enumerate()
        .filter(|&(i, key)| i < ALWAYS_SHOWN || present(*key))
        .map(|(_, key)| key.to_string())
        .collect();

    for record in records {
        for key in record.keys() {
            if !PREFERRED_COLUMNS.contains(&key.as_str()) && !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// Header text for a column.
pub fn column_label(key: &str) -> String {
    let known = match key {
        "trade_id" => Some("Trade ID"),
        "option_name" => Some("Option Name"),
        "trade_type" => Some("Type"),
        "buy_nifty_price" => Some("Buy Nifty"),
        "buy_option_price" => Some("Buy Option"),
        "sell_nifty_price" => Some("Sell Nifty"),
        "sell_option_price" => Some("Sell Option"),
        "exit_reason" => Some("Exit Reason"),
        "buy_time" => Some("Buy Time"),
        "sell_time" => Some("Sell Time"),
        "pnl" => Some("P&L"),
        "balance" => Some("Balance"),
        _ => None,
    };
    if let Some(label) = known {
        return label.to_string();
    }

    key.split(|c: char| c == '_' || c == '-')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn tone_for(key: &str, record: &LogRecord) -> Option<Tone> {
    let text = record.get(key).and_then(|v| v.as_str());
    match key {
        "trade_type" => text.map(|t| if t == "LONG" { Tone::Long } else { Tone::Short }),
        "exit_reason" => match text {
            Some("Take Profit") => Some(Tone::Profit),
            Some("Stop Loss") => Some(Tone::Loss),
            _ => None,
        },
        _ => None,
    }
}
