//! Logs panel: profit/loss table and raw bot output.

use maud::{html, Markup};

use crate::logs::LogTable;

use super::LogSource;

fn header(active: LogSource) -> Markup {
    let tab = |source: LogSource, label: &str| {
        let class = if source == active {
            "secondary-button nav-button active"
        } else {
            "secondary-button nav-button"
        };
        html! {
            a class=(class) href={ "/dashboard?view=logs&source=" (source) } { (label) }
        }
    };
    html! {
        div class="header" {
            h2 { "Bot Logs" }
            div class="actions" {
                (tab(LogSource::Pnl, "P&L Logs"))
                (tab(LogSource::Raw, "Bot Output"))
                a class="secondary-button nav-button" href={ "/dashboard?view=logs&source=" (active) } {
                    "Refresh"
                }
            }
        }
    }
}

/// Render the profit/loss table, or the error that prevented loading it.
pub fn pnl_logs_view(result: Result<LogTable, String>) -> Markup {
    html! {
        div class="card" {
            (header(LogSource::Pnl))
            @match result {
                Err(error) => {
                    div class="error" { (error) }
                }
                Ok(table) => {
                    @if table.count > 0 {
                        p class="log-count" { "Total: " (table.count) " entries" }
                    }
                    @if table.is_empty() {
                        p class="empty" { "No logs available" }
                    } @else {
                        div class="table-container" {
                            table {
                                thead {
                                    tr {
                                        @for col in &table.columns {
                                            th { (col.label) }
                                        }
                                    }
                                }
                                tbody {
                                    @for row in &table.rows {
                                        tr {
                                            @for cell in row {
                                                @if let Some(tone) = cell.tone {
                                                    td class=(tone.class()) { (cell.text) }
                                                } @else {
                                                    td { (cell.text) }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Render the raw bot output, or the error that prevented loading it.
pub fn raw_logs_view(result: Result<String, String>) -> Markup {
    html! {
        div class="card" {
            (header(LogSource::Raw))
            @match result {
                Err(error) => {
                    div class="error" { (error) }
                }
                Ok(text) => {
                    @if text.trim().is_empty() {
                        p class="empty" { "No bot output yet" }
                    } @else {
                        pre class="raw-output" { (text) }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiBody, LogsResponse};
    use serde_json::json;

    fn table(records: serde_json::Value) -> LogTable {
        let response = LogsResponse::from_body(ApiBody::Json(json!({
            "success": true,
            "data": records,
        })))
        .unwrap();
        LogTable::from_response(&response)
    }

    #[test]
    fn renders_rows_and_count() {
        let html = pnl_logs_view(Ok(table(json!([
            {"trade_id": "T1", "trade_type": "LONG"},
            {"trade_id": "T2", "trade_type": "SHORT"},
        ]))))
        .into_string();

        assert!(html.contains("Total: 2 entries"));
        assert_eq!(html.matches("<tr>").count(), 3);
        assert!(html.contains(r#"<td class="tone-long">LONG</td>"#));
        assert!(html.contains(r#"<td class="tone-short">SHORT</td>"#));
    }

    #[test]
    fn empty_table_shows_placeholder() {
        let html = pnl_logs_view(Ok(table(json!([])))).into_string();
        assert!(!html.contains("Total:"));
        assert!(html.contains("No logs available"));
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn error_is_shown_instead_of_table() {
        let html = pnl_logs_view(Err("API Error: 500 - boom".to_string())).into_string();
        assert!(html.contains("API Error: 500 - boom"));
        assert!(!html.contains("Total:"));
    }

    #[test]
    fn raw_output_is_escaped() {
        let html = raw_logs_view(Ok("line <1>\nline 2".to_string())).into_string();
        assert!(html.contains("line &lt;1&gt;\nline 2"));
        let empty = raw_logs_view(Ok("  \n".to_string())).into_string();
        assert!(empty.contains("No bot output yet"));
    }
}
