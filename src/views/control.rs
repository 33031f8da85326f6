//! Start/Stop panel.

use maud::{html, Markup, PreEscaped};

use crate::monitor::{BotAction, ControlSnapshot};

/// Keeps the status line and buttons in sync with the status stream.
const STATUS_SCRIPT: &str = r#"
(function () {
  if (!window.EventSource) return;
  var label = document.getElementById('bot-status-label');
  var dot = document.getElementById('bot-status-dot');
  var start = document.getElementById('start-button');
  var stop = document.getElementById('stop-button');
  var busy = document.getElementById('control-card').dataset.busy === 'true';
  var source = new EventSource('/dashboard/status/stream');
  source.addEventListener('status', function (event) {
    var status = JSON.parse(event.data);
    label.textContent = status.label;
    dot.className = status.running ? 'status-indicator' : 'status-indicator stopped';
    start.disabled = busy || status.running;
    stop.disabled = busy || !status.running;
  });
})();
"#;

/// Render the control panel for `snapshot`.
pub fn control_view(snapshot: &ControlSnapshot, kite_login_url: &str) -> Markup {
    let running = snapshot.status.is_running();
    let busy = snapshot.busy();

    html! {
        div id="control-card" class="card" data-busy=(if busy { "true" } else { "false" }) {
            div class="header" {
                div {
                    h2 { "Bot Control" }
                    div id="bot-status" class="bot-status" {
                        span id="bot-status-dot"
                            class=(if running { "status-indicator" } else { "status-indicator stopped" }) {}
                        span id="bot-status-label" { (snapshot.status) }
                    }
                }
                div class="actions" {
                    form method="post" action="/dashboard/status/refresh" {
                        button id="refresh-button" type="submit" class="secondary-button"
                            disabled[busy] { "Refresh Status" }
                    }
                    form method="post" action="/dashboard/env/reload" {
                        button type="submit" class="secondary-button" disabled[busy] { "Reload Env" }
                    }
                    form method="post" action="/dashboard/bot/stop" {
                        button id="stop-button" type="submit" class="stop-button"
                            disabled[!snapshot.can_stop()] {
                            @if snapshot.in_flight == Some(BotAction::Stop) {
                                "Stopping..."
                            } @else {
                                "Stop Bot"
                            }
                        }
                    }
                }
            }

            @if let Some(error) = &snapshot.banners.error {
                div class="error" { (error) }
            }
            @if let Some(success) = &snapshot.banners.success {
                div class="success" { (success) }
            }

            p {
                a href=(kite_login_url) target="_blank" rel="noopener noreferrer" {
                    "Login to Kite to get a request token"
                }
            }

            h3 { "Environment Configuration" }
            form class="env-form" method="post" action="/dashboard/bot/start" {
                div class="env-field" {
                    label for="KITE_REQUEST_TOKEN" { "KITE_REQUEST_TOKEN" }
                    input id="KITE_REQUEST_TOKEN" name="KITE_REQUEST_TOKEN" type="text"
                        value=(snapshot.env.kite_request_token)
                        placeholder="Enter KITE_REQUEST_TOKEN";
                }
                div class="env-field" {
                    label for="TRADING_QUANTITY" { "TRADING_QUANTITY" }
                    input id="TRADING_QUANTITY" name="TRADING_QUANTITY" type="text"
                        value=(snapshot.env.trading_quantity)
                        placeholder="Enter TRADING_QUANTITY";
                }
                div class="env-field" {
                    label for="OPTION_EXPIRY" { "OPTION_EXPIRY" }
                    input id="OPTION_EXPIRY" name="OPTION_EXPIRY" type="text"
                        value=(snapshot.env.option_expiry)
                        placeholder="Enter OPTION_EXPIRY";
                }
                div {
                    button id="start-button" type="submit" class="start-button"
                        disabled[!snapshot.can_start()] {
                        @if snapshot.in_flight == Some(BotAction::Start) {
                            "Starting..."
                        } @else {
                            "Start Bot"
                        }
                    }
                }
            }

            p class="note" {
                "Starting the bot sends these values along with the start request."
            }
        }
        script { (PreEscaped(STATUS_SCRIPT)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EnvConfig;
    use crate::monitor::{Banners, BotStatus};

    fn snapshot(status: BotStatus) -> ControlSnapshot {
        ControlSnapshot {
            status,
            env: EnvConfig {
                kite_request_token: "tok\"en".to_string(),
                trading_quantity: "75".to_string(),
                option_expiry: "25JAN".to_string(),
            },
            banners: Banners::default(),
            in_flight: None,
        }
    }

    fn button<'a>(html: &'a str, id: &str) -> &'a str {
        let start = html.find(&format!(r#"id="{}""#, id)).unwrap();
        let end = start + html[start..].find('>').unwrap();
        &html[start..end]
    }

    #[test]
    fn running_bot_enables_stop_only() {
        let html = control_view(&snapshot(BotStatus::Running { pid: Some(1234) }), "https://kite")
            .into_string();
        assert!(html.contains("Bot Running (PID: 1234)"));
        assert!(button(&html, "start-button").contains("disabled"));
        assert!(!button(&html, "stop-button").contains("disabled"));
    }

    #[test]
    fn stopped_bot_disables_stop() {
        let html = control_view(&snapshot(BotStatus::Stopped), "https://kite").into_string();
        assert!(html.contains("Bot Stopped"));
        assert!(!button(&html, "start-button").contains("disabled"));
        assert!(button(&html, "stop-button").contains("disabled"));
    }

    #[test]
    fn in_flight_action_disables_actions() {
        let mut snap = snapshot(BotStatus::Stopped);
        snap.in_flight = Some(BotAction::Start);
        let html = control_view(&snap, "https://kite").into_string();
        assert!(html.contains("Starting..."));
        assert!(button(&html, "start-button").contains("disabled"));
        assert!(button(&html, "stop-button").contains("disabled"));
        assert!(button(&html, "refresh-button").contains("disabled"));
    }

    #[test]
    fn idle_panel_enables_refresh() {
        let html = control_view(&snapshot(BotStatus::Stopped), "https://kite").into_string();
        assert!(!button(&html, "refresh-button").contains("disabled"));
    }

    #[test]
    fn banners_and_form_values_render() {
        let mut snap = snapshot(BotStatus::Stopped);
        snap.banners.error = Some("API Error: 500 - boom".to_string());
        let html = control_view(&snap, "https://kite.zerodha.com/connect/login?v=3&api_key=k")
            .into_string();
        assert!(html.contains(r#"<div class="error">API Error: 500 - boom</div>"#));
        assert!(!html.contains(r#"class="success""#));
        assert!(html.contains(r#"value="tok&quot;en""#));
        assert!(html.contains(r#"name="TRADING_QUANTITY""#));
        assert!(html.contains("api_key=k"));
    }
}
