//! Server-rendered HTML views.
//!
//! This module handles:
//! - The shared page layout and stylesheet
//! - The login form
//! - The dashboard shell and its Home / Logs / Control panels

pub mod control;
pub mod dashboard;
pub mod login;
pub mod logs;

use std::str::FromStr;

use maud::{html, Markup, PreEscaped, DOCTYPE};
use strum::{Display, EnumString, IntoStaticStr};

pub use control::control_view;
pub use dashboard::{dashboard_page, home_view};
pub use login::login_page;
pub use logs::{pnl_logs_view, raw_logs_view};

/// Dashboard panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum View {
    /// Landing panel with the option cards.
    #[default]
    Home,
    /// Log viewer.
    Logs,
    /// Start/stop controls.
    Control,
}

impl View {
    /// Parse the `view` query parameter; anything unknown is `Home`.
    pub fn from_query(raw: Option<&str>) -> Self {
        raw.and_then(|s| View::from_str(s).ok()).unwrap_or_default()
    }
}

/// Which log feed the Logs panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum LogSource {
    /// Structured profit/loss records.
    #[default]
    Pnl,
    /// Raw bot process output.
    Raw,
}

impl LogSource {
    /// Parse the `source` query parameter; anything unknown is `Pnl`.
    pub fn from_query(raw: Option<&str>) -> Self {
        raw.and_then(|s| LogSource::from_str(s).ok()).unwrap_or_default()
    }
}

const STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: system-ui, -apple-system, sans-serif; background: #f4f6fb; color: #1f2937; line-height: 1.5; }
a { color: inherit; }
.navbar { background: #1e293b; color: #f8fafc; }
.nav-content { max-width: 1200px; margin: 0 auto; padding: 1rem 2rem; display: flex; justify-content: space-between; align-items: center; }
.logo { font-size: 1.4rem; }
.nav-links { display: flex; gap: .5rem; align-items: center; }
.nav-button, .logout-button { padding: .5rem 1rem; border-radius: 6px; text-decoration: none; border: 1px solid transparent; background: none; color: inherit; font: inherit; cursor: pointer; }
.nav-button.active { background: #3b82f6; }
.logout-button { border-color: #f87171; color: #fecaca; }
.main { max-width: 1200px; margin: 2rem auto; padding: 0 2rem; }
.card { background: #fff; border-radius: 10px; padding: 1.5rem; box-shadow: 0 1px 3px rgba(0,0,0,.08); margin-bottom: 1.5rem; }
.options-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(240px, 1fr)); gap: 1rem; margin-top: 1.5rem; }
.option-card { display: block; text-decoration: none; background: #fff; border-radius: 10px; padding: 1.5rem; box-shadow: 0 1px 3px rgba(0,0,0,.08); }
.header { display: flex; justify-content: space-between; align-items: flex-start; gap: 1rem; margin-bottom: 1rem; }
.actions { display: flex; gap: .5rem; flex-wrap: wrap; }
button { padding: .5rem 1rem; border-radius: 6px; border: none; cursor: pointer; font: inherit; }
button:disabled { opacity: .5; cursor: not-allowed; }
.start-button { background: #16a34a; color: #fff; }
.stop-button { background: #dc2626; color: #fff; }
.secondary-button { background: #e2e8f0; }
.error { background: #fee2e2; color: #991b1b; padding: .75rem 1rem; border-radius: 6px; margin-bottom: 1rem; }
.success { background: #dcfce7; color: #166534; padding: .75rem 1rem; border-radius: 6px; margin-bottom: 1rem; }
.bot-status { display: flex; align-items: center; gap: .5rem; margin-top: .25rem; }
.status-indicator { width: 10px; height: 10px; border-radius: 50%; background: #16a34a; }
.status-indicator.stopped { background: #9ca3af; }
.env-form { display: grid; gap: 1rem; margin-top: 1rem; }
.env-field label { display: block; font-weight: 600; font-family: monospace; margin-bottom: .25rem; }
.env-field input, .input-group input { width: 100%; padding: .5rem .75rem; border: 1px solid #cbd5e1; border-radius: 6px; font: inherit; }
.note { color: #64748b; font-size: .9rem; margin-top: 1rem; }
.table-container { overflow-x: auto; }
table { width: 100%; border-collapse: collapse; font-size: .9rem; }
th, td { padding: .5rem .75rem; border-bottom: 1px solid #e2e8f0; text-align: left; white-space: nowrap; }
th { background: #f1f5f9; }
.tone-long { color: #166534; font-weight: 600; }
.tone-short { color: #9a3412; font-weight: 600; }
.tone-profit { color: #166534; }
.tone-loss { color: #991b1b; }
.log-count, .empty { color: #64748b; }
.raw-output { background: #0f172a; color: #e2e8f0; padding: 1rem; border-radius: 6px; overflow-x: auto; max-height: 70vh; font-size: .85rem; }
.tabs { display: flex; gap: .5rem; margin-bottom: 1rem; }
.login-container { min-height: 100vh; display: flex; align-items: center; justify-content: center; }
.login-card { width: 360px; }
.login-card .title { text-align: center; }
.login-card .subtitle { text-align: center; color: #64748b; margin-bottom: 1.5rem; }
.input-group { margin-bottom: 1rem; }
.input-group label { display: block; margin-bottom: .25rem; font-weight: 600; }
.login-button { width: 100%; background: #3b82f6; color: #fff; }
"#;

/// Wrap `body` in the shared page shell.
pub fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                style { (PreEscaped(STYLE)) }
            }
            body { (body) }
        }
    }
}
