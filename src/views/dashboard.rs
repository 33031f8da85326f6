//! Dashboard shell: navigation bar and the Home panel.

use maud::{html, Markup};

use super::{layout, View};

fn nav_link(target: View, active: View, label: &str) -> Markup {
    let class = if target == active {
        "nav-button active"
    } else {
        "nav-button"
    };
    html! {
        a class=(class) href={ "/dashboard?view=" (target) } { (label) }
    }
}

/// Render the dashboard with `content` as the active panel.
pub fn dashboard_page(active: View, content: Markup) -> Markup {
    layout(
        "Bot Manager - Dashboard",
        html! {
            nav class="navbar" {
                div class="nav-content" {
                    h1 class="logo" { "Bot Manager" }
                    div class="nav-links" {
                        (nav_link(View::Home, active, "Home"))
                        (nav_link(View::Logs, active, "Bot Logs"))
                        (nav_link(View::Control, active, "Start/Stop Bot"))
                        form method="post" action="/logout" {
                            button type="submit" class="logout-button" { "Logout" }
                        }
                    }
                }
            }
            main class="main" { (content) }
        },
    )
}

/// Landing panel with a card per option.
pub fn home_view() -> Markup {
    html! {
        div class="card" {
            h2 { "Welcome to Bot Manager" }
            p { "Select an option to get started" }
        }
        div class="options-grid" {
            a class="option-card" href="/dashboard?view=logs" {
                h3 { "View Bot Logs" }
                p { "Monitor bot activity and trading logs" }
            }
            a class="option-card" href="/dashboard?view=control" {
                h3 { "Start/Stop Bot" }
                p { "Control bot operations" }
            }
        }
    }
}
