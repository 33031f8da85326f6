//! Login form.

use maud::{html, Markup};

use super::layout;

/// Render the login page, optionally with an error and the last username.
pub fn login_page(error: Option<&str>, username: &str) -> Markup {
    layout(
        "Bot Manager - Login",
        html! {
            div class="login-container" {
                div class="card login-card" {
                    h1 class="title" { "Bot Manager" }
                    p class="subtitle" { "Please login to continue" }

                    form method="post" action="/login" {
                        div class="input-group" {
                            label for="username" { "Username" }
                            input id="username" name="username" type="text" value=(username)
                                required placeholder="Enter username";
                        }
                        div class="input-group" {
                            label for="password" { "Password" }
                            input id="password" name="password" type="password"
                                required placeholder="Enter password";
                        }

                        @if let Some(error) = error {
                            div class="error" { (error) }
                        }

                        button type="submit" class="login-button" { "Login" }
                    }
                }
            }
        },
    )
}
