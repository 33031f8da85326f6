//! Operator credentials and the login check.

use serde::Deserialize;

use crate::config::Config;

/// Username/password pair submitted by the login form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    /// Submitted username.
    #[serde(default)]
    pub username: String,
    /// Submitted password.
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    /// Build a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Checks submitted credentials against the configured reference pair.
#[derive(Clone)]
pub struct Authenticator {
    username: String,
    password: String,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Authenticator {
    /// Authenticator for the given reference pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Authenticator for `LOGIN_USERNAME` / `LOGIN_PASSWORD`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.login_username, &config.login_password)
    }

    /// Whether the submitted pair matches exactly.
    pub fn verify(&self, credentials: &Credentials) -> bool {
        // Evaluate both sides so a wrong username costs as much as a wrong password.
        let user_ok = constant_time_eq(credentials.username.as_bytes(), self.username.as_bytes());
        let pass_ok = constant_time_eq(credentials.password.as_bytes(), self.password.as_bytes());
        user_ok & pass_ok
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
