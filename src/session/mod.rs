//! Operator sessions.
//!
//! This module handles:
//! - Credential checks against the configured operator account
//! - Session persistence behind the [`SessionStore`] trait
//! - The landing/dashboard gate
//! - Session cookie handling

pub mod credentials;
pub mod guard;
pub mod store;

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{info, warn};

use crate::config::Config;
use crate::metrics;

pub use credentials::{Authenticator, Credentials};
pub use guard::{guard, GuardDecision, Page};
pub use store::{MemorySessionStore, SessionStore};

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE_NAME: &str = "bm_session";

/// Message shown when the credential check fails.
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Session lifetime from config, capped at a year.
fn session_ttl(config: &Config) -> chrono::Duration {
    let hours = config.session_ttl_hours.min(24 * 365) as i64;
    chrono::Duration::hours(hours)
}

/// Session state of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Session id from the cookie, if any.
    pub session_id: Option<String>,
    /// Whether the id names a live session.
    pub authenticated: bool,
}

impl SessionContext {
    /// Decide whether `page` may be shown for this session.
    pub fn enter(&self, page: Page) -> GuardDecision {
        guard(page, self.authenticated)
    }
}

/// Logs operators in and out and resolves sessions from cookies.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    authenticator: Authenticator,
    cookie_secure: bool,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("authenticator", &self.authenticator)
            .field("cookie_secure", &self.cookie_secure)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a manager over `store`.
    pub fn new(store: Arc<dyn SessionStore>, authenticator: Authenticator) -> Self {
        Self {
            store,
            authenticator,
            cookie_secure: false,
        }
    }

    /// In-memory manager configured from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(MemorySessionStore::with_ttl(session_ttl(config))),
            Authenticator::from_config(config),
        )
        .with_secure_cookie(config.cookie_secure)
    }

    /// Mark issued cookies `Secure`.
    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    /// Resolve the session carried by `jar`.
    pub fn context(&self, jar: &CookieJar) -> SessionContext {
        let session_id = jar.get(SESSION_COOKIE_NAME).map(|c| c.value().to_string());
        let authenticated = session_id
            .as_deref()
            .map(|id| self.store.is_active(id))
            .unwrap_or(false);
        SessionContext {
            session_id,
            authenticated,
        }
    }

    /// Check `credentials`; on success create a session and add its cookie.
    ///
    /// On failure the jar is returned unchanged and no session is created.
    pub fn login(&self, jar: CookieJar, credentials: &Credentials) -> Result<CookieJar, CookieJar> {
        if !self.authenticator.verify(credentials) {
            warn!(username = %credentials.username, "Rejected login");
            metrics::inc_login_attempts("rejected");
            return Err(jar);
        }

        // Replace any stale session the browser still carries.
        if let Some(old) = jar.get(SESSION_COOKIE_NAME) {
            self.store.remove(old.value());
        }

        let id = self.store.create();
        info!(username = %credentials.username, "Operator logged in");
        metrics::inc_login_attempts("accepted");
        Ok(jar.add(self.session_cookie(id)))
    }

    /// Drop the session and expire its cookie.
    pub fn logout(&self, jar: CookieJar) -> CookieJar {
        if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
            if self.store.remove(cookie.value()) {
                info!("Operator logged out");
            }
        }
        jar.remove(Cookie::build(SESSION_COOKIE_NAME).path("/"))
    }

    fn session_cookie(&self, id: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, id))
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .build()
    }
}
