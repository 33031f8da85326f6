//! Pluggable persistence for the logged-in flag.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

/// Storage for operator sessions.
///
/// A session id maps to the "logged in" flag. The in-memory store below is
/// the default; a signed-token or database store can be swapped in.
pub trait SessionStore: Send + Sync + 'static {
    /// Create a logged-in session and return its id.
    fn create(&self) -> String;

    /// Whether `id` names a live logged-in session.
    fn is_active(&self, id: &str) -> bool;

    /// Drop the session. Returns `false` if it did not exist.
    fn remove(&self, id: &str) -> bool;
}

/// Session record kept by [`MemorySessionStore`].
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// When the operator logged in.
    pub created_at: DateTime<Utc>,
}

/// Process-local session store. Sessions do not survive a restart.
///
/// A session expires `ttl` after login. Expired sessions are dropped when
/// looked up and swept whenever a new session is created.
#[derive(Debug)]
pub struct MemorySessionStore {
    sessions: DashMap<String, SessionRecord>,
    ttl: Duration,
}

impl MemorySessionStore {
    /// Create an empty store with a 12 hour session lifetime.
    pub fn new() -> Self {
        Self::with_ttl(Duration::hours(12))
    }

    /// Create an empty store whose sessions live for `ttl`.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    fn is_expired(&self, record: &SessionRecord, now: DateTime<Utc>) -> bool {
        now - record.created_at >= self.ttl
    }

    /// Drop expired sessions. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, record| !self.is_expired(record, now));
        before.saturating_sub(self.sessions.len())
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether there are no live sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemorySessionStore {
    fn create(&self) -> String {
        let purged = self.purge_expired();
        if purged > 0 {
            debug!(purged, "Dropped expired sessions");
        }
        let id = Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            id.clone(),
            SessionRecord {
                created_at: Utc::now(),
            },
        );
        id
    }

    fn is_active(&self, id: &str) -> bool {
        let now = Utc::now();
        // remove_if takes its own lock, so the read guard must be gone first.
        let expired = match self.sessions.get(id) {
            Some(record) => self.is_expired(&record, now),
            None => return false,
        };
        if expired {
            self.sessions.remove_if(id, |_, record| self.is_expired(record, now));
        }
        !expired
    }

    fn remove(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_remove() {
        let store = MemorySessionStore::new();
        let id = store.create();
        assert!(store.is_active(&id));
        assert_eq!(store.len(), 1);

        assert!(store.remove(&id));
        assert!(!store.is_active(&id));
        assert!(!store.remove(&id));
        assert!(store.is_empty());
    }

    #[test]
    fn ids_are_unique() {
        let store = MemorySessionStore::new();
        let a = store.create();
        let b = store.create();
        assert_ne!(a, b);
        assert!(!store.is_active("not-a-session"));
    }

    #[test]
    fn expired_session_is_inactive_and_dropped() {
        let store = MemorySessionStore::with_ttl(Duration::zero());
        let id = store.create();
        assert!(!store.is_active(&id));
        assert!(store.is_empty());
    }

    #[test]
    fn create_sweeps_abandoned_sessions() {
        let store = MemorySessionStore::with_ttl(Duration::hours(1));
        let stale = "abandoned".to_string();
        store.sessions.insert(
            stale.clone(),
            SessionRecord {
                created_at: Utc::now() - Duration::hours(2),
            },
        );
        let fresh = store.create();

        assert_eq!(store.len(), 1);
        assert!(store.is_active(&fresh));
        assert!(!store.is_active(&stale));
    }
}
