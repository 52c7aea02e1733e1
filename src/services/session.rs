use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::sync::Cache;
use serde::Serialize;
use uuid::Uuid;

const MAX_SESSIONS: u64 = 10_000;

/// Gate flags for one browser session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub id: Uuid,
    pub authenticated: bool,
    pub admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Server-side session table. Entries expire `ttl` after creation.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<Uuid, SessionState>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(MAX_SESSIONS)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// New authenticated, non-admin session.
    pub fn create(&self) -> SessionState {
        let state = SessionState {
            id: Uuid::new_v4(),
            authenticated: true,
            admin: false,
            created_at: Utc::now(),
        };
        self.sessions.insert(state.id, state.clone());
        state
    }

    pub fn get(&self, id: &Uuid) -> Option<SessionState> {
        self.sessions.get(id)
    }

    /// Flip the admin flag on a live session. `None` if the session is gone.
    pub fn set_admin(&self, id: &Uuid, admin: bool) -> Option<SessionState> {
        let mut state = self.sessions.get(id)?;
        state.admin = admin;
        self.sessions.insert(*id, state.clone());
        Some(state)
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.sessions.remove(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_sessions_start_without_admin() {
        let store = SessionStore::new(Duration::from_secs(60));
        let state = store.create();
        assert!(state.authenticated);
        assert!(!state.admin);
        assert_eq!(store.get(&state.id), Some(state));
    }

    #[test]
    fn admin_flag_toggles() {
        let store = SessionStore::new(Duration::from_secs(60));
        let state = store.create();

        assert!(store.set_admin(&state.id, true).is_some_and(|s| s.admin));
        assert!(store.get(&state.id).is_some_and(|s| s.admin));
        assert!(store.set_admin(&state.id, false).is_some_and(|s| !s.admin));
    }

    #[test]
    fn removed_sessions_are_gone() {
        let store = SessionStore::new(Duration::from_secs(60));
        let state = store.create();

        assert!(store.remove(&state.id));
        assert_eq!(store.get(&state.id), None);
        assert_eq!(store.set_admin(&state.id, true), None);
        assert!(!store.remove(&state.id));
    }
}
