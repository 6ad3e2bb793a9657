//! In-memory session store with idle expiry.

use crate::{Context, Error, Result, SessionId, Turn};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Sessions idle for longer than this are dropped.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Oldest turns are discarded beyond this many per session.
pub const MAX_TURNS_PER_SESSION: usize = 50;

/// A chat session: its turns and the preferences extracted so far.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub user_id: Option<String>,
    pub turns: Vec<Turn>,
    pub context: Context,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

/// Keyed session map. Reads refresh the idle timer.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Start a new session, optionally owned by a signed-in user.
    pub fn create(&self, user_id: Option<String>) -> Session {
        self.create_at(user_id, Utc::now())
    }

    /// Fetch a live session and mark it active.
    pub fn get(&self, id: SessionId) -> Result<Session> {
        self.get_at(id, Utc::now())
    }

    /// Append a turn, trimming the oldest turns past the per-session cap.
    pub fn append(&self, id: SessionId, turn: Turn) -> Result<()> {
        self.with_session(id, Utc::now(), |session| {
            session.turns.push(turn);
            if session.turns.len() > MAX_TURNS_PER_SESSION {
                let excess = session.turns.len() - MAX_TURNS_PER_SESSION;
                session.turns.drain(..excess);
            }
        })
    }

    /// Merge extracted preferences into the session context.
    pub fn update_context(&self, id: SessionId, update: &Context) -> Result<Context> {
        self.with_session(id, Utc::now(), |session| {
            session.context.merge(update);
            session.context.clone()
        })
    }

    /// The most recent `window` turns, oldest first.
    pub fn history(&self, id: SessionId, window: usize) -> Result<Vec<Turn>> {
        self.with_session(id, Utc::now(), |session| {
            let start = session.turns.len().saturating_sub(window);
            session.turns[start..].to_vec()
        })
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn create_at(&self, user_id: Option<String>, now: DateTime<Utc>) -> Session {
        self.sweep_expired_at(now);
        let session = Session {
            id: SessionId::new(),
            user_id,
            turns: Vec::new(),
            context: Context::default(),
            created_at: now,
            last_active_at: now,
        };
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.id, session.clone());
        tracing::debug!(session = %session.id, "session created");
        session
    }

    fn get_at(&self, id: SessionId, now: DateTime<Utc>) -> Result<Session> {
        self.with_session(id, now, |session| session.clone())
    }

    fn with_session<T>(
        &self,
        id: SessionId,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T> {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let expired = match sessions.get(&id) {
            None => return Err(Error::SessionNotFound(id.to_string())),
            Some(session) => now - session.last_active_at > self.ttl,
        };
        if expired {
            sessions.remove(&id);
            return Err(Error::SessionNotFound(id.to_string()));
        }

        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))?;
        session.last_active_at = now;
        Ok(f(session))
    }

    fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_active_at <= self.ttl);
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::debug!(removed, "expired sessions swept");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_get() {
        let store = SessionStore::new();
        let session = store.create(None);
        let fetched = store.get(session.id).unwrap();
        assert_eq!(fetched.id, session.id);
        assert!(fetched.turns.is_empty());
        assert!(fetched.context.is_empty());
    }

    #[test]
    fn unknown_session_is_not_found() {
        let store = SessionStore::new();
        assert!(matches!(
            store.get(SessionId::new()),
            Err(Error::SessionNotFound(_))
        ));
    }

    #[test]
    fn history_returns_recent_window_in_order() {
        let store = SessionStore::new();
        let id = store.create(None).id;
        for i in 0..5 {
            store.append(id, Turn::user(format!("m{i}"))).unwrap();
        }
        let history = store.history(id, 2).unwrap();
        let contents: Vec<_> = history.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, ["m3", "m4"]);
    }

    #[test]
    fn turns_are_capped() {
        let store = SessionStore::new();
        let id = store.create(None).id;
        for i in 0..(MAX_TURNS_PER_SESSION + 5) {
            store.append(id, Turn::user(format!("m{i}"))).unwrap();
        }
        let session = store.get(id).unwrap();
        assert_eq!(session.turns.len(), MAX_TURNS_PER_SESSION);
        assert_eq!(session.turns[0].content, "m5");
    }

    #[test]
    fn idle_sessions_expire() {
        let store = SessionStore::with_ttl(Duration::hours(1));
        let start = Utc::now();
        let id = store.create_at(None, start).id;

        assert!(store.get_at(id, start + Duration::minutes(59)).is_ok());
        // The read above refreshed the idle timer.
        assert!(store.get_at(id, start + Duration::minutes(118)).is_ok());
        assert!(matches!(
            store.get_at(id, start + Duration::hours(4)),
            Err(Error::SessionNotFound(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn sweep_removes_only_expired() {
        let store = SessionStore::with_ttl(Duration::hours(1));
        let start = Utc::now();
        store.create_at(None, start);
        store.create_at(None, start + Duration::minutes(50));

        assert_eq!(store.sweep_expired_at(start + Duration::minutes(70)), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn context_updates_merge() {
        let store = SessionStore::new();
        let id = store.create(None).id;
        store
            .update_context(
                id,
                &Context {
                    city: Some("Pune".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        let merged = store
            .update_context(
                id,
                &Context {
                    style: Some("fusion".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(merged.city.as_deref(), Some("Pune"));
        assert_eq!(merged.style.as_deref(), Some("fusion"));
    }
}
