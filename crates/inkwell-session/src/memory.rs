//! In-memory session store.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Duration;
use inkwell_types::{Clock, SystemClock, UserId};

use crate::error::{SessionError, SessionResult};
use crate::traits::{SessionId, SessionRecord, SessionStore};

/// A [`SessionStore`] holding records in a `HashMap` behind a `RwLock`.
/// Everything is lost when the store is dropped.
pub struct InMemorySessionStore {
    clock: Arc<dyn Clock>,
    sessions: RwLock<HashMap<SessionId, SessionRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Number of records held, expired ones included until pruned.
    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> SessionError {
    SessionError::Poisoned(e.to_string())
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn set(
        &self,
        id: &SessionId,
        user_id: UserId,
        ttl: Duration,
    ) -> SessionResult<SessionRecord> {
        if ttl <= Duration::zero() {
            return Err(SessionError::InvalidTtl(format!("{ttl}")));
        }
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| SessionError::InvalidTtl(format!("{ttl}")))?;
        let record = SessionRecord {
            user_id,
            created_at: now,
            expires_at,
        };
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.insert(id.clone(), record.clone());
        Ok(record)
    }

    async fn get(&self, id: &SessionId) -> SessionResult<Option<SessionRecord>> {
        let now = self.clock.now();
        let sessions = self.sessions.read().map_err(poisoned)?;
        Ok(sessions
            .get(id)
            .filter(|record| !record.is_expired_at(now))
            .cloned())
    }

    async fn destroy(&self, id: &SessionId) -> SessionResult<bool> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        Ok(sessions.remove(id).is_some())
    }

    async fn prune_expired(&self) -> SessionResult<usize> {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        let before = sessions.len();
        sessions.retain(|_, record| !record.is_expired_at(now));
        Ok(before - sessions.len())
    }
}

impl std::fmt::Debug for InMemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySessionStore")
            .field("session_count", &self.len())
            .finish()
    }
}
