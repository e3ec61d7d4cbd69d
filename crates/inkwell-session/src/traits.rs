use std::fmt;

use async_trait::async_trait;
use chrono::Duration;
use inkwell_types::{Timestamp, UserId};

use crate::error::SessionResult;

/// Opaque session token.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// A fresh random token (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "SessionId({prefix}…)")
    }
}

/// What a session remembers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRecord {
    pub user_id: UserId,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl SessionRecord {
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}

/// Key-value store of expiring sessions.
///
/// Expired records are never returned by [`SessionStore::get`], whether or
/// not they have been pruned yet.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a session for `user_id` that expires `ttl` from now, replacing
    /// any record under the same id.
    async fn set(&self, id: &SessionId, user_id: UserId, ttl: Duration)
        -> SessionResult<SessionRecord>;

    async fn get(&self, id: &SessionId) -> SessionResult<Option<SessionRecord>>;

    /// Remove a session. Returns `true` if it existed.
    async fn destroy(&self, id: &SessionId) -> SessionResult<bool>;

    /// Drop every expired record. Returns how many were removed.
    async fn prune_expired(&self) -> SessionResult<usize>;
}
