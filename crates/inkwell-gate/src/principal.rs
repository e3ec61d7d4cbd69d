use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use inkwell_session::{SessionId, SessionStore};
use inkwell_store::EntityStore;
use inkwell_types::{User, UserId};

use crate::error::{AccessError, AccessResult};

/// The authenticated identity behind a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
}

impl Principal {
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.username.clone())
    }
}

/// What a request presented to prove who it is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    /// `Authorization: Bearer <token>`.
    Bearer(String),
    /// Session cookie value.
    Cookie(String),
    Anonymous,
}

impl Credentials {
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Bearer(token) | Self::Cookie(token) => Some(token),
            Self::Anonymous => None,
        }
    }
}

/// Turns request credentials into a principal.
///
/// `Ok(None)` means "anonymous": no credentials, unknown or expired token, or
/// a token for a user that no longer exists. `Err` is reserved for backend
/// failures.
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    async fn resolve(&self, credentials: &Credentials) -> AccessResult<Option<Principal>>;

    /// Forget the session behind `credentials`. Returns `true` if one existed.
    async fn revoke(&self, credentials: &Credentials) -> AccessResult<bool>;
}

/// Resolves session tokens through a [`SessionStore`], confirming the user
/// still exists in the entity store.
pub struct SessionPrincipalResolver<S: EntityStore + ?Sized> {
    sessions: Arc<dyn SessionStore>,
    store: Arc<S>,
    ttl: Duration,
}

impl<S: EntityStore + ?Sized> SessionPrincipalResolver<S> {
    pub fn new(sessions: Arc<dyn SessionStore>, store: Arc<S>, ttl: Duration) -> Self {
        Self {
            sessions,
            store,
            ttl,
        }
    }

    /// Open a session for an existing user and return its token.
    pub async fn issue(&self, user_id: UserId) -> AccessResult<SessionId> {
        if self.store.get_user(user_id)?.is_none() {
            return Err(AccessError::not_found("User not found"));
        }
        let id = SessionId::generate();
        self.sessions.set(&id, user_id, self.ttl).await?;
        tracing::debug!(user = %user_id, "session issued");
        Ok(id)
    }
}

#[async_trait]
impl<S: EntityStore + ?Sized> PrincipalResolver for SessionPrincipalResolver<S> {
    async fn resolve(&self, credentials: &Credentials) -> AccessResult<Option<Principal>> {
        let Some(token) = credentials.token() else {
            return Ok(None);
        };
        let Some(record) = self.sessions.get(&SessionId::from_token(token)).await? else {
            return Ok(None);
        };
        Ok(self
            .store
            .get_user(record.user_id)?
            .map(|user| Principal::from(&user)))
    }

    async fn revoke(&self, credentials: &Credentials) -> AccessResult<bool> {
        match credentials.token() {
            Some(token) => Ok(self.sessions.destroy(&SessionId::from_token(token)).await?),
            None => Ok(false),
        }
    }
}
