/// Errors from session store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session store lock poisoned: {0}")]
    Poisoned(String),

    #[error("session backend error: {0}")]
    Backend(String),

    #[error("invalid session ttl: {0}")]
    InvalidTtl(String),
}

pub type SessionResult<T> = Result<T, SessionError>;
