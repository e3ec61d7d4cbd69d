use inkwell_types::{PostId, UserId};

/// Errors from entity store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No user has this id.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// No post has this id.
    #[error("blog post not found: {0}")]
    PostNotFound(PostId),

    /// Another user already holds this username or email.
    #[error("{field} already taken: {value}")]
    Conflict { field: &'static str, value: String },

    /// A previous writer panicked while holding a collection lock.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::PostNotFound(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
