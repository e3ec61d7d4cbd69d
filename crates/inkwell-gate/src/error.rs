use inkwell_session::SessionError;
use inkwell_store::StoreError;
use inkwell_types::ValidationError;

/// Every way an access-controlled operation can fail.
///
/// Each variant maps to exactly one HTTP status in the route layer. The
/// `Display` text is safe to show to clients for every variant except
/// [`AccessError::Internal`], whose detail is for logs only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// No authenticated principal.
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated, but not allowed to touch this entity.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Malformed path parameter or request body.
    #[error("{0}")]
    Validation(String),

    /// Username or email already held by another account.
    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AccessError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Short stable name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<ValidationError> for AccessError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<StoreError> for AccessError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UserNotFound(_) => Self::NotFound("User not found".into()),
            StoreError::PostNotFound(_) => Self::NotFound("Blog post not found".into()),
            StoreError::Conflict { field, .. } => Self::Conflict(conflict_message(field)),
            StoreError::Poisoned(detail) => Self::Internal(detail),
        }
    }
}

impl From<SessionError> for AccessError {
    fn from(err: SessionError) -> Self {
        Self::Internal(err.to_string())
    }
}

pub(crate) fn conflict_message(field: &str) -> String {
    match field {
        "username" => "Username already exists".into(),
        "email" => "Email already exists".into(),
        other => format!("{other} already exists"),
    }
}

/// Result alias for access-controlled operations.
pub type AccessResult<T> = Result<T, AccessError>;
