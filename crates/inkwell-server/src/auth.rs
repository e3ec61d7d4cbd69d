use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use inkwell_gate::{Credentials, Principal};

use crate::error::ApiError;
use crate::state::AppState;

/// Pull credentials out of request headers.
///
/// An `Authorization: Bearer` header wins over the session cookie. Anything
/// unparseable counts as anonymous.
pub fn extract_credentials(headers: &HeaderMap, cookie_name: &str) -> Credentials {
    if let Some(token) = bearer_token(headers) {
        return Credentials::Bearer(token.to_string());
    }
    match session_cookie(headers, cookie_name) {
        Some(value) => Credentials::Cookie(value.to_string()),
        None => Credentials::Anonymous,
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn session_cookie<'h>(headers: &'h HeaderMap, cookie_name: &str) -> Option<&'h str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value)
}

/// The caller of a request: what it presented, and who that resolved to.
#[derive(Clone, Debug)]
pub struct Caller {
    pub credentials: Credentials,
    pub principal: Option<Principal>,
}

impl Caller {
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let credentials = extract_credentials(&parts.headers, &state.session_cookie);
        let principal = state.resolver.resolve(&credentials).await?;
        if let Some(principal) = &principal {
            tracing::trace!(user = %principal.user_id, "request authenticated");
        }
        Ok(Self {
            credentials,
            principal,
        })
    }
}
