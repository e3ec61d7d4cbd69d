use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use inkwell_types::{BlogPost, PublicUser, RawInput};
use serde::Serialize;

use crate::auth::Caller;
use crate::error::{ApiResult, MessageBody};
use crate::state::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Health check handler.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Raw `:id` segment. An undecodable segment becomes empty so the gate
/// still checks authentication before rejecting the id.
type PostIdPath = Result<Path<String>, PathRejection>;

fn raw_post_id(path: PostIdPath) -> String {
    match path {
        Ok(Path(id)) => id,
        Err(rejection) => {
            tracing::debug!(%rejection, "undecodable post id segment");
            String::new()
        }
    }
}

// ---- Posts ----

pub async fn list_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<BlogPost>>> {
    Ok(Json(state.gate.list_published()?))
}

pub async fn get_post(
    State(state): State<AppState>,
    path: PostIdPath,
) -> ApiResult<Json<BlogPost>> {
    Ok(Json(state.gate.read_post(&raw_post_id(path))?))
}

pub async fn create_post(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<BlogPost>)> {
    let post = state
        .gate
        .create_post(caller.principal(), RawInput::new(&body))?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    State(state): State<AppState>,
    caller: Caller,
    path: PostIdPath,
    body: Bytes,
) -> ApiResult<Json<BlogPost>> {
    let id = raw_post_id(path);
    let post = state
        .gate
        .update_post(caller.principal(), &id, RawInput::new(&body))?;
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    caller: Caller,
    path: PostIdPath,
) -> ApiResult<StatusCode> {
    state.gate.delete_post(caller.principal(), &raw_post_id(path))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- Current user ----

pub async fn my_posts(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<Vec<BlogPost>>> {
    Ok(Json(state.gate.my_posts(caller.principal())?))
}

pub async fn current_user(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<PublicUser>> {
    Ok(Json(state.gate.current_user(caller.principal())?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> ApiResult<Json<PublicUser>> {
    let user = state
        .gate
        .update_profile(caller.principal(), RawInput::new(&body))?;
    Ok(Json(user))
}

/// Revoke the presented session and expire the cookie. Succeeds for
/// anonymous callers too.
pub async fn logout(State(state): State<AppState>, caller: Caller) -> ApiResult<Response> {
    let revoked = state.resolver.revoke(&caller.credentials).await?;
    if let Some(principal) = caller.principal() {
        tracing::info!(user = %principal.user_id, revoked, "logged out");
    }

    let body = Json(MessageBody {
        message: "Logged out".into(),
    });
    let expire = format!(
        "{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax",
        state.session_cookie
    );
    match HeaderValue::from_str(&expire) {
        Ok(cookie) => Ok(([(header::SET_COOKIE, cookie)], body).into_response()),
        Err(_) => Ok(body.into_response()),
    }
}
