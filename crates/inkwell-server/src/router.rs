use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all Inkwell endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handler::health))
        .route(
            "/api/posts",
            get(handler::list_posts).post(handler::create_post),
        )
        .route(
            "/api/posts/:id",
            get(handler::get_post)
                .put(handler::update_post)
                .delete(handler::delete_post),
        )
        .route("/api/user", get(handler::current_user))
        .route("/api/user/posts", get(handler::my_posts))
        .route("/api/user/profile", put(handler::update_profile))
        .route("/api/logout", post(handler::logout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
