//! HTTP server for Inkwell.
//!
//! Exposes the blogging API as JSON routes over axum. Handlers are thin:
//! they extract credentials, hand the raw request body to the access gate,
//! and map [`AccessError`](inkwell_gate::AccessError)s onto status codes.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{extract_credentials, Caller};
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult, MessageBody, ServerError, ServerResult};
pub use server::{DemoAccount, InkwellServer};
pub use state::AppState;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use inkwell_types::{NewUser, PasswordHash, UserId};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    struct TestApp {
        server: InkwellServer,
        router: Router,
        alice: (UserId, String),
        bob: (UserId, String),
    }

    async fn register(server: &InkwellServer, name: &str) -> (UserId, String) {
        let user = server
            .state()
            .gate
            .register_user(
                NewUser::new(name, format!("{name}@example.com"), PasswordHash::new("h")).unwrap(),
            )
            .unwrap();
        let token = server.issue_session(user.id).await.unwrap();
        (user.id, token.as_str().to_string())
    }

    async fn app() -> TestApp {
        let server = InkwellServer::new(ServerConfig::default()).unwrap();
        let alice = register(&server, "alice").await;
        let bob = register(&server, "bob").await;
        let router = server.router();
        TestApp {
            server,
            router,
            alice,
            bob,
        }
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                request = request.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn post_body(title: &str) -> Value {
        json!({
            "title": title,
            "content": "Enough words here to clear the content minimum.",
            "category": "Rust"
        })
    }

    // ---- Public routes ----

    #[tokio::test]
    async fn health_endpoint() {
        let t = app().await;
        let (status, body) = send(&t.router, Method::GET, "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn empty_feed() {
        let t = app().await;
        let (status, body) = send(&t.router, Method::GET, "/api/posts", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn bad_and_missing_ids() {
        let t = app().await;
        for id in ["12abc", "0", "-1"] {
            let (status, body) =
                send(&t.router, Method::GET, &format!("/api/posts/{id}"), None, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "id {id}");
            assert_eq!(body["message"], "Invalid post ID");
        }
        let (status, body) = send(&t.router, Method::GET, "/api/posts/99", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Blog post not found");
    }

    #[tokio::test]
    async fn undecodable_id_is_checked_after_auth() {
        let t = app().await;
        let uri = "/api/posts/%FF";

        for method in [Method::PUT, Method::DELETE] {
            let (status, body) =
                send(&t.router, method.clone(), uri, None, Some(post_body("Hello world"))).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method}");
            assert_eq!(body["message"], "Unauthorized");
        }

        let alice = Some(t.alice.1.as_str());
        let (status, body) =
            send(&t.router, Method::PUT, uri, alice, Some(post_body("Hello world"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid post ID");
        let (status, body) = send(&t.router, Method::DELETE, uri, alice, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid post ID");

        let (status, body) = send(&t.router, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid post ID");
    }

    // ---- Authentication ----

    #[tokio::test]
    async fn mutations_require_authentication() {
        let t = app().await;
        let (status, body) =
            send(&t.router, Method::POST, "/api/posts", None, Some(post_body("Hello world"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unauthorized");

        let profile = Some(json!({ "bio": "anonymous" }));
        let (status, body) =
            send(&t.router, Method::PUT, "/api/user/profile", None, profile).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unauthorized");

        let (status, _) = send(&t.router, Method::GET, "/api/user/posts", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = send(
            &t.router,
            Method::GET,
            "/api/user/posts",
            Some("forged-token"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn session_cookie_authenticates() {
        let t = app().await;
        let request = Request::builder()
            .uri("/api/user")
            .header("cookie", format!("inkwell.sid={}", t.alice.1))
            .body(Body::empty())
            .unwrap();
        let response = t.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn current_user_has_no_password() {
        let t = app().await;
        let (status, body) = send(&t.router, Method::GET, "/api/user", Some(t.alice.1.as_str()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alice");
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn logout_revokes_session() {
        let t = app().await;
        let token = Some(t.alice.1.as_str());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/logout")
            .header("authorization", format!("Bearer {}", t.alice.1))
            .body(Body::empty())
            .unwrap();
        let response = t.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()["set-cookie"].to_str().unwrap();
        assert!(cookie.starts_with("inkwell.sid=;"));

        let (status, _) = send(&t.router, Method::GET, "/api/user", token, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&t.router, Method::POST, "/api/logout", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    // ---- Posts ----

    #[tokio::test]
    async fn create_returns_201_with_caller_as_author() {
        let t = app().await;
        let mut body = post_body("Hello world");
        body["authorId"] = json!(t.bob.0);
        let (status, post) =
            send(&t.router, Method::POST, "/api/posts", Some(t.alice.1.as_str()), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(post["authorId"], json!(t.alice.0));
        assert_eq!(post["status"], "published");
        assert_eq!(post["views"], 0);
        assert!(post["updatedAt"].is_null());
    }

    #[tokio::test]
    async fn short_title_is_400_and_stores_nothing() {
        let t = app().await;
        let (status, body) =
            send(&t.router, Method::POST, "/api/posts", Some(t.alice.1.as_str()), Some(post_body("Hey"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("Title must be at least 5 characters"));

        let (_, mine) = send(&t.router, Method::GET, "/api/user/posts", Some(t.alice.1.as_str()), None).await;
        assert_eq!(mine, json!([]));
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let t = app().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/posts")
            .header("authorization", format!("Bearer {}", t.alice.1))
            .body(Body::from("{ not json"))
            .unwrap();
        let response = t.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn three_reads_count_three_views() {
        let t = app().await;
        let (_, post) = send(
            &t.router,
            Method::POST,
            "/api/posts",
            Some(t.alice.1.as_str()),
            Some(post_body("Counting views")),
        )
        .await;
        let uri = format!("/api/posts/{}", post["id"]);

        let mut last = Value::Null;
        for _ in 0..3 {
            let (status, body) = send(&t.router, Method::GET, &uri, None, None).await;
            assert_eq!(status, StatusCode::OK);
            last = body;
        }
        assert_eq!(last["views"], 3);

        let (_, mine) = send(&t.router, Method::GET, "/api/user/posts", Some(t.alice.1.as_str()), None).await;
        assert_eq!(mine[0]["views"], 3);
    }

    #[tokio::test]
    async fn draft_to_published_flow() {
        let t = app().await;
        let mut body = post_body("A quiet draft");
        body["status"] = json!("draft");
        let (status, draft) =
            send(&t.router, Method::POST, "/api/posts", Some(t.alice.1.as_str()), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/api/posts/{}", draft["id"]);

        let (_, feed) = send(&t.router, Method::GET, "/api/posts", None, None).await;
        assert_eq!(feed, json!([]));

        let publish = json!({ "status": "published" });
        let (status, body) =
            send(&t.router, Method::PUT, &uri, Some(t.bob.1.as_str()), Some(publish.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "You don't have permission to update this post");

        let (status, updated) =
            send(&t.router, Method::PUT, &uri, Some(t.alice.1.as_str()), Some(publish)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "published");
        assert!(updated["updatedAt"].is_string());

        let (_, feed) = send(&t.router, Method::GET, "/api/posts", None, None).await;
        assert_eq!(feed.as_array().unwrap().len(), 1);
        assert_eq!(feed[0]["id"], draft["id"]);
    }

    #[tokio::test]
    async fn delete_by_owner_then_404() {
        let t = app().await;
        let (_, post) = send(
            &t.router,
            Method::POST,
            "/api/posts",
            Some(t.alice.1.as_str()),
            Some(post_body("Short lived")),
        )
        .await;
        let uri = format!("/api/posts/{}", post["id"]);

        let (status, body) = send(&t.router, Method::DELETE, &uri, Some(t.bob.1.as_str()), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "You don't have permission to delete this post");

        let (status, body) = send(&t.router, Method::DELETE, &uri, Some(t.alice.1.as_str()), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = send(&t.router, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn combined_failures_report_earliest_check() {
        let t = app().await;
        let bad = Some(json!({ "title": "x" }));

        let (status, _) = send(&t.router, Method::PUT, "/api/posts/abc", None, bad.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) =
            send(&t.router, Method::PUT, "/api/posts/abc", Some(t.alice.1.as_str()), bad.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(&t.router, Method::PUT, "/api/posts/42", Some(t.alice.1.as_str()), bad.clone()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, post) = send(
            &t.router,
            Method::POST,
            "/api/posts",
            Some(t.alice.1.as_str()),
            Some(post_body("Order of checks")),
        )
        .await;
        let uri = format!("/api/posts/{}", post["id"]);
        let (status, _) = send(&t.router, Method::PUT, &uri, Some(t.bob.1.as_str()), bad.clone()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&t.router, Method::PUT, &uri, Some(t.alice.1.as_str()), bad).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // ---- Profile ----

    #[tokio::test]
    async fn profile_update_and_conflicts() {
        let t = app().await;
        let (status, user) = send(
            &t.router,
            Method::PUT,
            "/api/user/profile",
            Some(t.alice.1.as_str()),
            Some(json!({ "bio": "Writes about Rust", "location": "Lisbon" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(user["bio"], "Writes about Rust");
        assert!(user.get("password").is_none());

        let (status, _) = send(
            &t.router,
            Method::PUT,
            "/api/user/profile",
            Some(t.alice.1.as_str()),
            Some(json!({ "username": "mallory" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &t.router,
            Method::PUT,
            "/api/user/profile",
            Some(t.alice.1.as_str()),
            Some(json!({ "email": "bob@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "Email already exists");

        let bob = t.server.state().gate.current_user(Some(&inkwell_gate::Principal::new(t.bob.0, "bob")));
        assert_eq!(bob.unwrap().bio, None);
    }
}
