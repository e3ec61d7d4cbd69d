use std::sync::Arc;

use inkwell_gate::{AccessError, AccessGate, SessionPrincipalResolver};
use inkwell_session::{spawn_pruner, InMemorySessionStore, SessionId, SessionStore};
use inkwell_store::{EntityStore, InMemoryEntityStore};
use inkwell_types::{NewUser, PasswordHash, PublicUser, UserId};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

pub const DEMO_USERNAME: &str = "demo";
pub const DEMO_EMAIL: &str = "demo@inkwell.local";

/// A seeded account and a live session token for it.
#[derive(Clone, Debug)]
pub struct DemoAccount {
    pub user: PublicUser,
    pub token: SessionId,
}

/// Inkwell HTTP server.
pub struct InkwellServer {
    config: ServerConfig,
    sessions: Arc<dyn SessionStore>,
    resolver: Arc<SessionPrincipalResolver<dyn EntityStore>>,
    state: AppState,
}

impl InkwellServer {
    /// Build a server over fresh in-memory stores.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        Self::with_stores(
            config,
            Arc::new(InMemoryEntityStore::new()),
            Arc::new(InMemorySessionStore::new()),
        )
    }

    pub fn with_stores(
        config: ServerConfig,
        store: Arc<dyn EntityStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> ServerResult<Self> {
        config.validate()?;
        let resolver = Arc::new(SessionPrincipalResolver::new(
            sessions.clone(),
            store.clone(),
            config.session_ttl()?,
        ));
        let state = AppState::new(
            AccessGate::new(store),
            resolver.clone(),
            &config.session_cookie,
        );
        Ok(Self {
            config,
            sessions,
            resolver,
            state,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Open a session for an existing user.
    pub async fn issue_session(&self, user_id: UserId) -> ServerResult<SessionId> {
        Ok(self.resolver.issue(user_id).await?)
    }

    /// Register the `demo` account and open a session for it.
    pub async fn seed_demo(&self) -> ServerResult<DemoAccount> {
        let new_user = NewUser::new(DEMO_USERNAME, DEMO_EMAIL, PasswordHash::new(""))
            .map_err(AccessError::from)?
            .with_names(Some("Demo".into()), Some("Writer".into()));
        let user = self.state.gate.register_user(new_user)?;
        let token = self.issue_session(user.id).await?;
        Ok(DemoAccount { user, token })
    }

    /// Start serving requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        if self.config.seed_demo {
            let demo = self.seed_demo().await?;
            tracing::info!(
                user = %demo.user.id,
                cookie = %self.config.session_cookie,
                token = demo.token.as_str(),
                "seeded demo account"
            );
        }

        let pruner = spawn_pruner(self.sessions.clone(), self.config.prune_interval());
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("Inkwell server listening on {}", self.config.bind_addr);

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()));
        pruner.stop();
        tracing::info!("Inkwell server stopped");
        served
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
