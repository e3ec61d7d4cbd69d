use std::sync::Arc;

use inkwell_gate::{AccessGate, PrincipalResolver};
use inkwell_store::EntityStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AccessGate<dyn EntityStore>>,
    pub resolver: Arc<dyn PrincipalResolver>,
    pub session_cookie: Arc<str>,
}

impl AppState {
    pub fn new(
        gate: AccessGate<dyn EntityStore>,
        resolver: Arc<dyn PrincipalResolver>,
        session_cookie: &str,
    ) -> Self {
        Self {
            gate: Arc::new(gate),
            resolver,
            session_cookie: Arc::from(session_cookie),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("session_cookie", &self.session_cookie)
            .finish_non_exhaustive()
    }
}
