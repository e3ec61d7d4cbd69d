use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::traits::SessionStore;

/// Once a day.
pub const DEFAULT_PRUNE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Handle to a running pruner. Dropping it stops the task.
#[derive(Debug)]
pub struct PrunerHandle {
    task: JoinHandle<()>,
}

impl PrunerHandle {
    pub fn stop(self) {
        drop(self);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PrunerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Prune `store` every `period` on the current tokio runtime.
///
/// The first prune happens one full period after spawning. Failures are
/// logged and the loop keeps going.
pub fn spawn_pruner(store: Arc<dyn SessionStore>, period: Duration) -> PrunerHandle {
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match store.prune_expired().await {
                Ok(0) => tracing::trace!("session prune: nothing expired"),
                Ok(removed) => tracing::info!(removed, "pruned expired sessions"),
                Err(e) => tracing::warn!(error = %e, "session prune failed"),
            }
        }
    });
    PrunerHandle { task }
}
