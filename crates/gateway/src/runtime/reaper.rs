//! TTL sweeps and explicit history clearing.
//!
//! Visibility never depends on the reaper: every window load already hides
//! expired rows. Sweeping only reclaims storage, so per-user sweep failures
//! are logged and swallowed.

use std::sync::Arc;

use yf_domain::error::Result;
use yf_domain::trace::TraceEvent;
use yf_sessions::{MessageStore, UserContext};

pub struct Reaper {
    store: Arc<dyn MessageStore>,
}

impl Reaper {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// Sweep one user's expired rows. Returns `None` if the store failed.
    pub async fn sweep_user(&self, user: &UserContext) -> Option<u64> {
        match self.store.delete_expired(Some(&user.user_id)).await {
            Ok(n) => Some(n),
            Err(e) => {
                tracing::warn!(user_id = %user.user_id, error = %e, "per-user sweep failed");
                None
            }
        }
    }

    /// Global sweep, for the scheduled cleanup call and the background loop.
    pub async fn sweep_all(&self) -> Result<u64> {
        let deleted = self.store.delete_expired(None).await?;
        if deleted > 0 {
            tracing::info!(deleted, "expired messages swept");
        }
        Ok(deleted)
    }

    /// Hard-delete every message the user owns.
    pub async fn clear(&self, user: &UserContext) -> Result<()> {
        self.store.clear_user(&user.user_id).await?;
        TraceEvent::HistoryCleared {
            user_id: user.user_id.clone(),
        }
        .emit();
        Ok(())
    }
}
