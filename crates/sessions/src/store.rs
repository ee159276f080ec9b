//! The `MessageStore` trait: the only way the gateway touches persisted
//! chat messages.

use async_trait::async_trait;
use yf_domain::error::Result;
use yf_domain::message::{Message, NewMessage, SessionView};

/// Typed, TTL-aware access to the message table.
///
/// Every method is scoped to a single user except the global sweep.
/// Implementations report storage failures as `Error::Store` (or
/// `Http`/`Timeout` from the transport); callers treat all of those as
/// "store unavailable".
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Up to `limit` newest visible messages for `user_id`, oldest first.
    ///
    /// Rows whose expiry has passed are never returned, even if a sweep
    /// has not removed them yet.
    async fn load_window(&self, user_id: &str, limit: usize) -> Result<SessionView>;

    /// Insert one row. The store assigns `id` and `created_at`; the expiry
    /// is `created_at + 24h`. Single-row atomic.
    async fn append(&self, new: NewMessage) -> Result<Message>;

    /// Delete expired rows, for one user or (with `None`) globally.
    /// Returns how many rows this call removed. Idempotent.
    async fn delete_expired(&self, user_id: Option<&str>) -> Result<u64>;

    /// Hard-delete every row owned by `user_id`.
    async fn clear_user(&self, user_id: &str) -> Result<()>;
}
