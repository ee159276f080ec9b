//! Process-local message store.
//!
//! Rows live in a map keyed by user id; nothing survives a restart. Used by
//! the `memory` backend and as the reference implementation in tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use yf_domain::error::Result;
use yf_domain::message::{Message, NewMessage, SessionView};
use yf_domain::trace::TraceEvent;

use crate::clock::{Clock, MonotonicClock, SystemClock};
use crate::store::MessageStore;

pub struct MemoryMessageStore {
    clock: Arc<dyn Clock>,
    stamps: MonotonicClock,
    rows: RwLock<HashMap<String, Vec<Message>>>,
}

impl Default for MemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            stamps: MonotonicClock::new(),
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a fully formed row as-is, bypassing stamping. For seeding
    /// fixtures such as already-expired messages.
    pub fn insert_row(&self, row: Message) {
        self.rows
            .write()
            .entry(row.user_id.clone())
            .or_default()
            .push(row);
    }

    /// Physical row count, including expired rows not yet swept.
    pub fn row_count(&self) -> usize {
        self.rows.read().values().map(Vec::len).sum()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn load_window(&self, user_id: &str, limit: usize) -> Result<SessionView> {
        let now = self.clock.now();
        let rows = self.rows.read().get(user_id).cloned().unwrap_or_default();
        Ok(SessionView::from_rows(user_id, rows, now, limit))
    }

    async fn append(&self, new: NewMessage) -> Result<Message> {
        let created_at = self.stamps.stamp(self.clock.now());
        let id = uuid::Uuid::new_v4().to_string();
        let row = Message::stamp(new, id, created_at);
        self.insert_row(row.clone());
        Ok(row)
    }

    async fn delete_expired(&self, user_id: Option<&str>) -> Result<u64> {
        let now = self.clock.now();
        let mut deleted = 0u64;
        {
            let mut map = self.rows.write();
            let mut sweep = |rows: &mut Vec<Message>| {
                let before = rows.len();
                rows.retain(|m| m.is_live(now));
                deleted += (before - rows.len()) as u64;
            };
            match user_id {
                Some(uid) => {
                    if let Some(rows) = map.get_mut(uid) {
                        sweep(rows);
                    }
                }
                None => map.values_mut().for_each(&mut sweep),
            }
            map.retain(|_, rows| !rows.is_empty());
        }

        TraceEvent::SweepCompleted {
            user_id: user_id.map(str::to_owned),
            deleted,
        }
        .emit();
        Ok(deleted)
    }

    async fn clear_user(&self, user_id: &str) -> Result<()> {
        self.rows.write().remove(user_id);
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Duration, TimeZone, Utc};
    use yf_domain::message::Role;

    fn setup() -> (Arc<ManualClock>, MemoryMessageStore) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap(),
        ));
        let store = MemoryMessageStore::with_clock(clock.clone());
        (clock, store)
    }

    fn new(user: &str, role: Role, text: &str) -> NewMessage {
        NewMessage::new(user, role, text, vec![]).unwrap()
    }

    #[tokio::test]
    async fn append_stamps_expiry_and_strict_order() {
        let (_clock, store) = setup();
        let u = store.append(new("u1", Role::User, "hi")).await.unwrap();
        let a = store.append(new("u1", Role::Assistant, "hello")).await.unwrap();
        assert_eq!(u.expires_at - u.created_at, Duration::hours(24));
        assert!(a.created_at > u.created_at);

        let view = store.load_window("u1", 40).await.unwrap();
        assert_eq!(view.messages(), &[u, a]);
    }

    #[tokio::test]
    async fn window_is_scoped_to_user() {
        let (_clock, store) = setup();
        store.append(new("u1", Role::User, "mine")).await.unwrap();
        store.append(new("u2", Role::User, "theirs")).await.unwrap();
        let view = store.load_window("u1", 40).await.unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(view.messages()[0].content, "mine");
    }

    #[tokio::test]
    async fn expired_rows_invisible_before_sweep() {
        let (clock, store) = setup();
        store.append(new("u1", Role::User, "old")).await.unwrap();
        clock.advance(Duration::hours(25));
        assert!(store.load_window("u1", 40).await.unwrap().is_empty());
        assert_eq!(store.row_count(), 1);
    }

    #[tokio::test]
    async fn sweep_is_idempotent() {
        let (clock, store) = setup();
        store.append(new("u1", Role::User, "a")).await.unwrap();
        store.append(new("u2", Role::User, "b")).await.unwrap();
        clock.advance(Duration::hours(24));
        store.append(new("u1", Role::User, "fresh")).await.unwrap();

        assert_eq!(store.delete_expired(None).await.unwrap(), 2);
        assert_eq!(store.delete_expired(None).await.unwrap(), 0);
        assert_eq!(store.row_count(), 1);
    }

    #[tokio::test]
    async fn user_sweep_leaves_other_users() {
        let (clock, store) = setup();
        store.append(new("u1", Role::User, "a")).await.unwrap();
        store.append(new("u2", Role::User, "b")).await.unwrap();
        clock.advance(Duration::hours(30));
        assert_eq!(store.delete_expired(Some("u1")).await.unwrap(), 1);
        assert_eq!(store.row_count(), 1);
    }

    #[tokio::test]
    async fn clear_user_empties_window() {
        let (_clock, store) = setup();
        store.append(new("u1", Role::User, "a")).await.unwrap();
        store.append(new("u1", Role::Assistant, "b")).await.unwrap();
        store.clear_user("u1").await.unwrap();
        assert!(store.load_window("u1", 40).await.unwrap().is_empty());
    }
}
