//! Chat message model.
//!
//! A user's messages form an append-only log. Every row carries its own
//! expiry (`created_at + 24h`); a row whose expiry has passed is treated as
//! absent even if it is still physically stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::limits::message_ttl;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Role
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Message
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One persisted chat turn, exactly as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user_id: String,
    pub role: Role,
    pub content: String,
    /// Opaque descriptors, passed through untouched.
    #[serde(default)]
    pub attachments: Vec<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Message {
    /// Materialize a pending row once the store has assigned its id and
    /// insert instant. The expiry is always `created_at + 24h`.
    pub fn stamp(new: NewMessage, id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: new.user_id,
            role: new.role,
            content: new.content,
            attachments: new.attachments,
            created_at,
            expires_at: created_at + message_ttl(),
        }
    }

    /// `true` while the message is visible at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Sort key used everywhere a user's log is ordered.
    fn order_key(&self) -> (DateTime<Utc>, &str) {
        (self.created_at, self.id.as_str())
    }
}

/// A message that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub user_id: String,
    pub role: Role,
    pub content: String,
    pub attachments: Vec<serde_json::Value>,
}

impl NewMessage {
    /// Build a pending row. Empty (or whitespace-only) content is rejected.
    pub fn new(
        user_id: impl Into<String>,
        role: Role,
        content: impl Into<String>,
        attachments: Vec<serde_json::Value>,
    ) -> Result<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(Error::Validation("message content must not be empty".into()));
        }
        Ok(Self {
            user_id: user_id.into(),
            role,
            content,
            attachments,
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire shape
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Client-facing projection of a [`Message`]. The expiry is not exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub attachments: Vec<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for WireMessage {
    fn from(m: &Message) -> Self {
        Self {
            id: m.id.clone(),
            role: m.role,
            content: m.content.clone(),
            attachments: m.attachments.clone(),
            created_at: m.created_at,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SessionView
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The bounded, non-expired slice of one user's log, oldest first.
///
/// Read-only once built; produced fresh for every load.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionView {
    user_id: String,
    messages: Vec<Message>,
}

impl SessionView {
    /// Build a window from raw store rows.
    ///
    /// Rows owned by another user or expired at `now` are dropped, the
    /// `limit` newest by `(created_at, id)` are kept, and the result is
    /// returned in ascending order.
    pub fn from_rows(
        user_id: &str,
        rows: impl IntoIterator<Item = Message>,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Self {
        let mut messages: Vec<Message> = rows
            .into_iter()
            .filter(|m| m.user_id == user_id && m.is_live(now))
            .collect();

        // Newest first, keep `limit`, then flip back to oldest first.
        messages.sort_by(|a, b| b.order_key().cmp(&a.order_key()));
        messages.truncate(limit);
        messages.reverse();

        Self {
            user_id: user_id.to_owned(),
            messages,
        }
    }

    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_owned(),
            messages: Vec::new(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent `n` entries, still oldest first.
    pub fn tail(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn to_wire(&self) -> Vec<WireMessage> {
        self.messages.iter().map(WireMessage::from).collect()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn msg(id: &str, user: &str, role: Role, at: DateTime<Utc>) -> Message {
        let new = NewMessage::new(user, role, format!("body {id}"), vec![]).unwrap();
        Message::stamp(new, id.into(), at)
    }

    #[test]
    fn stamp_sets_expiry_one_day_out() {
        let m = msg("a", "u1", Role::User, t0());
        assert_eq!(m.expires_at - m.created_at, Duration::hours(24));
        assert!(m.expires_at > m.created_at);
    }

    #[test]
    fn new_message_rejects_blank_content() {
        let err = NewMessage::new("u1", Role::User, "   \n", vec![]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn window_drops_expired_and_foreign_rows() {
        let now = t0() + Duration::hours(25);
        let rows = vec![
            msg("old", "u1", Role::User, t0()),
            msg("fresh", "u1", Role::User, now - Duration::minutes(5)),
            msg("other", "u2", Role::User, now - Duration::minutes(1)),
        ];
        let view = SessionView::from_rows("u1", rows, now, 40);
        let ids: Vec<_> = view.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["fresh"]);
    }

    #[test]
    fn window_keeps_newest_in_ascending_order() {
        let rows: Vec<_> = (0..10)
            .map(|i| msg(&format!("m{i}"), "u1", Role::User, t0() + Duration::seconds(i)))
            .collect();
        let view = SessionView::from_rows("u1", rows, t0() + Duration::minutes(1), 3);
        let ids: Vec<_> = view.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m7", "m8", "m9"]);
    }

    #[test]
    fn window_ties_break_on_id() {
        let rows = vec![
            msg("b", "u1", Role::Assistant, t0()),
            msg("a", "u1", Role::User, t0()),
        ];
        let view = SessionView::from_rows("u1", rows, t0(), 40);
        assert_eq!(view.messages()[0].id, "a");
        assert_eq!(view.messages()[1].id, "b");
    }

    #[test]
    fn message_expiring_exactly_now_is_absent() {
        let m = msg("edge", "u1", Role::User, t0());
        assert!(!m.is_live(m.expires_at));
        assert!(m.is_live(m.expires_at - Duration::milliseconds(1)));
    }

    #[test]
    fn tail_returns_last_entries() {
        let rows: Vec<_> = (0..5)
            .map(|i| msg(&format!("m{i}"), "u1", Role::User, t0() + Duration::seconds(i)))
            .collect();
        let view = SessionView::from_rows("u1", rows, t0(), 40);
        assert_eq!(view.tail(2).len(), 2);
        assert_eq!(view.tail(2)[0].id, "m3");
        assert_eq!(view.tail(50).len(), 5);
    }

    #[test]
    fn wire_shape_hides_expiry() {
        let m = msg("w", "u1", Role::Assistant, t0());
        let v = serde_json::to_value(WireMessage::from(&m)).unwrap();
        assert_eq!(v["role"], "assistant");
        assert!(v.get("expires_at").is_none());
        assert!(v.get("user_id").is_none());
        assert!(v.get("created_at").is_some());
    }
}
