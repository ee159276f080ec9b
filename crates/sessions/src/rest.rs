//! PostgREST implementation of [`MessageStore`].
//!
//! `RestMessageStore` wraps a `reqwest::Client` and translates every trait
//! method into a call against the database's REST endpoint
//! (`{base_url}/rest/v1/{table}`), with retry + exponential back-off on
//! transient (5xx / timeout) failures.
//!
//! Insert stamps come from the gateway's [`MonotonicClock`] and are written
//! together with the expiry in the same single-row insert, so the
//! `expires_at = created_at + 24h` relation holds exactly.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;

use yf_domain::config::StoreConfig;
use yf_domain::error::{from_reqwest, Error, Result};
use yf_domain::message::{Message, NewMessage, Role, SessionView};
use yf_domain::trace::TraceEvent;

use crate::clock::{Clock, MonotonicClock, SystemClock};
use crate::store::MessageStore;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Created once and reused for the lifetime of the process. The underlying
/// `reqwest::Client` maintains a connection pool.
pub struct RestMessageStore {
    http: Client,
    table_url: String,
    api_key: String,
    max_retries: u32,
    clock: Arc<dyn Clock>,
    stamps: MonotonicClock,
}

/// Insert payload. `id` is left to the database default.
#[derive(Serialize)]
struct InsertRow<'a> {
    user_id: &'a str,
    role: Role,
    content: &'a str,
    attachments: &'a [serde_json::Value],
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

#[derive(serde::Deserialize)]
struct IdRow {
    #[allow(dead_code)]
    id: serde_json::Value,
}

impl RestMessageStore {
    /// Build a store from the `[store]` config section. The service key is
    /// read from the configured environment variable.
    pub fn new(cfg: &StoreConfig) -> Result<Self> {
        let api_key = std::env::var(&cfg.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::Config(format!("environment variable '{}' not set", cfg.api_key_env))
            })?;
        Self::with_key(cfg, api_key, Arc::new(SystemClock))
    }

    pub fn with_key(cfg: &StoreConfig, api_key: String, clock: Arc<dyn Clock>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        let table_url = format!(
            "{}/rest/v1/{}",
            cfg.base_url.trim_end_matches('/'),
            cfg.table
        );

        Ok(Self {
            http,
            table_url,
            api_key,
            max_retries: cfg.max_retries,
            clock,
            stamps: MonotonicClock::new(),
        })
    }

    // ── request helpers ──────────────────────────────────────────────

    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        rb.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("X-Client-Info", "yamifit-gateway")
    }

    // ── retry engine ─────────────────────────────────────────────────

    /// Execute a request with retry + exponential back-off on transient errors.
    ///
    /// * Retries on 5xx status codes and on transport errors.
    /// * Does **not** retry on 4xx (client errors are permanent).
    /// * Emits a `TraceEvent::StoreCall` after every attempt.
    async fn execute_with_retry(
        &self,
        endpoint: &str,
        max_retries: u32,
        build_request: impl Fn() -> RequestBuilder,
    ) -> Result<Response> {
        let mut last_err: Option<Error> = None;

        for attempt in 0..=max_retries {
            if attempt > 0 {
                tokio::time::sleep(backoff(attempt)).await;
            }

            let start = Instant::now();
            let result = self.decorate(build_request()).send().await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    TraceEvent::StoreCall {
                        endpoint: endpoint.to_owned(),
                        status,
                        duration_ms,
                    }
                    .emit();

                    if resp.status().is_server_error() {
                        let body = resp.text().await.unwrap_or_default();
                        last_err = Some(Error::Store(format!(
                            "{endpoint} returned {status}: {body}"
                        )));
                        continue;
                    }

                    if resp.status().is_client_error() {
                        let body = resp.text().await.unwrap_or_default();
                        return Err(Error::Store(format!(
                            "{endpoint} returned {status}: {body}"
                        )));
                    }

                    return Ok(resp);
                }
                Err(e) => {
                    TraceEvent::StoreCall {
                        endpoint: endpoint.to_owned(),
                        status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                        duration_ms,
                    }
                    .emit();
                    last_err = Some(from_reqwest(e));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::Store(format!("{endpoint}: all retries exhausted"))))
    }
}

/// Delay before retry number `attempt` (1-based): 100ms, 200ms, 400ms, ...
/// capped at 10s.
fn backoff(attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    Duration::from_millis(100u64.saturating_mul(factor).min(10_000))
}

fn ts(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl MessageStore for RestMessageStore {
    async fn load_window(&self, user_id: &str, limit: usize) -> Result<SessionView> {
        let now = self.clock.now();
        let query = [
            ("select", "*".to_string()),
            ("user_id", format!("eq.{user_id}")),
            ("expires_at", format!("gt.{}", ts(now))),
            ("order", "created_at.desc,id.desc".to_string()),
            ("limit", limit.to_string()),
        ];
        let resp = self
            .execute_with_retry("GET messages", self.max_retries, || {
                self.http.get(&self.table_url).query(&query)
            })
            .await?;

        let body = resp.text().await.map_err(from_reqwest)?;
        let rows: Vec<Message> = serde_json::from_str(&body)
            .map_err(|e| Error::Store(format!("failed to parse message rows: {e}")))?;

        // Re-filter against `now`: a row may have crossed its expiry between
        // the query and here.
        Ok(SessionView::from_rows(user_id, rows, now, limit))
    }

    async fn append(&self, new: NewMessage) -> Result<Message> {
        let created_at = self.stamps.stamp(self.clock.now());
        let row = InsertRow {
            user_id: &new.user_id,
            role: new.role,
            content: &new.content,
            attachments: &new.attachments,
            created_at,
            expires_at: created_at + yf_domain::limits::message_ttl(),
        };

        // Inserts are not retried: a lost response would duplicate the turn.
        let resp = self
            .execute_with_retry("POST messages", 0, || {
                self.http
                    .post(&self.table_url)
                    .header("Prefer", "return=representation")
                    .json(&[&row])
            })
            .await?;

        let body = resp.text().await.map_err(from_reqwest)?;
        let mut rows: Vec<Message> = serde_json::from_str(&body)
            .map_err(|e| Error::Store(format!("failed to parse inserted row: {e}")))?;
        rows.pop()
            .ok_or_else(|| Error::Store("insert returned no row".into()))
    }

    async fn delete_expired(&self, user_id: Option<&str>) -> Result<u64> {
        let now = self.clock.now();
        let mut query = vec![
            ("select", "id".to_string()),
            ("expires_at", format!("lte.{}", ts(now))),
        ];
        if let Some(uid) = user_id {
            query.push(("user_id", format!("eq.{uid}")));
        }

        let resp = self
            .execute_with_retry("DELETE expired", self.max_retries, || {
                self.http
                    .delete(&self.table_url)
                    .header("Prefer", "return=representation")
                    .query(&query)
            })
            .await?;

        let body = resp.text().await.map_err(from_reqwest)?;
        let removed: Vec<IdRow> = serde_json::from_str(&body)
            .map_err(|e| Error::Store(format!("failed to parse sweep result: {e}")))?;
        let deleted = removed.len() as u64;

        TraceEvent::SweepCompleted {
            user_id: user_id.map(str::to_owned),
            deleted,
        }
        .emit();
        Ok(deleted)
    }

    async fn clear_user(&self, user_id: &str) -> Result<()> {
        let query = [("user_id", format!("eq.{user_id}"))];
        self.execute_with_retry("DELETE user", self.max_retries, || {
            self.http
                .delete(&self.table_url)
                .header("Prefer", "return=minimal")
                .query(&query)
        })
        .await?;
        Ok(())
    }
}
