//! Shared doubles for the gateway integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use tokio::sync::Barrier;
use tokio_util::sync::CancellationToken;

use yf_domain::config::Config;
use yf_domain::error::{Error, Result};
use yf_domain::message::{Message, NewMessage, Role, SessionView};
use yf_prompt::contract::NAME_REPLY;
use yf_prompt::detect_arabic;
use yf_providers::{ChatModel, GenerateRequest, GenerateResponse, ModelClient};
use yf_sessions::{IdentityVerifier, ManualClock, MemoryMessageStore, MessageStore, UserContext};

use yf_gateway::runtime::SessionEngine;
use yf_gateway::state::AppState;

pub const ALICE_TOKEN: &str = "token-alice";
pub const BOB_TOKEN: &str = "token-bob";
pub const CLEANUP_SECRET: &str = "s3cret-sweep";

pub const ARABIC_NAME_REPLY: &str = "اسمي ياميفيت شات بوت.";

// ── Identity ─────────────────────────────────────────────────────────

/// Resolves a fixed set of tokens; everything else is rejected.
pub struct StaticVerifier {
    users: HashMap<&'static str, &'static str>,
    pub calls: AtomicUsize,
}

impl StaticVerifier {
    pub fn new() -> Self {
        Self {
            users: HashMap::from([(ALICE_TOKEN, "alice"), (BOB_TOKEN, "bob")]),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<UserContext> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.users
            .get(token)
            .map(|id| UserContext::new(*id))
            .ok_or_else(|| Error::Auth("unknown token".into()))
    }
}

// ── Model ────────────────────────────────────────────────────────────

/// A model that follows the identity contract on a few fixed prompts and
/// records every request it sees.
pub struct ScriptedModel {
    pub fail: AtomicBool,
    pub seen: Mutex<Vec<GenerateRequest>>,
    /// When set, every call waits here before answering.
    pub gate: Mutex<Option<Arc<Barrier>>>,
}

impl ScriptedModel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            fail: AtomicBool::new(false),
            seen: Mutex::new(Vec::new()),
            gate: Mutex::new(None),
        })
    }

    pub fn failing() -> Arc<Self> {
        let m = Self::new();
        m.fail.store(true, Ordering::SeqCst);
        m
    }

    /// Hold each call until `parties` calls are in flight at once.
    pub fn gated(parties: usize) -> Arc<Self> {
        let m = Self::new();
        *m.gate.lock() = Some(Arc::new(Barrier::new(parties)));
        m
    }

    pub fn last_request(&self) -> GenerateRequest {
        self.seen.lock().last().cloned().expect("model was never called")
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse> {
        self.seen.lock().push(req.clone());
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.wait().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Model {
                message: "quota exceeded".into(),
            });
        }

        let pending = req.turns.last().map(|t| t.text.as_str()).unwrap_or("");
        let content = if detect_arabic(pending) || pending.ends_with("[Respond in Arabic]") {
            ARABIC_NAME_REPLY.to_string()
        } else if pending.to_lowercase().contains("your name") {
            NAME_REPLY.to_string()
        } else {
            format!("You said: {pending}")
        };

        Ok(GenerateResponse {
            content,
            model: "scripted".into(),
            prompt_tokens: None,
            completion_tokens: None,
            finish_reason: Some("stop".into()),
        })
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}

// ── Store ────────────────────────────────────────────────────────────

/// Wraps the in-process store and injects failures on demand.
pub struct FlakyStore {
    pub inner: MemoryMessageStore,
    pub fail_sweep: AtomicBool,
    pub fail_load: AtomicBool,
    pub fail_append: Mutex<Option<Role>>,
    pub appends: AtomicUsize,
}

impl FlakyStore {
    pub fn new(clock: Arc<ManualClock>) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryMessageStore::with_clock(clock),
            fail_sweep: AtomicBool::new(false),
            fail_load: AtomicBool::new(false),
            fail_append: Mutex::new(None),
            appends: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl MessageStore for FlakyStore {
    async fn load_window(&self, user_id: &str, limit: usize) -> Result<SessionView> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(Error::Store("connection refused".into()));
        }
        self.inner.load_window(user_id, limit).await
    }

    async fn append(&self, new: NewMessage) -> Result<Message> {
        if *self.fail_append.lock() == Some(new.role) {
            return Err(Error::Store("insert failed".into()));
        }
        self.appends.fetch_add(1, Ordering::SeqCst);
        self.inner.append(new).await
    }

    async fn delete_expired(&self, user_id: Option<&str>) -> Result<u64> {
        if self.fail_sweep.load(Ordering::SeqCst) {
            return Err(Error::Store("sweep timed out".into()));
        }
        self.inner.delete_expired(user_id).await
    }

    async fn clear_user(&self, user_id: &str) -> Result<()> {
        self.inner.clear_user(user_id).await
    }
}

// ── Harness ──────────────────────────────────────────────────────────

pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub store: Arc<FlakyStore>,
    pub model: Arc<ScriptedModel>,
    pub verifier: Arc<StaticVerifier>,
    pub engine: Arc<SessionEngine>,
    pub state: AppState,
    pub shutdown: CancellationToken,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_model(ScriptedModel::new())
    }

    pub fn with_model(model: Arc<ScriptedModel>) -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 4, 10, 18, 30, 0).unwrap(),
        ));
        let store = FlakyStore::new(clock.clone());
        let verifier = Arc::new(StaticVerifier::new());
        let shutdown = CancellationToken::new();
        let config = Arc::new(Config::default());

        let engine = Arc::new(SessionEngine::new(
            verifier.clone(),
            store.clone(),
            ModelClient::new(model.clone(), Duration::from_secs(5)),
            &config.chat,
            shutdown.clone(),
        ));
        let state = AppState::new(config, engine.clone(), Some(CLEANUP_SECRET), shutdown.clone());

        Self {
            clock,
            store,
            model,
            verifier,
            engine,
            state,
            shutdown,
        }
    }

    pub fn alice() -> UserContext {
        UserContext::new("alice")
    }

    /// Seed a row with an explicit creation instant.
    pub fn seed(&self, user: &str, role: Role, text: &str, created_at: chrono::DateTime<Utc>) {
        let new = NewMessage::new(user, role, text, vec![]).unwrap();
        let id = format!("seed-{}", created_at.timestamp_micros());
        self.store.inner.insert_row(Message::stamp(new, id, created_at));
    }
}
