//! The send-turn orchestrator.
//!
//! One call to [`SessionEngine::handle_send`] runs a linear sequence of
//! awaited steps for a single authenticated user:
//!
//! 1. validate the text
//! 2. sweep the user's expired rows (best effort)
//! 3. load the visible window
//! 4. persist the user message
//! 5. assemble the prompt from the window loaded in step 3
//! 6. generate a reply (never fails, falls back to a canned reply)
//! 7. persist the assistant message
//! 8. reload the window
//!
//! The engine holds no per-user lock. Concurrent sends by the same user may
//! interleave their rows; each response is still built from the handles its
//! own appends returned.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use yf_domain::config::ChatConfig;
use yf_domain::error::{Error, Result};
use yf_domain::limits::MAX_INPUT_CHARS;
use yf_domain::message::{Message, NewMessage, Role, SessionView};
use yf_domain::trace::TraceEvent;
use yf_prompt::contract::IDENTITY_CONTRACT_VERSION;
use yf_prompt::PromptAssembler;
use yf_providers::ModelClient;
use yf_sessions::{IdentityVerifier, MessageStore, UserContext};

use super::reaper::Reaper;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Turn input / output
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Default)]
pub struct SendInput {
    pub text: String,
    pub attachments: Vec<Value>,
    /// Explicit UI locale. `"ar"` forces an Arabic reply.
    pub locale: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub user_message: Message,
    pub assistant_message: Message,
    /// The window as reloaded after both appends.
    pub history: SessionView,
    /// `true` when the assistant text is the canned fallback.
    pub fallback: bool,
}

/// Reject empty (after trim) or over-long text.
///
/// Length is counted in Unicode code points.
pub fn validate_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::Validation("message must not be empty".into()));
    }
    if text.chars().count() > MAX_INPUT_CHARS {
        return Err(Error::Validation(format!(
            "message exceeds {MAX_INPUT_CHARS} characters"
        )));
    }
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Engine
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct SessionEngine {
    verifier: Arc<dyn IdentityVerifier>,
    store: Arc<dyn MessageStore>,
    reaper: Arc<Reaper>,
    assembler: PromptAssembler,
    model: ModelClient,
    window_limit: usize,
    /// Fires on shutdown; pending model calls resolve to the fallback.
    shutdown: CancellationToken,
}

impl SessionEngine {
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        store: Arc<dyn MessageStore>,
        model: ModelClient,
        chat: &ChatConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            verifier,
            reaper: Arc::new(Reaper::new(store.clone())),
            store,
            assembler: PromptAssembler::new(chat.history_limit),
            model,
            window_limit: chat.window_limit,
            shutdown,
        }
    }

    pub fn reaper(&self) -> Arc<Reaper> {
        self.reaper.clone()
    }

    /// Resolve a bearer token to a user. Every failure, including a missing
    /// token or an unreachable identity service, becomes `Error::Auth`.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<UserContext> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Auth("missing bearer token".into()))?;

        self.verifier.verify(token).await.map_err(|e| match e {
            Error::Auth(reason) => Error::Auth(reason),
            other => Error::Auth(other.to_string()),
        })
    }

    /// Run one send turn for `user`.
    pub async fn handle_send(&self, user: &UserContext, input: SendInput) -> Result<TurnOutcome> {
        let started = Instant::now();
        validate_text(&input.text)?;

        self.reaper.sweep_user(user).await;

        let history = self.store.load_window(&user.user_id, self.window_limit).await?;

        let user_message = self
            .store
            .append(NewMessage::new(
                user.user_id.as_str(),
                Role::User,
                input.text.as_str(),
                input.attachments,
            )?)
            .await?;

        // `history` predates the append above, so the current text is
        // only ever sent once, as the pending turn.
        let prompt = self
            .assembler
            .assemble(&history, &input.text, input.locale.as_deref());
        let reply = self.model.generate(&prompt, &input.text, &self.shutdown).await;

        // A failure here leaves the user message in place; it expires with
        // the rest of the log.
        let assistant_message = self
            .store
            .append(NewMessage::new(
                user.user_id.as_str(),
                Role::Assistant,
                reply.text.as_str(),
                Vec::new(),
            )?)
            .await?;

        let updated = self.store.load_window(&user.user_id, self.window_limit).await?;

        TraceEvent::TurnCompleted {
            user_id: user.user_id.clone(),
            input_chars: input.text.chars().count(),
            reply_chars: reply.text.chars().count(),
            history_len: updated.len(),
            fallback: reply.fallback,
            contract_version: IDENTITY_CONTRACT_VERSION.to_owned(),
            duration_ms: started.elapsed().as_millis() as u64,
        }
        .emit();

        Ok(TurnOutcome {
            user_message,
            assistant_message,
            history: updated,
            fallback: reply.fallback,
        })
    }

    /// The user's visible history, newest `limit` messages, oldest first.
    pub async fn history(&self, user: &UserContext, limit: usize) -> Result<SessionView> {
        self.store.load_window(&user.user_id, limit).await
    }

    pub async fn clear(&self, user: &UserContext) -> Result<()> {
        self.reaper.clear(user).await
    }
}
