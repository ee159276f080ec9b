use serde::Serialize;

/// Structured trace events emitted across all YamiFit crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    /// One send turn finished (with a real or fallback reply).
    TurnCompleted {
        user_id: String,
        input_chars: usize,
        reply_chars: usize,
        history_len: usize,
        fallback: bool,
        /// Identity contract revision the prompt was built with.
        contract_version: String,
        duration_ms: u64,
    },
    ModelCall {
        model: String,
        turns: usize,
        duration_ms: u64,
        prompt_tokens: Option<u32>,
        completion_tokens: Option<u32>,
    },
    /// The model call failed, timed out or was cancelled; a canned reply
    /// was substituted.
    ModelFallback {
        reason: String,
        arabic: bool,
    },
    StoreCall {
        endpoint: String,
        status: u16,
        duration_ms: u64,
    },
    SweepCompleted {
        /// `None` for a global sweep.
        user_id: Option<String>,
        deleted: u64,
    },
    HistoryCleared {
        user_id: String,
    },
}

impl TraceEvent {
    /// Emit this event as a tracing span event.
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "yamifit_event");
    }
}
