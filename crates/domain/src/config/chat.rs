use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat window sizing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Max messages returned by a single window load.
    #[serde(default = "d_40")]
    pub window_limit: usize,
    /// Max historical turns replayed to the model.
    #[serde(default = "d_20")]
    pub history_limit: usize,
    /// `limit` used by the history endpoint when the caller omits it.
    #[serde(default = "d_40")]
    pub history_default_limit: usize,
    /// Upper clamp for the history endpoint's `limit`.
    #[serde(default = "d_100")]
    pub history_max_limit: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            window_limit: d_40(),
            history_limit: d_20(),
            history_default_limit: d_40(),
            history_max_limit: d_100(),
        }
    }
}

impl ChatConfig {
    /// Clamp a caller-supplied history limit into `1..=history_max_limit`.
    pub fn clamp_history_limit(&self, requested: Option<i64>) -> usize {
        let max = self.history_max_limit.max(1);
        match requested {
            None => self.history_default_limit.clamp(1, max),
            Some(n) if n < 1 => 1,
            Some(n) => (n as u64).min(max as u64) as usize,
        }
    }
}

fn d_20() -> usize {
    20
}
fn d_40() -> usize {
    40
}
fn d_100() -> usize {
    100
}
