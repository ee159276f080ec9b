use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Expired-message cleanup
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Environment variable holding the shared secret expected in the
    /// `X-Cleanup-Secret` header. If unset, the cleanup endpoint always
    /// answers 403.
    #[serde(default = "d_secret_env")]
    pub secret_env: String,
    /// Interval of the in-process global sweep. `0` disables it and leaves
    /// sweeping to the external scheduler plus the per-send sweep.
    #[serde(default = "d_3600")]
    pub sweep_interval_secs: u64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            secret_env: d_secret_env(),
            sweep_interval_secs: d_3600(),
        }
    }
}

fn d_secret_env() -> String {
    "CLEANUP_SECRET".into()
}
fn d_3600() -> u64 {
    3_600
}
