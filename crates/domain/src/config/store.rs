use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Message store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// PostgREST-compatible HTTP API in front of the managed database.
    #[default]
    Rest,
    /// Process-local store. Contents are lost on restart.
    Memory,
}

/// Upper bound accepted for `store.max_retries`.
pub const MAX_STORE_RETRIES: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Base URL of the database REST API (e.g. `https://xyz.supabase.co`).
    #[serde(default)]
    pub base_url: String,
    /// Environment variable holding the service key.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_table")]
    pub table: String,
    #[serde(default = "d_10000")]
    pub timeout_ms: u64,
    /// Retries on transient (5xx / timeout) failures.
    #[serde(default = "d_2")]
    pub max_retries: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            base_url: String::new(),
            api_key_env: d_api_key_env(),
            table: d_table(),
            timeout_ms: d_10000(),
            max_retries: d_2(),
        }
    }
}

fn d_api_key_env() -> String {
    "SUPABASE_SERVICE_ROLE_KEY".into()
}
fn d_table() -> String {
    "chat_messages".into()
}
fn d_10000() -> u64 {
    10_000
}
fn d_2() -> u32 {
    2
}
