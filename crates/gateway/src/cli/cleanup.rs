use chrono::{SecondsFormat, Utc};

use yf_domain::config::Config;

use crate::bootstrap;
use crate::runtime::Reaper;

/// One-shot global sweep against the configured store. Prints
/// `{"deleted": n, "timestamp": "..."}` on stdout.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    let store = bootstrap::build_store(&config.store)?;
    let deleted = Reaper::new(store).sweep_all().await?;

    let out = serde_json::json!({
        "deleted": deleted,
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    });
    println!("{out}");
    Ok(())
}
