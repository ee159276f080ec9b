pub mod cleanup;
pub mod config;

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};

use yf_domain::config::Config;

/// YamiFit assistant: the chat session gateway.
#[derive(Debug, Parser)]
#[command(name = "yamifit", version, about)]
pub struct Cli {
    /// Path to the config file. Overrides `YF_CONFIG`.
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the gateway server (default when no subcommand is given).
    Serve,
    /// Run one global sweep of expired messages and print the result.
    Cleanup,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration.
///
/// The path is `--config` if given, else `YF_CONFIG`, else `config.toml`.
/// An explicitly named file must exist; a missing default file yields the
/// built-in defaults. Returns the parsed [`Config`] and the path used.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<(Config, String)> {
    let named = explicit
        .map(str::to_owned)
        .or_else(|| std::env::var("YF_CONFIG").ok().filter(|p| !p.is_empty()));

    let config_path = named.clone().unwrap_or_else(|| "config.toml".into());

    let config = if Path::new(&config_path).exists() {
        load_config_from(&config_path)?
    } else if named.is_some() {
        anyhow::bail!("config file {config_path} not found");
    } else {
        Config::default()
    };

    Ok((config, config_path))
}

/// Parse a TOML config file.
pub fn load_config_from(path: &str) -> anyhow::Result<Config> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    toml::from_str(&raw).with_context(|| format!("parsing {path}"))
}
