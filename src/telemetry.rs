use anyhow::{anyhow, Context};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

fn env_filter(config: &AppConfig) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_new(&config.log_filter)
        .with_context(|| format!("invalid log filter {:?}", config.log_filter))
}

/// Installs the global subscriber. Fails if the filter does not parse or a
/// subscriber is already set.
pub fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json_logs {
        builder.with_target(false).json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!(e).context("install tracing subscriber"))
}
