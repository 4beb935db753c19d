// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::SfdkConfig;
use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// The filter described by the configured log level.
pub fn log_filter(config: &SfdkConfig) -> Result<EnvFilter> {
    EnvFilter::try_new(&config.log_level)
        .with_context(|| format!("Invalid log level '{}'", config.log_level))
}

/// Installs a global fmt subscriber. `RUST_LOG`, when set, wins over the configuration.
pub fn setup_tracing(config: &SfdkConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => log_filter(config)?,
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .try_init()
        .context("Could not install the tracing subscriber")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_level_directives() {
        let mut config = SfdkConfig::default();
        assert!(log_filter(&config).is_ok());

        config.log_level = "sfdk=trace,sfdk_trapdoor=debug,warn".to_string();
        assert!(log_filter(&config).is_ok());

        config.log_level = "sfdk=loud".to_string();
        assert!(log_filter(&config).is_err());
    }
}
