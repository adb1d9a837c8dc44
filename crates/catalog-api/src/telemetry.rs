//! # Telemetry
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` wins over the
//! configured level when set; the `test` environment silences everything.

use tracing_subscriber::EnvFilter;

use crate::config::{Config, LogFormat};

/// Filter directives for `config`, ignoring `RUST_LOG`.
pub fn default_directives(config: &Config) -> &'static str {
    if config.is_test() {
        "off"
    } else {
        config.log_level.as_directive()
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &Config) -> anyhow::Result<()> {
    let filter = if config.is_test() {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(config)))
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    installed.map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}
