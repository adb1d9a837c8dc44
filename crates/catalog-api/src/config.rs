//! # Configuration
//!
//! Service settings read from command-line flags or, more commonly, from
//! environment variables. Every setting has a default, so an empty
//! environment yields a working development server.
//!
//! | Variable             | Default                   |
//! |----------------------|---------------------------|
//! | `APP_ENV`            | `development`             |
//! | `PORT`               | `3000`                    |
//! | `LOG_LABEL`          | `CATALOG-API`             |
//! | `LOG_LEVEL`          | `debug`                   |
//! | `LOG_FORMAT`         | `pretty`                  |
//! | `LOG_IGNORED_ROUTES` | `/api-docs,/health-check` |
//! | `RESPONSE_META`      | `true`                    |
//! | `METRICS`            | `true`                    |

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, ValueEnum};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOG_LABEL: &str = "CATALOG-API";
pub const DEFAULT_IGNORED_ROUTES: [&str; 2] = ["/api-docs", "/health-check"];

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Development,
    /// Logging is silenced.
    Test,
    Production,
}

/// Minimum level of emitted log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
}

impl LogLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable, colored when attached to a terminal.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Settings that passed parsing but are not usable.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config validation error: {}", .0.join(", "))]
    Invalid(Vec<String>),
}

#[derive(Debug, Clone, Parser)]
#[command(name = "catalog-api", version, about = "Product catalog HTTP API")]
pub struct Config {
    /// Deployment environment.
    #[arg(long = "env", env = "APP_ENV", value_enum, default_value = "development")]
    pub env: Environment,

    /// Listen port.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Service label attached to request-scoped log lines.
    #[arg(long, env = "LOG_LABEL", default_value = DEFAULT_LOG_LABEL)]
    pub log_label: String,

    #[arg(long, env = "LOG_LEVEL", value_enum, default_value = "debug")]
    pub log_level: LogLevel,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Comma-separated path prefixes left out of the access log.
    #[arg(
        long,
        env = "LOG_IGNORED_ROUTES",
        value_delimiter = ',',
        default_value = "/api-docs,/health-check"
    )]
    pub log_ignored_routes: Vec<String>,

    /// Stamp `meta.requestId` and `meta.timestamp` on every envelope.
    #[arg(
        long,
        env = "RESPONSE_META",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        default_value = "true"
    )]
    pub response_meta: bool,

    /// Install the Prometheus recorder and serve `/metrics`.
    #[arg(
        long,
        env = "METRICS",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        default_value = "true"
    )]
    pub metrics: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env: Environment::Development,
            port: DEFAULT_PORT,
            log_label: DEFAULT_LOG_LABEL.to_string(),
            log_level: LogLevel::Debug,
            log_format: LogFormat::Pretty,
            log_ignored_routes: DEFAULT_IGNORED_ROUTES.iter().map(|s| s.to_string()).collect(),
            response_meta: true,
            metrics: true,
        }
    }
}

impl Config {
    /// Parse flags and environment, then validate.
    ///
    /// Unparseable values make clap print the problem and exit.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Report every unusable setting at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        if self.port == 0 {
            problems.push("PORT must be between 1 and 65535".to_string());
        }
        if self.log_label.trim().is_empty() {
            problems.push("LOG_LABEL must not be empty".to_string());
        }
        for route in &self.log_ignored_routes {
            if !route.starts_with('/') {
                problems.push(format!("LOG_IGNORED_ROUTES entry {route:?} must start with '/'"));
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    pub fn is_test(&self) -> bool {
        self.env == Environment::Test
    }
}
