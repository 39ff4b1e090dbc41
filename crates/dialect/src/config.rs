//! Dialect and diagnostics configuration.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DATABASE_URL` | (none) | Connection string; its scheme selects the dialect |
//! | `DATABASE_TYPE` | (none) | `postgresql` or `mysql`; takes precedence over the URL |
//! | `LOG_QUERY` | false | Log every bound statement at debug level |
//! | `HELIOS_LOG_LEVEL` | info | Log level |
//! | `HELIOS_BIND_MODE` | strict | `strict` or `lenient` handling of missing template parameters |
//!
//! # Example
//!
//! ```rust
//! use helios_dialect::config::DialectConfig;
//! use helios_dialect::dialect::Dialect;
//!
//! let config = DialectConfig {
//!     database_url: Some("mysql://root@localhost/analytics".to_string()),
//!     ..Default::default()
//! };
//! assert_eq!(config.dialect().unwrap(), Dialect::MySql);
//! ```

use std::sync::Arc;

use clap::Parser;

use crate::dialect::Dialect;
use crate::error::{QueryError, QueryResult};
use crate::executor::{DiagnosticSink, NoopSink, TracingSink};
use crate::template::BindMode;

/// Dialect configuration.
///
/// Built from environment variables with [`DialectConfig::from_env`], from
/// command line arguments (it can be flattened into another parser), or
/// programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "helios-dialect")]
#[command(about = "SQL dialect configuration")]
pub struct DialectConfig {
    /// Database connection string.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Explicit database type (postgresql, mysql).
    #[arg(long, env = "DATABASE_TYPE")]
    pub database_type: Option<String>,

    /// Log bound statements before execution.
    #[arg(
        long,
        env = "LOG_QUERY",
        default_value = "false",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub log_query: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "HELIOS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Handling of template placeholders without a parameter (strict, lenient).
    #[arg(long, env = "HELIOS_BIND_MODE", default_value = "strict")]
    pub bind_mode: String,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            database_type: None,
            log_query: false,
            log_level: "info".to_string(),
            bind_mode: "strict".to_string(),
        }
    }
}

impl DialectConfig {
    /// Reads the configuration from environment variables only.
    ///
    /// Command line arguments are ignored so that binaries with their own
    /// argument grammar can still call this. An unparseable variable is
    /// reported as [`QueryError::UnsupportedDialect`] naming the clap error.
    pub fn try_from_env() -> QueryResult<Self> {
        Self::try_parse_from(["helios-dialect"]).map_err(|e| QueryError::UnsupportedDialect {
            value: format!("invalid configuration: {}", e.to_string().trim()),
        })
    }

    /// Like [`DialectConfig::try_from_env`], logging the error and falling
    /// back to defaults.
    pub fn from_env() -> Self {
        Self::try_from_env().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring dialect configuration from the environment");
            Self::default()
        })
    }

    /// Resolves the dialect: `DATABASE_TYPE` first, then the URL scheme.
    pub fn dialect(&self) -> QueryResult<Dialect> {
        if let Some(kind) = self.database_type.as_deref().filter(|s| !s.trim().is_empty()) {
            return kind.parse();
        }
        match self.database_url.as_deref() {
            Some(url) => Dialect::from_database_url(url),
            None => Err(QueryError::UnsupportedDialect {
                value: "neither DATABASE_TYPE nor DATABASE_URL is set".to_string(),
            }),
        }
    }

    /// The diagnostic sink selected by `LOG_QUERY`.
    pub fn diagnostic_sink(&self) -> Arc<dyn DiagnosticSink> {
        if self.log_query {
            Arc::new(TracingSink)
        } else {
            Arc::new(NoopSink)
        }
    }

    /// The configured bind mode; unknown values fall back to strict.
    pub fn bind_mode(&self) -> BindMode {
        match self.bind_mode.to_ascii_lowercase().as_str() {
            "lenient" => BindMode::Lenient,
            _ => BindMode::Strict,
        }
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = self.dialect() {
            errors.push(e.to_string());
        }

        if !matches!(
            self.log_level.to_ascii_lowercase().as_str(),
            "error" | "warn" | "info" | "debug" | "trace"
        ) {
            errors.push(format!("Invalid log level: {}", self.log_level));
        }

        if !matches!(
            self.bind_mode.to_ascii_lowercase().as_str(),
            "strict" | "lenient"
        ) {
            errors.push(format!("Invalid bind mode: {}", self.bind_mode));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    pub fn for_testing(dialect: Dialect) -> Self {
        Self {
            database_url: None,
            database_type: Some(dialect.to_string()),
            log_query: true,
            log_level: "debug".to_string(),
            bind_mode: "strict".to_string(),
        }
    }
}

/// Installs a `tracing` subscriber writing formatted events to stdout.
///
/// `RUST_LOG` overrides the level when set.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("helios_dialect={},helios_sql={}", level, level)));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
