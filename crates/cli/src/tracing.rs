//! Tracing configuration for the browser-fetcher CLI
//!
//! Library crates only emit events; the subscriber is installed here, once,
//! from a [`TracingConfig`].

use std::io;
pub use tracing::Level;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events pass the default filter.
const CRATES: &[&str] = &[
    "browser_fetcher",
    "browser_fetcher_core",
    "browser_fetcher_firefox",
];

/// Tracing output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TracingFormat {
    /// Pretty-printed multi-line format
    Pretty,
    /// Compact single-line format with a wall-clock time
    Compact,
    /// Structured JSON format
    Json,
}

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only unrecoverable errors (same as error)
    Critical,
    /// Show errors only
    Error,
    /// Show warnings and above
    Warning,
    /// Show info and above
    Info,
    /// Show debug and above (default)
    Debug,
    /// Show all logs
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warning => Self::WARN,
            LogLevel::Critical | LogLevel::Error => Self::ERROR,
        }
    }
}

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Output format.
    pub format: TracingFormat,
    /// Maximum level for this workspace's crates.
    pub level: Level,
    /// Explicit filter directives, overriding `RUST_LOG` and `level`.
    pub filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            format: TracingFormat::Compact,
            level: Level::DEBUG,
            filter: None,
        }
    }
}

/// Filter directives scoping `level` to this workspace's crates.
#[must_use]
pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize tracing with the given configuration
///
/// # Errors
///
/// Returns an error if the filter is invalid or a subscriber is already installed.
pub fn init_tracing(config: TracingConfig) -> miette::Result<()> {
    let env_filter = if let Some(filter) = config.filter {
        EnvFilter::try_new(filter)
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_directives(config.level)))
    }
    .map_err(|e| miette::miette!("Failed to create tracing filter: {e}"))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match config.format {
        TracingFormat::Pretty => {
            let layer = tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(io::stderr)
                .with_target(true);

            registry.with(layer).try_init()
        }
        TracingFormat::Compact => {
            let layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_timer(ChronoLocal::new("%H:%M:%S".to_string()))
                .with_target(false);

            registry.with(layer).try_init()
        }
        TracingFormat::Json => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_current_span(true);

            registry.with(layer).try_init()
        }
    };
    installed.map_err(|e| miette::miette!("Failed to install tracing subscriber: {e}"))?;

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        format = ?config.format,
        "Tracing initialized"
    );

    Ok(())
}
