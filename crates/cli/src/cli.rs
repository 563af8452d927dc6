use browser_fetcher_firefox::{BuildFlags, BuildVariant, DEFAULT_BASE_URL};
use clap::{Args, Parser, Subcommand, ValueEnum};
use miette::{Diagnostic, Report};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

use crate::tracing::{LogLevel, TracingFormat};

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// Fetch failure exit code
pub const EXIT_FETCH: i32 = 3;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("Configuration error: {message}")]
    #[diagnostic(code(browser_fetcher::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Resolving, downloading or unpacking a build failed (exit code 3)
    #[error("Fetch failed: {message}")]
    #[diagnostic(code(browser_fetcher::cli::fetch))]
    Fetch {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new fetch error
    #[must_use]
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
            help: None,
        }
    }

    /// Add help text to an existing error, returning a new error with the help text set.
    #[must_use]
    pub fn with_help(self, help_text: impl Into<String>) -> Self {
        let help = Some(help_text.into());
        match self {
            Self::Config { message, .. } => Self::Config { message, help },
            Self::Fetch { message, .. } => Self::Fetch { message, help },
        }
    }
}

/// Convert `browser_fetcher_core::Error` to the matching `CliError` variant.
///
/// The message carries the whole source chain (status codes, I/O causes) since
/// the rendered report only sees the flattened text.
impl From<browser_fetcher_core::Error> for CliError {
    fn from(err: browser_fetcher_core::Error) -> Self {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        let converted = if err.is_configuration() {
            Self::config(message)
        } else {
            Self::fetch(message)
        };

        match err.help() {
            Some(help) => converted.with_help(help.to_string()),
            None => converted,
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Fetch { .. } => EXIT_FETCH,
    }
}

/// Render an error once on stderr
pub fn render_error(err: &CliError) {
    let report = Report::new(err.clone());
    eprintln!("{report:?}");
    // Ensure output is flushed before potential process exit
    let _ = io::stderr().flush();
}

/// Fetch Firefox CI builds from Taskcluster.
#[derive(Parser, Debug)]
#[command(name = "browser-fetcher")]
#[command(about = "Fetch Firefox CI builds (ASan, TSan, fuzzing, coverage) from Taskcluster")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Logging verbosity level.
    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "debug",
        value_enum
    )]
    pub level: LogLevel,

    /// Log line format.
    #[arg(
        long,
        global = true,
        help = "Set log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a Firefox or SpiderMonkey build.
    #[command(about = "Fetch a Firefox or SpiderMonkey build from Firefox CI")]
    Firefox(FirefoxArgs),
}

/// Arguments of the `firefox` subcommand.
#[derive(Args, Debug)]
pub struct FirefoxArgs {
    /// Debug build.
    #[arg(short, long, conflicts_with = "optimized", help = "Fetch a debug build")]
    pub debug: bool,

    /// Optimized build (the default).
    #[arg(long, help = "Fetch an optimized build (default)")]
    pub optimized: bool,

    /// AddressSanitizer build.
    #[arg(short, long, help = "Fetch an AddressSanitizer build")]
    pub asan: bool,

    /// ThreadSanitizer build.
    #[arg(short, long, help = "Fetch a ThreadSanitizer build")]
    pub tsan: bool,

    /// Fuzzing build.
    #[arg(short, long, help = "Fetch a fuzzing build")]
    pub fuzzing: bool,

    /// Code coverage build.
    #[arg(short, long, help = "Fetch a code coverage build")]
    pub coverage: bool,

    /// Valgrind build.
    #[arg(short, long, help = "Fetch a Valgrind build")]
    pub valgrind: bool,

    /// Repository branch.
    #[arg(long, value_enum, default_value = "mozilla-central", help = "Repository branch")]
    pub branch: Branch,

    /// Build channel.
    #[arg(long, value_enum, default_value = "latest", help = "Build to fetch")]
    pub build: Build,

    /// Product.
    #[arg(long, value_enum, default_value = "firefox", help = "Product to fetch")]
    pub target: Target,

    /// Output directory.
    #[arg(
        short,
        long,
        default_value = ".output",
        help = "Directory for the archive and its contents (created if missing)"
    )]
    pub output: PathBuf,

    /// Taskcluster API root.
    #[arg(
        long,
        env = "BROWSER_FETCHER_BASE_URL",
        default_value = DEFAULT_BASE_URL,
        help = "Taskcluster API root"
    )]
    pub base_url: String,

    /// Request timeout in seconds.
    #[arg(
        long,
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Request timeout in seconds"
    )]
    pub timeout: u64,
}

impl FirefoxArgs {
    /// Build flags selected on the command line.
    #[must_use]
    pub fn flags(&self) -> BuildFlags {
        let variant = if self.debug {
            BuildVariant::Debug
        } else {
            BuildVariant::Optimized
        };

        BuildFlags::new()
            .with_coverage(self.coverage)
            .with_fuzzing(self.fuzzing)
            .with_asan(self.asan)
            .with_tsan(self.tsan)
            .with_valgrind(self.valgrind)
            .with_variant(variant)
    }
}

/// Repository branch.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Branch {
    /// Nightly.
    MozillaCentral,
    /// Release.
    MozillaRelease,
    /// Beta.
    MozillaBeta,
}

impl Branch {
    /// Name as used in index namespaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MozillaCentral => "mozilla-central",
            Self::MozillaRelease => "mozilla-release",
            Self::MozillaBeta => "mozilla-beta",
        }
    }
}

/// Build channel.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Build {
    /// The most recent indexed build.
    Latest,
}

impl Build {
    /// Name as used in index namespaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Latest => "latest",
        }
    }
}

/// Product to fetch.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Target {
    /// The browser.
    Firefox,
    /// The SpiderMonkey shell.
    Js,
}

impl Target {
    /// Name as used in index keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Firefox => "firefox",
            Self::Js => "js",
        }
    }
}

/// Parse command line arguments, exiting on usage errors.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
