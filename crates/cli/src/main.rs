//! browser-fetcher binary entry point.

// CLI binary needs to output to stderr - this is intentional
#![allow(clippy::print_stderr)]

use browser_fetcher::cli::{self, EXIT_OK, exit_code_for, render_error};
use browser_fetcher::commands;
use browser_fetcher::tracing::{TracingConfig, init_tracing};

/// Exit code for SIGINT (128 + signal number 2)
const EXIT_SIGINT: i32 = 130;

/// Exit code when the runtime cannot be started
const EXIT_RUNTIME: i32 = 1;

fn main() {
    // NOTE: Using eprintln! in panic hook is intentional - tracing infrastructure
    // may be corrupted during a panic, so we use the most reliable output method.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    // A partially downloaded archive may remain; nothing to clean up here.
    let _ = ctrlc::set_handler(|| {
        std::process::exit(EXIT_SIGINT);
    });

    let cli = cli::parse();

    let tracing_config = TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
        ..Default::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("{e:?}");
    }

    let exit_code = run_with_tokio(cli.command);
    std::process::exit(exit_code);
}

/// Run the command on a single-threaded runtime.
fn run_with_tokio(command: cli::Commands) -> i32 {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Fatal error: Failed to create tokio runtime: {e}");
            return EXIT_RUNTIME;
        }
    };

    match rt.block_on(commands::execute(command)) {
        Ok(()) => EXIT_OK,
        Err(err) => {
            render_error(&err);
            exit_code_for(&err)
        }
    }
}
