//! Progress reporting for downloads and extraction.
//!
//! Library code never draws to the terminal directly: it asks the injected
//! [`ProgressHandler`] to register each bar, so callers decide where (and
//! whether) progress is rendered.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Abstraction over progress reporting so callers can hook into their own UI.
pub trait ProgressHandler: Send + Sync {
    /// Adds a progress bar to the underlying renderer, returning the wrapped bar.
    fn add_progress_bar(&self, bar: ProgressBar) -> ProgressBar;

    /// Style for byte-based progress with a known total.
    fn bytes_style(&self) -> ProgressStyle {
        bytes_style()
    }

    /// Style for byte-based progress when the total is unknown.
    fn spinner_style(&self) -> ProgressStyle {
        spinner_style()
    }
}

/// Draws progress bars on stderr.
#[derive(Debug, Clone, Default)]
pub struct TerminalProgress;

impl ProgressHandler for TerminalProgress {
    fn add_progress_bar(&self, bar: ProgressBar) -> ProgressBar {
        bar.set_draw_target(ProgressDrawTarget::stderr());
        bar
    }
}

/// Swallows all progress output.
#[derive(Debug, Clone, Default)]
pub struct HiddenProgress;

impl ProgressHandler for HiddenProgress {
    fn add_progress_bar(&self, bar: ProgressBar) -> ProgressBar {
        bar.set_draw_target(ProgressDrawTarget::hidden());
        bar
    }
}

/// Create a byte progress bar, falling back to a spinner when `total` is zero.
pub fn bytes_progress_bar(handler: &dyn ProgressHandler, total: u64, prefix: &str) -> ProgressBar {
    let bar = if total == 0 {
        let bar = ProgressBar::new_spinner().with_style(handler.spinner_style());
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    } else {
        ProgressBar::new(total).with_style(handler.bytes_style())
    };
    bar.set_prefix(prefix.to_string());
    handler.add_progress_bar(bar)
}

fn bytes_style() -> ProgressStyle {
    ProgressStyle::with_template(concat!(
        "{prefix:<24!} [{elapsed_precise}] [{bar:30.green}] ",
        "{bytes}/{total_bytes} ({bytes_per_sec})",
    ))
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:<24!} [{elapsed_precise}] {spinner:.green} {bytes}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}
