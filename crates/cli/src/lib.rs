// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

//! browser-fetcher command-line interface.
//!
//! The binary in `main.rs` is a thin shell over this library: [`cli`] parses
//! arguments and maps errors to exit codes, [`tracing`] installs the subscriber,
//! and [`commands`] runs the requested fetch.

// Errors are rendered on stderr by the binary
#![allow(clippy::print_stderr)]

/// CLI argument parsing and exit codes.
pub mod cli;
/// Subcommand implementations.
pub mod commands;
/// Tracing subscriber setup.
pub mod tracing;
