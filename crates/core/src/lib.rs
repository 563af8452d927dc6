// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

//! Core building blocks for browser-fetcher.
//!
//! - [`Error`] / [`Result`] - the error taxonomy shared by every crate
//! - [`HttpProvider`] - one persistent HTTP client with GET and streaming download
//! - [`ProgressHandler`] - injected progress reporting for downloads and extraction
//! - [`extract_archive`] - unpack tar (plain, gzip, bzip2, xz) and zip archives

mod error;
pub mod extract;
pub mod progress;
pub mod provider;

pub use error::{Error, Result};
pub use extract::{ArchiveFormat, extract_archive};
pub use progress::{HiddenProgress, ProgressHandler, TerminalProgress};
pub use provider::{HttpProvider, ProviderConfig, RequestOptions};
