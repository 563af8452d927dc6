//! Firefox CI build resolution for browser-fetcher.
//!
//! Maps the host to a Gecko platform identifier, composes a task index key from
//! branch, build, product and [`BuildFlags`], then resolves, downloads and
//! unpacks the build archive through the Taskcluster index and queue APIs.
//!
//! # Example
//!
//! ```no_run
//! use browser_fetcher_core::{HttpProvider, ProviderConfig, TerminalProgress};
//! use browser_fetcher_firefox::{BuildFlags, FetchRequest, Fetcher, TaskclusterApi};
//! use std::sync::Arc;
//!
//! # async fn run() -> browser_fetcher_core::Result<()> {
//! let provider = HttpProvider::new(ProviderConfig::default(), Arc::new(TerminalProgress))?;
//! let mut fetcher = Fetcher::new(TaskclusterApi::new(provider));
//! let flags = BuildFlags::new().with_asan(true);
//! let request = FetchRequest::new(flags, "mozilla-central", "latest", "firefox", ".output");
//! let outcome = fetcher.fetch(&request).await?;
//! println!("{}", outcome.archive.display());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod fetch;
pub mod flags;
pub mod model;
pub mod platform;

pub use api::{DEFAULT_BASE_URL, LookupKey, TaskclusterApi};
pub use fetch::{
    ARCHIVE_CONTENT_TYPE, FetchOutcome, FetchRequest, FetchStage, Fetcher, select_archive,
};
pub use flags::{BuildFlags, BuildVariant};
pub use model::{Artifact, TaskIndexResult, parse_artifact_list, parse_task_index};
pub use platform::PlatformKey;
