//! `browser-fetcher firefox`: resolve, download and unpack a Firefox CI build.

use browser_fetcher_core::{Error, HttpProvider, ProviderConfig, TerminalProgress};
use browser_fetcher_firefox::{FetchOutcome, FetchRequest, Fetcher, TaskclusterApi};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::cli::{CliError, FirefoxArgs};

/// Build the fetch request described by the command line.
#[must_use]
pub fn request_for(args: &FirefoxArgs) -> FetchRequest {
    FetchRequest::new(
        args.flags(),
        args.branch.as_str(),
        args.build.as_str(),
        args.target.as_str(),
        &args.output,
    )
}

/// Run the subcommand.
///
/// # Errors
///
/// Returns a configuration error for an unsupported host and a fetch error for
/// anything that goes wrong talking to Taskcluster or unpacking the archive.
pub async fn execute(args: &FirefoxArgs) -> Result<(), CliError> {
    std::fs::create_dir_all(&args.output)
        .map_err(|e| Error::io("create directory", &args.output, e))?;

    let config = ProviderConfig::default().with_timeout(Duration::from_secs(args.timeout));
    let provider = HttpProvider::new(config, Arc::new(TerminalProgress))?;
    let mut fetcher = Fetcher::new(TaskclusterApi::with_base_url(
        provider,
        args.base_url.as_str(),
    ));

    let result = fetcher.fetch(&request_for(args)).await;
    fetcher.close();

    let FetchOutcome {
        task_id,
        archive,
        output,
        bytes,
        ..
    } = result?;
    info!(
        %task_id,
        archive = %archive.display(),
        output = %output.display(),
        bytes,
        "Fetched build"
    );

    Ok(())
}
