//! Command dispatch.

pub mod firefox;

use crate::cli::{CliError, Commands};

/// Run a parsed subcommand to completion.
///
/// # Errors
///
/// Returns the subcommand's error, already classified for exit-code mapping.
pub async fn execute(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Firefox(args) => firefox::execute(&args).await,
    }
}
