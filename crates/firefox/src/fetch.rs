//! Fetch orchestration: resolve, list, select, download, extract.
//!
//! A run moves strictly forward through [`FetchStage`]. The first failure
//! stops it in [`FetchStage::Failed`]; earlier steps are not rolled back, so a
//! failed download or extraction can leave partial files in the output directory.

use browser_fetcher_core::{ArchiveFormat, Error, Result, extract_archive};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, error, info};

use crate::api::{LookupKey, TaskclusterApi};
use crate::flags::BuildFlags;
use crate::model::Artifact;
use crate::platform::PlatformKey;

/// Content type of the archive artifact selected for download.
pub const ARCHIVE_CONTENT_TYPE: &str = "application/x-bzip2";

/// Progress of a single fetch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStage {
    /// Nothing has happened yet.
    Idle,
    /// The index lookup returned a task.
    TaskResolved,
    /// The task's artifacts were listed.
    ArtifactsListed,
    /// An archive artifact was chosen.
    ArtifactSelected,
    /// The archive is on disk.
    Downloaded,
    /// The archive was unpacked.
    Extracted,
    /// The run completed.
    Done,
    /// The run stopped on an error.
    Failed {
        /// Human-readable error.
        reason: String,
    },
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::TaskResolved => write!(f, "task-resolved"),
            Self::ArtifactsListed => write!(f, "artifacts-listed"),
            Self::ArtifactSelected => write!(f, "artifact-selected"),
            Self::Downloaded => write!(f, "downloaded"),
            Self::Extracted => write!(f, "extracted"),
            Self::Done => write!(f, "done"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Parameters of a fetch run.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Requested build variants.
    pub flags: BuildFlags,
    /// Repository branch (e.g. "mozilla-central").
    pub branch: String,
    /// Build channel (e.g. "latest").
    pub build: String,
    /// Product (e.g. "firefox", "js").
    pub product: String,
    /// Directory receiving the archive and its contents.
    pub output: PathBuf,
    /// Target platform; the host platform is resolved when unset.
    pub platform: Option<PlatformKey>,
}

impl FetchRequest {
    /// Create a request for the host platform.
    #[must_use]
    pub fn new(
        flags: BuildFlags,
        branch: impl Into<String>,
        build: impl Into<String>,
        product: impl Into<String>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            flags,
            branch: branch.into(),
            build: build.into(),
            product: product.into(),
            output: output.into(),
            platform: None,
        }
    }

    /// Target a specific platform instead of the host.
    #[must_use]
    pub fn with_platform(mut self, platform: PlatformKey) -> Self {
        self.platform = Some(platform);
        self
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// The resolved task.
    pub task_id: String,
    /// Name of the downloaded artifact.
    pub artifact: String,
    /// Path of the downloaded archive.
    pub archive: PathBuf,
    /// Directory the archive was unpacked into.
    pub output: PathBuf,
    /// Detected archive format.
    pub format: ArchiveFormat,
    /// Bytes downloaded.
    pub bytes: u64,
}

/// Select the first artifact with the archive content type.
#[must_use]
pub fn select_archive(artifacts: &[Artifact]) -> Option<&Artifact> {
    artifacts
        .iter()
        .find(|a| a.content_type == ARCHIVE_CONTENT_TYPE)
}

/// Runs fetches against a [`TaskclusterApi`].
#[derive(Debug)]
pub struct Fetcher {
    api: TaskclusterApi,
    stage: FetchStage,
}

impl Fetcher {
    /// Create a fetcher.
    #[must_use]
    pub fn new(api: TaskclusterApi) -> Self {
        Self {
            api,
            stage: FetchStage::Idle,
        }
    }

    /// Current stage of the last (or running) fetch.
    #[must_use]
    pub fn stage(&self) -> &FetchStage {
        &self.stage
    }

    /// Release the HTTP session.
    pub fn close(self) {
        self.api.close();
    }

    /// Resolve, download and unpack the build described by `request`.
    ///
    /// # Errors
    ///
    /// Returns the first error hit by any step; the stage is left at
    /// [`FetchStage::Failed`].
    pub async fn fetch(&mut self, request: &FetchRequest) -> Result<FetchOutcome> {
        self.stage = FetchStage::Idle;

        match self.run(request).await {
            Ok(outcome) => {
                self.advance(FetchStage::Done);
                Ok(outcome)
            }
            Err(err) => {
                error!(
                    stage = %self.stage,
                    error = %err,
                    branch = %request.branch,
                    build = %request.build,
                    product = %request.product,
                    flags = %request.flags,
                    output = %request.output.display(),
                    "Discarded fetch"
                );
                self.stage = FetchStage::Failed {
                    reason: err.to_string(),
                };
                Err(err)
            }
        }
    }

    async fn run(&mut self, request: &FetchRequest) -> Result<FetchOutcome> {
        let platform = match &request.platform {
            Some(platform) => platform.clone(),
            None => PlatformKey::resolve()?,
        };

        let key = LookupKey::new(
            &request.branch,
            &request.build,
            &request.product,
            &platform,
            &request.flags,
        );
        info!(namespace = %key.namespace(), %key, "Resolving build");

        let task = self.api.resolve_task(&key).await?;
        self.advance(FetchStage::TaskResolved);

        let artifacts = self.api.list_artifacts(&task.task_id).await?;
        self.advance(FetchStage::ArtifactsListed);

        let artifact = select_archive(&artifacts)
            .ok_or_else(|| Error::no_matching_artifact(&task.task_id, ARCHIVE_CONTENT_TYPE))?;
        self.advance(FetchStage::ArtifactSelected);

        std::fs::create_dir_all(&request.output)
            .map_err(|e| Error::io("create directory", &request.output, e))?;
        let archive = request.output.join(artifact.file_name());
        info!(artifact = %artifact.name, archive = %archive.display(), "Downloading");

        let bytes = self
            .api
            .download_artifact(&task.task_id, artifact, &archive)
            .await?;
        self.advance(FetchStage::Downloaded);

        let format = extract_archive(&archive, &request.output, self.api.provider().progress())?;
        self.advance(FetchStage::Extracted);
        info!(output = %request.output.display(), "Successfully unpacked");

        Ok(FetchOutcome {
            task_id: task.task_id,
            artifact: artifact.name.clone(),
            archive,
            output: request.output.clone(),
            format,
            bytes,
        })
    }

    fn advance(&mut self, stage: FetchStage) {
        debug!(from = %self.stage, to = %stage, "Fetch stage");
        self.stage = stage;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn artifact(name: &str, content_type: &str) -> Artifact {
        Artifact {
            storage_type: "s3".into(),
            name: name.into(),
            expires: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            content_type: content_type.into(),
        }
    }

    #[test]
    fn test_select_archive_any_position() {
        let archive = artifact("public/build/target.tar.bz2", ARCHIVE_CONTENT_TYPE);
        let others = [
            artifact("public/build/target.json", "application/json"),
            artifact("public/logs/live.log", "text/plain"),
        ];

        for position in 0..=others.len() {
            let mut list = others.to_vec();
            list.insert(position, archive.clone());
            assert_eq!(select_archive(&list), Some(&archive), "position {position}");
        }
    }

    #[test]
    fn test_select_archive_first_match_wins() {
        let list = [
            artifact("public/build/first.tar.bz2", ARCHIVE_CONTENT_TYPE),
            artifact("public/build/second.tar.bz2", ARCHIVE_CONTENT_TYPE),
        ];
        assert_eq!(
            select_archive(&list).map(|a| a.name.as_str()),
            Some("public/build/first.tar.bz2")
        );
    }

    #[test]
    fn test_select_archive_none() {
        let list = [artifact("public/build/target.zip", "application/zip")];
        assert!(select_archive(&list).is_none());
        assert!(select_archive(&[]).is_none());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(FetchStage::ArtifactsListed.to_string(), "artifacts-listed");
        assert_eq!(
            FetchStage::Failed {
                reason: "boom".into()
            }
            .to_string(),
            "failed: boom"
        );
    }

    #[test]
    fn test_request_builder() {
        let platform = PlatformKey::from_parts("Windows", "AMD64").unwrap();
        let request = FetchRequest::new(
            BuildFlags::new(),
            "mozilla-release",
            "latest",
            "firefox",
            ".output",
        )
        .with_platform(platform.clone());
        assert_eq!(request.platform, Some(platform));
        assert_eq!(request.output, PathBuf::from(".output"));
    }
}
