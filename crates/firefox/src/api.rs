//! Taskcluster index and queue endpoints.

use browser_fetcher_core::{HttpProvider, Result};
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::flags::BuildFlags;
use crate::model::{Artifact, TaskIndexResult, parse_artifact_list, parse_task_index};
use crate::platform::PlatformKey;

/// Production Firefox CI API root.
pub const DEFAULT_BASE_URL: &str = "https://firefox-ci-tc.services.mozilla.com/api";

/// A fully composed task index key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupKey {
    namespace: String,
    key: String,
}

impl LookupKey {
    /// Compose `gecko.v2.{branch}.{build}.{product}.{platform}{flags}`.
    #[must_use]
    pub fn new(
        branch: &str,
        build: &str,
        product: &str,
        platform: &PlatformKey,
        flags: &BuildFlags,
    ) -> Self {
        let namespace = format!("gecko.v2.{branch}.{build}");
        let key = format!("{namespace}.{product}.{platform}{}", flags.suffix());
        Self { namespace, key }
    }

    /// The `gecko.v2.{branch}.{build}` part.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The full key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Explicit facade over the three endpoints a fetch needs.
#[derive(Debug)]
pub struct TaskclusterApi {
    provider: HttpProvider,
    base_url: String,
}

impl TaskclusterApi {
    /// Create an API client against the production endpoint.
    #[must_use]
    pub fn new(provider: HttpProvider) -> Self {
        Self::with_base_url(provider, DEFAULT_BASE_URL)
    }

    /// Create an API client against a custom root (mirrors, tests).
    #[must_use]
    pub fn with_base_url(provider: HttpProvider, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { provider, base_url }
    }

    /// The API root in use.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The underlying HTTP provider.
    #[must_use]
    pub fn provider(&self) -> &HttpProvider {
        &self.provider
    }

    /// `GET {base}/index/v1/task/{key}`.
    #[must_use]
    pub fn task_url(&self, key: &LookupKey) -> String {
        format!("{}/index/v1/task/{key}", self.base_url)
    }

    /// `GET {base}/queue/v1/task/{task_id}/artifacts`.
    #[must_use]
    pub fn artifacts_url(&self, task_id: &str) -> String {
        format!("{}/queue/v1/task/{task_id}/artifacts", self.base_url)
    }

    /// `GET {base}/queue/v1/task/{task_id}/artifacts/{name}`.
    #[must_use]
    pub fn artifact_url(&self, task_id: &str, name: &str) -> String {
        format!("{}/queue/v1/task/{task_id}/artifacts/{name}", self.base_url)
    }

    /// Resolve the task indexed under `key`.
    ///
    /// # Errors
    ///
    /// Returns a request error if the lookup fails or a validation error if the
    /// response is malformed.
    pub async fn resolve_task(&self, key: &LookupKey) -> Result<TaskIndexResult> {
        let url = self.task_url(key);
        let body = self
            .provider
            .get_bytes(&url, &self.provider.request_options())
            .await?;
        let task = parse_task_index(&body)?;
        debug!(task_id = %task.task_id, namespace = %task.namespace, "Resolved task");
        Ok(task)
    }

    /// List the artifacts of `task_id`, in the order the queue returns them.
    ///
    /// # Errors
    ///
    /// Returns a request error if the listing fails or a validation error if the
    /// response is malformed.
    pub async fn list_artifacts(&self, task_id: &str) -> Result<Vec<Artifact>> {
        let url = self.artifacts_url(task_id);
        let body = self
            .provider
            .get_bytes(&url, &self.provider.request_options())
            .await?;
        let artifacts = parse_artifact_list(&body)?;
        debug!(%task_id, count = artifacts.len(), "Listed artifacts");
        Ok(artifacts)
    }

    /// Stream `artifact` of `task_id` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns a download error if any part of the transfer fails.
    pub async fn download_artifact(
        &self,
        task_id: &str,
        artifact: &Artifact,
        destination: &Path,
    ) -> Result<u64> {
        let url = self.artifact_url(task_id, &artifact.name);
        self.provider.download(&url, destination).await
    }

    /// Release the HTTP session.
    pub fn close(self) {
        self.provider.close();
    }
}
