//! Error types for browser-fetcher operations.
//!
//! Every variant is terminal for a fetch run: nothing is retried or recovered
//! internally. Callers log the error once and stop.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for browser-fetcher operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving, downloading or unpacking a build.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The host OS/CPU pair has no published build.
    #[error("Unsupported platform: {os}/{arch}")]
    #[diagnostic(
        code(browser_fetcher::configuration::unsupported_platform),
        help("Builds are published for Darwin/x86_64, Linux/x86_64, Linux/x86, Windows/x86_64 and Windows/arm64")
    )]
    UnsupportedPlatform {
        /// Operating system name as reported by the host.
        os: String,
        /// CPU architecture after alias normalization.
        arch: String,
    },

    /// An HTTP request failed (transport error, timeout or non-2xx status).
    #[error("Request to {url} failed")]
    #[diagnostic(
        code(browser_fetcher::request),
        help("Check the network connection and that the requested build exists in the index")
    )]
    Request {
        /// The URL that was requested.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to initialize HTTP client")]
    #[diagnostic(code(browser_fetcher::http_client))]
    HttpClient {
        /// Underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// A response body did not have the expected shape.
    #[error("Invalid {document} response at '{path}'")]
    #[diagnostic(code(browser_fetcher::validation))]
    Validation {
        /// Which document was being parsed (e.g. "task index").
        document: &'static str,
        /// JSON path of the offending field.
        path: String,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Streaming a download to disk failed.
    #[error("Failed to download {url} to {}", .path.display())]
    #[diagnostic(
        code(browser_fetcher::download),
        help("The destination may contain a partially written file; delete it and run again")
    )]
    Download {
        /// The URL being downloaded.
        url: String,
        /// The destination file.
        path: PathBuf,
        /// What went wrong (network, file open or write).
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The task has no artifact of the expected content type.
    #[error("Task {task_id} has no artifact with content type '{content_type}'")]
    #[diagnostic(
        code(browser_fetcher::no_matching_artifact),
        help("The build may still be in progress, or this flag combination is not built for the branch")
    )]
    NoMatchingArtifact {
        /// The task whose artifacts were listed.
        task_id: String,
        /// The content type that was searched for.
        content_type: String,
    },

    /// Unpacking an archive failed.
    #[error("Failed to extract {}: {message}", .archive.display())]
    #[diagnostic(code(browser_fetcher::extraction))]
    Extraction {
        /// The archive being unpacked.
        archive: PathBuf,
        /// Error message.
        message: String,
    },

    /// Filesystem operation failed.
    #[error("I/O {operation} failed on {}", .path.display())]
    #[diagnostic(
        code(browser_fetcher::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The operation that failed (e.g. "create directory").
        operation: &'static str,
        /// The path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an unsupported platform error.
    #[must_use]
    pub fn unsupported_platform(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self::UnsupportedPlatform {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Create a request error.
    #[must_use]
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            url: url.into(),
            source,
        }
    }

    /// Create a validation error from a path-tracking deserialization failure.
    #[must_use]
    pub fn validation(
        document: &'static str,
        error: serde_path_to_error::Error<serde_json::Error>,
    ) -> Self {
        let path = error.path().to_string();
        Self::Validation {
            document,
            path,
            source: error.into_inner(),
        }
    }

    /// Create a download error.
    #[must_use]
    pub fn download(
        url: impl Into<String>,
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Download {
            url: url.into(),
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create a no matching artifact error.
    #[must_use]
    pub fn no_matching_artifact(
        task_id: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self::NoMatchingArtifact {
            task_id: task_id.into(),
            content_type: content_type.into(),
        }
    }

    /// Create an extraction error.
    #[must_use]
    pub fn extraction(archive: &Path, message: impl Into<String>) -> Self {
        Self::Extraction {
            archive: archive.to_path_buf(),
            message: message.into(),
        }
    }

    /// Create an I/O error with the operation and path that failed.
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Whether this error stems from the local configuration rather than the fetch itself.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::UnsupportedPlatform { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_platform_display() {
        let err = Error::unsupported_platform("Linux", "riscv64");
        assert_eq!(err.to_string(), "Unsupported platform: Linux/riscv64");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_validation_keeps_json_path() {
        let json = br#"{"namespace": "a", "inner": {"rank": "high"}}"#;

        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Inner {
            rank: i64,
        }

        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Outer {
            namespace: String,
            inner: Inner,
        }

        let de = &mut serde_json::Deserializer::from_slice(json);
        let result: std::result::Result<Outer, _> = serde_path_to_error::deserialize(de);
        let err = Error::validation("test", result.unwrap_err());

        match &err {
            Error::Validation { document, path, .. } => {
                assert_eq!(*document, "test");
                assert_eq!(path, "inner.rank");
            }
            other => panic!("Expected Validation variant, got {other:?}"),
        }
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_download_wraps_io_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = Error::download("https://example.invalid/a.tar.bz2", "/tmp/a.tar.bz2", io);

        assert_eq!(
            err.to_string(),
            "Failed to download https://example.invalid/a.tar.bz2 to /tmp/a.tar.bz2"
        );
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("read-only"));
    }

    #[test]
    fn test_no_matching_artifact_display() {
        let err = Error::no_matching_artifact("abc123", "application/x-bzip2");
        assert_eq!(
            err.to_string(),
            "Task abc123 has no artifact with content type 'application/x-bzip2'"
        );
    }
}
