//! Response models for the task index and queue APIs.
//!
//! Wire JSON uses camelCase; fields here are snake_case. Parsing goes through
//! `serde_path_to_error` so a validation failure names the offending field.

use browser_fetcher_core::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// A task index lookup result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskIndexResult {
    /// Full index namespace of the task.
    pub namespace: String,
    /// The indexed task.
    pub task_id: String,
    /// Rank used to order tasks indexed under the same namespace.
    pub rank: i64,
    /// Opaque data attached to the index entry.
    pub data: serde_json::Map<String, serde_json::Value>,
    /// When the index entry expires.
    pub expires: DateTime<Utc>,
}

/// An artifact attached to a task.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Storage backend (e.g. "s3", "reference").
    pub storage_type: String,
    /// Path-like artifact name (e.g. "public/build/target.tar.bz2").
    pub name: String,
    /// When the artifact expires.
    pub expires: DateTime<Utc>,
    /// MIME type of the artifact.
    pub content_type: String,
}

impl Artifact {
    /// The segment after the last `/` of the artifact name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Deserialize)]
struct ArtifactList {
    artifacts: Vec<Artifact>,
}

/// Parse a task index response.
///
/// # Errors
///
/// Returns [`Error::Validation`] if a required field is missing or mistyped.
pub fn parse_task_index(bytes: &[u8]) -> Result<TaskIndexResult> {
    parse(bytes, "task index")
}

/// Parse an artifact listing response into its artifacts, in wire order.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the listing or any artifact is malformed.
pub fn parse_artifact_list(bytes: &[u8]) -> Result<Vec<Artifact>> {
    parse::<ArtifactList>(bytes, "artifact list").map(|list| list.artifacts)
}

fn parse<T: DeserializeOwned>(bytes: &[u8], document: &'static str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(de).map_err(|e| Error::validation(document, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const TASK_INDEX: &str = r#"{
        "namespace": "gecko.v2.mozilla-central.latest.firefox.linux64-asan-debug",
        "taskId": "Fy0yC6JVQKOO5dNYyCbAQg",
        "rank": 1700000000,
        "data": {},
        "expires": "2025-11-14T10:30:00.000Z"
    }"#;

    const ARTIFACTS: &str = r#"{
        "artifacts": [
            {
                "storageType": "s3",
                "name": "public/build/target.json",
                "expires": "2025-11-14T10:30:00.000Z",
                "contentType": "application/json"
            },
            {
                "storageType": "s3",
                "name": "public/build/target.tar.bz2",
                "expires": "2025-11-14T10:30:00.000Z",
                "contentType": "application/x-bzip2"
            },
            {
                "storageType": "s3",
                "name": "public/logs/live.log",
                "expires": "2025-11-14T10:30:00.000Z",
                "contentType": "text/plain; charset=utf-8"
            }
        ],
        "continuationToken": null
    }"#;

    #[test]
    fn test_parse_task_index() {
        let task = parse_task_index(TASK_INDEX.as_bytes()).unwrap();
        assert_eq!(task.task_id, "Fy0yC6JVQKOO5dNYyCbAQg");
        assert_eq!(
            task.namespace,
            "gecko.v2.mozilla-central.latest.firefox.linux64-asan-debug"
        );
        assert_eq!(task.rank, 1_700_000_000);
        assert!(task.data.is_empty());
        assert_eq!(
            task.expires,
            Utc.with_ymd_and_hms(2025, 11, 14, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_task_index_keeps_opaque_data() {
        let json = TASK_INDEX.replace(
            r#""data": {}"#,
            r#""data": {"pushlog_id": "42", "nested": [1, 2]}"#,
        );
        let task = parse_task_index(json.as_bytes()).unwrap();
        assert_eq!(task.data["pushlog_id"], "42");
        assert_eq!(task.data["nested"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_missing_task_id_is_validation_error() {
        let json = r#"{
            "namespace": "gecko.v2.mozilla-central.latest.firefox.linux64",
            "rank": 0,
            "data": {},
            "expires": "2025-11-14T10:30:00.000Z"
        }"#;

        match parse_task_index(json.as_bytes()).unwrap_err() {
            Error::Validation { document, source, .. } => {
                assert_eq!(document, "task index");
                assert!(source.to_string().contains("taskId"));
            }
            other => panic!("Expected Validation variant, got {other:?}"),
        }
    }

    #[test]
    fn test_snake_case_keys_are_rejected() {
        let json = TASK_INDEX.replace("taskId", "task_id");
        assert!(matches!(
            parse_task_index(json.as_bytes()),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_wrong_type_reports_path() {
        let json = TASK_INDEX.replace("1700000000", r#""first""#);
        match parse_task_index(json.as_bytes()).unwrap_err() {
            Error::Validation { path, .. } => assert_eq!(path, "rank"),
            other => panic!("Expected Validation variant, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_timestamp_is_validation_error() {
        let json = TASK_INDEX.replace("2025-11-14T10:30:00.000Z", "next tuesday");
        match parse_task_index(json.as_bytes()).unwrap_err() {
            Error::Validation { path, .. } => assert_eq!(path, "expires"),
            other => panic!("Expected Validation variant, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_artifact_list() {
        let artifacts = parse_artifact_list(ARTIFACTS.as_bytes()).unwrap();
        assert_eq!(artifacts.len(), 3);
        assert_eq!(artifacts[1].storage_type, "s3");
        assert_eq!(artifacts[1].content_type, "application/x-bzip2");
        assert_eq!(artifacts[1].file_name(), "target.tar.bz2");
    }

    #[test]
    fn test_artifact_list_reports_index_path() {
        let json = ARTIFACTS.replacen(
            r#""contentType": "application/x-bzip2""#,
            r#""contentType": 7"#,
            1,
        );
        match parse_artifact_list(json.as_bytes()).unwrap_err() {
            Error::Validation { document, path, .. } => {
                assert_eq!(document, "artifact list");
                assert_eq!(path, "artifacts[1].contentType");
            }
            other => panic!("Expected Validation variant, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_artifacts_key() {
        assert!(matches!(
            parse_artifact_list(br#"{"items": []}"#),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_file_name_without_slash() {
        let artifact = Artifact {
            storage_type: "s3".into(),
            name: "target.tar.bz2".into(),
            expires: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            content_type: "application/x-bzip2".into(),
        };
        assert_eq!(artifact.file_name(), "target.tar.bz2");
    }
}
