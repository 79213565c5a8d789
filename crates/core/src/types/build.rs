//! Cloud Build notification envelopes and the subset of the `Build` resource
//! used to describe a build in Slack.
//!
//! Every field is optional: Cloud Build omits fields freely depending on the
//! build's lifecycle stage and source type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Pub/Sub message published by Cloud Build for each status change.
///
/// `data` is the base64-encoded JSON `Build` resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildNotification {
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl BuildNotification {
    /// The `buildId` attribute, if set.
    #[must_use]
    pub fn build_id(&self) -> Option<&str> {
        self.attributes.get("buildId").map(String::as_str)
    }

    /// The raw `status` attribute, if set.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.attributes.get("status").map(String::as_str)
    }
}

/// Pub/Sub push subscription request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushEnvelope {
    pub message: BuildNotification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,
}

/// Cloud Build `Build` resource (fields used for notifications only).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Build {
    pub id: Option<String>,
    pub project_id: Option<String>,
    pub status: Option<String>,
    pub log_url: Option<String>,
    pub start_time: Option<String>,
    pub finish_time: Option<String>,
    pub source: Option<Source>,
    pub source_provenance: Option<SourceProvenance>,
    pub substitutions: HashMap<String, String>,
}

/// Pre-build source location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Source {
    pub repo_source: Option<RepoSource>,
}

/// Post-build record of the source that was actually built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceProvenance {
    pub resolved_repo_source: Option<RepoSource>,
}

/// A repository revision.
///
/// Unknown keys are kept in `other` so that a group carrying only fields
/// this crate does not model still counts as present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepoSource {
    pub project_id: Option<String>,
    pub repo_name: Option<String>,
    pub branch_name: Option<String>,
    pub tag_name: Option<String>,
    pub commit_sha: Option<String>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl RepoSource {
    /// Build a source group from the `_REPO`, `_GIT_SHA` and `_BRANCH`
    /// user substitutions.
    #[must_use]
    pub fn from_substitutions(substitutions: &HashMap<String, String>) -> Self {
        let get = |key: &str| substitutions.get(key).cloned();
        Self {
            repo_name: get("_REPO"),
            commit_sha: get("_GIT_SHA"),
            branch_name: get("_BRANCH"),
            ..Self::default()
        }
    }

    /// True if the group carries no keys at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.project_id.is_none()
            && self.repo_name.is_none()
            && self.branch_name.is_none()
            && self.tag_name.is_none()
            && self.commit_sha.is_none()
            && self.other.is_empty()
    }
}

impl Build {
    /// The non-empty `sourceProvenance.resolvedRepoSource`, if any.
    #[must_use]
    pub fn resolved_repo_source(&self) -> Option<&RepoSource> {
        self.source_provenance
            .as_ref()
            .and_then(|provenance| provenance.resolved_repo_source.as_ref())
            .filter(|source| !source.is_empty())
    }

    /// The non-empty `source.repoSource`, if any.
    #[must_use]
    pub fn repo_source(&self) -> Option<&RepoSource> {
        self.source
            .as_ref()
            .and_then(|source| source.repo_source.as_ref())
            .filter(|source| !source.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_deserializes_partial_resource() {
        let build: Build = serde_json::from_value(json!({
            "projectId": "my-project",
            "logUrl": "https://console.cloud.google.com/cloud-build/builds/abc",
            "sourceProvenance": {
                "resolvedRepoSource": {"repoName": "testrepo", "commitSha": "ab12cd34ef"}
            },
            "steps": [{"name": "gcr.io/cloud-builders/docker"}]
        }))
        .expect("deserialize");

        assert_eq!(build.project_id.as_deref(), Some("my-project"));
        let resolved = build.resolved_repo_source().expect("resolved source");
        assert_eq!(resolved.commit_sha.as_deref(), Some("ab12cd34ef"));
        assert!(build.repo_source().is_none());
    }

    #[test]
    fn test_empty_groups_are_skipped() {
        let build: Build = serde_json::from_value(json!({
            "sourceProvenance": {"resolvedRepoSource": {}},
            "source": {"repoSource": {}}
        }))
        .expect("deserialize");

        assert!(build.resolved_repo_source().is_none());
        assert!(build.repo_source().is_none());
    }

    #[test]
    fn test_unmodelled_keys_count_as_present() {
        let source: RepoSource =
            serde_json::from_value(json!({"dir": "services/api"})).expect("deserialize");
        assert!(!source.is_empty());
    }

    #[test]
    fn test_from_substitutions() {
        let substitutions = HashMap::from([
            ("_REPO".to_string(), "testrepo".to_string()),
            ("_BRANCH".to_string(), "main".to_string()),
        ]);
        let source = RepoSource::from_substitutions(&substitutions);
        assert_eq!(source.repo_name.as_deref(), Some("testrepo"));
        assert_eq!(source.branch_name.as_deref(), Some("main"));
        assert!(source.commit_sha.is_none());
    }

    #[test]
    fn test_notification_accessors() {
        let notification: BuildNotification = serde_json::from_value(json!({
            "attributes": {"buildId": "abc-123", "status": "WORKING"},
            "messageId": "42"
        }))
        .expect("deserialize");

        assert_eq!(notification.build_id(), Some("abc-123"));
        assert_eq!(notification.status(), Some("WORKING"));
        assert!(notification.data.is_none());
    }
}
