//! Cloud Build notification to message variables.
//!
//! Translation never fails: anything missing or undecodable in the
//! notification falls back to an empty or placeholder value.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::DateTime;
use slackbuild_core::{Build, BuildNotification, MessageVariables, RepoSource, StatusEntry};
use tracing::{debug, warn};

/// Build ID used when the notification carries none.
const UNKNOWN_BUILD_ID: &str = "UNKNOWN";

/// Project ID used when the build resource carries none.
const UNKNOWN_PROJECT_ID: &str = "unknown project id";

/// Length of the short commit SHA.
const SHORT_SHA_LEN: usize = 8;

/// Template selection and revision link settings.
#[derive(Debug, Clone, Default)]
pub struct TranslatorConfig {
    /// Template file per lowercase status, plus an optional `default`.
    pub templates: HashMap<String, String>,
    /// Base URL of an external git host, e.g. `https://github.com/my-org`.
    pub github_url: Option<String>,
}

impl TranslatorConfig {
    fn template_for(&self, status: &str) -> String {
        self.templates
            .get(&status.to_lowercase())
            .or_else(|| self.templates.get("default"))
            .cloned()
            .unwrap_or_default()
    }
}

/// Translate a notification into message variables and a template name.
///
/// An empty template name means the built-in default.
#[must_use]
pub fn translate(
    notification: &BuildNotification,
    config: &TranslatorConfig,
) -> (MessageVariables, String) {
    let build_id = notification.build_id().unwrap_or(UNKNOWN_BUILD_ID);
    let status = notification.status().unwrap_or_default();
    let entry = StatusEntry::lookup(status);
    let build = decode_build(notification.data.as_deref());

    let mut variables = MessageVariables {
        build_id: build_id.to_string(),
        build_id_short: build_id.split('-').next().unwrap_or_default().to_string(),
        build_status: entry.label.to_string(),
        build_color: entry.color.to_string(),
        project_id: build
            .project_id
            .clone()
            .unwrap_or_else(|| UNKNOWN_PROJECT_ID.to_string()),
        build_log_url: build.log_url.clone().unwrap_or_default(),
        build_duration: duration(&build),
        ..MessageVariables::default()
    };
    add_git_info(&build, config.github_url.as_deref(), &mut variables);

    let template = config.template_for(status);
    debug!(build_id = %variables.build_id, status, template = %template, "Translated build notification");

    (variables, template)
}

fn decode_build(data: Option<&str>) -> Build {
    let Some(data) = data else {
        return Build::default();
    };

    let bytes = match STANDARD.decode(data.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Build notification data is not valid base64");
            return Build::default();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(build) => build,
        Err(e) => {
            warn!(error = %e, "Build notification data is not a build resource");
            Build::default()
        }
    }
}

/// Whole seconds between start and finish, or empty if either is missing,
/// unparseable, or out of order.
fn duration(build: &Build) -> String {
    let (Some(start), Some(finish)) = (build.start_time.as_deref(), build.finish_time.as_deref())
    else {
        return String::new();
    };

    let (Ok(start), Ok(finish)) = (
        DateTime::parse_from_rfc3339(start),
        DateTime::parse_from_rfc3339(finish),
    ) else {
        debug!(start, finish, "Unparseable build timestamps");
        return String::new();
    };

    let seconds = (finish - start).num_seconds();
    if seconds < 0 {
        warn!(seconds, "Build finished before it started");
        return String::new();
    }

    format!("{seconds} seconds")
}

fn add_git_info(build: &Build, github_url: Option<&str>, variables: &mut MessageVariables) {
    // resolvedRepoSource, then source.repoSource, then substitutions
    let fallback;
    let source = match build.resolved_repo_source().or_else(|| build.repo_source()) {
        Some(source) => source,
        None => {
            fallback = RepoSource::from_substitutions(&build.substitutions);
            &fallback
        }
    };

    let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

    variables.repo_name = non_empty(&source.repo_name).unwrap_or_default();
    if let Some(sha) = non_empty(&source.commit_sha) {
        variables.revision_sha_short = sha.chars().take(SHORT_SHA_LEN).collect();
        variables.revision = sha;
    } else {
        variables.revision = non_empty(&source.branch_name).unwrap_or_default();
        variables.revision_sha_short.clone_from(&variables.revision);
    }

    if variables.repo_name.is_empty() || variables.revision.is_empty() {
        return;
    }

    variables.revision_url = match github_url.filter(|url| !url.is_empty()) {
        Some(base) => format!(
            "{}/{}/commits/{}",
            base.trim_end_matches('/'),
            variables.repo_name,
            variables.revision
        ),
        None => format!(
            "https://source.cloud.google.com/{}/{}/+/{}",
            build.project_id.as_deref().unwrap_or_default(),
            variables.repo_name,
            variables.revision
        ),
    };
}
