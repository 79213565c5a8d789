//! Template variables describing a single build event.

use serde::{Deserialize, Serialize};

/// Flat variable set produced from a build notification.
///
/// Every variable is always present; absent values are the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageVariables {
    pub build_id: String,
    pub build_id_short: String,
    pub build_status: String,
    pub build_color: String,
    pub project_id: String,
    pub build_log_url: String,
    pub build_duration: String,
    pub repo_name: String,
    pub revision: String,
    pub revision_sha_short: String,
    pub revision_url: String,
}

impl MessageVariables {
    /// Names of every variable, in declaration order.
    pub const NAMES: [&'static str; 11] = [
        "build_id",
        "build_id_short",
        "build_status",
        "build_color",
        "project_id",
        "build_log_url",
        "build_duration",
        "repo_name",
        "revision",
        "revision_sha_short",
        "revision_url",
    ];

    /// Look up a variable by template name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "build_id" => &self.build_id,
            "build_id_short" => &self.build_id_short,
            "build_status" => &self.build_status,
            "build_color" => &self.build_color,
            "project_id" => &self.project_id,
            "build_log_url" => &self.build_log_url,
            "build_duration" => &self.build_duration,
            "repo_name" => &self.repo_name,
            "revision" => &self.revision,
            "revision_sha_short" => &self.revision_sha_short,
            "revision_url" => &self.revision_url,
            _ => return None,
        };
        Some(value.as_str())
    }
}
