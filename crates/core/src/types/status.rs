//! Cloud Build status taxonomy.
//!
//! Maps each `Build.Status` code to the label and attachment color used in
//! Slack notifications.
//!
//! See: <https://cloud.google.com/build/docs/api/reference/rest/v1/projects.builds#Build.Status>

use serde::{Deserialize, Serialize};

/// Hex colors for Slack message attachments.
///
/// See: <https://api.slack.com/reference/messaging/attachments>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color;

impl Color {
    /// Grey.
    pub const UNKNOWN: &'static str = "#d3d3d3";
    /// Blue.
    pub const INFO: &'static str = "#1a73e8";
    /// Orange.
    pub const WARN: &'static str = "#f09300";
    /// Green.
    pub const SUCCESS: &'static str = "#00c752";
    /// Red.
    pub const FAILURE: &'static str = "#da4236";
}

/// Label used when the status code is not part of the taxonomy.
pub const INVALID_STATUS_LABEL: &str = "Invalid status";

/// Cloud Build status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildStatus {
    StatusUnknown,
    Queued,
    Working,
    Success,
    Failure,
    InternalError,
    Timeout,
    Cancelled,
}

/// Human label and attachment color for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEntry {
    pub label: &'static str,
    pub color: &'static str,
}

impl StatusEntry {
    /// Sentinel entry for unrecognized status codes.
    pub const INVALID: Self = Self {
        label: INVALID_STATUS_LABEL,
        color: Color::FAILURE,
    };

    /// Look up the entry for a raw status code.
    ///
    /// Unrecognized codes (including the empty string) resolve to
    /// [`StatusEntry::INVALID`].
    #[must_use]
    pub fn lookup(code: &str) -> Self {
        BuildStatus::from_code(code).map_or(Self::INVALID, BuildStatus::entry)
    }
}

impl BuildStatus {
    /// All statuses in API order.
    pub const ALL: [Self; 8] = [
        Self::StatusUnknown,
        Self::Queued,
        Self::Working,
        Self::Success,
        Self::Failure,
        Self::InternalError,
        Self::Timeout,
        Self::Cancelled,
    ];

    /// Parse the wire code (e.g. `SUCCESS`).
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "STATUS_UNKNOWN" => Some(Self::StatusUnknown),
            "QUEUED" => Some(Self::Queued),
            "WORKING" => Some(Self::Working),
            "SUCCESS" => Some(Self::Success),
            "FAILURE" => Some(Self::Failure),
            "INTERNAL_ERROR" => Some(Self::InternalError),
            "TIMEOUT" => Some(Self::Timeout),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// The wire code for this status.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::StatusUnknown => "STATUS_UNKNOWN",
            Self::Queued => "QUEUED",
            Self::Working => "WORKING",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::InternalError => "INTERNAL_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Label and color shown for this status.
    #[must_use]
    pub const fn entry(self) -> StatusEntry {
        let (label, color) = match self {
            Self::StatusUnknown => ("Status of the build is unknown", Color::UNKNOWN),
            Self::Queued => ("Queued", Color::UNKNOWN),
            Self::Working => ("In progress", Color::INFO),
            Self::Success => ("Finished successfully", Color::SUCCESS),
            Self::Failure => ("Failed", Color::FAILURE),
            Self::InternalError => ("Failed due to an internal error", Color::FAILURE),
            Self::Timeout => ("Timed out", Color::UNKNOWN),
            Self::Cancelled => ("Cancelled", Color::UNKNOWN),
        };
        StatusEntry { label, color }
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for status in BuildStatus::ALL {
            assert_eq!(BuildStatus::from_code(status.code()), Some(status));
        }
    }

    #[test]
    fn test_lookup_success() {
        let entry = StatusEntry::lookup("SUCCESS");
        assert_eq!(entry.label, "Finished successfully");
        assert_eq!(entry.color, Color::SUCCESS);
    }

    #[test]
    fn test_lookup_unknown_code_is_invalid() {
        assert_eq!(StatusEntry::lookup("EXPLODED"), StatusEntry::INVALID);
        assert_eq!(StatusEntry::lookup(""), StatusEntry::INVALID);
        // Codes are case-sensitive on the wire
        assert_eq!(StatusEntry::lookup("success"), StatusEntry::INVALID);
    }

    #[test]
    fn test_failure_statuses_are_red() {
        assert_eq!(BuildStatus::Failure.entry().color, Color::FAILURE);
        assert_eq!(BuildStatus::InternalError.entry().color, Color::FAILURE);
        assert_eq!(StatusEntry::INVALID.color, Color::FAILURE);
    }

    #[test]
    fn test_serde_uses_wire_codes() {
        let json = serde_json::to_string(&BuildStatus::InternalError).expect("serialize");
        assert_eq!(json, "\"INTERNAL_ERROR\"");
        let parsed: BuildStatus = serde_json::from_str("\"CANCELLED\"").expect("deserialize");
        assert_eq!(parsed, BuildStatus::Cancelled);
    }
}
