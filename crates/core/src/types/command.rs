//! `/builds` command model.
//!
//! Slash-command text and interactive button values share one grammar:
//! whitespace-separated tokens, verb first, no quoting.

use serde::{Deserialize, Serialize};

/// Reply for empty input and unknown verbs.
pub const BAD_INPUT: &str = "Unrecognized command\nSee '/builds help' for available commands";

/// Ordered, non-empty tokens of a command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandArgs(Vec<String>);

impl CommandArgs {
    /// Split free text on whitespace, discarding empty tokens.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self(text.split_whitespace().map(String::from).collect())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Token at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }
}

/// Outcome of a single command, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub message: String,
    pub success: bool,
}

impl CommandResult {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }
}

/// A parsed `/builds` command.
///
/// Arguments stay optional here; argument validation belongs to the
/// dispatcher so it can produce per-command usage messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `cancel <buildId>`
    Cancel { build_id: Option<String> },
    /// `retry <buildId>`
    Retry { build_id: Option<String> },
    /// `trigger <alias> <branch>`
    Trigger {
        alias: Option<String>,
        branch: Option<String>,
    },
    /// `help`
    Help,
    /// Empty input or an unrecognized verb.
    Unknown,
}

impl Command {
    /// Interpret the argument vector. The verb is case-insensitive.
    #[must_use]
    pub fn from_args(args: &CommandArgs) -> Self {
        let Some(verb) = args.get(0) else {
            return Self::Unknown;
        };
        let arg = |index: usize| args.get(index).map(String::from);

        match verb.to_lowercase().as_str() {
            "cancel" => Self::Cancel { build_id: arg(1) },
            "retry" => Self::Retry { build_id: arg(1) },
            "trigger" => Self::Trigger {
                alias: arg(1),
                branch: arg(2),
            },
            "help" => Self::Help,
            _ => Self::Unknown,
        }
    }
}
