//! Google Cloud Build control API.
//!
//! Only the three calls the `/builds` command needs: cancel a build, retry a
//! build, and run a build trigger against a branch.
//!
//! See: <https://cloud.google.com/build/docs/api/reference/rest>

pub mod auth;
pub mod client;

pub use auth::{AccessToken, TokenProvider};
pub use client::CloudBuildClient;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Errors calling the Cloud Build API.
#[derive(Debug, Clone, Error)]
pub enum BuildControlError {
    /// The API answered with a non-success status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),

    /// No access token could be obtained.
    #[error("Failed to obtain access token: {0}")]
    Auth(String),
}

impl BuildControlError {
    /// HTTP status of the failed call, if it got that far.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(_) | Self::Auth(_) => None,
        }
    }

    /// True for an HTTP 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }
}

impl From<reqwest::Error> for BuildControlError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Outcome of a successful control call.
///
/// Long-running operations may report `done` together with an embedded
/// `error`, in which case the call failed after all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Completion {
    pub done: bool,
    pub error: Option<RemoteStatus>,
}

impl Completion {
    /// The embedded failure message, if the operation finished with an error.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        if !self.done {
            return None;
        }
        self.error
            .as_ref()
            .map(|status| status.message.as_deref().unwrap_or("Unknown error"))
    }
}

/// `google.rpc.Status` as embedded in operations and error bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RemoteStatus {
    pub code: Option<i64>,
    pub message: Option<String>,
}

/// Build-control operations used by the command dispatcher.
#[async_trait]
pub trait BuildControl: Send + Sync {
    /// Cancel a running build.
    ///
    /// # Errors
    ///
    /// Returns `BuildControlError` if the call fails.
    async fn cancel_build(&self, project_id: &str, build_id: &str)
    -> Result<Completion, BuildControlError>;

    /// Re-run a build with its original source and configuration.
    ///
    /// # Errors
    ///
    /// Returns `BuildControlError` if the call fails.
    async fn retry_build(&self, project_id: &str, build_id: &str)
    -> Result<Completion, BuildControlError>;

    /// Run a build trigger against a branch.
    ///
    /// # Errors
    ///
    /// Returns `BuildControlError` if the call fails.
    async fn run_trigger(
        &self,
        project_id: &str,
        trigger_id: &str,
        branch: &str,
    ) -> Result<Completion, BuildControlError>;
}
