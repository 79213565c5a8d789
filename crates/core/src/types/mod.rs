//! Core types for slackbuild.
//!
//! This module provides the domain model shared between the build-event and
//! chat-command halves of the bridge.

pub mod build;
pub mod command;
pub mod status;
pub mod variables;

pub use build::{Build, BuildNotification, PushEnvelope, RepoSource, SourceProvenance};
pub use command::{BAD_INPUT, Command, CommandArgs, CommandResult};
pub use status::{BuildStatus, Color, StatusEntry};
pub use variables::MessageVariables;
