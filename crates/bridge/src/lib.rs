//! slackbuild - Cloud Build notifications in Slack, and `/builds` commands
//! back to Cloud Build.
//!
//! This crate provides the bridge as a library, allowing it to be tested and
//! reused by the CLI.
//!
//! # Entry Points
//!
//! - `POST /pubsub` - a Cloud Build notification is translated into message
//!   variables ([`build_event`]), rendered from a template
//!   ([`slack::MessageRenderer`]) and posted to the configured channel
//! - `POST /slack/commands` - a verified slash command or button click is
//!   parsed into a command and run against the Cloud Build API ([`dispatch`])
//!
//! See [`routes`] for the full route table.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod build_event;
pub mod cloudbuild;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod routes;
pub mod slack;
pub mod state;
