//! slackbuild Core - Shared types library.
//!
//! This crate provides the types shared by every slackbuild component:
//! - `slackbuild` - HTTP bridge between Cloud Build notifications and Slack
//! - `slackbuild-cli` - Developer tools for rendering and signing
//!
//! # Architecture
//!
//! The core crate contains only types and pure lookups - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Build status taxonomy, notification envelopes, message
//!   variables, and the command model

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
