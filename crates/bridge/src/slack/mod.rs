//! Slack integration for `/builds` commands and build notifications.
//!
//! This module provides:
//! - [`SignatureVerifier`] for authenticating inbound requests
//! - Command parsing for slash commands and interactive callbacks
//! - [`MessageRenderer`] for template-driven attachment messages
//! - [`SlackClient`] for posting messages
//!
//! # Flow
//!
//! 1. Slack posts a slash command or a button click to the webhook
//! 2. The request signature is verified against the signing secret
//! 3. The payload is reduced to an argument vector and dispatched
//! 4. The result is returned as a reply, or as an in-place edit of the
//!    message carrying the clicked button

mod client;
mod command;
mod error;
mod render;
mod signature;
mod templates;
mod types;

pub use client::{ChatPoster, SlackClient};
pub use command::{decode_request_body, is_interactive, parse};
pub use error::SlackError;
pub use render::{MessageRenderer, post, substitute};
pub use signature::{DEFAULT_MAX_CONTENT_LENGTH, SignatureHeaders, SignatureVerifier, VerifyError};
pub use templates::{
    DEFAULT_TEMPLATE, DirectoryTemplates, StaticTemplates, TemplateError, TemplateSource,
};
pub use types::{Action, Attachment, ChatMessage, Field, PostMessageResponse};
