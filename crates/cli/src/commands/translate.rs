//! Translate a saved Cloud Build notification into message variables.
//!
//! Accepts either a Pub/Sub push body (`{"message": {...}}`) or a bare
//! Pub/Sub message (`{"attributes": {...}, "data": "..."}`).
//!
//! # Usage
//!
//! ```bash
//! slackbuild-cli translate notification.json --config config.yaml
//! ```

use std::io::Write;
use std::path::Path;

use serde_json::{Value, json};
use slackbuild::build_event::{TranslatorConfig, translate};
use slackbuild::config::FileConfig;
use slackbuild_core::{BuildNotification, PushEnvelope};

use super::CliError;

/// Parse notification JSON in either accepted shape.
///
/// # Errors
///
/// Returns `CliError::Json` if the text is not a notification.
pub fn parse_notification(text: &str) -> Result<BuildNotification, CliError> {
    let value: Value = serde_json::from_str(text)?;
    if value.get("message").is_some() {
        let envelope: PushEnvelope = serde_json::from_value(value)?;
        return Ok(envelope.message);
    }
    Ok(serde_json::from_value(value)?)
}

/// Print the variables and selected template for the notification in `file`.
///
/// # Errors
///
/// Returns `CliError` if either file cannot be read or parsed.
pub fn run(file: &Path, config: Option<&Path>, out: &mut impl Write) -> Result<(), CliError> {
    let text = std::fs::read_to_string(file).map_err(|source| CliError::Read {
        path: file.to_path_buf(),
        source,
    })?;
    let notification = parse_notification(&text)?;

    let file_config = config.map(FileConfig::load).transpose()?.unwrap_or_default();
    let translator = TranslatorConfig {
        templates: file_config.slack.templates,
        github_url: file_config
            .github_url
            .map(|url| url.trim_end_matches('/').to_string()),
    };

    let (variables, template) = translate(&notification, &translator);
    let output = json!({
        "template": template,
        "variables": variables,
    });

    serde_json::to_writer_pretty(&mut *out, &output)?;
    writeln!(out)?;
    Ok(())
}
