//! Render a message template against sample build variables.
//!
//! # Usage
//!
//! ```bash
//! slackbuild-cli render working.json --dir crates/bridge/templates
//! ```

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use slackbuild::slack::{DirectoryTemplates, MessageRenderer};
use slackbuild_core::{Color, MessageVariables};

use super::CliError;

/// Variables for a finished build of a made-up repository.
#[must_use]
pub fn sample_variables() -> MessageVariables {
    MessageVariables {
        build_color: Color::SUCCESS.to_string(),
        build_id: "12345678-9012-3456-7890-123456789012".to_string(),
        build_id_short: "12345678".to_string(),
        build_log_url: "https://console.cloud.google.com/cloud-build/builds/12345678".to_string(),
        build_status: "Finished successfully".to_string(),
        build_duration: "3 seconds".to_string(),
        project_id: "my-project".to_string(),
        repo_name: "testrepo".to_string(),
        revision: "ab12cd34ef560a123".to_string(),
        revision_sha_short: "ab12cd34".to_string(),
        revision_url: "https://github.com/you/testrepo/commits/ab12cd34ef560a123".to_string(),
    }
}

/// Render `template` from `dir` and print the message as pretty JSON.
///
/// # Errors
///
/// Returns `CliError::Template` if the template is missing or does not
/// render to a valid message.
pub fn run(
    template: &str,
    dir: &Path,
    channel: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let renderer = MessageRenderer::new(Arc::new(DirectoryTemplates::new(dir)), channel);
    let message = renderer.render(&sample_variables(), template)?;

    serde_json::to_writer_pretty(&mut *out, &message)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_builtin_default() {
        let mut out = Vec::new();
        run("", Path::new("/nonexistent"), "#builds", &mut out).expect("render");

        let json: serde_json::Value = serde_json::from_slice(&out).expect("json");
        assert_eq!(json["channel"], "#builds");
        assert_eq!(json["attachments"][0]["title"], "Build in my-project");
        assert_eq!(json["attachments"][0]["color"], Color::SUCCESS);
    }

    #[test]
    fn test_render_missing_template() {
        let mut out = Vec::new();
        let result = run("missing.json", Path::new("/nonexistent"), "#builds", &mut out);
        assert!(matches!(result, Err(CliError::Template(_))));
    }
}
