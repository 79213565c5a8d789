//! Compute a Slack request signature for hand-crafted test requests.
//!
//! # Usage
//!
//! ```bash
//! export SLACK_SIGNING_SECRET=...
//! body='command=%2Fbuilds&text=help'
//! ts=$(date +%s)
//! sig=$(slackbuild-cli sign --timestamp "$ts" --body "$body")
//! curl -X POST localhost:8080/slack/commands \
//!   -H "X-Slack-Request-Timestamp: $ts" -H "X-Slack-Signature: $sig" -d "$body"
//! ```
//!
//! # Environment Variables
//!
//! - `SLACK_SIGNING_SECRET` - Slack app signing secret

use std::io::Write;

use secrecy::SecretString;
use slackbuild::slack::{DEFAULT_MAX_CONTENT_LENGTH, SignatureVerifier};

use super::CliError;

/// Print the `v0=...` signature for `body` sent at `timestamp`.
///
/// # Errors
///
/// Returns `CliError::Output` if writing fails.
pub fn run(
    secret: SecretString,
    timestamp: &str,
    body: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let verifier = SignatureVerifier::new(secret, DEFAULT_MAX_CONTENT_LENGTH);
    writeln!(out, "{}", verifier.sign(timestamp, body))?;
    Ok(())
}

/// Read the signing secret from the environment (after loading `.env`).
///
/// # Errors
///
/// Returns `CliError::MissingEnvVar` if `SLACK_SIGNING_SECRET` is not set.
pub fn secret_from_env() -> Result<SecretString, CliError> {
    dotenvy::dotenv().ok();

    std::env::var("SLACK_SIGNING_SECRET")
        .ok()
        .filter(|secret| !secret.is_empty())
        .map(SecretString::from)
        .ok_or(CliError::MissingEnvVar("SLACK_SIGNING_SECRET"))
}
