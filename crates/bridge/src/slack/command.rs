//! Inbound request decoding and command-line extraction.
//!
//! Slack delivers two shapes to the same endpoint:
//! - slash commands, as URL-encoded form fields with the typed text in `text`
//! - interactive message callbacks, as a single `payload` form field holding
//!   JSON whose first action's `value` carries the command line

use serde_json::{Map, Value};
use slackbuild_core::CommandArgs;

use super::error::SlackError;

/// `type` of a legacy interactive message callback.
const INTERACTIVE_MESSAGE: &str = "interactive_message";

/// True if the payload is an interactive message callback.
#[must_use]
pub fn is_interactive(payload: &Value) -> bool {
    payload.get("type").and_then(Value::as_str) == Some(INTERACTIVE_MESSAGE)
}

/// Extract the command line from either payload shape.
#[must_use]
pub fn parse(payload: &Value) -> CommandArgs {
    let text = if is_interactive(payload) {
        payload
            .get("actions")
            .and_then(Value::as_array)
            .and_then(|actions| actions.first())
            .and_then(|action| action.get("value"))
            .and_then(Value::as_str)
            .unwrap_or_default()
    } else {
        payload
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
    };

    CommandArgs::from_text(text)
}

/// Decode a raw request body into a JSON object.
///
/// Form bodies with a `payload` field yield that field's parsed JSON; other
/// form bodies yield an object of their string fields. A body that is itself
/// a JSON object is returned unchanged.
///
/// # Errors
///
/// Returns `SlackError::InvalidPayload` if the JSON is malformed.
pub fn decode_request_body(raw: &str) -> Result<Value, SlackError> {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('{') {
        return serde_json::from_str(trimmed).map_err(|e| SlackError::InvalidPayload(e.to_string()));
    }

    let mut fields = Map::new();
    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        if key == "payload" {
            return serde_json::from_str(&value)
                .map_err(|e| SlackError::InvalidPayload(e.to_string()));
        }
        fields.insert(key.into_owned(), Value::String(value.into_owned()));
    }

    Ok(Value::Object(fields))
}
