//! Slack webhook handler for `/builds` commands.
//!
//! Slash commands are answered with an in-channel reply. Button clicks on
//! build notifications are answered with the clicked message, edited to show
//! who did what.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, header::CONTENT_LENGTH},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::dispatch;
use crate::error::AppError;
use crate::slack::{
    ChatMessage, MessageRenderer, SignatureHeaders, VerifyError, decode_request_body,
    is_interactive, parse,
};
use crate::state::AppState;

const TIMESTAMP_HEADER: &str = "X-Slack-Request-Timestamp";
const SIGNATURE_HEADER: &str = "X-Slack-Signature";

/// Create Slack webhook routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/slack/commands", post(handle_command))
}

/// Reply to a slash command.
#[derive(Debug, Serialize)]
struct SlashReply {
    response_type: &'static str,
    text: String,
}

/// Handle a slash command or interactive message callback.
#[instrument(skip(state, headers, body))]
async fn handle_command(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let body = body.map_err(body_rejection)?;
    let signature_headers = SignatureHeaders {
        timestamp: header(&headers, TIMESTAMP_HEADER),
        signature: header(&headers, SIGNATURE_HEADER),
    };
    let declared_length = declared_content_length(&headers, body.len());

    state
        .verifier()
        .verify(&body, &signature_headers, declared_length)?;

    let raw = std::str::from_utf8(&body)
        .map_err(|e| AppError::BadRequest(format!("Body is not UTF-8: {e}")))?;
    let payload = decode_request_body(raw).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let args = parse(&payload);
    debug!(args = ?args.as_slice(), "Parsed command");

    let result = dispatch::run(&args, state.build_control(), state.dispatch()).await;

    if !is_interactive(&payload) {
        return Ok(Json(SlashReply {
            response_type: "in_channel",
            text: result.message,
        })
        .into_response());
    }

    let original: ChatMessage = payload
        .get("original_message")
        .cloned()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| AppError::BadRequest(format!("Invalid original_message: {e}")))?
        .unwrap_or_default();
    let actor = payload
        .pointer("/user/id")
        .and_then(Value::as_str)
        .unwrap_or_default();

    info!(user = %actor, success = result.success, "Handled interactive message");

    let edited =
        MessageRenderer::edit_for_interaction(original, result.success, &result.message, actor);
    Ok(Json(edited).into_response())
}

/// Bodies cut off by the router's length limit fail verification like any
/// other oversized request.
fn body_rejection(rejection: BytesRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Forbidden(VerifyError::BodyTooLarge)
    } else {
        AppError::BadRequest(rejection.body_text())
    }
}

fn header(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// `Content-Length` as sent, or the received length if the header is absent.
fn declared_content_length(headers: &HeaderMap, received: usize) -> i64 {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or_else(|| i64::try_from(received).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_declared_content_length() {
        let mut headers = HeaderMap::new();
        assert_eq!(declared_content_length(&headers, 42), 42);

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("100"));
        assert_eq!(declared_content_length(&headers, 42), 100);

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("bogus"));
        assert_eq!(declared_content_length(&headers, 7), 7);
    }

    #[test]
    fn test_missing_headers_are_empty() {
        let headers = HeaderMap::new();
        assert_eq!(header(&headers, TIMESTAMP_HEADER), "");
    }

    #[test]
    fn test_slash_reply_shape() {
        let reply = SlashReply {
            response_type: "in_channel",
            text: "Build cancelled".to_string(),
        };
        assert_eq!(
            serde_json::to_value(reply).expect("serialize"),
            serde_json::json!({"response_type": "in_channel", "text": "Build cancelled"})
        );
    }
}
