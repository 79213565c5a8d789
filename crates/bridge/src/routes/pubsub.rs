//! Pub/Sub push handler for Cloud Build notifications.
//!
//! Cloud Build publishes to the `cloud-builds` topic; a push subscription
//! delivers each message here as a `PushEnvelope`.

use axum::{Router, body::Bytes, extract::State, http::StatusCode, routing::post};
use slackbuild_core::PushEnvelope;
use tracing::{info, instrument, warn};

use crate::build_event::translate;
use crate::error::AppError;
use crate::slack;
use crate::state::AppState;

/// Create Pub/Sub push routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/pubsub", post(handle_push))
}

/// Translate a build notification and post it to Slack.
///
/// A Slack rejection is logged and still acknowledged, so Pub/Sub does not
/// redeliver the notification.
#[instrument(skip(state, body))]
async fn handle_push(State(state): State<AppState>, body: Bytes) -> Result<StatusCode, AppError> {
    let envelope: PushEnvelope = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid push envelope: {e}")))?;

    let (variables, template) = translate(&envelope.message, state.translator());
    let message = state.renderer().render(&variables, &template)?;

    if slack::post(state.poster(), &message).await {
        info!(
            build_id = %variables.build_id,
            status = %variables.build_status,
            "Posted build notification"
        );
    } else {
        warn!(
            build_id = %variables.build_id,
            subscription = ?envelope.subscription,
            "Slack did not accept build notification"
        );
    }

    Ok(StatusCode::NO_CONTENT)
}
