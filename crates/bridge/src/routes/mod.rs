//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health          - Liveness check
//! POST /slack/commands  - Slack slash commands and interactive callbacks
//! POST /pubsub          - Cloud Build notifications via Pub/Sub push
//! ```

pub mod pubsub;
pub mod slack;

use axum::{Router, extract::DefaultBodyLimit, routing::get};

use crate::state::AppState;

/// Extra bytes allowed past the Slack body limit, so oversized requests reach
/// signature verification and are rejected there.
const BODY_LIMIT_HEADROOM: usize = 4096;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let body_limit = state
        .verifier()
        .max_content_length()
        .saturating_add(BODY_LIMIT_HEADROOM);

    Router::new()
        .route("/health", get(health))
        .merge(slack::router())
        .merge(pubsub::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
