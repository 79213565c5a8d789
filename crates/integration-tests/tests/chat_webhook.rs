//! Integration tests for the Slack webhook.
//!
//! Covers signature enforcement, slash command replies and the message edit
//! returned for button clicks.

#![allow(clippy::expect_used, clippy::indexing_slicing)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use slackbuild_core::BAD_INPUT;
use slackbuild_integration_tests::{
    BUILD_ID, ControlCall, MockBuildControl, PROJECT_ID, RecordingPoster, TestApp, body_json,
    button_click_body, signed_slack_request, slack_request, slash_command_body, test_config,
};

/// A posted `working.json` notification, as Slack hands it back on a click.
fn posted_working_message() -> serde_json::Value {
    json!({
        "type": "message",
        "subtype": "bot_message",
        "ts": "1531420620.000116",
        "bot_id": "B0001",
        "attachments": [{
            "title": "Build in my-project",
            "text": "*web*  <https://example.com|4f6fbcd4>\nIn progress | <https://example.com/logs|Logs>",
            "color": "#1a73e8",
            "footer": "ID: e36544dc",
            "callback_id": format!("build_{BUILD_ID}"),
            "actions": [{
                "id": "1",
                "name": "cancel",
                "text": "Cancel",
                "type": "button",
                "style": "danger",
                "value": format!("cancel {BUILD_ID}")
            }]
        }]
    })
}

// =============================================================================
// Signature enforcement
// =============================================================================

#[tokio::test]
async fn test_rejects_bad_signature() {
    let app = TestApp::new();
    let body = slash_command_body(&format!("cancel {BUILD_ID}"));

    let response = app.send(slack_request(&body, "v0=deadbeef")).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.control.calls().is_empty());
}

#[tokio::test]
async fn test_rejects_missing_signature_headers() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/slack/commands")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(slash_command_body("help")))
        .expect("valid request");

    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_rejects_tampered_body() {
    let app = TestApp::new();
    let signed = signed_slack_request(&slash_command_body("help"));
    let signature = signed
        .headers()
        .get("X-Slack-Signature")
        .and_then(|v| v.to_str().ok())
        .expect("signature header")
        .to_string();

    let tampered = slash_command_body(&format!("cancel {BUILD_ID}"));
    let response = app.send(slack_request(&tampered, &signature)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.control.calls().is_empty());
}

#[tokio::test]
async fn test_rejects_empty_body() {
    let app = TestApp::new();

    let response = app.send(signed_slack_request("")).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_rejects_body_over_limit() {
    let app = TestApp::with(
        test_config(&[("SLACK_MAX_CONTENT_LENGTH", "64")]),
        RecordingPoster::accepting(),
        MockBuildControl::succeeding(),
    );
    let body = slash_command_body(&format!("cancel {BUILD_ID} {}", "x".repeat(100)));
    assert!(body.len() > 64);

    let response = app.send(signed_slack_request(&body)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.control.calls().is_empty());
}

#[tokio::test]
async fn test_rejects_body_over_router_limit() {
    let app = TestApp::with(
        test_config(&[("SLACK_MAX_CONTENT_LENGTH", "64")]),
        RecordingPoster::accepting(),
        MockBuildControl::succeeding(),
    );
    let body = slash_command_body(&"x".repeat(10_000));

    let response = app.send(signed_slack_request(&body)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.control.calls().is_empty());
}

#[tokio::test]
async fn test_build_id_path_is_rejected() {
    let app = TestApp::new();
    let body = slash_command_body(&format!("cancel ../../other-project/builds/{BUILD_ID}"));

    let response = app.send(signed_slack_request(&body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["text"], "Invalid build ID");
    assert!(app.control.calls().is_empty());
}

#[tokio::test]
async fn test_only_post_is_routed() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("GET")
        .uri("/slack/commands")
        .body(Body::empty())
        .expect("valid request");

    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// Slash commands
// =============================================================================

#[tokio::test]
async fn test_help_reply() {
    let app = TestApp::new();

    let response = app.send(signed_slack_request(&slash_command_body("help"))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let reply = body_json(response).await;
    assert_eq!(reply["response_type"], "in_channel");
    let text = reply["text"].as_str().expect("text");
    assert!(text.starts_with("```"));
    for command in ["retry <buildId>", "cancel <buildId>", "trigger <alias> <branch>"] {
        assert!(text.contains(command), "help lists {command}");
    }
}

#[tokio::test]
async fn test_unknown_command_reply() {
    let app = TestApp::new();

    let response = app
        .send(signed_slack_request(&slash_command_body("deploy everything")))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["text"], BAD_INPUT);
    assert!(app.control.calls().is_empty());
}

#[tokio::test]
async fn test_cancel_command() {
    let app = TestApp::new();

    let response = app
        .send(signed_slack_request(&slash_command_body(&format!("cancel {BUILD_ID}"))))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["text"], "Build cancelled");
    assert_eq!(
        app.control.calls(),
        vec![ControlCall::Cancel {
            project: PROJECT_ID.to_string(),
            build_id: BUILD_ID.to_string(),
        }]
    );
}

#[tokio::test]
async fn test_short_build_id_is_not_sent() {
    let app = TestApp::new();

    let response = app
        .send(signed_slack_request(&slash_command_body("retry e36544dc")))
        .await;

    assert_eq!(body_json(response).await["text"], "Invalid build ID");
    assert!(app.control.calls().is_empty());
}

#[tokio::test]
async fn test_trigger_command_resolves_alias() {
    let app = TestApp::new();

    let response = app
        .send(signed_slack_request(&slash_command_body("trigger web main")))
        .await;

    assert_eq!(body_json(response).await["text"], "Triggered web on branch main");
    assert_eq!(
        app.control.calls(),
        vec![ControlCall::Trigger {
            project: PROJECT_ID.to_string(),
            trigger_id: "trigger-123".to_string(),
            branch: "main".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_remote_error_is_reported_verbatim() {
    let app = TestApp::with(
        test_config(&[]),
        RecordingPoster::accepting(),
        MockBuildControl::failing_with(400, "Build is not in a cancellable state"),
    );

    let response = app
        .send(signed_slack_request(&slash_command_body(&format!("cancel {BUILD_ID}"))))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["text"],
        "Build is not in a cancellable state"
    );
}

// =============================================================================
// Button clicks
// =============================================================================

#[tokio::test]
async fn test_cancel_button_edits_message() {
    let app = TestApp::new();
    let body = button_click_body(
        &format!("cancel {BUILD_ID}"),
        "U2147483697",
        &posted_working_message(),
    );

    let response = app.send(signed_slack_request(&body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let edited = body_json(response).await;
    assert_eq!(edited["replace_original"], true);
    assert_eq!(edited["ts"], "1531420620.000116");

    let attachment = &edited["attachments"][0];
    assert_eq!(attachment["actions"], json!([]));
    assert_eq!(attachment["color"], "#1a73e8");
    assert_eq!(
        attachment["fields"],
        json!([{"value": "<@U2147483697> Build cancelled", "short": false}])
    );
    assert_eq!(
        app.control.calls(),
        vec![ControlCall::Cancel {
            project: PROJECT_ID.to_string(),
            build_id: BUILD_ID.to_string(),
        }]
    );
}

#[tokio::test]
async fn test_failed_click_shows_warning() {
    let app = TestApp::with(
        test_config(&[]),
        RecordingPoster::accepting(),
        MockBuildControl::failing_with(404, "Requested entity was not found."),
    );
    let body = button_click_body(
        &format!("cancel {BUILD_ID}"),
        "U2147483697",
        &posted_working_message(),
    );

    let response = app.send(signed_slack_request(&body)).await;

    let edited = body_json(response).await;
    assert_eq!(
        edited["attachments"][0]["fields"][0]["value"],
        format!(":warning: No build found in {PROJECT_ID} with ID {BUILD_ID}")
    );
    assert_eq!(edited["attachments"][0]["actions"], json!([]));
}

#[tokio::test]
async fn test_click_without_attachments_gets_one() {
    let app = TestApp::new();
    let body = button_click_body("help", "U1", &json!({"type": "message", "text": "hi"}));

    let response = app.send(signed_slack_request(&body)).await;

    let edited = body_json(response).await;
    assert_eq!(edited["text"], "hi");
    assert_eq!(edited["attachments"].as_array().map(Vec::len), Some(1));
    let value = edited["attachments"][0]["fields"][0]["value"]
        .as_str()
        .expect("field value");
    assert!(value.starts_with("<@U1> ```"));
}

#[tokio::test]
async fn test_malformed_payload_is_bad_request() {
    let app = TestApp::new();

    let response = app.send(signed_slack_request("payload=%7Bnot-json")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.control.calls().is_empty());
}
