//! Integration tests for the shipped message templates.
//!
//! Renders the templates from the bridge's `templates/` directory and follows
//! a posted notification through to the button click that acts on it.

#![allow(clippy::expect_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use slackbuild::slack::{DirectoryTemplates, MessageRenderer};
use slackbuild_core::{BuildStatus, MessageVariables};
use slackbuild_integration_tests::{
    BUILD_ID, ControlCall, PROJECT_ID, TestApp, body_json, body_text, build_resource,
    button_click_body, push_request, signed_slack_request,
};

fn shipped_renderer() -> MessageRenderer {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../bridge/templates");
    MessageRenderer::new(Arc::new(DirectoryTemplates::new(dir)), "#builds")
}

fn variables(status: BuildStatus) -> MessageVariables {
    let entry = status.entry();
    MessageVariables {
        build_id: BUILD_ID.to_string(),
        build_id_short: "e36544dc".to_string(),
        build_status: entry.label.to_string(),
        build_color: entry.color.to_string(),
        project_id: PROJECT_ID.to_string(),
        repo_name: "web \"frontend\"".to_string(),
        ..MessageVariables::default()
    }
}

// =============================================================================
// Shipped templates
// =============================================================================

#[test]
fn test_every_template_renders_for_every_status() {
    let renderer = shipped_renderer();

    for template in ["", "default.json", "working.json", "failure.json"] {
        for status in BuildStatus::ALL {
            let message = renderer
                .render(&variables(status), template)
                .unwrap_or_else(|e| panic!("{template} with {status}: {e}"));

            assert_eq!(message.channel.as_deref(), Some("#builds"));
            let attachment = &message.attachments[0];
            assert_eq!(attachment.color.as_deref(), Some(status.entry().color));
            let text = attachment.text.as_deref().expect("text");
            assert!(text.contains("*web \"frontend\"*"), "{template}: {text}");
        }
    }
}

#[test]
fn test_button_templates_carry_commands() {
    let renderer = shipped_renderer();

    for (template, command) in [("working.json", "cancel"), ("failure.json", "retry")] {
        let message = renderer
            .render(&variables(BuildStatus::Working), template)
            .expect("render");
        let attachment = &message.attachments[0];
        let actions = attachment.actions.as_deref().expect("actions");

        assert_eq!(actions.len(), 1, "{template}");
        assert_eq!(actions[0].action_type, "button");
        assert_eq!(
            actions[0].value.as_deref(),
            Some(format!("{command} {BUILD_ID}").as_str())
        );
        assert_eq!(
            attachment.callback_id.as_deref(),
            Some(format!("build_{BUILD_ID}").as_str())
        );
    }
}

#[test]
fn test_missing_shipped_template() {
    let renderer = shipped_renderer();

    assert!(
        renderer
            .render(&variables(BuildStatus::Success), "nope.json")
            .is_err()
    );
}

// =============================================================================
// Notification to click
// =============================================================================

#[tokio::test]
async fn test_posted_failure_can_be_retried() {
    let app = TestApp::new();
    app.send(push_request(&build_resource("FAILURE"))).await;
    let posted = app.poster.messages().pop().expect("posted message");

    let original = serde_json::to_value(&posted).expect("serialize");
    let value = posted.attachments[0].actions.as_deref().expect("actions")[0]
        .value
        .clone()
        .expect("button value");
    let body = button_click_body(&value, "U2147483697", &original);

    let response = app.send(signed_slack_request(&body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        app.control.calls(),
        vec![ControlCall::Retry {
            project: PROJECT_ID.to_string(),
            build_id: BUILD_ID.to_string(),
        }]
    );

    let edited = body_json(response).await;
    let attachment = &edited["attachments"][0];
    assert_eq!(attachment["title"], "Build in my-project");
    assert_eq!(attachment["actions"], serde_json::json!([]));
    assert_eq!(
        attachment["fields"][0]["value"],
        "<@U2147483697> Submitted retry request"
    );
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("valid request");

    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}
