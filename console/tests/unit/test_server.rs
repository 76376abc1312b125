//! Panel server tests

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use openapi_client::models::JobRequest;
use serde_json::{json, Value};
use tower::ServiceExt;

use jobdeck::pipeline::runner::DeploymentRunner;
use jobdeck::pipeline::step::StepStatus;
use jobdeck::server::serve::router;
use jobdeck::server::state::ServerState;

use crate::support::{fetcher, ScriptedTransport};

fn state(transport: &Arc<ScriptedTransport>) -> Arc<ServerState> {
    let fetcher = fetcher(transport.clone());
    let runner = Arc::new(DeploymentRunner::with_default_pipeline(fetcher.clone()));
    Arc::new(ServerState::new(runner, fetcher, JobRequest::default()))
}

async fn send(state: &Arc<ServerState>, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let state = state(&ScriptedTransport::new());
    let (status, body) = send(&state, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_initial_panel_snapshot() {
    let state = state(&ScriptedTransport::new());
    let (status, body) = send(&state, "GET", "/panel", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["steps"].as_array().unwrap().len(), 5);
    assert_eq!(body["steps"][0]["status"], "pending");
    assert_eq!(body["controls"]["deploy"]["enabled"], false);
    assert_eq!(body["form"]["namespace"], "default");
}

#[tokio::test]
async fn test_deploy_requires_generated_job() {
    let state = state(&ScriptedTransport::new());
    let (status, body) = send(&state, "POST", "/panel/deploy", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_generate_then_deploy() {
    let transport = ScriptedTransport::new();
    transport.push_json(
        "/generate_job",
        200,
        json!({"success": true, "hcl": "job \"orders-api\" {}"}),
    );
    let state = state(&transport);

    let (status, _) = send(
        &state,
        "POST",
        "/panel/generate",
        Some(json!({"job_name": "orders-api", "vault_yaml": "vault_path: orders"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, panel) = send(&state, "GET", "/panel", None).await;
    assert_eq!(panel["output"], "job \"orders-api\" {}");
    assert_eq!(panel["controls"]["deploy"]["enabled"], true);
    assert_eq!(panel["controls"]["copy"]["enabled"], true);

    let (status, _) = send(&state, "POST", "/panel/deploy", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    // Wait for the background run to release the panel
    drop(state.panel.lock().await);

    let snapshot = state.snapshots.borrow().clone();
    assert!(snapshot.steps.iter().all(|s| s.status == StepStatus::Success));
    assert_eq!(snapshot.message.title, "Deployment Success");

    let git_call = transport
        .calls()
        .into_iter()
        .find(|(path, _)| path == "/deploy_git")
        .unwrap();
    assert_eq!(
        git_call.1,
        json!({"job_name": "orders-api", "hclOutput": "job \"orders-api\" {}"})
    );
}

#[tokio::test]
async fn test_generation_rejection_maps_to_unprocessable() {
    let transport = ScriptedTransport::new();
    transport.push_json(
        "/generate_job",
        200,
        json!({"success": false, "error": "invalid namespace"}),
    );
    let state = state(&transport);

    let (status, body) = send(&state, "POST", "/panel/generate", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "invalid namespace");

    let (_, panel) = send(&state, "GET", "/panel", None).await;
    assert_eq!(panel["output"], "Error: invalid namespace");
}

#[tokio::test]
async fn test_reset_and_hide_message() {
    let transport = ScriptedTransport::new();
    transport.push_json("/generate_job", 200, json!({"success": true, "hcl": "job {}"}));
    let state = state(&transport);
    send(&state, "POST", "/panel/generate", Some(json!({}))).await;

    let (status, _) = send(&state, "POST", "/panel/message/hide", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&state, "POST", "/panel/reset", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, panel) = send(&state, "GET", "/panel", None).await;
    assert_eq!(panel["message"]["visible"], false);
    assert_eq!(panel["controls"]["reset"]["visible"], false);
    assert_eq!(panel["controls"]["deploy"]["enabled"], true);
}
