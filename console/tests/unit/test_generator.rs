//! Job generator tests

use openapi_client::models::JobRequest;
use serde_json::json;

use jobdeck::errors::ConsoleError;
use jobdeck::filesys::file::File;
use jobdeck::panel::{Panel, GENERATE_LABEL, GENERATING_LABEL};
use jobdeck::pipeline::generator::generate_job;
use jobdeck::pipeline::runner::DeploymentRunner;

use crate::support::{fetcher, RecordingView, ScriptedTransport};

fn request() -> JobRequest {
    JobRequest {
        job_name: "orders-api".to_string(),
        exposed_port: "8080".to_string(),
        container_port: "3000".to_string(),
        ..Default::default()
    }
}

fn panel(transport: &std::sync::Arc<ScriptedTransport>, view: std::sync::Arc<RecordingView>) -> Panel {
    let runner = DeploymentRunner::with_default_pipeline(fetcher(transport.clone()));
    Panel::new(runner.registry(), JobRequest::default(), view)
}

#[tokio::test]
async fn test_generation_success_enables_downstream_controls() {
    let transport = ScriptedTransport::new();
    transport.push_json(
        "/generate_job",
        200,
        json!({"success": true, "hcl": "job \"orders-api\" {}"}),
    );
    let view = RecordingView::new();
    let mut panel = panel(&transport, view.clone());

    let hcl = generate_job(&mut panel, &fetcher(transport.clone()), &request())
        .await
        .unwrap();

    assert_eq!(hcl, "job \"orders-api\" {}");
    assert_eq!(panel.output(), "job \"orders-api\" {}");
    assert!(panel.controls().deploy.enabled);
    assert!(panel.controls().copy.enabled);
    assert!(panel.controls().generate.enabled);
    assert_eq!(panel.controls().generate.label, GENERATE_LABEL);
    assert_eq!(panel.message().title, "Generation Complete");
    assert_eq!(panel.form().job_name, "orders-api");

    // Request body is the form, field for field
    let calls = transport.calls();
    assert_eq!(calls[0].0, "/generate_job");
    assert_eq!(calls[0].1["job_name"], "orders-api");
    assert_eq!(calls[0].1["datacenter_name"], "glynac-dc");
    assert_eq!(calls[0].1["exposed_port"], "8080");

    // Trigger was disabled while the call was in flight
    assert!(view.snapshots().iter().any(|s| {
        !s.controls.generate.enabled
            && s.controls.generate.label == GENERATING_LABEL
            && !s.controls.deploy.enabled
            && !s.controls.copy.enabled
    }));
}

#[tokio::test]
async fn test_generation_rejected_by_backend() {
    let transport = ScriptedTransport::new();
    transport.push_json(
        "/generate_job",
        200,
        json!({"success": false, "error": "invalid namespace"}),
    );
    let mut panel = panel(&transport, RecordingView::new());

    let err = generate_job(&mut panel, &fetcher(transport.clone()), &request())
        .await
        .unwrap_err();

    assert!(matches!(err, ConsoleError::Application(_)));
    assert_eq!(panel.output(), "Error: invalid namespace");
    assert!(!panel.controls().deploy.enabled);
    assert!(!panel.controls().copy.enabled);
    assert!(panel.controls().generate.enabled);
    assert_eq!(panel.message().title, "Generation Failed");
    assert_eq!(panel.message().body, "An error occurred: invalid namespace");
}

#[tokio::test]
async fn test_generation_non_object_body_reports_unknown_error() {
    let transport = ScriptedTransport::new();
    transport.push_json("/generate_job", 200, json!(["job {}"]));
    let mut panel = panel(&transport, RecordingView::new());

    let err = generate_job(&mut panel, &fetcher(transport.clone()), &request())
        .await
        .unwrap_err();

    assert!(matches!(err, ConsoleError::Application(_)));
    assert_eq!(panel.output(), "Error: Unknown error");
    assert_eq!(panel.message().body, "An error occurred: Unknown error");
    assert!(panel.controls().generate.enabled);
    assert!(!panel.controls().deploy.enabled);
}

#[tokio::test(start_paused = true)]
async fn test_generation_network_failure_restores_trigger() {
    let transport = ScriptedTransport::new();
    for _ in 0..3 {
        transport.push(
            "/generate_job",
            Err(ConsoleError::Transport("connection refused".to_string())),
        );
    }
    let mut panel = panel(&transport, RecordingView::new());

    let result = generate_job(&mut panel, &fetcher(transport.clone()), &request()).await;

    assert!(result.is_err());
    assert_eq!(panel.output(), "Error: connection refused");
    assert_eq!(panel.message().title, "Job Generation Failed");
    assert!(panel.controls().generate.enabled);
    assert_eq!(panel.controls().generate.label, GENERATE_LABEL);
    assert_eq!(transport.calls().len(), 3);
}

#[tokio::test]
async fn test_failed_regeneration_disables_stale_output() {
    let transport = ScriptedTransport::new();
    transport.push_json("/generate_job", 200, json!({"success": true, "hcl": "job {}"}));
    transport.push_json("/generate_job", 200, json!({"success": false, "error": "bad port"}));
    let fetcher = fetcher(transport.clone());
    let mut panel = panel(&transport, RecordingView::new());

    generate_job(&mut panel, &fetcher, &request()).await.unwrap();
    assert!(panel.controls().deploy.enabled);

    let _ = generate_job(&mut panel, &fetcher, &request()).await;
    assert!(!panel.controls().deploy.enabled);
    assert!(!panel.controls().copy.enabled);
}

#[tokio::test]
async fn test_export_writes_generated_template() {
    let transport = ScriptedTransport::new();
    transport.push_json("/generate_job", 200, json!({"success": true, "hcl": "job \"a\" {}"}));
    let mut panel = panel(&transport, RecordingView::new());
    let dir = tempfile::tempdir().unwrap();
    let file = File::new(dir.path().join("nomad").join("a.hcl"));

    // Nothing to copy before generation
    assert!(matches!(
        panel.export_output(&file).await,
        Err(ConsoleError::ValidationError(_))
    ));

    generate_job(&mut panel, &fetcher(transport.clone()), &request())
        .await
        .unwrap();
    panel.export_output(&file).await.unwrap();

    assert_eq!(file.read_string().await.unwrap(), "job \"a\" {}");
    assert_eq!(panel.message().title, "Copy Status");
    assert!(panel.message().body.starts_with("Successfully copied HCL"));
}
