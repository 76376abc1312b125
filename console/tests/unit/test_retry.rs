//! Backoff fetcher tests

use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;

use jobdeck::errors::ConsoleError;
use jobdeck::http::retry::{Backoff, Fetcher, RetryPolicy};

use crate::support::{fetcher, ScriptedTransport};

#[tokio::test(start_paused = true)]
async fn test_returns_third_attempt_after_two_delays() {
    let transport = ScriptedTransport::new();
    transport.push("/db_prepare", Err(ConsoleError::Transport("connection reset".to_string())));
    transport.push_json("/db_prepare", 500, json!({"error": "db busy"}));
    transport.push_json("/db_prepare", 200, json!({"success": true, "message": "created"}));

    let fetcher = fetcher(transport.clone());
    let start = Instant::now();
    let body = fetcher
        .fetch_with_retry("/db_prepare", &json!({}), 3)
        .await
        .unwrap();

    assert_eq!(body, Some(json!({"success": true, "message": "created"})));
    assert_eq!(transport.calls().len(), 3);
    // Two fixed one-second delays
    assert_eq!(start.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_attempts_return_last_error() {
    let transport = ScriptedTransport::new();
    transport.push("/deploy_git", Err(ConsoleError::Transport("first".to_string())));
    transport.push_json("/deploy_git", 502, json!({"error": "second"}));
    transport.push_json("/deploy_git", 503, json!({"error": "third"}));

    let fetcher = fetcher(transport.clone());
    let err = fetcher
        .fetch_with_retry("/deploy_git", &json!({}), 3)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "third");
    assert!(matches!(err, ConsoleError::Http { status: 503, .. }));
    assert_eq!(transport.calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_http_error_without_body_reports_status() {
    let transport = ScriptedTransport::new();
    for _ in 0..3 {
        transport.push("/run_deploy", Ok(jobdeck::http::client::RawResponse::new(504, None)));
    }

    let err = fetcher(transport)
        .fetch_with_retry("/run_deploy", &json!({}), 3)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "HTTP 504");
}

#[tokio::test(start_paused = true)]
async fn test_application_failure_is_not_retried() {
    let transport = ScriptedTransport::new();
    transport.push_json("/deploy_vault", 200, json!({"success": false, "error": "denied"}));

    let start = Instant::now();
    let body = fetcher(transport.clone())
        .fetch_with_retry("/deploy_vault", &json!({}), 3)
        .await
        .unwrap();

    assert_eq!(body, Some(json!({"success": false, "error": "denied"})));
    assert_eq!(transport.calls().len(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test]
async fn test_success_without_json_body_is_none() {
    let transport = ScriptedTransport::new();
    transport.push("/generate_ci", Ok(jobdeck::http::client::RawResponse::new(200, None)));

    let body = fetcher(transport)
        .fetch_with_retry("/generate_ci", &json!({}), 3)
        .await
        .unwrap();
    assert_eq!(body, None);
}

#[tokio::test(start_paused = true)]
async fn test_single_attempt_never_sleeps() {
    let transport = ScriptedTransport::new();
    transport.push("/db_prepare", Err(ConsoleError::Transport("refused".to_string())));

    let start = Instant::now();
    let err = fetcher(transport.clone())
        .fetch_with_retry("/db_prepare", &json!({}), 1)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "refused");
    assert_eq!(transport.calls().len(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_exponential_policy_doubles_delay() {
    let transport = ScriptedTransport::new();
    for _ in 0..3 {
        transport.push_json("/db_prepare", 500, json!({}));
    }
    let fetcher = Fetcher::new(
        transport.clone(),
        RetryPolicy {
            max_attempts: 3,
            backoff: Backoff::Exponential {
                base: Duration::from_secs(1),
                max_jitter: Duration::ZERO,
            },
        },
    );

    let start = Instant::now();
    let _ = fetcher.post("/db_prepare", &json!({})).await;

    // 1s after the first attempt, 2s after the second
    assert_eq!(start.elapsed(), Duration::from_secs(3));
    assert_eq!(transport.calls().len(), 3);
}
