//! Shared test doubles

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use jobdeck::errors::ConsoleError;
use jobdeck::http::client::{RawResponse, Transport};
use jobdeck::http::retry::{Backoff, Fetcher, RetryPolicy};
use jobdeck::panel::{PanelSnapshot, PanelView};

/// Transport that replays scripted responses per path
///
/// Paths without a script answer `200 {"success": true}`.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Result<RawResponse, ConsoleError>>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, path: &str, response: Result<RawResponse, ConsoleError>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn push_json(&self, path: &str, status: u16, body: Value) {
        self.push(path, Ok(RawResponse::new(status, Some(body))));
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|(path, _)| path).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_json(&self, path: &str, body: &Value) -> Result<RawResponse, ConsoleError> {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_string(), body.clone()));

        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(path)
            .and_then(|queue| queue.pop_front());

        next.unwrap_or_else(|| Ok(RawResponse::new(200, Some(json!({"success": true})))))
    }
}

pub fn fixed_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        backoff: Backoff::Fixed(Duration::from_secs(1)),
    }
}

pub fn fetcher(transport: Arc<ScriptedTransport>) -> Fetcher {
    Fetcher::new(transport, fixed_policy())
}

/// View that keeps every painted snapshot
#[derive(Default)]
pub struct RecordingView {
    snapshots: Mutex<Vec<PanelSnapshot>>,
}

impl RecordingView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn snapshots(&self) -> Vec<PanelSnapshot> {
        self.snapshots.lock().unwrap().clone()
    }
}

impl PanelView for RecordingView {
    fn paint(&self, snapshot: &PanelSnapshot) {
        self.snapshots.lock().unwrap().push(snapshot.clone());
    }
}
