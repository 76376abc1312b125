//! Server state

use std::sync::Arc;

use openapi_client::models::JobRequest;
use tokio::sync::{watch, Mutex};

use crate::http::retry::Fetcher;
use crate::panel::{NullView, Panel, PanelSnapshot, PanelView};
use crate::pipeline::runner::DeploymentRunner;

/// Publishes every painted snapshot on a watch channel
pub struct WatchView {
    sender: watch::Sender<PanelSnapshot>,
}

impl PanelView for WatchView {
    fn paint(&self, snapshot: &PanelSnapshot) {
        self.sender.send_replace(snapshot.clone());
    }
}

/// Server state shared across handlers
///
/// Only the task holding `panel` mutates it. Readers use `snapshots` and never
/// wait on a running pipeline.
pub struct ServerState {
    pub panel: Arc<Mutex<Panel>>,
    pub snapshots: watch::Receiver<PanelSnapshot>,
    pub runner: Arc<DeploymentRunner>,
    pub fetcher: Fetcher,
}

impl ServerState {
    pub fn new(runner: Arc<DeploymentRunner>, fetcher: Fetcher, job_defaults: JobRequest) -> Self {
        let mut panel = Panel::new(runner.registry(), job_defaults, Arc::new(NullView));
        let (sender, snapshots) = watch::channel(panel.snapshot());
        panel.attach_view(Arc::new(WatchView { sender }));

        Self {
            panel: Arc::new(Mutex::new(panel)),
            snapshots,
            runner,
            fetcher,
        }
    }
}
