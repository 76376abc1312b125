//! Console panel state
//!
//! The panel owns every piece of state a user sees: the step list, the
//! controls, the generated template and the message box. Each mutation is
//! followed by [`Panel::refresh`], which renders a fresh [`PanelSnapshot`] and
//! hands it to the attached [`PanelView`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use openapi_client::models::JobRequest;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConsoleError;
use crate::filesys::file::File;
use crate::pipeline::step::StepRegistry;
use crate::render::{render_status_list, StepView};

pub const GENERATE_LABEL: &str = "Generate Nomad Job (HCL)";
pub const GENERATING_LABEL: &str = "Generating...";
pub const START_LABEL: &str = "Start Deployment Pipeline";
pub const RUNNING_LABEL: &str = "Pipeline Running...";
pub const COPY_LABEL: &str = "Copy HCL";
pub const RESET_LABEL: &str = "Reset Pipeline";

/// A button-like control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    pub enabled: bool,
    pub visible: bool,
    pub label: String,
}

impl Control {
    pub fn new(label: &str, enabled: bool, visible: bool) -> Self {
        Self {
            enabled,
            visible,
            label: label.to_string(),
        }
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn show(&mut self) {
        self.enabled = true;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.enabled = false;
        self.visible = false;
    }

    pub fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
    }
}

/// Every control on the panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub generate: Control,
    /// Starts the deployment pipeline
    pub deploy: Control,
    pub copy: Control,
    pub reset: Control,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            generate: Control::new(GENERATE_LABEL, true, true),
            deploy: Control::new(START_LABEL, false, true),
            copy: Control::new(COPY_LABEL, false, true),
            reset: Control::new(RESET_LABEL, false, false),
        }
    }
}

/// Modal notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBox {
    pub title: String,
    pub body: String,
    pub visible: bool,
    /// Bumped every time the box is shown
    #[serde(default)]
    pub seq: u64,
}

/// Everything an adapter needs to draw the panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSnapshot {
    pub steps: Vec<StepView>,
    pub controls: Controls,
    pub form: JobRequest,
    pub output: String,
    pub message: MessageBox,
    pub updated_at: DateTime<Utc>,
}

/// Receives a snapshot after every panel mutation
pub trait PanelView: Send + Sync {
    fn paint(&self, snapshot: &PanelSnapshot);
}

/// View that draws nothing
pub struct NullView;

impl PanelView for NullView {
    fn paint(&self, _snapshot: &PanelSnapshot) {}
}

/// Console panel
pub struct Panel {
    steps: StepRegistry,
    controls: Controls,
    form: JobRequest,
    output: String,
    message: MessageBox,
    view: Arc<dyn PanelView>,
}

impl Panel {
    /// Create a panel with all steps pending and paint it once
    pub fn new(steps: StepRegistry, form: JobRequest, view: Arc<dyn PanelView>) -> Self {
        let panel = Self {
            steps,
            controls: Controls::default(),
            form,
            output: String::new(),
            message: MessageBox::default(),
            view,
        };
        panel.refresh();
        panel
    }

    /// Replace the view and paint the current state into it
    pub fn attach_view(&mut self, view: Arc<dyn PanelView>) {
        self.view = view;
        self.refresh();
    }

    pub fn steps(&self) -> &StepRegistry {
        &self.steps
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn form(&self) -> &JobRequest {
        &self.form
    }

    /// Generated template, or the last generation status text
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn message(&self) -> &MessageBox {
        &self.message
    }

    pub(crate) fn steps_mut(&mut self) -> &mut StepRegistry {
        &mut self.steps
    }

    pub(crate) fn controls_mut(&mut self) -> &mut Controls {
        &mut self.controls
    }

    pub(crate) fn set_form(&mut self, form: JobRequest) {
        self.form = form;
    }

    pub(crate) fn set_output(&mut self, output: impl Into<String>) {
        self.output = output.into();
    }

    /// Use an existing template as the deployable output
    pub fn load_output(&mut self, hcl: impl Into<String>) {
        self.output = hcl.into();
        self.controls.deploy.enable();
        self.controls.copy.enable();
        self.refresh();
    }

    /// Render the current state and paint it
    pub fn refresh(&self) {
        self.view.paint(&self.snapshot());
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            steps: render_status_list(self.steps.steps()),
            controls: self.controls.clone(),
            form: self.form.clone(),
            output: self.output.clone(),
            message: self.message.clone(),
            updated_at: Utc::now(),
        }
    }

    pub fn show_message_box(&mut self, title: &str, body: &str) {
        debug!("Message box: {} - {}", title, body);
        self.message = MessageBox {
            title: title.to_string(),
            body: body.to_string(),
            visible: true,
            seq: self.message.seq + 1,
        };
        self.refresh();
    }

    pub fn hide_message_box(&mut self) {
        self.message.visible = false;
        self.refresh();
    }

    /// Put every step back to pending and restore the start control
    ///
    /// Does not cancel a backend call that is still in flight.
    pub fn reset_deployment(&mut self) {
        info!("Resetting deployment pipeline");
        self.steps.reset_all();
        self.refresh();

        self.controls.deploy.enable();
        self.controls.deploy.set_label(START_LABEL);
        self.controls.reset.hide();
        self.refresh();
    }

    /// Write the generated template to `file`
    pub async fn export_output(&mut self, file: &File) -> Result<(), ConsoleError> {
        if !self.controls.copy.enabled {
            return Err(ConsoleError::ValidationError(
                "Nothing to copy yet, generate a job first".to_string(),
            ));
        }

        match file.write_string(&self.output).await {
            Ok(()) => {
                let body = format!("Successfully copied HCL to {}!", file.path().display());
                self.show_message_box("Copy Status", &body);
                Ok(())
            }
            Err(e) => {
                let body = format!("Copy failed: {}. Please copy manually.", e);
                self.show_message_box("Copy Status", &body);
                Err(e)
            }
        }
    }
}
