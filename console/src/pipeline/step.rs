//! Pipeline steps and their status machine

use serde::{Deserialize, Serialize};

use crate::pipeline::definition::StepDefinition;

/// Step status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    /// Not started
    Pending,

    /// Backend call in flight
    InProgress,

    /// Backend reported success
    Success,

    /// Backend call or application reported failure
    Failed,

    /// Terminal failure rendered like `Failed`. Nothing sets it today.
    Stuck,
}

/// Step event
#[derive(Debug, Clone)]
pub enum StepEvent {
    /// Backend call is about to be made
    Start,

    /// Backend call succeeded
    Succeed,

    /// Backend call failed
    Fail(String),

    /// Back to pending
    Reset,
}

/// One unit of deployment work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub id: String,
    pub name: String,
    status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl PipelineStep {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: StepStatus::Pending,
            error: None,
        }
    }

    /// Build a step in an arbitrary status
    pub fn with_status(mut self, status: StepStatus) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> StepStatus {
        self.status
    }

    /// Error message of the last failure, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Process an event and transition status
    pub fn process(&mut self, event: StepEvent) -> Result<(), String> {
        let new_status = match (self.status, &event) {
            (StepStatus::Pending, StepEvent::Start) => {
                self.error = None;
                StepStatus::InProgress
            }
            (StepStatus::InProgress, StepEvent::Succeed) => StepStatus::Success,
            (StepStatus::InProgress, StepEvent::Fail(err)) => {
                self.error = Some(err.clone());
                StepStatus::Failed
            }
            (_, StepEvent::Reset) => {
                self.error = None;
                StepStatus::Pending
            }
            (status, event) => {
                return Err(format!(
                    "Invalid transition for {}: {:?} -> {:?}",
                    self.id, status, event
                ));
            }
        };

        self.status = new_status;
        Ok(())
    }
}

/// Ordered list of pipeline steps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRegistry {
    steps: Vec<PipelineStep>,
}

impl StepRegistry {
    pub fn new(steps: Vec<PipelineStep>) -> Self {
        Self { steps }
    }

    /// One pending step per definition, in definition order
    pub fn from_definitions(definitions: &[StepDefinition]) -> Self {
        Self::new(
            definitions
                .iter()
                .map(|def| PipelineStep::new(def.id.clone(), def.name.clone()))
                .collect(),
        )
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PipelineStep> {
        self.steps.get(index)
    }

    pub fn status(&self, index: usize) -> Option<StepStatus> {
        self.steps.get(index).map(PipelineStep::status)
    }

    /// Whether step `index` may move to in-progress
    ///
    /// Every earlier step must be `Success` and no step may be in progress.
    pub fn can_begin(&self, index: usize) -> bool {
        index < self.steps.len()
            && self.steps[..index]
                .iter()
                .all(|step| step.status() == StepStatus::Success)
            && self
                .steps
                .iter()
                .all(|step| step.status() != StepStatus::InProgress)
    }

    pub fn begin(&mut self, index: usize) -> Result<(), String> {
        if !self.can_begin(index) {
            return Err(format!("Step {} cannot start yet", index + 1));
        }
        self.apply(index, StepEvent::Start)
    }

    pub fn succeed(&mut self, index: usize) -> Result<(), String> {
        self.apply(index, StepEvent::Succeed)
    }

    pub fn fail(&mut self, index: usize, error: impl Into<String>) -> Result<(), String> {
        self.apply(index, StepEvent::Fail(error.into()))
    }

    /// Put every step back to pending
    pub fn reset_all(&mut self) {
        for step in &mut self.steps {
            step.status = StepStatus::Pending;
            step.error = None;
        }
    }

    fn apply(&mut self, index: usize, event: StepEvent) -> Result<(), String> {
        self.steps
            .get_mut(index)
            .ok_or_else(|| format!("No step at index {}", index))?
            .process(event)
    }
}
