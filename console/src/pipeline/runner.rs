//! Deployment pipeline runner

use tracing::{error, info, warn, Instrument};

use crate::errors::ConsoleError;
use crate::http::retry::Fetcher;
use crate::panel::{Panel, RUNNING_LABEL, START_LABEL};
use crate::pipeline::definition::{default_pipeline, DeployContext, StepDefinition};
use crate::pipeline::step::StepRegistry;
use crate::utils::generate_uuid;

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every step succeeded
    Completed,

    /// Step `step` (1-based) failed with `error`
    Failed { step: usize, error: String },

    /// Step `step` (1-based) was refused by the registry's ordering guard
    ///
    /// Only reachable if the registry was left inconsistent. `start_deployment`
    /// resets every step before running, so a normal run never reports it.
    Halted { step: usize },
}

/// Drives the configured steps strictly in order, stopping at the first failure
pub struct DeploymentRunner {
    definitions: Vec<StepDefinition>,
    fetcher: Fetcher,
}

impl DeploymentRunner {
    pub fn new(definitions: Vec<StepDefinition>, fetcher: Fetcher) -> Self {
        Self {
            definitions,
            fetcher,
        }
    }

    /// Runner over the canonical five-step pipeline
    pub fn with_default_pipeline(fetcher: Fetcher) -> Self {
        Self::new(default_pipeline(), fetcher)
    }

    pub fn definitions(&self) -> &[StepDefinition] {
        &self.definitions
    }

    /// Fresh step registry matching this runner's definitions
    pub fn registry(&self) -> StepRegistry {
        StepRegistry::from_definitions(&self.definitions)
    }

    /// Run every step against the backend
    ///
    /// Errors only when the panel's steps do not match this runner's
    /// definitions. Backend failures are reported through [`RunOutcome`].
    pub async fn start_deployment(
        &self,
        panel: &mut Panel,
        ctx: &DeployContext,
    ) -> Result<RunOutcome, ConsoleError> {
        if panel.steps().len() != self.definitions.len() {
            return Err(ConsoleError::ConfigError(format!(
                "Panel has {} steps but the pipeline defines {}",
                panel.steps().len(),
                self.definitions.len()
            )));
        }

        let run_id = generate_uuid();
        let span = tracing::info_span!("deployment", run_id = %run_id, job = %ctx.job_name);
        Ok(self.run(panel, ctx).instrument(span).await)
    }

    async fn run(&self, panel: &mut Panel, ctx: &DeployContext) -> RunOutcome {
        info!("Starting deployment pipeline ({} steps)", self.definitions.len());

        panel.steps_mut().reset_all();
        {
            let controls = panel.controls_mut();
            controls.deploy.disable();
            controls.deploy.set_label(RUNNING_LABEL);
            controls.reset.hide();
        }
        panel.refresh();

        for (index, definition) in self.definitions.iter().enumerate() {
            let number = index + 1;

            if let Err(e) = panel.steps_mut().begin(index) {
                warn!("Step {} not started: {}", number, e);
                panel.refresh();
                restore_controls(panel);
                return RunOutcome::Halted { step: number };
            }
            panel.refresh();
            info!("Step {} started: {} ({})", number, definition.name, definition.endpoint);

            match self.execute(definition, ctx).await {
                Ok(()) => {
                    // Transition is always valid: this step was just started
                    let _ = panel.steps_mut().succeed(index);
                    panel.refresh();
                    panel.controls_mut().reset.show();
                    panel.refresh();
                    info!("Step {} succeeded", number);
                }
                Err(e) => {
                    let message = e.to_string();
                    let _ = panel.steps_mut().fail(index, message.clone());
                    panel.refresh();
                    error!("Step {} failed: {}", number, message);
                    panel.show_message_box(
                        "Deployment Failed",
                        &format!("Step {} failed: {}", number, message),
                    );
                    restore_controls(panel);
                    return RunOutcome::Failed {
                        step: number,
                        error: message,
                    };
                }
            }
        }

        info!("Deployment pipeline completed");
        panel.show_message_box("Deployment Success", "All steps completed successfully.");
        restore_controls(panel);
        RunOutcome::Completed
    }

    async fn execute(
        &self,
        definition: &StepDefinition,
        ctx: &DeployContext,
    ) -> Result<(), ConsoleError> {
        let payload = definition.build_payload(ctx)?;
        let response = self.fetcher.run_step(&definition.endpoint, &payload).await?;
        if response.success {
            Ok(())
        } else {
            Err(ConsoleError::Application(
                response.error.unwrap_or_else(|| "Step failed".to_string()),
            ))
        }
    }
}

fn restore_controls(panel: &mut Panel) {
    let controls = panel.controls_mut();
    controls.deploy.enable();
    controls.deploy.set_label(START_LABEL);
    controls.reset.show();
    panel.refresh();
}
