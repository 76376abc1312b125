//! Job template generation

use openapi_client::models::JobRequest;
use tracing::{error, info};

use crate::errors::ConsoleError;
use crate::http::retry::Fetcher;
use crate::panel::{Panel, GENERATE_LABEL, GENERATING_LABEL};

/// Generate the Nomad job for `request` and show the result on the panel
///
/// Deploy and copy controls are disabled up front and only re-enabled on
/// success. The generate control is always restored before returning.
pub async fn generate_job(
    panel: &mut Panel,
    fetcher: &Fetcher,
    request: &JobRequest,
) -> Result<String, ConsoleError> {
    info!("Generating Nomad job: {}", request.job_name);

    {
        let controls = panel.controls_mut();
        controls.generate.disable();
        controls.generate.set_label(GENERATING_LABEL);
        controls.deploy.disable();
        controls.copy.disable();
    }
    panel.set_form(request.clone());
    panel.set_output("Generating Nomad HCL template...");
    panel.refresh();

    let result = match fetcher.generate_job(request).await {
        Ok(response) if response.success => {
            let hcl = response.hcl.unwrap_or_default();
            panel.set_output(hcl.clone());
            panel.controls_mut().deploy.enable();
            panel.controls_mut().copy.enable();
            panel.show_message_box(
                "Generation Complete",
                &format!(
                    "Nomad job template for \"{}\" successfully generated.",
                    request.job_name
                ),
            );
            Ok(hcl)
        }
        Ok(response) => {
            let message = response
                .error
                .unwrap_or_else(|| "Unknown error".to_string());
            error!("Job generation rejected: {}", message);
            panel.set_output(format!("Error: {}", message));
            panel.show_message_box(
                "Generation Failed",
                &format!("An error occurred: {}", message),
            );
            Err(ConsoleError::Application(message))
        }
        Err(e) => {
            error!("Job generation failed: {}", e);
            panel.set_output(format!("Error: {}", e));
            panel.show_message_box("Job Generation Failed", &e.to_string());
            Err(e)
        }
    };

    let controls = panel.controls_mut();
    controls.generate.enable();
    controls.generate.set_label(GENERATE_LABEL);
    panel.refresh();

    result
}
