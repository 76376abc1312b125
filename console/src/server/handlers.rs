//! HTTP request handlers

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use openapi_client::models::JobRequest;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::errors::ConsoleError;
use crate::filesys::file::File;
use crate::pipeline::definition::DeployContext;
use crate::pipeline::generator::generate_job;
use crate::pipeline::runner::RunOutcome;
use crate::server::state::ServerState;
use crate::utils::version_info;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    let version = version_info();
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "jobdeck".to_string(),
        version: version.version,
    })
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    Json(version_info())
}

/// Result of a panel action
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let status = match &self {
            ConsoleError::Busy(_) => StatusCode::CONFLICT,
            ConsoleError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ConsoleError::Application(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ConsoleError::Http { .. } | ConsoleError::Transport(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ActionResponse {
            success: false,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn busy() -> ConsoleError {
    ConsoleError::Busy("Another panel action is in progress".to_string())
}

/// Current panel snapshot
pub async fn panel_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(state.snapshots.borrow().clone())
}

/// Generate handler
pub async fn generate_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<JobRequest>,
) -> Result<impl IntoResponse, ConsoleError> {
    let mut panel = state.panel.try_lock().map_err(|_| busy())?;
    if !panel.controls().generate.enabled {
        return Err(busy());
    }

    generate_job(&mut panel, &state.fetcher, &request).await?;
    Ok(ActionResponse::ok(format!(
        "Nomad job template for \"{}\" generated",
        request.job_name
    )))
}

/// Deploy handler
///
/// The pipeline runs in the background and holds the panel until it ends.
pub async fn deploy_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<impl IntoResponse, ConsoleError> {
    let mut panel = state.panel.clone().try_lock_owned().map_err(|_| busy())?;
    if !panel.controls().deploy.enabled {
        return Err(ConsoleError::Busy(
            "Start control is disabled, generate a job first".to_string(),
        ));
    }

    let ctx = DeployContext::from_form(panel.form(), panel.output());
    let runner = state.runner.clone();
    tokio::spawn(async move {
        match runner.start_deployment(&mut panel, &ctx).await {
            Ok(RunOutcome::Completed) => info!("Deployment of {} completed", ctx.job_name),
            Ok(outcome) => info!("Deployment of {} ended: {:?}", ctx.job_name, outcome),
            Err(e) => error!("Deployment of {} could not run: {}", ctx.job_name, e),
        }
    });

    Ok((StatusCode::ACCEPTED, ActionResponse::ok("Deployment started")))
}

/// Reset handler
pub async fn reset_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<impl IntoResponse, ConsoleError> {
    let mut panel = state.panel.try_lock().map_err(|_| busy())?;
    panel.reset_deployment();
    Ok(ActionResponse::ok("Pipeline reset"))
}

/// Hide message handler
pub async fn hide_message_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<impl IntoResponse, ConsoleError> {
    let mut panel = state.panel.try_lock().map_err(|_| busy())?;
    panel.hide_message_box();
    Ok(ActionResponse::ok("Message hidden"))
}

/// Export request
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub path: PathBuf,
}

/// Export handler
pub async fn export_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ExportRequest>,
) -> Result<impl IntoResponse, ConsoleError> {
    let mut panel = state.panel.try_lock().map_err(|_| busy())?;
    let file = File::new(request.path);
    panel.export_output(&file).await?;
    Ok(ActionResponse::ok(format!(
        "Template written to {}",
        file.path().display()
    )))
}
