//! Typed backend calls

use openapi_client::models::{
    DatabaseSpec, GenerateJobResponse, JobRequest, StartDeploymentRequest, StepResponse,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::errors::ConsoleError;
use crate::http::retry::Fetcher;

pub const GENERATE_JOB_PATH: &str = "/generate_job";
pub const START_DEPLOYMENT_PATH: &str = "/start_deployment";

impl Fetcher {
    /// Render the Nomad job template for a form submission
    pub async fn generate_job(
        &self,
        request: &JobRequest,
    ) -> Result<GenerateJobResponse, ConsoleError> {
        let body = self.post(GENERATE_JOB_PATH, request).await?;
        decode_or_default(body)
    }

    /// Call one pipeline step endpoint
    pub async fn run_step(
        &self,
        endpoint: &str,
        payload: &Value,
    ) -> Result<StepResponse, ConsoleError> {
        let body = self
            .fetch_with_retry(endpoint, payload, self.policy().max_attempts)
            .await?;
        decode_or_default(body)
    }

    /// Single-call alternative to the stepwise pipeline
    pub async fn start_combined_deployment(
        &self,
        job_name: &str,
    ) -> Result<StepResponse, ConsoleError> {
        let request = StartDeploymentRequest {
            job_name: job_name.to_string(),
            database: DatabaseSpec {
                name: job_name.to_string(),
            },
        };
        let body = self.post(START_DEPLOYMENT_PATH, &request).await?;
        decode_or_default(body)
    }
}

/// A missing or malformed body decodes to the type's default, which reports `success: false`
fn decode_or_default<T: DeserializeOwned + Default>(
    body: Option<Value>,
) -> Result<T, ConsoleError> {
    match body {
        Some(Value::Null) | None => Ok(T::default()),
        Some(body) => match serde_json::from_value(body) {
            Ok(decoded) => Ok(decoded),
            Err(e) => {
                warn!("Unexpected response body, treating as unsuccessful: {}", e);
                Ok(T::default())
            }
        },
    }
}
