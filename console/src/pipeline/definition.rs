//! Canonical deployment pipeline

use openapi_client::models::{
    DatabaseSpec, DbPrepareRequest, DeployGitRequest, DeployVaultRequest, JobNameRequest,
    JobRequest,
};
use serde_json::Value;

use crate::errors::ConsoleError;

/// Inputs every step payload is built from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployContext {
    pub job_name: String,
    pub hcl_output: String,
    pub vault_yaml: String,
}

impl DeployContext {
    /// Context from the submitted form and the generated template
    pub fn from_form(form: &JobRequest, hcl_output: &str) -> Self {
        Self {
            job_name: form.job_name.clone(),
            hcl_output: hcl_output.to_string(),
            vault_yaml: form.vault_yaml.clone(),
        }
    }
}

/// Builds the JSON body for one step
pub type PayloadBuilder = fn(&DeployContext) -> Result<Value, ConsoleError>;

/// One configured step: where it posts and what it sends
#[derive(Clone)]
pub struct StepDefinition {
    pub id: String,
    pub name: String,
    pub endpoint: String,
    pub payload: PayloadBuilder,
}

impl StepDefinition {
    pub fn new(id: &str, name: &str, endpoint: &str, payload: PayloadBuilder) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            payload,
        }
    }

    pub fn build_payload(&self, ctx: &DeployContext) -> Result<Value, ConsoleError> {
        (self.payload)(ctx)
    }
}

impl std::fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepDefinition")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

fn database_payload(ctx: &DeployContext) -> Result<Value, ConsoleError> {
    Ok(serde_json::to_value(DbPrepareRequest {
        database: DatabaseSpec {
            name: ctx.job_name.clone(),
        },
    })?)
}

fn vault_payload(ctx: &DeployContext) -> Result<Value, ConsoleError> {
    Ok(serde_json::to_value(DeployVaultRequest {
        vault_yaml: ctx.vault_yaml.clone(),
    })?)
}

fn git_payload(ctx: &DeployContext) -> Result<Value, ConsoleError> {
    Ok(serde_json::to_value(DeployGitRequest {
        job_name: ctx.job_name.clone(),
        hcl_output: ctx.hcl_output.clone(),
    })?)
}

fn job_name_payload(ctx: &DeployContext) -> Result<Value, ConsoleError> {
    Ok(serde_json::to_value(JobNameRequest {
        job_name: ctx.job_name.clone(),
    })?)
}

/// The five backend-backed steps, in execution order
pub fn default_pipeline() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new(
            "step1",
            "1. Create PostgreSQL Database",
            "/db_prepare",
            database_payload,
        ),
        StepDefinition::new(
            "step2",
            "2. Create Vault Secret (K/V v2)",
            "/deploy_vault",
            vault_payload,
        ),
        StepDefinition::new(
            "step3",
            "3. Push Nomad Job to GitHub",
            "/deploy_git",
            git_payload,
        ),
        StepDefinition::new(
            "step4",
            "4. Generate CI/CD Config & Push to Github",
            "/generate_ci",
            job_name_payload,
        ),
        StepDefinition::new(
            "step5",
            "5. Run CI/CD Pipeline & Deploy Job",
            "/run_deploy",
            job_name_payload,
        ),
    ]
}
