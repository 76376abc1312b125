//! API models

use serde::{Deserialize, Serialize};

/// Job generation request, one string per form field
///
/// Values are forwarded verbatim. The backend is the only validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRequest {
    pub job_name: String,
    pub datacenter_name: String,
    pub namespace: String,
    pub container_port: String,
    pub exposed_port: String,
    pub worker_name: String,
    pub vault_role: String,
    pub cpu: String,
    pub memory: String,
    pub node: String,
    pub vault_yaml: String,
}

impl Default for JobRequest {
    fn default() -> Self {
        Self {
            job_name: "default-service".to_string(),
            datacenter_name: "glynac-dc".to_string(),
            namespace: "default".to_string(),
            container_port: String::new(),
            exposed_port: String::new(),
            worker_name: "Worker-01".to_string(),
            vault_role: String::new(),
            cpu: "500".to_string(),
            memory: "256".to_string(),
            node: "general".to_string(),
            vault_yaml: String::new(),
        }
    }
}

/// Job generation response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateJobResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hcl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response shared by every pipeline step endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Database descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSpec {
    pub name: String,
}

/// `POST /db_prepare`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbPrepareRequest {
    pub database: DatabaseSpec,
}

/// `POST /deploy_vault`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployVaultRequest {
    pub vault_yaml: String,
}

/// `POST /deploy_git`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployGitRequest {
    pub job_name: String,
    #[serde(rename = "hclOutput")]
    pub hcl_output: String,
}

/// `POST /generate_ci` and `POST /run_deploy`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobNameRequest {
    pub job_name: String,
}

/// `POST /start_deployment`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartDeploymentRequest {
    pub job_name: String,
    pub database: DatabaseSpec,
}

/// Error body
///
/// Any JSON body may carry an `error` string, including non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}
