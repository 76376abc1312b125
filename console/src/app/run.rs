//! Application wiring

use std::future::Future;
use std::sync::Arc;

use tracing::{error, info};

use crate::app::options::AppOptions;
use crate::errors::ConsoleError;
use crate::http::client::HttpClient;
use crate::http::retry::Fetcher;
use crate::pipeline::runner::DeploymentRunner;
use crate::server::serve::serve;
use crate::server::state::ServerState;

/// Fetcher over a reqwest client for the configured backend
pub fn build_fetcher(options: &AppOptions) -> Result<Fetcher, ConsoleError> {
    let client = HttpClient::new(&options.backend_base_url, options.request_timeout)?;
    Ok(Fetcher::new(Arc::new(client), options.retry.clone()))
}

/// Run the panel server until `shutdown_signal` resolves
pub async fn run_server(
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ConsoleError> {
    info!("Using backend at {}", options.backend_base_url);

    let fetcher = build_fetcher(&options)?;
    let runner = Arc::new(DeploymentRunner::with_default_pipeline(fetcher.clone()));
    let state = Arc::new(ServerState::new(
        runner,
        fetcher,
        options.job_defaults.clone(),
    ));

    let handle = serve(&options.server, state, shutdown_signal).await?;
    match handle.await {
        Ok(result) => result,
        Err(e) => {
            error!("Server task failed: {}", e);
            Err(ConsoleError::ServerError(e.to_string()))
        }
    }
}
