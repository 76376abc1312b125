//! Jobdeck - Entry Point
//!
//! Generates a Nomad job through the deployment backend and rolls it out
//! step by step, either from the terminal or through the panel server.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use openapi_client::models::JobRequest;
use tracing::{error, info};

use jobdeck::app::options::AppOptions;
use jobdeck::app::run::{build_fetcher, run_server};
use jobdeck::config::settings::Settings;
use jobdeck::filesys::file::File;
use jobdeck::logs::{init_logging, LogLevel, LogOptions};
use jobdeck::panel::Panel;
use jobdeck::pipeline::definition::DeployContext;
use jobdeck::pipeline::generator::generate_job;
use jobdeck::pipeline::runner::{DeploymentRunner, RunOutcome};
use jobdeck::terminal::TerminalView;
use jobdeck::utils::version_info;

#[derive(Parser, Debug)]
#[command(name = "jobdeck", version, about = "Generate and roll out Nomad jobs")]
struct Cli {
    /// Settings file (JSON). Missing file means defaults.
    #[arg(short, long, default_value = "jobdeck.json", env = "JOBDECK_CONFIG")]
    config: PathBuf,

    /// Backend base URL, overrides the settings file
    #[arg(long, env = "JOBDECK_BACKEND_URL")]
    backend_url: Option<String>,

    /// Log level, overrides the settings file
    #[arg(long)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate the Nomad job template
    Generate {
        #[command(flatten)]
        job: JobArgs,
        /// Write the template here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Generate the job (or load it) and run the deployment pipeline
    Deploy {
        #[command(flatten)]
        job: JobArgs,
        /// Deploy this template instead of generating one
        #[arg(long)]
        hcl_file: Option<PathBuf>,
        /// Ask the backend to run the whole rollout in one call
        #[arg(long, conflicts_with = "hcl_file")]
        combined: bool,
    },
    /// Serve the panel over HTTP
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print version information
    Version,
}

/// Job form fields; unset fields fall back to the configured defaults
#[derive(Debug, Args)]
struct JobArgs {
    #[arg(long)]
    job_name: Option<String>,
    #[arg(long)]
    datacenter: Option<String>,
    #[arg(long)]
    namespace: Option<String>,
    #[arg(long)]
    container_port: Option<String>,
    #[arg(long)]
    exposed_port: Option<String>,
    #[arg(long)]
    worker_name: Option<String>,
    #[arg(long)]
    vault_role: Option<String>,
    #[arg(long)]
    cpu: Option<String>,
    #[arg(long)]
    memory: Option<String>,
    #[arg(long)]
    node_class: Option<String>,
    /// YAML document with `vault_path` and `env`
    #[arg(long)]
    vault_yaml_file: Option<PathBuf>,
}

impl JobArgs {
    async fn into_request(self, defaults: &JobRequest) -> anyhow::Result<JobRequest> {
        let mut request = defaults.clone();
        let fields = [
            (self.job_name, &mut request.job_name),
            (self.datacenter, &mut request.datacenter_name),
            (self.namespace, &mut request.namespace),
            (self.container_port, &mut request.container_port),
            (self.exposed_port, &mut request.exposed_port),
            (self.worker_name, &mut request.worker_name),
            (self.vault_role, &mut request.vault_role),
            (self.cpu, &mut request.cpu),
            (self.memory, &mut request.memory),
            (self.node_class, &mut request.node),
        ];
        for (value, field) in fields {
            if let Some(value) = value {
                *field = value;
            }
        }

        if let Some(path) = self.vault_yaml_file {
            let file = File::new(path);
            request.vault_yaml = file
                .read_string()
                .await
                .with_context(|| format!("reading {}", file.path().display()))?;
        }

        Ok(request)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Command::Version = cli.command {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => println!("{version}"),
            Err(e) => eprintln!("Failed to print version: {e}"),
        }
        return ExitCode::SUCCESS;
    }

    // Retrieve the settings file
    let settings = match Settings::load(&File::new(&cli.config)).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to read settings file {}: {e}", cli.config.display());
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    let log_options = LogOptions {
        log_level: cli.log_level.clone().unwrap_or(settings.log_level.clone()),
        log_dir: settings.log_dir.clone(),
        json_format: settings.log_json,
        ..Default::default()
    };
    let _log_guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    let mut options = AppOptions::from_settings(&settings);
    if let Some(url) = cli.backend_url {
        options.backend_base_url = url;
    }

    match run_command(cli.command, options).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_command(command: Command, mut options: AppOptions) -> anyhow::Result<ExitCode> {
    match command {
        Command::Generate { job, out } => {
            let request = job.into_request(&options.job_defaults).await?;
            let fetcher = build_fetcher(&options)?;
            let runner = DeploymentRunner::with_default_pipeline(fetcher.clone());
            let mut panel = Panel::new(runner.registry(), request.clone(), Arc::new(TerminalView::new()));

            let hcl = generate_job(&mut panel, &fetcher, &request).await?;
            match out {
                Some(path) => panel.export_output(&File::new(path)).await?,
                None => println!("{hcl}"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Deploy {
            job,
            hcl_file,
            combined,
        } => {
            let request = job.into_request(&options.job_defaults).await?;
            let fetcher = build_fetcher(&options)?;

            if combined {
                let response = fetcher.start_combined_deployment(&request.job_name).await?;
                if response.success {
                    info!(
                        "Deployment started: {}",
                        response.message.as_deref().unwrap_or("ok")
                    );
                    return Ok(ExitCode::SUCCESS);
                }
                error!(
                    "Deployment failed: {}",
                    response.error.as_deref().unwrap_or("Unknown error")
                );
                return Ok(ExitCode::FAILURE);
            }

            let runner = DeploymentRunner::with_default_pipeline(fetcher.clone());
            let mut panel = Panel::new(runner.registry(), request.clone(), Arc::new(TerminalView::new()));

            match hcl_file {
                Some(path) => {
                    let file = File::new(path);
                    let hcl = file
                        .read_string()
                        .await
                        .with_context(|| format!("reading {}", file.path().display()))?;
                    panel.load_output(hcl);
                }
                None => {
                    generate_job(&mut panel, &fetcher, &request).await?;
                }
            }

            let ctx = DeployContext::from_form(panel.form(), panel.output());
            let outcome = runner.start_deployment(&mut panel, &ctx).await?;
            info!("Pipeline outcome: {:?}", outcome);
            Ok(match outcome {
                RunOutcome::Completed => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            })
        }
        Command::Serve { host, port } => {
            if let Some(host) = host {
                options.server.host = host;
            }
            if let Some(port) = port {
                options.server.port = port;
            }
            run_server(options, await_shutdown_signal()).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Version => Ok(ExitCode::SUCCESS),
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to listen for SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("Failed to listen for SIGINT");

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        info!("Ctrl+C received, shutting down...");
    }
}
