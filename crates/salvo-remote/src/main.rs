//! `salvo-remote` starts and stops the remote sandboxes Salvo benchmarks on.
//!
//! ## Commands
//!
//! - **start**: deploy the sandbox for one build and print its VMs as JSON
//! - **stop-all**: tear down every deployed sandbox
//!
//! Logs go to stderr; stdout carries only the JSON description of started
//! instances.

mod config;

use clap::{Parser, Subcommand};
use config::{BuildSelection, RemoteConfig};
use salvo_sandboxes::{SandboxManager, SandboxRequest, SandboxType};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "salvo-remote", version, about = "Manage remote Salvo sandboxes")]
struct Cli {
    /// Directory holding the sandbox Terraform definitions
    #[arg(long, global = true)]
    terraform_dir: Option<PathBuf>,

    /// Terraform binary to run
    #[arg(long, global = true)]
    terraform_bin: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the sandbox for a build and print its VMs
    Start {
        /// Build the sandbox is started for
        #[arg(long, env = "SALVO_BUILD_ID", allow_negative_numbers = true)]
        build_id: i64,

        /// Use this build ID instead of --build-id when non-zero
        #[arg(long, env = "SALVO_BUILD_ID_OVERRIDE", default_value_t = 0, allow_negative_numbers = true)]
        build_id_override: i64,
    },
    /// Stop every sandbox
    StopAll,
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_tracing() {
        eprintln!("salvo-remote: {e:#}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("salvo-remote: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("salvo_remote=info".parse()?)
                .add_directive("salvo_sandboxes=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = RemoteConfig::from_env().with_overrides(cli.terraform_dir, cli.terraform_bin);
    tracing::debug!(?config, "Configuration loaded");
    let manager = SandboxManager::new(config.to_manager_config()?);

    execute(&manager, cli.command, &mut std::io::stdout()).await
}

/// Run one subcommand against `manager`, writing started instances to `out`.
async fn execute(
    manager: &SandboxManager,
    command: Command,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        Command::Start {
            build_id,
            build_id_override,
        } => {
            let build_id = BuildSelection {
                build_id,
                build_id_override,
            }
            .resolve()?;
            let request =
                SandboxRequest::new().with(SandboxType::DefaultSandboxX64, [build_id.get()]);

            let instances = manager.start(&request).await?;
            writeln!(out, "{}", serde_json::to_string_pretty(&instances)?)?;
        }
        Command::StopAll => manager.stop_all().await?,
    }
    Ok(())
}
