use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use wf_domain::DataEnvelope;
use wf_exec::{Orchestrator, CONFIG};
use wf_store::InMemoryDataStore;

#[derive(Parser)]
#[command(name = "wf-cli", about = "Runs node-based workflows in production or development mode")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Run {
        #[arg(long, value_enum)]
        mode: RunMode,
        #[arg(long)]
        workflow: PathBuf,
        #[arg(long)]
        node: Option<String>,
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RunMode {
    Production,
    Development,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::new(&CONFIG.log_level)).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "wf-cli: runtime crash");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let Commands::Run { mode, workflow, node, input } = cli.command;

    let registry = wf_registry::NodeRegistry::discover()?;
    let store: Arc<dyn wf_store::DataStore> = Arc::new(InMemoryDataStore::new());
    wf_nodes::set_shared_store(store.clone());
    let orchestrator = Orchestrator::new(Arc::new(registry), store, CONFIG.pool_thread_workers, CONFIG.pool_process_workers);

    let json = match std::fs::read_to_string(&workflow) {
        Ok(json) => json,
        Err(err) => {
            tracing::error!(path = %workflow.display(), error = %err, "failed to read workflow file");
            return Ok(ExitCode::from(1));
        }
    };
    if let Err(err) = orchestrator.load_workflow(&json).await {
        tracing::error!(error = %err, "workflow failed to load or validate");
        return Ok(ExitCode::from(1));
    }

    match mode {
        RunMode::Production => {
            orchestrator.start_all().await?;
            tracing::info!(loops = ?orchestrator.running_loops().await, "workflow started");
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("received interrupt, stopping runners");
                }
            }
            orchestrator.shutdown().await?;
            Ok(ExitCode::SUCCESS)
        }
        RunMode::Development => {
            let Some(node) = node else {
                tracing::error!("development mode requires --node");
                return Ok(ExitCode::from(1));
            };
            let input_env = match input {
                Some(path) => {
                    let raw = std::fs::read_to_string(&path)?;
                    let data: indexmap::IndexMap<String, serde_json::Value> = serde_json::from_str(&raw)?;
                    Some(DataEnvelope::with_data(data))
                }
                None => None,
            };
            match orchestrator.execute_node(&node, input_env).await {
                Ok(result) => {
                    println!("{}", serde_json::to_string_pretty(result.data())?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    tracing::error!(error = %err, "node execution failed");
                    Ok(ExitCode::from(1))
                }
            }
        }
    }
}
