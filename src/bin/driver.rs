use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use patentflow::{PatentOrchestrator, PatentflowConfig, Platform};
use patentflow_common::fakes::SystemClock;
use patentflow_common::{PatentRecord, SearchSource};
use patentflow_search::SourceId;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a patentflow.toml config file; overrides config/patentflow.toml.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Boot the platform runtime (telemetry endpoint, tracing) and run until interrupted.
    Serve,
    /// Run the analyzer pipeline over patent records read from a JSON file and print the quality report.
    Analyze {
        /// Path to a JSON array of PatentRecord objects.
        records_path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let config = PatentflowConfig::load_from_path(args.config.as_ref())
        .context("loading patentflow configuration")?;

    match args.command {
        Command::Serve => serve(config).await,
        Command::Analyze { records_path } => analyze(config, &records_path).await,
    }
}

fn empty_sources() -> HashMap<SourceId, Arc<dyn SearchSource>> {
    HashMap::new()
}

async fn serve(config: PatentflowConfig) -> Result<()> {
    let clock = Arc::new(SystemClock);
    let orchestrator = Arc::new(PatentOrchestrator::new(&config, clock, empty_sources(), None));

    let platform = Platform::new(config, orchestrator);
    let runtime = platform.start().await?;

    info!("patentflow driver running; press ctrl-c to stop");
    tokio::signal::ctrl_c().await.context("waiting on ctrl-c")?;

    runtime.shutdown().await
}

async fn analyze(config: PatentflowConfig, records_path: &std::path::Path) -> Result<()> {
    let clock = Arc::new(SystemClock);
    let orchestrator = PatentOrchestrator::new(&config, clock, empty_sources(), None);

    let text = tokio::fs::read_to_string(records_path)
        .await
        .with_context(|| format!("reading {}", records_path.display()))?;
    let records: Vec<PatentRecord> =
        serde_json::from_str(&text).context("parsing records file as a JSON array of PatentRecord")?;

    let run_id = uuid::Uuid::new_v4().to_string();
    let outcome = orchestrator.analyze(run_id, &records);

    println!("{}", serde_json::to_string_pretty(&outcome.quality)?);
    Ok(())
}
