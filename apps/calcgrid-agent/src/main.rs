use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

mod worker;

use worker::Worker;

#[derive(Debug, Parser)]
#[command(name = "calcgrid-agent")]
struct Args {
    #[arg(long, default_value = "config/calcgrid.yaml")]
    config: PathBuf,
    /// Overrides agent.computing_power from the config file.
    #[arg(long)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = calcgrid_config::load_config_or_default(&args.config)
        .context("load configuration failed")?;
    init_tracing(&config.observability.log_level);

    let computing_power = args.workers.unwrap_or(config.agent.computing_power).max(1);
    let worker = Arc::new(
        Worker::new(
            &config.agent.orchestrator_url,
            Duration::from_millis(config.agent.poll_interval_ms),
        )
        .context("build worker transport failed")?,
    );

    info!(
        computing_power,
        orchestrator_url = %config.agent.orchestrator_url,
        "calcgrid-agent starting"
    );

    let mut handles = Vec::with_capacity(computing_power);
    for worker_id in 0..computing_power {
        let worker = worker.clone();
        handles.push(tokio::spawn(async move {
            worker.run(worker_id).await;
        }));
    }
    for handle in handles {
        handle.await.context("worker task panicked")?;
    }
    Ok(())
}

fn init_tracing(fallback_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(fallback_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
