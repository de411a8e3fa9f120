//! rpc-rotator CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!   config/rotator.toml
//!         │
//!         ▼
//!   ┌─────────────┐   candidates    ┌──────────────┐   probe × N    ┌──────────┐
//!   │   config    │────────────────▶│  selection   │───────────────▶│  health  │──▶ endpoints
//!   └─────────────┘                 └──────┬───────┘                └──────────┘
//!                                          │ fastest URL
//!                                          ▼
//!                                   ┌──────────────┐  RotationEvent ┌──────────┐
//!                                   │   rotation   │───────────────▶│  events  │──▶ subscribers
//!                                   │ ArcSwap<...> │                └──────────┘
//!                                   └──────┬───────┘
//!                                          │ active EndpointClient
//!                                          ▼
//!                                   ┌──────────────┐
//!                                   │  blockchain  │ fees, submission
//!                                   └──────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use rpc_rotator::blockchain::fees::FeeSource;
use rpc_rotator::blockchain::{ChainId, EndpointClient};
use rpc_rotator::config::{load_config, RotatorConfig};
use rpc_rotator::health::{JsonRpcLiveness, Prober};
use rpc_rotator::lifecycle::signals::wait_for_shutdown;
use rpc_rotator::observability::{logging, metrics};
use rpc_rotator::rotation::{RotationEvent, RotationManager};
use rpc_rotator::selection::EndpointSelector;

#[derive(Parser)]
#[command(name = "rpc-rotator")]
#[command(about = "Keep a connection to the fastest healthy JSON-RPC endpoint", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, global = true, default_value = "config/rotator.toml")]
    config: PathBuf,

    /// Chain ID to operate on (defaults to rotation.chain_id from the config).
    #[arg(long, global = true)]
    chain_id: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one selection round and print every probe result
    Select,
    /// Keep the fastest endpoint active and log every rotation until Ctrl+C
    Watch {
        /// Override the rotation interval in minutes.
        #[arg(long)]
        interval_mins: Option<u64>,
    },
    /// Select the fastest endpoint and print the fee parameters it reports
    Fees,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(chain_id) = cli.chain_id {
        config.rotation.chain_id = chain_id;
    }
    logging::init_logging(&config.observability);

    tracing::info!(
        config = %cli.config.display(),
        chain_id = config.rotation.chain_id,
        "rpc-rotator v0.1.0 starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    match cli.command {
        Commands::Select => select(&config).await?,
        Commands::Watch { interval_mins } => {
            if let Some(mins) = interval_mins {
                config.rotation.rotate_interval_mins = mins;
            }
            watch(&config).await?
        }
        Commands::Fees => fees(&config).await?,
    }

    Ok(())
}

async fn select(config: &RotatorConfig) -> Result<(), Box<dyn std::error::Error>> {
    let chain_id = ChainId(config.rotation.chain_id);
    let table = config.candidate_table()?;
    let candidates = table
        .urls_for(chain_id)
        .ok_or_else(|| format!("no candidates configured for chain {}", chain_id))?;

    let timeout = Duration::from_millis(config.rotation.probe_timeout_ms);
    let selector = EndpointSelector::new(Prober::new(Arc::new(JsonRpcLiveness::new(timeout)?), timeout));
    let round = selector.run_round(chain_id, candidates).await;

    for result in &round.results {
        println!(
            "{:<10} {:>6} ms  {}",
            if result.healthy { "healthy" } else { "unhealthy" },
            result.elapsed.as_millis(),
            result.url
        );
    }

    match round.winner() {
        Some(best) => {
            println!("best: {}", best.url);
            Ok(())
        }
        None => Err(format!("no healthy endpoint for chain {}", chain_id).into()),
    }
}

async fn watch(config: &RotatorConfig) -> Result<(), Box<dyn std::error::Error>> {
    let table = config.candidate_table()?;
    let manager = RotationManager::from_table(config.rotation.clone(), &table).await?;

    println!("active: {}", manager.active_url());
    manager.subscribe(|event: &RotationEvent| {
        println!("rotated: {} -> {}", event.previous.url(), event.new_url);
        Ok(())
    });

    wait_for_shutdown().await;
    manager.stop_and_wait().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn fees(config: &RotatorConfig) -> Result<(), Box<dyn std::error::Error>> {
    let table = config.candidate_table()?;
    let manager = RotationManager::from_table(config.rotation.clone(), &table).await?;
    let client: Arc<EndpointClient> = manager.active();
    manager.stop();

    client.verify_chain_id().await?;
    let data = client.fee_data().await?;
    println!("endpoint:                 {}", client.url());
    println!("gas_price:                {:?}", data.gas_price);
    println!("max_fee_per_gas:          {:?}", data.max_fee_per_gas);
    println!("max_priority_fee_per_gas: {:?}", data.max_priority_fee_per_gas);
    println!("applied:                  {:?}", data.preferred());
    Ok(())
}
