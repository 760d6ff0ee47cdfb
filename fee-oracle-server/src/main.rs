//! Eth Fee Oracle Server - HTTP API and CLI for EIP-1559 fee estimation

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use eth_fee_oracle_server::{
    api::transform_fee_estimate,
    cli::{read_history_file, Cli, Command, DEFAULT_LOG_FILTER},
    config::AppConfig,
    output::render_table,
    rpc::{EthRpcClient, FeeHistoryClient, MockFeeHistoryClient},
    server::run_server,
    service::FeeCollector,
};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is not an error
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing to stderr, stdout is reserved for command output
    let filter = match &cli.log_filter {
        Some(filter) => EnvFilter::try_new(filter).context("Invalid --log-filter")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();

    let config = cli.load_config()?;
    if cli.needs_rpc() {
        config.validate().context("Invalid configuration")?;
    } else {
        config.validate_offline().context("Invalid configuration")?;
    }

    match cli.command() {
        Command::Serve { .. } => serve(config, cli.test_mode).await,
        Command::Estimate {
            history_file, json, ..
        } => {
            let estimate = match history_file {
                Some(path) => {
                    let sample = read_history_file(&path)?;
                    let estimator = config
                        .estimator
                        .build_estimator()
                        .context("Invalid estimator configuration")?;
                    estimator
                        .estimate(&sample)
                        .context("Failed to calculate fee estimates")?
                }
                None => create_collector(&config, cli.test_mode)?
                    .update_fee_estimates()
                    .await
                    .context("Failed to calculate fee estimates")?,
            };

            if json {
                let response = transform_fee_estimate(estimate);
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print!("{}", render_table(&estimate, &config.display));
            }
            Ok(())
        }
        Command::ShowConfig => {
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
    }
}

fn create_collector(config: &AppConfig, test_mode: bool) -> Result<FeeCollector> {
    let client = if test_mode {
        info!("Running in test mode with synthetic fee history");
        FeeHistoryClient::Mock(MockFeeHistoryClient::new())
    } else {
        FeeHistoryClient::Real(
            EthRpcClient::new(config.to_rpc_config()).context("Failed to create RPC client")?,
        )
    };

    let fee_estimator = config
        .estimator
        .build_estimator()
        .context("Invalid estimator configuration")?;

    let mut collector = FeeCollector::new(client, fee_estimator);
    if let Some(block_count) = config.collector.block_count {
        collector = collector.with_block_count(block_count);
    }
    Ok(collector)
}

async fn serve(config: AppConfig, test_mode: bool) -> Result<()> {
    info!("Eth Fee Oracle Server starting...");

    info!("Configuration loaded:");
    info!("  Server: {}:{}", config.server.host, config.server.port);
    info!("  RPC: {}", if test_mode { "mock" } else { config.rpc.url.as_str() });
    info!("  Preset: {}", config.estimator.preset);
    info!("  Collection interval: {}ms", config.collector.interval_ms);

    let collector = Arc::new(create_collector(&config, test_mode)?);

    match collector.test_connection().await {
        Ok(block) => info!("Connected to node at block {}", block),
        Err(e) => {
            error!("Failed to connect to node: {}", e);
            warn!("Continuing anyway, the collector will try again on every tick");
        }
    }

    // Spawn background collection task
    let collector_handle = collector.clone();
    let interval_ms = config.collector.interval_ms;
    tokio::spawn(async move { collector_handle.start(interval_ms).await });

    run_server(collector, config.server.host, config.server.port)
        .await
        .context("Failed to run HTTP server")?;

    info!("Eth Fee Oracle Server shut down");

    Ok(())
}
