//! Command-line interface configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eth_fee_oracle::{FeeHistorySample, Preset};
use std::path::{Path, PathBuf};

use crate::config::AppConfig;

/// Default log filter when neither --log-filter nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "eth_fee_oracle_server=info,eth_fee_oracle=info";

/// EIP-1559 fee oracle
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file (overridden by CLI args)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    // JSON-RPC options
    /// Ethereum JSON-RPC URL
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    // Estimator options
    /// Estimator preset (conservative or wide)
    #[arg(long, global = true)]
    pub preset: Option<Preset>,

    /// Number of historical blocks to request
    #[arg(long, global = true)]
    pub block_count: Option<u64>,

    // Test mode
    /// Use a mock node with synthetic fee history
    #[arg(long, global = true)]
    pub test_mode: bool,

    // Logging
    /// Log filter (e.g., "eth_fee_oracle_server=debug,eth_fee_oracle=debug")
    #[arg(long, global = true)]
    pub log_filter: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Poll the node and serve recommendations over HTTP (default)
    Serve {
        /// Host to bind the server to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Fee history polling interval in seconds
        #[arg(long)]
        interval_secs: Option<u64>,
    },

    /// Fetch fee history once and print the recommendation table
    Estimate {
        /// Estimate offline from a saved eth_feeHistory response
        #[arg(long)]
        history_file: Option<PathBuf>,

        /// Print the HTTP API's JSON instead of a table
        #[arg(long)]
        json: bool,

        /// ETH price in USD, enables the cost column
        #[arg(long)]
        eth_price: Option<f64>,

        /// Gas limit used for the cost column
        #[arg(long)]
        gas_limit: Option<u64>,
    },

    /// Print the effective configuration as YAML
    ShowConfig,
}

impl Cli {
    /// The subcommand to run, `serve` when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve {
            host: None,
            port: None,
            interval_secs: None,
        })
    }

    /// Loads the layered configuration and applies CLI overrides on top
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => AppConfig::load().context("Failed to load configuration")?,
        };

        self.apply_overrides(&mut config);
        Ok(config)
    }

    /// Applies the flags that were given to an already loaded configuration
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(url) = &self.rpc_url {
            config.rpc.url = url.clone();
        }
        if let Some(preset) = self.preset {
            config.estimator.preset = preset;
            config.estimator.overrides = None;
        }
        if let Some(block_count) = self.block_count {
            config.collector.block_count = Some(block_count);
        }

        match self.command() {
            Command::Serve {
                host,
                port,
                interval_secs,
            } => {
                if let Some(host) = host {
                    config.server.host = host;
                }
                if let Some(port) = port {
                    config.server.port = port;
                }
                if let Some(secs) = interval_secs {
                    config.collector.interval_ms = secs.saturating_mul(1000);
                }
            }
            Command::Estimate {
                eth_price,
                gas_limit,
                ..
            } => {
                if eth_price.is_some() {
                    config.display.eth_price_usd = eth_price;
                }
                if let Some(gas_limit) = gas_limit {
                    config.display.gas_limit = gas_limit;
                }
            }
            Command::ShowConfig => {}
        }
    }

    /// Whether this run needs a reachable node
    pub fn needs_rpc(&self) -> bool {
        match self.command() {
            _ if self.test_mode => false,
            Command::Estimate {
                history_file: Some(_),
                ..
            } => false,
            Command::ShowConfig => false,
            _ => true,
        }
    }
}

/// Read a saved eth_feeHistory response, either the bare `result` object or
/// the whole JSON-RPC envelope
pub fn read_history_file(path: &Path) -> Result<FeeHistorySample> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fee history file: {}", path.display()))?;

    let value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("Fee history file is not JSON: {}", path.display()))?;
    let result = match value.get("result") {
        Some(result) => result.clone(),
        None => value,
    };

    FeeHistorySample::from_json(&result.to_string())
        .with_context(|| format!("Invalid fee history in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("eth-fee-oracle-server").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_default_command_is_serve() {
        let cli = parse(&[]);
        assert!(matches!(cli.command(), Command::Serve { .. }));
        assert!(cli.needs_rpc());
    }

    #[test]
    fn test_serve_overrides() {
        let cli = parse(&[
            "--rpc-url",
            "http://node:8545",
            "serve",
            "-p",
            "9000",
            "--interval-secs",
            "6",
        ]);
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.rpc.url, "http://node:8545");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.collector.interval_ms, 6000);
    }

    #[test]
    fn test_estimate_overrides() {
        let cli = parse(&[
            "estimate",
            "--preset",
            "conservative",
            "--eth-price",
            "2500",
            "--block-count",
            "20",
        ]);
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.estimator.preset, Preset::Conservative);
        assert_eq!(config.display.eth_price_usd, Some(2500.0));
        assert_eq!(config.collector.block_count, Some(20));
        assert!(cli.needs_rpc());
    }

    #[test]
    fn test_offline_runs_do_not_need_rpc() {
        assert!(!parse(&["estimate", "--history-file", "fees.json"]).needs_rpc());
        assert!(!parse(&["--test-mode"]).needs_rpc());
        assert!(!parse(&["show-config"]).needs_rpc());
    }

    #[test]
    fn test_unknown_preset_rejected() {
        assert!(Cli::try_parse_from(["eth-fee-oracle-server", "--preset", "aggressive"]).is_err());
    }

    #[test]
    fn test_read_history_file_envelope_and_bare() {
        let result = serde_json::json!({
            "oldestBlock": "0x10",
            "baseFeePerGas": ["0x64", "0x6e"],
            "gasUsedRatio": [0.5],
            "reward": [["0x1", "0x2"]]
        });

        let mut bare = tempfile::NamedTempFile::new().unwrap();
        write!(bare, "{}", result).unwrap();
        let sample = read_history_file(bare.path()).unwrap();
        assert_eq!(sample.base_fees_per_block, vec![100, 110]);

        let mut envelope = tempfile::NamedTempFile::new().unwrap();
        let body = serde_json::json!({ "jsonrpc": "2.0", "id": 1, "result": result });
        write!(envelope, "{}", body).unwrap();
        let sample = read_history_file(envelope.path()).unwrap();
        assert_eq!(sample.oldest_block, Some(16));
    }

    #[test]
    fn test_read_history_file_errors() {
        assert!(read_history_file(Path::new("/nonexistent/fees.json")).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"baseFeePerGas\": [\"0xzz\"], \"gasUsedRatio\": []}}").unwrap();
        assert!(read_history_file(file.path()).is_err());
    }
}
