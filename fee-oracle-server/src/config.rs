use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use config::builder::DefaultState;
use eth_fee_oracle::{EstimatorConfig, FeeEstimator, Preset};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::rpc::EthRpcConfig;

/// Environment variables accepted as a shortcut for `rpc.url`, in priority order
pub const RPC_URL_SHORTCUTS: [&str; 2] = ["ETH_RPC_URL", "SEPOLIA_RPC_URL"];

/// Application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub rpc: RpcConfig,
    pub collector: CollectorConfig,
    pub estimator: EstimatorSettings,
    pub display: DisplayConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
    /// Port to listen on (default: 8080)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// JSON-RPC endpoint configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RpcConfig {
    /// Node URL, no default: it must be configured
    pub url: String,
    /// Request timeout in milliseconds (default: 10000)
    pub timeout_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_ms: 10_000,
        }
    }
}

/// Fee history polling configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CollectorConfig {
    /// Polling interval in milliseconds (default: 12000, one slot)
    pub interval_ms: u64,
    /// Number of historical blocks to request, overriding the estimator's
    #[serde(default)]
    pub block_count: Option<u64>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval_ms: 12_000,
            block_count: None,
        }
    }
}

/// Estimator selection: a named preset, or a full custom tier table
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct EstimatorSettings {
    #[serde(default)]
    pub preset: Preset,
    /// Replaces the preset entirely when present
    #[serde(default)]
    pub overrides: Option<EstimatorConfig>,
}

impl EstimatorSettings {
    pub fn estimator_config(&self) -> EstimatorConfig {
        self.overrides
            .clone()
            .unwrap_or_else(|| self.preset.config())
    }

    pub fn build_estimator(&self) -> eth_fee_oracle::Result<FeeEstimator> {
        FeeEstimator::with_config(self.estimator_config())
    }
}

/// Console output configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplayConfig {
    /// Gas limit used for the cost column (default: 21000, a plain transfer)
    pub gas_limit: u64,
    /// ETH price in USD; the cost column is only shown when set
    #[serde(default)]
    pub eth_price_usd: Option<f64>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            gas_limit: 21_000,
            eth_price_usd: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;

        // Load from config file if specified via environment variable
        if let Ok(config_file) = std::env::var("FEE_ORACLE_CONFIG_FILE") {
            builder = builder.add_source(File::from(Path::new(&config_file)));
        } else {
            // Try to load default config files
            builder = builder
                .add_source(File::with_name("config/default").required(false))
                .add_source(File::with_name("config").required(false));
        }

        Self::with_environment(builder)?.build()?.try_deserialize()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = Self::defaults()?.add_source(File::from(path.as_ref()));

        // Still allow environment overrides
        Self::with_environment(builder)?.build()?.try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("rpc.url", "")?
            .set_default("rpc.timeout_ms", 10_000)?
            .set_default("collector.interval_ms", 12_000)?
            .set_default("estimator.preset", "wide")?
            .set_default("display.gas_limit", 21_000)
    }

    fn with_environment(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        // FEE_ORACLE_SERVER__PORT=9090 overrides server.port
        let builder = builder.add_source(
            Environment::with_prefix("FEE_ORACLE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let shortcut = RPC_URL_SHORTCUTS
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()));

        builder.set_override_option("rpc.url", shortcut)
    }

    /// Validates everything, including the RPC endpoint
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_rpc()?;
        self.validate_offline()
    }

    /// Validates everything except the RPC endpoint, for runs that never
    /// contact a node
    pub fn validate_offline(&self) -> Result<(), ConfigError> {
        if self.collector.interval_ms == 0 {
            return Err(ConfigError::Message(
                "collector.interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.collector.block_count == Some(0) {
            return Err(ConfigError::Message(
                "collector.block_count must be at least 1".to_string(),
            ));
        }
        if self.display.eth_price_usd.is_some_and(|p| !p.is_finite() || p < 0.0) {
            return Err(ConfigError::Message(
                "display.eth_price_usd must be a non-negative number".to_string(),
            ));
        }

        self.estimator
            .estimator_config()
            .validate()
            .map_err(|e| ConfigError::Message(format!("estimator: {e}")))
    }

    fn validate_rpc(&self) -> Result<(), ConfigError> {
        let url = self.rpc.url.trim();
        if url.is_empty() {
            return Err(ConfigError::Message(format!(
                "RPC URL is not set (use rpc.url, FEE_ORACLE_RPC__URL or {})",
                RPC_URL_SHORTCUTS.join(" / ")
            )));
        }

        let parsed = Url::parse(url)
            .map_err(|e| ConfigError::Message(format!("Invalid RPC URL {url:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Message(format!(
                "Unsupported RPC URL scheme: {}",
                parsed.scheme()
            )));
        }

        if self.rpc.timeout_ms == 0 {
            return Err(ConfigError::Message(
                "rpc.timeout_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Convert to the JSON-RPC client config
    pub fn to_rpc_config(&self) -> EthRpcConfig {
        EthRpcConfig {
            url: self.rpc.url.trim().to_string(),
            timeout_ms: self.rpc.timeout_ms,
        }
    }
}
