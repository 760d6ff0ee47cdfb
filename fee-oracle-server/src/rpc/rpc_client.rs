use eth_fee_oracle::{parse_quantity, FeeHistorySample, FeeModelError, RawFeeHistory};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

/// Ethereum JSON-RPC configuration
#[derive(Debug, Clone)]
pub struct EthRpcConfig {
    pub url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

/// JSON-RPC error types
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("RPC error {code}: {message}")]
    RpcError { code: i64, message: String },

    #[error("Invalid response format")]
    InvalidResponse,

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid fee history: {0}")]
    InvalidSample(#[from] FeeModelError),
}

/// JSON-RPC client for fetching fee history from an Ethereum node
pub struct EthRpcClient {
    client: Client,
    config: EthRpcConfig,
    next_id: AtomicU64,
}

#[derive(Serialize)]
struct RpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: Vec<Value>,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorResponse>,
}

#[derive(Deserialize)]
struct RpcErrorResponse {
    code: i64,
    message: String,
}

impl EthRpcClient {
    /// Creates a new JSON-RPC client
    pub fn new(config: EthRpcConfig) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Fetches fee history for the last `block_count` blocks
    pub async fn fee_history(
        &self,
        block_count: u64,
        percentiles: &[f64],
    ) -> Result<FeeHistorySample, RpcError> {
        info!(
            "Fetching fee history for {} blocks at percentiles {:?}",
            block_count, percentiles
        );

        let result = self
            .call(
                "eth_feeHistory",
                vec![
                    json!(format!("0x{block_count:x}")),
                    json!("latest"),
                    json!(percentiles),
                ],
            )
            .await?;

        let raw: RawFeeHistory = serde_json::from_value(result)?;
        if raw.reward.is_none() {
            return Err(RpcError::MissingField("reward".to_string()));
        }

        let sample = FeeHistorySample::try_from(raw)?;
        debug!(
            "Fee history covers {} blocks starting at {:?}",
            sample.block_count(),
            sample.oldest_block
        );

        Ok(sample)
    }

    /// Tests the RPC connection and returns the latest block number
    pub async fn test_connection(&self) -> Result<u64, RpcError> {
        debug!("Testing JSON-RPC connection to {}", self.config.url);

        let result = self.call("eth_blockNumber", vec![]).await?;
        let hex = result.as_str().ok_or(RpcError::InvalidResponse)?;
        let block = parse_quantity(hex)?;
        let block = u64::try_from(block).map_err(|_| RpcError::InvalidResponse)?;

        info!("JSON-RPC connection successful, latest block {}", block);
        Ok(block)
    }

    async fn call(&self, method: &'static str, params: Vec<Value>) -> Result<Value, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .client
            .post(&self.config.url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            error!("{} request failed with status: {}", method, response.status());
            return Err(RpcError::InvalidResponse);
        }

        let body: RpcResponse = response.json().await?;

        if let Some(error) = body.error {
            return Err(RpcError::RpcError {
                code: error.code,
                message: error.message,
            });
        }

        match body.result {
            Some(Value::Null) | None => Err(RpcError::MissingField("result".to_string())),
            Some(result) => Ok(result),
        }
    }
}
