use async_trait::async_trait;
use eth_fee_oracle::FeeHistorySample;

use super::RpcError;

/// Trait for the network calls the fee oracle depends on
#[async_trait]
pub trait FeeHistorySource: Send + Sync {
    /// Test connection to the node
    async fn test_connection(&self) -> Result<u64, RpcError>;

    /// Fetch the last `block_count` blocks of fee history with tips at the
    /// given reward percentiles
    async fn fee_history(
        &self,
        block_count: u64,
        percentiles: &[f64],
    ) -> Result<FeeHistorySample, RpcError>;
}

/// Wrapper enum for real or mock client
pub enum FeeHistoryClient {
    Real(super::EthRpcClient),
    Mock(super::MockFeeHistoryClient),
}

#[async_trait]
impl FeeHistorySource for FeeHistoryClient {
    async fn test_connection(&self) -> Result<u64, RpcError> {
        match self {
            FeeHistoryClient::Real(client) => client.test_connection().await,
            FeeHistoryClient::Mock(client) => client.test_connection().await,
        }
    }

    async fn fee_history(
        &self,
        block_count: u64,
        percentiles: &[f64],
    ) -> Result<FeeHistorySample, RpcError> {
        match self {
            FeeHistoryClient::Real(client) => client.fee_history(block_count, percentiles).await,
            FeeHistoryClient::Mock(client) => client.fee_history(block_count, percentiles).await,
        }
    }
}
