use eth_fee_oracle::{FeeEstimate, FeeEstimator, FeeModelError};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::rpc::{FeeHistorySource, RpcError};

/// Fee collector errors
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("RPC error: {0}")]
    RpcError(#[from] RpcError),

    #[error("Estimation error: {0}")]
    EstimationError(#[from] FeeModelError),
}

/// Service that periodically fetches fee history and recalculates the
/// recommendations served by the API
pub struct FeeCollector {
    source: Arc<dyn FeeHistorySource>,
    fee_estimator: Arc<FeeEstimator>,
    block_count: u64,
    latest_estimate: Arc<RwLock<Option<FeeEstimate>>>,
}

impl FeeCollector {
    /// Creates a new collector requesting the estimator's configured window
    pub fn new(source: impl FeeHistorySource + 'static, fee_estimator: FeeEstimator) -> Self {
        Self {
            source: Arc::new(source),
            block_count: fee_estimator.block_count(),
            fee_estimator: Arc::new(fee_estimator),
            latest_estimate: Arc::new(RwLock::new(None)),
        }
    }

    /// Overrides the number of historical blocks requested per poll
    pub fn with_block_count(mut self, block_count: u64) -> Self {
        self.block_count = block_count;
        self
    }

    pub fn block_count(&self) -> u64 {
        self.block_count
    }

    pub fn fee_estimator(&self) -> &FeeEstimator {
        &self.fee_estimator
    }

    /// Polls the node every `interval_ms` until the task is dropped.
    ///
    /// Failed polls are logged and the previous estimate is kept.
    pub async fn start(&self, interval_ms: u64) {
        let mut interval = interval(Duration::from_millis(interval_ms));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Starting fee collector with {}ms interval", interval_ms);

        // The first tick completes immediately
        interval.tick().await;
        if let Err(e) = self.update_fee_estimates().await {
            warn!("Initial fee estimate update failed: {}", e);
        }

        loop {
            interval.tick().await;

            if let Err(e) = self.update_fee_estimates().await {
                // The previous estimate stays in place until a poll succeeds
                error!("Failed to update fee estimates: {}", e);
            }
        }
    }

    /// Fetches fresh fee history and replaces the latest estimate
    pub async fn update_fee_estimates(&self) -> Result<FeeEstimate, CollectorError> {
        debug!("Updating fee estimates");

        let sample = self
            .source
            .fee_history(self.block_count, self.fee_estimator.percentiles())
            .await?;

        let estimate = self.fee_estimator.estimate(&sample)?;
        info!(
            "Calculated {} tier recommendations, next base fee {} wei, congestion {}",
            estimate.recommendations.len(),
            estimate.next_block_base_fee,
            estimate.congestion
        );

        let mut latest = self.latest_estimate.write().await;
        *latest = Some(estimate.clone());

        Ok(estimate)
    }

    /// Gets the latest fee estimate
    pub async fn get_latest_estimate(&self) -> Option<FeeEstimate> {
        self.latest_estimate.read().await.clone()
    }

    /// Tests the JSON-RPC connection
    pub async fn test_connection(&self) -> Result<u64, CollectorError> {
        Ok(self.source.test_connection().await?)
    }
}

#[cfg(test)]
#[path = "fee_collector_tests.rs"]
mod tests;
