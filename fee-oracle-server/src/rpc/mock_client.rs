use eth_fee_oracle::FeeHistorySample;

use super::RpcError;

const GWEI: u128 = 1_000_000_000;

/// Mock fee history client for testing and `--test-mode`
#[derive(Clone, Default)]
pub struct MockFeeHistoryClient {
    sample: Option<FeeHistorySample>,
}

impl MockFeeHistoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always returns the given sample, whatever was requested
    pub fn with_sample(sample: FeeHistorySample) -> Self {
        Self {
            sample: Some(sample),
        }
    }

    /// Test connection (always succeeds in mock mode)
    pub async fn test_connection(&self) -> Result<u64, RpcError> {
        Ok(19_000_000)
    }

    /// Returns the configured sample, or a synthetic window with a steadily
    /// rising base fee around 20 gwei and one tip column per percentile
    pub async fn fee_history(
        &self,
        block_count: u64,
        percentiles: &[f64],
    ) -> Result<FeeHistorySample, RpcError> {
        if let Some(sample) = &self.sample {
            return Ok(sample.clone());
        }

        let blocks = block_count as u128;
        let base_fees = (0..=blocks).map(|i| 20 * GWEI + i * GWEI / 10).collect();
        let rewards = (0..blocks)
            .map(|block| {
                percentiles
                    .iter()
                    .map(|p| (*p as u128) * GWEI / 50 + block * GWEI / 100)
                    .collect()
            })
            .collect();
        let ratios = (0..blocks).map(|i| 0.5 + (i % 3) as f64 * 0.05).collect();

        let sample = FeeHistorySample::new(base_fees, rewards, ratios)?;
        Ok(sample.with_oldest_block(19_000_000u64.saturating_sub(block_count)))
    }
}
