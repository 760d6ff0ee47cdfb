use serde::{Deserialize, Serialize};

use crate::error::{FeeModelError, Result};

/// A window of recent on-chain fee history, as returned by `eth_feeHistory`
/// once every quantity has been decoded.
///
/// All fee values are denominated in wei.
///
/// # Example
/// ```
/// use eth_fee_oracle::FeeHistorySample;
///
/// let sample = FeeHistorySample::new(
///     vec![100, 110, 120],          // two historical blocks + the next block
///     vec![vec![1, 2], vec![3, 4]], // tips at two percentiles per block
///     vec![0.4, 0.6],
/// ).unwrap();
///
/// assert_eq!(sample.block_count(), 2);
/// assert_eq!(sample.next_block_base_fee(), Some(120));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeHistorySample {
    /// Number of the oldest block in the window, when known
    pub oldest_block: Option<u64>,

    /// Base fee of every historical block followed by the base fee of the
    /// next (not yet produced) block
    pub base_fees_per_block: Vec<u128>,

    /// One row per historical block, one column per requested percentile
    pub rewards_per_block: Vec<Vec<u128>>,

    /// Fraction of each historical block's gas limit that was used
    pub gas_used_ratios: Vec<f64>,
}

impl FeeHistorySample {
    /// Creates a new sample, rejecting inputs that violate the structural invariants.
    pub fn new(
        base_fees_per_block: Vec<u128>,
        rewards_per_block: Vec<Vec<u128>>,
        gas_used_ratios: Vec<f64>,
    ) -> Result<Self> {
        let sample = Self {
            oldest_block: None,
            base_fees_per_block,
            rewards_per_block,
            gas_used_ratios,
        };
        sample.validate()?;
        Ok(sample)
    }

    /// Sets the number of the oldest block in the window.
    pub fn with_oldest_block(mut self, oldest_block: u64) -> Self {
        self.oldest_block = Some(oldest_block);
        self
    }

    /// Parses the `result` object of an `eth_feeHistory` response.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawFeeHistory = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    /// Number of historical blocks covered by the sample.
    pub fn block_count(&self) -> usize {
        self.gas_used_ratios.len()
    }

    /// The protocol-computed base fee of the next block.
    pub fn next_block_base_fee(&self) -> Option<u128> {
        self.base_fees_per_block.last().copied()
    }

    /// Base fees of the historical blocks only, oldest first.
    pub fn historical_base_fees(&self) -> &[u128] {
        let len = self.base_fees_per_block.len().saturating_sub(1);
        &self.base_fees_per_block[..len]
    }

    /// Checks the invariants that hold for every well-formed sample.
    pub fn validate(&self) -> Result<()> {
        if self.base_fees_per_block.is_empty() {
            return Err(FeeModelError::invalid_sample(
                "base fee sequence must not be empty",
            ));
        }

        let block_count = self.base_fees_per_block.len() - 1;
        if self.gas_used_ratios.len() != block_count {
            return Err(FeeModelError::invalid_sample(format!(
                "expected {} gas used ratios, got {}",
                block_count,
                self.gas_used_ratios.len()
            )));
        }
        if self.rewards_per_block.len() != block_count {
            return Err(FeeModelError::invalid_sample(format!(
                "expected {} reward rows, got {}",
                block_count,
                self.rewards_per_block.len()
            )));
        }

        if let Some(first) = self.rewards_per_block.first() {
            let width = first.len();
            if let Some((block, row)) = self
                .rewards_per_block
                .iter()
                .enumerate()
                .find(|(_, row)| row.len() != width)
            {
                return Err(FeeModelError::invalid_sample(format!(
                    "reward row {} has {} percentiles, expected {}",
                    block,
                    row.len(),
                    width
                )));
            }
        }

        if let Some(ratio) = self
            .gas_used_ratios
            .iter()
            .find(|r| !r.is_finite() || !(0.0..=1.0).contains(*r))
        {
            return Err(FeeModelError::invalid_sample(format!(
                "gas used ratio {ratio} is outside [0, 1]"
            )));
        }

        Ok(())
    }

    /// Checks the invariants and that every reward row carries exactly
    /// `percentile_count` values.
    pub fn validate_for_percentiles(&self, percentile_count: usize) -> Result<()> {
        self.validate()?;

        if let Some((block, row)) = self
            .rewards_per_block
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != percentile_count)
        {
            return Err(FeeModelError::invalid_sample(format!(
                "reward row {} has {} percentiles, {} were requested",
                block,
                row.len(),
                percentile_count
            )));
        }

        Ok(())
    }
}

/// The `result` object of an `eth_feeHistory` JSON-RPC response, with every
/// quantity still hex-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFeeHistory {
    #[serde(default)]
    pub oldest_block: Option<String>,
    pub base_fee_per_gas: Vec<String>,
    pub gas_used_ratio: Vec<f64>,
    #[serde(default)]
    pub reward: Option<Vec<Vec<String>>>,
}

impl TryFrom<RawFeeHistory> for FeeHistorySample {
    type Error = FeeModelError;

    fn try_from(raw: RawFeeHistory) -> Result<Self> {
        let base_fees_per_block = raw
            .base_fee_per_gas
            .iter()
            .map(|v| parse_quantity(v))
            .collect::<Result<Vec<_>>>()?;

        let rewards_per_block = raw
            .reward
            .ok_or_else(|| FeeModelError::invalid_sample("response has no reward field"))?
            .iter()
            .map(|row| row.iter().map(|v| parse_quantity(v)).collect())
            .collect::<Result<Vec<Vec<_>>>>()?;

        let mut sample = Self::new(base_fees_per_block, rewards_per_block, raw.gas_used_ratio)?;

        if let Some(oldest) = raw.oldest_block {
            let oldest = parse_quantity(&oldest)?;
            let oldest = u64::try_from(oldest).map_err(|_| {
                FeeModelError::malformed_quantity(format!("{oldest:#x}"), "block number exceeds u64")
            })?;
            sample = sample.with_oldest_block(oldest);
        }

        Ok(sample)
    }
}

/// Parses a JSON-RPC hex quantity such as `"0x3b9aca00"`.
pub fn parse_quantity(value: &str) -> Result<u128> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| FeeModelError::malformed_quantity(value, "missing 0x prefix"))?;

    if digits.is_empty() {
        return Err(FeeModelError::malformed_quantity(value, "no digits after prefix"));
    }
    // from_str_radix would also accept a leading '+'
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(FeeModelError::malformed_quantity(value, "invalid hex digit"));
    }

    u128::from_str_radix(digits, 16)
        .map_err(|e| FeeModelError::malformed_quantity(value, e.to_string()))
}
