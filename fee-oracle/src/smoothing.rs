use tracing::debug;

use crate::error::{FeeModelError, Result};
use crate::estimator_config::TierConfig;
use crate::internal::{mul_floor, RewardMatrix};

/// Derives robust priority fees from per-block percentile tips.
///
/// A single block's tip can be an outlier (one whale transaction), so each
/// tier uses the median of its percentile column across the whole lookback
/// window rather than the latest value.
pub struct PrioritySmoother;

impl PrioritySmoother {
    /// Returns the median tip paid at `percentile_index` across all blocks.
    ///
    /// For an even number of blocks the two middle values are averaged and
    /// the result truncated to an integer.
    ///
    /// # Example
    /// ```
    /// use eth_fee_oracle::PrioritySmoother;
    ///
    /// let rewards: Vec<Vec<u128>> = (1..=10).map(|tip| vec![tip]).collect();
    /// assert_eq!(PrioritySmoother::smooth(&rewards, 0).unwrap(), 5);
    /// ```
    pub fn smooth(rewards_per_block: &[Vec<u128>], percentile_index: usize) -> Result<u128> {
        let matrix = RewardMatrix::from_rows(rewards_per_block)?;
        Self::smooth_matrix(&matrix, percentile_index)
    }

    pub(crate) fn smooth_matrix(matrix: &RewardMatrix, percentile_index: usize) -> Result<u128> {
        if matrix.block_count() == 0 {
            return Err(FeeModelError::insufficient_data(
                "no historical blocks to smooth tips over",
            ));
        }

        let mut column = matrix.column(percentile_index)?.to_vec();
        median(&mut column).ok_or_else(|| {
            FeeModelError::insufficient_data("no historical blocks to smooth tips over")
        })
    }

    /// Raises tips so that every tier pays at least its configured increment
    /// over the tier before it.
    ///
    /// `tips[i]` belongs to `tiers[i]`. When both a tier and the one below it
    /// smoothed to zero, the upper tier is raised to its `zero_floor` instead,
    /// since a zero tip is not competitive.
    ///
    /// This overrides what the market data says: if urgent tips really were
    /// lower than standard ones in the window, that signal is replaced. The
    /// returned flags mark which tiers were raised so callers can surface it.
    pub fn enforce_tier_ordering(tips: &mut [u128], tiers: &[TierConfig]) -> Result<Vec<bool>> {
        if tips.len() != tiers.len() {
            return Err(FeeModelError::invalid_parameter(format!(
                "got {} tips for {} tiers",
                tips.len(),
                tiers.len()
            )));
        }

        let mut adjusted = vec![false; tips.len()];

        for i in 1..tips.len() {
            let lower = tips[i - 1];
            let tier = &tiers[i];

            let required = if lower == 0 {
                if tips[i] == 0 {
                    u128::from(tier.zero_floor)
                } else {
                    0
                }
            } else {
                mul_floor(lower, 1.0 + tier.min_increment_ratio)
            };

            if tips[i] < required {
                debug!(
                    "Raising {} tip from {} to {} to stay above {}",
                    tier.name,
                    tips[i],
                    required,
                    tiers[i - 1].name
                );
                tips[i] = required;
                adjusted[i] = true;
            }
        }

        Ok(adjusted)
    }
}

/// Median of a set of integers, averaging (and truncating) the two middle
/// values for even lengths.
fn median(values: &mut [u128]) -> Option<u128> {
    if values.is_empty() {
        return None;
    }

    values.sort_unstable();
    let mid = values.len() / 2;

    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        let (a, b) = (values[mid - 1], values[mid]);
        // Halve before adding to stay clear of overflow
        Some(a / 2 + b / 2 + (a % 2 + b % 2) / 2)
    }
}
