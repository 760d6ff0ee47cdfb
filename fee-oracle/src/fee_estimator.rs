use chrono::Utc;
use tracing::debug;

use crate::{
    congestion::CongestionPolicy,
    drift::DriftProjector,
    error::{FeeModelError, Result},
    estimator_config::{EstimatorConfig, Preset},
    fee_estimate::{BaseFeeTrend, FeeEstimate, FeeRecommendation},
    internal::{mul_floor, RewardMatrix},
    smoothing::PrioritySmoother,
    FeeHistorySample,
};

/// The main entry point for calculating EIP-1559 fee recommendations.
///
/// FeeEstimator is a pure function of its input: it keeps no state between
/// calls and can be shared freely between threads.
///
/// # Example
/// ```
/// use eth_fee_oracle::{FeeEstimator, FeeHistorySample, Preset};
///
/// let estimator = FeeEstimator::from_preset(Preset::Conservative);
///
/// // Normally the result of eth_feeHistory(10, "latest", [30, 50, 70])
/// let sample = FeeHistorySample::new(
///     vec![100, 110, 120, 130],
///     vec![vec![1, 2, 3], vec![2, 3, 4], vec![3, 4, 5]],
///     vec![0.4, 0.5, 0.6],
/// ).unwrap();
///
/// let estimate = estimator.estimate(&sample).unwrap();
/// for rec in &estimate.recommendations {
///     println!("{}: maxFeePerGas={} maxPriorityFeePerGas={}",
///         rec.tier, rec.max_fee_per_gas, rec.suggested_priority_fee);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FeeEstimator {
    config: EstimatorConfig,
    projector: DriftProjector,
}

impl FeeEstimator {
    /// Creates a new FeeEstimator with the default (wide) preset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a FeeEstimator from one of the named presets.
    pub fn from_preset(preset: Preset) -> Self {
        let config = preset.config();
        Self {
            projector: DriftProjector::new(config.growth_factor).unwrap_or_default(),
            config,
        }
    }

    /// Creates a new FeeEstimator with custom settings.
    ///
    /// # Arguments
    /// * `config` - Tier definitions, requested percentiles, growth factor
    ///   and congestion policy; validated before use
    pub fn with_config(config: EstimatorConfig) -> Result<Self> {
        config.validate()?;
        let projector = DriftProjector::new(config.growth_factor)?;
        Ok(Self { config, projector })
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Number of historical blocks to request from the network.
    pub fn block_count(&self) -> u64 {
        self.config.block_count
    }

    /// Reward percentiles to request from the network, in column order.
    pub fn percentiles(&self) -> &[f64] {
        &self.config.percentiles
    }

    /// Calculates a recommendation for every configured tier.
    ///
    /// The sample must carry one reward column per configured percentile.
    /// Any invariant violation fails the whole estimation; no partial
    /// result is produced.
    pub fn estimate(&self, sample: &FeeHistorySample) -> Result<FeeEstimate> {
        let (next_base_fee, matrix) = self.prepare(sample)?;
        let tiers = &self.config.tiers;

        let mut tips = tiers
            .iter()
            .map(|tier| PrioritySmoother::smooth_matrix(&matrix, tier.percentile_index))
            .collect::<Result<Vec<_>>>()?;

        let ordering_adjusted = PrioritySmoother::enforce_tier_ordering(&mut tips, tiers)?;

        let avg_utilization = CongestionPolicy::average_utilization(&sample.gas_used_ratios)?;
        let (congestion, multiplier) = self.config.congestion.classify(avg_utilization);
        debug!(
            "Average utilization {:.3} is {}, scaling tips by {}",
            avg_utilization, congestion, multiplier
        );
        let tips = CongestionPolicy::apply_multiplier(&tips, multiplier);

        let recommendations = tiers
            .iter()
            .zip(tips)
            .zip(ordering_adjusted)
            .map(|((tier, tip), adjusted)| {
                let projected = self.projector.project(next_base_fee, tier.blocks_ahead)?;
                Ok(FeeRecommendation {
                    tier: tier.name.clone(),
                    blocks_ahead: tier.blocks_ahead,
                    percentile: self.config.percentiles[tier.percentile_index],
                    expected_wait: tier.expected_wait.clone(),
                    projected_base_fee: projected,
                    suggested_priority_fee: tip,
                    max_fee_per_gas: projected.saturating_add(tip),
                    ordering_adjusted: adjusted,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FeeEstimate {
            recommendations,
            next_block_base_fee: next_base_fee,
            avg_utilization,
            congestion,
            congestion_multiplier: multiplier,
            trend: BaseFeeTrend::from_base_fees(sample.historical_base_fees()),
            oldest_block: sample.oldest_block,
            timestamp: Utc::now(),
        })
    }

    /// Calculates a single recommendation from one percentile column.
    ///
    /// No tier-ordering pass is applied since there is no tier to compare
    /// against; the congestion multiplier still is. The base fee cap follows
    /// the configured [`SingleTierCap`](crate::SingleTierCap).
    pub fn estimate_single(
        &self,
        sample: &FeeHistorySample,
        percentile_index: usize,
        blocks_ahead: i64,
    ) -> Result<FeeRecommendation> {
        let (next_base_fee, matrix) = self.prepare(sample)?;

        let percentile = *self.config.percentiles.get(percentile_index).ok_or_else(|| {
            FeeModelError::invalid_parameter(format!(
                "percentile index {} out of range for {} percentiles",
                percentile_index,
                self.config.percentiles.len()
            ))
        })?;

        let drift = self.projector.project(next_base_fee, blocks_ahead)?;
        let avg_utilization = CongestionPolicy::average_utilization(&sample.gas_used_ratios)?;
        let trend = BaseFeeTrend::from_base_fees(sample.historical_base_fees());

        let projected = match self.config.single_tier_cap.multiplier(trend, avg_utilization) {
            Some(multiplier) => {
                debug!(
                    "Base fee is {} at {:.3} utilization, capping at {}x",
                    trend, avg_utilization, multiplier
                );
                mul_floor(next_base_fee, multiplier)
            }
            None => drift,
        };

        let tip = PrioritySmoother::smooth_matrix(&matrix, percentile_index)?;
        let (_, multiplier) = self.config.congestion.classify(avg_utilization);
        let tip = CongestionPolicy::apply_multiplier(&[tip], multiplier)[0];

        Ok(FeeRecommendation {
            tier: format!("p{percentile}"),
            blocks_ahead,
            percentile,
            expected_wait: None,
            projected_base_fee: projected,
            suggested_priority_fee: tip,
            max_fee_per_gas: projected.saturating_add(tip),
            ordering_adjusted: false,
        })
    }

    /// Validates a sample against this estimator's percentiles.
    fn prepare(&self, sample: &FeeHistorySample) -> Result<(u128, RewardMatrix)> {
        sample.validate_for_percentiles(self.config.percentiles.len())?;

        if sample.block_count() == 0 {
            return Err(FeeModelError::insufficient_data(
                "fee history contains no historical blocks",
            ));
        }

        let next_base_fee = sample
            .next_block_base_fee()
            .ok_or_else(|| FeeModelError::invalid_sample("base fee sequence must not be empty"))?;
        let matrix = RewardMatrix::from_rows(&sample.rewards_per_block)?;

        Ok((next_base_fee, matrix))
    }
}

impl Default for FeeEstimator {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}
