use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fmt;

use crate::error::{FeeModelError, Result};
use crate::internal::mul_floor;

/// How busy the network has been over the lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionLevel {
    /// Average utilization below the low threshold
    Low,
    /// Between the thresholds
    Normal,
    /// Average utilization above the high threshold
    High,
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CongestionLevel::Low => write!(f, "low"),
            CongestionLevel::Normal => write!(f, "normal"),
            CongestionLevel::High => write!(f, "high"),
        }
    }
}

/// Scales tips according to recent block utilization.
///
/// Every tip in a call is scaled by the same multiplier, chosen by comparing
/// the mean gas used ratio against two thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CongestionPolicy {
    /// Below this average utilization tips are discounted
    pub low_threshold: f64,
    /// Above this average utilization tips are boosted
    pub high_threshold: f64,
    /// Multiplier applied under low utilization (at most 1.0)
    pub discount_multiplier: f64,
    /// Multiplier applied under high utilization (at least 1.0)
    pub surge_multiplier: f64,
}

impl CongestionPolicy {
    /// Thresholds 0.30 / 0.80 with a 0.90 discount and 1.20 surge.
    pub fn conservative() -> Self {
        Self {
            low_threshold: 0.30,
            high_threshold: 0.80,
            discount_multiplier: 0.90,
            surge_multiplier: 1.20,
        }
    }

    /// Thresholds 0.45 / 0.80 with a 0.95 discount and 1.25 surge.
    pub fn wide() -> Self {
        Self {
            low_threshold: 0.45,
            high_threshold: 0.80,
            discount_multiplier: 0.95,
            surge_multiplier: 1.25,
        }
    }

    /// Checks that thresholds and multipliers are usable.
    pub fn validate(&self) -> Result<()> {
        let in_unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        if !in_unit(self.low_threshold) || !in_unit(self.high_threshold) {
            return Err(FeeModelError::invalid_config(
                "congestion thresholds must be between 0.0 and 1.0",
            ));
        }
        if self.low_threshold > self.high_threshold {
            return Err(FeeModelError::invalid_config(
                "low congestion threshold must not exceed the high threshold",
            ));
        }
        if !self.discount_multiplier.is_finite()
            || self.discount_multiplier <= 0.0
            || self.discount_multiplier > 1.0
        {
            return Err(FeeModelError::invalid_config(
                "discount multiplier must be in (0.0, 1.0]",
            ));
        }
        if !self.surge_multiplier.is_finite() || self.surge_multiplier < 1.0 {
            return Err(FeeModelError::invalid_config(
                "surge multiplier must be a finite value >= 1.0",
            ));
        }
        Ok(())
    }

    /// Mean of the gas used ratios.
    pub fn average_utilization(utilization_ratios: &[f64]) -> Result<f64> {
        if utilization_ratios.is_empty() {
            return Err(FeeModelError::insufficient_data(
                "no gas used ratios to measure congestion",
            ));
        }
        Ok(utilization_ratios.mean())
    }

    /// Classifies an average utilization and returns the multiplier to apply.
    pub fn classify(&self, avg_utilization: f64) -> (CongestionLevel, f64) {
        if avg_utilization < self.low_threshold {
            (CongestionLevel::Low, self.discount_multiplier)
        } else if avg_utilization > self.high_threshold {
            (CongestionLevel::High, self.surge_multiplier)
        } else {
            (CongestionLevel::Normal, 1.0)
        }
    }

    /// Scales every tip by the multiplier selected from the mean utilization,
    /// truncating to whole wei.
    ///
    /// # Example
    /// ```
    /// use eth_fee_oracle::CongestionPolicy;
    ///
    /// let policy = CongestionPolicy::wide();
    /// let tips = policy.adjust_for_congestion(&[100, 200], &[0.9, 0.8]).unwrap();
    /// assert_eq!(tips, vec![125, 250]);
    /// ```
    pub fn adjust_for_congestion(
        &self,
        tips: &[u128],
        utilization_ratios: &[f64],
    ) -> Result<Vec<u128>> {
        let avg = Self::average_utilization(utilization_ratios)?;
        let (_, multiplier) = self.classify(avg);
        Ok(Self::apply_multiplier(tips, multiplier))
    }

    pub(crate) fn apply_multiplier(tips: &[u128], multiplier: f64) -> Vec<u128> {
        if multiplier == 1.0 {
            return tips.to_vec();
        }
        tips.iter().map(|&tip| mul_floor(tip, multiplier)).collect()
    }
}

impl Default for CongestionPolicy {
    fn default() -> Self {
        Self::wide()
    }
}
