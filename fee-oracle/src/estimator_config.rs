use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::congestion::CongestionPolicy;
use crate::drift::DriftProjector;
use crate::error::{FeeModelError, Result};
use crate::fee_estimate::BaseFeeTrend;

const GWEI: u64 = 1_000_000_000;

/// One urgency tier of the recommendation table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Display name, e.g. "Standard"
    pub name: String,

    /// Number of consecutive full blocks the fee cap must survive
    pub blocks_ahead: i64,

    /// Index into the requested percentile list for this tier's tip
    pub percentile_index: usize,

    /// Minimum relative increase over the previous tier's tip
    #[serde(default)]
    pub min_increment_ratio: f64,

    /// Tip (wei) used when this tier and the one below both smooth to zero
    #[serde(default)]
    pub zero_floor: u64,

    /// Human readable inclusion time, e.g. "<30 secs"
    #[serde(default)]
    pub expected_wait: Option<String>,
}

impl TierConfig {
    pub fn new(name: impl Into<String>, blocks_ahead: i64, percentile_index: usize) -> Self {
        Self {
            name: name.into(),
            blocks_ahead,
            percentile_index,
            min_increment_ratio: 0.0,
            zero_floor: 0,
            expected_wait: None,
        }
    }

    pub fn with_min_increment(mut self, ratio: f64, zero_floor: u64) -> Self {
        self.min_increment_ratio = ratio;
        self.zero_floor = zero_floor;
        self
    }

    pub fn with_expected_wait(mut self, wait: impl Into<String>) -> Self {
        self.expected_wait = Some(wait.into());
        self
    }
}

/// How the single-tier estimate sets its base fee cap.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SingleTierCap {
    /// `floor(next_base * growth_factor ^ blocks_ahead)`, as for tiers
    #[default]
    Drift,

    /// `next_base * rising`, or `next_base * calm` when the base fee is not
    /// rising and average utilization is below `calm_utilization`
    TrendMultiplier {
        rising: f64,
        calm: f64,
        calm_utilization: f64,
    },
}

impl SingleTierCap {
    /// Doubles the base fee, or takes 1.5x on a quiet, non-rising network.
    pub fn trend_multiplier() -> Self {
        SingleTierCap::TrendMultiplier {
            rising: 2.0,
            calm: 1.5,
            calm_utilization: 0.5,
        }
    }

    /// The base fee multiplier for the given conditions, `None` for drift.
    pub fn multiplier(&self, trend: BaseFeeTrend, avg_utilization: f64) -> Option<f64> {
        match *self {
            SingleTierCap::Drift => None,
            SingleTierCap::TrendMultiplier {
                rising,
                calm,
                calm_utilization,
            } => {
                if trend != BaseFeeTrend::Rising && avg_utilization < calm_utilization {
                    Some(calm)
                } else {
                    Some(rising)
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let SingleTierCap::TrendMultiplier {
            rising,
            calm,
            calm_utilization,
        } = *self
        {
            if !rising.is_finite() || !calm.is_finite() || rising < 1.0 || calm < 1.0 {
                return Err(FeeModelError::invalid_config(format!(
                    "single tier cap multipliers must be finite and >= 1.0, got rising={rising} calm={calm}"
                )));
            }
            if !(0.0..=1.0).contains(&calm_utilization) {
                return Err(FeeModelError::invalid_config(format!(
                    "calm_utilization must be in [0, 1], got {calm_utilization}"
                )));
            }
        }
        Ok(())
    }
}

/// Everything the estimator needs to turn fee history into recommendations.
///
/// The tier list is ordered from cheapest to most urgent; the tier-ordering
/// pass and the output both follow this order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Maximum per-block base fee growth ratio
    #[serde(default = "default_growth_factor")]
    pub growth_factor: f64,

    /// Number of historical blocks to request
    #[serde(default = "default_block_count")]
    pub block_count: u64,

    /// Reward percentiles to request, ascending, each in [0, 100]
    pub percentiles: Vec<f64>,

    pub tiers: Vec<TierConfig>,

    #[serde(default)]
    pub congestion: CongestionPolicy,

    /// Cap policy for [`FeeEstimator::estimate_single`](crate::FeeEstimator::estimate_single)
    #[serde(default)]
    pub single_tier_cap: SingleTierCap,
}

fn default_growth_factor() -> f64 {
    DriftProjector::EIP1559_GROWTH_FACTOR
}

fn default_block_count() -> u64 {
    10
}

impl EstimatorConfig {
    /// Validates the configuration as a whole.
    pub fn validate(&self) -> Result<()> {
        DriftProjector::new(self.growth_factor)?;
        self.congestion.validate()?;
        self.single_tier_cap.validate()?;

        if self.block_count == 0 {
            return Err(FeeModelError::invalid_config(
                "block count must be at least 1",
            ));
        }
        if self.percentiles.is_empty() {
            return Err(FeeModelError::invalid_config(
                "At least one percentile must be provided",
            ));
        }
        if self
            .percentiles
            .iter()
            .any(|p| !p.is_finite() || !(0.0..=100.0).contains(p))
        {
            return Err(FeeModelError::invalid_config(
                "All percentiles must be between 0 and 100",
            ));
        }
        if self.percentiles.windows(2).any(|w| w[0] > w[1]) {
            return Err(FeeModelError::invalid_config(
                "Percentiles must be in ascending order",
            ));
        }
        if self.tiers.is_empty() {
            return Err(FeeModelError::invalid_config(
                "At least one tier must be provided",
            ));
        }

        let mut names = HashSet::new();
        for tier in &self.tiers {
            if !names.insert(tier.name.as_str()) {
                return Err(FeeModelError::invalid_config(format!(
                    "Duplicate tier name: {}",
                    tier.name
                )));
            }
            if tier.blocks_ahead < 0 {
                return Err(FeeModelError::invalid_config(format!(
                    "Tier {} has negative blocks_ahead",
                    tier.name
                )));
            }
            if tier.percentile_index >= self.percentiles.len() {
                return Err(FeeModelError::invalid_config(format!(
                    "Tier {} references percentile index {} but only {} percentiles are requested",
                    tier.name,
                    tier.percentile_index,
                    self.percentiles.len()
                )));
            }
            if !tier.min_increment_ratio.is_finite() || tier.min_increment_ratio < 0.0 {
                return Err(FeeModelError::invalid_config(format!(
                    "Tier {} has an invalid min_increment_ratio",
                    tier.name
                )));
            }
        }

        Ok(())
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Preset::default().config()
    }
}

/// Named estimator tunings.
///
/// Two tunings are in use and neither is considered canonical, so both are
/// kept side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Three tiers over the 30/50/70 percentiles, congestion 0.30/0.80
    Conservative,
    /// Four tiers over the 30/60/75/90 percentiles, congestion 0.45/0.80
    #[default]
    Wide,
}

impl Preset {
    pub fn config(self) -> EstimatorConfig {
        match self {
            Preset::Conservative => EstimatorConfig {
                growth_factor: default_growth_factor(),
                block_count: default_block_count(),
                percentiles: vec![30.0, 50.0, 70.0],
                tiers: vec![
                    TierConfig::new("Saver", 2, 0).with_expected_wait("~3 mins"),
                    TierConfig::new("Standard", 4, 1)
                        .with_min_increment(0.20, GWEI)
                        .with_expected_wait("<30 secs"),
                    TierConfig::new("Urgent", 6, 2)
                        .with_min_increment(0.20, GWEI + GWEI / 2)
                        .with_expected_wait("<15 secs"),
                ],
                congestion: CongestionPolicy::conservative(),
                single_tier_cap: SingleTierCap::Drift,
            },
            Preset::Wide => EstimatorConfig {
                growth_factor: default_growth_factor(),
                block_count: default_block_count(),
                percentiles: vec![30.0, 60.0, 75.0, 90.0],
                tiers: vec![
                    TierConfig::new("Saver", 2, 0).with_expected_wait("~3 mins"),
                    TierConfig::new("Standard", 4, 1)
                        .with_min_increment(0.20, GWEI)
                        .with_expected_wait("<30 secs"),
                    TierConfig::new("Recommended", 6, 2)
                        .with_min_increment(0.15, GWEI)
                        .with_expected_wait("<10 secs"),
                    TierConfig::new("Urgent", 10, 3)
                        .with_min_increment(0.20, GWEI + GWEI / 2)
                        .with_expected_wait("<5 secs"),
                ],
                congestion: CongestionPolicy::wide(),
                single_tier_cap: SingleTierCap::Drift,
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Conservative => write!(f, "conservative"),
            Preset::Wide => write!(f, "wide"),
        }
    }
}

impl FromStr for Preset {
    type Err = FeeModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(Preset::Conservative),
            "wide" => Ok(Preset::Wide),
            other => Err(FeeModelError::invalid_config(format!(
                "Unknown preset: {other} (expected conservative or wide)"
            ))),
        }
    }
}
