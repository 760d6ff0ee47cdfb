use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::congestion::CongestionLevel;

/// Wei per gwei, used for display only.
pub const WEI_PER_GWEI: f64 = 1e9;

/// Fee parameters recommended for one urgency tier.
///
/// All fees are in wei. `max_fee_per_gas` is always
/// `projected_base_fee + suggested_priority_fee`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeRecommendation {
    /// Tier name, e.g. "Standard"
    pub tier: String,

    /// Number of consecutive full blocks the fee cap survives
    pub blocks_ahead: i64,

    /// Reward percentile the tip was derived from
    pub percentile: f64,

    /// Human readable inclusion time, if configured
    pub expected_wait: Option<String>,

    /// Base fee after `blocks_ahead` blocks of maximum growth
    pub projected_base_fee: u128,

    /// Smoothed, congestion-adjusted tip (`maxPriorityFeePerGas`)
    pub suggested_priority_fee: u128,

    /// Fee cap (`maxFeePerGas`)
    pub max_fee_per_gas: u128,

    /// Whether the tip was raised to keep this tier above the previous one
    pub ordering_adjusted: bool,
}

/// Direction of the base fee over the most recent historical blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseFeeTrend {
    Rising,
    Falling,
    Flat,
}

impl BaseFeeTrend {
    /// Number of trailing historical blocks compared.
    pub const WINDOW: usize = 5;

    /// Compares the first and last of the trailing [`Self::WINDOW`] base fees.
    pub fn from_base_fees(historical_base_fees: &[u128]) -> Self {
        let start = historical_base_fees.len().saturating_sub(Self::WINDOW);
        let recent = &historical_base_fees[start..];

        match (recent.first(), recent.last()) {
            (Some(first), Some(last)) if last > first => BaseFeeTrend::Rising,
            (Some(first), Some(last)) if last < first => BaseFeeTrend::Falling,
            _ => BaseFeeTrend::Flat,
        }
    }
}

impl fmt::Display for BaseFeeTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseFeeTrend::Rising => write!(f, "rising"),
            BaseFeeTrend::Falling => write!(f, "falling"),
            BaseFeeTrend::Flat => write!(f, "flat"),
        }
    }
}

/// The result of one estimation: a recommendation per configured tier plus
/// the network conditions they were derived from.
///
/// # Example
/// ```
/// use eth_fee_oracle::{FeeEstimator, FeeHistorySample};
///
/// let sample = FeeHistorySample::new(
///     vec![100, 110, 120, 130],
///     vec![vec![1, 2, 3, 4], vec![1, 2, 3, 4], vec![1, 2, 3, 4]],
///     vec![0.5, 0.5, 0.5],
/// ).unwrap();
///
/// let estimate = FeeEstimator::new().estimate(&sample).unwrap();
/// let standard = estimate.get_tier("Standard").unwrap();
/// assert_eq!(standard.max_fee_per_gas, standard.projected_base_fee + standard.suggested_priority_fee);
///
/// // Print a formatted table of all tiers
/// println!("{}", estimate);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeEstimate {
    /// One recommendation per tier, in configured order
    pub recommendations: Vec<FeeRecommendation>,

    /// Protocol-computed base fee of the next block
    pub next_block_base_fee: u128,

    /// Mean gas used ratio over the window
    pub avg_utilization: f64,

    pub congestion: CongestionLevel,

    /// Multiplier applied to every tip
    pub congestion_multiplier: f64,

    pub trend: BaseFeeTrend,

    /// Oldest block of the fee history window, when known
    pub oldest_block: Option<u64>,

    /// When this estimate was calculated
    pub timestamp: DateTime<Utc>,
}

impl FeeEstimate {
    /// Gets the recommendation for a tier by name (case-insensitive).
    pub fn get_tier(&self, name: &str) -> Option<&FeeRecommendation> {
        self.recommendations
            .iter()
            .find(|r| r.tier.eq_ignore_ascii_case(name))
    }

    /// Returns the tier names in configured order.
    pub fn tier_names(&self) -> Vec<&str> {
        self.recommendations.iter().map(|r| r.tier.as_str()).collect()
    }
}

/// Formats a wei amount as gwei with the given number of decimals.
pub fn format_gwei(wei: u128, decimals: usize) -> String {
    format!("{:.*}", decimals, wei as f64 / WEI_PER_GWEI)
}

impl fmt::Display for FeeEstimate {
    /// Renders the congestion summary followed by one row per tier.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Congestion: {:.1}% ({}), base fee {}",
            self.avg_utilization * 100.0,
            self.congestion,
            self.trend
        )?;
        writeln!(
            f,
            "Next block base fee: {} gwei",
            format_gwei(self.next_block_base_fee, 4)
        )?;

        if self.recommendations.is_empty() {
            return Ok(());
        }

        writeln!(
            f,
            "{:<12} | {:<10} | {:>14} | {:>15}",
            "TIER", "WAIT", "MAX FEE (gwei)", "PRIORITY (gwei)"
        )?;
        for rec in &self.recommendations {
            writeln!(
                f,
                "{:<12} | {:<10} | {:>14} | {:>15}",
                rec.tier.to_uppercase(),
                rec.expected_wait.as_deref().unwrap_or("-"),
                format_gwei(rec.max_fee_per_gas, 2),
                format_gwei(rec.suggested_priority_fee, 2)
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recommendation(tier: &str, tip: u128, base: u128) -> FeeRecommendation {
        FeeRecommendation {
            tier: tier.to_string(),
            blocks_ahead: 2,
            percentile: 50.0,
            expected_wait: Some("<30 secs".to_string()),
            projected_base_fee: base,
            suggested_priority_fee: tip,
            max_fee_per_gas: base + tip,
            ordering_adjusted: false,
        }
    }

    fn estimate(recommendations: Vec<FeeRecommendation>) -> FeeEstimate {
        FeeEstimate {
            recommendations,
            next_block_base_fee: 12_000_000_000,
            avg_utilization: 0.5,
            congestion: CongestionLevel::Normal,
            congestion_multiplier: 1.0,
            trend: BaseFeeTrend::Flat,
            oldest_block: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_trend() {
        assert_eq!(BaseFeeTrend::from_base_fees(&[]), BaseFeeTrend::Flat);
        assert_eq!(BaseFeeTrend::from_base_fees(&[5]), BaseFeeTrend::Flat);
        assert_eq!(BaseFeeTrend::from_base_fees(&[1, 2, 3]), BaseFeeTrend::Rising);
        assert_eq!(BaseFeeTrend::from_base_fees(&[3, 2, 1]), BaseFeeTrend::Falling);
        // Only the last five blocks count
        assert_eq!(
            BaseFeeTrend::from_base_fees(&[1, 9, 8, 7, 6, 9]),
            BaseFeeTrend::Flat
        );
    }

    #[test]
    fn test_get_tier() {
        let estimate = estimate(vec![
            recommendation("Saver", 1, 10),
            recommendation("Urgent", 3, 10),
        ]);

        assert_eq!(estimate.get_tier("urgent").unwrap().suggested_priority_fee, 3);
        assert!(estimate.get_tier("Standard").is_none());
        assert_eq!(estimate.tier_names(), vec!["Saver", "Urgent"]);
    }

    #[test]
    fn test_format_gwei() {
        assert_eq!(format_gwei(1_500_000_000, 2), "1.50");
        assert_eq!(format_gwei(0, 4), "0.0000");
    }

    #[test]
    fn test_display_table() {
        let estimate = estimate(vec![recommendation("Standard", 2_000_000_000, 20_000_000_000)]);
        let rendered = estimate.to_string();

        assert!(rendered.contains("Congestion: 50.0% (normal)"));
        assert!(rendered.contains("Next block base fee: 12.0000 gwei"));
        assert!(rendered.contains("STANDARD"));
        assert!(rendered.contains("22.00"));
        assert!(rendered.contains("2.00"));
    }
}
