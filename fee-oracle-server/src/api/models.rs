use chrono::{DateTime, Utc};
use eth_fee_oracle::{BaseFeeTrend, CongestionLevel, FeeEstimate, FeeRecommendation, WEI_PER_GWEI};
use serde::{Deserialize, Serialize};

/// Response body of `GET /fees`.
///
/// Wei amounts are decimal strings so that no client has to round-trip a
/// 128-bit integer through a float; the `_gwei` fields are for display.
#[derive(Debug, Serialize, Deserialize)]
pub struct FeeEstimateResponse {
    /// ISO 8601 formatted timestamp of when the estimate was calculated
    pub timestamp: String,

    pub oldest_block: Option<u64>,

    pub next_block_base_fee: String,
    pub next_block_base_fee_gwei: f64,

    /// Mean gas used ratio over the fee history window
    pub avg_utilization: f64,
    pub congestion: CongestionLevel,
    pub congestion_multiplier: f64,
    pub base_fee_trend: BaseFeeTrend,

    /// One entry per tier, cheapest first
    pub recommendations: Vec<TierResponse>,
}

/// Recommended EIP-1559 fee fields for one tier
#[derive(Debug, Serialize, Deserialize)]
pub struct TierResponse {
    pub tier: String,
    pub blocks_ahead: i64,
    pub percentile: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expected_wait: Option<String>,

    pub max_fee_per_gas: String,
    pub max_priority_fee_per_gas: String,
    pub projected_base_fee: String,

    pub max_fee_per_gas_gwei: f64,
    pub max_priority_fee_per_gas_gwei: f64,

    /// True when the tip was raised to stay above the cheaper tier
    pub ordering_adjusted: bool,
}

/// Transform internal FeeEstimate to API response format
pub fn transform_fee_estimate(estimate: FeeEstimate) -> FeeEstimateResponse {
    FeeEstimateResponse {
        timestamp: format_timestamp(estimate.timestamp),
        oldest_block: estimate.oldest_block,
        next_block_base_fee: estimate.next_block_base_fee.to_string(),
        next_block_base_fee_gwei: to_gwei(estimate.next_block_base_fee),
        avg_utilization: estimate.avg_utilization,
        congestion: estimate.congestion,
        congestion_multiplier: estimate.congestion_multiplier,
        base_fee_trend: estimate.trend,
        recommendations: estimate
            .recommendations
            .iter()
            .map(transform_recommendation)
            .collect(),
    }
}

pub(crate) fn transform_recommendation(rec: &FeeRecommendation) -> TierResponse {
    TierResponse {
        tier: rec.tier.clone(),
        blocks_ahead: rec.blocks_ahead,
        percentile: rec.percentile,
        expected_wait: rec.expected_wait.clone(),
        max_fee_per_gas: rec.max_fee_per_gas.to_string(),
        max_priority_fee_per_gas: rec.suggested_priority_fee.to_string(),
        projected_base_fee: rec.projected_base_fee.to_string(),
        max_fee_per_gas_gwei: to_gwei(rec.max_fee_per_gas),
        max_priority_fee_per_gas_gwei: to_gwei(rec.suggested_priority_fee),
        ordering_adjusted: rec.ordering_adjusted,
    }
}

/// Wei to gwei, rounded to 4 decimal places
fn to_gwei(wei: u128) -> f64 {
    let gwei = wei as f64 / WEI_PER_GWEI;
    format!("{:.4}", gwei).parse::<f64>().unwrap_or(gwei)
}

/// Format timestamp to ISO 8601 with milliseconds and UTC timezone
fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    // Format: "2025-01-20T12:00:00.000Z"
    timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recommendation() -> FeeRecommendation {
        FeeRecommendation {
            tier: "Standard".to_string(),
            blocks_ahead: 4,
            percentile: 60.0,
            expected_wait: Some("<30 secs".to_string()),
            projected_base_fee: 16_018_066_406,
            suggested_priority_fee: 1_234_567_891,
            max_fee_per_gas: 17_252_634_297,
            ordering_adjusted: false,
        }
    }

    #[test]
    fn test_transform_fee_estimate() {
        let estimate = FeeEstimate {
            recommendations: vec![recommendation()],
            next_block_base_fee: 10_000_000_000,
            avg_utilization: 0.5,
            congestion: CongestionLevel::Normal,
            congestion_multiplier: 1.0,
            trend: BaseFeeTrend::Flat,
            oldest_block: Some(42),
            timestamp: Utc::now(),
        };

        let response = transform_fee_estimate(estimate);

        assert_eq!(response.next_block_base_fee, "10000000000");
        assert_eq!(response.next_block_base_fee_gwei, 10.0);
        assert_eq!(response.oldest_block, Some(42));
        assert_eq!(response.recommendations.len(), 1);
        assert_eq!(response.recommendations[0].tier, "Standard");
    }

    #[test]
    fn test_wei_fields_are_exact_strings() {
        let response = transform_recommendation(&recommendation());

        assert_eq!(response.max_fee_per_gas, "17252634297");
        assert_eq!(response.max_priority_fee_per_gas, "1234567891");
        assert_eq!(response.projected_base_fee, "16018066406");
        assert_eq!(response.max_priority_fee_per_gas_gwei, 1.2346);
        assert_eq!(response.max_fee_per_gas_gwei, 17.2526);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["max_fee_per_gas"], "17252634297");
        assert_eq!(json["max_priority_fee_per_gas"], "1234567891");
    }

    #[test]
    fn test_tier_fields_are_snake_case() {
        let json = serde_json::to_value(transform_recommendation(&recommendation())).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();

        assert!(keys.iter().all(|k| !k.chars().any(|c| c.is_ascii_uppercase())), "{keys:?}");
        assert!(json.get("max_fee_per_gas").is_some());
        assert!(json.get("projected_base_fee").is_some());
    }

    #[test]
    fn test_large_values_do_not_lose_precision() {
        let mut rec = recommendation();
        rec.max_fee_per_gas = u128::MAX;
        let response = transform_recommendation(&rec);
        assert_eq!(response.max_fee_per_gas, u128::MAX.to_string());
    }

    #[test]
    fn test_format_timestamp() {
        let timestamp = DateTime::parse_from_rfc3339("2025-01-20T12:00:00.123Z")
            .unwrap()
            .with_timezone(&Utc);

        let formatted = format_timestamp(timestamp);
        assert_eq!(formatted, "2025-01-20T12:00:00.123Z");
    }
}
