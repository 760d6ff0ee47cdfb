//! Property-based tests for Eth Fee Oracle
//!
//! These tests verify core invariants that must always hold true
//! regardless of the input data.

use eth_fee_oracle::{
    CongestionPolicy, DriftProjector, FeeEstimator, FeeHistorySample, PrioritySmoother, Preset,
};
use proptest::prelude::*;

// Keep fees in a realistic range: up to 100k gwei
const MAX_FEE: u128 = 100_000_000_000_000;
const MAX_BLOCKS: usize = 32;

/// Generate a well-formed sample with `width` percentiles per block
fn sample_strategy(width: usize) -> impl Strategy<Value = FeeHistorySample> {
    (1..=MAX_BLOCKS).prop_flat_map(move |blocks| {
        (
            prop::collection::vec(0..=MAX_FEE, blocks + 1),
            prop::collection::vec(prop::collection::vec(0..=MAX_FEE, width), blocks),
            prop::collection::vec(0.0f64..=1.0, blocks),
        )
            .prop_map(|(base_fees, rewards, ratios)| {
                FeeHistorySample::new(base_fees, rewards, ratios).unwrap()
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Projection never decreases as the horizon grows
    #[test]
    fn test_projection_monotone_in_blocks(base in 0..=MAX_FEE, k in 0i64..64) {
        let projector = DriftProjector::default();
        let near = projector.project(base, k).unwrap();
        let far = projector.project(base, k + 1).unwrap();
        prop_assert!(far >= near, "project({base}, {}) = {far} < project({base}, {k}) = {near}", k + 1);
    }

    /// Projection never decreases as the base fee grows
    #[test]
    fn test_projection_monotone_in_base(base in 0..MAX_FEE, delta in 0..=1_000_000u128, k in 0i64..64) {
        let projector = DriftProjector::default();
        let low = projector.project(base, k).unwrap();
        let high = projector.project(base + delta, k).unwrap();
        prop_assert!(high >= low);
    }

    /// Projection equals the integer form of base * (9/8)^k
    #[test]
    fn test_projection_matches_integer_formula(base in 0..=MAX_FEE, k in 0u32..=16) {
        let exact = base * 9u128.pow(k) / 8u128.pow(k);
        prop_assert_eq!(DriftProjector::default().project(base, i64::from(k)).unwrap(), exact);
    }

    /// A zero horizon returns the base fee unchanged
    #[test]
    fn test_projection_identity(base in any::<u128>()) {
        prop_assert_eq!(DriftProjector::default().project(base, 0).unwrap(), base);
    }

    /// The smoothed tip is the middle of the sorted column
    #[test]
    fn test_smooth_is_median(column in prop::collection::vec(0..=MAX_FEE, 1..64)) {
        let rewards: Vec<Vec<u128>> = column.iter().map(|&v| vec![v]).collect();
        let smoothed = PrioritySmoother::smooth(&rewards, 0).unwrap();

        let mut sorted = column.clone();
        sorted.sort_unstable();
        let mid = sorted.len() / 2;
        let expected = if sorted.len() % 2 == 1 {
            sorted[mid]
        } else {
            (sorted[mid - 1] + sorted[mid]) / 2
        };
        prop_assert_eq!(smoothed, expected);
    }

    /// Multiplier 1.0 leaves tips alone, however often it is applied
    #[test]
    fn test_congestion_identity(
        tips in prop::collection::vec(0..=MAX_FEE, 1..8),
        ratios in prop::collection::vec(0.45f64..=0.80, 1..16),
    ) {
        let policy = CongestionPolicy::wide();
        let once = policy.adjust_for_congestion(&tips, &ratios).unwrap();
        let twice = policy.adjust_for_congestion(&once, &ratios).unwrap();
        prop_assert_eq!(&once, &tips);
        prop_assert_eq!(&twice, &tips);
    }

    /// Idle networks strictly lower every (non-trivial) tip
    #[test]
    fn test_congestion_discount(
        tips in prop::collection::vec(100..=MAX_FEE, 1..8),
        ratios in prop::collection::vec(0.0f64..0.29, 1..16),
    ) {
        let adjusted = CongestionPolicy::conservative()
            .adjust_for_congestion(&tips, &ratios)
            .unwrap();
        for (before, after) in tips.iter().zip(&adjusted) {
            prop_assert!(after < before);
        }
    }

    /// Congested networks strictly raise every (non-trivial) tip
    #[test]
    fn test_congestion_surge(
        tips in prop::collection::vec(100..=MAX_FEE, 1..8),
        ratios in prop::collection::vec(0.81f64..=1.0, 1..16),
    ) {
        let adjusted = CongestionPolicy::wide()
            .adjust_for_congestion(&tips, &ratios)
            .unwrap();
        for (before, after) in tips.iter().zip(&adjusted) {
            prop_assert!(after > before);
        }
    }

    /// Without congestion scaling, adjacent tiers keep their configured spacing
    #[test]
    fn test_tier_ordering_invariant(tips in prop::collection::vec(0..=MAX_FEE, 4)) {
        let config = Preset::Wide.config();
        let mut tips = tips;
        PrioritySmoother::enforce_tier_ordering(&mut tips, &config.tiers).unwrap();

        for i in 0..tips.len() - 1 {
            let ratio = config.tiers[i + 1].min_increment_ratio;
            let required = (tips[i] as f64 * (1.0 + ratio)).floor() as u128;
            // one wei of slack for float vs fixed-point truncation
            prop_assert!(tips[i + 1] + 1 >= required);
            if tips[i] == 0 {
                prop_assert!(tips[i + 1] > 0);
            }
        }
    }

    /// Every recommendation's cap is its projected base plus its tip, and
    /// horizons grow along the tier list
    #[test]
    fn test_recommendation_consistency(sample in sample_strategy(4)) {
        let estimate = FeeEstimator::new().estimate(&sample).unwrap();

        prop_assert_eq!(estimate.recommendations.len(), 4);
        for rec in &estimate.recommendations {
            prop_assert_eq!(rec.max_fee_per_gas, rec.projected_base_fee + rec.suggested_priority_fee);
            prop_assert!(rec.projected_base_fee >= estimate.next_block_base_fee);
        }
        for pair in estimate.recommendations.windows(2) {
            prop_assert!(pair[1].projected_base_fee >= pair[0].projected_base_fee);
            prop_assert!(pair[1].suggested_priority_fee >= pair[0].suggested_priority_fee);
        }
    }

    /// Same input, same output
    #[test]
    fn test_determinism(sample in sample_strategy(3)) {
        let estimator = FeeEstimator::from_preset(Preset::Conservative);
        let first = estimator.estimate(&sample).unwrap();
        let second = estimator.estimate(&sample).unwrap();
        prop_assert_eq!(first.recommendations, second.recommendations);
    }

    /// A sample with the wrong number of percentiles is always rejected
    #[test]
    fn test_wrong_width_rejected(sample in sample_strategy(2)) {
        prop_assert!(FeeEstimator::new().estimate(&sample).is_err());
    }
}
