//! Error handling and validation tests for Eth Fee Oracle
//!
//! A failed estimation must never produce a recommendation, so every
//! malformed input below has to surface as an error.


use eth_fee_oracle::{
    parse_quantity, DriftProjector, EstimatorConfig, FeeEstimator, FeeHistorySample,
    FeeModelError, TierConfig,
};
use test_utils::TestUtils;

#[test]
fn test_negative_horizon_rejected() {
    let result = DriftProjector::default().project(100, -3);

    match result {
        Err(FeeModelError::InvalidParameter(msg)) => {
            assert!(msg.contains("non-negative"), "unexpected message: {msg}");
        }
        other => panic!("Expected InvalidParameter error, got {other:?}"),
    }
}

#[test]
fn test_negative_tier_horizon_rejected_at_construction() {
    let config = EstimatorConfig {
        tiers: vec![TierConfig::new("Backwards", -1, 0)],
        ..EstimatorConfig::default()
    };

    assert!(matches!(
        FeeEstimator::with_config(config),
        Err(FeeModelError::InvalidConfig(_))
    ));
}

#[test]
fn test_empty_base_fees() {
    let sample = FeeHistorySample {
        oldest_block: None,
        base_fees_per_block: vec![],
        rewards_per_block: vec![],
        gas_used_ratios: vec![],
    };

    let result = FeeEstimator::new().estimate(&sample);
    assert!(matches!(result, Err(FeeModelError::InvalidSample(_))));
}

#[test]
fn test_missing_next_block_base_fee() {
    // As many base fees as blocks: the next-block entry is missing
    let sample = FeeHistorySample {
        oldest_block: None,
        base_fees_per_block: vec![100, 110],
        rewards_per_block: vec![vec![1, 2, 3, 4], vec![1, 2, 3, 4]],
        gas_used_ratios: vec![0.5, 0.5],
    };

    let result = FeeEstimator::new().estimate(&sample);
    assert!(matches!(result, Err(FeeModelError::InvalidSample(_))));
}

#[test]
fn test_ratio_count_mismatch() {
    let mut sample = TestUtils::uniform_sample(5, 100, &[1, 2, 3, 4], 0.5);
    sample.gas_used_ratios.pop();

    let result = FeeEstimator::new().estimate(&sample);
    assert!(matches!(result, Err(FeeModelError::InvalidSample(_))));
}

#[test]
fn test_malformed_hex_in_response() {
    let json = r#"{
        "oldestBlock": "0x1",
        "baseFeePerGas": ["0x64", "0x6e", "not-hex"],
        "gasUsedRatio": [0.5, 0.5],
        "reward": [["0x1"], ["0x2"]]
    }"#;

    match FeeHistorySample::from_json(json) {
        Err(FeeModelError::MalformedQuantity { value, .. }) => assert_eq!(value, "not-hex"),
        other => panic!("Expected MalformedQuantity error, got {other:?}"),
    }
}

#[test]
fn test_numeric_instead_of_hex_rejected() {
    // Quantities must be hex strings, not JSON numbers
    let json = r#"{"baseFeePerGas": [100, 110], "gasUsedRatio": [0.5], "reward": [["0x1"]]}"#;
    assert!(matches!(
        FeeHistorySample::from_json(json),
        Err(FeeModelError::Serialization(_))
    ));
}

#[test]
fn test_parse_quantity_error_message() {
    let err = parse_quantity("0xg").unwrap_err();
    assert!(err.to_string().contains("0xg"));
}

#[test]
fn test_single_estimate_bad_index() {
    let sample = TestUtils::uniform_sample(3, 100, &[1, 2, 3, 4], 0.5);
    assert!(matches!(
        FeeEstimator::new().estimate_single(&sample, 4, 1),
        Err(FeeModelError::InvalidParameter(_))
    ));
}
