//! Eth Fee Oracle - An EIP-1559 fee estimation library
//!
//! This library turns a window of on-chain fee history (the result of
//! `eth_feeHistory`) into `maxFeePerGas` / `maxPriorityFeePerGas`
//! recommendations for several urgency tiers.
//!
//! # Features
//! - Worst-case base fee projection over a configurable number of full blocks
//! - Outlier-resistant tips from the median of each percentile column
//! - Tier ordering so that more urgent tiers always pay more
//! - Congestion-aware tip scaling based on recent gas used ratios
//!
//! # Example
//! ```no_run
//! use eth_fee_oracle::{FeeEstimator, FeeHistorySample};
//!
//! // Initialize the estimator with default settings
//! let fee_estimator = FeeEstimator::new();
//!
//! // The `result` object of eth_feeHistory(10, "latest", [30, 60, 75, 90])
//! let json = std::fs::read_to_string("fee_history.json").unwrap();
//! let sample = FeeHistorySample::from_json(&json).unwrap();
//!
//! let estimate = fee_estimator.estimate(&sample)
//!     .expect("Failed to calculate estimates");
//!
//! if let Some(rec) = estimate.get_tier("Standard") {
//!     println!("maxFeePerGas: {}", rec.max_fee_per_gas);
//!     println!("maxPriorityFeePerGas: {}", rec.suggested_priority_fee);
//! }
//! ```

// Public modules
pub mod error;

// Data structures
mod congestion;
mod drift;
mod estimator_config;
mod fee_estimate;
mod fee_estimator;
mod fee_history;
mod smoothing;

// Internal implementation modules
pub(crate) mod internal;

// Public exports
pub use congestion::{CongestionLevel, CongestionPolicy};
pub use drift::DriftProjector;
pub use error::{FeeModelError, Result};
pub use estimator_config::{EstimatorConfig, Preset, SingleTierCap, TierConfig};
pub use fee_estimate::{format_gwei, BaseFeeTrend, FeeEstimate, FeeRecommendation, WEI_PER_GWEI};
pub use fee_estimator::FeeEstimator;
pub use fee_history::{parse_quantity, FeeHistorySample, RawFeeHistory};
pub use smoothing::PrioritySmoother;
