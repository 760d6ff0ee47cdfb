/// Internal modules for the eth-fee-oracle library.
/// These are implementation details and should not be used directly by library consumers.
pub(crate) mod fixed_point;
pub(crate) mod reward_matrix;

// Re-export for internal use only
pub(crate) use fixed_point::{mul_floor, pow_mul_floor};
pub(crate) use reward_matrix::RewardMatrix;
