//! HTTP API endpoints for fee estimation service

mod error;
mod fee_endpoint;
mod models;

pub use error::ApiError;
pub use fee_endpoint::{get_fee_for_tier, get_fees};
pub use models::{transform_fee_estimate, FeeEstimateResponse, TierResponse};
