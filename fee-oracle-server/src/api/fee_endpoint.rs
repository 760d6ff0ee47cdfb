use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::ApiError;
use super::models::{
    transform_fee_estimate, transform_recommendation, FeeEstimateResponse, TierResponse,
};
use crate::service::FeeCollector;

const NO_ESTIMATE: &str = "No fee estimates available yet";

/// GET /fees - Returns the latest recommendations for every tier
pub async fn get_fees(
    State(collector): State<Arc<FeeCollector>>,
) -> Result<Json<FeeEstimateResponse>, ApiError> {
    info!("Received request for fee estimates");

    let estimate = collector.get_latest_estimate().await.ok_or_else(|| {
        warn!("{}", NO_ESTIMATE);
        ApiError::ServiceUnavailable(NO_ESTIMATE.to_string())
    })?;

    let response = transform_fee_estimate(estimate);
    debug!(
        "Returning fee estimates with {} tiers",
        response.recommendations.len()
    );
    Ok(Json(response))
}

/// GET /fees/tier/{name} - Returns the recommendation for one tier
pub async fn get_fee_for_tier(
    Path(name): Path<String>,
    State(collector): State<Arc<FeeCollector>>,
) -> Result<Json<TierResponse>, ApiError> {
    info!("Received request for tier {}", name);

    let estimate = collector
        .get_latest_estimate()
        .await
        .ok_or_else(|| ApiError::ServiceUnavailable(NO_ESTIMATE.to_string()))?;

    match estimate.get_tier(&name) {
        Some(recommendation) => Ok(Json(transform_recommendation(recommendation))),
        None => {
            warn!("Unknown tier requested: {}", name);
            Err(ApiError::NotFound(format!(
                "Unknown tier '{}', available tiers: {}",
                name,
                estimate.tier_names().join(", ")
            )))
        }
    }
}

#[cfg(test)]
#[path = "fee_endpoint_tests.rs"]
mod tests;
