use serde::{Deserialize, Serialize};

use crate::error::{FeeModelError, Result};
use crate::internal::pow_mul_floor;

/// Projects the worst-case base fee a number of blocks into the future.
///
/// Under EIP-1559 the base fee can rise by at most `1 / 8` per block, so a
/// transaction that must stay valid through `k` completely full blocks needs
/// a fee cap of `base * 1.125^k`.
///
/// # Example
/// ```
/// use eth_fee_oracle::DriftProjector;
///
/// let projector = DriftProjector::default();
/// assert_eq!(projector.project(200, 4).unwrap(), 320);
/// assert_eq!(projector.project(200, 0).unwrap(), 200);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftProjector {
    growth_factor: f64,
}

impl DriftProjector {
    /// Maximum per-block base fee increase on Ethereum mainnet (12.5%).
    pub const EIP1559_GROWTH_FACTOR: f64 = 1.125;

    /// Creates a projector for a network with the given per-block growth factor.
    ///
    /// The factor must be finite and at least 1.0.
    pub fn new(growth_factor: f64) -> Result<Self> {
        if !growth_factor.is_finite() || growth_factor < 1.0 {
            return Err(FeeModelError::invalid_config(format!(
                "growth factor must be a finite value >= 1.0, got {growth_factor}"
            )));
        }
        Ok(Self { growth_factor })
    }

    /// The per-block growth factor.
    pub fn growth_factor(&self) -> f64 {
        self.growth_factor
    }

    /// Returns `floor(next_block_base_fee * growth_factor ^ blocks_ahead)`.
    ///
    /// The power is evaluated exactly, so the cap is never rounded below the
    /// formula. Saturates at `u128::MAX`. Negative horizons are rejected.
    pub fn project(&self, next_block_base_fee: u128, blocks_ahead: i64) -> Result<u128> {
        if blocks_ahead < 0 {
            return Err(FeeModelError::invalid_parameter(format!(
                "blocks_ahead must be non-negative, got {blocks_ahead}"
            )));
        }
        if blocks_ahead == 0 {
            return Ok(next_block_base_fee);
        }

        let exponent = u32::try_from(blocks_ahead).unwrap_or(u32::MAX);
        Ok(pow_mul_floor(
            next_block_base_fee,
            self.growth_factor,
            exponent,
        ))
    }
}

impl Default for DriftProjector {
    fn default() -> Self {
        Self {
            growth_factor: Self::EIP1559_GROWTH_FACTOR,
        }
    }
}
