use ndarray::{Array2, ArrayView1};

use crate::error::{FeeModelError, Result};

/// Internal representation of the per-block percentile tips as a dense
/// matrix, one row per block and one column per requested percentile.
#[derive(Debug, Clone)]
pub(crate) struct RewardMatrix {
    values: Array2<u128>,
}

impl RewardMatrix {
    /// Builds a matrix from reward rows, rejecting ragged input.
    pub fn from_rows(rows: &[Vec<u128>]) -> Result<Self> {
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != width) {
            return Err(FeeModelError::invalid_sample(
                "reward rows have inconsistent lengths",
            ));
        }

        let flat: Vec<u128> = rows.iter().flatten().copied().collect();
        let values = Array2::from_shape_vec((rows.len(), width), flat)
            .map_err(|e| FeeModelError::invalid_sample(e.to_string()))?;

        Ok(Self { values })
    }

    /// Number of historical blocks.
    pub fn block_count(&self) -> usize {
        self.values.nrows()
    }

    /// Number of percentiles per block.
    pub fn percentile_count(&self) -> usize {
        self.values.ncols()
    }

    /// Tips paid at one percentile across every block.
    pub fn column(&self, percentile_index: usize) -> Result<ArrayView1<'_, u128>> {
        if percentile_index >= self.percentile_count() {
            return Err(FeeModelError::invalid_parameter(format!(
                "percentile index {} out of range for {} percentiles",
                percentile_index,
                self.percentile_count()
            )));
        }
        Ok(self.values.column(percentile_index))
    }
}
