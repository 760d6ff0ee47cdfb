use num_bigint::BigUint;

/// Precision used when scaling integer fees by a fractional factor.
const SCALE: u128 = 1_000_000_000;

/// Multiplies `value` by `factor` and truncates toward zero.
///
/// The factor is rounded to nine decimal places so that the usual tunings
/// (1.125, 1.2, 0.95, ...) are applied exactly instead of through binary
/// floating point. Falls back to `f64` arithmetic, saturating at `u128::MAX`,
/// when the exact product would overflow. Negative and NaN factors yield zero.
pub(crate) fn mul_floor(value: u128, factor: f64) -> u128 {
    if factor.is_nan() || factor <= 0.0 {
        return 0;
    }

    let scaled_factor = factor * SCALE as f64;
    if scaled_factor < u128::MAX as f64 {
        if let Some(product) = value.checked_mul(scaled_factor.round() as u128) {
            return product / SCALE;
        }
    }
    (value as f64 * factor).floor() as u128
}

/// Largest intermediate product, in bits, computed exactly by [`pow_mul_floor`].
const MAX_EXACT_BITS: u64 = 8192;

/// Returns `floor(value * factor ^ exponent)` computed exactly, saturating at
/// `u128::MAX`.
///
/// A finite `f64` is a dyadic rational `m / 2^s`, so the product is
/// `(value * m^exponent) >> (s * exponent)` in big integer arithmetic. When
/// the power would exceed [`MAX_EXACT_BITS`] while the result still fits in
/// `u128`, falls back to `f64` arithmetic. Only factors `>= 1.0` are supported.
pub(crate) fn pow_mul_floor(value: u128, factor: f64, exponent: u32) -> u128 {
    if value == 0 || exponent == 0 || factor == 1.0 {
        return value;
    }
    if !factor.is_finite() || factor < 1.0 {
        return u128::MAX;
    }
    // value >= 1, so anything past 2^129 saturates
    if f64::from(exponent) * factor.log2() >= 129.0 {
        return u128::MAX;
    }

    let (numerator, shift) = dyadic_parts(factor);
    let numerator = BigUint::from(numerator);
    if numerator.bits() * u64::from(exponent) <= MAX_EXACT_BITS {
        let shift = usize::try_from(shift * u64::from(exponent)).unwrap_or(usize::MAX);
        let product = (BigUint::from(value) * numerator.pow(exponent)) >> shift;
        return u128::try_from(&product).unwrap_or(u128::MAX);
    }

    let approx = value as f64 * factor.powi(i32::try_from(exponent).unwrap_or(i32::MAX));
    approx.floor() as u128
}

/// Splits a finite `factor >= 1.0` into an odd numerator and a power-of-two
/// denominator exponent, so that `factor == numerator / 2^shift`.
fn dyadic_parts(factor: f64) -> (u128, u64) {
    let bits = factor.to_bits();
    let biased_exponent = ((bits >> 52) & 0x7ff) as i64;
    let mut mantissa = (bits & ((1u64 << 52) - 1)) | (1u64 << 52);
    let mut exponent = biased_exponent - 1075;

    let zeros = mantissa.trailing_zeros();
    mantissa >>= zeros;
    exponent += i64::from(zeros);

    if exponent >= 0 {
        // factor >= 1 fits in f64 range, so at most 2^1024; saturate the numerator
        let numerator = u128::from(mantissa)
            .checked_shl(exponent as u32)
            .filter(|n| n >> (exponent as u32) == u128::from(mantissa))
            .unwrap_or(u128::MAX);
        (numerator, 0)
    } else {
        (u128::from(mantissa), exponent.unsigned_abs())
    }
}
