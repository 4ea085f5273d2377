//! Price divergence between a V3 spot price and a V2 outlier
//!
//! The smaller price over the larger one gives the proportional change; its
//! complement is the divergence, reported as a Q128.128 fraction so that
//! identical prices map to 0 and a fully collapsed price maps to 2^128.

use crate::error::{AlphaError, AlphaResult};
use crate::fixed_point::X128_SHIFT;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use tracing::debug;

/// Order the two prices as (smaller, larger), validating signs
fn ordered<'a>(
    v3_spot: &'a BigInt,
    v2_outlier: &'a BigInt,
) -> AlphaResult<(&'a BigInt, &'a BigInt)> {
    if v3_spot.is_negative() {
        return Err(AlphaError::negative("v3_spot", v3_spot));
    }
    if v2_outlier.is_negative() {
        return Err(AlphaError::negative("v2_outlier", v2_outlier));
    }

    let (low, high) = if v3_spot > v2_outlier {
        (v2_outlier, v3_spot)
    } else {
        (v3_spot, v2_outlier)
    };

    if high.is_zero() {
        return Err(AlphaError::InvalidArgument {
            name: "v2_outlier",
            value: high.clone(),
            requirement: "non-zero when v3_spot is zero",
        });
    }
    Ok((low, high))
}

/// `1 - min / max` of the two prices
pub fn price_divergence(v3_spot: &BigInt, v2_outlier: &BigInt) -> AlphaResult<BigDecimal> {
    let (low, high) = ordered(v3_spot, v2_outlier)?;
    let proportional_change = BigDecimal::from(low.clone()) / BigDecimal::from(high.clone());
    Ok(BigDecimal::one() - proportional_change)
}

/// Divergence in Q128.128, rounded down
///
/// Evaluated in integers as `floor((max - min) * 2^128 / max)`, so the result
/// is exact for prices of any size.
pub fn price_divergence_x128(v3_spot: &BigInt, v2_outlier: &BigInt) -> AlphaResult<BigInt> {
    let (low, high) = ordered(v3_spot, v2_outlier)?;
    // The pricing script subtracts the unscaled ratio from 2^128 and always
    // emits 2^128; this scales the ratio first, giving 0 for equal prices.
    let divergence = ((high - low) << X128_SHIFT) / high;

    debug!(
        v3_spot = %v3_spot,
        v2_outlier = %v2_outlier,
        divergence = %divergence,
        "price divergence"
    );
    Ok(divergence)
}
