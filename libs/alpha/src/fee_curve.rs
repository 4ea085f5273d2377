//! Logistic fee curve in Q64.64
//!
//! The fee (in percent) decays from 0.5 % toward 0.1 % as the input amount
//! grows:
//!
//! ```text
//! fee(x) = 0.9 / (1.25 + e^(x / 75_000)) + 0.1
//! ```
//!
//! From `FEE_CURVE_CUTOFF` on, the curve is pinned to its floor. Evaluation
//! uses `Decimal` so the same input always yields the same word.

use crate::error::{AlphaError, AlphaResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use tracing::debug;

/// Amount at which the curve is pinned to [`FEE_FLOOR_X64`]
pub const FEE_CURVE_CUTOFF: u64 = 1_000_000;

/// Horizontal stretch of the exponential term
pub const FEE_CURVE_SCALE: Decimal = dec!(75000);

/// 0.1 % in Q64.64 (≈ 2^64 / 1000)
pub const FEE_FLOOR_X64: u128 = 18_446_744_073_709_552;

const NUMERATOR: Decimal = dec!(0.9);
const OFFSET: Decimal = dec!(1.25);
const BASE_FEE: Decimal = dec!(0.1);
const PERCENT: Decimal = dec!(100);

fn q64_decimal() -> Decimal {
    Decimal::from_i128_with_scale(1i128 << 64, 0)
}

fn overflow(stage: &str, amount: u64) -> AlphaError {
    AlphaError::Overflow {
        context: format!("fee curve {} at amount {}", stage, amount),
    }
}

/// Fee in percent for `amount` (0.5 at zero, 0.1 from the cutoff on)
pub fn logistic_fee_percent(amount: u64) -> AlphaResult<Decimal> {
    if amount >= FEE_CURVE_CUTOFF {
        return Ok(BASE_FEE);
    }

    let exponent = Decimal::from(amount)
        .checked_div(FEE_CURVE_SCALE)
        .ok_or_else(|| overflow("exponent", amount))?;
    let growth = exponent
        .checked_exp()
        .ok_or_else(|| overflow("exp", amount))?;

    let fee = NUMERATOR
        .checked_div(OFFSET + growth)
        .ok_or_else(|| overflow("division", amount))?
        + BASE_FEE;
    Ok(fee)
}

/// Fee for `amount` as a Q64.64 fraction (percent / 100), rounded down
pub fn logistic_fee_x64(amount: u64) -> AlphaResult<u128> {
    let fee = logistic_fee_percent(amount)?;
    // The pinned word is published rounded up, one above floor(0.001 * 2^64)
    if amount >= FEE_CURVE_CUTOFF {
        return Ok(FEE_FLOOR_X64);
    }

    let scaled = (fee / PERCENT)
        .checked_mul(q64_decimal())
        .ok_or_else(|| overflow("scaling", amount))?;
    let word = scaled
        .floor()
        .to_u128()
        .ok_or_else(|| overflow("conversion", amount))?;

    debug!(amount, fee = %fee, fee_x64 = word, "logistic fee");
    Ok(word)
}
