//! AlphaX: scaled reserve deviation between a snapshot and an execution
//!
//! Given pool reserves recorded before an execution event (snapshot) and
//! after it (execution), alphaX measures how far the execution spot price
//! drifted from the snapshot spot price and turns that drift into a
//! corrective amount of token0, returned in Q64.64 scale:
//!
//! ```text
//! execution_spot     = r0_exec / r1_exec
//! snapshot_spot      = r0_snap / r1_snap
//! delta              = |execution_spot / snapshot_spot - 1|
//! partial            = r0_snap * r1_snap
//! numerator_partial1 = sqrt(partial) * sqrt(r0_snap)
//! numerator_partial2 = sqrt(delta * r1_snap + r1_snap)
//! numerator          = numerator_partial1 * numerator_partial2 - r0_snap * r1_snap
//! alpha_x            = numerator / r1_snap * 2^64
//! ```
//!
//! Analytically this is `r0_snap * (sqrt(1 + delta) - 1) * 2^64`, so it is
//! zero when the price did not move and grows with `delta`. Evaluation is
//! carried out in `BigDecimal` at a working precision widened by the digit
//! count of the reserves, so the cancellation in the numerator never eats
//! into the configured significant digits, whatever the reserve size.

use crate::config::AlphaConfig;
use crate::error::{AlphaError, AlphaResult};
use crate::fixed_point::{scale_x64, to_abi_hex, truncate_to_integer};
use bigdecimal::{BigDecimal, Context, RoundingMode};
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};
use std::num::NonZeroU64;
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Digits kept on top of the configured precision and the reserve width
const GUARD_DIGITS: u64 = 10;

/// Token reserves of a pool at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservePair {
    pub reserve0: BigInt,
    pub reserve1: BigInt,
}

impl ReservePair {
    pub fn new(reserve0: impl Into<BigInt>, reserve1: impl Into<BigInt>) -> Self {
        Self {
            reserve0: reserve0.into(),
            reserve1: reserve1.into(),
        }
    }

    /// Build from `Decimal` reserves; both must be whole token amounts
    pub fn from_decimal(reserve0: Decimal, reserve1: Decimal) -> AlphaResult<Self> {
        Ok(Self {
            reserve0: decimal_to_bigint(reserve0)?,
            reserve1: decimal_to_bigint(reserve1)?,
        })
    }
}

fn decimal_to_bigint(value: Decimal) -> AlphaResult<BigInt> {
    if !value.fract().is_zero() {
        return Err(AlphaError::NonIntegralReserve {
            value: value.to_string(),
        });
    }
    value
        .to_i128()
        .map(BigInt::from)
        .ok_or_else(|| AlphaError::Overflow {
            context: format!("reserve {} does not fit i128", value),
        })
}

/// Every intermediate of one alphaX evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaXBreakdown {
    pub execution_spot: BigDecimal,
    pub snapshot_spot: BigDecimal,
    pub delta: BigDecimal,
    pub partial: BigDecimal,
    pub numerator_partial1: BigDecimal,
    pub numerator_partial2: BigDecimal,
    pub numerator: BigDecimal,
    /// `numerator / reserve1_snapshot`, before the 2^64 scaling
    pub unscaled: BigDecimal,
    /// Final alphaX value in Q64.64 scale
    pub result: BigDecimal,
}

impl AlphaXBreakdown {
    /// On-chain fixed-point value: the scaled result truncated toward zero
    pub fn to_x64_integer(&self) -> BigInt {
        truncate_to_integer(&self.result)
    }

    /// ABI `uint256` hex of [`Self::to_x64_integer`]
    pub fn to_abi_hex(&self) -> AlphaResult<String> {
        to_abi_hex(&self.to_x64_integer())
    }
}

/// Evaluates alphaX at a configured precision
#[derive(Debug, Clone, Default)]
pub struct AlphaXCalculator {
    config: AlphaConfig,
}

impl AlphaXCalculator {
    pub fn new(config: AlphaConfig) -> AlphaResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AlphaConfig {
        &self.config
    }

    /// Scaled alphaX for a snapshot/execution pair
    pub fn calculate(
        &self,
        snapshot: &ReservePair,
        execution: &ReservePair,
    ) -> AlphaResult<BigDecimal> {
        Ok(self.breakdown(snapshot, execution)?.result)
    }

    /// Full evaluation, keeping every intermediate value
    pub fn breakdown(
        &self,
        snapshot: &ReservePair,
        execution: &ReservePair,
    ) -> AlphaResult<AlphaXBreakdown> {
        // Argument order decides which input is reported first
        require_positive("reserve0_snapshot", &snapshot.reserve0)?;
        require_positive("reserve1_snapshot", &snapshot.reserve1)?;
        require_positive("reserve0_execution", &execution.reserve0)?;
        require_positive("reserve1_execution", &execution.reserve1)?;

        // execution_spot / snapshot_spot == cross_execution / cross_snapshot
        let cross_execution = &execution.reserve0 * &snapshot.reserve1;
        let cross_snapshot = &snapshot.reserve0 * &execution.reserve1;
        let partial_int = &snapshot.reserve0 * &snapshot.reserve1;

        // The numerator cancels down from the size of `partial`, and delta can
        // be as small as 1 / cross_snapshot
        let width = decimal_digits(&partial_int).max(decimal_digits(&cross_snapshot));
        let working = self.config.working_precision(width + GUARD_DIGITS)?;
        let rounding = self.config.rounding_mode();
        let context = Context::new(working, rounding);

        let r0_snap = BigDecimal::from(snapshot.reserve0.clone());
        let r1_snap = BigDecimal::from(snapshot.reserve1.clone());
        let r0_exec = BigDecimal::from(execution.reserve0.clone());
        let r1_exec = BigDecimal::from(execution.reserve1.clone());

        let execution_spot = divide(&r0_exec, &r1_exec, working, rounding);
        let snapshot_spot = divide(&r0_snap, &r1_snap, working, rounding);
        let delta = divide(
            &BigDecimal::from((&cross_execution - &cross_snapshot).abs()),
            &BigDecimal::from(cross_snapshot),
            working,
            rounding,
        );

        let partial = BigDecimal::from(partial_int);
        let numerator_partial1 = &sqrt(&context, "partial", &partial)?
            * &sqrt(&context, "reserve0_snapshot", &r0_snap)?;
        let numerator_partial2 = sqrt(
            &context,
            "shifted_reserve1_snapshot",
            &(&(&delta * &r1_snap) + &r1_snap),
        )?;
        let numerator = &(&numerator_partial1 * &numerator_partial2) - &partial;

        let unscaled = divide(&numerator, &r1_snap, working, rounding);
        let result = scale_x64(&unscaled).with_precision_round(working, rounding);

        debug!(
            execution_spot = %execution_spot,
            snapshot_spot = %snapshot_spot,
            delta = %delta,
            result = %result,
            "alpha_x evaluated"
        );

        Ok(AlphaXBreakdown {
            execution_spot,
            snapshot_spot,
            delta,
            partial,
            numerator_partial1,
            numerator_partial2,
            numerator,
            unscaled,
            result,
        })
    }
}

fn require_positive(name: &'static str, value: &BigInt) -> AlphaResult<()> {
    if !value.is_positive() {
        warn!(input = name, value = %value, "rejecting non-positive reserve");
        return Err(AlphaError::not_positive(name, value));
    }
    Ok(())
}

/// Upper bound on the number of decimal digits of `value`
fn decimal_digits(value: &BigInt) -> u64 {
    value.bits() * 30_103 / 100_000 + 1
}

/// `numerator / denominator` to `digits` significant digits
///
/// `BigDecimal`'s `/` stops at a fixed 100 digits; this carries the integer
/// quotient as far as the working precision asks for.
fn divide(
    numerator: &BigDecimal,
    denominator: &BigDecimal,
    digits: NonZeroU64,
    rounding: RoundingMode,
) -> BigDecimal {
    let (num, num_scale) = numerator.as_bigint_and_exponent();
    let (den, den_scale) = denominator.as_bigint_and_exponent();

    // Two spare digits beyond `digits` before the final rounding
    let shift = (digits.get() + decimal_digits(&den) + 2).saturating_sub(decimal_digits(&num));
    let quotient = (num * BigInt::from(10u8).pow(shift as u32)) / den;

    BigDecimal::new(quotient, num_scale - den_scale + shift as i64)
        .with_precision_round(digits, rounding)
}

fn sqrt(context: &Context, stage: &'static str, value: &BigDecimal) -> AlphaResult<BigDecimal> {
    value
        .sqrt_with_context(context)
        .ok_or_else(|| AlphaError::NegativeRadicand {
            stage,
            value: value.to_string(),
        })
}

/// Scaled alphaX with the default configuration
///
/// All four reserves must be strictly positive; otherwise the call fails with
/// [`AlphaError::InvalidArgument`] naming the first offending input.
pub fn calculate_alpha_x(
    reserve0_snapshot: &BigInt,
    reserve1_snapshot: &BigInt,
    reserve0_execution: &BigInt,
    reserve1_execution: &BigInt,
) -> AlphaResult<BigDecimal> {
    AlphaXCalculator::default().calculate(
        &ReservePair::new(reserve0_snapshot.clone(), reserve1_snapshot.clone()),
        &ReservePair::new(reserve0_execution.clone(), reserve1_execution.clone()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_point::q64;
    use num_traits::{One, Zero};
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    fn pair(r0: u64, r1: u64) -> ReservePair {
        ReservePair::new(r0, r1)
    }

    fn unscaled_f64(value: &BigDecimal) -> f64 {
        (value / &BigDecimal::from(q64())).to_f64().unwrap()
    }

    #[test]
    fn test_no_price_movement_is_zero() {
        let breakdown = AlphaXCalculator::default()
            .breakdown(&pair(1000, 1000), &pair(1000, 1000))
            .unwrap();

        assert!(breakdown.delta.is_zero());
        assert_eq!(breakdown.partial, BigDecimal::from(1_000_000));
        assert!(breakdown.result.abs() < BigDecimal::from_str("1e-50").unwrap());
        assert_eq!(breakdown.to_x64_integer(), BigInt::zero());
    }

    #[test]
    fn test_ten_percent_move() {
        let breakdown = AlphaXCalculator::default()
            .breakdown(&pair(1000, 1000), &pair(1100, 1000))
            .unwrap();

        assert_eq!(breakdown.execution_spot, BigDecimal::from_str("1.1").unwrap());
        assert_eq!(breakdown.snapshot_spot, BigDecimal::one());
        assert_eq!(breakdown.delta, BigDecimal::from_str("0.1").unwrap());

        // 1000 * (sqrt(1.1) - 1)
        let reference = 1000.0 * (1.1f64.sqrt() - 1.0);
        let actual = unscaled_f64(&breakdown.result);
        assert!(((actual - reference) / reference).abs() < 1e-9);
    }

    #[test]
    fn test_delta_is_absolute() {
        let calculator = AlphaXCalculator::default();
        let up = calculator
            .breakdown(&pair(1000, 1000), &pair(1100, 1000))
            .unwrap();
        let down = calculator
            .breakdown(&pair(1000, 1000), &pair(900, 1000))
            .unwrap();

        assert_eq!(up.delta, down.delta);
        assert_eq!(up.result, down.result);
    }

    #[test]
    fn test_zero_execution_reserve_is_rejected() {
        let err = calculate_alpha_x(
            &BigInt::from(1000),
            &BigInt::from(1000),
            &BigInt::from(1000),
            &BigInt::from(0),
        )
        .unwrap_err();

        assert_eq!(
            err,
            AlphaError::InvalidArgument {
                name: "reserve1_execution",
                value: BigInt::from(0),
                requirement: "strictly positive",
            }
        );
    }

    #[test]
    fn test_first_offending_input_is_reported() {
        let err = AlphaXCalculator::default()
            .calculate(&ReservePair::new(-5, 0), &pair(1, 1))
            .unwrap_err();

        match err {
            AlphaError::InvalidArgument { name, value, .. } => {
                assert_eq!(name, "reserve0_snapshot");
                assert_eq!(value, BigInt::from(-5));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_huge_reserves_keep_precision() {
        // 18-decimal tokens with 10^12 whole units in the pool
        let big = BigInt::from(10u8).pow(30);
        let snapshot = ReservePair::new(big.clone(), big.clone());
        let execution = ReservePair::new(&big * 11u8, &big * 10u8);

        let breakdown = AlphaXCalculator::default()
            .breakdown(&snapshot, &execution)
            .unwrap();

        assert_eq!(breakdown.delta, BigDecimal::from_str("0.1").unwrap());
        let reference = 1e30 * (1.1f64.sqrt() - 1.0);
        let actual = unscaled_f64(&breakdown.result);
        assert!(((actual - reference) / reference).abs() < 1e-9);
    }

    #[test]
    fn test_no_movement_stays_zero_for_wide_reserves() {
        let calculator = AlphaXCalculator::default();
        for exponent in [40u32, 60, 80, 100, 120, 200, 300] {
            let reserve0 = BigInt::from(10u8).pow(exponent) + 7u8;
            let pool = ReservePair::new(reserve0, 3);

            let breakdown = calculator.breakdown(&pool, &pool).unwrap();
            assert!(breakdown.delta.is_zero());
            assert!(
                breakdown.result.abs() < BigDecimal::from_str("1e-50").unwrap(),
                "residue at 10^{exponent}: {}",
                breakdown.result
            );
            assert_eq!(breakdown.to_x64_integer(), BigInt::zero());
            assert!(breakdown.to_abi_hex().is_ok());
        }
    }

    #[test]
    fn test_tiny_move_on_wide_reserves() {
        // delta = 1e-300 on a 10^300 reserve: 10^300 * (sqrt(1 + 1e-300) - 1) ~ 0.5
        let big = BigInt::from(10u8).pow(300);
        let snapshot = ReservePair::new(big.clone(), 1);
        let execution = ReservePair::new(&big + 1u8, 1);

        let breakdown = AlphaXCalculator::default()
            .breakdown(&snapshot, &execution)
            .unwrap();

        let expected_delta = BigDecimal::new(BigInt::one(), 300);
        assert_eq!(breakdown.delta, expected_delta);

        let half_q64 = BigInt::one() << 63usize;
        let distance = (breakdown.to_x64_integer() - &half_q64).abs();
        assert!(distance <= BigInt::one(), "got {}", breakdown.to_x64_integer());
    }

    #[test]
    fn test_divide_beyond_default_precision() {
        let digits = NonZeroU64::new(150).unwrap();
        let third = divide(
            &BigDecimal::from(1),
            &BigDecimal::from(3),
            digits,
            RoundingMode::HalfEven,
        );
        assert_eq!(third.digits(), 150);
        assert_eq!(third, BigDecimal::from_str(&format!("0.{}", "3".repeat(150))).unwrap());
    }

    #[test]
    fn test_from_decimal_reserves() {
        let pair = ReservePair::from_decimal(dec!(2500), dec!(4000.000)).unwrap();
        assert_eq!(pair, ReservePair::new(2500, 4000));

        assert!(matches!(
            ReservePair::from_decimal(dec!(2500.5), dec!(4000)),
            Err(AlphaError::NonIntegralReserve { .. })
        ));
    }

    #[test]
    fn test_lower_precision_agrees() {
        let coarse = AlphaXCalculator::new(AlphaConfig {
            precision: 30,
            ..AlphaConfig::default()
        })
        .unwrap();

        let fine = AlphaXCalculator::default()
            .calculate(&pair(5000, 7000), &pair(5400, 6500))
            .unwrap();
        let rough = coarse
            .calculate(&pair(5000, 7000), &pair(5400, 6500))
            .unwrap();

        let relative = (&(&fine - &rough) / &fine).abs();
        assert!(relative < BigDecimal::from_str("1e-25").unwrap());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = AlphaXCalculator::new(AlphaConfig {
            precision: 0,
            ..AlphaConfig::default()
        });
        assert!(matches!(result, Err(AlphaError::InvalidConfig { .. })));
    }

    #[test]
    fn test_abi_hex_of_result() {
        let breakdown = AlphaXCalculator::default()
            .breakdown(&pair(1000, 1000), &pair(1000, 1000))
            .unwrap();
        assert_eq!(breakdown.to_abi_hex().unwrap(), format!("0x{}", "0".repeat(64)));
    }
}
