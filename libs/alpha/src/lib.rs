//! # Torq Alpha Library - Reserve Deviation Metrics
//!
//! ## Purpose
//!
//! Arbitrary-precision fixed-point metrics derived from AMM pool reserves.
//! The central quantity, **alphaX**, compares the pool's spot price at a
//! snapshot taken before an execution event with the spot price after it, and
//! converts the relative drift into a corrective token0 amount in Q64.64.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Reserve snapshots as `BigInt` (raw token units) or
//!   integral `Decimal` reserves from pool state
//! - **Output Destinations**: On-chain consumers reading Q64.64 / Q128.128
//!   values packed into ABI `uint256` words
//! - **Companion Metrics**: Q128 price divergence between a V3 spot and a V2
//!   outlier, and the Q64.64 logistic fee curve
//!
//! ## Precision
//!
//! - **alphaX / divergence**: `BigDecimal` and `BigInt`, no width limit on
//!   reserves; the result keeps a configurable number of significant digits
//!   (100 by default, see [`AlphaConfig`]) and intermediates are widened by
//!   the digit count of the reserves
//! - **Fee curve**: `Decimal`, deterministic for a given input
//! - **Validation**: non-positive reserves are rejected up front with
//!   [`AlphaError::InvalidArgument`]; no NaN or infinity is ever produced
//!
//! ## Example
//!
//! ```rust
//! use alpha::{calculate_alpha_x, BigDecimal, BigInt};
//!
//! let result = calculate_alpha_x(
//!     &BigInt::from(1000),
//!     &BigInt::from(1000),
//!     &BigInt::from(1100),
//!     &BigInt::from(1000),
//! )
//! .unwrap();
//! assert!(result > BigDecimal::from(0));
//! ```

pub mod alpha_x;
pub mod config;
pub mod divergence;
pub mod error;
pub mod fee_curve;
pub mod fixed_point;

pub use alpha_x::{calculate_alpha_x, AlphaXBreakdown, AlphaXCalculator, ReservePair};
pub use config::{AlphaConfig, RoundingPolicy};
pub use divergence::{price_divergence, price_divergence_x128};
pub use error::{AlphaError, AlphaResult};
pub use fee_curve::{logistic_fee_percent, logistic_fee_x64, FEE_FLOOR_X64};
pub use fixed_point::{encode_uint256, to_abi_hex, truncate_to_integer};

/// Common types for alpha calculations
pub use bigdecimal::BigDecimal;
pub use num_bigint::BigInt;
pub use rust_decimal::Decimal;
