//! Error types for reserve-deviation calculations
//!
//! Every fallible operation in this crate returns [`AlphaError`]. Inputs are
//! validated up front, so no NaN or infinity sentinel ever escapes a
//! calculation: a precondition violation fails the whole call.

use num_bigint::BigInt;
use thiserror::Error;

/// Errors that can occur while computing alphaX and the fixed-point helpers
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AlphaError {
    /// Input violates its sign precondition (reserves must be strictly positive)
    #[error("Invalid argument: {name} = {value} (must be {requirement})")]
    InvalidArgument {
        name: &'static str,
        value: BigInt,
        requirement: &'static str,
    },

    /// Square root of a negative intermediate
    #[error("Negative radicand at {stage}: {value}")]
    NegativeRadicand { stage: &'static str, value: String },

    /// Value does not fit the target fixed-point width
    #[error("Overflow: {context}")]
    Overflow { context: String },

    /// Decimal reserve carries a fractional part
    #[error("Reserve {value} is not an integral token amount")]
    NonIntegralReserve { value: String },

    /// Calculator configuration rejected by validation
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl AlphaError {
    pub(crate) fn not_positive(name: &'static str, value: &BigInt) -> Self {
        Self::InvalidArgument {
            name,
            value: value.clone(),
            requirement: "strictly positive",
        }
    }

    pub(crate) fn negative(name: &'static str, value: &BigInt) -> Self {
        Self::InvalidArgument {
            name,
            value: value.clone(),
            requirement: "non-negative",
        }
    }
}

/// Result alias used throughout the crate
pub type AlphaResult<T> = std::result::Result<T, AlphaError>;
