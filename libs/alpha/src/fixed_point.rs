//! Binary fixed-point scaling and `uint256` word encoding
//!
//! On-chain consumers read the results as Q64.64 or Q128.128 integers packed
//! into ABI `uint256` words. Scaling is exact in decimal: 2^-n is written as
//! 5^n / 10^n, so no precision is lost converting back.

use crate::error::{AlphaError, AlphaResult};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{One, Signed};

/// Fractional bits of a Q64.64 value
pub const X64_SHIFT: usize = 64;

/// Fractional bits of a Q128.128 value
pub const X128_SHIFT: usize = 128;

/// Width of an ABI word in bytes
pub const UINT256_BYTES: usize = 32;

/// 2^64
pub fn q64() -> BigInt {
    BigInt::one() << X64_SHIFT
}

/// 2^128
pub fn q128() -> BigInt {
    BigInt::one() << X128_SHIFT
}

/// Multiply by 2^64
pub fn scale_x64(value: &BigDecimal) -> BigDecimal {
    value * &BigDecimal::from(q64())
}

/// Multiply by 2^128
pub fn scale_x128(value: &BigDecimal) -> BigDecimal {
    value * &BigDecimal::from(q128())
}

/// Exact inverse of [`scale_x64`] for an integer fixed-point value
pub fn unscale_x64(raw: &BigInt) -> BigDecimal {
    unscale(raw, X64_SHIFT)
}

/// Exact inverse of [`scale_x128`] for an integer fixed-point value
pub fn unscale_x128(raw: &BigInt) -> BigDecimal {
    unscale(raw, X128_SHIFT)
}

fn unscale(raw: &BigInt, shift: usize) -> BigDecimal {
    let five_pow = BigInt::from(5u8).pow(shift as u32);
    BigDecimal::new(raw * five_pow, shift as i64)
}

/// Drop the fractional part, rounding toward zero like an integer cast
pub fn truncate_to_integer(value: &BigDecimal) -> BigInt {
    let (digits, scale) = value.with_scale(0).into_bigint_and_exponent();
    debug_assert_eq!(scale, 0);
    digits
}

/// Encode a non-negative integer as a big-endian ABI `uint256` word
pub fn encode_uint256(value: &BigInt) -> AlphaResult<[u8; UINT256_BYTES]> {
    if value.is_negative() {
        return Err(AlphaError::negative("uint256", value));
    }

    let (_, bytes) = value.to_bytes_be();
    if bytes.len() > UINT256_BYTES {
        return Err(AlphaError::Overflow {
            context: format!("{} needs {} bytes, uint256 holds 32", value, bytes.len()),
        });
    }

    let mut word = [0u8; UINT256_BYTES];
    word[UINT256_BYTES - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}

/// `0x`-prefixed hex of the ABI word, as `eth_abi` prints it
pub fn to_abi_hex(value: &BigInt) -> AlphaResult<String> {
    let word = encode_uint256(value)?;
    Ok(format!("0x{}", hex::encode(word)))
}
