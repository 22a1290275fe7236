//! Fixed18 arithmetic on 256-bit unsigned integers
//!
//! All reserve and liquidity quantities are `U256` values scaled by 10^18.
//! Products are formed in 512 bits and narrowed only after division, so an
//! intermediate `a * b` never wraps. Any result that does not fit back into
//! 256 bits is reported as [`AmmError::ArithmeticOverflow`]; nothing saturates.

use crate::error::{AmmError, AmmResult};
use ethers_core::types::{U256, U512};
use rust_decimal::Decimal;

/// Number of decimal places carried by every amount
pub const DECIMALS: u32 = 18;

/// 10^18, the fixed18 scale factor
pub fn wad() -> U256 {
    U256::exp10(DECIMALS as usize)
}

/// Scale a whole number of units to fixed18 (`units(1000) == 1000 * 10^18`)
pub fn units(whole: u64) -> U256 {
    U256::from(whole) * wad()
}

/// `floor(a * b / denominator)` with a 512-bit intermediate product
pub fn mul_div(a: U256, b: U256, denominator: U256) -> AmmResult<U256> {
    if denominator.is_zero() {
        return Err(AmmError::DivisionByZero);
    }
    let quotient = a.full_mul(b) / U512::from(denominator);
    narrow(quotient)
}

/// `ceil(a * b / denominator)` with a 512-bit intermediate product
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> AmmResult<U256> {
    if denominator.is_zero() {
        return Err(AmmError::DivisionByZero);
    }
    let product = a.full_mul(b);
    let denominator = U512::from(denominator);
    let mut quotient = product / denominator;
    if !(product % denominator).is_zero() {
        quotient += U512::one();
    }
    narrow(quotient)
}

/// `floor(sqrt(a * b))`, the geometric mean of two amounts
pub fn sqrt_product(a: U256, b: U256) -> AmmResult<U256> {
    narrow(a.full_mul(b).integer_sqrt())
}

pub fn checked_add(a: U256, b: U256) -> AmmResult<U256> {
    a.checked_add(b).ok_or(AmmError::ArithmeticOverflow)
}

pub fn checked_sub(a: U256, b: U256) -> AmmResult<U256> {
    a.checked_sub(b).ok_or(AmmError::ArithmeticOverflow)
}

pub fn checked_mul(a: U256, b: U256) -> AmmResult<U256> {
    a.checked_mul(b).ok_or(AmmError::ArithmeticOverflow)
}

/// Exact product of two reserves, used for the constant-product check
pub fn product(a: U256, b: U256) -> U512 {
    a.full_mul(b)
}

/// Convert a fixed18 value to a `Decimal` for display.
///
/// Returns `None` when the value exceeds the 96-bit mantissa `Decimal` carries.
pub fn to_decimal(value: U256) -> Option<Decimal> {
    if value > U256::from(u128::MAX) {
        return None;
    }
    let raw = i128::try_from(value.as_u128()).ok()?;
    Decimal::try_from_i128_with_scale(raw, DECIMALS).ok()
}

fn narrow(value: U512) -> AmmResult<U256> {
    U256::try_from(value).map_err(|_| AmmError::ArithmeticOverflow)
}
