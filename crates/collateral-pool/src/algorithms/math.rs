//! Fixed-point helpers.
//!
//! Products of two `u128` amounts are formed in 256 bits, so only the final
//! narrowing can overflow.

use crate::domain::{Amount, PoolError};
use primitive_types::U256;

/// `a * b / c`, rounded down.
pub fn mul_div(a: u128, b: u128, c: u128) -> Result<Amount, PoolError> {
    if c == 0 {
        return Err(PoolError::MathOverflow);
    }
    narrow((U256::from(a) * U256::from(b)) / U256::from(c))
}

/// `a * b / c`, rounded up.
pub fn mul_div_ceil(a: u128, b: u128, c: u128) -> Result<Amount, PoolError> {
    if c == 0 {
        return Err(PoolError::MathOverflow);
    }
    let product = U256::from(a) * U256::from(b);
    let divisor = U256::from(c);
    let (quotient, remainder) = product.div_mod(divisor);
    let rounded = if remainder.is_zero() {
        quotient
    } else {
        quotient + U256::one()
    };
    narrow(rounded)
}

/// Checked product of up to three factors in 256 bits.
pub fn wide_mul(factors: &[u128]) -> Result<U256, PoolError> {
    factors.iter().try_fold(U256::one(), |acc, f| {
        acc.checked_mul(U256::from(*f)).ok_or(PoolError::MathOverflow)
    })
}

/// Narrow a 256-bit value back to an amount.
pub fn narrow(value: U256) -> Result<Amount, PoolError> {
    if value > U256::from(u128::MAX) {
        return Err(PoolError::MathOverflow);
    }
    Ok(value.low_u128())
}

/// Checked addition.
pub fn add(a: Amount, b: Amount) -> Result<Amount, PoolError> {
    a.checked_add(b).ok_or(PoolError::MathOverflow)
}

/// Checked subtraction.
pub fn sub(a: Amount, b: Amount) -> Result<Amount, PoolError> {
    a.checked_sub(b).ok_or(PoolError::MathOverflow)
}
