//! Collateral ratio arithmetic.
//!
//! CR (bips) = `collateral * BIPS / (liability * numerator / denominator)`.
//! Comparisons are done cross-multiplied so no precision is lost.

use super::math::{mul_div, mul_div_ceil, narrow, wide_mul};
use crate::domain::{Amount, PoolError, PriceRatio, BIPS};

/// Current collateral ratio in bips, `None` when nothing is backed.
pub fn collateral_ratio_bips(
    collateral: Amount,
    liability: Amount,
    price: &PriceRatio,
) -> Result<Option<u128>, PoolError> {
    if liability == 0 {
        return Ok(None);
    }
    let numerator = wide_mul(&[collateral, price.denominator, BIPS as u128])?;
    let denominator = wide_mul(&[liability, price.numerator])?;
    // Saturate instead of failing: an absurdly high CR is still "above".
    let ratio = numerator / denominator;
    Ok(Some(narrow(ratio).unwrap_or(u128::MAX)))
}

/// Whether `collateral` backs `liability` at `threshold_bips` or better.
pub fn is_at_or_above(
    collateral: Amount,
    liability: Amount,
    price: &PriceRatio,
    threshold_bips: u32,
) -> Result<bool, PoolError> {
    if liability == 0 {
        return Ok(true);
    }
    let lhs = wide_mul(&[collateral, price.denominator, BIPS as u128])?;
    let rhs = wide_mul(&[threshold_bips as u128, liability, price.numerator])?;
    Ok(lhs >= rhs)
}

/// Whether the ratio after a change is no worse than before it.
/// Price cancels out of the comparison.
pub fn is_not_worse(
    collateral_before: Amount,
    liability_before: Amount,
    collateral_after: Amount,
    liability_after: Amount,
) -> Result<bool, PoolError> {
    if liability_after == 0 {
        return Ok(true);
    }
    if liability_before == 0 {
        return Ok(false);
    }
    let lhs = wide_mul(&[collateral_after, liability_before])?;
    let rhs = wide_mul(&[collateral_before, liability_after])?;
    Ok(lhs >= rhs)
}

/// Largest liability `collateral` can back at `threshold_bips`, rounded down.
pub fn max_backed_liability(
    collateral: Amount,
    price: &PriceRatio,
    threshold_bips: u32,
) -> Result<Amount, PoolError> {
    let numerator = wide_mul(&[collateral, price.denominator, BIPS as u128])?;
    let denominator = wide_mul(&[price.numerator, threshold_bips as u128])?;
    if denominator.is_zero() {
        return Err(PoolError::MathOverflow);
    }
    Ok(narrow(numerator / denominator).unwrap_or(u128::MAX))
}

/// Collateral needed to match `backing_amount` in value, rounded up.
pub fn collateral_value_of(backing_amount: Amount, price: &PriceRatio) -> Result<Amount, PoolError> {
    mul_div_ceil(backing_amount, price.numerator, price.denominator)
}

/// Backing-asset value of `collateral`, rounded down.
pub fn backing_value_of(collateral: Amount, price: &PriceRatio) -> Result<Amount, PoolError> {
    mul_div(collateral, price.denominator, price.numerator)
}
