//! # Domain Invariants
//!
//! Guards that keep the pool out of degenerate states.
//!
//! - Exit CR: after collateral leaves, the pool must still back its liability
//!   at the exit threshold, unless nothing is backed or the pool is emptied.
//! - Residual floors: a non-zero remainder of supply or collateral must not be
//!   dust.

use super::errors::PoolError;
use super::value_objects::{Amount, PriceRatio};
use crate::algorithms::collateral_ratio::{collateral_ratio_bips, is_at_or_above};

/// Invariant: post-exit collateral ratio.
pub fn invariant_exit_collateral_ratio(
    collateral_after: Amount,
    supply_after: Amount,
    liability: Amount,
    price: &PriceRatio,
    exit_cr_bips: u32,
) -> Result<(), PoolError> {
    if liability == 0 || (supply_after == 0 && collateral_after == 0) {
        return Ok(());
    }
    if is_at_or_above(collateral_after, liability, price, exit_cr_bips)? {
        return Ok(());
    }
    let ratio_bips = collateral_ratio_bips(collateral_after, liability, price)?.unwrap_or(0);
    Err(PoolError::CRBelowExitThreshold {
        ratio_bips,
        required_bips: exit_cr_bips,
    })
}

/// Invariant: remaining supply is zero or at least `minimum`.
pub fn invariant_residual_supply(remaining: Amount, minimum: Amount) -> Result<(), PoolError> {
    if remaining != 0 && remaining < minimum {
        return Err(PoolError::ResidualSupplyTooLow { remaining, minimum });
    }
    Ok(())
}

/// Invariant: remaining collateral is zero or at least `minimum`.
pub fn invariant_residual_collateral(remaining: Amount, minimum: Amount) -> Result<(), PoolError> {
    if remaining != 0 && remaining < minimum {
        return Err(PoolError::ResidualCollateralTooLow { remaining, minimum });
    }
    Ok(())
}

/// Per-holder allowance for claims rounded up past the reserve.
///
/// Entry debt rounds up and exit settlements round down, so a holder's
/// unclamped claim can sit a unit or two below zero; clamping it lifts the
/// sum above the reserve by that much.
pub const FEE_ROUNDING_SLACK: Amount = 2;

/// Invariant I2: the fees all `holders` may claim are held by the pool, up
/// to [`FEE_ROUNDING_SLACK`] per holder.
pub fn invariant_fee_backing(total_claimable: Amount, fee_reserve: Amount, holders: usize) -> bool {
    let slack = FEE_ROUNDING_SLACK.saturating_mul(holders as Amount);
    total_claimable <= fee_reserve.saturating_add(slack)
}
