//! # Self-Close Exit Policy
//!
//! Computes how much backing asset must leave circulation when collateral
//! leaves the pool, so the pool CR is not spoiled by the exit.
//!
//! - Pool at or above the exit CR: burn just enough that the remaining
//!   collateral backs the remaining liability at the exit CR.
//! - Pool below the exit CR: burn the liability's proportional share, which
//!   keeps the CR where it was.

use super::collateral_ratio::{is_at_or_above, max_backed_liability};
use super::math::mul_div_ceil;
use crate::domain::{Amount, PoolError, PriceRatio};

/// Inputs to the burn computation, all observed before the exit.
#[derive(Clone, Copy, Debug)]
pub struct SelfCloseInputs {
    /// Pool collateral before the exit.
    pub total_collateral: Amount,
    /// Collateral leaving with the exit.
    pub collateral_share: Amount,
    /// Backing-asset liability attributed to the pool.
    pub liability: Amount,
    /// Collateral per backing-asset unit.
    pub price: PriceRatio,
    /// Exit threshold in bips.
    pub exit_cr_bips: u32,
}

/// Backing asset that must be redeemed for the exit, never more than the liability.
pub fn required_burn(inputs: &SelfCloseInputs) -> Result<Amount, PoolError> {
    if inputs.liability == 0 || inputs.collateral_share == 0 {
        return Ok(0);
    }

    let above = is_at_or_above(
        inputs.total_collateral,
        inputs.liability,
        &inputs.price,
        inputs.exit_cr_bips,
    )?;

    let burn = if above {
        let remaining = inputs
            .total_collateral
            .saturating_sub(inputs.collateral_share);
        let allowed = max_backed_liability(remaining, &inputs.price, inputs.exit_cr_bips)?;
        inputs.liability.saturating_sub(allowed)
    } else {
        mul_div_ceil(
            inputs.liability,
            inputs.collateral_share,
            inputs.total_collateral,
        )?
    };

    Ok(burn.min(inputs.liability))
}

/// How the required burn is funded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BurnFunding {
    /// Taken from the fee share released by the exit.
    pub from_fees: Amount,
    /// Pulled from the holder's backing-asset allowance.
    pub from_holder: Amount,
    /// Fee share left over for the recipient.
    pub fees_to_recipient: Amount,
}

/// Split a burn between the exit's fee share and the holder's own funds.
pub fn fund_burn(burn: Amount, fee_share: Amount) -> BurnFunding {
    let from_fees = burn.min(fee_share);
    BurnFunding {
        from_fees,
        from_holder: burn - from_fees,
        fees_to_recipient: fee_share - from_fees,
    }
}
