//! # Domain Value Objects
//!
//! Immutable value types for the Collateral Pool.

use super::errors::PoolError;
use serde::{Deserialize, Serialize};

/// Token amount (collateral, backing asset or pool shares).
pub type Amount = u128;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Account address (20-byte).
pub type Address = [u8; 20];

/// Basis points denominator.
pub const BIPS: u32 = 10_000;

/// Price of one backing-asset unit expressed in collateral units,
/// as `numerator / denominator`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRatio {
    /// Collateral units.
    pub numerator: u128,
    /// Backing-asset units.
    pub denominator: u128,
}

impl PriceRatio {
    /// Create a price ratio, rejecting zero components.
    pub fn new(numerator: u128, denominator: u128) -> Result<Self, PoolError> {
        if numerator == 0 || denominator == 0 {
            return Err(PoolError::PriceUnavailable(format!(
                "degenerate price {}/{}",
                numerator, denominator
            )));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }
}

/// Addresses the service acts for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolAccounts {
    /// Custody account of the pool on both token ledgers.
    pub pool: Address,
    /// The Manager: sole caller of administrative entry points.
    pub manager: Address,
}

/// Redemption handed to the Manager during a self-close exit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionRequest {
    /// Holder performing the self-close exit.
    pub redeemer: Address,
    /// Backing-asset amount leaving circulation.
    pub amount: Amount,
    /// Redeem on the underlying chain instead of paying collateral value.
    pub redeem_to_underlying: bool,
    /// Underlying-chain destination (only meaningful for underlying redemption).
    pub destination: String,
    /// Receiver of any collateral-value payout.
    pub recipient: Address,
    /// Optional fee for a redemption executor.
    pub executor_fee: Amount,
}

/// Caller parameters of a self-close exit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfCloseRequest {
    /// Shares to burn.
    pub shares: Amount,
    /// Redeem on the underlying chain instead of taking collateral value.
    pub redeem_to_underlying: bool,
    /// Underlying-chain destination.
    pub destination: String,
    /// Receiver of collateral and leftover fees (defaults to the caller).
    pub recipient: Option<Address>,
    /// Fee for a redemption executor, forwarded to the Manager.
    pub executor_fee: Amount,
}

/// Manager acknowledgement of a redemption.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionReceipt {
    /// Ticket or request identifier, if the Manager issued one.
    pub request_id: Option<u64>,
    /// Collateral paid directly by the Manager (collateral-value redemption).
    pub collateral_paid: Amount,
}

/// Result of a successful entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnterReceipt {
    /// Shares minted.
    pub shares: Amount,
    /// Fee debt charged to the entrant.
    pub fee_debt: Amount,
    /// Time at which the new shares unlock.
    pub unlock_time: Timestamp,
}

/// Result of a successful exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExitReceipt {
    /// Shares burned.
    pub shares: Amount,
    /// Collateral released.
    pub collateral: Amount,
    /// Backing-asset fees released along with the collateral.
    pub fees: Amount,
    /// Fee debt forgiven.
    pub debt_forgiven: Amount,
}

/// Result of a successful self-close exit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelfCloseReceipt {
    /// The underlying exit.
    pub exit: ExitReceipt,
    /// Backing asset redeemed through the Manager.
    pub redeemed: Amount,
    /// Portion of the redemption pulled from the holder's allowance.
    pub pulled_from_holder: Amount,
    /// Manager acknowledgement (absent when nothing had to be redeemed).
    pub redemption: Option<RedemptionReceipt>,
}
