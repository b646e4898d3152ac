//! # Pool Events
//!
//! Facts emitted after an operation commits.

use super::value_objects::{Address, Amount, Timestamp};
use crate::config::PoolConfig;
use serde::{Deserialize, Serialize};

/// Event kinds published through the event sink.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolEvent {
    /// Collateral entered the pool.
    Entered {
        /// Holder address
        holder: Address,
        /// Collateral amount
        collateral: Amount,
        /// Shares
        shares: Amount,
        /// Fee debt charged
        fee_debt: Amount,
        /// Unlock time of the new shares
        unlock_time: Timestamp,
    },
    /// Shares were burned for collateral and fees.
    Exited {
        /// Holder address
        holder: Address,
        /// Receiver of released assets
        recipient: Address,
        /// Shares
        shares: Amount,
        /// Collateral amount
        collateral: Amount,
        /// Fees released
        fees: Amount,
        /// Fee debt forgiven
        debt_forgiven: Amount,
    },
    /// Backing asset was redeemed as part of a self-close exit.
    SelfCloseRedeemed {
        /// Holder address
        holder: Address,
        /// Backing asset redeemed
        redeemed: Amount,
        /// Funded from the fee share
        from_fees: Amount,
        /// Pulled from the holder
        from_holder: Amount,
        /// Underlying redemption requested
        redeem_to_underlying: bool,
    },
    /// Claimable fees were withdrawn.
    FeesWithdrawn {
        /// Holder address
        holder: Address,
        /// Receiver of released assets
        recipient: Address,
        /// Amount
        amount: Amount,
    },
    /// Fee debt was repaid.
    FeeDebtPaid {
        /// Holder address
        holder: Address,
        /// Amount
        amount: Amount,
    },
    /// Manager reported fee income.
    FeesDeposited {
        /// Amount
        amount: Amount,
    },
    /// Manager reported a collateral deposit.
    CollateralReceived {
        /// Amount
        amount: Amount,
    },
    /// Manager seized shares and collateral.
    PaidOut {
        /// Holder address
        holder: Address,
        /// Receiver of released assets
        recipient: Address,
        /// Collateral amount
        collateral: Amount,
        /// Shares burned
        shares_burned: Amount,
    },
    /// Shares moved between holders.
    Transferred {
        /// Sender
        from: Address,
        /// Receiver
        to: Address,
        /// Amount
        amount: Amount,
    },
    /// Manager changed pool settings.
    ConfigUpdated(PoolConfig),
}

impl PoolEvent {
    /// Short name used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            PoolEvent::Entered { .. } => "entered",
            PoolEvent::Exited { .. } => "exited",
            PoolEvent::SelfCloseRedeemed { .. } => "self_close_redeemed",
            PoolEvent::FeesWithdrawn { .. } => "fees_withdrawn",
            PoolEvent::FeeDebtPaid { .. } => "fee_debt_paid",
            PoolEvent::FeesDeposited { .. } => "fees_deposited",
            PoolEvent::CollateralReceived { .. } => "collateral_received",
            PoolEvent::PaidOut { .. } => "paid_out",
            PoolEvent::Transferred { .. } => "transferred",
            PoolEvent::ConfigUpdated(_) => "config_updated",
        }
    }
}
