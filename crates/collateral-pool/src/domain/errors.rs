//! # Domain Errors
//!
//! Error types for the Collateral Pool.
//!
//! Every failure aborts the whole operation; there is no partial effect and
//! no retry inside the engine.

use super::value_objects::{Address, Amount};
use thiserror::Error;

/// Collateral pool error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    // =========================================================================
    // Validation
    // =========================================================================
    /// Entry below the configured minimum.
    #[error("Entry below minimum: {amount} < {minimum}")]
    BelowMinimumEntry {
        /// Contributed collateral
        amount: Amount,
        /// Configured minimum
        minimum: Amount,
    },

    /// First entry into a pool with leftovers does not cover them.
    #[error("Insufficient bootstrap contribution: {provided} < {required}")]
    InsufficientBootstrapContribution {
        /// Contributed collateral
        provided: Amount,
        /// Collateral needed to cover leftover fees and collateral
        required: Amount,
    },

    /// Zero shares requested.
    #[error("Share amount is zero")]
    ZeroShare,

    /// Share amount converts to zero collateral (or zero shares on entry).
    #[error("Share amount too small")]
    ShareTooSmall,

    /// Holder does not own enough shares.
    #[error("Insufficient share balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Requested shares
        requested: Amount,
        /// Holder balance
        available: Amount,
    },

    /// Requested shares include time-locked shares.
    #[error("Insufficient non-timelocked shares: requested {requested}, available {available}")]
    InsufficientNonTimelocked {
        /// Requested shares
        requested: Amount,
        /// Unlocked shares
        available: Amount,
    },

    /// Transfer exceeds the unlocked, debt-free balance.
    #[error("Insufficient transferable shares: requested {requested}, available {available}")]
    InsufficientTransferable {
        /// Requested shares
        requested: Amount,
        /// Transferable shares
        available: Amount,
    },

    /// Fee withdrawal exceeds claimable fees.
    #[error("Insufficient claimable fees: requested {requested}, claimable {claimable}")]
    InsufficientClaimableFees {
        /// Requested amount
        requested: Amount,
        /// Claimable amount
        claimable: Amount,
    },

    /// Fee debt payment of zero.
    #[error("Fee debt payment is zero")]
    ZeroPayment,

    /// Fee debt payment larger than the debt.
    #[error("Payment exceeds fee debt: {amount} > {debt}")]
    ExceedsDebt {
        /// Payment amount
        amount: Amount,
        /// Outstanding debt
        debt: Amount,
    },

    /// Caller has not authorized the pool to pull enough backing asset.
    #[error("Allowance too low: required {required}, allowed {allowed}")]
    AllowanceTooLow {
        /// Amount the pool must pull
        required: Amount,
        /// Authorized amount
        allowed: Amount,
    },

    /// Payout asks for more collateral than the pool holds.
    #[error("Insufficient pool collateral: requested {requested}, available {available}")]
    InsufficientPoolCollateral {
        /// Requested collateral
        requested: Amount,
        /// Pool collateral
        available: Amount,
    },

    /// Rejected pool settings.
    #[error("Invalid pool config: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // Invariant guards
    // =========================================================================
    /// Exit would leave the pool below the exit collateral ratio.
    #[error("Collateral ratio below exit threshold: {ratio_bips} < {required_bips} bips")]
    CRBelowExitThreshold {
        /// Post-exit collateral ratio
        ratio_bips: u128,
        /// Exit threshold
        required_bips: u32,
    },

    /// Exit would leave a non-zero share supply below the floor.
    #[error("Residual share supply too low: {remaining} < {minimum}")]
    ResidualSupplyTooLow {
        /// Remaining supply
        remaining: Amount,
        /// Configured floor
        minimum: Amount,
    },

    /// Exit would leave non-zero collateral below the floor.
    #[error("Residual collateral too low: {remaining} < {minimum}")]
    ResidualCollateralTooLow {
        /// Remaining collateral
        remaining: Amount,
        /// Configured floor
        minimum: Amount,
    },

    /// Entry into a pool whose shares are backed by no collateral.
    #[error("Pool collateral depleted with {supply} shares outstanding")]
    CollateralDepleted {
        /// Outstanding share supply
        supply: Amount,
    },

    /// Arithmetic overflow or division by zero.
    #[error("Math overflow")]
    MathOverflow,

    // =========================================================================
    // Collaborator
    // =========================================================================
    /// Manager could not provide a usable price.
    #[error("Price unavailable: {0}")]
    PriceUnavailable(String),

    /// Manager rejected the redemption as too small.
    #[error("Redemption too small: {amount}")]
    RedemptionTooSmall {
        /// Requested redemption amount
        amount: Amount,
    },

    /// Manager would need too many redemption tickets.
    #[error("Too many outstanding tickets required")]
    TooManyTicketsRequired,

    /// Token ledger rejected a transfer.
    #[error("Token error: {0}")]
    Token(String),

    /// Persistence failure.
    #[error("Storage error: {0}")]
    Storage(String),

    // =========================================================================
    // Authorization
    // =========================================================================
    /// Caller is not allowed to invoke this entry point.
    #[error("Unauthorized caller: {caller:02x?}")]
    Unauthorized {
        /// Rejected caller
        caller: Address,
    },
}

/// Coarse error classification used for logging and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFamily {
    /// Bad input from the caller.
    Validation,
    /// Pool would enter a degenerate state.
    InvariantGuard,
    /// External collaborator failed.
    Collaborator,
    /// Caller lacks permission.
    Authorization,
}

impl ErrorFamily {
    /// Label used in metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorFamily::Validation => "validation",
            ErrorFamily::InvariantGuard => "invariant",
            ErrorFamily::Collaborator => "collaborator",
            ErrorFamily::Authorization => "authorization",
        }
    }
}

impl PoolError {
    /// Classify the error.
    pub fn family(&self) -> ErrorFamily {
        match self {
            PoolError::CRBelowExitThreshold { .. }
            | PoolError::ResidualSupplyTooLow { .. }
            | PoolError::ResidualCollateralTooLow { .. }
            | PoolError::CollateralDepleted { .. }
            | PoolError::MathOverflow => ErrorFamily::InvariantGuard,
            PoolError::PriceUnavailable(_)
            | PoolError::RedemptionTooSmall { .. }
            | PoolError::TooManyTicketsRequired
            | PoolError::Token(_)
            | PoolError::Storage(_) => ErrorFamily::Collaborator,
            PoolError::Unauthorized { .. } => ErrorFamily::Authorization,
            _ => ErrorFamily::Validation,
        }
    }
}
