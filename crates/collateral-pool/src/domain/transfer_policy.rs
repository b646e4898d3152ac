//! # Transfer Policy
//!
//! Gate consulted before shares move to a third party. A share may move only
//! if it is both unlocked and debt-free.

use super::errors::PoolError;
use super::value_objects::Amount;

/// Restrictions on a holder's balance at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransferPolicy {
    /// Shares still under a timelock.
    pub timelocked: Amount,
    /// Shares backing outstanding fee debt.
    pub debt_locked: Amount,
}

impl TransferPolicy {
    /// Build the policy for one holder.
    pub fn new(timelocked: Amount, debt_locked: Amount) -> Self {
        Self {
            timelocked,
            debt_locked,
        }
    }

    /// Shares that may move to a third party.
    pub fn transferable(&self, balance: Amount) -> Amount {
        balance
            .saturating_sub(self.timelocked)
            .min(balance.saturating_sub(self.debt_locked))
    }

    /// Shares that may leave the pool through an exit (debt-locked included).
    pub fn exitable(&self, balance: Amount) -> Amount {
        balance.saturating_sub(self.timelocked)
    }

    /// Reject transfers above the transferable balance.
    pub fn authorize_transfer(&self, balance: Amount, requested: Amount) -> Result<(), PoolError> {
        let available = self.transferable(balance);
        if requested > available {
            return Err(PoolError::InsufficientTransferable {
                requested,
                available,
            });
        }
        Ok(())
    }

    /// Reject exits touching time-locked shares.
    pub fn authorize_exit(&self, balance: Amount, requested: Amount) -> Result<(), PoolError> {
        if requested > balance {
            return Err(PoolError::InsufficientBalance {
                requested,
                available: balance,
            });
        }
        let available = self.exitable(balance);
        if requested > available {
            return Err(PoolError::InsufficientNonTimelocked {
                requested,
                available,
            });
        }
        Ok(())
    }
}
