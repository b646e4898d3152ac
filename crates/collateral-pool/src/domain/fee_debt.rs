//! # Fee Debt Ledger
//!
//! Distributes a growing fee reserve among share holders without touching
//! every holder on deposit.
//!
//! Each share is entitled to an equal slice of the *virtual* reserve, i.e.
//! the fees actually held plus all outstanding debt, less the fee credit of
//! seized shares. An entrant is charged the slice its new shares would
//! otherwise take from existing holders, so a holder's claimable fees are:
//!
//! ```text
//! claimable = virtual_reserve * balance / supply + credit - debt
//! ```
//!
//! Summed over holders this is `virtual_reserve + total_credit - total_debt
//! = fee_reserve`.
//!
//! ## Seized shares
//!
//! A payout burns shares but leaves the holder's debt row untouched. The
//! slice of the virtual reserve those shares owned is moved into the
//! holder's fee credit, which leaves the virtual reserve with them. Other
//! holders' claims stay put and the seized holder keeps the fees it had
//! earned.

use super::errors::PoolError;
use super::value_objects::{Address, Amount};
use crate::algorithms::math::{add, mul_div, mul_div_ceil, sub};
use std::collections::BTreeMap;

/// Fee debt and credit released by burning part of a holder's shares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExitSettlement {
    /// Debt forgiven.
    pub debt: Amount,
    /// Credit consumed.
    pub credit: Amount,
}

/// Per-holder fee debt and seized-share credit, plus running totals.
#[derive(Clone, Debug, Default)]
pub struct FeeDebtLedger {
    total_debt: Amount,
    total_credit: Amount,
    debts: BTreeMap<Address, Amount>,
    credits: BTreeMap<Address, Amount>,
}

impl FeeDebtLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all outstanding debt.
    pub fn total_debt(&self) -> Amount {
        self.total_debt
    }

    /// Sum of all fee credit.
    pub fn total_credit(&self) -> Amount {
        self.total_credit
    }

    /// Outstanding debt of `holder`.
    pub fn debt_of(&self, holder: &Address) -> Amount {
        self.debts.get(holder).copied().unwrap_or(0)
    }

    /// Fee credit of `holder` from seized shares.
    pub fn credit_of(&self, holder: &Address) -> Amount {
        self.credits.get(holder).copied().unwrap_or(0)
    }

    /// Debt not offset by credit.
    pub fn net_debt_of(&self, holder: &Address) -> Amount {
        self.debt_of(holder).saturating_sub(self.credit_of(holder))
    }

    /// Holders with non-zero debt, in address order.
    pub fn debts(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.debts.iter()
    }

    /// Holders with non-zero credit, in address order.
    pub fn credits(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.credits.iter()
    }

    /// Fees held plus all debt, less all credit.
    pub fn virtual_reserve(&self, fee_reserve: Amount) -> Result<Amount, PoolError> {
        sub(add(fee_reserve, self.total_debt)?, self.total_credit)
    }

    /// Held fees no holder has a claim on. Only meaningful at zero supply.
    pub fn unowned_fees(&self, fee_reserve: Amount) -> Amount {
        fee_reserve.saturating_sub(self.total_credit.saturating_sub(self.total_debt))
    }

    /// Pro-rata slice of the virtual reserve owned by `balance` shares.
    pub fn virtual_fees(
        &self,
        fee_reserve: Amount,
        balance: Amount,
        supply: Amount,
    ) -> Result<Amount, PoolError> {
        if supply == 0 || balance == 0 {
            return Ok(0);
        }
        mul_div(self.virtual_reserve(fee_reserve)?, balance, supply)
    }

    /// Fees `holder` may withdraw, clamped at zero.
    pub fn claimable(
        &self,
        holder: &Address,
        fee_reserve: Amount,
        balance: Amount,
        supply: Amount,
    ) -> Result<Amount, PoolError> {
        let virtual_fees = self.virtual_fees(fee_reserve, balance, supply)?;
        Ok(add(virtual_fees, self.credit_of(holder))?.saturating_sub(self.debt_of(holder)))
    }

    /// Shares of `holder` that back its outstanding net debt.
    pub fn debt_locked_shares(
        &self,
        holder: &Address,
        fee_reserve: Amount,
        balance: Amount,
        supply: Amount,
    ) -> Result<Amount, PoolError> {
        let debt = self.net_debt_of(holder);
        let virtual_reserve = self.virtual_reserve(fee_reserve)?;
        if debt == 0 || virtual_reserve == 0 {
            return Ok(0);
        }
        Ok(mul_div_ceil(debt, supply, virtual_reserve)?.min(balance))
    }

    /// Debt to charge for `shares` minted on top of `supply_before`.
    ///
    /// Rounded up so existing holders never lose a unit to the entrant. At
    /// zero supply the entrant takes over the stale net debt, so it can only
    /// claim fees nobody else owns.
    pub fn debt_for_entry(
        &self,
        fee_reserve: Amount,
        shares: Amount,
        supply_before: Amount,
    ) -> Result<Amount, PoolError> {
        if supply_before == 0 {
            return Ok(self.total_debt.saturating_sub(self.total_credit));
        }
        mul_div_ceil(self.virtual_reserve(fee_reserve)?, shares, supply_before)
    }

    /// Debt forgiven and credit consumed when `shares` of `balance` leave.
    pub fn settle_exit(
        &self,
        holder: &Address,
        shares: Amount,
        balance: Amount,
    ) -> Result<ExitSettlement, PoolError> {
        let debt = self.debt_of(holder);
        let credit = self.credit_of(holder);
        if shares >= balance {
            return Ok(ExitSettlement { debt, credit });
        }
        Ok(ExitSettlement {
            debt: mul_div(debt, shares, balance)?,
            credit: mul_div(credit, shares, balance)?,
        })
    }

    /// Apply an exit settlement to `holder`.
    pub fn apply_exit(&mut self, holder: &Address, settlement: &ExitSettlement) -> Result<(), PoolError> {
        let credit = self.credit_of(holder);
        if settlement.credit > credit {
            return Err(PoolError::MathOverflow);
        }
        self.reduce(holder, settlement.debt)?;
        self.total_credit = sub(self.total_credit, settlement.credit)?;
        self.put_credit(*holder, credit - settlement.credit);
        Ok(())
    }

    /// Move the virtual slice of `shares` seized from `holder` into its
    /// credit. Call before the shares are burned.
    pub fn seize(
        &mut self,
        holder: Address,
        fee_reserve: Amount,
        shares: Amount,
        supply: Amount,
    ) -> Result<Amount, PoolError> {
        let slice = self.virtual_fees(fee_reserve, shares, supply)?;
        if slice == 0 {
            return Ok(0);
        }
        let total = add(self.total_credit, slice)?;
        let credit = add(self.credit_of(&holder), slice)?;
        self.credits.insert(holder, credit);
        self.total_credit = total;
        Ok(slice)
    }

    /// Record new debt against `holder`.
    pub fn charge(&mut self, holder: Address, amount: Amount) -> Result<(), PoolError> {
        if amount == 0 {
            return Ok(());
        }
        let total = add(self.total_debt, amount)?;
        let debt = add(self.debt_of(&holder), amount)?;
        self.debts.insert(holder, debt);
        self.total_debt = total;
        Ok(())
    }

    /// Remove `amount` of debt from `holder`.
    pub fn reduce(&mut self, holder: &Address, amount: Amount) -> Result<(), PoolError> {
        let debt = self.debt_of(holder);
        if amount > debt {
            return Err(PoolError::ExceedsDebt { amount, debt });
        }
        if amount == 0 {
            return Ok(());
        }
        self.total_debt = sub(self.total_debt, amount)?;
        self.put_debt(*holder, debt - amount);
        Ok(())
    }

    /// Overwrite the debt of `holder` (checkpoint restore, load).
    pub(crate) fn put_debt(&mut self, holder: Address, debt: Amount) {
        if debt == 0 {
            self.debts.remove(&holder);
        } else {
            self.debts.insert(holder, debt);
        }
    }

    /// Overwrite the credit of `holder` (checkpoint restore, load).
    pub(crate) fn put_credit(&mut self, holder: Address, credit: Amount) {
        if credit == 0 {
            self.credits.remove(&holder);
        } else {
            self.credits.insert(holder, credit);
        }
    }

    /// Overwrite the totals (checkpoint restore, load).
    pub(crate) fn set_totals(&mut self, total_debt: Amount, total_credit: Amount) {
        self.total_debt = total_debt;
        self.total_credit = total_credit;
    }
}
