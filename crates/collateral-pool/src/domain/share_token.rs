//! # Share Token
//!
//! Pool-token ledger: raw balances and the total supply, plus one timelock
//! queue per holder. Transfer restrictions live in [`TransferPolicy`]; the
//! ledger only asks it before moving balance.
//!
//! INVARIANT-3: `supply` equals the sum of all account balances.

use super::errors::PoolError;
use super::timelock::TimelockQueue;
use super::transfer_policy::TransferPolicy;
use super::value_objects::{Address, Amount, Timestamp};
use std::collections::BTreeMap;

/// One holder's share position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShareAccount {
    /// Raw shares owned.
    pub balance: Amount,
    /// Locks on freshly minted shares.
    pub timelocks: TimelockQueue,
}

impl ShareAccount {
    /// True if the account carries no state.
    pub fn is_empty(&self) -> bool {
        self.balance == 0 && self.timelocks.is_empty()
    }
}

/// Balance ledger for pool shares.
#[derive(Clone, Debug, Default)]
pub struct ShareToken {
    supply: Amount,
    accounts: BTreeMap<Address, ShareAccount>,
}

impl ShareToken {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total shares outstanding.
    pub fn supply(&self) -> Amount {
        self.supply
    }

    /// Raw balance of `holder`.
    pub fn balance_of(&self, holder: &Address) -> Amount {
        self.accounts.get(holder).map_or(0, |a| a.balance)
    }

    /// Account of `holder`, if any.
    pub fn account(&self, holder: &Address) -> Option<&ShareAccount> {
        self.accounts.get(holder)
    }

    /// All accounts in address order.
    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &ShareAccount)> {
        self.accounts.iter()
    }

    /// Shares of `holder` still locked at `now`.
    pub fn timelocked_balance(&self, holder: &Address, now: Timestamp) -> Amount {
        self.accounts
            .get(holder)
            .map_or(0, |a| a.timelocks.locked_amount(now).min(a.balance))
    }

    /// Mint `shares` to `holder`, locked until `unlock_time`.
    ///
    /// Returns the effective unlock time.
    pub fn mint(
        &mut self,
        holder: Address,
        shares: Amount,
        unlock_time: Timestamp,
    ) -> Result<Timestamp, PoolError> {
        let supply = self
            .supply
            .checked_add(shares)
            .ok_or(PoolError::MathOverflow)?;
        let account = self.accounts.entry(holder).or_default();
        account.balance = account
            .balance
            .checked_add(shares)
            .ok_or(PoolError::MathOverflow)?;
        let unlock_time = account.timelocks.push(shares, unlock_time);
        self.supply = supply;
        Ok(unlock_time)
    }

    /// Burn `shares` from `holder`, ignoring locks.
    ///
    /// Unlocked shares go first; locks are released oldest first only for the
    /// part that exceeds the unlocked balance.
    pub fn burn(&mut self, holder: &Address, shares: Amount, now: Timestamp) -> Result<(), PoolError> {
        let balance = self.balance_of(holder);
        if shares > balance {
            return Err(PoolError::InsufficientBalance {
                requested: shares,
                available: balance,
            });
        }
        if shares == 0 {
            return Ok(());
        }
        let account = self
            .accounts
            .get_mut(holder)
            .ok_or(PoolError::InsufficientBalance {
                requested: shares,
                available: 0,
            })?;
        let locked = account.timelocks.locked_amount(now);
        account.balance -= shares;
        let excess_locked = locked.saturating_sub(account.balance);
        if excess_locked > 0 {
            account.timelocks.consume_locked(now, excess_locked);
        }
        account.timelocks.consume_expired(now, shares);
        if account.is_empty() {
            self.accounts.remove(holder);
        }
        self.supply -= shares;
        Ok(())
    }

    /// Move `amount` from `from` to `to` after the policy approves it.
    ///
    /// Only raw balance moves; the receiver's locks are untouched.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: Address,
        amount: Amount,
        policy: &TransferPolicy,
        now: Timestamp,
    ) -> Result<(), PoolError> {
        let balance = self.balance_of(from);
        policy.authorize_transfer(balance, amount)?;
        if amount == 0 || *from == to {
            return Ok(());
        }
        let receiver_balance = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(PoolError::MathOverflow)?;

        if let Some(sender) = self.accounts.get_mut(from) {
            sender.balance -= amount;
            sender.timelocks.consume_expired(now, amount);
            if sender.is_empty() {
                self.accounts.remove(from);
            }
        }
        self.accounts.entry(to).or_default().balance = receiver_balance;
        Ok(())
    }

    /// Garbage-collect up to `max_entries` expired locks of `holder`.
    pub fn cleanup_expired(&mut self, holder: &Address, now: Timestamp, max_entries: usize) -> bool {
        match self.accounts.get_mut(holder) {
            Some(account) => account.timelocks.cleanup(now, max_entries),
            None => true,
        }
    }

    /// Replace the account of `holder` wholesale (checkpoint restore, load).
    pub(crate) fn put_account(&mut self, holder: Address, account: Option<ShareAccount>) {
        match account {
            Some(account) if !account.is_empty() => {
                self.accounts.insert(holder, account);
            }
            _ => {
                self.accounts.remove(&holder);
            }
        }
    }

    /// Overwrite the supply (checkpoint restore, load).
    pub(crate) fn set_supply(&mut self, supply: Amount) {
        self.supply = supply;
    }
}
