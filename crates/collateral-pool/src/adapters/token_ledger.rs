//! In-memory fungible token ledger.

use crate::domain::{Address, Amount, PoolError};
use crate::ports::TokenLedger;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
}

/// In-memory implementation of `TokenLedger` for tests and simulations.
///
/// Clones share the same balances.
#[derive(Clone, Debug)]
pub struct InMemoryTokenLedger {
    symbol: &'static str,
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryTokenLedger {
    /// Empty ledger for the token `symbol`.
    pub fn new(symbol: &'static str) -> Self {
        Self {
            symbol,
            state: Arc::new(RwLock::new(LedgerState::default())),
        }
    }

    /// Token symbol used in error messages.
    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    /// Create `amount` out of thin air for `account`.
    pub fn mint(&self, account: Address, amount: Amount) {
        let mut state = self.state.write();
        let balance = state.balances.entry(account).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Let `spender` pull up to `amount` from `owner`.
    pub fn approve(&self, owner: Address, spender: Address, amount: Amount) {
        self.state.write().allowances.insert((owner, spender), amount);
    }

    /// Sum of all balances.
    pub fn total_supply(&self) -> Amount {
        self.state.read().balances.values().sum()
    }

    fn move_balance(
        &self,
        state: &mut LedgerState,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), PoolError> {
        let available = state.balances.get(from).copied().unwrap_or(0);
        if amount > available {
            return Err(PoolError::Token(format!(
                "{}: balance {} below transfer of {}",
                self.symbol, available, amount
            )));
        }
        if amount == 0 || from == to {
            return Ok(());
        }
        state.balances.insert(*from, available - amount);
        let receiver = state.balances.entry(*to).or_insert(0);
        *receiver = receiver
            .checked_add(amount)
            .ok_or(PoolError::MathOverflow)?;
        Ok(())
    }
}

impl TokenLedger for InMemoryTokenLedger {
    fn balance_of(&self, account: &Address) -> Result<Amount, PoolError> {
        Ok(self.state.read().balances.get(account).copied().unwrap_or(0))
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Result<Amount, PoolError> {
        Ok(self
            .state
            .read()
            .allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0))
    }

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<(), PoolError> {
        let mut state = self.state.write();
        self.move_balance(&mut state, from, to, amount)?;
        trace!(token = self.symbol, amount = %amount, "transfer");
        Ok(())
    }

    fn transfer_from(
        &self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), PoolError> {
        let mut state = self.state.write();
        let key = (*owner, *spender);
        let allowed = state.allowances.get(&key).copied().unwrap_or(0);
        if amount > allowed {
            return Err(PoolError::AllowanceTooLow {
                required: amount,
                allowed,
            });
        }
        self.move_balance(&mut state, owner, to, amount)?;
        state.allowances.insert(key, allowed - amount);
        trace!(token = self.symbol, amount = %amount, "transfer_from");
        Ok(())
    }
}
