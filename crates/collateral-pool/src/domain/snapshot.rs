//! # Persisted Pool State
//!
//! Plain serializable records for the pool aggregate and the holder table.

use super::timelock::TimelockEntry;
use super::value_objects::{Address, Amount};
use crate::config::PoolConfig;
use serde::{Deserialize, Serialize};

/// Pool-wide totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolTotals {
    /// Collateral attributable to the pool.
    pub total_collateral: Amount,
    /// Backing-asset fees held for holders.
    pub fee_reserve: Amount,
    /// Sum of holder fee debt.
    pub total_fee_debt: Amount,
    /// Sum of holder fee credit.
    pub total_fee_credit: Amount,
    /// Shares outstanding.
    pub share_supply: Amount,
}

/// One row of the holder table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderRecord {
    /// Holder address.
    pub address: Address,
    /// Raw share balance.
    pub balance: Amount,
    /// Outstanding fee debt.
    pub fee_debt: Amount,
    /// Fee credit left by seized shares.
    pub fee_credit: Amount,
    /// Timelock entries, oldest first.
    pub timelocks: Vec<TimelockEntry>,
}

impl HolderRecord {
    /// True if the record carries no state.
    pub fn is_empty(&self) -> bool {
        self.balance == 0
            && self.fee_debt == 0
            && self.fee_credit == 0
            && self.timelocks.is_empty()
    }
}

/// Everything needed to rebuild a ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Pool totals.
    pub totals: PoolTotals,
    /// Settings in force.
    pub config: PoolConfig,
    /// Non-empty holders in address order.
    pub holders: Vec<HolderRecord>,
}

/// Records touched by one committed operation.
///
/// An empty holder record means the row is deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDelta {
    /// Totals after the operation.
    pub totals: PoolTotals,
    /// Settings after the operation.
    pub config: PoolConfig,
    /// Touched holders.
    pub holders: Vec<HolderRecord>,
}

impl PoolSnapshot {
    /// Fold a delta into the snapshot, keeping holders in address order.
    pub fn apply(&mut self, delta: &PoolDelta) {
        self.totals = delta.totals;
        self.config = delta.config.clone();
        for record in &delta.holders {
            match self
                .holders
                .binary_search_by(|existing| existing.address.cmp(&record.address))
            {
                Ok(index) if record.is_empty() => {
                    self.holders.remove(index);
                }
                Ok(index) => self.holders[index] = record.clone(),
                Err(_) if record.is_empty() => {}
                Err(index) => self.holders.insert(index, record.clone()),
            }
        }
    }
}
