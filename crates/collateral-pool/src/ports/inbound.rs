//! # Inbound Ports
//!
//! API trait defining what the collateral pool offers to holders and the
//! Manager. Every mutating call names its caller.

use crate::config::PoolConfig;
use crate::domain::{
    Address, Amount, EnterReceipt, ExitReceipt, PoolError, SelfCloseReceipt, SelfCloseRequest,
};

/// Collateral pool API - inbound port.
pub trait CollateralPoolApi: Send + Sync {
    /// Contribute `collateral` and receive time-locked shares.
    fn enter(&self, caller: Address, collateral: Amount) -> Result<EnterReceipt, PoolError>;

    /// Burn shares for collateral and the matching fee share.
    fn exit(
        &self,
        caller: Address,
        shares: Amount,
        recipient: Option<Address>,
    ) -> Result<ExitReceipt, PoolError>;

    /// Exit while redeeming enough backing asset to keep the pool CR intact.
    fn self_close_exit(
        &self,
        caller: Address,
        request: SelfCloseRequest,
    ) -> Result<SelfCloseReceipt, PoolError>;

    /// Withdraw claimable fees in backing asset.
    fn withdraw_fees(
        &self,
        caller: Address,
        amount: Amount,
        recipient: Option<Address>,
    ) -> Result<(), PoolError>;

    /// Repay fee debt from the caller's backing-asset allowance.
    fn pay_fee_debt(&self, caller: Address, amount: Amount) -> Result<(), PoolError>;

    /// Move unlocked, debt-free shares.
    fn transfer(&self, caller: Address, to: Address, amount: Amount) -> Result<(), PoolError>;

    /// Garbage-collect expired timelocks of `holder`. Never fails.
    fn cleanup_expired_timelocks(&self, holder: Address, max_entries: usize) -> bool;

    // Manager only

    /// Credit backing-asset fee income already sent to the pool.
    fn deposit_fees(&self, caller: Address, amount: Amount) -> Result<(), PoolError>;

    /// Credit collateral already sent to the pool.
    fn receive_collateral(&self, caller: Address, amount: Amount) -> Result<(), PoolError>;

    /// Seize shares of `holder` and release collateral to `recipient`.
    fn payout(
        &self,
        caller: Address,
        holder: Address,
        recipient: Address,
        collateral: Amount,
        shares_to_burn: Amount,
    ) -> Result<(), PoolError>;

    /// Replace the pool settings.
    fn update_config(&self, caller: Address, config: PoolConfig) -> Result<(), PoolError>;

    // Queries

    /// Fees `holder` may withdraw.
    fn claimable_fees(&self, holder: &Address) -> Result<Amount, PoolError>;

    /// Outstanding fee debt of `holder`.
    fn fee_debt_of(&self, holder: &Address) -> Amount;

    /// Shares `holder` may transfer now.
    fn transferable_balance(&self, holder: &Address) -> Result<Amount, PoolError>;

    /// Shares of `holder` still locked.
    fn timelocked_balance(&self, holder: &Address) -> Amount;

    /// Raw share balance of `holder`.
    fn share_balance(&self, holder: &Address) -> Amount;

    /// Shares of `holder` backing its fee debt.
    fn debt_locked_shares(&self, holder: &Address) -> Result<Amount, PoolError>;

    /// Collateral attributable to the pool.
    fn total_collateral(&self) -> Amount;

    /// Backing-asset fees held.
    fn total_fee_reserve(&self) -> Amount;

    /// Sum of holder fee debt.
    fn total_fee_debt(&self) -> Amount;

    /// Shares outstanding.
    fn total_shares(&self) -> Amount;

    /// Pool CR in bips, `None` without liability.
    fn pool_collateral_ratio_bips(&self) -> Result<Option<u128>, PoolError>;
}
