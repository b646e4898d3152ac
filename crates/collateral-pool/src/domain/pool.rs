//! # Pool Ledger
//!
//! Aggregate root of the collateral pool: totals plus the share and fee-debt
//! ledgers, and every state transition on them.
//!
//! The ledger is pure. Price, liability and `now` come in as arguments; token
//! movements and Manager calls are the service's job.
//!
//! ## Invariants Enforced
//!
//! - I1: `total_collateral` moves only through entry, exit, payout and
//!   reported deposits, with checked arithmetic.
//! - I2: holders' claimable fees add up to at most the fees held, up to
//!   rounding (see [`FEE_ROUNDING_SLACK`]).
//! - I3: share supply equals the sum of balances (see [`ShareToken`]).

use super::errors::PoolError;
use super::fee_debt::{ExitSettlement, FeeDebtLedger};
use super::invariants::{
    invariant_exit_collateral_ratio, invariant_fee_backing, invariant_residual_collateral,
    invariant_residual_supply, FEE_ROUNDING_SLACK,
};
use super::share_token::{ShareAccount, ShareToken};
use super::snapshot::{HolderRecord, PoolDelta, PoolSnapshot, PoolTotals};
use super::timelock::TimelockQueue;
use super::transfer_policy::TransferPolicy;
use super::value_objects::{
    Address, Amount, EnterReceipt, ExitReceipt, PriceRatio, Timestamp,
};
use crate::algorithms::collateral_ratio::{collateral_ratio_bips, is_at_or_above, is_not_worse};
use crate::algorithms::math::{add, mul_div, sub};
use crate::algorithms::{collateral_value_of, fund_burn, required_burn, BurnFunding, SelfCloseInputs};
use crate::config::PoolConfig;

/// Manager-reported backing state read at the start of an exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackingState {
    /// Backing-asset liability attributed to the pool.
    pub liability: Amount,
    /// Collateral per backing-asset unit.
    pub price: PriceRatio,
}

/// Validated effects of burning shares, before any guard on the result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExitQuote {
    /// Shares to burn.
    pub shares: Amount,
    /// Collateral released.
    pub collateral: Amount,
    /// Proportional claimable fees released.
    pub fees: Amount,
    /// Proportional fee debt forgiven.
    pub debt_forgiven: Amount,
    /// Proportional fee credit consumed.
    pub credit_used: Amount,
    /// Pool collateral after the exit.
    pub collateral_after: Amount,
    /// Share supply after the exit.
    pub supply_after: Amount,
}

/// A self-close exit that passed every guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelfClosePlan {
    /// The underlying exit.
    pub quote: ExitQuote,
    /// Backing asset that must be redeemed.
    pub burn: Amount,
    /// Where the burned backing asset comes from.
    pub funding: BurnFunding,
}

/// State of the touched records, taken before a mutation.
#[derive(Clone, Debug)]
pub struct LedgerCheckpoint {
    config: PoolConfig,
    totals: PoolTotals,
    holders: Vec<CheckpointRow>,
}

#[derive(Clone, Debug)]
struct CheckpointRow {
    holder: Address,
    account: Option<ShareAccount>,
    debt: Amount,
    credit: Amount,
}

/// The collateral pool aggregate.
#[derive(Clone, Debug)]
pub struct PoolLedger {
    config: PoolConfig,
    total_collateral: Amount,
    fee_reserve: Amount,
    shares: ShareToken,
    fees: FeeDebtLedger,
}

impl PoolLedger {
    /// Empty pool under `config`.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        Ok(Self {
            config,
            total_collateral: 0,
            fee_reserve: 0,
            shares: ShareToken::new(),
            fees: FeeDebtLedger::new(),
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Settings in force.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Pool-wide totals.
    pub fn totals(&self) -> PoolTotals {
        PoolTotals {
            total_collateral: self.total_collateral,
            fee_reserve: self.fee_reserve,
            total_fee_debt: self.fees.total_debt(),
            total_fee_credit: self.fees.total_credit(),
            share_supply: self.shares.supply(),
        }
    }

    /// Collateral attributable to the pool.
    pub fn total_collateral(&self) -> Amount {
        self.total_collateral
    }

    /// Backing-asset fees held.
    pub fn fee_reserve(&self) -> Amount {
        self.fee_reserve
    }

    /// Sum of holder debt.
    pub fn total_fee_debt(&self) -> Amount {
        self.fees.total_debt()
    }

    /// Shares outstanding.
    pub fn share_supply(&self) -> Amount {
        self.shares.supply()
    }

    /// Raw share balance.
    pub fn share_balance(&self, holder: &Address) -> Amount {
        self.shares.balance_of(holder)
    }

    /// Outstanding fee debt.
    pub fn fee_debt_of(&self, holder: &Address) -> Amount {
        self.fees.debt_of(holder)
    }

    /// Fee credit left by seized shares.
    pub fn fee_credit_of(&self, holder: &Address) -> Amount {
        self.fees.credit_of(holder)
    }

    /// Shares still under a timelock at `now`.
    pub fn timelocked_balance(&self, holder: &Address, now: Timestamp) -> Amount {
        self.shares.timelocked_balance(holder, now)
    }

    /// Shares backing the holder's fee debt.
    pub fn debt_locked_shares(&self, holder: &Address) -> Result<Amount, PoolError> {
        self.fees.debt_locked_shares(
            holder,
            self.fee_reserve,
            self.shares.balance_of(holder),
            self.shares.supply(),
        )
    }

    /// Fees the holder may withdraw now.
    ///
    /// Never more than the pool actually holds.
    pub fn claimable_fees(&self, holder: &Address) -> Result<Amount, PoolError> {
        let claimable = self.fees.claimable(
            holder,
            self.fee_reserve,
            self.shares.balance_of(holder),
            self.shares.supply(),
        )?;
        Ok(claimable.min(self.fee_reserve))
    }

    /// Transfer gate for `holder` at `now`.
    pub fn transfer_policy(&self, holder: &Address, now: Timestamp) -> Result<TransferPolicy, PoolError> {
        Ok(TransferPolicy::new(
            self.shares.timelocked_balance(holder, now),
            self.debt_locked_shares(holder)?,
        ))
    }

    /// Shares that may move to a third party.
    pub fn transferable_balance(&self, holder: &Address, now: Timestamp) -> Result<Amount, PoolError> {
        let balance = self.shares.balance_of(holder);
        Ok(self.transfer_policy(holder, now)?.transferable(balance))
    }

    /// Pool CR in bips against `backing`, `None` without liability.
    pub fn collateral_ratio_bips(&self, backing: &BackingState) -> Result<Option<u128>, PoolError> {
        collateral_ratio_bips(self.total_collateral, backing.liability, &backing.price)
    }

    /// Whether an entry right now must value leftover fees.
    pub fn entry_needs_price(&self) -> bool {
        self.shares.supply() == 0 && self.fees.unowned_fees(self.fee_reserve) > 0
    }

    // =========================================================================
    // Entry
    // =========================================================================

    /// Mint shares for `collateral` contributed by `holder`.
    ///
    /// `price` is only consulted when bootstrapping over leftover fees.
    pub fn enter(
        &mut self,
        holder: Address,
        collateral: Amount,
        price: Option<&PriceRatio>,
        now: Timestamp,
    ) -> Result<EnterReceipt, PoolError> {
        if collateral < self.config.min_entry_collateral {
            return Err(PoolError::BelowMinimumEntry {
                amount: collateral,
                minimum: self.config.min_entry_collateral,
            });
        }

        let supply = self.shares.supply();
        let shares = if supply == 0 {
            let required = add(self.bootstrap_fee_value(price)?, self.total_collateral)?;
            if collateral < required {
                return Err(PoolError::InsufficientBootstrapContribution {
                    provided: collateral,
                    required,
                });
            }
            collateral
        } else if self.total_collateral == 0 {
            return Err(PoolError::CollateralDepleted { supply });
        } else {
            let shares = mul_div(collateral, supply, self.total_collateral)?;
            if shares == 0 {
                return Err(PoolError::ShareTooSmall);
            }
            shares
        };

        let fee_debt = self.fees.debt_for_entry(self.fee_reserve, shares, supply)?;
        let total_collateral = add(self.total_collateral, collateral)?;
        let unlock_time = now.saturating_add(self.config.timelock_duration_secs);

        let unlock_time = self.shares.mint(holder, shares, unlock_time)?;
        self.fees.charge(holder, fee_debt)?;
        self.total_collateral = total_collateral;

        Ok(EnterReceipt {
            shares,
            fee_debt,
            unlock_time,
        })
    }

    fn bootstrap_fee_value(&self, price: Option<&PriceRatio>) -> Result<Amount, PoolError> {
        let unowned = self.fees.unowned_fees(self.fee_reserve);
        if unowned == 0 {
            return Ok(0);
        }
        let price = price.ok_or_else(|| {
            PoolError::PriceUnavailable("needed to value leftover fee reserve".to_string())
        })?;
        collateral_value_of(unowned, price)
    }

    // =========================================================================
    // Exit
    // =========================================================================

    /// Validate a burn of `shares` and compute its effects.
    ///
    /// Checks, in order: zero amount, balance, timelock, dust.
    pub fn quote_exit(&self, holder: &Address, shares: Amount, now: Timestamp) -> Result<ExitQuote, PoolError> {
        if shares == 0 {
            return Err(PoolError::ZeroShare);
        }
        let balance = self.shares.balance_of(holder);
        TransferPolicy::new(self.shares.timelocked_balance(holder, now), 0)
            .authorize_exit(balance, shares)?;

        let supply = self.shares.supply();
        let collateral = mul_div(shares, self.total_collateral, supply)?;
        if collateral == 0 {
            return Err(PoolError::ShareTooSmall);
        }

        let claimable = self.claimable_fees(holder)?;
        let fees = if shares == balance {
            claimable
        } else {
            mul_div(claimable, shares, balance)?
        };

        let settlement = self.fees.settle_exit(holder, shares, balance)?;
        Ok(ExitQuote {
            shares,
            collateral,
            fees,
            debt_forgiven: settlement.debt,
            credit_used: settlement.credit,
            collateral_after: sub(self.total_collateral, collateral)?,
            supply_after: sub(supply, shares)?,
        })
    }

    /// Burn `shares` of `holder` for collateral and the matching fee share.
    pub fn exit(
        &mut self,
        holder: &Address,
        shares: Amount,
        backing: &BackingState,
        now: Timestamp,
    ) -> Result<ExitReceipt, PoolError> {
        let quote = self.quote_exit(holder, shares, now)?;
        invariant_exit_collateral_ratio(
            quote.collateral_after,
            quote.supply_after,
            backing.liability,
            &backing.price,
            self.config.exit_collateral_ratio_bips,
        )?;
        self.check_residuals(&quote)?;
        self.apply_exit(holder, &quote, now)?;

        Ok(ExitReceipt {
            shares: quote.shares,
            collateral: quote.collateral,
            fees: quote.fees,
            debt_forgiven: quote.debt_forgiven,
        })
    }

    /// Validate a self-close exit and size its redemption.
    ///
    /// The CR guard is evaluated after the burn: the pool must end at or
    /// above the exit CR, or no worse than it started.
    pub fn plan_self_close(
        &self,
        holder: &Address,
        shares: Amount,
        backing: &BackingState,
        now: Timestamp,
    ) -> Result<SelfClosePlan, PoolError> {
        let quote = self.quote_exit(holder, shares, now)?;
        let exit_cr_bips = self.config.exit_collateral_ratio_bips;
        let burn = required_burn(&SelfCloseInputs {
            total_collateral: self.total_collateral,
            collateral_share: quote.collateral,
            liability: backing.liability,
            price: backing.price,
            exit_cr_bips,
        })?;

        let liability_after = sub(backing.liability, burn)?;
        let emptied = quote.supply_after == 0 && quote.collateral_after == 0;
        let healthy = liability_after == 0
            || emptied
            || is_at_or_above(quote.collateral_after, liability_after, &backing.price, exit_cr_bips)?
            || is_not_worse(
                self.total_collateral,
                backing.liability,
                quote.collateral_after,
                liability_after,
            )?;
        if !healthy {
            let ratio_bips =
                collateral_ratio_bips(quote.collateral_after, liability_after, &backing.price)?
                    .unwrap_or(0);
            return Err(PoolError::CRBelowExitThreshold {
                ratio_bips,
                required_bips: exit_cr_bips,
            });
        }
        self.check_residuals(&quote)?;

        Ok(SelfClosePlan {
            quote,
            burn,
            funding: fund_burn(burn, quote.fees),
        })
    }

    /// Commit a planned self-close exit.
    ///
    /// The whole fee share leaves the reserve; the part not used for the burn
    /// is reported as fees for the recipient.
    pub fn apply_self_close(
        &mut self,
        holder: &Address,
        plan: &SelfClosePlan,
        now: Timestamp,
    ) -> Result<ExitReceipt, PoolError> {
        self.apply_exit(holder, &plan.quote, now)?;
        Ok(ExitReceipt {
            shares: plan.quote.shares,
            collateral: plan.quote.collateral,
            fees: plan.funding.fees_to_recipient,
            debt_forgiven: plan.quote.debt_forgiven,
        })
    }

    fn check_residuals(&self, quote: &ExitQuote) -> Result<(), PoolError> {
        invariant_residual_supply(quote.supply_after, self.config.min_share_supply_after_exit)?;
        invariant_residual_collateral(quote.collateral_after, self.config.min_collateral_after_exit)
    }

    fn apply_exit(&mut self, holder: &Address, quote: &ExitQuote, now: Timestamp) -> Result<(), PoolError> {
        let fee_reserve = sub(self.fee_reserve, quote.fees)?;
        let total_collateral = sub(self.total_collateral, quote.collateral)?;
        self.shares.burn(holder, quote.shares, now)?;
        self.fees.apply_exit(
            holder,
            &ExitSettlement {
                debt: quote.debt_forgiven,
                credit: quote.credit_used,
            },
        )?;
        self.fee_reserve = fee_reserve;
        self.total_collateral = total_collateral;
        Ok(())
    }

    // =========================================================================
    // Fees
    // =========================================================================

    /// Withdraw `amount` of claimable fees.
    ///
    /// The withdrawn amount is booked as debt so the virtual reserve, and with
    /// it every other holder's claim, stays put.
    pub fn withdraw_fees(&mut self, holder: &Address, amount: Amount) -> Result<(), PoolError> {
        let claimable = self.claimable_fees(holder)?;
        if amount > claimable {
            return Err(PoolError::InsufficientClaimableFees {
                requested: amount,
                claimable,
            });
        }
        let fee_reserve = sub(self.fee_reserve, amount)?;
        self.fees.charge(*holder, amount)?;
        self.fee_reserve = fee_reserve;
        Ok(())
    }

    /// Repay `amount` of fee debt into the reserve.
    pub fn pay_fee_debt(&mut self, holder: &Address, amount: Amount) -> Result<(), PoolError> {
        if amount == 0 {
            return Err(PoolError::ZeroPayment);
        }
        let fee_reserve = add(self.fee_reserve, amount)?;
        self.fees.reduce(holder, amount)?;
        self.fee_reserve = fee_reserve;
        Ok(())
    }

    /// Credit fee income reported by the Manager.
    pub fn deposit_fees(&mut self, amount: Amount) -> Result<(), PoolError> {
        self.fee_reserve = add(self.fee_reserve, amount)?;
        Ok(())
    }

    /// Credit collateral reported by the Manager.
    pub fn receive_collateral(&mut self, amount: Amount) -> Result<(), PoolError> {
        self.total_collateral = add(self.total_collateral, amount)?;
        Ok(())
    }

    // =========================================================================
    // Administrative
    // =========================================================================

    /// Seize `shares` of `holder` and release `collateral`.
    ///
    /// Ignores timelocks and debt; the holder's debt stays outstanding. The
    /// fee slice of the seized shares becomes the holder's fee credit, so
    /// nobody else's claim moves.
    pub fn payout(
        &mut self,
        holder: &Address,
        collateral: Amount,
        shares: Amount,
        now: Timestamp,
    ) -> Result<(), PoolError> {
        let balance = self.shares.balance_of(holder);
        if shares > balance {
            return Err(PoolError::InsufficientBalance {
                requested: shares,
                available: balance,
            });
        }
        if collateral > self.total_collateral {
            return Err(PoolError::InsufficientPoolCollateral {
                requested: collateral,
                available: self.total_collateral,
            });
        }
        self.fees
            .seize(*holder, self.fee_reserve, shares, self.shares.supply())?;
        self.shares.burn(holder, shares, now)?;
        self.total_collateral -= collateral;
        Ok(())
    }

    /// Replace the settings.
    pub fn update_config(&mut self, config: PoolConfig) -> Result<(), PoolError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    // =========================================================================
    // Shares
    // =========================================================================

    /// Move unlocked, debt-free shares to `to`.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: Address,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), PoolError> {
        let policy = self.transfer_policy(from, now)?;
        self.shares.transfer(from, to, amount, &policy, now)
    }

    /// Remove up to `max_entries` expired timelocks of `holder`.
    pub fn cleanup_expired_timelocks(&mut self, holder: &Address, max_entries: usize, now: Timestamp) -> bool {
        self.shares.cleanup_expired(holder, now, max_entries)
    }

    // =========================================================================
    // Checkpoint / persistence
    // =========================================================================

    /// Capture totals and the given holders.
    pub fn checkpoint(&self, holders: &[Address]) -> LedgerCheckpoint {
        LedgerCheckpoint {
            config: self.config.clone(),
            totals: self.totals(),
            holders: holders
                .iter()
                .map(|h| CheckpointRow {
                    holder: *h,
                    account: self.shares.account(h).cloned(),
                    debt: self.fees.debt_of(h),
                    credit: self.fees.credit_of(h),
                })
                .collect(),
        }
    }

    /// Roll back to a checkpoint taken before the current operation.
    pub fn restore(&mut self, checkpoint: LedgerCheckpoint) {
        self.config = checkpoint.config;
        self.total_collateral = checkpoint.totals.total_collateral;
        self.fee_reserve = checkpoint.totals.fee_reserve;
        self.shares.set_supply(checkpoint.totals.share_supply);
        self.fees.set_totals(
            checkpoint.totals.total_fee_debt,
            checkpoint.totals.total_fee_credit,
        );
        for row in checkpoint.holders {
            self.shares.put_account(row.holder, row.account);
            self.fees.put_debt(row.holder, row.debt);
            self.fees.put_credit(row.holder, row.credit);
        }
    }

    /// Persistable row of `holder`.
    pub fn holder_record(&self, holder: &Address) -> HolderRecord {
        let account = self.shares.account(holder);
        HolderRecord {
            address: *holder,
            balance: account.map_or(0, |a| a.balance),
            fee_debt: self.fees.debt_of(holder),
            fee_credit: self.fees.credit_of(holder),
            timelocks: account
                .map(|a| a.timelocks.iter().copied().collect())
                .unwrap_or_default(),
        }
    }

    /// Records touched by an operation on `holders`.
    pub fn delta(&self, holders: &[Address]) -> PoolDelta {
        PoolDelta {
            totals: self.totals(),
            config: self.config.clone(),
            holders: holders.iter().map(|h| self.holder_record(h)).collect(),
        }
    }

    /// Full persistable state.
    pub fn snapshot(&self) -> PoolSnapshot {
        let holders = self.holders();
        PoolSnapshot {
            totals: self.totals(),
            config: self.config.clone(),
            holders: holders.iter().map(|h| self.holder_record(h)).collect(),
        }
    }

    /// Every holder with shares, debt or credit, in address order.
    fn holders(&self) -> Vec<Address> {
        let mut holders: Vec<Address> = self.shares.accounts().map(|(h, _)| *h).collect();
        holders.extend(self.fees.debts().map(|(h, _)| *h));
        holders.extend(self.fees.credits().map(|(h, _)| *h));
        holders.sort_unstable();
        holders.dedup();
        holders
    }

    /// Rebuild a ledger, rejecting snapshots whose totals disagree with rows.
    pub fn from_snapshot(snapshot: PoolSnapshot) -> Result<Self, PoolError> {
        let mut ledger = Self::new(snapshot.config)?;
        let mut supply: Amount = 0;
        let mut debt: Amount = 0;
        let mut credit: Amount = 0;
        for record in snapshot.holders {
            supply = add(supply, record.balance)?;
            debt = add(debt, record.fee_debt)?;
            credit = add(credit, record.fee_credit)?;
            ledger.shares.put_account(
                record.address,
                Some(ShareAccount {
                    balance: record.balance,
                    timelocks: TimelockQueue::from_entries(record.timelocks),
                }),
            );
            ledger.fees.put_debt(record.address, record.fee_debt);
            ledger.fees.put_credit(record.address, record.fee_credit);
        }
        let totals = snapshot.totals;
        if supply != totals.share_supply
            || debt != totals.total_fee_debt
            || credit != totals.total_fee_credit
        {
            return Err(PoolError::Storage(format!(
                "snapshot totals mismatch: supply {} vs {}, debt {} vs {}, credit {} vs {}",
                supply,
                totals.share_supply,
                debt,
                totals.total_fee_debt,
                credit,
                totals.total_fee_credit
            )));
        }
        ledger.shares.set_supply(supply);
        ledger.fees.set_totals(debt, credit);
        ledger.total_collateral = totals.total_collateral;
        ledger.fee_reserve = totals.fee_reserve;
        Ok(ledger)
    }

    /// Check I2 and I3 over the whole holder table. O(holders).
    pub fn verify(&self) -> Result<(), PoolError> {
        let supply = self.shares.supply();
        let balances = self
            .shares
            .accounts()
            .try_fold(0, |acc: Amount, (_, a)| add(acc, a.balance))?;
        if balances != supply {
            return Err(PoolError::Storage(format!(
                "share supply {} does not match balances {}",
                supply, balances
            )));
        }
        let debt = self
            .fees
            .debts()
            .try_fold(0, |acc: Amount, (_, d)| add(acc, *d))?;
        let credit = self
            .fees
            .credits()
            .try_fold(0, |acc: Amount, (_, c)| add(acc, *c))?;
        if debt != self.fees.total_debt() || credit != self.fees.total_credit() {
            return Err(PoolError::Storage(format!(
                "fee totals (debt {}, credit {}) do not match holders (debt {}, credit {})",
                self.fees.total_debt(),
                self.fees.total_credit(),
                debt,
                credit
            )));
        }

        let holders = self.holders();
        let mut claimable: Amount = 0;
        for holder in &holders {
            claimable = add(
                claimable,
                self.fees.claimable(
                    holder,
                    self.fee_reserve,
                    self.shares.balance_of(holder),
                    supply,
                )?,
            )?;
        }
        if !invariant_fee_backing(claimable, self.fee_reserve, holders.len()) {
            return Err(PoolError::Storage(format!(
                "claimable fees {} exceed fee reserve {} (slack {} per holder)",
                claimable, self.fee_reserve, FEE_ROUNDING_SLACK
            )));
        }
        Ok(())
    }
}
