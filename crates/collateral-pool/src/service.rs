//! # Collateral Pool Service
//!
//! The main service implementing the Collateral Pool API.
//!
//! ## Architecture
//!
//! This service:
//! 1. Implements `CollateralPoolApi` on top of the pure [`PoolLedger`]
//! 2. Serializes operations behind one mutex per pool
//! 3. Authorizes Manager-only calls
//! 4. Uses dependency injection for all external collaborators
//!
//! ## Operation Order
//!
//! validation → ledger mutation → persistence → pulls → Manager redemption →
//! releases
//!
//! A failure after the mutation restores the ledger from a checkpoint of the
//! touched records, hands completed pulls back and re-persists the restored
//! state.

use crate::config::PoolConfig;
use crate::domain::{
    Address, Amount, BackingState, EnterReceipt, ExitReceipt, LedgerCheckpoint, PoolAccounts,
    PoolError, PoolEvent, PoolLedger, PoolSnapshot, PoolTotals, RedemptionReceipt,
    RedemptionRequest, SelfClosePlan, SelfCloseReceipt, SelfCloseRequest, Timestamp,
};
use crate::ports::inbound::CollateralPoolApi;
use crate::ports::outbound::{AssetManager, EventSink, PoolStore, TimeSource, TokenLedger};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

#[cfg(feature = "metrics")]
use pool_telemetry::OperationTimer;

/// External collaborators of one pool.
pub struct PoolCollaborators<M, L, S, E, T> {
    /// The Manager.
    pub manager: M,
    /// Collateral token ledger.
    pub collateral: L,
    /// Backing-asset (f-asset) token ledger.
    pub fasset: L,
    /// Durable state.
    pub store: S,
    /// Event publication.
    pub events: E,
    /// Clock.
    pub clock: T,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Asset {
    Collateral,
    FAsset,
}

/// A completed pull, handed back on rollback.
#[derive(Clone, Copy, Debug)]
struct Pull {
    asset: Asset,
    owner: Address,
    amount: Amount,
}

/// The Collateral Pool Service.
pub struct CollateralPoolService<M, L, S, E, T>
where
    M: AssetManager,
    L: TokenLedger,
    S: PoolStore,
    E: EventSink,
    T: TimeSource,
{
    /// Pool custody account and Manager identity.
    accounts: PoolAccounts,
    /// The Manager.
    manager: M,
    /// Collateral token.
    collateral: L,
    /// Backing asset.
    fasset: L,
    /// Persistence.
    store: S,
    /// Event sink.
    events: E,
    /// Time source.
    clock: T,
    /// Pool state; held for the whole operation.
    ledger: Mutex<PoolLedger>,
}

impl<M, L, S, E, T> CollateralPoolService<M, L, S, E, T>
where
    M: AssetManager,
    L: TokenLedger,
    S: PoolStore,
    E: EventSink,
    T: TimeSource,
{
    /// Create a service, restoring state from the store when it holds any.
    ///
    /// A restored pool keeps its persisted settings; `config` only seeds a
    /// fresh pool.
    pub fn new(
        accounts: PoolAccounts,
        collaborators: PoolCollaborators<M, L, S, E, T>,
        config: PoolConfig,
    ) -> Result<Self, PoolError> {
        let ledger = match collaborators.store.load()? {
            Some(snapshot) => {
                let ledger = PoolLedger::from_snapshot(snapshot)?;
                info!(
                    pool = ?accounts.pool,
                    supply = %ledger.share_supply(),
                    collateral = %ledger.total_collateral(),
                    "Collateral pool restored"
                );
                ledger
            }
            None => {
                let ledger = PoolLedger::new(config)?;
                info!(pool = ?accounts.pool, "Collateral pool created");
                ledger
            }
        };

        Ok(Self {
            accounts,
            manager: collaborators.manager,
            collateral: collaborators.collateral,
            fasset: collaborators.fasset,
            store: collaborators.store,
            events: collaborators.events,
            clock: collaborators.clock,
            ledger: Mutex::new(ledger),
        })
    }

    /// Pool custody account and Manager identity.
    pub fn accounts(&self) -> &PoolAccounts {
        &self.accounts
    }

    /// Settings in force.
    pub fn config(&self) -> PoolConfig {
        self.ledger.lock().config().clone()
    }

    /// Aggregate totals.
    pub fn totals(&self) -> PoolTotals {
        self.ledger.lock().totals()
    }

    /// Full state, as the store would persist it.
    pub fn snapshot(&self) -> PoolSnapshot {
        self.ledger.lock().snapshot()
    }

    /// Check supply and fee-backing invariants over every holder.
    pub fn verify(&self) -> Result<(), PoolError> {
        self.ledger.lock().verify()
    }

    // =========================================================================
    // Collaborator helpers
    // =========================================================================

    fn token(&self, asset: Asset) -> &L {
        match asset {
            Asset::Collateral => &self.collateral,
            Asset::FAsset => &self.fasset,
        }
    }

    fn backing_state(&self) -> Result<BackingState, PoolError> {
        let liability = self.manager.backing_liability(&self.accounts.pool)?;
        let price = self.manager.price_ratio()?;
        debug!(liability = %liability, price = ?price, "Backing state read");
        Ok(BackingState { liability, price })
    }

    fn authorize_manager(&self, caller: &Address, operation: &'static str) -> Result<(), PoolError> {
        if *caller != self.accounts.manager {
            warn!(caller = ?caller, operation, "Rejected Manager-only call");
            return Err(PoolError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    fn require_allowance(&self, asset: Asset, owner: &Address, amount: Amount) -> Result<(), PoolError> {
        if amount == 0 {
            return Ok(());
        }
        let allowed = self.token(asset).allowance(owner, &self.accounts.pool)?;
        if allowed < amount {
            return Err(PoolError::AllowanceTooLow {
                required: amount,
                allowed,
            });
        }
        Ok(())
    }

    fn require_pool_holds(&self, asset: Asset, amount: Amount) -> Result<(), PoolError> {
        if amount == 0 {
            return Ok(());
        }
        let held = self.token(asset).balance_of(&self.accounts.pool)?;
        if held < amount {
            return Err(PoolError::Token(format!(
                "pool holds {} of {:?}, needs {}",
                held, asset, amount
            )));
        }
        Ok(())
    }

    fn pull(
        &self,
        asset: Asset,
        owner: &Address,
        amount: Amount,
        pulls: &mut Vec<Pull>,
    ) -> Result<(), PoolError> {
        if amount == 0 {
            return Ok(());
        }
        let pool = self.accounts.pool;
        self.token(asset).transfer_from(&pool, owner, &pool, amount)?;
        pulls.push(Pull {
            asset,
            owner: *owner,
            amount,
        });
        Ok(())
    }

    fn release(&self, asset: Asset, to: &Address, amount: Amount) -> Result<(), PoolError> {
        if amount == 0 {
            return Ok(());
        }
        self.token(asset).transfer(&self.accounts.pool, to, amount)
    }

    // =========================================================================
    // Transaction
    // =========================================================================

    /// Run one operation against the locked ledger.
    ///
    /// `mutate` validates and applies the ledger change; `interact` performs
    /// the token and Manager calls once the change is persisted.
    fn transact<R, I>(
        &self,
        ledger: &mut PoolLedger,
        touched: &[Address],
        mutate: impl FnOnce(&mut PoolLedger) -> Result<R, PoolError>,
        interact: impl FnOnce(&R, &mut Vec<Pull>) -> Result<I, PoolError>,
    ) -> Result<(R, I), PoolError> {
        let checkpoint = ledger.checkpoint(touched);

        let outcome = match mutate(ledger) {
            Ok(outcome) => outcome,
            Err(e) => {
                ledger.restore(checkpoint);
                return Err(e);
            }
        };

        if let Err(e) = self.store.commit(&ledger.delta(touched)) {
            ledger.restore(checkpoint);
            return Err(e);
        }

        let mut pulls = Vec::new();
        match interact(&outcome, &mut pulls) {
            Ok(interaction) => Ok((outcome, interaction)),
            Err(e) => {
                self.roll_back(ledger, checkpoint, touched, pulls, &e);
                Err(e)
            }
        }
    }

    fn roll_back(
        &self,
        ledger: &mut PoolLedger,
        checkpoint: LedgerCheckpoint,
        touched: &[Address],
        pulls: Vec<Pull>,
        cause: &PoolError,
    ) {
        warn!(error = %cause, pulls = pulls.len(), "Rolling back pool operation");
        ledger.restore(checkpoint);

        for pull in pulls.iter().rev() {
            if let Err(e) = self.release(pull.asset, &pull.owner, pull.amount) {
                error!(
                    asset = ?pull.asset,
                    owner = ?pull.owner,
                    amount = %pull.amount,
                    error = %e,
                    "Failed to return pulled tokens"
                );
            }
        }

        if let Err(e) = self.store.commit(&ledger.delta(touched)) {
            error!(error = %e, "Failed to persist restored pool state");
        }

        #[cfg(feature = "metrics")]
        pool_telemetry::POOL_ROLLBACKS.inc();
    }

    /// Log, count and publish the outcome of an operation.
    fn finish<R>(
        &self,
        operation: &'static str,
        ledger: &PoolLedger,
        result: Result<(R, Vec<PoolEvent>), PoolError>,
    ) -> Result<R, PoolError> {
        match result {
            Ok((value, events)) => {
                for event in events {
                    self.events.publish(event);
                }
                #[cfg(feature = "metrics")]
                {
                    let totals = ledger.totals();
                    pool_telemetry::record_success(operation);
                    pool_telemetry::set_pool_totals(
                        totals.total_collateral,
                        totals.fee_reserve,
                        totals.total_fee_debt,
                        totals.share_supply,
                    );
                    pool_telemetry::log_pool_event!(
                        debug,
                        operation,
                        "Operation committed",
                        supply = %totals.share_supply
                    );
                }
                #[cfg(not(feature = "metrics"))]
                debug!(operation, supply = %ledger.share_supply(), "Operation committed");
                Ok(value)
            }
            Err(e) => {
                let family = e.family().as_str();
                #[cfg(feature = "metrics")]
                {
                    pool_telemetry::record_rejection(operation, family);
                    pool_telemetry::log_rejection!(operation, family, e);
                }
                #[cfg(not(feature = "metrics"))]
                debug!(operation, family, error = %e, "Operation rejected");
                Err(e)
            }
        }
    }

    // =========================================================================
    // Operations (ledger locked)
    // =========================================================================

    fn enter_locked(
        &self,
        ledger: &mut PoolLedger,
        caller: Address,
        collateral: Amount,
        now: Timestamp,
    ) -> Result<(EnterReceipt, Vec<PoolEvent>), PoolError> {
        let price = if ledger.entry_needs_price() {
            Some(self.manager.price_ratio()?)
        } else {
            None
        };

        let (receipt, ()) = self.transact(
            ledger,
            &[caller],
            |ledger| {
                let receipt = ledger.enter(caller, collateral, price.as_ref(), now)?;
                self.require_allowance(Asset::Collateral, &caller, collateral)?;
                Ok(receipt)
            },
            |_, pulls| self.pull(Asset::Collateral, &caller, collateral, pulls),
        )?;

        info!(
            holder = ?caller,
            collateral = %collateral,
            shares = %receipt.shares,
            fee_debt = %receipt.fee_debt,
            unlock_time = receipt.unlock_time,
            "Holder entered pool"
        );

        Ok((
            receipt,
            vec![PoolEvent::Entered {
                holder: caller,
                collateral,
                shares: receipt.shares,
                fee_debt: receipt.fee_debt,
                unlock_time: receipt.unlock_time,
            }],
        ))
    }

    fn exit_locked(
        &self,
        ledger: &mut PoolLedger,
        caller: Address,
        shares: Amount,
        recipient: Address,
        now: Timestamp,
    ) -> Result<(ExitReceipt, Vec<PoolEvent>), PoolError> {
        let backing = self.backing_state()?;

        let (receipt, ()) = self.transact(
            ledger,
            &[caller],
            |ledger| ledger.exit(&caller, shares, &backing, now),
            |receipt: &ExitReceipt, _| {
                self.require_pool_holds(Asset::Collateral, receipt.collateral)?;
                self.require_pool_holds(Asset::FAsset, receipt.fees)?;
                self.release(Asset::Collateral, &recipient, receipt.collateral)?;
                self.release(Asset::FAsset, &recipient, receipt.fees)
            },
        )?;

        info!(
            holder = ?caller,
            recipient = ?recipient,
            shares = %receipt.shares,
            collateral = %receipt.collateral,
            fees = %receipt.fees,
            "Holder exited pool"
        );

        Ok((receipt, vec![exited_event(caller, recipient, &receipt)]))
    }

    fn self_close_locked(
        &self,
        ledger: &mut PoolLedger,
        caller: Address,
        request: SelfCloseRequest,
        now: Timestamp,
    ) -> Result<(SelfCloseReceipt, Vec<PoolEvent>), PoolError> {
        let backing = self.backing_state()?;
        let recipient = request.recipient.unwrap_or(caller);

        let ((plan, exit), redemption) = self.transact(
            ledger,
            &[caller],
            |ledger| {
                let plan = ledger.plan_self_close(&caller, request.shares, &backing, now)?;
                self.require_allowance(Asset::FAsset, &caller, plan.funding.from_holder)?;
                debug!(
                    burn = %plan.burn,
                    from_fees = %plan.funding.from_fees,
                    from_holder = %plan.funding.from_holder,
                    "Self-close burn planned"
                );
                let exit = ledger.apply_self_close(&caller, &plan, now)?;
                Ok((plan, exit))
            },
            |(plan, exit): &(SelfClosePlan, ExitReceipt), pulls| {
                self.pull(Asset::FAsset, &caller, plan.funding.from_holder, pulls)?;

                self.require_pool_holds(Asset::Collateral, exit.collateral)?;
                self.require_pool_holds(Asset::FAsset, plan.burn.saturating_add(plan.funding.fees_to_recipient))?;

                let redemption = self.redeem(caller, recipient, plan.burn, &request)?;
                self.release(Asset::FAsset, &self.accounts.manager, plan.burn)?;
                self.release(Asset::Collateral, &recipient, exit.collateral)?;
                self.release(Asset::FAsset, &recipient, plan.funding.fees_to_recipient)?;
                Ok(redemption)
            },
        )?;

        info!(
            holder = ?caller,
            recipient = ?recipient,
            shares = %exit.shares,
            collateral = %exit.collateral,
            redeemed = %plan.burn,
            underlying = request.redeem_to_underlying,
            "Holder self-close exited pool"
        );

        #[cfg(feature = "metrics")]
        pool_telemetry::POOL_SELF_CLOSE_REDEEMED.inc_by(plan.burn as f64);

        let mut events = vec![exited_event(caller, recipient, &exit)];
        if plan.burn > 0 {
            events.push(PoolEvent::SelfCloseRedeemed {
                holder: caller,
                redeemed: plan.burn,
                from_fees: plan.funding.from_fees,
                from_holder: plan.funding.from_holder,
                redeem_to_underlying: request.redeem_to_underlying,
            });
        }

        Ok((
            SelfCloseReceipt {
                exit,
                redeemed: plan.burn,
                pulled_from_holder: plan.funding.from_holder,
                redemption,
            },
            events,
        ))
    }

    fn redeem(
        &self,
        redeemer: Address,
        recipient: Address,
        amount: Amount,
        request: &SelfCloseRequest,
    ) -> Result<Option<RedemptionReceipt>, PoolError> {
        if amount == 0 {
            return Ok(None);
        }
        let receipt = self.manager.execute_redemption(&RedemptionRequest {
            redeemer,
            amount,
            redeem_to_underlying: request.redeem_to_underlying,
            destination: request.destination.clone(),
            recipient,
            executor_fee: request.executor_fee,
        })?;
        debug!(
            request_id = ?receipt.request_id,
            collateral_paid = %receipt.collateral_paid,
            "Redemption executed"
        );
        Ok(Some(receipt))
    }

    fn withdraw_fees_locked(
        &self,
        ledger: &mut PoolLedger,
        caller: Address,
        amount: Amount,
        recipient: Address,
    ) -> Result<((), Vec<PoolEvent>), PoolError> {
        self.transact(
            ledger,
            &[caller],
            |ledger| ledger.withdraw_fees(&caller, amount),
            |_, _| {
                self.require_pool_holds(Asset::FAsset, amount)?;
                self.release(Asset::FAsset, &recipient, amount)
            },
        )?;

        info!(holder = ?caller, recipient = ?recipient, amount = %amount, "Fees withdrawn");
        Ok((
            (),
            vec![PoolEvent::FeesWithdrawn {
                holder: caller,
                recipient,
                amount,
            }],
        ))
    }

    fn pay_fee_debt_locked(
        &self,
        ledger: &mut PoolLedger,
        caller: Address,
        amount: Amount,
    ) -> Result<((), Vec<PoolEvent>), PoolError> {
        self.transact(
            ledger,
            &[caller],
            |ledger| {
                ledger.pay_fee_debt(&caller, amount)?;
                self.require_allowance(Asset::FAsset, &caller, amount)
            },
            |_, pulls| self.pull(Asset::FAsset, &caller, amount, pulls),
        )?;

        info!(holder = ?caller, amount = %amount, "Fee debt paid");
        Ok((
            (),
            vec![PoolEvent::FeeDebtPaid {
                holder: caller,
                amount,
            }],
        ))
    }

    fn transfer_locked(
        &self,
        ledger: &mut PoolLedger,
        caller: Address,
        to: Address,
        amount: Amount,
        now: Timestamp,
    ) -> Result<((), Vec<PoolEvent>), PoolError> {
        self.transact(
            ledger,
            &[caller, to],
            |ledger| ledger.transfer(&caller, to, amount, now),
            |_, _| Ok(()),
        )?;

        if amount == 0 || caller == to {
            return Ok(((), Vec::new()));
        }
        debug!(from = ?caller, to = ?to, amount = %amount, "Shares transferred");
        Ok((
            (),
            vec![PoolEvent::Transferred {
                from: caller,
                to,
                amount,
            }],
        ))
    }

    fn payout_locked(
        &self,
        ledger: &mut PoolLedger,
        holder: Address,
        recipient: Address,
        collateral: Amount,
        shares_to_burn: Amount,
        now: Timestamp,
    ) -> Result<((), Vec<PoolEvent>), PoolError> {
        self.transact(
            ledger,
            &[holder],
            |ledger| ledger.payout(&holder, collateral, shares_to_burn, now),
            |_, _| {
                self.require_pool_holds(Asset::Collateral, collateral)?;
                self.release(Asset::Collateral, &recipient, collateral)
            },
        )?;

        info!(
            holder = ?holder,
            recipient = ?recipient,
            collateral = %collateral,
            shares_burned = %shares_to_burn,
            "Pool paid out"
        );
        Ok((
            (),
            vec![PoolEvent::PaidOut {
                holder,
                recipient,
                collateral,
                shares_burned: shares_to_burn,
            }],
        ))
    }

    fn manager_update_locked(
        &self,
        ledger: &mut PoolLedger,
        mutate: impl FnOnce(&mut PoolLedger) -> Result<(), PoolError>,
        event: PoolEvent,
    ) -> Result<((), Vec<PoolEvent>), PoolError> {
        self.transact(ledger, &[], mutate, |_, _| Ok(()))?;
        info!(event = event.kind(), "Manager update applied");
        Ok(((), vec![event]))
    }
}

fn exited_event(holder: Address, recipient: Address, receipt: &ExitReceipt) -> PoolEvent {
    PoolEvent::Exited {
        holder,
        recipient,
        shares: receipt.shares,
        collateral: receipt.collateral,
        fees: receipt.fees,
        debt_forgiven: receipt.debt_forgiven,
    }
}

impl<M, L, S, E, T> CollateralPoolApi for CollateralPoolService<M, L, S, E, T>
where
    M: AssetManager,
    L: TokenLedger,
    S: PoolStore,
    E: EventSink,
    T: TimeSource,
{
    fn enter(&self, caller: Address, collateral: Amount) -> Result<EnterReceipt, PoolError> {
        #[cfg(feature = "metrics")]
        let _timer = OperationTimer::new("enter");
        let mut ledger = self.ledger.lock();
        let now = self.clock.now();
        let result = self.enter_locked(&mut ledger, caller, collateral, now);
        self.finish("enter", &ledger, result)
    }

    fn exit(
        &self,
        caller: Address,
        shares: Amount,
        recipient: Option<Address>,
    ) -> Result<ExitReceipt, PoolError> {
        #[cfg(feature = "metrics")]
        let _timer = OperationTimer::new("exit");
        let mut ledger = self.ledger.lock();
        let now = self.clock.now();
        let recipient = recipient.unwrap_or(caller);
        let result = self.exit_locked(&mut ledger, caller, shares, recipient, now);
        self.finish("exit", &ledger, result)
    }

    fn self_close_exit(
        &self,
        caller: Address,
        request: SelfCloseRequest,
    ) -> Result<SelfCloseReceipt, PoolError> {
        #[cfg(feature = "metrics")]
        let _timer = OperationTimer::new("self_close_exit");
        let mut ledger = self.ledger.lock();
        let now = self.clock.now();
        let result = self.self_close_locked(&mut ledger, caller, request, now);
        self.finish("self_close_exit", &ledger, result)
    }

    fn withdraw_fees(
        &self,
        caller: Address,
        amount: Amount,
        recipient: Option<Address>,
    ) -> Result<(), PoolError> {
        #[cfg(feature = "metrics")]
        let _timer = OperationTimer::new("withdraw_fees");
        let mut ledger = self.ledger.lock();
        let recipient = recipient.unwrap_or(caller);
        let result = self.withdraw_fees_locked(&mut ledger, caller, amount, recipient);
        self.finish("withdraw_fees", &ledger, result)
    }

    fn pay_fee_debt(&self, caller: Address, amount: Amount) -> Result<(), PoolError> {
        #[cfg(feature = "metrics")]
        let _timer = OperationTimer::new("pay_fee_debt");
        let mut ledger = self.ledger.lock();
        let result = self.pay_fee_debt_locked(&mut ledger, caller, amount);
        self.finish("pay_fee_debt", &ledger, result)
    }

    fn transfer(&self, caller: Address, to: Address, amount: Amount) -> Result<(), PoolError> {
        #[cfg(feature = "metrics")]
        let _timer = OperationTimer::new("transfer");
        let mut ledger = self.ledger.lock();
        let now = self.clock.now();
        let result = self.transfer_locked(&mut ledger, caller, to, amount, now);
        self.finish("transfer", &ledger, result)
    }

    fn cleanup_expired_timelocks(&self, holder: Address, max_entries: usize) -> bool {
        let mut ledger = self.ledger.lock();
        let now = self.clock.now();
        let before = ledger.holder_record(&holder).timelocks.len();
        let checkpoint = ledger.checkpoint(&[holder]);

        let done = ledger.cleanup_expired_timelocks(&holder, max_entries, now);
        let removed = before - ledger.holder_record(&holder).timelocks.len();
        if removed == 0 {
            return done;
        }

        if let Err(e) = self.store.commit(&ledger.delta(&[holder])) {
            warn!(holder = ?holder, error = %e, "Timelock cleanup not persisted");
            ledger.restore(checkpoint);
            return false;
        }
        debug!(holder = ?holder, removed, done, "Expired timelocks removed");
        done
    }

    fn deposit_fees(&self, caller: Address, amount: Amount) -> Result<(), PoolError> {
        let mut ledger = self.ledger.lock();
        let result = self
            .authorize_manager(&caller, "deposit_fees")
            .and_then(|()| {
                self.manager_update_locked(
                    &mut ledger,
                    |ledger| ledger.deposit_fees(amount),
                    PoolEvent::FeesDeposited { amount },
                )
            });
        self.finish("deposit_fees", &ledger, result)
    }

    fn receive_collateral(&self, caller: Address, amount: Amount) -> Result<(), PoolError> {
        let mut ledger = self.ledger.lock();
        let result = self
            .authorize_manager(&caller, "receive_collateral")
            .and_then(|()| {
                self.manager_update_locked(
                    &mut ledger,
                    |ledger| ledger.receive_collateral(amount),
                    PoolEvent::CollateralReceived { amount },
                )
            });
        self.finish("receive_collateral", &ledger, result)
    }

    fn payout(
        &self,
        caller: Address,
        holder: Address,
        recipient: Address,
        collateral: Amount,
        shares_to_burn: Amount,
    ) -> Result<(), PoolError> {
        #[cfg(feature = "metrics")]
        let _timer = OperationTimer::new("payout");
        let mut ledger = self.ledger.lock();
        let now = self.clock.now();
        let result = self.authorize_manager(&caller, "payout").and_then(|()| {
            self.payout_locked(&mut ledger, holder, recipient, collateral, shares_to_burn, now)
        });
        self.finish("payout", &ledger, result)
    }

    fn update_config(&self, caller: Address, config: PoolConfig) -> Result<(), PoolError> {
        let mut ledger = self.ledger.lock();
        let result = self
            .authorize_manager(&caller, "update_config")
            .and_then(|()| {
                let event = PoolEvent::ConfigUpdated(config.clone());
                self.manager_update_locked(
                    &mut ledger,
                    move |ledger| ledger.update_config(config),
                    event,
                )
            });
        self.finish("update_config", &ledger, result)
    }

    fn claimable_fees(&self, holder: &Address) -> Result<Amount, PoolError> {
        self.ledger.lock().claimable_fees(holder)
    }

    fn fee_debt_of(&self, holder: &Address) -> Amount {
        self.ledger.lock().fee_debt_of(holder)
    }

    fn transferable_balance(&self, holder: &Address) -> Result<Amount, PoolError> {
        let now = self.clock.now();
        self.ledger.lock().transferable_balance(holder, now)
    }

    fn timelocked_balance(&self, holder: &Address) -> Amount {
        let now = self.clock.now();
        self.ledger.lock().timelocked_balance(holder, now)
    }

    fn share_balance(&self, holder: &Address) -> Amount {
        self.ledger.lock().share_balance(holder)
    }

    fn debt_locked_shares(&self, holder: &Address) -> Result<Amount, PoolError> {
        self.ledger.lock().debt_locked_shares(holder)
    }

    fn total_collateral(&self) -> Amount {
        self.ledger.lock().total_collateral()
    }

    fn total_fee_reserve(&self) -> Amount {
        self.ledger.lock().fee_reserve()
    }

    fn total_fee_debt(&self) -> Amount {
        self.ledger.lock().total_fee_debt()
    }

    fn total_shares(&self) -> Amount {
        self.ledger.lock().share_supply()
    }

    fn pool_collateral_ratio_bips(&self) -> Result<Option<u128>, PoolError> {
        let backing = self.backing_state()?;
        self.ledger.lock().collateral_ratio_bips(&backing)
    }
}
