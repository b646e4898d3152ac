//! # Outbound Ports
//!
//! Traits for the pool's collaborators: the Manager, the two token ledgers,
//! persistence, event publication and the clock.
//!
//! All calls are synchronous and fallible; any failure aborts the operation.

use crate::domain::{
    Address, Amount, PoolDelta, PoolError, PoolEvent, PoolSnapshot, PriceRatio, RedemptionReceipt,
    RedemptionRequest, Timestamp,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// The Manager (asset manager) - outbound port.
pub trait AssetManager: Send + Sync {
    /// Collateral units per backing-asset unit.
    fn price_ratio(&self) -> Result<PriceRatio, PoolError>;

    /// Backing-asset liability attributed to `pool`.
    fn backing_liability(&self, pool: &Address) -> Result<Amount, PoolError>;

    /// Redeem backing asset handed over by the pool.
    ///
    /// Fails with `RedemptionTooSmall` or `TooManyTicketsRequired`.
    fn execute_redemption(
        &self,
        request: &RedemptionRequest,
    ) -> Result<RedemptionReceipt, PoolError>;
}

/// Fungible token ledger - outbound port.
///
/// Used for both the collateral token and the backing asset.
pub trait TokenLedger: Send + Sync {
    /// Balance of `account`.
    fn balance_of(&self, account: &Address) -> Result<Amount, PoolError>;

    /// Amount `spender` may pull from `owner`.
    fn allowance(&self, owner: &Address, spender: &Address) -> Result<Amount, PoolError>;

    /// Move `amount` from `from` to `to` on behalf of `from`.
    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<(), PoolError>;

    /// Move `amount` from `owner` to `to` using `spender`'s allowance.
    fn transfer_from(
        &self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), PoolError>;
}

/// Durable pool state - outbound port.
pub trait PoolStore: Send + Sync {
    /// Last committed state, if any.
    fn load(&self) -> Result<Option<PoolSnapshot>, PoolError>;

    /// Persist the records touched by one operation.
    fn commit(&self, delta: &PoolDelta) -> Result<(), PoolError>;
}

/// Domain event publication - outbound port.
pub trait EventSink: Send + Sync {
    /// Publish a committed event.
    fn publish(&self, event: PoolEvent);
}

/// Clock - outbound port.
pub trait TimeSource: Send + Sync {
    /// Current time in seconds.
    fn now(&self) -> Timestamp;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

#[derive(Debug)]
struct MockManagerState {
    price: Option<PriceRatio>,
    liability: Amount,
    redemption_error: Option<PoolError>,
    redemptions: Vec<RedemptionRequest>,
    next_request_id: u64,
}

/// Scriptable Manager for tests.
///
/// Clones share state, so a test can keep a handle after moving one into a
/// service.
#[derive(Clone, Debug)]
pub struct MockAssetManager {
    state: Arc<Mutex<MockManagerState>>,
}

impl Default for MockAssetManager {
    fn default() -> Self {
        Self::new(PriceRatio {
            numerator: 1,
            denominator: 1,
        })
    }
}

impl MockAssetManager {
    /// Manager quoting `price` with no liability.
    pub fn new(price: PriceRatio) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockManagerState {
                price: Some(price),
                liability: 0,
                redemption_error: None,
                redemptions: Vec::new(),
                next_request_id: 1,
            })),
        }
    }

    /// Change the quoted price; `None` makes the price unavailable.
    pub fn set_price(&self, price: Option<PriceRatio>) {
        self.state.lock().price = price;
    }

    /// Change the reported liability.
    pub fn set_liability(&self, liability: Amount) {
        self.state.lock().liability = liability;
    }

    /// Make every following redemption fail with `error`.
    pub fn fail_redemptions_with(&self, error: Option<PoolError>) {
        self.state.lock().redemption_error = error;
    }

    /// Redemptions executed so far.
    pub fn redemptions(&self) -> Vec<RedemptionRequest> {
        self.state.lock().redemptions.clone()
    }
}

impl AssetManager for MockAssetManager {
    fn price_ratio(&self) -> Result<PriceRatio, PoolError> {
        self.state
            .lock()
            .price
            .ok_or_else(|| PoolError::PriceUnavailable("mock price not set".to_string()))
    }

    fn backing_liability(&self, _pool: &Address) -> Result<Amount, PoolError> {
        Ok(self.state.lock().liability)
    }

    fn execute_redemption(
        &self,
        request: &RedemptionRequest,
    ) -> Result<RedemptionReceipt, PoolError> {
        let mut state = self.state.lock();
        if let Some(err) = state.redemption_error.clone() {
            return Err(err);
        }
        state.liability = state.liability.saturating_sub(request.amount);
        state.redemptions.push(request.clone());
        if !request.redeem_to_underlying {
            let collateral_paid = state.price.map_or(0, |p| {
                request.amount.saturating_mul(p.numerator) / p.denominator
            });
            return Ok(RedemptionReceipt {
                request_id: None,
                collateral_paid,
            });
        }
        let request_id = state.next_request_id;
        state.next_request_id += 1;
        Ok(RedemptionReceipt {
            request_id: Some(request_id),
            collateral_paid: 0,
        })
    }
}
