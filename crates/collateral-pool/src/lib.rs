//! # Collateral Pool
//!
//! Accounting engine for an agent's collateral pool: pool shares, fee debt
//! and self-close exits.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Outside investors lend collateral to an agent's pool and receive shares.
//! The pool earns fees in the backing asset, distributed without iterating
//! holders:
//! - Fee debt charged on entry so newcomers cannot claim fees earned before
//!   they joined
//! - Time-locked shares against flip trading around fee deposits
//! - Exit guarded by the pool collateral ratio, with a self-close variant
//!   that redeems backing asset to keep the ratio intact
//!
//! ## Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Collateral accounting | `total_collateral` moves only through checked operations |
//! | Fee backing | Every claimable fee is held in the reserve |
//! | Share supply | Supply equals the sum of balances |
//! | Exit CR | Plain exits never leave the pool below the exit CR |
//!
//! ## Module Structure
//!
//! ```text
//! collateral-pool/
//! ├── domain/          # PoolLedger, ShareToken, FeeDebtLedger, errors
//! ├── algorithms/      # mul-div, CR, self-close burn
//! ├── ports/           # CollateralPoolApi, AssetManager, TokenLedger, PoolStore
//! ├── adapters/        # In-memory and file-backed implementations
//! ├── config.rs        # PoolConfig
//! └── service.rs       # CollateralPoolService
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    FilePoolStore, InMemoryEventSink, InMemoryPoolStore, InMemoryTokenLedger, ManualTimeSource,
    SystemTimeSource, TracingEventSink,
};
pub use algorithms::{
    collateral_ratio_bips, collateral_value_of, fund_burn, required_burn, BurnFunding,
    SelfCloseInputs,
};
pub use config::{PoolConfig, ONE_UNIT};
pub use domain::{
    Address, Amount, BackingState, EnterReceipt, ErrorFamily, ExitQuote, ExitReceipt,
    HolderRecord, PoolAccounts, PoolDelta, PoolError, PoolEvent, PoolLedger, PoolSnapshot,
    PoolTotals, PriceRatio, RedemptionReceipt, RedemptionRequest, SelfClosePlan, SelfCloseReceipt,
    SelfCloseRequest, Timestamp, TimelockEntry, TimelockQueue, TransferPolicy, BIPS,
};
pub use ports::{
    AssetManager, CollateralPoolApi, EventSink, MockAssetManager, PoolStore, TimeSource,
    TokenLedger,
};
pub use service::{CollateralPoolService, PoolCollaborators};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
