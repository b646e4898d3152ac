//! # Adapters Module
//!
//! Implementations of the outbound ports.
//!
//! ## Modules
//!
//! - `token_ledger`: in-memory collateral / backing-asset ledger
//! - `store`: in-memory and file-backed pool state stores
//! - `events`: in-memory and tracing event sinks
//! - `clock`: system and manual time sources

pub mod clock;
pub mod events;
pub mod store;
pub mod token_ledger;

pub use clock::{ManualTimeSource, SystemTimeSource};
pub use events::{InMemoryEventSink, TracingEventSink};
pub use store::{FilePoolStore, InMemoryPoolStore};
pub use token_ledger::InMemoryTokenLedger;
