//! # Domain Layer
//!
//! Pure accounting for the collateral pool: entities, value objects,
//! invariants and errors. No I/O.

pub mod errors;
pub mod events;
pub mod fee_debt;
pub mod invariants;
pub mod pool;
pub mod share_token;
pub mod snapshot;
pub mod timelock;
pub mod transfer_policy;
pub mod value_objects;

pub use errors::*;
pub use events::*;
pub use fee_debt::*;
pub use invariants::*;
pub use pool::*;
pub use share_token::*;
pub use snapshot::*;
pub use timelock::*;
pub use transfer_policy::*;
pub use value_objects::*;
