//! # Algorithms Module
//!
//! Pure arithmetic behind the pool operations.

pub mod collateral_ratio;
pub mod math;
pub mod self_close;

pub use collateral_ratio::{
    backing_value_of, collateral_ratio_bips, collateral_value_of, is_at_or_above, is_not_worse,
    max_backed_liability,
};
pub use math::{mul_div, mul_div_ceil};
pub use self_close::{fund_burn, required_burn, BurnFunding, SelfCloseInputs};
