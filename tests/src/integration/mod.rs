//! # Integration Tests
//!
//! End-to-end flows through `CollateralPoolService`, and randomized
//! properties over operation sequences.

pub mod flows;
