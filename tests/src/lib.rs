//! # Collateral Pool Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # Pool wired to in-memory collaborators
//! ├── integration/      # End-to-end flows and randomized properties
//! └── exploits/         # Attack simulations against the pool
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p pool-tests
//!
//! # By category
//! cargo test -p pool-tests integration::
//! cargo test -p pool-tests exploits::
//!
//! # Benchmarks
//! cargo bench -p pool-tests
//! ```

#![allow(dead_code)]

pub mod integration;
