//! Configuration for the Collateral Pool

use crate::domain::{Amount, PoolError, BIPS};
use serde::{Deserialize, Serialize};
use std::env;

/// One whole collateral unit at 18 decimals.
pub const ONE_UNIT: Amount = 1_000_000_000_000_000_000;

/// Pool settings pushed by the Manager and passed to every ledger operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Minimum collateral ratio that must hold after an exit (bips)
    pub exit_collateral_ratio_bips: u32,
    /// How long freshly minted shares stay locked (seconds)
    pub timelock_duration_secs: u64,
    /// Smallest accepted entry (collateral units)
    pub min_entry_collateral: Amount,
    /// Floor for a non-zero share supply left after an exit
    pub min_share_supply_after_exit: Amount,
    /// Floor for non-zero collateral left after an exit
    pub min_collateral_after_exit: Amount,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            exit_collateral_ratio_bips: 15_000,
            timelock_duration_secs: 86_400,
            min_entry_collateral: ONE_UNIT,
            min_share_supply_after_exit: ONE_UNIT,
            min_collateral_after_exit: ONE_UNIT,
        }
    }
}

impl PoolConfig {
    /// Create configuration from environment variables, starting from defaults.
    ///
    /// # Environment Variables
    ///
    /// - `POOL_EXIT_CR_BIPS`: Exit collateral ratio (default: 15000)
    /// - `POOL_TIMELOCK_SECS`: Share timelock duration (default: 86400)
    /// - `POOL_MIN_ENTRY`: Minimum entry collateral (default: 1e18)
    /// - `POOL_MIN_SUPPLY_AFTER_EXIT`: Residual share floor (default: 1e18)
    /// - `POOL_MIN_COLLATERAL_AFTER_EXIT`: Residual collateral floor (default: 1e18)
    pub fn from_env() -> Result<Self, PoolError> {
        let defaults = Self::default();
        let config = Self {
            exit_collateral_ratio_bips: parse_var(
                "POOL_EXIT_CR_BIPS",
                defaults.exit_collateral_ratio_bips,
            )?,
            timelock_duration_secs: parse_var("POOL_TIMELOCK_SECS", defaults.timelock_duration_secs)?,
            min_entry_collateral: parse_var("POOL_MIN_ENTRY", defaults.min_entry_collateral)?,
            min_share_supply_after_exit: parse_var(
                "POOL_MIN_SUPPLY_AFTER_EXIT",
                defaults.min_share_supply_after_exit,
            )?,
            min_collateral_after_exit: parse_var(
                "POOL_MIN_COLLATERAL_AFTER_EXIT",
                defaults.min_collateral_after_exit,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the ledger cannot operate under.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.exit_collateral_ratio_bips <= BIPS {
            return Err(PoolError::InvalidConfig(format!(
                "exit collateral ratio must exceed {} bips, got {}",
                BIPS, self.exit_collateral_ratio_bips
            )));
        }
        if self.min_entry_collateral == 0 {
            return Err(PoolError::InvalidConfig(
                "minimum entry must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, PoolError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| PoolError::InvalidConfig(format!("{name}: cannot parse {raw:?}"))),
        Err(_) => Ok(default),
    }
}
