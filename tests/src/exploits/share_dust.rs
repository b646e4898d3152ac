//! Rounding games: dust exits, dust entries and cheap bootstraps.

#[cfg(test)]
mod tests {
    use crate::harness::{holder, test_config, Harness, DAY, MANAGER};
    use collateral_pool::{CollateralPoolApi, PoolError, TokenLedger};

    const A: u8 = 0x0A;
    const ATTACKER: u8 = 0xEE;

    #[test]
    fn test_dust_exit_rejected() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        h.enter(&pool, holder(A), 100).unwrap();
        pool.payout(MANAGER, holder(A), holder(9), 95, 0).unwrap();
        h.clock.advance(DAY);

        // 1 share is worth 5 / 100 collateral
        assert_eq!(
            pool.exit(holder(A), 1, None),
            Err(PoolError::ShareTooSmall)
        );
        assert_eq!(pool.share_balance(&holder(A)), 100);
    }

    #[test]
    fn test_dust_entry_rejected() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        h.enter(&pool, holder(A), 100).unwrap();
        h.receive_collateral(&pool, 10_000);

        assert_eq!(
            h.enter(&pool, holder(ATTACKER), 100),
            Err(PoolError::ShareTooSmall)
        );
        assert_eq!(h.collateral.balance_of(&holder(ATTACKER)).unwrap(), 100);
        h.assert_custody(&pool);
    }

    #[test]
    fn test_residual_supply_floor() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        h.enter(&pool, holder(A), 100).unwrap();
        h.clock.advance(DAY);

        assert_eq!(
            pool.exit(holder(A), 95, None),
            Err(PoolError::ResidualSupplyTooLow {
                remaining: 5,
                minimum: 10
            })
        );
        pool.exit(holder(A), 100, None).unwrap();
        assert_eq!(pool.total_shares(), 0);
        assert_eq!(pool.total_collateral(), 0);
    }

    #[test]
    fn test_cheap_bootstrap_over_leftover_fees() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        h.enter(&pool, holder(A), 100).unwrap();
        h.clock.advance(DAY);
        pool.exit(holder(A), 100, None).unwrap();
        h.deposit_fees(&pool, 40);

        assert_eq!(
            h.enter(&pool, holder(ATTACKER), 1),
            Err(PoolError::InsufficientBootstrapContribution {
                provided: 1,
                required: 40
            })
        );

        h.manager.set_price(None);
        assert!(matches!(
            h.enter(&pool, holder(ATTACKER), 40),
            Err(PoolError::PriceUnavailable(_))
        ));

        h.manager.set_price(Some(collateral_pool::PriceRatio {
            numerator: 1,
            denominator: 1,
        }));
        let receipt = h.enter(&pool, holder(ATTACKER), 40).unwrap();
        assert_eq!(receipt.shares, 40);
        assert_eq!(pool.claimable_fees(&holder(ATTACKER)).unwrap(), 40);
        h.assert_custody(&pool);
    }
}
