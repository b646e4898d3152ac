//! Collateral drains: pulling collateral out from under the backed asset.

#[cfg(test)]
mod tests {
    use crate::harness::{holder, test_config, Harness, DAY};
    use collateral_pool::{CollateralPoolApi, PoolError, SelfCloseRequest, TokenLedger};

    const A: u8 = 0x0A;
    const B: u8 = 0x0B;
    const ATTACKER: u8 = 0xEE;

    fn backed_pool(liability: u128) -> (Harness, crate::harness::Pool<collateral_pool::InMemoryPoolStore>) {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        h.enter(&pool, holder(A), 100).unwrap();
        h.enter(&pool, holder(B), 100).unwrap();
        h.deposit_fees(&pool, 20);
        h.manager.set_liability(liability);
        h.clock.advance(DAY);
        (h, pool)
    }

    #[test]
    fn test_plain_exit_cannot_break_cr() {
        let (h, pool) = backed_pool(90);

        // 180 collateral backs 90 at exactly 200%
        pool.exit(holder(A), 20, None).unwrap();
        assert!(matches!(
            pool.exit(holder(A), 10, None),
            Err(PoolError::CRBelowExitThreshold {
                required_bips: 20_000,
                ..
            })
        ));
        assert_eq!(pool.total_collateral(), 180);
        h.assert_custody(&pool);
    }

    #[test]
    fn test_self_close_in_unhealthy_pool_keeps_ratio() {
        let (h, pool) = backed_pool(150);
        let before = pool.pool_collateral_ratio_bips().unwrap().unwrap();
        assert_eq!(before, 13_333);

        // a quarter of the collateral leaves: ceil(150 / 4) = 38 burned, 5 from fees
        h.fund_fasset(holder(A), 33);
        let receipt = pool
            .self_close_exit(
                holder(A),
                SelfCloseRequest {
                    shares: 50,
                    ..SelfCloseRequest::default()
                },
            )
            .unwrap();
        assert_eq!(receipt.redeemed, 38);
        assert_eq!(receipt.pulled_from_holder, 33);

        let after = pool.pool_collateral_ratio_bips().unwrap().unwrap();
        assert!(after >= before);
        h.assert_custody(&pool);
    }

    #[test]
    fn test_unfunded_self_close_rejected() {
        let (h, pool) = backed_pool(150);
        let before = pool.snapshot();

        assert_eq!(
            pool.self_close_exit(
                holder(A),
                SelfCloseRequest {
                    shares: 50,
                    ..SelfCloseRequest::default()
                },
            ),
            Err(PoolError::AllowanceTooLow {
                required: 33,
                allowed: 0
            })
        );
        assert_eq!(pool.snapshot(), before);
        assert!(h.manager.redemptions().is_empty());
    }

    #[test]
    fn test_rogue_payout_rejected() {
        let (h, pool) = backed_pool(0);

        assert_eq!(
            pool.payout(holder(ATTACKER), holder(A), holder(ATTACKER), 200, 0),
            Err(PoolError::Unauthorized {
                caller: holder(ATTACKER)
            })
        );
        assert_eq!(h.collateral.balance_of(&holder(ATTACKER)).unwrap(), 0);
        assert_eq!(pool.total_collateral(), 200);
    }
}
