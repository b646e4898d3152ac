//! Fee sniping: joining the pool only to collect fees earned by others.

#[cfg(test)]
mod tests {
    use crate::harness::{holder, test_config, Harness, DAY};
    use collateral_pool::{CollateralPoolApi, PoolError, TokenLedger};

    const VICTIM: u8 = 0x0A;
    const ATTACKER: u8 = 0xEE;
    const ACCOMPLICE: u8 = 0xEF;

    #[test]
    fn test_late_entrant_claims_nothing() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        h.enter(&pool, holder(VICTIM), 100).unwrap();
        h.deposit_fees(&pool, 1_000);

        let receipt = h.enter(&pool, holder(ATTACKER), 10_000).unwrap();
        assert_eq!(receipt.fee_debt, 100_000);
        assert_eq!(pool.claimable_fees(&holder(ATTACKER)).unwrap(), 0);

        h.clock.advance(DAY);
        let exit = pool.exit(holder(ATTACKER), receipt.shares, None).unwrap();
        assert_eq!(exit.collateral, 10_000);
        assert_eq!(exit.fees, 0);
        assert_eq!(h.fasset.balance_of(&holder(ATTACKER)).unwrap(), 0);
        assert_eq!(pool.claimable_fees(&holder(VICTIM)).unwrap(), 1_000);
        h.assert_custody(&pool);
    }

    #[test]
    fn test_flip_around_deposit_blocked_by_timelock() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        h.enter(&pool, holder(VICTIM), 100).unwrap();
        h.clock.advance(2 * DAY);

        // front-run a fee deposit
        let receipt = h.enter(&pool, holder(ATTACKER), 100).unwrap();
        h.deposit_fees(&pool, 100);

        assert!(matches!(
            pool.exit(holder(ATTACKER), receipt.shares, None),
            Err(PoolError::InsufficientNonTimelocked { .. })
        ));
        assert!(matches!(
            pool.transfer(holder(ATTACKER), holder(ACCOMPLICE), receipt.shares),
            Err(PoolError::InsufficientTransferable { .. })
        ));
        assert_eq!(pool.transferable_balance(&holder(ATTACKER)).unwrap(), 0);
    }

    #[test]
    fn test_debt_cannot_be_shed_by_transfer() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        h.enter(&pool, holder(VICTIM), 100).unwrap();
        h.deposit_fees(&pool, 100);
        h.enter(&pool, holder(ATTACKER), 100).unwrap();
        h.clock.advance(DAY);

        assert_eq!(pool.fee_debt_of(&holder(ATTACKER)), 100);
        assert_eq!(pool.debt_locked_shares(&holder(ATTACKER)).unwrap(), 100);
        assert!(matches!(
            pool.transfer(holder(ATTACKER), holder(ACCOMPLICE), 1),
            Err(PoolError::InsufficientTransferable { .. })
        ));
        assert_eq!(pool.share_balance(&holder(ACCOMPLICE)), 0);
    }

    #[test]
    fn test_cannot_withdraw_beyond_claim() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        h.enter(&pool, holder(VICTIM), 100).unwrap();
        h.enter(&pool, holder(ATTACKER), 100).unwrap();
        h.deposit_fees(&pool, 20);

        assert_eq!(
            pool.withdraw_fees(holder(ATTACKER), 11, None),
            Err(PoolError::InsufficientClaimableFees {
                requested: 11,
                claimable: 10
            })
        );
        pool.withdraw_fees(holder(ATTACKER), 10, None).unwrap();
        assert_eq!(pool.claimable_fees(&holder(ATTACKER)).unwrap(), 0);
        assert_eq!(pool.claimable_fees(&holder(VICTIM)).unwrap(), 10);
        h.assert_custody(&pool);
    }
}
