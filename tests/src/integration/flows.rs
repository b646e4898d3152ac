//! # Integration Test Flows
//!
//! Drives the pool service together with the token ledgers, the Manager and
//! the stores.
//!
//! ## Flows Tested:
//!
//! 1. **Fee distribution**: deposits, entries with fee debt, withdrawals, repayment
//! 2. **Exits**: plain exit, self-close with and without redemption
//! 3. **Atomicity**: Manager failures leave books, tokens and store untouched
//! 4. **Persistence**: a service rebuilt from disk sees the same pool
//! 5. **Authorization**: Manager-only entry points

#[cfg(test)]
mod tests {
    use crate::harness::{holder, init_test_logging, test_config, Harness, DAY, MANAGER, POOL};
    use collateral_pool::{
        CollateralPoolApi, FilePoolStore, PoolConfig, PoolError, PoolEvent, PoolStore,
        SelfCloseRequest, TokenLedger,
    };

    const A: u8 = 0x0A;
    const B: u8 = 0x0B;
    const C: u8 = 0x0C;

    // =============================================================================
    // FEE DISTRIBUTION
    // =============================================================================

    #[test]
    fn test_abc_fee_distribution() {
        init_test_logging();
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());

        h.enter(&pool, holder(A), 100).unwrap();
        h.enter(&pool, holder(B), 100).unwrap();
        h.deposit_fees(&pool, 20);
        assert_eq!(pool.claimable_fees(&holder(A)).unwrap(), 10);
        assert_eq!(pool.claimable_fees(&holder(B)).unwrap(), 10);

        let receipt = h.enter(&pool, holder(C), 100).unwrap();
        assert_eq!(receipt.shares, 100);
        assert_eq!(receipt.fee_debt, 10);
        assert_eq!(pool.claimable_fees(&holder(A)).unwrap(), 10);
        assert_eq!(pool.claimable_fees(&holder(B)).unwrap(), 10);
        assert_eq!(pool.claimable_fees(&holder(C)).unwrap(), 0);

        pool.withdraw_fees(holder(A), 10, None).unwrap();
        assert_eq!(h.fasset.balance_of(&holder(A)).unwrap(), 10);

        h.fund_fasset(holder(C), 10);
        pool.pay_fee_debt(holder(C), 10).unwrap();
        assert_eq!(pool.fee_debt_of(&holder(C)), 0);
        assert_eq!(pool.claimable_fees(&holder(C)).unwrap(), 10);
        assert_eq!(pool.claimable_fees(&holder(B)).unwrap(), 10);
        assert_eq!(pool.claimable_fees(&holder(A)).unwrap(), 0);

        h.assert_custody(&pool);
        pool.verify().unwrap();

        let kinds: Vec<_> = h.events.events().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                "entered",
                "entered",
                "fees_deposited",
                "entered",
                "fees_withdrawn",
                "fee_debt_paid"
            ]
        );
    }

    #[test]
    fn test_pay_fee_debt_needs_allowance() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        h.enter(&pool, holder(A), 100).unwrap();
        h.deposit_fees(&pool, 20);
        h.enter(&pool, holder(C), 100).unwrap();

        h.fasset.mint(holder(C), 10);
        h.fasset.approve(holder(C), POOL, 4);
        assert_eq!(
            pool.pay_fee_debt(holder(C), 10),
            Err(PoolError::AllowanceTooLow {
                required: 10,
                allowed: 4
            })
        );
        assert_eq!(pool.fee_debt_of(&holder(C)), 20);
        h.assert_custody(&pool);
    }

    // =============================================================================
    // EXITS
    // =============================================================================

    #[test]
    fn test_exit_releases_collateral_and_fee_share() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        h.enter(&pool, holder(A), 100).unwrap();
        h.enter(&pool, holder(B), 100).unwrap();
        h.deposit_fees(&pool, 20);
        h.clock.advance(DAY);

        let receipt = pool.exit(holder(A), 50, Some(holder(9))).unwrap();
        assert_eq!(receipt.collateral, 50);
        assert_eq!(receipt.fees, 5);
        assert_eq!(h.collateral.balance_of(&holder(9)).unwrap(), 50);
        assert_eq!(h.fasset.balance_of(&holder(9)).unwrap(), 5);
        assert_eq!(pool.claimable_fees(&holder(B)).unwrap(), 10);
        h.assert_custody(&pool);
    }

    #[test]
    fn test_full_exit_clears_debt() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        h.enter(&pool, holder(A), 100).unwrap();
        h.enter(&pool, holder(B), 100).unwrap();
        h.deposit_fees(&pool, 20);
        h.enter(&pool, holder(C), 100).unwrap();
        h.clock.advance(DAY);

        let receipt = pool.exit(holder(C), 100, None).unwrap();
        assert_eq!(receipt.debt_forgiven, 10);
        assert_eq!(pool.fee_debt_of(&holder(C)), 0);
        assert_eq!(pool.total_fee_debt(), 0);
        assert_eq!(pool.claimable_fees(&holder(A)).unwrap(), 10);
        h.assert_custody(&pool);
        pool.verify().unwrap();
    }

    #[test]
    fn test_self_close_with_underlying_redemption() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        h.enter(&pool, holder(A), 100).unwrap();
        h.enter(&pool, holder(B), 100).unwrap();
        h.deposit_fees(&pool, 20);
        h.manager.set_liability(90);
        h.fund_fasset(holder(A), 10);
        h.clock.advance(DAY);

        // 150 collateral left backs 75 at 200%: 15 of 90 must go
        let receipt = pool
            .self_close_exit(
                holder(A),
                SelfCloseRequest {
                    shares: 50,
                    redeem_to_underlying: true,
                    destination: "rUnderlyingAddress".to_string(),
                    recipient: None,
                    executor_fee: 3,
                },
            )
            .unwrap();

        assert_eq!(receipt.redeemed, 15);
        assert_eq!(receipt.pulled_from_holder, 10);
        assert_eq!(receipt.exit.fees, 0);
        assert_eq!(receipt.redemption.unwrap().request_id, Some(1));

        let redemptions = h.manager.redemptions();
        assert_eq!(redemptions.len(), 1);
        assert_eq!(redemptions[0].amount, 15);
        assert_eq!(redemptions[0].destination, "rUnderlyingAddress");
        assert_eq!(redemptions[0].executor_fee, 3);

        assert_eq!(h.fasset.balance_of(&MANAGER).unwrap(), 15);
        assert_eq!(h.collateral.balance_of(&holder(A)).unwrap(), 50);
        assert_eq!(pool.pool_collateral_ratio_bips().unwrap(), Some(20_000));
        h.assert_custody(&pool);

        let events = h.events.events();
        assert!(matches!(
            events.last(),
            Some(PoolEvent::SelfCloseRedeemed {
                redeemed: 15,
                from_fees: 5,
                from_holder: 10,
                redeem_to_underlying: true,
                ..
            })
        ));
    }

    #[test]
    fn test_self_close_without_burn_pays_fees_to_recipient() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        h.enter(&pool, holder(A), 100).unwrap();
        h.enter(&pool, holder(B), 100).unwrap();
        h.deposit_fees(&pool, 20);
        h.manager.set_liability(90);
        h.clock.advance(DAY);

        let receipt = pool
            .self_close_exit(
                holder(A),
                SelfCloseRequest {
                    shares: 20,
                    recipient: Some(holder(9)),
                    ..SelfCloseRequest::default()
                },
            )
            .unwrap();

        assert_eq!(receipt.redeemed, 0);
        assert!(receipt.redemption.is_none());
        assert_eq!(receipt.exit.fees, 2);
        assert_eq!(h.fasset.balance_of(&holder(9)).unwrap(), 2);
        assert_eq!(h.collateral.balance_of(&holder(9)).unwrap(), 20);
        assert!(h.manager.redemptions().is_empty());
        h.assert_custody(&pool);
    }

    // =============================================================================
    // ATOMICITY
    // =============================================================================

    #[test]
    fn test_failed_redemption_leaves_no_trace() {
        let h = Harness::new();
        let (pool, store) = h.memory_pool(test_config());
        h.enter(&pool, holder(A), 100).unwrap();
        h.enter(&pool, holder(B), 100).unwrap();
        h.deposit_fees(&pool, 20);
        h.manager.set_liability(90);
        h.fund_fasset(holder(A), 10);
        h.clock.advance(DAY);
        h.manager
            .fail_redemptions_with(Some(PoolError::TooManyTicketsRequired));

        let before = pool.snapshot();
        let events_before = h.events.events().len();

        let result = pool.self_close_exit(
            holder(A),
            SelfCloseRequest {
                shares: 50,
                ..SelfCloseRequest::default()
            },
        );
        assert_eq!(result, Err(PoolError::TooManyTicketsRequired));

        assert_eq!(pool.snapshot(), before);
        assert_eq!(store.load().unwrap().unwrap(), before);
        assert_eq!(h.fasset.balance_of(&holder(A)).unwrap(), 10);
        assert_eq!(h.collateral.balance_of(&holder(A)).unwrap(), 0);
        assert_eq!(h.events.events().len(), events_before);
        h.assert_custody(&pool);
    }

    #[test]
    fn test_store_outage_aborts_exit() {
        let h = Harness::new();
        let (pool, store) = h.memory_pool(test_config());
        h.enter(&pool, holder(A), 100).unwrap();
        h.enter(&pool, holder(B), 100).unwrap();
        h.clock.advance(DAY);

        store.set_fail_commits(true);
        assert!(matches!(
            pool.exit(holder(A), 50, None),
            Err(PoolError::Storage(_))
        ));
        assert_eq!(pool.share_balance(&holder(A)), 100);
        h.assert_custody(&pool);

        store.set_fail_commits(false);
        assert!(pool.exit(holder(A), 50, None).is_ok());
    }

    // =============================================================================
    // PERSISTENCE
    // =============================================================================

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool").join("state.bin");
        let h = Harness::new();

        let before = {
            let pool = h
                .pool(FilePoolStore::open(&path).unwrap(), test_config())
                .unwrap();
            h.enter(&pool, holder(A), 100).unwrap();
            h.enter(&pool, holder(B), 100).unwrap();
            h.deposit_fees(&pool, 20);
            h.enter(&pool, holder(C), 100).unwrap();
            pool.snapshot()
        };

        let reopened = h
            .pool(FilePoolStore::open(&path).unwrap(), PoolConfig::default())
            .unwrap();
        assert_eq!(reopened.snapshot(), before);
        assert_eq!(reopened.config(), test_config());
        assert_eq!(reopened.fee_debt_of(&holder(C)), 10);
        assert_eq!(reopened.timelocked_balance(&holder(C)), 100);
        assert_eq!(reopened.claimable_fees(&holder(A)).unwrap(), 10);
        reopened.verify().unwrap();
    }

    // =============================================================================
    // MANAGER OPERATIONS
    // =============================================================================

    #[test]
    fn test_manager_only_entry_points() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        h.enter(&pool, holder(A), 100).unwrap();
        let events_before = h.events.events().len();
        let intruder = holder(0x66);

        let unauthorized = Err(PoolError::Unauthorized { caller: intruder });
        assert_eq!(pool.deposit_fees(intruder, 10), unauthorized);
        assert_eq!(pool.receive_collateral(intruder, 10), unauthorized);
        assert_eq!(
            pool.payout(intruder, holder(A), intruder, 100, 100),
            unauthorized
        );
        assert_eq!(pool.update_config(intruder, test_config()), unauthorized);

        assert_eq!(pool.total_fee_reserve(), 0);
        assert_eq!(pool.total_collateral(), 100);
        assert_eq!(pool.share_balance(&holder(A)), 100);
        assert_eq!(h.events.events().len(), events_before);
    }

    #[test]
    fn test_residual_collateral_after_payout() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(PoolConfig {
            min_share_supply_after_exit: 1,
            ..test_config()
        });
        h.enter(&pool, holder(A), 100).unwrap();
        h.enter(&pool, holder(B), 100).unwrap();
        pool.payout(MANAGER, holder(B), holder(9), 185, 0).unwrap();
        assert_eq!(h.collateral.balance_of(&holder(9)).unwrap(), 185);
        h.clock.advance(DAY);

        assert_eq!(
            pool.exit(holder(A), 100, None),
            Err(PoolError::ResidualCollateralTooLow {
                remaining: 8,
                minimum: 10
            })
        );
        h.assert_custody(&pool);
    }

    #[test]
    fn test_payout_keeps_fee_debt() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        h.enter(&pool, holder(A), 100).unwrap();
        h.deposit_fees(&pool, 20);
        h.enter(&pool, holder(C), 100).unwrap();

        pool.payout(MANAGER, holder(C), holder(9), 80, 100).unwrap();
        assert_eq!(pool.share_balance(&holder(C)), 0);
        assert_eq!(pool.fee_debt_of(&holder(C)), 20);
        assert_eq!(
            pool.payout(MANAGER, holder(A), holder(9), 1_000, 1),
            Err(PoolError::InsufficientPoolCollateral {
                requested: 1_000,
                available: 120
            })
        );
        h.assert_custody(&pool);
    }

    #[test]
    fn test_payout_leaves_remaining_fees_withdrawable() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        h.enter(&pool, holder(A), 100).unwrap();
        h.deposit_fees(&pool, 20);
        h.enter(&pool, holder(C), 100).unwrap();

        pool.payout(MANAGER, holder(C), holder(9), 80, 100).unwrap();
        assert_eq!(pool.claimable_fees(&holder(A)).unwrap(), 20);
        assert_eq!(pool.claimable_fees(&holder(C)).unwrap(), 0);
        pool.verify().unwrap();

        pool.withdraw_fees(holder(A), 20, None).unwrap();
        assert_eq!(h.fasset.balance_of(&holder(A)).unwrap(), 20);
        assert_eq!(pool.total_fee_reserve(), 0);
        h.assert_custody(&pool);
        pool.verify().unwrap();
    }

    #[test]
    fn test_entry_into_drained_pool_rejected() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        h.enter(&pool, holder(A), 100).unwrap();
        pool.payout(MANAGER, holder(A), holder(9), 100, 0).unwrap();
        assert_eq!(pool.total_collateral(), 0);

        assert_eq!(
            h.enter(&pool, holder(B), 50),
            Err(PoolError::CollateralDepleted { supply: 100 })
        );
        assert_eq!(pool.share_balance(&holder(B)), 0);
        assert_eq!(h.collateral.balance_of(&holder(B)).unwrap(), 50);
        h.assert_custody(&pool);
    }

    #[test]
    fn test_config_update_governs_next_entry() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        let config = PoolConfig {
            timelock_duration_secs: 10,
            ..test_config()
        };
        pool.update_config(MANAGER, config.clone()).unwrap();

        h.clock.set(1_000);
        let receipt = h.enter(&pool, holder(A), 100).unwrap();
        assert_eq!(receipt.unlock_time, 1_010);
        assert_eq!(
            h.events.events().first(),
            Some(&PoolEvent::ConfigUpdated(config))
        );
    }

    // =============================================================================
    // SHARES
    // =============================================================================

    #[test]
    fn test_bounded_timelock_cleanup() {
        let h = Harness::new();
        let (pool, store) = h.memory_pool(test_config());
        for i in 0..5 {
            h.clock.set(i);
            h.enter(&pool, holder(A), 10).unwrap();
        }
        h.clock.set(10 * DAY);

        assert!(!pool.cleanup_expired_timelocks(holder(A), 3));
        assert!(pool.cleanup_expired_timelocks(holder(A), 3));
        assert_eq!(pool.share_balance(&holder(A)), 50);
        assert_eq!(pool.timelocked_balance(&holder(A)), 0);

        let stored = store.load().unwrap().unwrap();
        assert!(stored.holders[0].timelocks.is_empty());
    }

    #[test]
    fn test_transfer_carries_no_lock() {
        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        h.enter(&pool, holder(A), 100).unwrap();
        h.enter(&pool, holder(B), 100).unwrap();
        h.clock.advance(DAY);

        pool.transfer(holder(A), holder(7), 40).unwrap();
        assert_eq!(pool.share_balance(&holder(7)), 40);
        assert_eq!(pool.transferable_balance(&holder(7)).unwrap(), 40);
        assert_eq!(pool.total_shares(), 200);

        // no-ops publish nothing
        let events_before = h.events.events().len();
        pool.transfer(holder(A), holder(A), 10).unwrap();
        pool.transfer(holder(A), holder(7), 0).unwrap();
        assert_eq!(h.events.events().len(), events_before);
    }

    // =============================================================================
    // TELEMETRY
    // =============================================================================

    #[test]
    fn test_operations_are_metered() {
        use pool_telemetry::{POOL_OPERATIONS, POOL_REJECTIONS};

        let h = Harness::new();
        let (pool, _store) = h.memory_pool(test_config());
        let entered = POOL_OPERATIONS.with_label_values(&["enter", "ok"]).get();
        let refused = POOL_REJECTIONS
            .with_label_values(&["payout", "authorization"])
            .get();

        h.enter(&pool, holder(A), 100).unwrap();
        let intruder = holder(0x66);
        assert!(pool.payout(intruder, holder(A), intruder, 1, 0).is_err());

        // counters are process-wide; other tests may add to them concurrently
        assert!(POOL_OPERATIONS.with_label_values(&["enter", "ok"]).get() >= entered + 1.0);
        assert!(
            POOL_REJECTIONS
                .with_label_values(&["payout", "authorization"])
                .get()
                >= refused + 1.0
        );
    }
}
