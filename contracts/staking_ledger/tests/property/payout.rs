#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based tests for the payout schedule.
//!
//! Invariants tested:
//! - Daily runs across a plan's term pay exactly `duration_days` cycles, then complete
//! - Every cycle pays the rounded daily profit and `total_earned` is their sum
//! - Re-running at the same timestamp never pays twice
//! - The stored expected return matches the money helpers

use proptest::prelude::*;
use stakeflow_common::money;
use staking_ledger::StakeStatus;

use crate::common::{setup_test_env, DAY, T0};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_term_pays_each_day_then_completes(
        roi in 1u32..=1_000,
        days in 1u32..=20,
        amount in 1_000i128..=1_000_000,
    ) {
        let ctx = setup_test_env();
        let plan = ctx.create_plan("Prop", roi, days, 1_000, 1_000_000);
        let user = ctx.create_user(None);
        ctx.fund(&user, amount);

        let stake_id = ctx.client.stake(&user, &plan, &amount);
        let stake = ctx.client.get_stake(&stake_id);
        prop_assert_eq!(
            stake.expected_return,
            money::expected_return(amount, roi, days).unwrap()
        );

        let daily = money::daily_profit(amount, roi).unwrap();
        let mut last_earned = 0;
        for day in 1..=days as u64 {
            ctx.set_time(T0 + day * DAY);
            ctx.client.process_payouts(&ctx.keeper);

            let stake = ctx.client.get_stake(&stake_id);
            prop_assert!(stake.total_earned >= last_earned);
            last_earned = stake.total_earned;
        }

        let stake = ctx.client.get_stake(&stake_id);
        prop_assert_eq!(stake.status, StakeStatus::Completed);
        prop_assert_eq!(stake.next_process_at, None);
        prop_assert_eq!(stake.total_earned, daily * days as i128);
        prop_assert_eq!(ctx.client.get_stake_payments(&stake_id).len(), days);
        prop_assert_eq!(ctx.client.get_balance(&user), stake.total_earned);

        ctx.set_time(T0 + (days as u64 + 5) * DAY);
        prop_assert_eq!(ctx.client.process_payouts(&ctx.keeper).total, 0);
        prop_assert_eq!(ctx.client.get_balance(&user), stake.total_earned);
    }

    #[test]
    fn prop_repeated_runs_pay_once(
        runs in 2usize..=6,
        offset in 0u64..DAY,
    ) {
        let ctx = setup_test_env();
        let plan = ctx.create_plan("Prop", 100, 5, 1_000, 1_000_000);
        let user = ctx.create_user(None);
        ctx.fund(&user, 100_000);
        let stake_id = ctx.client.stake(&user, &plan, &100_000);

        ctx.set_time(T0 + DAY + offset);
        let mut processed = 0;
        for _ in 0..runs {
            processed += ctx.client.process_payouts(&ctx.keeper).processed;
        }

        prop_assert_eq!(processed, 1);
        prop_assert_eq!(ctx.client.get_stake_payments(&stake_id).len(), 1);
        prop_assert_eq!(ctx.client.get_balance(&user), 1_000);
    }
}
