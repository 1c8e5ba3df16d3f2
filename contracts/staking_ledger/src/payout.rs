//! Daily payout processing.
//!
//! A run pays every due stake one cycle of profit. Each stake is its own
//! unit of work: all of its fallible steps run before its first write, so a
//! stake that fails leaves storage exactly as it found it and the run moves
//! on to the next one. `next_process_at` advances in the same unit as the
//! credit, which makes a repeated run at the same `now` a no-op.
//!
//! Due stakes are taken from the front of the active queue. A paid stake
//! goes to the back with its next due time, a completed one leaves the
//! queue, and a failed one is queued again once the run is over so it is
//! retried by a later run.

use soroban_sdk::{log, symbol_short, Env, Vec};
use stakeflow_common::money;

use crate::errors::ContractError;
use crate::events::{self, NotificationKind};
use crate::settings;
use crate::storage;
use crate::types::{
    PayoutFailure, PayoutSummary, Stake, StakePayment, StakeStatus, TransactionKind,
    TransactionStatus,
};

/// Outcome of one successfully applied cycle.
struct AppliedCycle {
    completed: bool,
}

pub fn process_due_stakes(env: &Env) -> PayoutSummary {
    let now = env.ledger().timestamp();
    let config = settings::load(env);

    let mut summary = PayoutSummary {
        total: 0,
        processed: 0,
        completed: 0,
        errors: Vec::new(env),
    };
    let mut retry: Vec<u64> = Vec::new(env);

    while summary.total < config.max_payouts_per_run {
        let Some(stake) = storage::next_due_stake(env, now) else {
            break;
        };
        storage::pop_active(env);
        summary.total += 1;

        match apply_cycle(env, &stake, now) {
            Ok(applied) => {
                summary.processed += 1;
                if applied.completed {
                    summary.completed += 1;
                } else {
                    storage::enqueue_active(env, stake.id);
                }
            }
            Err(err) => {
                retry.push_back(stake.id);
                let code = err as u32;
                log!(env, "payout failed", stake.id, code);
                summary.errors.push_back(PayoutFailure {
                    stake_id: stake.id,
                    code,
                    category: err.category(),
                });
            }
        }
    }
    for stake_id in retry.iter() {
        storage::enqueue_active(env, stake_id);
    }

    events::publish_payout_run(
        env,
        summary.total,
        summary.processed,
        summary.completed,
        summary.errors.len(),
    );

    summary
}

fn apply_cycle(env: &Env, stake: &Stake, now: u64) -> Result<AppliedCycle, ContractError> {
    if stake.status != StakeStatus::Active {
        return Err(ContractError::StakeNotActive);
    }

    let daily_profit =
        money::daily_profit(stake.amount, stake.daily_roi_bps).ok_or(ContractError::Overflow)?;
    let is_last = stake.end_date <= now;
    let total_earned = stake
        .total_earned
        .checked_add(daily_profit)
        .ok_or(ContractError::Overflow)?;
    let next_process_at = if is_last {
        None
    } else {
        Some(
            now.checked_add(settings::PAYOUT_INTERVAL)
                .ok_or(ContractError::Overflow)?,
        )
    };
    let cycle = storage::stake_payment_count(env, stake.id)
        .checked_add(1)
        .ok_or(ContractError::Overflow)?;

    // Last fallible step; it writes nothing on failure.
    storage::increment_balance(env, &stake.user, daily_profit)?;

    // ── Infallible writes from here on ──
    storage::append_payment(
        env,
        &StakePayment {
            stake_id: stake.id,
            cycle,
            amount: daily_profit,
            paid_at: now,
        },
    );

    let mut updated = stake.clone();
    updated.total_earned = total_earned;
    updated.last_processed = Some(now);
    updated.next_process_at = next_process_at;
    if is_last {
        updated.status = StakeStatus::Completed;
    }
    storage::save_stake(env, &updated);

    storage::append_transaction(
        env,
        &stake.user,
        TransactionKind::StakingReturn,
        daily_profit,
        TransactionStatus::Completed,
        stake.id,
    );

    events::publish_payout(
        env,
        stake.id,
        stake.user.clone(),
        cycle,
        daily_profit,
        total_earned,
        is_last,
    );
    if is_last {
        events::notify(
            env,
            &stake.user,
            NotificationKind::StakeCompleted,
            "Stake completed",
            total_earned,
            stake.id,
        );
        events::send_templated_email(
            env,
            &stake.user,
            symbol_short!("stake_end"),
            total_earned,
            stake.id,
        );
    }

    Ok(AppliedCycle { completed: is_last })
}
