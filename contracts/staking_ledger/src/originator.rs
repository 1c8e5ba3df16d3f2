//! Stake origination.
//!
//! The balance read, the sufficiency check and the debit all happen inside
//! the calling invocation, so two racing stake requests can never both spend
//! the same funds: the loser re-reads the already-debited balance and fails
//! with `InsufficientBalance`, rolling back everything it wrote.

use soroban_sdk::{log, symbol_short, Address, Env};
use stakeflow_common::money;

use crate::errors::ContractError;
use crate::events::{self, NotificationKind};
use crate::settings;
use crate::storage;
use crate::types::{Stake, StakeStatus, StakingPlan, TransactionKind, TransactionStatus};

pub fn create_stake(
    env: &Env,
    staker: &Address,
    plan_id: u32,
    amount: i128,
) -> Result<Stake, ContractError> {
    // 1. Plan and amount validation; nothing has been written yet.
    let plan = storage::load_plan(env, plan_id).ok_or(ContractError::PlanNotFound)?;
    if !plan.active {
        return Err(ContractError::PlanInactive);
    }
    check_bounds(env, &plan, amount)?;

    // 2. Derive the schedule before touching the balance.
    let now = env.ledger().timestamp();
    let term = money::days_to_seconds(plan.duration_days).ok_or(ContractError::Overflow)?;
    let end_date = now.checked_add(term).ok_or(ContractError::Overflow)?;
    let next_process_at = now
        .checked_add(settings::PAYOUT_INTERVAL)
        .ok_or(ContractError::Overflow)?;
    let expected_return = money::expected_return(amount, plan.daily_roi_bps, plan.duration_days)
        .ok_or(ContractError::Overflow)?;
    let total_roi_bps = money::total_roi_bps(plan.daily_roi_bps, plan.duration_days)
        .ok_or(ContractError::Overflow)?;

    // 3. Fresh balance read + debit.
    let user = storage::require_user(env, staker)?;
    storage::decrement_balance(env, staker, amount)?;

    // 4. Position and ledger line.
    let stake = Stake {
        id: storage::next_stake_id(env),
        user: staker.clone(),
        plan_id,
        amount,
        daily_roi_bps: plan.daily_roi_bps,
        total_roi_bps,
        expected_return,
        total_earned: 0,
        status: StakeStatus::Active,
        start_date: now,
        end_date,
        next_process_at: Some(next_process_at),
        last_processed: None,
    };
    storage::insert_stake(env, &stake);
    storage::append_transaction(
        env,
        staker,
        TransactionKind::Staking,
        -amount,
        TransactionStatus::Completed,
        stake.id,
    );

    events::publish_staked(env, stake.id, staker.clone(), plan_id, amount, end_date);
    events::notify(
        env,
        staker,
        NotificationKind::StakeCreated,
        "Stake created",
        amount,
        stake.id,
    );

    // 5. Upstream referral bonus.
    if let Some(referrer) = user.referrer {
        credit_referrer(env, &referrer, staker, &stake)?;
    }

    Ok(stake)
}

fn check_bounds(env: &Env, plan: &StakingPlan, amount: i128) -> Result<(), ContractError> {
    if amount < plan.min_amount {
        log!(env, "stake below plan minimum", plan.id, plan.min_amount);
        return Err(ContractError::AmountBelowMinimum);
    }
    if amount > plan.max_amount {
        log!(env, "stake above plan maximum", plan.id, plan.max_amount);
        return Err(ContractError::AmountAboveMaximum);
    }
    Ok(())
}

/// Pays `referrer` its cut of `stake` at the referral rate currently
/// configured. A referrer that is no longer registered is skipped.
fn credit_referrer(
    env: &Env,
    referrer: &Address,
    referred: &Address,
    stake: &Stake,
) -> Result<(), ContractError> {
    if storage::load_user(env, referrer).is_none() {
        log!(env, "referrer not registered, bonus skipped", stake.id);
        return Ok(());
    }

    let bps = settings::referral_bonus_bps(env);
    let bonus = money::apply_bps(stake.amount, bps).ok_or(ContractError::Overflow)?;
    if bonus <= 0 {
        return Ok(());
    }

    storage::increment_balance(env, referrer, bonus)?;
    let earning = storage::append_referral_earning(env, referrer, referred, stake.id, bonus);
    storage::append_transaction(
        env,
        referrer,
        TransactionKind::ReferralBonus,
        bonus,
        TransactionStatus::Completed,
        earning.id,
    );

    events::publish_referral_paid(env, referrer.clone(), referred.clone(), stake.id, bonus);
    events::notify(
        env,
        referrer,
        NotificationKind::ReferralBonus,
        "Referral bonus received",
        bonus,
        stake.id,
    );
    events::send_templated_email(env, referrer, symbol_short!("ref_bonus"), bonus, stake.id);

    Ok(())
}
