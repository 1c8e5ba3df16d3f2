use soroban_sdk::{Env, String, Vec};
use stakeflow_common::money;

use crate::errors::ContractError;
use crate::events;
use crate::storage;
use crate::types::StakingPlan;

pub fn create(
    env: &Env,
    name: String,
    daily_roi_bps: u32,
    duration_days: u32,
    min_amount: i128,
    max_amount: i128,
) -> Result<StakingPlan, ContractError> {
    if daily_roi_bps == 0 || duration_days == 0 {
        return Err(ContractError::InvalidInput);
    }
    if min_amount <= 0 || max_amount < min_amount {
        return Err(ContractError::InvalidInput);
    }
    // The whole-term figures must be representable for every allowed amount.
    money::total_roi_bps(daily_roi_bps, duration_days).ok_or(ContractError::Overflow)?;
    money::days_to_seconds(duration_days).ok_or(ContractError::Overflow)?;

    let plan = StakingPlan {
        id: storage::next_plan_id(env),
        name,
        daily_roi_bps,
        duration_days,
        min_amount,
        max_amount,
        active: true,
    };
    storage::save_plan(env, &plan);

    events::publish_plan_changed(env, plan.id, true);

    Ok(plan)
}

pub fn set_active(env: &Env, plan_id: u32, active: bool) -> Result<(), ContractError> {
    let mut plan = storage::load_plan(env, plan_id).ok_or(ContractError::PlanNotFound)?;
    plan.active = active;
    storage::save_plan(env, &plan);

    events::publish_plan_changed(env, plan_id, active);

    Ok(())
}

pub fn list(env: &Env) -> Vec<StakingPlan> {
    let mut plans = Vec::new(env);
    for id in 1..=storage::plan_count(env) {
        if let Some(plan) = storage::load_plan(env, id) {
            plans.push_back(plan);
        }
    }
    plans
}
