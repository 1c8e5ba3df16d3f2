use soroban_sdk::{symbol_short, Env, Symbol};
use stakeflow_common::money;

use crate::errors::ContractError;
use crate::types::Settings;

const SETTINGS: Symbol = symbol_short!("SETTINGS");

/// Applied when the referral setting is unset or out of range.
pub const DEFAULT_REFERRAL_BONUS_BPS: u32 = 500;
/// Seconds between two payouts of the same stake. Fixed, so a running
/// stake can never be paid more cycles than its term has days.
pub const PAYOUT_INTERVAL: u64 = money::SECONDS_PER_DAY;
/// Hard ceiling on stakes per payout run. One paid stake writes about eight
/// ledger entries, which must stay inside a single transaction's write
/// footprint.
pub const MAX_PAYOUTS_PER_RUN: u32 = 5;
pub const DEFAULT_MAX_PAYOUTS_PER_RUN: u32 = MAX_PAYOUTS_PER_RUN;
/// 10.00 in minor units.
pub const DEFAULT_MIN_WITHDRAWAL: i128 = 1_000;

pub fn defaults() -> Settings {
    Settings {
        referral_bonus_bps: None,
        min_withdrawal: DEFAULT_MIN_WITHDRAWAL,
        max_payouts_per_run: DEFAULT_MAX_PAYOUTS_PER_RUN,
    }
}

pub fn load(env: &Env) -> Settings {
    env.storage().instance().get(&SETTINGS).unwrap_or(defaults())
}

pub fn validate(settings: &Settings) -> Result<(), ContractError> {
    if settings.min_withdrawal < 0
        || settings.max_payouts_per_run == 0
        || settings.max_payouts_per_run > MAX_PAYOUTS_PER_RUN
    {
        return Err(ContractError::InvalidInput);
    }
    Ok(())
}

pub fn store(env: &Env, settings: &Settings) -> Result<(), ContractError> {
    validate(settings)?;
    env.storage().instance().set(&SETTINGS, settings);
    Ok(())
}

/// The referral percentage in force right now.
///
/// The value is read at staking time, not locked to the plan; an unset or
/// out-of-range setting yields [`DEFAULT_REFERRAL_BONUS_BPS`].
pub fn referral_bonus_bps(env: &Env) -> u32 {
    match load(env).referral_bonus_bps {
        Some(bps) if bps <= money::BPS_DENOMINATOR as u32 => bps,
        _ => DEFAULT_REFERRAL_BONUS_BPS,
    }
}
