#![allow(deprecated)] // events().publish migration tracked separately

//! Event sinks.
//!
//! Notifications and templated emails are published as events for the
//! off-chain notifier and mailer to pick up. Events of a failed invocation
//! are discarded with it, so a sink only ever sees committed ledger state,
//! and nothing a sink does can roll a ledger mutation back.

use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol};
use stakeflow_common::Role;

use crate::types::{DepositStatus, Settings, WithdrawalStatus};

// ── Notification & email payloads ───────────────────────────────────────────

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum NotificationKind {
    StakeCreated = 0,
    ReferralBonus = 1,
    StakeCompleted = 2,
    DepositConfirmed = 3,
    DepositFailed = 4,
    WithdrawalRequested = 5,
    WithdrawalCompleted = 6,
    WithdrawalRejected = 7,
    WithdrawalFailed = 8,
}

/// In-app notification for a single user.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NotificationEvent {
    pub user: Address,
    pub kind: NotificationKind,
    pub title: String,
    pub amount: i128,
    pub reference_id: u64,
    pub timestamp: u64,
}

/// Request for the mailer to render `template` for the owner of `to`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmailEvent {
    pub to: Address,
    pub template: Symbol,
    pub amount: i128,
    pub reference_id: u64,
    pub timestamp: u64,
}

// ── Audit payloads ──────────────────────────────────────────────────────────

/// Fired once when the ledger is bootstrapped.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub keeper: Address,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserRegisteredEvent {
    pub user: Address,
    pub referrer: Option<Address>,
    pub timestamp: u64,
}

/// Fired when a plan is created or toggled.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlanChangedEvent {
    pub plan_id: u32,
    pub active: bool,
    pub timestamp: u64,
}

/// Fired when a user opens a stake.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub stake_id: u64,
    pub user: Address,
    pub plan_id: u32,
    pub amount: i128,
    pub end_date: u64,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReferralPaidEvent {
    pub referrer: Address,
    pub referred: Address,
    pub stake_id: u64,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired for every applied payout cycle.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PayoutEvent {
    pub stake_id: u64,
    pub user: Address,
    pub cycle: u32,
    pub amount: i128,
    pub total_earned: i128,
    pub completed: bool,
    pub timestamp: u64,
}

/// Fired at the end of each payout run.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PayoutRunEvent {
    pub total: u32,
    pub processed: u32,
    pub completed: u32,
    pub failed: u32,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositSettledEvent {
    pub deposit_id: u64,
    pub user: Address,
    pub amount: i128,
    pub status: DepositStatus,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawalChangedEvent {
    pub withdrawal_id: u64,
    pub user: Address,
    pub amount: i128,
    pub status: WithdrawalStatus,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BalanceAdjustedEvent {
    pub admin: Address,
    pub user: Address,
    pub delta: i128,
    pub new_balance: i128,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SettingsUpdatedEvent {
    pub settings: Settings,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleGrantedEvent {
    pub admin: Address,
    pub holder: Address,
    pub role: Role,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleRevokedEvent {
    pub admin: Address,
    pub holder: Address,
    pub timestamp: u64,
}

// ── Sinks ───────────────────────────────────────────────────────────────────

pub fn notify(
    env: &Env,
    user: &Address,
    kind: NotificationKind,
    title: &str,
    amount: i128,
    reference_id: u64,
) {
    env.events().publish(
        (symbol_short!("NOTIFY"), user.clone()),
        NotificationEvent {
            user: user.clone(),
            kind,
            title: String::from_str(env, title),
            amount,
            reference_id,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn send_templated_email(
    env: &Env,
    to: &Address,
    template: Symbol,
    amount: i128,
    reference_id: u64,
) {
    env.events().publish(
        (symbol_short!("EMAIL"), to.clone()),
        EmailEvent {
            to: to.clone(),
            template,
            amount,
            reference_id,
            timestamp: env.ledger().timestamp(),
        },
    );
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(env: &Env, admin: Address, keeper: Address) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            keeper,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_user_registered(env: &Env, user: Address, referrer: Option<Address>) {
    env.events().publish(
        (symbol_short!("USR_REG"), user.clone()),
        UserRegisteredEvent {
            user,
            referrer,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_plan_changed(env: &Env, plan_id: u32, active: bool) {
    env.events().publish(
        (symbol_short!("PLAN"), plan_id),
        PlanChangedEvent {
            plan_id,
            active,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_staked(
    env: &Env,
    stake_id: u64,
    user: Address,
    plan_id: u32,
    amount: i128,
    end_date: u64,
) {
    env.events().publish(
        (symbol_short!("STAKED"), user.clone()),
        StakedEvent {
            stake_id,
            user,
            plan_id,
            amount,
            end_date,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_referral_paid(
    env: &Env,
    referrer: Address,
    referred: Address,
    stake_id: u64,
    amount: i128,
) {
    env.events().publish(
        (symbol_short!("REF_PAID"), referrer.clone()),
        ReferralPaidEvent {
            referrer,
            referred,
            stake_id,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_payout(
    env: &Env,
    stake_id: u64,
    user: Address,
    cycle: u32,
    amount: i128,
    total_earned: i128,
    completed: bool,
) {
    env.events().publish(
        (symbol_short!("PAYOUT"), user.clone()),
        PayoutEvent {
            stake_id,
            user,
            cycle,
            amount,
            total_earned,
            completed,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_payout_run(env: &Env, total: u32, processed: u32, completed: u32, failed: u32) {
    env.events().publish(
        (symbol_short!("PAY_RUN"),),
        PayoutRunEvent {
            total,
            processed,
            completed,
            failed,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_deposit_settled(
    env: &Env,
    deposit_id: u64,
    user: Address,
    amount: i128,
    status: DepositStatus,
) {
    env.events().publish(
        (symbol_short!("DEP_SET"), user.clone()),
        DepositSettledEvent {
            deposit_id,
            user,
            amount,
            status,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_withdrawal_changed(
    env: &Env,
    withdrawal_id: u64,
    user: Address,
    amount: i128,
    status: WithdrawalStatus,
) {
    env.events().publish(
        (symbol_short!("WD_CHG"), user.clone()),
        WithdrawalChangedEvent {
            withdrawal_id,
            user,
            amount,
            status,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_balance_adjusted(
    env: &Env,
    admin: Address,
    user: Address,
    delta: i128,
    new_balance: i128,
) {
    env.events().publish(
        (symbol_short!("BAL_ADJ"), user.clone()),
        BalanceAdjustedEvent {
            admin,
            user,
            delta,
            new_balance,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_settings_updated(env: &Env, settings: Settings) {
    env.events().publish(
        (symbol_short!("SETTINGS"),),
        SettingsUpdatedEvent {
            settings,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_role_granted(env: &Env, admin: Address, holder: Address, role: Role) {
    env.events().publish(
        (symbol_short!("ROLE_SET"), holder.clone()),
        RoleGrantedEvent {
            admin,
            holder,
            role,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_role_revoked(env: &Env, admin: Address, holder: Address) {
    env.events().publish(
        (symbol_short!("ROLE_DEL"), holder.clone()),
        RoleRevokedEvent {
            admin,
            holder,
            timestamp: env.ledger().timestamp(),
        },
    );
}
