#![no_std]

//! Staking ledger and payout state machine.
//!
//! Users hold a cent-denominated balance that moves only together with an
//! append-only [`Transaction`] line. They lock part of it into fixed-term
//! [`Stake`]s, which the keeper pays out once per interval until the term
//! ends. Deposits and withdrawals settle external payments against the same
//! balance.
//!
//! Every public entry point is one atomic unit: if it returns an error,
//! nothing it wrote is kept and none of its events are emitted.

pub mod errors;
pub mod events;
pub mod originator;
pub mod payout;
pub mod plans;
pub mod settings;
pub mod settlement;
pub mod storage;
pub mod types;

use soroban_sdk::{contract, contractimpl, Address, Env, String, Symbol, Vec};
use stakeflow_common::roles;

pub use errors::{ContractError, ErrorCategory};
pub use events::NotificationKind;
pub use stakeflow_common::roles::{Capability, Role};
pub use types::{
    Deposit, DepositStatus, PaymentStatus, PayoutFailure, PayoutSummary, ReferralEarning,
    Settings, Stake, StakePayment, StakeStatus, StakingPlan, Transaction, TransactionKind,
    TransactionStatus, UserAccount, Withdrawal, WithdrawalStatus,
};

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakingLedgerContract;

#[contractimpl]
impl StakingLedgerContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the ledger.
    ///
    /// * `admin`  – receives the `Admin` role.
    /// * `keeper` – the scheduler identity; receives the `Keeper` role.
    pub fn initialize(env: Env, admin: Address, keeper: Address) -> Result<(), ContractError> {
        if storage::is_initialized(&env) {
            return Err(ContractError::AlreadyInitialized);
        }
        admin.require_auth();

        env.storage().instance().set(&storage::ADMIN, &admin);
        env.storage().instance().set(&storage::INITIALIZED, &true);
        settings::store(&env, &settings::defaults())?;
        storage::bump_instance(&env);

        roles::set_role(&env, &admin, Role::Admin);
        if keeper != admin {
            roles::set_role(&env, &keeper, Role::Keeper);
        }

        events::publish_initialized(&env, admin, keeper);

        Ok(())
    }

    pub fn is_initialized(env: Env) -> bool {
        storage::is_initialized(&env)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&storage::ADMIN)
            .ok_or(ContractError::NotInitialized)
    }

    // ── Users ───────────────────────────────────────────────────────────────

    /// Register `user`, optionally under an already registered `referrer`.
    pub fn register_user(
        env: Env,
        user: Address,
        referrer: Option<Address>,
    ) -> Result<(), ContractError> {
        storage::require_initialized(&env)?;
        user.require_auth();

        if storage::load_user(&env, &user).is_some() {
            return Err(ContractError::UserAlreadyRegistered);
        }
        if let Some(referrer) = &referrer {
            if *referrer == user || storage::load_user(&env, referrer).is_none() {
                return Err(ContractError::InvalidReferrer);
            }
        }

        storage::save_user(
            &env,
            &UserAccount {
                address: user.clone(),
                referrer: referrer.clone(),
                balance: 0,
                registered_at: env.ledger().timestamp(),
            },
        );

        events::publish_user_registered(&env, user, referrer);

        Ok(())
    }

    pub fn get_user(env: Env, user: Address) -> Result<UserAccount, ContractError> {
        storage::require_user(&env, &user)
    }

    pub fn get_balance(env: Env, user: Address) -> Result<i128, ContractError> {
        Ok(storage::require_user(&env, &user)?.balance)
    }

    // ── Plans ───────────────────────────────────────────────────────────────

    /// Create an active staking plan and return its id.
    ///
    /// Requires the `ManagePlans` capability.
    pub fn create_plan(
        env: Env,
        caller: Address,
        name: String,
        daily_roi_bps: u32,
        duration_days: u32,
        min_amount: i128,
        max_amount: i128,
    ) -> Result<u32, ContractError> {
        Self::require_capability(&env, &caller, Capability::ManagePlans)?;
        let plan = plans::create(
            &env,
            name,
            daily_roi_bps,
            duration_days,
            min_amount,
            max_amount,
        )?;
        Ok(plan.id)
    }

    /// Open or close a plan to new stakes. Existing stakes are unaffected.
    pub fn set_plan_active(
        env: Env,
        caller: Address,
        plan_id: u32,
        active: bool,
    ) -> Result<(), ContractError> {
        Self::require_capability(&env, &caller, Capability::ManagePlans)?;
        plans::set_active(&env, plan_id, active)
    }

    pub fn get_plan(env: Env, plan_id: u32) -> Result<StakingPlan, ContractError> {
        storage::load_plan(&env, plan_id).ok_or(ContractError::PlanNotFound)
    }

    pub fn list_plans(env: Env) -> Vec<StakingPlan> {
        plans::list(&env)
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Lock `amount` of the staker's balance into `plan_id` and return the
    /// new stake id. The staker's referrer, if any, is credited its bonus in
    /// the same invocation.
    pub fn stake(
        env: Env,
        staker: Address,
        plan_id: u32,
        amount: i128,
    ) -> Result<u64, ContractError> {
        storage::require_initialized(&env)?;
        staker.require_auth();

        let stake = originator::create_stake(&env, &staker, plan_id, amount)?;
        Ok(stake.id)
    }

    pub fn get_stake(env: Env, stake_id: u64) -> Result<Stake, ContractError> {
        storage::load_stake(&env, stake_id).ok_or(ContractError::StakeNotFound)
    }

    pub fn get_user_stakes(env: Env, user: Address) -> Vec<Stake> {
        let mut out = Vec::new(&env);
        for id in storage::user_stake_ids(&env, &user).iter() {
            if let Some(stake) = storage::load_stake(&env, id) {
                out.push_back(stake);
            }
        }
        out
    }

    pub fn get_stake_payments(env: Env, stake_id: u64) -> Vec<StakePayment> {
        storage::stake_payments(&env, stake_id)
    }

    pub fn get_active_stake_count(env: Env) -> u32 {
        storage::active_stake_count(&env)
    }

    // ── Payouts ─────────────────────────────────────────────────────────────

    /// Pay every due stake one cycle and report what happened.
    ///
    /// Safe to call repeatedly: a stake is only due again one interval after
    /// it was paid. Requires the `RunPayouts` capability.
    pub fn process_payouts(env: Env, caller: Address) -> Result<PayoutSummary, ContractError> {
        Self::require_capability(&env, &caller, Capability::RunPayouts)?;
        Ok(payout::process_due_stakes(&env))
    }

    // ── Deposits ────────────────────────────────────────────────────────────

    /// Register a payment the gateway reported for `user` as a pending
    /// deposit. The amount is the gateway's figure, so only settlers may
    /// record it. Requires the `SettleDeposits` capability.
    pub fn create_deposit(
        env: Env,
        caller: Address,
        user: Address,
        amount: i128,
        currency: Symbol,
        payment_id: String,
    ) -> Result<u64, ContractError> {
        Self::require_capability(&env, &caller, Capability::SettleDeposits)?;
        Ok(settlement::create_deposit(&env, &user, amount, currency, payment_id)?.id)
    }

    /// Confirm a pending deposit. Returns `false` if it was already settled,
    /// in which case no balance changes.
    pub fn confirm_deposit(env: Env, caller: Address, deposit_id: u64) -> Result<bool, ContractError> {
        Self::require_capability(&env, &caller, Capability::SettleDeposits)?;
        settlement::confirm_deposit(&env, deposit_id)
    }

    pub fn fail_deposit(env: Env, caller: Address, deposit_id: u64) -> Result<bool, ContractError> {
        Self::require_capability(&env, &caller, Capability::SettleDeposits)?;
        settlement::fail_deposit(&env, deposit_id)
    }

    /// Webhook / poll entry point: apply the gateway's `status` for
    /// `payment_id`. Returns `true` if the deposit changed state.
    pub fn apply_payment_status(
        env: Env,
        caller: Address,
        payment_id: String,
        status: PaymentStatus,
    ) -> Result<bool, ContractError> {
        Self::require_capability(&env, &caller, Capability::SettleDeposits)?;
        settlement::apply_payment_status(&env, &payment_id, status)
    }

    pub fn get_deposit(env: Env, deposit_id: u64) -> Result<Deposit, ContractError> {
        storage::load_deposit(&env, deposit_id).ok_or(ContractError::DepositNotFound)
    }

    pub fn get_user_deposits(env: Env, user: Address) -> Vec<Deposit> {
        let mut out = Vec::new(&env);
        for id in storage::user_deposit_ids(&env, &user).iter() {
            if let Some(deposit) = storage::load_deposit(&env, id) {
                out.push_back(deposit);
            }
        }
        out
    }

    // ── Withdrawals ─────────────────────────────────────────────────────────

    /// Debit `amount` and queue it for an external send to `address`.
    pub fn request_withdrawal(
        env: Env,
        user: Address,
        amount: i128,
        currency: Symbol,
        address: String,
    ) -> Result<u64, ContractError> {
        storage::require_initialized(&env)?;
        user.require_auth();
        Ok(settlement::request_withdrawal(&env, &user, amount, currency, address)?.id)
    }

    pub fn approve_withdrawal(
        env: Env,
        caller: Address,
        withdrawal_id: u64,
        tx_hash: String,
    ) -> Result<(), ContractError> {
        Self::require_capability(&env, &caller, Capability::ReviewWithdrawals)?;
        settlement::approve_withdrawal(&env, withdrawal_id, tx_hash)
    }

    /// Mark a withdrawal whose external send failed. The debit is not
    /// refunded.
    pub fn fail_withdrawal(
        env: Env,
        caller: Address,
        withdrawal_id: u64,
    ) -> Result<(), ContractError> {
        Self::require_capability(&env, &caller, Capability::ReviewWithdrawals)?;
        settlement::fail_withdrawal(&env, withdrawal_id)
    }

    /// Reject a pending withdrawal and return the funds to the balance.
    pub fn reject_withdrawal(
        env: Env,
        caller: Address,
        withdrawal_id: u64,
    ) -> Result<(), ContractError> {
        Self::require_capability(&env, &caller, Capability::ReviewWithdrawals)?;
        settlement::reject_withdrawal(&env, withdrawal_id)
    }

    pub fn get_withdrawal(env: Env, withdrawal_id: u64) -> Result<Withdrawal, ContractError> {
        storage::load_withdrawal(&env, withdrawal_id).ok_or(ContractError::WithdrawalNotFound)
    }

    pub fn get_user_withdrawals(env: Env, user: Address) -> Vec<Withdrawal> {
        let mut out = Vec::new(&env);
        for id in storage::user_withdrawal_ids(&env, &user).iter() {
            if let Some(withdrawal) = storage::load_withdrawal(&env, id) {
                out.push_back(withdrawal);
            }
        }
        out
    }

    // ── Ledger views ────────────────────────────────────────────────────────

    pub fn get_transaction(env: Env, tx_id: u64) -> Result<Transaction, ContractError> {
        storage::load_transaction(&env, tx_id).ok_or(ContractError::TransactionNotFound)
    }

    pub fn get_user_transactions(env: Env, user: Address) -> Vec<Transaction> {
        let mut out = Vec::new(&env);
        for id in storage::user_transaction_ids(&env, &user).iter() {
            if let Some(tx) = storage::load_transaction(&env, id) {
                out.push_back(tx);
            }
        }
        out
    }

    /// Up to `limit` of the user's transactions starting at position
    /// `start`, oldest first.
    pub fn get_user_transactions_page(
        env: Env,
        user: Address,
        start: u32,
        limit: u32,
    ) -> Vec<Transaction> {
        let mut out = Vec::new(&env);
        for id in storage::user_transaction_page(&env, &user, start, limit).iter() {
            if let Some(tx) = storage::load_transaction(&env, id) {
                out.push_back(tx);
            }
        }
        out
    }

    pub fn get_user_transaction_count(env: Env, user: Address) -> u32 {
        storage::user_transaction_count(&env, &user)
    }

    pub fn get_referral_earnings(env: Env, referrer: Address) -> Vec<ReferralEarning> {
        storage::referral_earnings(&env, &referrer)
    }

    // ── Administration ──────────────────────────────────────────────────────

    /// Credit (`delta > 0`) or debit (`delta < 0`) a user's balance with an
    /// admin ledger line. Debits cannot overdraw. Returns the new balance.
    pub fn adjust_balance(
        env: Env,
        caller: Address,
        user: Address,
        delta: i128,
    ) -> Result<i128, ContractError> {
        Self::require_capability(&env, &caller, Capability::AdjustBalances)?;
        if delta == 0 {
            return Err(ContractError::InvalidInput);
        }

        let (new_balance, kind) = if delta > 0 {
            (
                storage::increment_balance(&env, &user, delta)?,
                TransactionKind::AdminCredit,
            )
        } else {
            let amount = delta.checked_neg().ok_or(ContractError::Overflow)?;
            (
                storage::decrement_balance(&env, &user, amount)?,
                TransactionKind::AdminDebit,
            )
        };
        storage::append_transaction(&env, &user, kind, delta, TransactionStatus::Completed, 0);

        events::publish_balance_adjusted(&env, caller, user, delta, new_balance);

        Ok(new_balance)
    }

    pub fn update_settings(
        env: Env,
        caller: Address,
        new_settings: Settings,
    ) -> Result<(), ContractError> {
        Self::require_capability(&env, &caller, Capability::ManageSettings)?;
        settings::store(&env, &new_settings)?;
        events::publish_settings_updated(&env, new_settings);
        Ok(())
    }

    pub fn get_settings(env: Env) -> Settings {
        settings::load(&env)
    }

    // ── Roles ───────────────────────────────────────────────────────────────

    /// Grant `role` to `holder`, replacing any role it had. An admin cannot
    /// change its own role.
    ///
    /// Requires the `ManageRoles` capability.
    pub fn grant_role(
        env: Env,
        caller: Address,
        holder: Address,
        role: Role,
    ) -> Result<(), ContractError> {
        Self::require_capability(&env, &caller, Capability::ManageRoles)?;
        if caller == holder {
            return Err(ContractError::InvalidInput);
        }
        roles::set_role(&env, &holder, role);
        events::publish_role_granted(&env, caller, holder, role);
        Ok(())
    }

    /// Remove `holder`'s role. An admin cannot revoke itself.
    pub fn revoke_role(env: Env, caller: Address, holder: Address) -> Result<(), ContractError> {
        Self::require_capability(&env, &caller, Capability::ManageRoles)?;
        if caller == holder {
            return Err(ContractError::InvalidInput);
        }
        roles::remove_role(&env, &holder);
        events::publish_role_revoked(&env, caller, holder);
        Ok(())
    }

    pub fn get_role(env: Env, holder: Address) -> Option<Role> {
        roles::get_role(&env, &holder)
    }

    pub fn list_role_holders(env: Env) -> Vec<Address> {
        roles::list_holders(&env)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Guard: authenticate `caller` and require a role granting `capability`.
    fn require_capability(
        env: &Env,
        caller: &Address,
        capability: Capability,
    ) -> Result<(), ContractError> {
        storage::require_initialized(env)?;
        caller.require_auth();
        if !roles::has_capability(env, caller, &capability) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────



#[cfg(test)]
mod test_roles;

#[cfg(test)]
mod test_settlement;
