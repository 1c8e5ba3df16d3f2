//! Persistence primitives for the ledger.
//!
//! Everything that touches contract storage goes through here. Balance
//! changes only happen through [`increment_balance`] / [`decrement_balance`],
//! and status transitions of external payments only through the conditional
//! `transition_*` helpers, whose returned count (0 or 1) is the success
//! signal.

use soroban_sdk::{symbol_short, Address, Env, IntoVal, String, Symbol, Val, Vec};

use crate::errors::ContractError;
use crate::types::{
    Deposit, DepositStatus, ReferralEarning, Stake, StakePayment, StakeStatus, StakingPlan,
    Transaction, TransactionKind, TransactionStatus, UserAccount, Withdrawal, WithdrawalStatus,
};

// ── Storage key constants ────────────────────────────────────────────────────

pub(crate) const ADMIN: Symbol = symbol_short!("ADMIN");
pub(crate) const INITIALIZED: Symbol = symbol_short!("INIT");

const PLAN_CTR: Symbol = symbol_short!("PLAN_CTR");
const STAKE_CTR: Symbol = symbol_short!("STK_CTR");
const TX_CTR: Symbol = symbol_short!("TX_CTR");
const DEPOSIT_CTR: Symbol = symbol_short!("DEP_CTR");
const WITHDRAW_CTR: Symbol = symbol_short!("WD_CTR");
const REFERRAL_CTR: Symbol = symbol_short!("REF_CTR");

// Persistent records use tuple keys:  (prefix, id-or-address)
const USER: Symbol = symbol_short!("USER");
const PLAN: Symbol = symbol_short!("PLAN");
const STAKE: Symbol = symbol_short!("STAKE");
const STAKE_PAYMENTS: Symbol = symbol_short!("STK_PAY");
const STAKE_PAYMENT_COUNT: Symbol = symbol_short!("STK_PAYN");
const TRANSACTION: Symbol = symbol_short!("TX");
const DEPOSIT: Symbol = symbol_short!("DEPOSIT");
const DEPOSIT_BY_PAYMENT: Symbol = symbol_short!("DEP_EXT");
const WITHDRAWAL: Symbol = symbol_short!("WITHDRAW");
const REFERRAL: Symbol = symbol_short!("REF_ERN");

// Active-stake queue: (ACTIVE, slot) -> stake id, cursors in instance storage.
const ACTIVE_STAKES: Symbol = symbol_short!("ACTIVE");
const ACTIVE_HEAD: Symbol = symbol_short!("ACT_HEAD");
const ACTIVE_TAIL: Symbol = symbol_short!("ACT_TAIL");

const USER_STAKES: OwnerIndex = OwnerIndex {
    items: symbol_short!("USR_STK"),
    len: symbol_short!("USR_STKN"),
};
const USER_TXS: OwnerIndex = OwnerIndex {
    items: symbol_short!("USR_TX"),
    len: symbol_short!("USR_TXN"),
};
const USER_DEPOSITS: OwnerIndex = OwnerIndex {
    items: symbol_short!("USR_DEP"),
    len: symbol_short!("USR_DEPN"),
};
const USER_WITHDRAWALS: OwnerIndex = OwnerIndex {
    items: symbol_short!("USR_WD"),
    len: symbol_short!("USR_WDN"),
};
const USER_REFERRALS: OwnerIndex = OwnerIndex {
    items: symbol_short!("USR_REF"),
    len: symbol_short!("USR_REFN"),
};

const TTL_THRESHOLD: u32 = 518_400;
const TTL_EXTEND_TO: u32 = 3_110_400;

// ── Low-level helpers ────────────────────────────────────────────────────────

fn put<K, V>(env: &Env, key: &K, value: &V)
where
    K: IntoVal<Env, Val>,
    V: IntoVal<Env, Val>,
{
    env.storage().persistent().set(key, value);
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Append-only list of record ids owned by one address.
///
/// Each entry lives under its own key `(items, owner, n)` and the length
/// under `(len, owner)`, so appending writes two small entries no matter
/// how long the list already is.
struct OwnerIndex {
    items: Symbol,
    len: Symbol,
}

impl OwnerIndex {
    fn len(&self, env: &Env, owner: &Address) -> u32 {
        env.storage()
            .persistent()
            .get(&(self.len.clone(), owner.clone()))
            .unwrap_or(0)
    }

    fn push(&self, env: &Env, owner: &Address, id: u64) {
        let n = self.len(env, owner);
        put(env, &(self.items.clone(), owner.clone(), n), &id);
        put(env, &(self.len.clone(), owner.clone()), &n.saturating_add(1));
    }

    /// Up to `limit` ids starting at position `start`, oldest first.
    fn page(&self, env: &Env, owner: &Address, start: u32, limit: u32) -> Vec<u64> {
        let end = self.len(env, owner).min(start.saturating_add(limit));
        let mut ids = Vec::new(env);
        for n in start..end {
            let id: Option<u64> = env
                .storage()
                .persistent()
                .get(&(self.items.clone(), owner.clone(), n));
            if let Some(id) = id {
                ids.push_back(id);
            }
        }
        ids
    }

    fn all(&self, env: &Env, owner: &Address) -> Vec<u64> {
        self.page(env, owner, 0, u32::MAX)
    }
}

fn next_id(env: &Env, counter: &Symbol) -> u64 {
    let current: u64 = env.storage().instance().get(counter).unwrap_or(0);
    let next = current.saturating_add(1);
    env.storage().instance().set(counter, &next);
    next
}

pub(crate) fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&INITIALIZED)
}

pub fn require_initialized(env: &Env) -> Result<(), ContractError> {
    if !is_initialized(env) {
        return Err(ContractError::NotInitialized);
    }
    Ok(())
}

// ── Users & balances ─────────────────────────────────────────────────────────

pub fn load_user(env: &Env, address: &Address) -> Option<UserAccount> {
    env.storage().persistent().get(&(USER, address.clone()))
}

pub fn require_user(env: &Env, address: &Address) -> Result<UserAccount, ContractError> {
    load_user(env, address).ok_or(ContractError::UserNotFound)
}

pub fn save_user(env: &Env, user: &UserAccount) {
    put(env, &(USER, user.address.clone()), user);
}

/// Adds `delta` to the user's balance and returns the new balance.
///
/// Nothing is written when the user is missing or the sum overflows.
pub fn increment_balance(env: &Env, address: &Address, delta: i128) -> Result<i128, ContractError> {
    let mut user = require_user(env, address)?;
    user.balance = user
        .balance
        .checked_add(delta)
        .ok_or(ContractError::Overflow)?;
    save_user(env, &user);
    Ok(user.balance)
}

/// Removes `amount` from the user's balance after re-reading it in the
/// current invocation. Fails without writing if the balance cannot cover it.
pub fn decrement_balance(
    env: &Env,
    address: &Address,
    amount: i128,
) -> Result<i128, ContractError> {
    if amount <= 0 {
        return Err(ContractError::InvalidInput);
    }
    let mut user = require_user(env, address)?;
    if user.balance < amount {
        return Err(ContractError::InsufficientBalance);
    }
    user.balance -= amount;
    save_user(env, &user);
    Ok(user.balance)
}

// ── Plans ────────────────────────────────────────────────────────────────────

pub fn next_plan_id(env: &Env) -> u32 {
    let current: u32 = env.storage().instance().get(&PLAN_CTR).unwrap_or(0);
    let next = current.saturating_add(1);
    env.storage().instance().set(&PLAN_CTR, &next);
    next
}

pub fn plan_count(env: &Env) -> u32 {
    env.storage().instance().get(&PLAN_CTR).unwrap_or(0)
}

pub fn load_plan(env: &Env, plan_id: u32) -> Option<StakingPlan> {
    env.storage().persistent().get(&(PLAN, plan_id))
}

pub fn save_plan(env: &Env, plan: &StakingPlan) {
    put(env, &(PLAN, plan.id), plan);
}

// ── Stakes ───────────────────────────────────────────────────────────────────

pub fn next_stake_id(env: &Env) -> u64 {
    next_id(env, &STAKE_CTR)
}

pub fn load_stake(env: &Env, stake_id: u64) -> Option<Stake> {
    env.storage().persistent().get(&(STAKE, stake_id))
}

pub fn save_stake(env: &Env, stake: &Stake) {
    put(env, &(STAKE, stake.id), stake);
}

/// Stores a freshly originated stake and queues it for payouts.
pub fn insert_stake(env: &Env, stake: &Stake) {
    save_stake(env, stake);
    USER_STAKES.push(env, &stake.user, stake.id);
    enqueue_active(env, stake.id);
}

pub fn user_stake_ids(env: &Env, user: &Address) -> Vec<u64> {
    USER_STAKES.all(env, user)
}

fn active_cursor(env: &Env, key: &Symbol) -> u64 {
    env.storage().instance().get(key).unwrap_or(0)
}

/// Appends a stake to the back of the active queue.
///
/// Stakes are queued with `next_process_at = now + PAYOUT_INTERVAL` and the
/// ledger clock never goes back, so the queue stays ordered by due time and
/// the due stakes always sit at its front.
pub fn enqueue_active(env: &Env, stake_id: u64) {
    let tail = active_cursor(env, &ACTIVE_TAIL);
    put(env, &(ACTIVE_STAKES, tail), &stake_id);
    env.storage()
        .instance()
        .set(&ACTIVE_TAIL, &tail.saturating_add(1));
}

/// Drops the front entry of the active queue.
pub fn pop_active(env: &Env) {
    let head = active_cursor(env, &ACTIVE_HEAD);
    if head >= active_cursor(env, &ACTIVE_TAIL) {
        return;
    }
    env.storage().persistent().remove(&(ACTIVE_STAKES, head));
    env.storage().instance().set(&ACTIVE_HEAD, &(head + 1));
}

pub fn active_stake_count(env: &Env) -> u32 {
    let pending =
        active_cursor(env, &ACTIVE_TAIL).saturating_sub(active_cursor(env, &ACTIVE_HEAD));
    u32::try_from(pending).unwrap_or(u32::MAX)
}

/// The stake at the front of the active queue if it is due at `now`.
///
/// Entries whose stake is gone or no longer active are dropped on the way.
pub fn next_due_stake(env: &Env, now: u64) -> Option<Stake> {
    loop {
        let head = active_cursor(env, &ACTIVE_HEAD);
        if head >= active_cursor(env, &ACTIVE_TAIL) {
            return None;
        }
        let stake_id: Option<u64> = env.storage().persistent().get(&(ACTIVE_STAKES, head));
        match stake_id.and_then(|id| load_stake(env, id)) {
            Some(stake) if stake.status == StakeStatus::Active => {
                return if stake.is_due(now) { Some(stake) } else { None };
            }
            _ => pop_active(env),
        }
    }
}

pub fn stake_payment_count(env: &Env, stake_id: u64) -> u32 {
    env.storage()
        .persistent()
        .get(&(STAKE_PAYMENT_COUNT, stake_id))
        .unwrap_or(0)
}

pub fn stake_payments(env: &Env, stake_id: u64) -> Vec<StakePayment> {
    let mut payments = Vec::new(env);
    for cycle in 1..=stake_payment_count(env, stake_id) {
        let payment: Option<StakePayment> = env
            .storage()
            .persistent()
            .get(&(STAKE_PAYMENTS, stake_id, cycle));
        if let Some(payment) = payment {
            payments.push_back(payment);
        }
    }
    payments
}

/// Stores a payment under its cycle number, which is 1-based and
/// contiguous per stake.
pub fn append_payment(env: &Env, payment: &StakePayment) {
    put(env, &(STAKE_PAYMENTS, payment.stake_id, payment.cycle), payment);
    put(env, &(STAKE_PAYMENT_COUNT, payment.stake_id), &payment.cycle);
}

// ── Transactions ─────────────────────────────────────────────────────────────

pub fn append_transaction(
    env: &Env,
    user: &Address,
    kind: TransactionKind,
    amount: i128,
    status: TransactionStatus,
    reference_id: u64,
) -> Transaction {
    let tx = Transaction {
        id: next_id(env, &TX_CTR),
        user: user.clone(),
        kind,
        amount,
        status,
        reference_id,
        created_at: env.ledger().timestamp(),
    };
    put(env, &(TRANSACTION, tx.id), &tx);
    USER_TXS.push(env, user, tx.id);
    tx
}

pub fn load_transaction(env: &Env, tx_id: u64) -> Option<Transaction> {
    env.storage().persistent().get(&(TRANSACTION, tx_id))
}

pub fn set_transaction_status(
    env: &Env,
    tx_id: u64,
    status: TransactionStatus,
) -> Result<(), ContractError> {
    let mut tx = load_transaction(env, tx_id).ok_or(ContractError::TransactionNotFound)?;
    tx.status = status;
    put(env, &(TRANSACTION, tx_id), &tx);
    Ok(())
}

pub fn user_transaction_ids(env: &Env, user: &Address) -> Vec<u64> {
    USER_TXS.all(env, user)
}

pub fn user_transaction_count(env: &Env, user: &Address) -> u32 {
    USER_TXS.len(env, user)
}

pub fn user_transaction_page(env: &Env, user: &Address, start: u32, limit: u32) -> Vec<u64> {
    USER_TXS.page(env, user, start, limit)
}

// ── Referral earnings ────────────────────────────────────────────────────────

pub fn append_referral_earning(
    env: &Env,
    referrer: &Address,
    referred: &Address,
    stake_id: u64,
    amount: i128,
) -> ReferralEarning {
    let earning = ReferralEarning {
        id: next_id(env, &REFERRAL_CTR),
        referrer: referrer.clone(),
        referred: referred.clone(),
        stake_id,
        amount,
        created_at: env.ledger().timestamp(),
    };
    put(env, &(REFERRAL, earning.id), &earning);
    USER_REFERRALS.push(env, referrer, earning.id);
    earning
}

pub fn referral_earnings(env: &Env, referrer: &Address) -> Vec<ReferralEarning> {
    let mut out = Vec::new(env);
    for id in USER_REFERRALS.all(env, referrer).iter() {
        let earning: Option<ReferralEarning> = env.storage().persistent().get(&(REFERRAL, id));
        if let Some(earning) = earning {
            out.push_back(earning);
        }
    }
    out
}

// ── Deposits ─────────────────────────────────────────────────────────────────

pub fn insert_deposit(
    env: &Env,
    user: &Address,
    amount: i128,
    currency: Symbol,
    payment_id: String,
) -> Result<Deposit, ContractError> {
    let index_key = (DEPOSIT_BY_PAYMENT, payment_id.clone());
    if env.storage().persistent().has(&index_key) {
        return Err(ContractError::DuplicatePayment);
    }
    let deposit = Deposit {
        id: next_id(env, &DEPOSIT_CTR),
        user: user.clone(),
        amount,
        currency,
        payment_id,
        status: DepositStatus::Pending,
        transaction_id: None,
        created_at: env.ledger().timestamp(),
        settled_at: None,
    };
    save_deposit(env, &deposit);
    put(env, &index_key, &deposit.id);
    USER_DEPOSITS.push(env, user, deposit.id);
    Ok(deposit)
}

pub fn load_deposit(env: &Env, deposit_id: u64) -> Option<Deposit> {
    env.storage().persistent().get(&(DEPOSIT, deposit_id))
}

pub fn save_deposit(env: &Env, deposit: &Deposit) {
    put(env, &(DEPOSIT, deposit.id), deposit);
}

pub fn deposit_id_for_payment(env: &Env, payment_id: &String) -> Option<u64> {
    env.storage()
        .persistent()
        .get(&(DEPOSIT_BY_PAYMENT, payment_id.clone()))
}

pub fn user_deposit_ids(env: &Env, user: &Address) -> Vec<u64> {
    USER_DEPOSITS.all(env, user)
}

/// Sets the deposit's status to `to` only where it currently is `from`.
/// Returns the number of records changed.
pub fn transition_deposit(
    env: &Env,
    deposit_id: u64,
    from: DepositStatus,
    to: DepositStatus,
) -> Result<u32, ContractError> {
    let mut deposit = load_deposit(env, deposit_id).ok_or(ContractError::DepositNotFound)?;
    if deposit.status != from {
        return Ok(0);
    }
    deposit.status = to;
    deposit.settled_at = Some(env.ledger().timestamp());
    save_deposit(env, &deposit);
    Ok(1)
}

// ── Withdrawals ──────────────────────────────────────────────────────────────

pub fn next_withdrawal_id(env: &Env) -> u64 {
    next_id(env, &WITHDRAW_CTR)
}

pub fn insert_withdrawal(env: &Env, withdrawal: &Withdrawal) {
    save_withdrawal(env, withdrawal);
    USER_WITHDRAWALS.push(env, &withdrawal.user, withdrawal.id);
}

pub fn load_withdrawal(env: &Env, withdrawal_id: u64) -> Option<Withdrawal> {
    env.storage().persistent().get(&(WITHDRAWAL, withdrawal_id))
}

pub fn save_withdrawal(env: &Env, withdrawal: &Withdrawal) {
    put(env, &(WITHDRAWAL, withdrawal.id), withdrawal);
}

pub fn user_withdrawal_ids(env: &Env, user: &Address) -> Vec<u64> {
    USER_WITHDRAWALS.all(env, user)
}

/// Sets the withdrawal's status to `to` only where it currently is `from`.
/// Returns the number of records changed.
pub fn transition_withdrawal(
    env: &Env,
    withdrawal_id: u64,
    from: WithdrawalStatus,
    to: WithdrawalStatus,
) -> Result<u32, ContractError> {
    let mut withdrawal =
        load_withdrawal(env, withdrawal_id).ok_or(ContractError::WithdrawalNotFound)?;
    if withdrawal.status != from {
        return Ok(0);
    }
    withdrawal.status = to;
    withdrawal.settled_at = Some(env.ledger().timestamp());
    save_withdrawal(env, &withdrawal);
    Ok(1)
}
