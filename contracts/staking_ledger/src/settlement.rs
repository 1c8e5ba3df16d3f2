//! Deposit and withdrawal settlement.
//!
//! Status changes go through the storage layer's conditional transitions.
//! A transition that changes nothing means another delivery already settled
//! the record; for deposits that is a silent no-op (payment webhooks can be
//! delivered more than once), for withdrawal review it is an error returned
//! to the reviewer.

use soroban_sdk::{log, symbol_short, Address, Env, String, Symbol};

use crate::errors::ContractError;
use crate::events::{self, NotificationKind};
use crate::settings;
use crate::storage;
use crate::types::{
    Deposit, DepositStatus, PaymentStatus, TransactionKind, TransactionStatus, Withdrawal,
    WithdrawalStatus,
};

// ── Deposits ────────────────────────────────────────────────────────────────

pub fn create_deposit(
    env: &Env,
    user: &Address,
    amount: i128,
    currency: Symbol,
    payment_id: String,
) -> Result<Deposit, ContractError> {
    if amount <= 0 || payment_id.len() == 0 {
        return Err(ContractError::InvalidInput);
    }
    storage::require_user(env, user)?;
    storage::insert_deposit(env, user, amount, currency, payment_id)
}

/// Confirms a pending deposit and credits it exactly once.
///
/// Returns `false` without touching any balance when the deposit was
/// already confirmed or failed.
pub fn confirm_deposit(env: &Env, deposit_id: u64) -> Result<bool, ContractError> {
    let affected = storage::transition_deposit(
        env,
        deposit_id,
        DepositStatus::Pending,
        DepositStatus::Confirmed,
    )?;
    if affected == 0 {
        log!(env, "deposit already settled", deposit_id);
        return Ok(false);
    }

    let mut deposit = storage::load_deposit(env, deposit_id).ok_or(ContractError::DepositNotFound)?;
    storage::increment_balance(env, &deposit.user, deposit.amount)?;
    let tx = storage::append_transaction(
        env,
        &deposit.user,
        TransactionKind::Deposit,
        deposit.amount,
        TransactionStatus::Completed,
        deposit.id,
    );
    deposit.transaction_id = Some(tx.id);
    storage::save_deposit(env, &deposit);

    events::publish_deposit_settled(
        env,
        deposit.id,
        deposit.user.clone(),
        deposit.amount,
        DepositStatus::Confirmed,
    );
    events::notify(
        env,
        &deposit.user,
        NotificationKind::DepositConfirmed,
        "Deposit confirmed",
        deposit.amount,
        deposit.id,
    );
    events::send_templated_email(
        env,
        &deposit.user,
        symbol_short!("deposit"),
        deposit.amount,
        deposit.id,
    );

    Ok(true)
}

/// Marks a pending deposit as failed. No balance effect.
pub fn fail_deposit(env: &Env, deposit_id: u64) -> Result<bool, ContractError> {
    let affected = storage::transition_deposit(
        env,
        deposit_id,
        DepositStatus::Pending,
        DepositStatus::Failed,
    )?;
    if affected == 0 {
        return Ok(false);
    }

    let deposit = storage::load_deposit(env, deposit_id).ok_or(ContractError::DepositNotFound)?;
    events::publish_deposit_settled(
        env,
        deposit.id,
        deposit.user.clone(),
        deposit.amount,
        DepositStatus::Failed,
    );
    events::notify(
        env,
        &deposit.user,
        NotificationKind::DepositFailed,
        "Deposit failed",
        deposit.amount,
        deposit.id,
    );

    Ok(true)
}

/// Applies a gateway status report to the deposit registered under
/// `payment_id`. Intermediate statuses leave the deposit pending.
pub fn apply_payment_status(
    env: &Env,
    payment_id: &String,
    status: PaymentStatus,
) -> Result<bool, ContractError> {
    let deposit_id =
        storage::deposit_id_for_payment(env, payment_id).ok_or(ContractError::DepositNotFound)?;
    match status {
        PaymentStatus::Confirmed | PaymentStatus::Finished => confirm_deposit(env, deposit_id),
        PaymentStatus::Failed | PaymentStatus::Refunded | PaymentStatus::Expired => {
            fail_deposit(env, deposit_id)
        }
        PaymentStatus::Waiting
        | PaymentStatus::Confirming
        | PaymentStatus::Sending
        | PaymentStatus::PartiallyPaid => Ok(false),
    }
}

// ── Withdrawals ─────────────────────────────────────────────────────────────

pub fn request_withdrawal(
    env: &Env,
    user: &Address,
    amount: i128,
    currency: Symbol,
    address: String,
) -> Result<Withdrawal, ContractError> {
    if amount <= 0 || address.len() == 0 {
        return Err(ContractError::InvalidInput);
    }
    if amount < settings::load(env).min_withdrawal {
        return Err(ContractError::BelowMinimumWithdrawal);
    }

    storage::decrement_balance(env, user, amount)?;

    let id = storage::next_withdrawal_id(env);
    let tx = storage::append_transaction(
        env,
        user,
        TransactionKind::Withdrawal,
        -amount,
        TransactionStatus::Pending,
        id,
    );
    let withdrawal = Withdrawal {
        id,
        user: user.clone(),
        amount,
        currency,
        address,
        status: WithdrawalStatus::Pending,
        transaction_id: tx.id,
        tx_hash: None,
        created_at: env.ledger().timestamp(),
        settled_at: None,
    };
    storage::insert_withdrawal(env, &withdrawal);

    events::publish_withdrawal_changed(env, id, user.clone(), amount, WithdrawalStatus::Pending);
    events::notify(
        env,
        user,
        NotificationKind::WithdrawalRequested,
        "Withdrawal requested",
        amount,
        id,
    );

    Ok(withdrawal)
}

/// Records a successful external send. The funds already left the balance
/// when the withdrawal was requested.
pub fn approve_withdrawal(
    env: &Env,
    withdrawal_id: u64,
    tx_hash: String,
) -> Result<(), ContractError> {
    if tx_hash.len() == 0 {
        return Err(ContractError::InvalidInput);
    }
    let mut withdrawal = transition_pending(env, withdrawal_id, WithdrawalStatus::Completed)?;
    withdrawal.tx_hash = Some(tx_hash);
    storage::save_withdrawal(env, &withdrawal);
    storage::set_transaction_status(env, withdrawal.transaction_id, TransactionStatus::Completed)?;

    events::publish_withdrawal_changed(
        env,
        withdrawal.id,
        withdrawal.user.clone(),
        withdrawal.amount,
        WithdrawalStatus::Completed,
    );
    events::notify(
        env,
        &withdrawal.user,
        NotificationKind::WithdrawalCompleted,
        "Withdrawal sent",
        withdrawal.amount,
        withdrawal.id,
    );
    events::send_templated_email(
        env,
        &withdrawal.user,
        symbol_short!("withdraw"),
        withdrawal.amount,
        withdrawal.id,
    );

    Ok(())
}

/// Records a failed external send. The debit is kept; resolving the funds
/// is a manual, out-of-band step.
pub fn fail_withdrawal(env: &Env, withdrawal_id: u64) -> Result<(), ContractError> {
    let withdrawal = transition_pending(env, withdrawal_id, WithdrawalStatus::Failed)?;
    storage::set_transaction_status(env, withdrawal.transaction_id, TransactionStatus::Failed)?;
    log!(env, "withdrawal send failed, funds held", withdrawal.id, withdrawal.amount);

    events::publish_withdrawal_changed(
        env,
        withdrawal.id,
        withdrawal.user.clone(),
        withdrawal.amount,
        WithdrawalStatus::Failed,
    );
    events::notify(
        env,
        &withdrawal.user,
        NotificationKind::WithdrawalFailed,
        "Withdrawal failed",
        withdrawal.amount,
        withdrawal.id,
    );

    Ok(())
}

/// Rejects a pending withdrawal and refunds the debited amount.
pub fn reject_withdrawal(env: &Env, withdrawal_id: u64) -> Result<(), ContractError> {
    let withdrawal = transition_pending(env, withdrawal_id, WithdrawalStatus::Rejected)?;

    storage::increment_balance(env, &withdrawal.user, withdrawal.amount)?;
    storage::append_transaction(
        env,
        &withdrawal.user,
        TransactionKind::Refund,
        withdrawal.amount,
        TransactionStatus::Completed,
        withdrawal.id,
    );
    storage::set_transaction_status(env, withdrawal.transaction_id, TransactionStatus::Rejected)?;

    events::publish_withdrawal_changed(
        env,
        withdrawal.id,
        withdrawal.user.clone(),
        withdrawal.amount,
        WithdrawalStatus::Rejected,
    );
    events::notify(
        env,
        &withdrawal.user,
        NotificationKind::WithdrawalRejected,
        "Withdrawal rejected, funds returned",
        withdrawal.amount,
        withdrawal.id,
    );

    Ok(())
}

fn transition_pending(
    env: &Env,
    withdrawal_id: u64,
    to: WithdrawalStatus,
) -> Result<Withdrawal, ContractError> {
    let affected =
        storage::transition_withdrawal(env, withdrawal_id, WithdrawalStatus::Pending, to)?;
    if affected == 0 {
        return Err(ContractError::WithdrawalNotPending);
    }
    storage::load_withdrawal(env, withdrawal_id).ok_or(ContractError::WithdrawalNotFound)
}
