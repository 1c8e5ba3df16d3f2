extern crate std;

use soroban_sdk::{symbol_short, testutils::Address as _, Address, String};

use crate::test::{
    assert_contract_err, fund, ledger_sum, register, setup, unique_payment_id,
};
use crate::{
    ContractError, DepositStatus, PaymentStatus, TransactionKind, TransactionStatus,
    WithdrawalStatus,
};

// ── Deposits ──────────────────────────────────────────────────────────────────

#[test]
fn test_confirm_deposit_credits_once() {
    let (env, client, _admin, keeper) = setup();
    let user = register(&env, &client, None);
    let payment_id = unique_payment_id(&env);

    let id = client.create_deposit(&keeper, &user, &25_000, &symbol_short!("USDT"), &payment_id);
    assert_eq!(client.get_deposit(&id).status, DepositStatus::Pending);
    assert_eq!(client.get_balance(&user), 0);

    assert!(client.confirm_deposit(&keeper, &id));
    // Second delivery of the same confirmation.
    assert!(!client.confirm_deposit(&keeper, &id));

    let deposit = client.get_deposit(&id);
    assert_eq!(deposit.status, DepositStatus::Confirmed);
    assert_eq!(client.get_balance(&user), 25_000);

    let txs = client.get_user_transactions(&user);
    assert_eq!(txs.len(), 1);
    let tx = txs.get(0).unwrap();
    assert_eq!(tx.kind, TransactionKind::Deposit);
    assert_eq!(tx.status, TransactionStatus::Completed);
    assert_eq!(tx.reference_id, id);
    assert_eq!(deposit.transaction_id, Some(tx.id));
}

#[test]
fn test_payment_status_mapping() {
    let (env, client, _admin, keeper) = setup();
    let user = register(&env, &client, None);
    let payment_id = unique_payment_id(&env);
    let id = client.create_deposit(&keeper, &user, &25_000, &symbol_short!("USDT"), &payment_id);

    for status in [
        PaymentStatus::Waiting,
        PaymentStatus::Confirming,
        PaymentStatus::Sending,
        PaymentStatus::PartiallyPaid,
    ] {
        assert!(!client.apply_payment_status(&keeper, &payment_id, &status));
        assert_eq!(client.get_deposit(&id).status, DepositStatus::Pending);
    }

    assert!(client.apply_payment_status(&keeper, &payment_id, &PaymentStatus::Finished));
    assert!(!client.apply_payment_status(&keeper, &payment_id, &PaymentStatus::Finished));
    assert!(!client.apply_payment_status(&keeper, &payment_id, &PaymentStatus::Expired));

    assert_eq!(client.get_deposit(&id).status, DepositStatus::Confirmed);
    assert_eq!(client.get_balance(&user), 25_000);
}

#[test]
fn test_failed_deposit_is_never_credited() {
    let (env, client, _admin, keeper) = setup();
    let user = register(&env, &client, None);
    let payment_id = unique_payment_id(&env);
    let id = client.create_deposit(&keeper, &user, &25_000, &symbol_short!("USDT"), &payment_id);

    assert!(client.apply_payment_status(&keeper, &payment_id, &PaymentStatus::Expired));
    assert!(!client.confirm_deposit(&keeper, &id));
    assert!(!client.fail_deposit(&keeper, &id));

    assert_eq!(client.get_deposit(&id).status, DepositStatus::Failed);
    assert_eq!(client.get_balance(&user), 0);
    assert_eq!(client.get_user_transactions(&user).len(), 0);
}

#[test]
fn test_deposit_validation() {
    let (env, client, _admin, keeper) = setup();
    let user = register(&env, &client, None);
    let payment_id = unique_payment_id(&env);

    assert_contract_err(
        client.try_create_deposit(&keeper, &user, &0, &symbol_short!("USDT"), &payment_id),
        ContractError::InvalidInput,
    );
    assert_contract_err(
        client.try_create_deposit(
            &keeper,
            &user,
            &1_000,
            &symbol_short!("USDT"),
            &String::from_str(&env, ""),
        ),
        ContractError::InvalidInput,
    );

    let ghost = Address::generate(&env);
    assert_contract_err(
        client.try_create_deposit(&keeper, &ghost, &1_000, &symbol_short!("USDT"), &payment_id),
        ContractError::UserNotFound,
    );

    client.create_deposit(&keeper, &user, &1_000, &symbol_short!("USDT"), &payment_id);
    assert_contract_err(
        client.try_create_deposit(&keeper, &user, &1_000, &symbol_short!("USDT"), &payment_id),
        ContractError::DuplicatePayment,
    );

    assert_contract_err(
        client.try_confirm_deposit(&keeper, &999),
        ContractError::DepositNotFound,
    );
    assert_contract_err(
        client.try_apply_payment_status(
            &keeper,
            &unique_payment_id(&env),
            &PaymentStatus::Finished,
        ),
        ContractError::DepositNotFound,
    );
}

#[test]
fn test_outsider_cannot_confirm_deposit() {
    let (env, client, _admin, keeper) = setup();
    let user = register(&env, &client, None);
    let id = client.create_deposit(
        &keeper,
        &user,
        &1_000,
        &symbol_short!("USDT"),
        &unique_payment_id(&env),
    );

    assert_contract_err(
        client.try_confirm_deposit(&user, &id),
        ContractError::Unauthorized,
    );
    assert_eq!(client.get_balance(&user), 0);
}

#[test]
fn test_user_cannot_register_own_deposit() {
    let (env, client, _admin, keeper) = setup();
    let user = register(&env, &client, None);
    let payment_id = unique_payment_id(&env);

    assert_contract_err(
        client.try_create_deposit(
            &user,
            &user,
            &100_000_000,
            &symbol_short!("USDT"),
            &payment_id,
        ),
        ContractError::Unauthorized,
    );
    assert_eq!(client.get_user_deposits(&user).len(), 0);

    // Nothing was recorded, so a later "finished" webhook has nothing to credit.
    assert_contract_err(
        client.try_apply_payment_status(&keeper, &payment_id, &PaymentStatus::Finished),
        ContractError::DepositNotFound,
    );
    assert_eq!(client.get_balance(&user), 0);
}

// ── Withdrawals ───────────────────────────────────────────────────────────────

fn request(
    env: &soroban_sdk::Env,
    client: &crate::StakingLedgerContractClient,
    user: &Address,
    amount: i128,
) -> u64 {
    client.request_withdrawal(
        user,
        &amount,
        &symbol_short!("USDT"),
        &String::from_str(env, "TQn9Y2khEsLJW1ChVWFMSMeRDow5KcbLSE"),
    )
}

#[test]
fn test_rejected_withdrawal_is_refunded() {
    let (env, client, admin, keeper) = setup();
    let user = register(&env, &client, None);
    fund(&env, &client, &keeper, &user, 10_000);

    let id = request(&env, &client, &user, 4_000);
    assert_eq!(client.get_balance(&user), 6_000);
    let withdrawal = client.get_withdrawal(&id);
    assert_eq!(withdrawal.status, WithdrawalStatus::Pending);
    assert_eq!(
        client.get_transaction(&withdrawal.transaction_id).status,
        TransactionStatus::Pending
    );

    client.reject_withdrawal(&admin, &id);
    assert_eq!(client.get_balance(&user), 10_000);
    assert_eq!(client.get_withdrawal(&id).status, WithdrawalStatus::Rejected);
    assert_eq!(
        client.get_transaction(&withdrawal.transaction_id).status,
        TransactionStatus::Rejected
    );

    let refund = client.get_user_transactions(&user).last().unwrap();
    assert_eq!(refund.kind, TransactionKind::Refund);
    assert_eq!(refund.amount, 4_000);
    assert_eq!(refund.reference_id, id);
    assert_eq!(ledger_sum(&client, &user), 10_000);

    assert_contract_err(
        client.try_reject_withdrawal(&admin, &id),
        ContractError::WithdrawalNotPending,
    );
    assert_eq!(client.get_balance(&user), 10_000);
}

#[test]
fn test_approved_withdrawal_records_hash() {
    let (env, client, admin, keeper) = setup();
    let user = register(&env, &client, None);
    fund(&env, &client, &keeper, &user, 10_000);

    let id = request(&env, &client, &user, 4_000);
    let hash = String::from_str(&env, "0xabc123");
    client.approve_withdrawal(&admin, &id, &hash);

    let withdrawal = client.get_withdrawal(&id);
    assert_eq!(withdrawal.status, WithdrawalStatus::Completed);
    assert_eq!(withdrawal.tx_hash, Some(hash.clone()));
    assert_eq!(
        client.get_transaction(&withdrawal.transaction_id).status,
        TransactionStatus::Completed
    );
    assert_eq!(client.get_balance(&user), 6_000);
    assert_eq!(ledger_sum(&client, &user), 6_000);

    assert_contract_err(
        client.try_approve_withdrawal(&admin, &id, &hash),
        ContractError::WithdrawalNotPending,
    );
    assert_contract_err(
        client.try_reject_withdrawal(&admin, &id),
        ContractError::WithdrawalNotPending,
    );
    assert_eq!(client.get_balance(&user), 6_000);
}

#[test]
fn test_failed_withdrawal_keeps_debit() {
    let (env, client, admin, keeper) = setup();
    let user = register(&env, &client, None);
    fund(&env, &client, &keeper, &user, 10_000);

    let id = request(&env, &client, &user, 4_000);
    client.fail_withdrawal(&admin, &id);

    let withdrawal = client.get_withdrawal(&id);
    assert_eq!(withdrawal.status, WithdrawalStatus::Failed);
    assert_eq!(
        client.get_transaction(&withdrawal.transaction_id).status,
        TransactionStatus::Failed
    );
    assert_eq!(client.get_balance(&user), 6_000);
    // The failed line still counts toward the balance.
    assert_eq!(ledger_sum(&client, &user), 6_000);
}

#[test]
fn test_withdrawal_request_validation() {
    let (env, client, admin, keeper) = setup();
    let user = register(&env, &client, None);
    fund(&env, &client, &keeper, &user, 10_000);

    assert_contract_err(
        client.try_request_withdrawal(
            &user,
            &999,
            &symbol_short!("USDT"),
            &String::from_str(&env, "TXYZ"),
        ),
        ContractError::BelowMinimumWithdrawal,
    );
    assert_contract_err(
        client.try_request_withdrawal(
            &user,
            &10_001,
            &symbol_short!("USDT"),
            &String::from_str(&env, "TXYZ"),
        ),
        ContractError::InsufficientBalance,
    );
    assert_contract_err(
        client.try_request_withdrawal(
            &user,
            &5_000,
            &symbol_short!("USDT"),
            &String::from_str(&env, ""),
        ),
        ContractError::InvalidInput,
    );
    assert_eq!(client.get_user_withdrawals(&user).len(), 0);
    assert_eq!(client.get_balance(&user), 10_000);

    let id = request(&env, &client, &user, 4_000);
    assert_contract_err(
        client.try_approve_withdrawal(&admin, &id, &String::from_str(&env, "")),
        ContractError::InvalidInput,
    );
    assert_contract_err(
        client.try_approve_withdrawal(&admin, &999, &String::from_str(&env, "0x1")),
        ContractError::WithdrawalNotFound,
    );
}

#[test]
fn test_balance_matches_ledger_after_mixed_flows() {
    let (env, client, admin, keeper) = setup();
    let user = register(&env, &client, None);
    fund(&env, &client, &keeper, &user, 50_000);
    fund(&env, &client, &keeper, &user, 7_500);

    let a = request(&env, &client, &user, 5_000);
    let b = request(&env, &client, &user, 6_000);
    let c = request(&env, &client, &user, 2_500);
    client.approve_withdrawal(&admin, &a, &String::from_str(&env, "0xa"));
    client.reject_withdrawal(&admin, &b);
    client.fail_withdrawal(&admin, &c);
    client.adjust_balance(&admin, &user, &-1_000);

    assert_eq!(client.get_balance(&user), 57_500 - 5_000 - 2_500 - 1_000);
    assert_eq!(ledger_sum(&client, &user), client.get_balance(&user));
    assert_eq!(client.get_user_withdrawals(&user).len(), 3);
    assert_eq!(client.get_user_deposits(&user).len(), 2);
}

#[test]
fn test_transaction_history_pages() {
    let (env, client, _admin, keeper) = setup();
    let user = register(&env, &client, None);
    for amount in [1_000i128, 2_000, 3_000, 4_000, 5_000] {
        fund(&env, &client, &keeper, &user, amount);
    }
    assert_eq!(client.get_user_transaction_count(&user), 5);

    let page = client.get_user_transactions_page(&user, &1, &2);
    assert_eq!(page.len(), 2);
    assert_eq!(page.get(0).unwrap().amount, 2_000);
    assert_eq!(page.get(1).unwrap().amount, 3_000);

    let tail = client.get_user_transactions_page(&user, &4, &10);
    assert_eq!(tail.len(), 1);
    assert_eq!(tail.get(0).unwrap().amount, 5_000);
    assert_eq!(client.get_user_transactions_page(&user, &5, &10).len(), 0);
    assert_eq!(client.get_user_transactions(&user).len(), 5);
}
