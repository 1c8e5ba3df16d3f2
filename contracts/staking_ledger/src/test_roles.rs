extern crate std;

use soroban_sdk::{testutils::Address as _, Address, String};
use stakeflow_common::Role;

use crate::test::{assert_contract_err, default_plan, fund, register, setup};
use crate::ContractError;

#[test]
fn test_initialize_assigns_admin_and_keeper() {
    let (_env, client, admin, keeper) = setup();

    assert_eq!(client.get_role(&admin), Some(Role::Admin));
    assert_eq!(client.get_role(&keeper), Some(Role::Keeper));

    let holders = client.list_role_holders();
    assert_eq!(holders.len(), 2);
    assert!(holders.contains(&admin));
    assert!(holders.contains(&keeper));
}

#[test]
fn test_grant_and_revoke_role() {
    let (env, client, admin, _keeper) = setup();
    let worker = Address::generate(&env);

    client.grant_role(&admin, &worker, &Role::Worker);
    assert_eq!(client.get_role(&worker), Some(Role::Worker));

    // Re-granting replaces the previous role.
    client.grant_role(&admin, &worker, &Role::Keeper);
    assert_eq!(client.get_role(&worker), Some(Role::Keeper));
    assert_eq!(client.list_role_holders().len(), 3);

    client.revoke_role(&admin, &worker);
    assert_eq!(client.get_role(&worker), None);
    assert!(!client.list_role_holders().contains(&worker));
}

#[test]
fn test_admin_cannot_revoke_itself() {
    let (_env, client, admin, _keeper) = setup();

    assert_contract_err(
        client.try_revoke_role(&admin, &admin),
        ContractError::InvalidInput,
    );
    assert_eq!(client.get_role(&admin), Some(Role::Admin));
}

#[test]
fn test_admin_cannot_regrant_itself() {
    let (_env, client, admin, _keeper) = setup();

    assert_contract_err(
        client.try_grant_role(&admin, &admin, &Role::Keeper),
        ContractError::InvalidInput,
    );
    assert_eq!(client.get_role(&admin), Some(Role::Admin));

    // Admin capabilities are intact.
    let settings = client.get_settings();
    client.update_settings(&admin, &settings);
}

#[test]
fn test_non_admin_cannot_manage_roles() {
    let (env, client, _admin, keeper) = setup();
    let target = Address::generate(&env);

    assert_contract_err(
        client.try_grant_role(&keeper, &target, &Role::Admin),
        ContractError::Unauthorized,
    );
    assert_contract_err(
        client.try_revoke_role(&keeper, &keeper),
        ContractError::Unauthorized,
    );
    assert_eq!(client.get_role(&target), None);
}

#[test]
fn test_keeper_cannot_manage_plans_or_balances() {
    let (env, client, _admin, keeper) = setup();
    let user = register(&env, &client, None);

    assert_contract_err(
        client.try_create_plan(
            &keeper,
            &String::from_str(&env, "Rogue"),
            &100,
            &3,
            &100,
            &1_000,
        ),
        ContractError::Unauthorized,
    );
    assert_contract_err(
        client.try_adjust_balance(&keeper, &user, &1_000),
        ContractError::Unauthorized,
    );
    let settings = client.get_settings();
    assert_contract_err(
        client.try_update_settings(&keeper, &settings),
        ContractError::Unauthorized,
    );
}

#[test]
fn test_worker_reviews_withdrawals_but_cannot_run_payouts() {
    let (env, client, admin, keeper) = setup();
    let worker = Address::generate(&env);
    client.grant_role(&admin, &worker, &Role::Worker);

    let user = register(&env, &client, None);
    fund(&env, &client, &worker, &user, 10_000);

    let id = client.request_withdrawal(
        &user,
        &4_000,
        &soroban_sdk::symbol_short!("USDT"),
        &String::from_str(&env, "TXYZ"),
    );
    client.reject_withdrawal(&worker, &id);
    assert_eq!(client.get_balance(&user), 10_000);

    assert_contract_err(
        client.try_process_payouts(&worker),
        ContractError::Unauthorized,
    );

    // The keeper settles deposits but does not review withdrawals.
    let id = client.request_withdrawal(
        &user,
        &4_000,
        &soroban_sdk::symbol_short!("USDT"),
        &String::from_str(&env, "TXYZ"),
    );
    assert_contract_err(
        client.try_reject_withdrawal(&keeper, &id),
        ContractError::Unauthorized,
    );
}

#[test]
fn test_revoked_keeper_loses_payout_access() {
    let (env, client, admin, keeper) = setup();
    default_plan(&env, &client, &admin);

    client.process_payouts(&keeper);
    client.revoke_role(&admin, &keeper);
    assert_contract_err(
        client.try_process_payouts(&keeper),
        ContractError::Unauthorized,
    );
}
