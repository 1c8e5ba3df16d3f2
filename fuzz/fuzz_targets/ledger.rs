#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Ledger as _},
    Address, Env, String,
};
use staking_ledger::{PaymentStatus, StakingLedgerContract, StakingLedgerContractClient};

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Deposit { user: u8, amount: i64, status: u8 },
    Stake { user: u8, amount: i64 },
    Withdraw { user: u8, amount: i64 },
    Review { user: u8, decision: u8 },
    Adjust { user: u8, delta: i64 },
    Advance { seconds: u32 },
    Payout,
}

const STATUSES: [PaymentStatus; 9] = [
    PaymentStatus::Waiting,
    PaymentStatus::Confirming,
    PaymentStatus::Confirmed,
    PaymentStatus::Sending,
    PaymentStatus::PartiallyPaid,
    PaymentStatus::Finished,
    PaymentStatus::Failed,
    PaymentStatus::Refunded,
    PaymentStatus::Expired,
];

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(1_700_000_000);

    let contract_id = env.register(StakingLedgerContract, ());
    let client = StakingLedgerContractClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    let keeper = Address::generate(&env);
    client.initialize(&admin, &keeper);
    let plan = client.create_plan(
        &admin,
        &String::from_str(&env, "Fuzz"),
        &250,
        &3,
        &100,
        &i64::MAX.into(),
    );

    let head = Address::generate(&env);
    client.register_user(&head, &None);
    let mut users = vec![head.clone()];
    for _ in 0..3 {
        let user = Address::generate(&env);
        client.register_user(&user, &Some(head.clone()));
        users.push(user);
    }

    // Amounts are widened from i64 so sums stay far from the i128 ceiling
    // and every failure is a contract error, never a panic.
    for (i, action) in actions.into_iter().enumerate() {
        match action {
            FuzzAction::Deposit { user, amount, status } => {
                let user = &users[user as usize % users.len()];
                let payment_id = String::from_str(&env, &format!("fz-{i}"));
                if client
                    .try_create_deposit(
                        &keeper,
                        user,
                        &amount.into(),
                        &symbol_short!("USDT"),
                        &payment_id,
                    )
                    .is_ok()
                {
                    let status = STATUSES[status as usize % STATUSES.len()];
                    let _ = client.try_apply_payment_status(&keeper, &payment_id, &status);
                }
            }
            FuzzAction::Stake { user, amount } => {
                let user = &users[user as usize % users.len()];
                let _ = client.try_stake(user, &plan, &amount.into());
            }
            FuzzAction::Withdraw { user, amount } => {
                let user = &users[user as usize % users.len()];
                let _ = client.try_request_withdrawal(
                    user,
                    &amount.into(),
                    &symbol_short!("USDT"),
                    &String::from_str(&env, "TXYZ"),
                );
            }
            FuzzAction::Review { user, decision } => {
                let user = &users[user as usize % users.len()];
                for w in client.get_user_withdrawals(user).iter() {
                    let _ = match decision % 3 {
                        0 => client.try_approve_withdrawal(
                            &admin,
                            &w.id,
                            &String::from_str(&env, "0xf"),
                        ),
                        1 => client.try_reject_withdrawal(&admin, &w.id),
                        _ => client.try_fail_withdrawal(&admin, &w.id),
                    };
                }
            }
            FuzzAction::Adjust { user, delta } => {
                let user = &users[user as usize % users.len()];
                let _ = client.try_adjust_balance(&admin, user, &delta.into());
            }
            FuzzAction::Advance { seconds } => {
                let now = env.ledger().timestamp();
                env.ledger().set_timestamp(now + seconds as u64);
            }
            FuzzAction::Payout => {
                let _ = client.try_process_payouts(&keeper);
            }
        }

        for user in &users {
            let balance = client.get_balance(user);
            let ledger: i128 = client
                .get_user_transactions(user)
                .iter()
                .map(|tx| tx.amount)
                .sum();
            assert!(balance >= 0, "negative balance");
            assert_eq!(balance, ledger, "balance drifted from ledger");
        }
    }
});
