use soroban_sdk::{contracttype, Address, String, Symbol, Vec};

use crate::errors::ErrorCategory;

// ── Accounts ────────────────────────────────────────────────────────────────

/// A registered ledger user.
///
/// `balance` is a cache of the signed sum of the user's transactions and is
/// only ever moved by the storage layer's checked increment / decrement.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserAccount {
    pub address: Address,
    pub referrer: Option<Address>,
    pub balance: i128,
    pub registered_at: u64,
}

// ── Plans & stakes ──────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakingPlan {
    pub id: u32,
    pub name: String,
    /// Daily return in basis points of a percent (`100` = 1%/day).
    pub daily_roi_bps: u32,
    pub duration_days: u32,
    pub min_amount: i128,
    pub max_amount: i128,
    pub active: bool,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum StakeStatus {
    Active = 0,
    Completed = 1,
    Cancelled = 2,
}

/// One staking position.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Stake {
    pub id: u64,
    pub user: Address,
    pub plan_id: u32,
    pub amount: i128,
    pub daily_roi_bps: u32,
    pub total_roi_bps: u32,
    pub expected_return: i128,
    pub total_earned: i128,
    pub status: StakeStatus,
    pub start_date: u64,
    pub end_date: u64,
    /// `None` once no further payouts are due.
    pub next_process_at: Option<u64>,
    pub last_processed: Option<u64>,
}

impl Stake {
    pub fn is_due(&self, now: u64) -> bool {
        self.status == StakeStatus::Active
            && matches!(self.next_process_at, Some(at) if at <= now)
    }
}

/// Append-only record of one applied payout cycle.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakePayment {
    pub stake_id: u64,
    /// 1-based cycle number.
    pub cycle: u32,
    pub amount: i128,
    pub paid_at: u64,
}

// ── Ledger lines ────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum TransactionKind {
    Deposit = 0,
    Withdrawal = 1,
    Staking = 2,
    StakingReturn = 3,
    ReferralBonus = 4,
    AdminCredit = 5,
    AdminDebit = 6,
    Refund = 7,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum TransactionStatus {
    Pending = 0,
    Completed = 1,
    Failed = 2,
    Rejected = 3,
}

/// Append-only ledger line. Credits are positive, debits negative.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transaction {
    pub id: u64,
    pub user: Address,
    pub kind: TransactionKind,
    pub amount: i128,
    pub status: TransactionStatus,
    pub reference_id: u64,
    pub created_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReferralEarning {
    pub id: u64,
    pub referrer: Address,
    pub referred: Address,
    pub stake_id: u64,
    pub amount: i128,
    pub created_at: u64,
}

// ── External payments ───────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum DepositStatus {
    Pending = 0,
    Confirmed = 1,
    Failed = 2,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deposit {
    pub id: u64,
    pub user: Address,
    pub amount: i128,
    pub currency: Symbol,
    /// Gateway-side payment id; unique across deposits.
    pub payment_id: String,
    pub status: DepositStatus,
    pub transaction_id: Option<u64>,
    pub created_at: u64,
    pub settled_at: Option<u64>,
}

/// Payment status as reported by the deposit gateway.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum PaymentStatus {
    Waiting = 0,
    Confirming = 1,
    Confirmed = 2,
    Sending = 3,
    PartiallyPaid = 4,
    Finished = 5,
    Failed = 6,
    Refunded = 7,
    Expired = 8,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum WithdrawalStatus {
    Pending = 0,
    Completed = 1,
    Rejected = 2,
    Failed = 3,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Withdrawal {
    pub id: u64,
    pub user: Address,
    pub amount: i128,
    pub currency: Symbol,
    pub address: String,
    pub status: WithdrawalStatus,
    /// The debit line written when the withdrawal was requested.
    pub transaction_id: u64,
    pub tx_hash: Option<String>,
    pub created_at: u64,
    pub settled_at: Option<u64>,
}

// ── Configuration ───────────────────────────────────────────────────────────

/// Mutable site settings.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    /// Referral bonus in basis points of the staked amount. `None`, or a
    /// value above 100%, falls back to the default 5%.
    pub referral_bonus_bps: Option<u32>,
    pub min_withdrawal: i128,
    /// Upper bound on stakes paid by one `process_payouts` call, at most
    /// [`crate::settings::MAX_PAYOUTS_PER_RUN`].
    pub max_payouts_per_run: u32,
}

// ── Payout reporting ────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PayoutFailure {
    pub stake_id: u64,
    pub code: u32,
    pub category: ErrorCategory,
}

/// Result of one payout run.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PayoutSummary {
    /// Due stakes picked up by this run.
    pub total: u32,
    pub processed: u32,
    pub completed: u32,
    pub errors: Vec<PayoutFailure>,
}
