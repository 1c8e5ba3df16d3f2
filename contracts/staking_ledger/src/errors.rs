use soroban_sdk::{contracterror, contracttype};

/// Coarse classification of [`ContractError`], reported alongside each
/// failed payout so operators can tell bad data from arithmetic limits.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorCategory {
    /// Bad input: amounts, plan bounds, malformed settings.
    Validation = 1,
    /// Caller lacks the capability for the operation.
    Authorization = 2,
    /// Referenced user, plan, stake or payment record does not exist.
    NotFound = 3,
    /// The record is not in a state that allows the transition, or the
    /// balance cannot cover the debit.
    StateConflict = 4,
    /// Checked arithmetic overflowed.
    Arithmetic = 5,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidInput = 4,
    UserNotFound = 5,
    UserAlreadyRegistered = 6,
    InvalidReferrer = 7,
    PlanNotFound = 8,
    PlanInactive = 9,
    /// Stake amount is below the plan's `min_amount`.
    AmountBelowMinimum = 10,
    /// Stake amount is above the plan's `max_amount`.
    AmountAboveMaximum = 11,
    /// Balance re-read inside the invocation cannot cover the debit.
    InsufficientBalance = 12,
    StakeNotFound = 13,
    StakeNotActive = 14,
    DepositNotFound = 15,
    /// A deposit with the same external payment id already exists.
    DuplicatePayment = 16,
    WithdrawalNotFound = 17,
    WithdrawalNotPending = 18,
    /// Withdrawal amount is below `Settings::min_withdrawal`.
    BelowMinimumWithdrawal = 19,
    TransactionNotFound = 20,
    Overflow = 21,
}

impl ContractError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ContractError::InvalidInput
            | ContractError::InvalidReferrer
            | ContractError::PlanInactive
            | ContractError::AmountBelowMinimum
            | ContractError::AmountAboveMaximum
            | ContractError::BelowMinimumWithdrawal => ErrorCategory::Validation,

            ContractError::Unauthorized => ErrorCategory::Authorization,

            ContractError::UserNotFound
            | ContractError::PlanNotFound
            | ContractError::StakeNotFound
            | ContractError::DepositNotFound
            | ContractError::WithdrawalNotFound
            | ContractError::TransactionNotFound => ErrorCategory::NotFound,

            ContractError::NotInitialized
            | ContractError::AlreadyInitialized
            | ContractError::UserAlreadyRegistered
            | ContractError::InsufficientBalance
            | ContractError::StakeNotActive
            | ContractError::DuplicatePayment
            | ContractError::WithdrawalNotPending => ErrorCategory::StateConflict,

            ContractError::Overflow => ErrorCategory::Arithmetic,
        }
    }
}
