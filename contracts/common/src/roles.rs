use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol, Vec};

// ── Storage Keys ─────────────────────────────────────────────────────────────

const ROLE_PREFIX: Symbol = symbol_short!("ROLE");
const ROLE_LIST: Symbol = symbol_short!("ROLE_LST");

const TTL_THRESHOLD: u32 = 518_400;
const TTL_EXTEND_TO: u32 = 3_110_400;

// ── Roles & Capabilities ─────────────────────────────────────────────────────

/// Staff roles recognised by the ledger.
///
/// - `Admin`  – Full control: plans, settings, balance adjustments, roles,
///              withdrawal review and payout runs.
/// - `Worker` – Back-office staff: settles deposits and reviews withdrawals.
/// - `Keeper` – The scheduler identity: runs payouts and relays payment
///              gateway status updates.
///
/// Ordinary users hold no role at all.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Role {
    Keeper = 1,
    Worker = 2,
    Admin = 3,
}

/// Something a caller may be allowed to do.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Capability {
    RunPayouts = 1,
    SettleDeposits = 2,
    ReviewWithdrawals = 3,
    ManagePlans = 4,
    ManageSettings = 5,
    AdjustBalances = 6,
    ManageRoles = 7,
}

impl Role {
    /// Pure authorization predicate: does this role grant `capability`?
    pub fn permits(&self, capability: &Capability) -> bool {
        match self {
            Role::Admin => true,
            Role::Worker => matches!(
                capability,
                Capability::SettleDeposits | Capability::ReviewWithdrawals
            ),
            Role::Keeper => matches!(
                capability,
                Capability::RunPayouts | Capability::SettleDeposits
            ),
        }
    }
}

// ── Storage Helpers ──────────────────────────────────────────────────────────

fn role_key(holder: &Address) -> (Symbol, Address) {
    (ROLE_PREFIX, holder.clone())
}

fn extend_ttl(env: &Env, key: &(Symbol, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Core Functions ───────────────────────────────────────────────────────────

/// Assigns `role` to `holder`, replacing any previous role.
/// Callers must check authorization first.
pub fn set_role(env: &Env, holder: &Address, role: Role) {
    let key = role_key(holder);
    env.storage().persistent().set(&key, &role);
    extend_ttl(env, &key);
    track_holder(env, holder);
}

/// Retrieves the role held by `holder`, if any.
pub fn get_role(env: &Env, holder: &Address) -> Option<Role> {
    let key = role_key(holder);
    let role: Option<Role> = env.storage().persistent().get(&key);
    if role.is_some() {
        extend_ttl(env, &key);
    }
    role
}

/// Removes whatever role `holder` has.
pub fn remove_role(env: &Env, holder: &Address) {
    env.storage().persistent().remove(&role_key(holder));
    untrack_holder(env, holder);
}

/// Returns `true` when `caller` holds a role that grants `capability`.
pub fn has_capability(env: &Env, caller: &Address, capability: &Capability) -> bool {
    match get_role(env, caller) {
        Some(role) => role.permits(capability),
        None => false,
    }
}

// ── Holder Registry ──────────────────────────────────────────────────────────

/// Returns every address currently holding a role.
pub fn list_holders(env: &Env) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&ROLE_LIST)
        .unwrap_or(Vec::new(env))
}

fn track_holder(env: &Env, holder: &Address) {
    let mut holders = list_holders(env);
    if !holders.iter().any(|h| h == *holder) {
        holders.push_back(holder.clone());
        env.storage().persistent().set(&ROLE_LIST, &holders);
    }
}

fn untrack_holder(env: &Env, holder: &Address) {
    let holders = list_holders(env);
    let mut kept = Vec::new(env);
    for h in holders.iter() {
        if h != *holder {
            kept.push_back(h);
        }
    }
    env.storage().persistent().set(&ROLE_LIST, &kept);
}
