//! Fixed-point arithmetic for ledger amounts.
//!
//! Amounts are `i128` minor units (cents). Rates are basis points of a
//! percent, so `100` bps is `1%` and `10_000` bps is `100%`. Every result is
//! rounded to a whole cent at computation time, half away from zero, so
//! running totals accumulate exact cents.
//!
//! All helpers return `None` on overflow instead of panicking.

/// Basis points in 100%.
pub const BPS_DENOMINATOR: i128 = 10_000;

/// Seconds in one payout day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Divides `numerator` by a positive `denominator`, rounding half away from
/// zero.
pub fn div_round(numerator: i128, denominator: i128) -> Option<i128> {
    if denominator <= 0 {
        return None;
    }
    let half = denominator / 2;
    let biased = if numerator >= 0 {
        numerator.checked_add(half)?
    } else {
        numerator.checked_sub(half)?
    };
    biased.checked_div(denominator)
}

/// `amount * bps / 10_000`, rounded to the cent.
pub fn apply_bps(amount: i128, bps: u32) -> Option<i128> {
    div_round(amount.checked_mul(bps as i128)?, BPS_DENOMINATOR)
}

/// One day's profit on `amount` at `daily_roi_bps`.
pub fn daily_profit(amount: i128, daily_roi_bps: u32) -> Option<i128> {
    apply_bps(amount, daily_roi_bps)
}

/// Total ROI over the whole term, in basis points.
pub fn total_roi_bps(daily_roi_bps: u32, duration_days: u32) -> Option<u32> {
    daily_roi_bps.checked_mul(duration_days)
}

/// Principal plus the profit of the whole term.
///
/// The term profit is computed from the exact product and rounded once, so
/// it can differ by a cent from `duration_days * daily_profit`.
pub fn expected_return(amount: i128, daily_roi_bps: u32, duration_days: u32) -> Option<i128> {
    let scaled = amount
        .checked_mul(daily_roi_bps as i128)?
        .checked_mul(duration_days as i128)?;
    amount.checked_add(div_round(scaled, BPS_DENOMINATOR)?)
}

/// Length of `days` in seconds.
pub fn days_to_seconds(days: u32) -> Option<u64> {
    (days as u64).checked_mul(SECONDS_PER_DAY)
}
