//! Yield accrual model for strategy adapters.
//!
//! Simple (non-compounding between harvests) accrual:
//! - yield = principal * rate_bps * elapsed / (BPS_SCALE * MILLIS_PER_YEAR)
//! - compounding happens when a harvest folds the yield into principal
//! - fixed-term positions stop accruing at maturity
//!
//! Block time is in milliseconds.

use odra::casper_types::U256;
use crate::math::BPS_SCALE;

/// Milliseconds in a year (365 days)
pub const MILLIS_PER_YEAR: u64 = 31_536_000_000;

/// Maximum supported strategy APR (100%)
pub const MAX_RATE_BPS: u32 = 10_000;

/// Yield accrued on `principal` between two block times.
///
/// Returns zero when no time has passed, the principal is empty or the rate
/// is zero. Overflow saturates to zero rather than reverting so that a stuck
/// accrual never blocks withdrawals.
pub fn accrue_yield(principal: U256, rate_bps: u32, from: u64, to: u64) -> U256 {
    if to <= from || principal.is_zero() || rate_bps == 0 {
        return U256::zero();
    }

    let elapsed = to - from;

    principal
        .checked_mul(U256::from(rate_bps))
        .and_then(|v| v.checked_mul(U256::from(elapsed)))
        .and_then(|v| v.checked_div(U256::from(BPS_SCALE)))
        .and_then(|v| v.checked_div(U256::from(MILLIS_PER_YEAR)))
        .unwrap_or(U256::zero())
}

/// End of the accrual window for a position that may have a maturity.
///
/// A maturity of zero means the position never matures.
pub fn accrual_end(now: u64, maturity: u64) -> u64 {
    if maturity == 0 {
        now
    } else {
        now.min(maturity)
    }
}

/// Whether a rate is within the supported range.
pub fn validate_rate(rate_bps: u32) -> bool {
    rate_bps <= MAX_RATE_BPS
}
