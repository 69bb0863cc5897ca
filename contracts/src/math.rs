//! Share conversion and basis-point arithmetic.
//!
//! Conversions add one virtual share and one virtual asset to both sides of
//! the ratio, so a donation to an empty vault cannot inflate the price of the
//! first depositor's shares:
//!
//! - shares = assets * (total_shares + 1) / (total_assets + 1)
//! - assets = shares * (total_assets + 1) / (total_shares + 1)

use odra::casper_types::{U256, U512};
use crate::errors::VaultError;

/// Basis points scale (100% = 10000 bps)
pub const BPS_SCALE: u32 = 10_000;

/// Precision scale for price reporting (1e18)
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Virtual offset applied to both sides of the share price.
pub const VIRTUAL_OFFSET: u64 = 1;

/// Rounding direction for integer division.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Rounding {
    Down,
    Up,
}

/// `a * b / denominator` with the requested rounding.
pub fn mul_div(a: U256, b: U256, denominator: U256, rounding: Rounding) -> Result<U256, VaultError> {
    if denominator.is_zero() {
        return Err(VaultError::MathOverflow);
    }
    let product = a.checked_mul(b).ok_or(VaultError::MathOverflow)?;
    let quotient = product / denominator;
    match rounding {
        Rounding::Down => Ok(quotient),
        Rounding::Up => {
            if (product % denominator).is_zero() {
                Ok(quotient)
            } else {
                quotient.checked_add(U256::one()).ok_or(VaultError::MathOverflow)
            }
        }
    }
}

/// Shares worth `assets` at the current ratio.
pub fn assets_to_shares(
    assets: U256,
    total_assets: U256,
    total_shares: U256,
    rounding: Rounding,
) -> Result<U256, VaultError> {
    let offset = U256::from(VIRTUAL_OFFSET);
    mul_div(assets, total_shares + offset, total_assets + offset, rounding)
}

/// Assets backing `shares` at the current ratio.
pub fn shares_to_assets(
    shares: U256,
    total_assets: U256,
    total_shares: U256,
    rounding: Rounding,
) -> Result<U256, VaultError> {
    let offset = U256::from(VIRTUAL_OFFSET);
    mul_div(shares, total_assets + offset, total_shares + offset, rounding)
}

/// Assets per share scaled by `PRECISION`.
pub fn price_per_share(total_assets: U256, total_shares: U256) -> U256 {
    let offset = U256::from(VIRTUAL_OFFSET);
    mul_div(U256::from(PRECISION), total_assets + offset, total_shares + offset, Rounding::Down)
        .unwrap_or(U256::zero())
}

/// `amount * bps / 10000`, rounded down.
pub fn bps_of(amount: U256, bps: u32) -> U256 {
    mul_div(amount, U256::from(bps), U256::from(BPS_SCALE), Rounding::Down).unwrap_or(U256::zero())
}

/// Smallest acceptable return for `requested` under a slippage tolerance.
pub fn min_out(requested: U256, slippage_bps: u32) -> U256 {
    let kept = BPS_SCALE.saturating_sub(slippage_bps);
    bps_of(requested, kept)
}

/// Whether a basis-point value lies in 0..=10000.
pub fn is_valid_bps(bps: u32) -> bool {
    bps <= BPS_SCALE
}

/// Native motes to token units. CSPR supply fits well inside 256 bits, so
/// only the lower limbs are kept.
pub fn u512_to_u256(value: U512) -> U256 {
    let mut bytes = [0u8; 64];
    value.to_little_endian(&mut bytes);
    U256::from_little_endian(&bytes[..32])
}

/// Token units to native motes.
pub fn u256_to_u512(value: U256) -> U512 {
    let mut bytes = [0u8; 32];
    value.to_little_endian(&mut bytes);
    U512::from_little_endian(&bytes)
}
