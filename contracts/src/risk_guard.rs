//! Stateless cap validation consulted before capital-increasing operations.
//!
//! Every check fails closed: a breach returns a typed error and the caller
//! reverts before touching storage.
//!
//! Borrow, LTV and liquidation helpers only validate numbers; there is no
//! lending engine behind them.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::VaultError;
use crate::math::{bps_of, is_valid_bps, mul_div, Rounding, BPS_SCALE};

/// Guard values, replaced only by an admin.
#[odra::odra_type]
pub struct RiskConfig {
    /// Share of `max_deposit` open to deposits, in bps
    pub deposit_cap_bps: u32,
    /// Share of total assets that may be borrowed, in bps
    pub borrow_cap_bps: u32,
    /// Maximum loan-to-value, in bps
    pub ltv_bps: u32,
    /// Debt/collateral ratio at which a position becomes liquidatable, in bps
    pub liquidation_threshold_bps: u32,
    /// Penalty charged on liquidated debt, in bps
    pub liquidation_penalty_bps: u32,
    /// Absolute total-assets ceiling (0 = uncapped)
    pub max_deposit: U256,
    /// Absolute borrow ceiling (0 = uncapped)
    pub max_borrow: U256,
}

impl RiskConfig {
    /// Config that never rejects a deposit
    pub fn uncapped() -> Self {
        Self {
            deposit_cap_bps: BPS_SCALE,
            borrow_cap_bps: 0,
            ltv_bps: 0,
            liquidation_threshold_bps: 0,
            liquidation_penalty_bps: 0,
            max_deposit: U256::zero(),
            max_borrow: U256::zero(),
        }
    }
}

/// Reject out-of-range or inconsistent guard values.
pub fn validate_config(config: &RiskConfig) -> Result<(), VaultError> {
    let all_bps = [
        config.deposit_cap_bps,
        config.borrow_cap_bps,
        config.ltv_bps,
        config.liquidation_threshold_bps,
        config.liquidation_penalty_bps,
    ];
    if all_bps.iter().any(|bps| !is_valid_bps(*bps)) {
        return Err(VaultError::InvalidConfig);
    }
    // LTV must stay below the liquidation line or every loan opens liquidatable
    if config.liquidation_threshold_bps != 0 && config.ltv_bps > config.liquidation_threshold_bps {
        return Err(VaultError::InvalidConfig);
    }
    Ok(())
}

/// Total-assets ceiling, `None` when uncapped.
pub fn deposit_ceiling(config: &RiskConfig) -> Option<U256> {
    if config.max_deposit.is_zero() {
        None
    } else {
        Some(bps_of(config.max_deposit, config.deposit_cap_bps))
    }
}

/// Fail with `CapExceeded` if `assets` would lift total assets over the ceiling.
pub fn check_deposit(config: &RiskConfig, total_assets: U256, assets: U256) -> Result<(), VaultError> {
    let after = total_assets.checked_add(assets).ok_or(VaultError::MathOverflow)?;
    match deposit_ceiling(config) {
        Some(ceiling) if after > ceiling => Err(VaultError::CapExceeded),
        _ => Ok(()),
    }
}

/// Largest deposit the ceiling still admits.
pub fn max_depositable(config: &RiskConfig, total_assets: U256) -> U256 {
    match deposit_ceiling(config) {
        Some(ceiling) => ceiling.saturating_sub(total_assets),
        None => U256::MAX,
    }
}

/// Fail with `BorrowCapExceeded` if borrowing `amount` more breaks either cap.
pub fn check_borrow(
    config: &RiskConfig,
    total_assets: U256,
    total_borrowed: U256,
    amount: U256,
) -> Result<(), VaultError> {
    let after = total_borrowed.checked_add(amount).ok_or(VaultError::MathOverflow)?;
    if after > bps_of(total_assets, config.borrow_cap_bps) {
        return Err(VaultError::BorrowCapExceeded);
    }
    if !config.max_borrow.is_zero() && after > config.max_borrow {
        return Err(VaultError::BorrowCapExceeded);
    }
    Ok(())
}

/// Fail with `LtvExceeded` if `debt` is above the LTV limit for `collateral_value`.
pub fn check_ltv(config: &RiskConfig, collateral_value: U256, debt: U256) -> Result<(), VaultError> {
    let limit = mul_div(collateral_value, U256::from(config.ltv_bps), U256::from(BPS_SCALE), Rounding::Down)?;
    if debt > limit {
        return Err(VaultError::LtvExceeded);
    }
    Ok(())
}

/// Whether `debt` has crossed the liquidation threshold.
pub fn is_liquidatable(config: &RiskConfig, collateral_value: U256, debt: U256) -> bool {
    if debt.is_zero() {
        return false;
    }
    debt > bps_of(collateral_value, config.liquidation_threshold_bps)
}

/// Penalty owed when `debt` is liquidated.
pub fn liquidation_penalty(config: &RiskConfig, debt: U256) -> U256 {
    bps_of(debt, config.liquidation_penalty_bps)
}
