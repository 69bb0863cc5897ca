//! Strategy Adapter Contract
//!
//! Custodies the principal a single vault invests and simulates the venue the
//! principal is deployed into. The variant is fixed at init:
//!
//! - MoneyMarket: APR accrual, compounded into principal on every harvest
//! - FixedTerm: APR accrual until maturity, early-exit penalty before it
//! - Manual: no yield; losses can still be reported by the operator
//!
//! Accrued yield is folded into `invested` at harvest, net of the performance
//! fee, which the adapter keeps in `accrued_fees` for the operator. Harvest
//! moves no tokens; the vault divests if it needs cash.
//!
//! Venue rewards are modeled as asset tokens sent to the adapter by the
//! operator. Available liquidity is whatever the adapter holds beyond the
//! accrued fees, optionally capped.

use odra::prelude::*;
use odra::ContractRef;
use odra::casper_types::U256;
use crate::errors::VaultError;
use crate::events::{
    Divested, EmergencyExited, FeesCollected, Invested, LossReported, Rearmed, YieldRealized,
};
use crate::interest::{accrual_end, accrue_yield, validate_rate};
use crate::interfaces::AssetTokenContractRef;
use crate::math::{bps_of, is_valid_bps, mul_div, Rounding, BPS_SCALE};
use crate::types::{AdapterKind, HarvestReport, PositionState, StrategyParams};

/// Strategy Adapter Contract
#[odra::module(events = [Invested, Divested, YieldRealized, EmergencyExited, Rearmed, LossReported, FeesCollected])]
pub struct StrategyAdapter {
    /// Underlying asset (CEP-18)
    asset: Var<Address>,
    /// The only caller allowed to move capital
    vault: Var<Address>,
    /// Venue operator (loss reports, liquidity cap, fee collection)
    operator: Var<Address>,
    /// Strategy variant
    kind: Var<AdapterKind>,
    /// Strategy parameters
    params: Var<StrategyParams>,
    /// Principal including harvested yield
    invested: Var<U256>,
    /// Yield accrued but not yet harvested
    pending_yield: Var<U256>,
    /// Block time of the last accrual checkpoint
    last_accrual: Var<u64>,
    /// Performance fees and exit penalties kept by the venue
    accrued_fees: Var<U256>,
    /// Loss reported but not yet realized
    pending_loss: Var<U256>,
    /// Optional cap on what a single divest can pull
    liquidity_cap: Var<Option<U256>>,
    /// Position state
    state: Var<PositionState>,
    /// Reentrancy lock around token transfers
    locked: Var<bool>,
}

#[odra::module]
impl StrategyAdapter {
    /// Initialize an adapter bound to one vault and one asset
    pub fn init(
        &mut self,
        asset: Address,
        vault: Address,
        operator: Address,
        kind: AdapterKind,
        params: StrategyParams,
    ) {
        if !validate_rate(params.rate_bps)
            || !is_valid_bps(params.performance_fee_bps)
            || !is_valid_bps(params.early_exit_bps)
        {
            self.env().revert(VaultError::InvalidConfig);
        }

        self.asset.set(asset);
        self.vault.set(vault);
        self.operator.set(operator);
        self.kind.set(kind);
        self.params.set(params);
        self.invested.set(U256::zero());
        self.pending_yield.set(U256::zero());
        self.accrued_fees.set(U256::zero());
        self.pending_loss.set(U256::zero());
        self.liquidity_cap.set(None);
        self.last_accrual.set(self.env().get_block_time());
        self.state.set(PositionState::Uninitialized);
        self.locked.set(false);
    }

    // ========== Vault Functions ==========

    /// Book `assets` already transferred by the vault as invested principal
    pub fn invest(&mut self, assets: U256) {
        self.require_vault();
        if assets.is_zero() {
            self.env().revert(VaultError::InvalidInvestAmount);
        }
        self.require_not_exited();

        self.checkpoint();
        let invested = self.invested() + assets;
        self.invested.set(invested);
        self.state.set(PositionState::Invested);

        self.env().emit_event(Invested { amount: assets, invested });
    }

    /// Exit up to `assets` of principal and send the proceeds to the vault.
    ///
    /// The exit is bounded by the invested principal and available liquidity.
    /// Before maturity a FixedTerm position pays the early-exit penalty out of
    /// the exited amount. Returns what was actually transferred.
    pub fn divest(&mut self, assets: U256) -> U256 {
        self.require_vault();
        if assets.is_zero() {
            self.env().revert(VaultError::ZeroAmount);
        }
        self.require_not_exited();
        self.lock();

        self.checkpoint();
        let invested = self.invested();
        let gross = assets.min(invested).min(self.available_liquidity());
        let penalty = self.exit_penalty(gross);
        let returned = gross - penalty;

        self.invested.set(invested - gross);
        if !penalty.is_zero() {
            self.accrued_fees.set(self.accrued_fees() + penalty);
        }
        self.state.set(PositionState::Divesting);

        if !returned.is_zero() {
            let vault = self.vault();
            self.send(vault, returned);
        }

        self.env().emit_event(Divested { requested: assets, returned, penalty });
        self.unlock();
        returned
    }

    /// Realize yield accrued since the last harvest and any reported loss.
    pub fn harvest(&mut self) -> HarvestReport {
        self.require_vault();
        if self.position_state() == PositionState::EmergencyExited {
            return HarvestReport::default();
        }

        self.checkpoint();
        let params = self.params();

        let gross = self.pending_yield.get_or_default();
        let fee_component = bps_of(gross, params.performance_fee_bps);
        let yield_amount = gross - fee_component;

        let mut invested = self.invested() + yield_amount;
        let loss_amount = self.pending_loss.get_or_default().min(invested);
        invested -= loss_amount;

        self.invested.set(invested);
        self.pending_yield.set(U256::zero());
        self.pending_loss.set(U256::zero());
        if !fee_component.is_zero() {
            self.accrued_fees.set(self.accrued_fees() + fee_component);
        }

        let report = HarvestReport { yield_amount, fee_component, loss_amount };
        self.env().emit_event(YieldRealized { yield_amount, fee_component, loss_amount });
        report
    }

    /// Return the whole position to the vault, ignoring the liquidity cap.
    pub fn emergency_withdraw(&mut self) -> U256 {
        self.require_vault();
        self.lock();

        let spendable = self.token_balance().saturating_sub(self.accrued_fees());
        let returned = self.invested().min(spendable);

        self.invested.set(U256::zero());
        self.pending_yield.set(U256::zero());
        self.pending_loss.set(U256::zero());
        self.state.set(PositionState::EmergencyExited);

        if !returned.is_zero() {
            let vault = self.vault();
            self.send(vault, returned);
        }

        self.env().emit_event(EmergencyExited { returned });
        self.unlock();
        returned
    }

    /// Clear an emergency exit so the vault can invest again
    pub fn rearm(&mut self) {
        self.require_vault();
        if self.position_state() != PositionState::EmergencyExited {
            return;
        }
        let state = if self.invested().is_zero() {
            PositionState::Uninitialized
        } else {
            PositionState::Invested
        };
        self.state.set(state);
        self.last_accrual.set(self.env().get_block_time());
        self.env().emit_event(Rearmed { vault: self.vault() });
    }

    // ========== Operator Functions ==========

    /// Record a venue loss (slashing, bad debt) to realize at next harvest
    pub fn report_loss(&mut self, amount: U256) {
        self.require_operator();
        if amount.is_zero() {
            self.env().revert(VaultError::ZeroAmount);
        }
        self.pending_loss.set(self.pending_loss.get_or_default() + amount);
        self.env().emit_event(LossReported { amount });
    }

    /// Cap what a single divest can pull (None = uncapped)
    pub fn set_liquidity_cap(&mut self, cap: Option<U256>) {
        self.require_operator();
        self.liquidity_cap.set(cap);
    }

    /// Pay accrued fees and penalties to `recipient`
    pub fn collect_fees(&mut self, recipient: Address) -> U256 {
        self.require_operator();
        let amount = self.accrued_fees();
        if amount.is_zero() {
            self.env().revert(VaultError::ZeroAmount);
        }
        self.lock();
        self.accrued_fees.set(U256::zero());
        self.send(recipient, amount);
        self.env().emit_event(FeesCollected { recipient, amount });
        self.unlock();
        amount
    }

    // ========== Views ==========

    pub fn invested(&self) -> U256 {
        self.invested.get_or_default()
    }

    /// Yield accrued so far, before the performance fee
    pub fn pending_yield(&self) -> U256 {
        let stored = self.pending_yield.get_or_default();
        stored + self.accrued_since_checkpoint()
    }

    /// Divest request that returns at least `assets` after the exit penalty.
    /// A full penalty cannot be grossed up; `assets` comes back unchanged.
    pub fn gross_for(&self, assets: U256) -> U256 {
        let penalty_bps = self.exit_penalty_bps();
        if penalty_bps == 0 || penalty_bps >= BPS_SCALE {
            return assets;
        }
        mul_div(assets, U256::from(BPS_SCALE), U256::from(BPS_SCALE - penalty_bps), Rounding::Up)
            .unwrap_or(assets)
    }

    /// What a divest could pull right now
    pub fn available_liquidity(&self) -> U256 {
        let spendable = self.token_balance().saturating_sub(self.accrued_fees());
        match self.liquidity_cap.get().flatten() {
            Some(cap) => spendable.min(cap),
            None => spendable,
        }
    }

    pub fn accrued_fees(&self) -> U256 {
        self.accrued_fees.get_or_default()
    }

    pub fn pending_loss(&self) -> U256 {
        self.pending_loss.get_or_default()
    }

    pub fn asset(&self) -> Address {
        self.asset.get_or_revert_with(VaultError::InvalidConfig)
    }

    pub fn vault(&self) -> Address {
        self.vault.get_or_revert_with(VaultError::InvalidConfig)
    }

    pub fn operator(&self) -> Address {
        self.operator.get_or_revert_with(VaultError::InvalidConfig)
    }

    pub fn kind(&self) -> AdapterKind {
        self.kind.get_or_revert_with(VaultError::InvalidConfig)
    }

    pub fn params(&self) -> StrategyParams {
        self.params.get_or_default()
    }

    pub fn position_state(&self) -> PositionState {
        self.state.get().unwrap_or(PositionState::Uninitialized)
    }

    // ========== Internal Functions ==========

    fn checkpoint(&mut self) {
        let accrued = self.accrued_since_checkpoint();
        if !accrued.is_zero() {
            self.pending_yield.set(self.pending_yield.get_or_default() + accrued);
        }
        self.last_accrual.set(self.env().get_block_time());
    }

    fn accrued_since_checkpoint(&self) -> U256 {
        let params = self.params();
        let now = self.env().get_block_time();
        let from = self.last_accrual.get_or_default();
        match self.kind() {
            AdapterKind::Manual => U256::zero(),
            AdapterKind::MoneyMarket => accrue_yield(self.invested(), params.rate_bps, from, now),
            AdapterKind::FixedTerm => {
                let to = accrual_end(now, params.maturity);
                accrue_yield(self.invested(), params.rate_bps, from, to)
            }
        }
    }

    fn exit_penalty(&self, gross: U256) -> U256 {
        bps_of(gross, self.exit_penalty_bps())
    }

    /// Penalty a divest pays right now, in bps
    fn exit_penalty_bps(&self) -> u32 {
        if self.kind() != AdapterKind::FixedTerm {
            return 0;
        }
        let params = self.params();
        if early_exit(self.env().get_block_time(), params.maturity) {
            params.early_exit_bps
        } else {
            0
        }
    }

    fn token_balance(&self) -> U256 {
        AssetTokenContractRef::new(self.env(), self.asset()).balance_of(self.env().self_address())
    }

    fn send(&self, recipient: Address, amount: U256) {
        let mut token = AssetTokenContractRef::new(self.env(), self.asset());
        if !token.transfer(recipient, amount) {
            self.env().revert(VaultError::InsufficientTokenBalance);
        }
    }

    fn require_vault(&self) {
        if self.env().caller() != self.vault() {
            self.env().revert(VaultError::UnauthorizedCaller);
        }
    }

    fn require_operator(&self) {
        if self.env().caller() != self.operator() {
            self.env().revert(VaultError::Unauthorized);
        }
    }

    fn require_not_exited(&self) {
        if self.position_state() == PositionState::EmergencyExited {
            self.env().revert(VaultError::AdapterHalted);
        }
    }

    fn lock(&mut self) {
        if self.locked.get_or_default() {
            self.env().revert(VaultError::Reentrancy);
        }
        self.locked.set(true);
    }

    fn unlock(&mut self) {
        self.locked.set(false);
    }
}

/// Whether exiting at `now` is before a set maturity.
fn early_exit(now: u64, maturity: u64) -> bool {
    maturity != 0 && now < maturity
}
