//! Yield-Donation Vault Contract
//!
//! CEP-18 share token over a single CEP-18 asset, with a CEP-4626 style
//! deposit/withdraw surface.
//!
//! ## Accounting
//!
//! - total_assets = buffer + principal booked into adapters
//! - shares = assets * (total_shares + 1) / (total_assets + 1)
//! - deposit and redeem round down, mint and withdraw round up
//!
//! ## Flows
//!
//! - deposit: mint shares, pull assets, sweep buffer excess into the active adapter
//! - withdraw: burn shares, pay from the buffer, divest the deficit from the
//!   active adapter. The adapter must exit the whole deficit from principal;
//!   an exit penalty within tolerance is borne by the withdrawer, a
//!   liquidity cap reverts the withdrawal.
//! - harvest: poll the active adapter, book yield, send the donation share to
//!   the router, let the rest compound
//!
//! ## Impairment
//!
//! A loss over `max_loss_bps` leaves the active adapter Impaired with the
//! loss unbooked until an operator re-approves or retires it. Meanwhile
//! deposits are refused and withdrawals are served from the buffer only, at
//! the pre-loss price, so holders who exit during that window leave the
//! loss to those who stay. Pausers are expected to halt the vault while an
//! impairment is being resolved.
//!
//! Operator entry points are gated by roles held in the access control
//! contract; ADMIN satisfies every role check.

use odra::prelude::*;
use odra::ContractRef;
use odra::casper_types::{U256, RuntimeArgs, runtime_args};
use odra::CallDef;
use crate::access_control::{ROLE_ADMIN, ROLE_PAUSER, ROLE_VAULT_MANAGER};
use crate::errors::VaultError;
use crate::events::{
    Approval, BufferRefilled, Deposited, DonationRouterSet, Halted, Harvested, Paused, Resumed,
    RiskConfigUpdated, Swept, Transfer, Unpaused, Withdrawn,
};
use crate::interfaces::{
    AccessOracleContractRef, AssetTokenContractRef, NativeWrapperContractRef, YieldAdapterContractRef,
    YieldRouterContractRef,
};
use crate::math::{
    assets_to_shares, price_per_share, shares_to_assets, u256_to_u512, u512_to_u256, Rounding,
};
use crate::orchestrator::StrategyOrchestrator;
use crate::risk_guard::{self, RiskConfig};
use crate::types::{AdapterRecord, HarvestOutcome, StrategyConfig, VaultParameters, VaultStatus};

/// Share decimals (matches CSPR motes)
const DECIMALS: u8 = 9;

/// Where a withdrawal is paid
enum Payout {
    /// Asset tokens to this address
    Token(Address),
    /// Unwrapped native CSPR to this address
    Native(Address),
}

impl Payout {
    fn receiver(&self) -> Address {
        match self {
            Payout::Token(receiver) | Payout::Native(receiver) => *receiver,
        }
    }
}

/// Yield-Donation Vault Contract
#[odra::module(events = [Deposited, Withdrawn, Swept, BufferRefilled, Harvested, RiskConfigUpdated, DonationRouterSet, Paused, Unpaused, Halted, Resumed, Transfer, Approval])]
pub struct Vault {
    // ===== CEP-18 Share State =====
    /// Share token name
    name: Var<String>,
    /// Share token symbol
    symbol: Var<String>,
    /// Outstanding shares
    total_shares: Var<U256>,
    /// Share balances
    balances: Mapping<Address, U256>,
    /// Share allowances (owner, spender) -> amount
    allowances: Mapping<(Address, Address), U256>,

    // ===== Vault State =====
    /// Underlying asset
    asset: Var<Address>,
    /// Whether the asset is wCSPR and the native pair is enabled
    native_wrapped: Var<bool>,
    /// Access control contract
    access_control: Var<Address>,
    /// Donation router, if donations are enabled
    donation_router: Var<Option<Address>>,
    /// Deposit cap guard values
    risk_config: Var<RiskConfig>,
    /// Idle assets held by the vault
    buffer: Var<U256>,
    /// Deposits blocked
    paused: Var<bool>,
    /// All depositor operations blocked
    halted: Var<bool>,
    /// Reentrancy lock around adapter and router calls
    locked: Var<bool>,
    /// Adapter selection and capital movement guards
    orchestrator: SubModule<StrategyOrchestrator>,
}

#[odra::module]
impl Vault {
    /// Initialize the vault
    pub fn init(
        &mut self,
        name: String,
        symbol: String,
        asset: Address,
        native_wrapped: bool,
        access_control: Address,
        params: VaultParameters,
        risk_config: RiskConfig,
    ) {
        risk_guard::validate_config(&risk_config).unwrap_or_else(|e| self.env().revert(e));

        self.name.set(name);
        self.symbol.set(symbol);
        self.total_shares.set(U256::zero());
        self.asset.set(asset);
        self.native_wrapped.set(native_wrapped);
        self.access_control.set(access_control);
        self.donation_router.set(None);
        self.risk_config.set(risk_config);
        self.buffer.set(U256::zero());
        self.paused.set(false);
        self.halted.set(false);
        self.locked.set(false);
        self.orchestrator.setup(asset, params);
    }

    // ===== CEP-18 Standard Functions =====

    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    pub fn decimals(&self) -> u8 {
        DECIMALS
    }

    /// Outstanding shares
    pub fn total_supply(&self) -> U256 {
        self.total_shares.get().unwrap_or(U256::zero())
    }

    pub fn balance_of(&self, address: Address) -> U256 {
        self.balances.get(&address).unwrap_or(U256::zero())
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or(U256::zero())
    }

    /// Transfer shares to recipient
    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        let sender = self.env().caller();
        self.transfer_internal(sender, recipient, amount);
        true
    }

    /// Approve spender to transfer or redeem shares
    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.allowances.set(&(owner, spender), amount);
        self.env().emit_event(Approval { owner, spender, amount });
        true
    }

    /// Transfer from owner to recipient (requires allowance)
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        let spender = self.env().caller();
        self.spend_allowance(owner, spender, amount);
        self.transfer_internal(owner, recipient, amount);
        true
    }

    // ===== Accounting Views =====

    /// Underlying asset
    pub fn asset(&self) -> Address {
        self.asset.get_or_revert_with(VaultError::InvalidConfig)
    }

    /// Buffer plus principal booked into adapters
    pub fn total_assets(&self) -> U256 {
        self.buffer_balance() + self.orchestrator.total_invested()
    }

    /// Idle assets held by the vault
    pub fn buffer_balance(&self) -> U256 {
        self.buffer.get().unwrap_or(U256::zero())
    }

    /// Principal booked into adapters
    pub fn total_invested(&self) -> U256 {
        self.orchestrator.total_invested()
    }

    /// Assets per share scaled by 1e18
    pub fn assets_per_share(&self) -> U256 {
        price_per_share(self.total_assets(), self.total_supply())
    }

    pub fn convert_to_shares(&self, assets: U256) -> U256 {
        self.to_shares(assets, Rounding::Down)
    }

    pub fn convert_to_assets(&self, shares: U256) -> U256 {
        self.to_assets(shares, Rounding::Down)
    }

    /// Shares a deposit of `assets` would mint
    pub fn preview_deposit(&self, assets: U256) -> U256 {
        self.to_shares(assets, Rounding::Down)
    }

    /// Assets a mint of `shares` would pull
    pub fn preview_mint(&self, shares: U256) -> U256 {
        self.to_assets(shares, Rounding::Up)
    }

    /// Shares a withdrawal of `assets` would burn
    pub fn preview_withdraw(&self, assets: U256) -> U256 {
        self.to_shares(assets, Rounding::Up)
    }

    /// Assets a redemption of `shares` would pay (before any divest shortfall)
    pub fn preview_redeem(&self, shares: U256) -> U256 {
        self.to_assets(shares, Rounding::Down)
    }

    /// Largest deposit currently accepted
    pub fn max_deposit(&self, _receiver: Address) -> U256 {
        if !self.deposits_open() {
            return U256::zero();
        }
        risk_guard::max_depositable(&self.risk_config(), self.total_assets())
    }

    /// Largest mint currently accepted
    pub fn max_mint(&self, receiver: Address) -> U256 {
        let assets = self.max_deposit(receiver);
        if assets == U256::MAX {
            return U256::MAX;
        }
        self.to_shares(assets, Rounding::Down)
    }

    /// Largest withdrawal `owner` can make right now
    pub fn max_withdraw(&self, owner: Address) -> U256 {
        if self.is_halted() {
            return U256::zero();
        }
        self.to_assets(self.balance_of(owner), Rounding::Down)
            .min(self.withdrawable_liquidity())
    }

    /// Largest redemption `owner` can make right now
    pub fn max_redeem(&self, owner: Address) -> U256 {
        if self.is_halted() {
            return U256::zero();
        }
        let balance = self.balance_of(owner);
        let liquidity = self.withdrawable_liquidity();
        if self.to_assets(balance, Rounding::Down) <= liquidity {
            balance
        } else {
            self.to_shares(liquidity, Rounding::Down)
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get_or_default()
    }

    pub fn is_halted(&self) -> bool {
        self.halted.get_or_default()
    }

    pub fn is_native_wrapped(&self) -> bool {
        self.native_wrapped.get_or_default()
    }

    pub fn risk_config(&self) -> RiskConfig {
        self.risk_config.get_or_revert_with(VaultError::InvalidConfig)
    }

    pub fn donation_router(&self) -> Option<Address> {
        self.donation_router.get().flatten()
    }

    pub fn strategy_config(&self) -> StrategyConfig {
        self.orchestrator.config()
    }

    pub fn adapter(&self, adapter_id: u64) -> Option<AdapterRecord> {
        self.orchestrator.adapter(adapter_id)
    }

    pub fn adapter_count(&self) -> u64 {
        self.orchestrator.adapter_count()
    }

    /// Ledger snapshot
    pub fn status(&self) -> VaultStatus {
        VaultStatus {
            total_assets: self.total_assets(),
            total_shares: self.total_supply(),
            buffer_balance: self.buffer_balance(),
            total_invested: self.total_invested(),
            assets_per_share: self.assets_per_share(),
            paused: self.is_paused(),
            halted: self.is_halted(),
            active_adapter_id: self.orchestrator.config().active_adapter_id,
        }
    }

    // ===== Depositor Functions =====

    /// Deposit `assets` and mint shares (rounded down) to `receiver`
    pub fn deposit(&mut self, assets: U256, receiver: Address) -> U256 {
        self.lock();
        let shares = self.to_shares(assets, Rounding::Down);
        let caller = self.env().caller();
        self.deposit_internal(caller, assets, shares, receiver, true);
        self.unlock();
        shares
    }

    /// Mint exactly `shares` to `receiver`, pulling assets rounded up
    pub fn mint(&mut self, shares: U256, receiver: Address) -> U256 {
        self.lock();
        let assets = self.to_assets(shares, Rounding::Up);
        let caller = self.env().caller();
        self.deposit_internal(caller, assets, shares, receiver, true);
        self.unlock();
        assets
    }

    /// Withdraw `assets` from `owner`'s position, burning shares rounded up.
    /// Returns the shares burned.
    pub fn withdraw(&mut self, assets: U256, receiver: Address, owner: Address) -> U256 {
        self.lock();
        let shares = self.to_shares(assets, Rounding::Up);
        self.withdraw_internal(assets, shares, Payout::Token(receiver), owner);
        self.unlock();
        shares
    }

    /// Burn exactly `shares` of `owner`'s position. Returns the assets paid.
    pub fn redeem(&mut self, shares: U256, receiver: Address, owner: Address) -> U256 {
        self.lock();
        let assets = self.to_assets(shares, Rounding::Down);
        let paid = self.withdraw_internal(assets, shares, Payout::Token(receiver), owner);
        self.unlock();
        paid
    }

    /// Wrap the attached CSPR into the wCSPR asset and deposit it
    #[odra(payable)]
    pub fn deposit_native(&mut self, receiver: Address) -> U256 {
        self.require_native();
        self.lock();
        let assets = u512_to_u256(self.env().attached_value());
        let shares = self.to_shares(assets, Rounding::Down);
        let caller = self.env().caller();
        self.deposit_internal(caller, assets, shares, receiver, false);
        self.unlock();
        shares
    }

    /// Withdraw `assets`, unwrap them and send native CSPR to `receiver`.
    /// Returns the shares burned.
    pub fn withdraw_native(&mut self, assets: U256, receiver: Address, owner: Address) -> U256 {
        self.require_native();
        self.lock();
        let shares = self.to_shares(assets, Rounding::Up);
        self.withdraw_internal(assets, shares, Payout::Native(receiver), owner);
        self.unlock();
        shares
    }

    // ===== Strategy Operations (VAULT_MANAGER) =====

    /// Register an adapter bound to this vault. Returns its id.
    pub fn register_adapter(&mut self, adapter: Address) -> u64 {
        self.require_role(ROLE_VAULT_MANAGER);
        self.orchestrator.register_adapter(adapter)
    }

    /// Approve or withdraw approval of an adapter
    pub fn set_adapter_approval(&mut self, adapter_id: u64, approved: bool) {
        self.require_role(ROLE_VAULT_MANAGER);
        self.lock();
        self.orchestrator.set_adapter_approval(adapter_id, approved);
        self.unlock();
    }

    /// Rotate to an approved adapter, then sweep the buffer into it
    pub fn set_active_adapter(&mut self, adapter_id: u64) {
        self.require_role(ROLE_VAULT_MANAGER);
        self.require_not_halted();
        self.lock();
        let returned = self.orchestrator.set_active_adapter(adapter_id);
        if !returned.is_zero() {
            self.buffer.set(self.buffer_balance() + returned);
        }
        self.sweep();
        self.unlock();
    }

    pub fn update_vault_parameters(&mut self, cash_buffer_bps: u32, slippage_bps: u32, max_loss_bps: u32) {
        self.require_role(ROLE_VAULT_MANAGER);
        self.orchestrator.update_parameters(cash_buffer_bps, slippage_bps, max_loss_bps);
    }

    pub fn set_rebalance_threshold(&mut self, threshold: U256) {
        self.require_role(ROLE_VAULT_MANAGER);
        self.orchestrator.set_rebalance_threshold(threshold);
    }

    /// Move the buffer back towards its target in either direction
    pub fn rebalance(&mut self) {
        self.require_role(ROLE_VAULT_MANAGER);
        self.require_not_halted();
        self.lock();
        if !self.sweep() {
            let buffer = self.buffer_balance();
            let refill = self.orchestrator.refill_amount(buffer, self.total_assets());
            if let Some((adapter_id, requested)) = refill {
                let returned = self.orchestrator.guarded_divest(adapter_id, requested);
                self.buffer.set(buffer + returned);
                self.env().emit_event(BufferRefilled { adapter_id, requested, returned });
            }
        }
        self.unlock();
    }

    /// Realize the active adapter's yield and route the donation share
    pub fn harvest(&mut self) -> HarvestOutcome {
        self.require_role(ROLE_VAULT_MANAGER);
        self.require_not_halted();
        self.lock();

        let poll = self.orchestrator.harvest_active();
        let report = poll.report;
        let mut outcome = HarvestOutcome {
            adapter_id: poll.adapter_id,
            yield_amount: report.yield_amount,
            fee_component: report.fee_component,
            loss_amount: report.loss_amount,
            impaired: poll.impaired,
            ..Default::default()
        };

        if !poll.impaired && !report.yield_amount.is_zero() {
            let donated = self.route_donation(report.yield_amount);
            outcome.donated = donated;
            outcome.retained = report.yield_amount - donated;
        }

        self.env().emit_event(Harvested {
            adapter_id: outcome.adapter_id,
            yield_amount: outcome.yield_amount,
            loss_amount: outcome.loss_amount,
            donated: outcome.donated,
            retained: outcome.retained,
        });
        self.unlock();
        outcome
    }

    /// Drain and permanently retire an adapter
    pub fn retire_adapter(&mut self, adapter_id: u64) {
        self.require_role(ROLE_VAULT_MANAGER);
        self.lock();
        let returned = self.orchestrator.retire_adapter(adapter_id);
        self.buffer.set(self.buffer_balance() + returned);
        self.unlock();
    }

    // ===== Emergency Operations (PAUSER) =====

    /// Pull an adapter's whole position into the buffer
    pub fn emergency_withdraw_adapter(&mut self, adapter_id: u64) {
        self.require_role(ROLE_PAUSER);
        self.lock();
        let returned = self.orchestrator.emergency_withdraw(adapter_id);
        self.buffer.set(self.buffer_balance() + returned);
        self.unlock();
    }

    /// Block deposits and mints
    pub fn pause(&mut self) {
        self.require_role(ROLE_PAUSER);
        self.paused.set(true);
        self.env().emit_event(Paused { by: self.env().caller() });
    }

    pub fn unpause(&mut self) {
        self.require_role(ROLE_PAUSER);
        self.paused.set(false);
        self.env().emit_event(Unpaused { by: self.env().caller() });
    }

    /// Block every state-changing depositor operation
    pub fn halt(&mut self) {
        self.require_role(ROLE_PAUSER);
        self.halted.set(true);
        self.env().emit_event(Halted { by: self.env().caller() });
    }

    pub fn resume(&mut self) {
        self.require_role(ROLE_PAUSER);
        self.halted.set(false);
        self.env().emit_event(Resumed { by: self.env().caller() });
    }

    // ===== Admin Functions =====

    /// Replace the deposit cap guard values (admin only)
    pub fn set_risk_config(&mut self, config: RiskConfig) {
        self.require_admin();
        risk_guard::validate_config(&config).unwrap_or_else(|e| self.env().revert(e));
        self.env().emit_event(RiskConfigUpdated {
            max_deposit: config.max_deposit,
            deposit_cap_bps: config.deposit_cap_bps,
        });
        self.risk_config.set(config);
    }

    /// Set the router that receives donations (admin only)
    pub fn set_donation_router(&mut self, router: Address) {
        self.require_admin();
        self.donation_router.set(Some(router));
        self.env().emit_event(DonationRouterSet { router });
    }

    // ===== Internal Functions =====

    fn deposit_internal(&mut self, caller: Address, assets: U256, shares: U256, receiver: Address, pull: bool) {
        self.require_deposits_open();
        if assets.is_zero() || shares.is_zero() {
            self.env().revert(VaultError::ZeroAmount);
        }
        risk_guard::check_deposit(&self.risk_config(), self.total_assets(), assets)
            .unwrap_or_else(|e| self.env().revert(e));

        self.mint_internal(receiver, shares);
        self.buffer.set(self.buffer_balance() + assets);

        if pull {
            let self_address = self.env().self_address();
            let mut token = AssetTokenContractRef::new(self.env(), self.asset());
            if !token.transfer_from(caller, self_address, assets) {
                self.env().revert(VaultError::InsufficientTokenBalance);
            }
        } else {
            let wrap = CallDef::new("deposit", true, runtime_args! {}).with_amount(u256_to_u512(assets));
            let wrapped: U256 = self.env().call_contract(self.asset(), wrap);
            if wrapped != assets {
                self.env().revert(VaultError::InsufficientTokenBalance);
            }
        }

        self.env().emit_event(Deposited { sender: caller, owner: receiver, assets, shares });
        self.sweep();
    }

    /// Burn `shares` of `owner` and pay out `assets`, divesting any buffer
    /// deficit. Returns what was actually paid.
    fn withdraw_internal(&mut self, assets: U256, shares: U256, payout: Payout, owner: Address) -> U256 {
        self.require_not_halted();
        if assets.is_zero() || shares.is_zero() {
            self.env().revert(VaultError::ZeroAmount);
        }

        let caller = self.env().caller();
        if caller != owner {
            self.spend_allowance(owner, caller, shares);
        }
        self.burn_internal(owner, shares);

        let buffer = self.buffer_balance();
        let paid = if buffer >= assets {
            self.buffer.set(buffer - assets);
            assets
        } else {
            self.buffer.set(U256::zero());
            let returned = self.orchestrator.divest_deficit(assets - buffer);
            buffer + returned
        };

        let receiver = payout.receiver();
        match payout {
            Payout::Token(receiver) => self.send_asset(receiver, paid),
            Payout::Native(receiver) => {
                NativeWrapperContractRef::new(self.env(), self.asset()).withdraw(paid);
                self.env().transfer_tokens(&receiver, &u256_to_u512(paid));
            }
        }

        self.env().emit_event(Withdrawn { sender: caller, receiver, owner, assets: paid, shares });
        paid
    }

    /// Invest buffer excess into the active adapter. Returns whether
    /// anything moved.
    fn sweep(&mut self) -> bool {
        let buffer = self.buffer_balance();
        match self.orchestrator.sweep_amount(buffer, self.total_assets()) {
            Some((adapter_id, amount)) => {
                self.buffer.set(buffer - amount);
                self.orchestrator.invest(adapter_id, amount);
                self.env().emit_event(Swept { adapter_id, amount });
                true
            }
            None => false,
        }
    }

    /// Send the donation share of `harvested` to the router. Returns the
    /// amount that left the vault.
    fn route_donation(&mut self, harvested: U256) -> U256 {
        let router_address = match self.donation_router() {
            Some(router) => router,
            None => return U256::zero(),
        };
        let mut router = YieldRouterContractRef::new(self.env(), router_address);
        let quoted = router.quote_split(self.env().self_address(), harvested);
        let donated = quoted.donated();
        if donated.is_zero() {
            return U256::zero();
        }

        // fund from the buffer first, the active adapter for the rest;
        // an exit penalty is paid by the holders, the donation stays whole
        let mut buffer = self.buffer_balance();
        if buffer < donated {
            buffer += self.orchestrator.divest_net(donated - buffer);
        }
        self.buffer.set(buffer - donated);

        self.send_asset(router_address, donated);
        let routed = router.route_yield(harvested);
        if routed.donated() != donated {
            self.env().revert(VaultError::ConservationViolated);
        }
        donated
    }

    /// Buffer plus what the active adapter can exit right now
    fn withdrawable_liquidity(&self) -> U256 {
        let buffer = self.buffer_balance();
        match self.orchestrator.active() {
            Some(active) if !self.orchestrator.active_is_impaired() => {
                let exitable = YieldAdapterContractRef::new(self.env(), active.address).available_liquidity();
                buffer + active.invested.min(exitable)
            }
            _ => buffer,
        }
    }

    fn to_shares(&self, assets: U256, rounding: Rounding) -> U256 {
        assets_to_shares(assets, self.total_assets(), self.total_supply(), rounding)
            .unwrap_or_else(|e| self.env().revert(e))
    }

    fn to_assets(&self, shares: U256, rounding: Rounding) -> U256 {
        shares_to_assets(shares, self.total_assets(), self.total_supply(), rounding)
            .unwrap_or_else(|e| self.env().revert(e))
    }

    fn send_asset(&self, recipient: Address, amount: U256) {
        let mut token = AssetTokenContractRef::new(self.env(), self.asset());
        if !token.transfer(recipient, amount) {
            self.env().revert(VaultError::InsufficientTokenBalance);
        }
    }

    fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(VaultError::InsufficientShares);
        }

        self.balances.set(&from, from_balance - amount);
        let to_balance = self.balance_of(to);
        self.balances.set(&to, to_balance + amount);
        self.env().emit_event(Transfer { from: Some(from), to: Some(to), amount });
    }

    fn spend_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        let current_allowance = self.allowance(owner, spender);
        if current_allowance < amount {
            self.env().revert(VaultError::InsufficientAllowance);
        }
        self.allowances.set(&(owner, spender), current_allowance - amount);
    }

    fn mint_internal(&mut self, to: Address, amount: U256) {
        let current_balance = self.balance_of(to);
        self.balances.set(&to, current_balance + amount);

        let current_supply = self.total_supply();
        self.total_shares.set(current_supply + amount);
        self.env().emit_event(Transfer { from: None, to: Some(to), amount });
    }

    fn burn_internal(&mut self, from: Address, amount: U256) {
        let current_balance = self.balance_of(from);
        if current_balance < amount {
            self.env().revert(VaultError::InsufficientShares);
        }

        self.balances.set(&from, current_balance - amount);

        let current_supply = self.total_supply();
        self.total_shares.set(current_supply - amount);
        self.env().emit_event(Transfer { from: Some(from), to: None, amount });
    }

    fn deposits_open(&self) -> bool {
        !self.is_halted() && !self.is_paused() && !self.orchestrator.active_is_impaired()
    }

    fn require_deposits_open(&self) {
        if self.is_halted() {
            self.env().revert(VaultError::VaultHalted);
        }
        if self.is_paused() {
            self.env().revert(VaultError::DepositsPaused);
        }
        if self.orchestrator.active_is_impaired() {
            self.env().revert(VaultError::AdapterImpaired);
        }
    }

    fn require_not_halted(&self) {
        if self.is_halted() {
            self.env().revert(VaultError::VaultHalted);
        }
    }

    fn require_native(&self) {
        if !self.is_native_wrapped() {
            self.env().revert(VaultError::NativeNotSupported);
        }
    }

    fn has_role(&self, role_id: u8, account: Address) -> bool {
        let access_control = self.access_control.get_or_revert_with(VaultError::InvalidConfig);
        AccessOracleContractRef::new(self.env(), access_control).has_role(role_id, account)
    }

    /// Caller must hold `role_id` or ADMIN
    fn require_role(&self, role_id: u8) {
        let caller = self.env().caller();
        if !self.has_role(role_id, caller) && !self.has_role(ROLE_ADMIN, caller) {
            self.env().revert(VaultError::Unauthorized);
        }
    }

    fn require_admin(&self) {
        if !self.has_role(ROLE_ADMIN, self.env().caller()) {
            self.env().revert(VaultError::Unauthorized);
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
