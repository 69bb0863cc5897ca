//! Strategy Orchestrator
//!
//! Sub-module of the vault that owns adapter selection and the guards around
//! every capital movement between the vault buffer and an adapter. It holds
//! no balance of its own: the vault keeps the buffer and passes amounts in,
//! the orchestrator reports what came back.
//!
//! Adapter lifecycle:
//!
//! ```text
//! Uninitialized -> Approved -> Active -> Divesting (rotation, emergency)
//!                                     -> Impaired  (loss guard)
//! any non-terminal state -> Retired
//! Divesting / Impaired --re-approval--> Approved / Active
//! ```

use odra::prelude::*;
use odra::ContractRef;
use odra::casper_types::U256;
use crate::errors::VaultError;
use crate::events::{
    ActiveAdapterChanged, AdapterImpaired, AdapterRegistered, AdapterStatusChanged,
    EmergencyWithdrawal, ParametersUpdated,
};
use crate::interfaces::{AssetTokenContractRef, YieldAdapterContractRef};
use crate::math::{bps_of, is_valid_bps, min_out};
use crate::types::{AdapterRecord, AdapterStatus, HarvestReport, StrategyConfig, VaultParameters};

/// Outcome of polling the active adapter for yield
pub struct HarvestPoll {
    pub adapter_id: u64,
    pub report: HarvestReport,
    pub impaired: bool,
}

/// Strategy Orchestrator
#[odra::module(events = [AdapterRegistered, AdapterStatusChanged, ActiveAdapterChanged, AdapterImpaired, EmergencyWithdrawal, ParametersUpdated])]
pub struct StrategyOrchestrator {
    /// Asset every adapter must hold
    asset: Var<Address>,
    /// Strategy configuration
    config: Var<StrategyConfig>,
    /// Adapter records by id (ids start at 1)
    adapters: Mapping<u64, AdapterRecord>,
    /// Adapter address -> id
    adapter_ids: Mapping<Address, u64>,
    /// Number of registered adapters
    adapter_count: Var<u64>,
    /// Sum of principal booked into adapters
    total_invested: Var<U256>,
}

#[odra::module]
impl StrategyOrchestrator {
    /// Strategy configuration
    pub fn config(&self) -> StrategyConfig {
        self.config.get_or_revert_with(VaultError::InvalidConfig)
    }

    /// Adapter record by id
    pub fn adapter(&self, adapter_id: u64) -> Option<AdapterRecord> {
        self.adapters.get(&adapter_id)
    }

    /// Number of registered adapters
    pub fn adapter_count(&self) -> u64 {
        self.adapter_count.get_or_default()
    }

    /// Sum of principal booked into adapters
    pub fn total_invested(&self) -> U256 {
        self.total_invested.get_or_default()
    }
}

impl StrategyOrchestrator {
    pub fn setup(&mut self, asset: Address, params: VaultParameters) {
        validate_parameters(params.cash_buffer_bps, params.slippage_bps, params.max_loss_bps)
            .unwrap_or_else(|e| self.env().revert(e));

        self.asset.set(asset);
        self.adapter_count.set(0);
        self.total_invested.set(U256::zero());
        self.config.set(StrategyConfig {
            cash_buffer_bps: params.cash_buffer_bps,
            slippage_bps: params.slippage_bps,
            max_loss_bps: params.max_loss_bps,
            rebalance_threshold: params.rebalance_threshold,
            active_adapter_id: None,
            approved_adapter_ids: Vec::new(),
        });
    }

    /// Active adapter record, if any
    pub fn active(&self) -> Option<AdapterRecord> {
        self.config()
            .active_adapter_id
            .and_then(|id| self.adapters.get(&id))
    }

    /// Whether the active adapter tripped the loss guard
    pub fn active_is_impaired(&self) -> bool {
        self.active()
            .map(|record| record.status == AdapterStatus::Impaired)
            .unwrap_or(false)
    }

    // ========== Parameters ==========

    pub fn update_parameters(&mut self, cash_buffer_bps: u32, slippage_bps: u32, max_loss_bps: u32) {
        validate_parameters(cash_buffer_bps, slippage_bps, max_loss_bps)
            .unwrap_or_else(|e| self.env().revert(e));

        let mut config = self.config();
        config.cash_buffer_bps = cash_buffer_bps;
        config.slippage_bps = slippage_bps;
        config.max_loss_bps = max_loss_bps;
        self.store_parameters(config);
    }

    pub fn set_rebalance_threshold(&mut self, threshold: U256) {
        let mut config = self.config();
        config.rebalance_threshold = threshold;
        self.store_parameters(config);
    }

    // ========== Adapter Lifecycle ==========

    /// Register an adapter bound to this vault and asset
    pub fn register_adapter(&mut self, address: Address) -> u64 {
        if self.adapter_ids.get(&address).is_some() {
            self.env().revert(VaultError::AdapterAlreadyRegistered);
        }

        let adapter = YieldAdapterContractRef::new(self.env(), address);
        if adapter.vault() != self.env().self_address() || Some(adapter.asset()) != self.asset.get() {
            self.env().revert(VaultError::AdapterMismatch);
        }

        let id = self.adapter_count() + 1;
        self.adapters.set(&id, AdapterRecord {
            id,
            address,
            kind: adapter.kind(),
            invested: U256::zero(),
            status: AdapterStatus::Uninitialized,
        });
        self.adapter_ids.set(&address, id);
        self.adapter_count.set(id);

        self.env().emit_event(AdapterRegistered { adapter_id: id, adapter: address });
        id
    }

    /// Approve or withdraw approval. Approving an already approved or
    /// active adapter changes nothing.
    ///
    /// Re-approving an Impaired or Divesting adapter books its actual value
    /// and re-arms it.
    pub fn set_adapter_approval(&mut self, adapter_id: u64, approved: bool) {
        let mut record = self.require_adapter(adapter_id);

        if !approved {
            match record.status {
                AdapterStatus::Active => self.env().revert(VaultError::AdapterActive),
                AdapterStatus::Retired => self.env().revert(VaultError::AdapterRetired),
                AdapterStatus::Approved => {}
                // already barred from investing
                _ => return,
            }
            self.remove_approved(adapter_id);
            self.set_status(&mut record, AdapterStatus::Uninitialized);
            self.adapters.set(&adapter_id, record);
            return;
        }

        match record.status {
            AdapterStatus::Approved | AdapterStatus::Active => {}
            AdapterStatus::Retired => self.env().revert(VaultError::AdapterRetired),
            AdapterStatus::Uninitialized => {
                self.add_approved(adapter_id);
                self.set_status(&mut record, AdapterStatus::Approved);
                self.adapters.set(&adapter_id, record);
            }
            AdapterStatus::Divesting | AdapterStatus::Impaired => {
                let mut adapter = YieldAdapterContractRef::new(self.env(), record.address);
                adapter.rearm();
                let actual = adapter.invested();

                self.rebook(&mut record, actual);
                self.add_approved(adapter_id);
                let status = if self.config().active_adapter_id == Some(adapter_id) {
                    AdapterStatus::Active
                } else {
                    AdapterStatus::Approved
                };
                self.set_status(&mut record, status);
                self.adapters.set(&adapter_id, record);
            }
        }
    }

    /// Make `adapter_id` the active adapter. The outgoing adapter is fully
    /// divested first (slippage- and loss-checked) and left Divesting.
    /// Returns what the outgoing adapter paid back into the buffer.
    pub fn set_active_adapter(&mut self, adapter_id: u64) -> U256 {
        let mut incoming = self.require_adapter(adapter_id);
        match incoming.status {
            AdapterStatus::Active => return U256::zero(),
            AdapterStatus::Approved => {}
            AdapterStatus::Retired => self.env().revert(VaultError::AdapterRetired),
            _ => self.env().revert(VaultError::AdapterNotApproved),
        }

        let mut config = self.config();
        let previous = config.active_adapter_id;
        let mut returned = U256::zero();

        if let Some(outgoing_id) = previous {
            let outgoing = self.require_adapter(outgoing_id);
            if outgoing.status == AdapterStatus::Impaired {
                self.env().revert(VaultError::AdapterImpaired);
            }
            if !outgoing.invested.is_zero() {
                returned = self.guarded_divest(outgoing_id, outgoing.invested);
            }
            let mut outgoing = self.require_adapter(outgoing_id);
            if !outgoing.invested.is_zero() {
                // within tolerance but not fully drained
                self.env().revert(VaultError::InsufficientLiquidity);
            }
            self.remove_approved(outgoing_id);
            self.set_status(&mut outgoing, AdapterStatus::Divesting);
            self.adapters.set(&outgoing_id, outgoing);
            config = self.config();
        }

        config.active_adapter_id = Some(adapter_id);
        self.store_config(config);
        self.set_status(&mut incoming, AdapterStatus::Active);
        self.adapters.set(&adapter_id, incoming);

        self.env().emit_event(ActiveAdapterChanged { previous, current: adapter_id });
        returned
    }

    /// Pull an adapter's whole position without slippage checks. The
    /// adapter is left Divesting and the active slot is cleared if it held
    /// it. Returns what came back.
    pub fn emergency_withdraw(&mut self, adapter_id: u64) -> U256 {
        let mut record = self.require_adapter(adapter_id);
        if record.status == AdapterStatus::Retired {
            self.env().revert(VaultError::AdapterRetired);
        }

        let returned = self.drain(&mut record);
        self.set_status(&mut record, AdapterStatus::Divesting);
        self.adapters.set(&adapter_id, record);
        returned
    }

    /// Drain and permanently retire an adapter
    pub fn retire_adapter(&mut self, adapter_id: u64) -> U256 {
        let mut record = self.require_adapter(adapter_id);
        if record.status == AdapterStatus::Retired {
            self.env().revert(VaultError::AdapterRetired);
        }

        let returned = self.drain(&mut record);
        self.set_status(&mut record, AdapterStatus::Retired);
        self.adapters.set(&adapter_id, record);
        returned
    }

    // ========== Capital Movement ==========

    /// Amount of buffer excess to sweep into the active adapter, if any.
    pub fn sweep_amount(&self, buffer: U256, total_assets: U256) -> Option<(u64, U256)> {
        let active = self.active()?;
        if active.status != AdapterStatus::Active {
            return None;
        }
        let config = self.config();
        let target = bps_of(total_assets, config.cash_buffer_bps);
        if buffer > target.saturating_add(config.rebalance_threshold) {
            Some((active.id, buffer - target))
        } else {
            None
        }
    }

    /// Amount the buffer is short of its target, capped at the active
    /// adapter's principal, if the gap exceeds the threshold.
    pub fn refill_amount(&self, buffer: U256, total_assets: U256) -> Option<(u64, U256)> {
        let active = self.active()?;
        if active.status != AdapterStatus::Active {
            return None;
        }
        let config = self.config();
        let target = bps_of(total_assets, config.cash_buffer_bps);
        if buffer.saturating_add(config.rebalance_threshold) < target {
            let amount = (target - buffer).min(active.invested);
            if amount.is_zero() {
                None
            } else {
                Some((active.id, amount))
            }
        } else {
            None
        }
    }

    /// Send `amount` from the vault to an adapter and book it as invested.
    /// The caller has already taken `amount` out of the buffer.
    pub fn invest(&mut self, adapter_id: u64, amount: U256) {
        let mut record = self.require_adapter(adapter_id);
        if record.status == AdapterStatus::Impaired {
            self.env().revert(VaultError::AdapterImpaired);
        }
        if record.status != AdapterStatus::Active {
            self.env().revert(VaultError::AdapterNotApproved);
        }

        record.invested += amount;
        self.adapters.set(&adapter_id, record.clone());
        self.total_invested.set(self.total_invested() + amount);

        let mut token = AssetTokenContractRef::new(self.env(), self.require_asset());
        if !token.transfer(record.address, amount) {
            self.env().revert(VaultError::InsufficientTokenBalance);
        }
        YieldAdapterContractRef::new(self.env(), record.address).invest(amount);
    }

    /// Divest a withdrawal deficit from the active adapter.
    ///
    /// The adapter must exit the whole deficit from its principal; what it
    /// returns may still fall short by its exit penalty. While the active
    /// adapter is impaired, or when it cannot exit the deficit, the
    /// withdrawal fails instead.
    pub fn divest_deficit(&mut self, deficit: U256) -> U256 {
        let active = self.liquid_active();
        self.divest_exact(active, deficit)
    }

    /// Divest from the active adapter until at least `net` has come back,
    /// grossing the request up by the adapter's exit penalty. The penalty
    /// passes the same slippage and loss guards as any divest.
    pub fn divest_net(&mut self, net: U256) -> U256 {
        let active = self.liquid_active();
        let gross = YieldAdapterContractRef::new(self.env(), active.address).gross_for(net);
        let returned = self.divest_exact(active, gross);
        if returned < net {
            self.env().revert(VaultError::InsufficientLiquidity);
        }
        returned
    }

    /// Divest `requested` from an adapter and enforce both guards:
    ///
    /// - slippage: `returned >= requested * (10000 - slippage_bps) / 10000`
    /// - loss: `requested - returned <= invested * max_loss_bps / 10000`
    ///
    /// The booked principal is resynced to what the adapter still holds.
    pub fn guarded_divest(&mut self, adapter_id: u64, requested: U256) -> U256 {
        let mut record = self.require_adapter(adapter_id);
        let config = self.config();
        let mut adapter = YieldAdapterContractRef::new(self.env(), record.address);

        let returned = adapter.divest(requested);
        if returned < min_out(requested, config.slippage_bps) {
            self.env().revert(VaultError::InvestSlippage);
        }
        let shortfall = requested.saturating_sub(returned);
        if shortfall > bps_of(record.invested, config.max_loss_bps) {
            self.env().revert(VaultError::LossGuardExceeded);
        }

        let remaining = adapter.invested();
        self.rebook(&mut record, remaining);
        self.adapters.set(&adapter_id, record);
        returned
    }

    /// Poll the active adapter for yield and apply the loss guard.
    ///
    /// A loss above `max_loss_bps` of booked principal marks the adapter
    /// Impaired and books nothing. Otherwise yield and loss are booked.
    pub fn harvest_active(&mut self) -> HarvestPoll {
        let mut record = match self.active() {
            Some(record) => record,
            None => self.env().revert(VaultError::NoActiveAdapter),
        };
        if record.status == AdapterStatus::Impaired {
            self.env().revert(VaultError::AdapterImpaired);
        }

        let config = self.config();
        let report = YieldAdapterContractRef::new(self.env(), record.address).harvest();
        let adapter_id = record.id;

        if report.loss_amount > bps_of(record.invested, config.max_loss_bps) {
            self.env().emit_event(AdapterImpaired {
                adapter_id,
                loss_amount: report.loss_amount,
                tracked: record.invested,
            });
            self.set_status(&mut record, AdapterStatus::Impaired);
            self.adapters.set(&adapter_id, record);
            return HarvestPoll { adapter_id, report, impaired: true };
        }

        let booked = (record.invested + report.yield_amount).saturating_sub(report.loss_amount);
        self.rebook(&mut record, booked);
        self.adapters.set(&adapter_id, record);
        HarvestPoll { adapter_id, report, impaired: false }
    }

    // ========== Internal Functions ==========

    fn liquid_active(&self) -> AdapterRecord {
        let active = match self.active() {
            Some(record) => record,
            None => self.env().revert(VaultError::InsufficientLiquidity),
        };
        if active.status == AdapterStatus::Impaired {
            self.env().revert(VaultError::InsufficientLiquidity);
        }
        active
    }

    /// Guarded divest that must take exactly `requested` out of the booked
    /// principal. Principal left behind by a liquidity cap would otherwise
    /// stay with the remaining holders.
    fn divest_exact(&mut self, active: AdapterRecord, requested: U256) -> U256 {
        if active.invested < requested {
            self.env().revert(VaultError::InsufficientLiquidity);
        }
        let returned = self.guarded_divest(active.id, requested);
        let remaining = self.require_adapter(active.id).invested;
        if active.invested.saturating_sub(remaining) < requested {
            self.env().revert(VaultError::InsufficientLiquidity);
        }
        returned
    }

    fn drain(&mut self, record: &mut AdapterRecord) -> U256 {
        let booked = record.invested;
        let returned = YieldAdapterContractRef::new(self.env(), record.address).emergency_withdraw();
        self.rebook(record, U256::zero());
        self.remove_approved(record.id);

        let mut config = self.config();
        if config.active_adapter_id == Some(record.id) {
            config.active_adapter_id = None;
            self.store_config(config);
        }

        self.env().emit_event(EmergencyWithdrawal {
            adapter_id: record.id,
            returned,
            realized_loss: booked.saturating_sub(returned),
        });
        returned
    }

    /// Replace an adapter's booked principal and keep the total in step.
    fn rebook(&mut self, record: &mut AdapterRecord, value: U256) {
        let total = self.total_invested().saturating_sub(record.invested) + value;
        self.total_invested.set(total);
        record.invested = value;
    }

    fn set_status(&self, record: &mut AdapterRecord, status: AdapterStatus) {
        if record.status != status {
            record.status = status;
            self.env().emit_event(AdapterStatusChanged { adapter_id: record.id, status });
        }
    }

    fn add_approved(&mut self, adapter_id: u64) {
        let mut config = self.config();
        if !config.approved_adapter_ids.contains(&adapter_id) {
            config.approved_adapter_ids.push(adapter_id);
            self.config.set(config);
        }
    }

    fn remove_approved(&mut self, adapter_id: u64) {
        let mut config = self.config();
        config.approved_adapter_ids.retain(|id| *id != adapter_id);
        self.config.set(config);
    }

    fn store_config(&mut self, config: StrategyConfig) {
        self.config.set(config);
    }

    fn store_parameters(&mut self, config: StrategyConfig) {
        self.env().emit_event(ParametersUpdated {
            cash_buffer_bps: config.cash_buffer_bps,
            slippage_bps: config.slippage_bps,
            max_loss_bps: config.max_loss_bps,
            rebalance_threshold: config.rebalance_threshold,
        });
        self.config.set(config);
    }

    fn require_adapter(&self, adapter_id: u64) -> AdapterRecord {
        match self.adapters.get(&adapter_id) {
            Some(record) => record,
            None => self.env().revert(VaultError::AdapterNotFound),
        }
    }

    fn require_asset(&self) -> Address {
        self.asset.get_or_revert_with(VaultError::InvalidConfig)
    }
}

/// All three strategy limits must be valid basis points.
pub fn validate_parameters(cash_buffer_bps: u32, slippage_bps: u32, max_loss_bps: u32) -> Result<(), VaultError> {
    if is_valid_bps(cash_buffer_bps) && is_valid_bps(slippage_bps) && is_valid_bps(max_loss_bps) {
        Ok(())
    } else {
        Err(VaultError::InvalidConfig)
    }
}
