//! Events emitted by the protocol contracts.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::types::AdapterStatus;

// ========== Access control ==========

#[odra::event]
pub struct RoleGranted {
    pub role_id: u8,
    pub account: Address,
}

#[odra::event]
pub struct RoleRevoked {
    pub role_id: u8,
    pub account: Address,
}

// ========== Beneficiary directory ==========

#[odra::event]
pub struct BeneficiaryRegistered {
    pub beneficiary_id: u64,
    pub payout_address: Address,
}

#[odra::event]
pub struct BeneficiaryUpdated {
    pub beneficiary_id: u64,
    pub approved: bool,
    pub payout_address: Address,
}

// ========== Wrapped native asset ==========

#[odra::event]
pub struct Transfer {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub amount: U256,
}

#[odra::event]
pub struct Approval {
    pub owner: Address,
    pub spender: Address,
    pub amount: U256,
}

#[odra::event]
pub struct Wrapped {
    pub account: Address,
    pub amount: U256,
}

#[odra::event]
pub struct Unwrapped {
    pub account: Address,
    pub amount: U256,
}

// ========== Adapter ==========

#[odra::event]
pub struct Invested {
    pub amount: U256,
    pub invested: U256,
}

#[odra::event]
pub struct Divested {
    pub requested: U256,
    pub returned: U256,
    pub penalty: U256,
}

#[odra::event]
pub struct YieldRealized {
    pub yield_amount: U256,
    pub fee_component: U256,
    pub loss_amount: U256,
}

#[odra::event]
pub struct EmergencyExited {
    pub returned: U256,
}

#[odra::event]
pub struct Rearmed {
    pub vault: Address,
}

#[odra::event]
pub struct LossReported {
    pub amount: U256,
}

#[odra::event]
pub struct FeesCollected {
    pub recipient: Address,
    pub amount: U256,
}

// ========== Vault ==========

#[odra::event]
pub struct Deposited {
    pub sender: Address,
    pub owner: Address,
    pub assets: U256,
    pub shares: U256,
}

#[odra::event]
pub struct Withdrawn {
    pub sender: Address,
    pub receiver: Address,
    pub owner: Address,
    pub assets: U256,
    pub shares: U256,
}

#[odra::event]
pub struct Swept {
    pub adapter_id: u64,
    pub amount: U256,
}

#[odra::event]
pub struct BufferRefilled {
    pub adapter_id: u64,
    pub requested: U256,
    pub returned: U256,
}

#[odra::event]
pub struct Harvested {
    pub adapter_id: u64,
    pub yield_amount: U256,
    pub loss_amount: U256,
    pub donated: U256,
    pub retained: U256,
}

#[odra::event]
pub struct AdapterRegistered {
    pub adapter_id: u64,
    pub adapter: Address,
}

#[odra::event]
pub struct AdapterStatusChanged {
    pub adapter_id: u64,
    pub status: AdapterStatus,
}

#[odra::event]
pub struct ActiveAdapterChanged {
    pub previous: Option<u64>,
    pub current: u64,
}

#[odra::event]
pub struct AdapterImpaired {
    pub adapter_id: u64,
    pub loss_amount: U256,
    pub tracked: U256,
}

#[odra::event]
pub struct EmergencyWithdrawal {
    pub adapter_id: u64,
    pub returned: U256,
    pub realized_loss: U256,
}

#[odra::event]
pub struct ParametersUpdated {
    pub cash_buffer_bps: u32,
    pub slippage_bps: u32,
    pub max_loss_bps: u32,
    pub rebalance_threshold: U256,
}

#[odra::event]
pub struct RiskConfigUpdated {
    pub max_deposit: U256,
    pub deposit_cap_bps: u32,
}

#[odra::event]
pub struct DonationRouterSet {
    pub router: Address,
}

#[odra::event]
pub struct Paused {
    pub by: Address,
}

#[odra::event]
pub struct Unpaused {
    pub by: Address,
}

#[odra::event]
pub struct Halted {
    pub by: Address,
}

#[odra::event]
pub struct Resumed {
    pub by: Address,
}

// ========== Donation router ==========

#[odra::event]
pub struct YieldRouted {
    pub vault: Address,
    pub harvested: U256,
    pub fee: U256,
    pub donated: U256,
    pub dust: U256,
}

#[odra::event]
pub struct BeneficiaryPaid {
    pub vault: Address,
    pub beneficiary_id: u64,
    pub payout_address: Address,
    pub amount: U256,
}

#[odra::event]
pub struct AuthorizedCallerSet {
    pub vault: Address,
    pub authorized: bool,
}

#[odra::event]
pub struct DonationConfigSet {
    pub vault: Address,
    pub fee_bps: u32,
    pub allocation_count: u32,
}
