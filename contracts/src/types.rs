//! Common types used across the vault protocol.

use odra::prelude::*;
use odra::casper_types::U256;

/// Strategy variant, fixed when the adapter is deployed.
#[odra::odra_type]
#[derive(Copy)]
pub enum AdapterKind {
    /// Compounding money-market position accruing a variable APR
    MoneyMarket,
    /// Fixed-term position with a maturity and an early-exit penalty
    FixedTerm,
    /// Manually managed position; never reports yield
    Manual,
}

/// Vault-side lifecycle of a registered adapter.
#[odra::odra_type]
#[derive(Copy)]
pub enum AdapterStatus {
    /// Registered but not approved
    Uninitialized,
    /// Approved, may be activated
    Approved,
    /// Receives swept buffer excess
    Active,
    /// Drained (rotation or emergency); needs re-approval before reuse
    Divesting,
    /// Loss guard tripped; invest blocked until re-approval or retirement
    Impaired,
    /// Terminal
    Retired,
}

/// Adapter-side state of the invested position.
#[odra::odra_type]
#[derive(Copy)]
pub enum PositionState {
    /// Nothing invested yet
    Uninitialized,
    /// Capital deployed
    Invested,
    /// Capital partially or fully exited since the last invest
    Divesting,
    /// Emergency exit performed; invest and divest blocked until re-armed
    EmergencyExited,
}

/// Strategy parameters fixed at adapter deployment.
#[odra::odra_type]
#[derive(Default)]
pub struct StrategyParams {
    /// Annual yield rate in bps (MoneyMarket, FixedTerm)
    pub rate_bps: u32,
    /// Share of gross yield kept by the venue, in bps
    pub performance_fee_bps: u32,
    /// Maturity block time in milliseconds (FixedTerm; 0 = none)
    pub maturity: u64,
    /// Penalty on principal exited before maturity, in bps (FixedTerm)
    pub early_exit_bps: u32,
}

/// Result of an adapter harvest. No funds move with it.
#[odra::odra_type]
#[derive(Default)]
pub struct HarvestReport {
    /// Net yield folded into the position since the last harvest
    pub yield_amount: U256,
    /// Venue fee carved out of gross yield
    pub fee_component: U256,
    /// Principal lost since the last harvest
    pub loss_amount: U256,
}

/// Adapter record kept by the vault.
#[odra::odra_type]
pub struct AdapterRecord {
    /// Vault-local adapter id
    pub id: u64,
    /// Adapter contract address
    pub address: Address,
    /// Strategy variant
    pub kind: AdapterKind,
    /// Principal the vault has booked into this adapter
    pub invested: U256,
    /// Lifecycle status
    pub status: AdapterStatus,
}

/// Strategy configuration owned by the orchestrator.
#[odra::odra_type]
pub struct StrategyConfig {
    /// Target idle share of total assets, in bps
    pub cash_buffer_bps: u32,
    /// Maximum tolerated divest shortfall, in bps of the request
    pub slippage_bps: u32,
    /// Maximum tolerated realized loss, in bps of invested principal
    pub max_loss_bps: u32,
    /// Buffer excess (absolute) tolerated before a sweep
    pub rebalance_threshold: U256,
    /// Currently active adapter
    pub active_adapter_id: Option<u64>,
    /// Approved adapters, in approval order
    pub approved_adapter_ids: Vec<u64>,
}

/// Vault parameters supplied at construction.
#[odra::odra_type]
#[derive(Default)]
pub struct VaultParameters {
    /// Target idle share of total assets, in bps
    pub cash_buffer_bps: u32,
    /// Maximum tolerated divest shortfall, in bps
    pub slippage_bps: u32,
    /// Maximum tolerated realized loss, in bps
    pub max_loss_bps: u32,
    /// Buffer excess tolerated before a sweep
    pub rebalance_threshold: U256,
}

/// Vault-level result of a harvest.
#[odra::odra_type]
#[derive(Default)]
pub struct HarvestOutcome {
    /// Harvested adapter id
    pub adapter_id: u64,
    /// Net yield reported by the adapter
    pub yield_amount: U256,
    /// Venue fee reported by the adapter
    pub fee_component: U256,
    /// Loss reported by the adapter
    pub loss_amount: U256,
    /// Protocol fee plus beneficiary payouts
    pub donated: U256,
    /// Yield left to compound for depositors
    pub retained: U256,
    /// Whether the loss guard tripped
    pub impaired: bool,
}

/// Snapshot of the vault ledger.
#[odra::odra_type]
pub struct VaultStatus {
    /// Buffer plus tracked adapter principal
    pub total_assets: U256,
    /// Outstanding shares
    pub total_shares: U256,
    /// Idle assets held by the vault
    pub buffer_balance: U256,
    /// Principal booked into adapters
    pub total_invested: U256,
    /// Assets per share scaled by 1e18
    pub assets_per_share: U256,
    /// Deposits blocked
    pub paused: bool,
    /// All depositor operations blocked
    pub halted: bool,
    /// Active adapter
    pub active_adapter_id: Option<u64>,
}

/// Beneficiary share of harvested yield.
#[odra::odra_type]
#[derive(Copy)]
pub struct Allocation {
    /// Directory id of the beneficiary
    pub beneficiary_id: u64,
    /// Share of the post-fee remainder, in bps
    pub allocation_bps: u32,
}

/// Per-vault donation configuration.
#[odra::odra_type]
pub struct DonationConfig {
    /// Protocol fee in bps of harvested yield
    pub fee_bps: u32,
    /// Receiver of the protocol fee
    pub fee_recipient: Address,
    /// Treasury ledger the fee is accounted under
    pub treasury_id: u64,
    /// Beneficiary allocations, in registration order
    pub allocations: Vec<Allocation>,
}

/// Amount owed to one beneficiary.
#[odra::odra_type]
#[derive(Copy)]
pub struct BeneficiaryPayout {
    /// Directory id of the beneficiary
    pub beneficiary_id: u64,
    /// Amount allocated
    pub amount: U256,
}

/// How a harvested amount is divided.
#[odra::odra_type]
#[derive(Default)]
pub struct YieldSplit {
    /// Amount that was split
    pub harvested: U256,
    /// Protocol fee
    pub fee: U256,
    /// Beneficiary payouts, in registration order
    pub payouts: Vec<BeneficiaryPayout>,
    /// Remainder that compounds for depositors
    pub dust: U256,
}

impl YieldSplit {
    /// Sum of beneficiary payouts
    pub fn beneficiary_total(&self) -> U256 {
        self.payouts
            .iter()
            .fold(U256::zero(), |acc, payout| acc + payout.amount)
    }

    /// Amount leaving the vault: fee plus beneficiary payouts
    pub fn donated(&self) -> U256 {
        self.fee + self.beneficiary_total()
    }

    /// Whether fee + payouts + dust equals the harvested amount
    pub fn is_conserved(&self) -> bool {
        self.donated() + self.dust == self.harvested
    }
}

/// Directory entry returned by `resolve`.
#[odra::odra_type]
pub struct BeneficiaryRecord {
    /// Whether the beneficiary may receive allocations
    pub approved: bool,
    /// Where allocations are paid
    pub payout_address: Address,
    /// Display name
    pub name: String,
}
