//! Cross-contract interfaces used by the vault protocol.
//!
//! The vault, adapters and router only ever talk to each other through these
//! traits, so any contract exposing the same entry points can be plugged in.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::types::{AdapterKind, BeneficiaryRecord, HarvestReport, YieldSplit};

/// CEP-18 subset used to move the underlying asset
#[odra::external_contract]
pub trait AssetToken {
    fn balance_of(&self, address: Address) -> U256;
    fn transfer(&mut self, recipient: Address, amount: U256) -> bool;
    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool;
    fn approve(&mut self, spender: Address, amount: U256) -> bool;
}

/// wCSPR unwrap entry point (wrap is a payable call made through `CallDef`)
#[odra::external_contract]
pub trait NativeWrapper {
    fn withdraw(&mut self, amount: U256);
}

/// Yield strategy driven by exactly one vault
#[odra::external_contract]
pub trait YieldAdapter {
    fn invest(&mut self, assets: U256);
    fn divest(&mut self, assets: U256) -> U256;
    fn harvest(&mut self) -> HarvestReport;
    fn emergency_withdraw(&mut self) -> U256;
    fn rearm(&mut self);
    fn invested(&self) -> U256;
    fn gross_for(&self, assets: U256) -> U256;
    fn available_liquidity(&self) -> U256;
    fn asset(&self) -> Address;
    fn vault(&self) -> Address;
    fn kind(&self) -> AdapterKind;
}

/// Role membership lookup
#[odra::external_contract]
pub trait AccessOracle {
    fn has_role(&self, role_id: u8, account: Address) -> bool;
}

/// Beneficiary directory lookup
#[odra::external_contract]
pub trait BeneficiaryDirectory {
    fn resolve(&self, beneficiary_id: u64) -> Option<BeneficiaryRecord>;
}

/// Yield routing entry points called by a vault
#[odra::external_contract]
pub trait YieldRouter {
    fn quote_split(&self, vault: Address, harvested: U256) -> YieldSplit;
    fn route_yield(&mut self, harvested: U256) -> YieldSplit;
}

/// Anything that reports the asset it holds (vaults and adapters)
#[odra::external_contract]
pub trait YieldSource {
    fn asset(&self) -> Address;
}
