//! Donation Router Contract
//!
//! Splits yield harvested by a vault into:
//! 1. Protocol fee: `harvested * fee_bps / 10000`, paid first
//! 2. Beneficiary allocations: `remainder * allocation_bps / 10000` each,
//!    in registration order
//! 3. Dust: truncation plus any unallocated share, left in the vault to
//!    compound for depositors
//!
//! `fee + sum(allocations) + dust == harvested` holds for every input.
//!
//! The vault sends `fee + sum(allocations)` to the router before calling
//! `route_yield`; the router pays it out in the same transaction.

use odra::prelude::*;
use odra::ContractRef;
use odra::casper_types::U256;
use crate::access_control::{ROLE_ADMIN, ROLE_DONATION_RECORDER};
use crate::errors::VaultError;
use crate::events::{AuthorizedCallerSet, BeneficiaryPaid, DonationConfigSet, YieldRouted};
use crate::interfaces::{
    AccessOracleContractRef, AssetTokenContractRef, BeneficiaryDirectoryContractRef,
    YieldSourceContractRef,
};
use crate::math::{bps_of, is_valid_bps, BPS_SCALE};
use crate::types::{Allocation, BeneficiaryPayout, DonationConfig, YieldSplit};

/// Donation Router Contract
#[odra::module(events = [YieldRouted, BeneficiaryPaid, AuthorizedCallerSet, DonationConfigSet])]
pub struct DonationRouter {
    /// Access control contract address
    access_control: Var<Address>,
    /// Beneficiary directory address
    directory: Var<Address>,
    /// Vaults allowed to route yield
    authorized: Mapping<Address, bool>,
    /// Asset of each authorized vault
    vault_assets: Mapping<Address, Address>,
    /// Donation configuration per vault
    configs: Mapping<Address, DonationConfig>,
    /// Total paid to each beneficiary
    beneficiary_totals: Mapping<u64, U256>,
    /// Total fees accounted under each treasury id
    treasury_totals: Mapping<u64, U256>,
    /// Total donated (fee + beneficiaries) per vault
    vault_totals: Mapping<Address, U256>,
    /// Reentrancy lock around routing
    locked: Var<bool>,
}

#[odra::module]
impl DonationRouter {
    /// Initialize the router
    pub fn init(&mut self, access_control: Address, directory: Address) {
        self.access_control.set(access_control);
        self.directory.set(directory);
        self.locked.set(false);
    }

    // ========== Admin Functions ==========

    /// Allow or block a vault from routing yield (admin only)
    pub fn set_authorized_caller(&mut self, vault: Address, authorized: bool) {
        self.require_admin();
        if authorized {
            let asset = YieldSourceContractRef::new(self.env(), vault).asset();
            self.vault_assets.set(&vault, asset);
        }
        self.authorized.set(&vault, authorized);
        self.env().emit_event(AuthorizedCallerSet { vault, authorized });
    }

    /// Replace a vault's donation configuration (admin only)
    pub fn set_donation_config(
        &mut self,
        vault: Address,
        fee_bps: u32,
        fee_recipient: Address,
        treasury_id: u64,
        allocations: Vec<Allocation>,
    ) {
        self.require_admin();
        let config = DonationConfig { fee_bps, fee_recipient, treasury_id, allocations };
        validate_config(&config).unwrap_or_else(|e| self.env().revert(e));
        for allocation in config.allocations.iter() {
            self.require_approved(allocation.beneficiary_id);
        }

        self.env().emit_event(DonationConfigSet {
            vault,
            fee_bps,
            allocation_count: config.allocations.len() as u32,
        });
        self.configs.set(&vault, config);
    }

    // ========== Routing ==========

    /// Split preview for `harvested` under `vault`'s configuration.
    /// Without a configuration everything is dust.
    pub fn quote_split(&self, vault: Address, harvested: U256) -> YieldSplit {
        match self.configs.get(&vault) {
            Some(config) => compute_split(&config, harvested).unwrap_or_else(|e| self.env().revert(e)),
            None => undistributed(harvested),
        }
    }

    /// Pay out the fee and beneficiary shares of `harvested` for the calling
    /// vault. The vault must have transferred `fee + allocations` already.
    pub fn route_yield(&mut self, harvested: U256) -> YieldSplit {
        self.lock();
        let vault = self.env().caller();
        self.require_authorized_vault(vault);

        let config = match self.configs.get(&vault) {
            Some(config) => config,
            None => {
                self.unlock();
                return undistributed(harvested);
            }
        };

        let split = compute_split(&config, harvested).unwrap_or_else(|e| self.env().revert(e));
        if !split.is_conserved() {
            self.env().revert(VaultError::ConservationViolated);
        }

        let mut recipients = Vec::with_capacity(split.payouts.len());
        for payout in split.payouts.iter() {
            recipients.push(self.require_approved(payout.beneficiary_id));
        }

        // accounting before any transfer
        let donated = split.donated();
        if !split.fee.is_zero() {
            let treasury_total = self.treasury_total(config.treasury_id) + split.fee;
            self.treasury_totals.set(&config.treasury_id, treasury_total);
        }
        for payout in split.payouts.iter() {
            let total = self.beneficiary_total(payout.beneficiary_id) + payout.amount;
            self.beneficiary_totals.set(&payout.beneficiary_id, total);
        }
        self.vault_totals.set(&vault, self.vault_total(vault) + donated);

        let asset = self.vault_assets.get(&vault).unwrap_or_else(|| self.env().revert(VaultError::InvalidConfig));
        let mut token = AssetTokenContractRef::new(self.env(), asset);
        if !split.fee.is_zero() && !token.transfer(config.fee_recipient, split.fee) {
            self.env().revert(VaultError::InsufficientTokenBalance);
        }
        for (payout, recipient) in split.payouts.iter().zip(recipients) {
            if payout.amount.is_zero() {
                continue;
            }
            if !token.transfer(recipient, payout.amount) {
                self.env().revert(VaultError::InsufficientTokenBalance);
            }
            self.env().emit_event(BeneficiaryPaid {
                vault,
                beneficiary_id: payout.beneficiary_id,
                payout_address: recipient,
                amount: payout.amount,
            });
        }

        self.env().emit_event(YieldRouted {
            vault,
            harvested,
            fee: split.fee,
            donated,
            dust: split.dust,
        });
        self.unlock();
        split
    }

    // ========== View Functions ==========

    pub fn is_authorized(&self, vault: Address) -> bool {
        self.authorized.get(&vault).unwrap_or(false)
    }

    pub fn donation_config(&self, vault: Address) -> Option<DonationConfig> {
        self.configs.get(&vault)
    }

    pub fn beneficiary_total(&self, beneficiary_id: u64) -> U256 {
        self.beneficiary_totals.get(&beneficiary_id).unwrap_or(U256::zero())
    }

    pub fn treasury_total(&self, treasury_id: u64) -> U256 {
        self.treasury_totals.get(&treasury_id).unwrap_or(U256::zero())
    }

    pub fn vault_total(&self, vault: Address) -> U256 {
        self.vault_totals.get(&vault).unwrap_or(U256::zero())
    }

    // ========== Internal Functions ==========

    fn require_admin(&self) {
        if !self.has_role(ROLE_ADMIN, self.env().caller()) {
            self.env().revert(VaultError::Unauthorized);
        }
    }

    fn require_authorized_vault(&self, vault: Address) {
        if !self.is_authorized(vault) || !self.has_role(ROLE_DONATION_RECORDER, vault) {
            self.env().revert(VaultError::UnauthorizedVault);
        }
    }

    fn has_role(&self, role_id: u8, account: Address) -> bool {
        let access_control = self.access_control.get_or_revert_with(VaultError::InvalidConfig);
        AccessOracleContractRef::new(self.env(), access_control).has_role(role_id, account)
    }

    /// Payout address of an approved beneficiary
    fn require_approved(&self, beneficiary_id: u64) -> Address {
        let directory = self.directory.get_or_revert_with(VaultError::InvalidConfig);
        match BeneficiaryDirectoryContractRef::new(self.env(), directory).resolve(beneficiary_id) {
            Some(record) if record.approved => record.payout_address,
            _ => self.env().revert(VaultError::BeneficiaryNotApproved),
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

/// Fee and allocations must be basis points, allocations may not exceed
/// 100% in total and may not name a beneficiary twice.
pub fn validate_config(config: &DonationConfig) -> Result<(), VaultError> {
    if !is_valid_bps(config.fee_bps) {
        return Err(VaultError::InvalidConfig);
    }
    let mut total: u32 = 0;
    for (i, allocation) in config.allocations.iter().enumerate() {
        total = total
            .checked_add(allocation.allocation_bps)
            .ok_or(VaultError::InvalidConfig)?;
        let duplicate = config.allocations[..i]
            .iter()
            .any(|earlier| earlier.beneficiary_id == allocation.beneficiary_id);
        if duplicate {
            return Err(VaultError::InvalidConfig);
        }
    }
    if total > BPS_SCALE {
        return Err(VaultError::InvalidConfig);
    }
    Ok(())
}

/// Split `harvested` under `config`.
pub fn compute_split(config: &DonationConfig, harvested: U256) -> Result<YieldSplit, VaultError> {
    validate_config(config)?;

    let fee = bps_of(harvested, config.fee_bps);
    let remainder = harvested - fee;

    let payouts: Vec<BeneficiaryPayout> = config
        .allocations
        .iter()
        .map(|allocation| BeneficiaryPayout {
            beneficiary_id: allocation.beneficiary_id,
            amount: bps_of(remainder, allocation.allocation_bps),
        })
        .collect();
    let allocated = payouts.iter().fold(U256::zero(), |acc, p| acc + p.amount);
    let dust = remainder.checked_sub(allocated).ok_or(VaultError::ConservationViolated)?;

    Ok(YieldSplit { harvested, fee, payouts, dust })
}

fn undistributed(harvested: U256) -> YieldSplit {
    YieldSplit { harvested, dust: harvested, ..Default::default() }
}
