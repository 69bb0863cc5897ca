//! Beneficiary directory.
//!
//! Maps beneficiary ids to an approval flag and payout address. The donation
//! router only reads it through `resolve`.

use odra::prelude::*;
use odra::ContractRef;
use crate::access_control::ROLE_ADMIN;
use crate::errors::VaultError;
use crate::events::{BeneficiaryRegistered, BeneficiaryUpdated};
use crate::interfaces::AccessOracleContractRef;
use crate::types::BeneficiaryRecord;

/// Beneficiary directory contract
#[odra::module(events = [BeneficiaryRegistered, BeneficiaryUpdated])]
pub struct BeneficiaryRegistry {
    /// Access control contract address
    access_control: Var<Address>,
    /// Beneficiaries by id (ids start at 1)
    beneficiaries: Mapping<u64, BeneficiaryRecord>,
    /// Number of registered beneficiaries
    count: Var<u64>,
}

#[odra::module]
impl BeneficiaryRegistry {
    /// Initialize the directory
    pub fn init(&mut self, access_control: Address) {
        self.access_control.set(access_control);
        self.count.set(0);
    }

    /// Register an approved beneficiary (admin only). Returns its id.
    pub fn register(&mut self, name: String, payout_address: Address) -> u64 {
        self.require_admin();

        let id = self.count.get_or_default() + 1;
        self.beneficiaries.set(&id, BeneficiaryRecord {
            approved: true,
            payout_address,
            name,
        });
        self.count.set(id);

        self.env().emit_event(BeneficiaryRegistered { beneficiary_id: id, payout_address });
        id
    }

    /// Approve or suspend a beneficiary (admin only)
    pub fn set_approved(&mut self, beneficiary_id: u64, approved: bool) {
        self.require_admin();
        let mut record = self.require_record(beneficiary_id);
        record.approved = approved;
        self.store(beneficiary_id, record);
    }

    /// Change where a beneficiary is paid (admin only)
    pub fn set_payout_address(&mut self, beneficiary_id: u64, payout_address: Address) {
        self.require_admin();
        let mut record = self.require_record(beneficiary_id);
        record.payout_address = payout_address;
        self.store(beneficiary_id, record);
    }

    /// Look up a beneficiary
    pub fn resolve(&self, beneficiary_id: u64) -> Option<BeneficiaryRecord> {
        self.beneficiaries.get(&beneficiary_id)
    }

    /// Number of registered beneficiaries
    pub fn count(&self) -> u64 {
        self.count.get_or_default()
    }

    fn require_record(&self, beneficiary_id: u64) -> BeneficiaryRecord {
        match self.beneficiaries.get(&beneficiary_id) {
            Some(record) => record,
            None => self.env().revert(VaultError::InvalidConfig),
        }
    }

    fn store(&mut self, beneficiary_id: u64, record: BeneficiaryRecord) {
        let event = BeneficiaryUpdated {
            beneficiary_id,
            approved: record.approved,
            payout_address: record.payout_address,
        };
        self.beneficiaries.set(&beneficiary_id, record);
        self.env().emit_event(event);
    }

    fn require_admin(&self) {
        let access_control = self.access_control.get_or_revert_with(VaultError::InvalidConfig);
        let oracle = AccessOracleContractRef::new(self.env(), access_control);
        if !oracle.has_role(ROLE_ADMIN, self.env().caller()) {
            self.env().revert(VaultError::Unauthorized);
        }
    }
}
