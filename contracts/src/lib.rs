//! CSPR Yield-Donation Vault Contracts
//!
//! Casper-native vault protocol: depositors keep their principal and the
//! strategy yield is split between compounding and approved beneficiaries.
//!
//! ## Architecture
//!
//! - **Vault**: CEP-18 share token with a CEP-4626 style deposit/withdraw surface
//! - **StrategyOrchestrator**: Adapter selection, buffer sweep/refill, loss guards
//! - **StrategyAdapter**: Yield strategy holding the invested principal
//! - **DonationRouter**: Splits harvested yield into fee, beneficiaries and treasury dust
//! - **RiskGuard**: Pure cap and collateral checks
//! - **AccessControl**: Role registry consulted by every contract
//! - **BeneficiaryRegistry**: Approved beneficiary directory
//! - **WrappedNative (wCSPR)**: 1:1 CEP-18 wrapper for native CSPR
//!
//! ## Flow
//!
//! ```text
//! depositor --deposit--> Vault --sweep--> Adapter
//! operator  --harvest--> Vault --donation--> DonationRouter --> beneficiaries
//! ```

#![cfg_attr(target_arch = "wasm32", no_std)]

#[cfg(target_arch = "wasm32")]
extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod types;
pub mod errors;
pub mod events;
pub mod interfaces;
pub mod math;
pub mod interest;
pub mod risk_guard;

// Contract modules
pub mod access_control;
pub mod beneficiary_registry;
pub mod wrapped_native;
pub mod adapter;
pub mod orchestrator;
pub mod donation_router;
pub mod vault;
