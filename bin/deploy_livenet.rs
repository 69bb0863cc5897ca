//! Deploy the vault protocol to Casper livenet/testnet using Odra livenet environment.
//!
//! Usage:
//!   cargo run --bin deploy_livenet --release
//!
//! Requires .env file with:
//!   ODRA_CASPER_LIVENET_SECRET_KEY_PATH=/path/to/secret_key.pem
//!   ODRA_CASPER_LIVENET_NODE_ADDRESS=https://node.testnet.casper.network
//!   ODRA_CASPER_LIVENET_CHAIN_NAME=casper-test
//!   ODRA_CASPER_LIVENET_PAYMENT_AMOUNT=200000000000
//!
//! Optional vault parameters:
//!   YIELD_VAULT_CASH_BUFFER_BPS=500
//!   YIELD_VAULT_SLIPPAGE_BPS=100
//!   YIELD_VAULT_MAX_LOSS_BPS=200
//!   YIELD_VAULT_RATE_BPS=500
//!   YIELD_VAULT_DONATION_FEE_BPS=200
//!   YIELD_VAULT_MANIFEST=deployment.json

use std::str::FromStr;

use odra::casper_types::U256;
use odra::host::{Deployer, NoArgs};
use odra::prelude::*;
use serde::Serialize;

use cspr_yield_vault_contracts::access_control::{
    AccessControl, AccessControlInitArgs, ROLE_DONATION_RECORDER, ROLE_PAUSER, ROLE_VAULT_MANAGER,
};
use cspr_yield_vault_contracts::adapter::{StrategyAdapter, StrategyAdapterInitArgs};
use cspr_yield_vault_contracts::beneficiary_registry::{BeneficiaryRegistry, BeneficiaryRegistryInitArgs};
use cspr_yield_vault_contracts::donation_router::{DonationRouter, DonationRouterInitArgs};
use cspr_yield_vault_contracts::risk_guard::RiskConfig;
use cspr_yield_vault_contracts::types::{AdapterKind, Allocation, StrategyParams, VaultParameters};
use cspr_yield_vault_contracts::vault::{Vault, VaultInitArgs};
use cspr_yield_vault_contracts::wrapped_native::WrappedNative;

#[derive(Debug, thiserror::Error)]
enum DeployError {
    #[error("{var} is not a valid number: {value}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("failed to encode deployment manifest: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("failed to write deployment manifest: {0}")]
    Io(#[from] std::io::Error),
}

/// Addresses written to the manifest file
#[derive(Serialize)]
struct DeploymentManifest {
    deployer: String,
    access_control: String,
    beneficiary_registry: String,
    wrapped_native: String,
    vault: String,
    adapter: String,
    donation_router: String,
    adapter_id: u64,
    treasury_beneficiary_id: u64,
}

fn env_or<T: FromStr>(var: &'static str, default: T) -> Result<T, DeployError> {
    match std::env::var(var) {
        Ok(value) => value
            .parse()
            .map_err(|_| DeployError::InvalidNumber { var, value }),
        Err(_) => Ok(default),
    }
}

fn display(address: &Address) -> String {
    format!("{:?}", address)
}

fn main() -> Result<(), DeployError> {
    // Load environment from .env file
    dotenv::dotenv().ok();

    println!("=== CSPR Yield Vault Livenet Deployment ===");
    println!();

    let env = odra_casper_livenet_env::env();

    // Configure payment amount for deployments/calls (required for Casper 2.0 txs)
    let payment_amount: u64 = env_or("ODRA_CASPER_LIVENET_PAYMENT_AMOUNT", 200_000_000_000)?;
    env.set_gas(payment_amount);

    let deployer = env.caller();
    println!("Deployer: {:?}", deployer);
    println!();

    let params = VaultParameters {
        cash_buffer_bps: env_or("YIELD_VAULT_CASH_BUFFER_BPS", 500)?,
        slippage_bps: env_or("YIELD_VAULT_SLIPPAGE_BPS", 100)?,
        max_loss_bps: env_or("YIELD_VAULT_MAX_LOSS_BPS", 200)?,
        rebalance_threshold: U256::zero(),
    };
    let rate_bps: u32 = env_or("YIELD_VAULT_RATE_BPS", 500)?;
    let donation_fee_bps: u32 = env_or("YIELD_VAULT_DONATION_FEE_BPS", 200)?;
    let manifest_path: String = env_or("YIELD_VAULT_MANIFEST", "deployment.json".to_string())?;

    // ==================== Phase 1: Independent Contracts ====================
    println!("=== Phase 1: Deploying Independent Contracts ===");
    println!();

    println!("Deploying AccessControl...");
    let mut access_control = AccessControl::deploy(
        &env,
        AccessControlInitArgs {
            initial_admin: deployer,
        },
    );
    let access_control_addr = access_control.address().clone();
    println!("AccessControl deployed at: {:?}", access_control_addr);

    println!("Deploying BeneficiaryRegistry...");
    let mut registry = BeneficiaryRegistry::deploy(
        &env,
        BeneficiaryRegistryInitArgs {
            access_control: access_control_addr,
        },
    );
    let registry_addr = registry.address().clone();
    println!("BeneficiaryRegistry deployed at: {:?}", registry_addr);

    println!("Deploying WrappedNative (wCSPR)...");
    let wcspr = WrappedNative::deploy(&env, NoArgs);
    let wcspr_addr = wcspr.address().clone();
    println!("WrappedNative deployed at: {:?}", wcspr_addr);

    println!();

    // ==================== Phase 2: Vault and Strategy ====================
    println!("=== Phase 2: Deploying Vault and Strategy ===");
    println!();

    println!("Deploying Vault...");
    let mut vault = Vault::deploy(
        &env,
        VaultInitArgs {
            name: "CSPR Yield Vault".to_string(),
            symbol: "yvCSPR".to_string(),
            asset: wcspr_addr,
            native_wrapped: true,
            access_control: access_control_addr,
            params,
            risk_config: RiskConfig::uncapped(),
        },
    );
    let vault_addr = vault.address().clone();
    println!("Vault deployed at: {:?}", vault_addr);

    println!("Deploying StrategyAdapter (money market)...");
    let adapter = StrategyAdapter::deploy(
        &env,
        StrategyAdapterInitArgs {
            asset: wcspr_addr,
            vault: vault_addr,
            operator: deployer,
            kind: AdapterKind::MoneyMarket,
            params: StrategyParams {
                rate_bps,
                ..Default::default()
            },
        },
    );
    let adapter_addr = adapter.address().clone();
    println!("StrategyAdapter deployed at: {:?}", adapter_addr);

    println!("Deploying DonationRouter...");
    let mut router = DonationRouter::deploy(
        &env,
        DonationRouterInitArgs {
            access_control: access_control_addr,
            directory: registry_addr,
        },
    );
    let router_addr = router.address().clone();
    println!("DonationRouter deployed at: {:?}", router_addr);

    println!();

    // ==================== Phase 3: Wiring ====================
    println!("=== Phase 3: Cross-contract Configuration ===");
    println!();

    println!("Granting operator roles...");
    access_control.grant_role(ROLE_VAULT_MANAGER, deployer);
    access_control.grant_role(ROLE_PAUSER, deployer);
    access_control.grant_role(ROLE_DONATION_RECORDER, vault_addr);
    println!("Done.");

    println!("Registering treasury beneficiary...");
    let treasury_id = registry.register("Protocol Treasury".to_string(), deployer);
    println!("Treasury beneficiary id: {}", treasury_id);

    println!("Configuring DonationRouter...");
    router.set_authorized_caller(vault_addr, true);
    router.set_donation_config(vault_addr, donation_fee_bps, deployer, treasury_id, Vec::<Allocation>::new());
    println!("Done.");

    println!("Configuring Vault...");
    vault.set_donation_router(router_addr);
    let adapter_id = vault.register_adapter(adapter_addr);
    vault.set_adapter_approval(adapter_id, true);
    vault.set_active_adapter(adapter_id);
    println!("Done.");

    let manifest = DeploymentManifest {
        deployer: display(&deployer),
        access_control: display(&access_control_addr),
        beneficiary_registry: display(&registry_addr),
        wrapped_native: display(&wcspr_addr),
        vault: display(&vault_addr),
        adapter: display(&adapter_addr),
        donation_router: display(&router_addr),
        adapter_id,
        treasury_beneficiary_id: treasury_id,
    };
    std::fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;

    println!();
    println!("=== Deployment Complete ===");
    println!();
    println!("Contract Addresses:");
    println!("  AccessControl:        {:?}", access_control_addr);
    println!("  BeneficiaryRegistry:  {:?}", registry_addr);
    println!("  WrappedNative:        {:?}", wcspr_addr);
    println!("  Vault:                {:?}", vault_addr);
    println!("  StrategyAdapter:      {:?}", adapter_addr);
    println!("  DonationRouter:       {:?}", router_addr);
    println!();
    println!("Manifest written to {}", manifest_path);
    Ok(())
}
