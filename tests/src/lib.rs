//! CSPR Yield Vault Integration Tests
//!
//! End-to-end flows across the vault, adapters, donation router and the
//! shared access control contract, run on the Odra VM.

#[cfg(test)]
mod fixtures {
    use cspr_yield_vault_contracts::access_control::{
        AccessControl, AccessControlHostRef, AccessControlInitArgs, ROLE_DONATION_RECORDER,
        ROLE_PAUSER, ROLE_VAULT_MANAGER,
    };
    use cspr_yield_vault_contracts::adapter::{StrategyAdapter, StrategyAdapterHostRef, StrategyAdapterInitArgs};
    use cspr_yield_vault_contracts::beneficiary_registry::{
        BeneficiaryRegistry, BeneficiaryRegistryHostRef, BeneficiaryRegistryInitArgs,
    };
    use cspr_yield_vault_contracts::donation_router::{DonationRouter, DonationRouterHostRef, DonationRouterInitArgs};
    use cspr_yield_vault_contracts::risk_guard::RiskConfig;
    use cspr_yield_vault_contracts::types::{AdapterKind, StrategyParams, VaultParameters};
    use cspr_yield_vault_contracts::vault::{Vault, VaultHostRef, VaultInitArgs};
    use cspr_yield_vault_contracts::wrapped_native::{WrappedNative, WrappedNativeHostRef};
    use odra::casper_types::{U256, U512};
    use odra::host::{Deployer, HostEnv, HostRef, NoArgs};
    use odra::prelude::*;

    pub fn u(v: u64) -> U256 {
        U256::from(v)
    }

    pub fn params(cash_buffer_bps: u32, slippage_bps: u32, max_loss_bps: u32) -> VaultParameters {
        VaultParameters {
            cash_buffer_bps,
            slippage_bps,
            max_loss_bps,
            rebalance_threshold: U256::zero(),
        }
    }

    /// Every contract wired the way the deploy script wires them.
    ///
    /// Account 0 is the admin, 1 the vault manager, 2 the pauser, 3 the
    /// adapter operator. Accounts 4 and 5 are depositors.
    pub struct Protocol {
        pub env: HostEnv,
        pub admin: Address,
        pub manager: Address,
        pub pauser: Address,
        pub operator: Address,
        pub alice: Address,
        pub bob: Address,
        pub acl: AccessControlHostRef,
        pub registry: BeneficiaryRegistryHostRef,
        pub token: WrappedNativeHostRef,
        pub vault: VaultHostRef,
        pub router: DonationRouterHostRef,
    }

    impl Protocol {
        pub fn deploy(params: VaultParameters) -> Self {
            Self::deploy_with(params, RiskConfig::uncapped(), true)
        }

        pub fn deploy_with(params: VaultParameters, risk_config: RiskConfig, native_wrapped: bool) -> Self {
            let env = odra_test::env();
            let admin = env.get_account(0);
            let manager = env.get_account(1);
            let pauser = env.get_account(2);
            let operator = env.get_account(3);

            env.set_caller(admin);
            let mut acl = AccessControl::deploy(&env, AccessControlInitArgs { initial_admin: admin });
            let acl_address = acl.address().clone();
            let registry = BeneficiaryRegistry::deploy(
                &env,
                BeneficiaryRegistryInitArgs { access_control: acl_address },
            );
            let token = WrappedNative::deploy(&env, NoArgs);
            let vault = Vault::deploy(
                &env,
                VaultInitArgs {
                    name: "CSPR Yield Vault".to_string(),
                    symbol: "yvCSPR".to_string(),
                    asset: token.address().clone(),
                    native_wrapped,
                    access_control: acl_address,
                    params,
                    risk_config,
                },
            );
            let router = DonationRouter::deploy(
                &env,
                DonationRouterInitArgs {
                    access_control: acl_address,
                    directory: registry.address().clone(),
                },
            );

            acl.grant_role(ROLE_VAULT_MANAGER, manager);
            acl.grant_role(ROLE_PAUSER, pauser);

            Protocol {
                alice: env.get_account(4),
                bob: env.get_account(5),
                env,
                admin,
                manager,
                pauser,
                operator,
                acl,
                registry,
                token,
                vault,
                router,
            }
        }

        /// Deploy an adapter bound to the vault, register and approve it.
        pub fn add_adapter(&mut self, kind: AdapterKind, params: StrategyParams) -> (u64, StrategyAdapterHostRef) {
            self.env.set_caller(self.admin);
            let adapter = StrategyAdapter::deploy(
                &self.env,
                StrategyAdapterInitArgs {
                    asset: self.token.address().clone(),
                    vault: self.vault.address().clone(),
                    operator: self.operator,
                    kind,
                    params,
                },
            );
            self.env.set_caller(self.manager);
            let id = self.vault.register_adapter(adapter.address().clone());
            self.vault.set_adapter_approval(id, true);
            (id, adapter)
        }

        /// `add_adapter`, then make it the active adapter.
        pub fn activate(&mut self, kind: AdapterKind, params: StrategyParams) -> (u64, StrategyAdapterHostRef) {
            let (id, adapter) = self.add_adapter(kind, params);
            self.env.set_caller(self.manager);
            self.vault.set_active_adapter(id);
            (id, adapter)
        }

        /// Wrap native CSPR into wCSPR for `who`.
        pub fn fund(&mut self, who: Address, amount: u64) {
            self.env.set_caller(who);
            self.token.with_tokens(U512::from(amount)).deposit();
        }

        /// Fund `who`, approve the vault and deposit for themselves.
        pub fn deposit(&mut self, who: Address, amount: u64) -> U256 {
            self.fund(who, amount);
            self.env.set_caller(who);
            self.token.approve(self.vault.address().clone(), u(amount));
            self.vault.deposit(u(amount), who)
        }

        /// Send extra wCSPR to an adapter so its booked yield is backed.
        pub fn back_yield(&mut self, adapter: &StrategyAdapterHostRef, amount: u64) {
            let funder = self.env.get_account(9);
            self.fund(funder, amount);
            self.env.set_caller(funder);
            self.token.transfer(adapter.address().clone(), u(amount));
        }

        /// Admin grants the vault the recorder role and points it at the router.
        pub fn enable_donations(&mut self) {
            self.env.set_caller(self.admin);
            let vault = self.vault.address().clone();
            self.acl.grant_role(ROLE_DONATION_RECORDER, vault);
            self.router.set_authorized_caller(vault, true);
            self.vault.set_donation_router(self.router.address().clone());
        }
    }
}

#[cfg(test)]
mod vault_flow_tests {
    use super::fixtures::*;
    use cspr_yield_vault_contracts::errors::VaultError;
    use cspr_yield_vault_contracts::interest::MILLIS_PER_YEAR;
    use cspr_yield_vault_contracts::types::{AdapterKind, AdapterStatus, StrategyParams};
    use odra::casper_types::U256;
    use odra::host::HostRef;
    use odra::prelude::Addressable;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deposit_keeps_cash_buffer_and_sweeps_rest() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let (id, adapter) = p.activate(AdapterKind::Manual, StrategyParams::default());

        let alice = p.alice;
        let shares = p.deposit(alice, 1_000);

        assert_eq!(shares, u(1_000));
        assert_eq!(p.vault.buffer_balance(), u(10));
        assert_eq!(p.vault.total_invested(), u(990));
        assert_eq!(p.vault.total_assets(), u(1_000));
        assert_eq!(adapter.invested(), u(990));
        assert_eq!(p.token.balance_of(adapter.address().clone()), u(990));
        assert_eq!(p.vault.adapter(id).map(|r| r.invested), Some(u(990)));
        assert!(p.env.emitted(&p.vault, "Swept"));
        assert!(p.env.emitted(&p.vault, "Deposited"));
    }

    #[test]
    fn test_deposit_without_active_adapter_stays_in_buffer() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let alice = p.alice;
        p.deposit(alice, 500);

        assert_eq!(p.vault.buffer_balance(), u(500));
        assert_eq!(p.vault.total_invested(), U256::zero());
    }

    #[test]
    fn test_zero_deposit_rejected() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let alice = p.alice;
        p.env.set_caller(alice);
        assert_eq!(p.vault.try_deposit(U256::zero(), alice), Err(VaultError::ZeroAmount.into()));
    }

    #[test]
    fn test_harvest_splits_yield_and_compounds_dust() {
        let mut p = Protocol::deploy(params(0, 100, 200));
        let (_, adapter) = p.activate(
            AdapterKind::MoneyMarket,
            StrategyParams { rate_bps: 1_000, ..Default::default() },
        );
        let charity = p.env.get_account(6);
        let fee_recipient = p.env.get_account(7);
        let treasury = p.env.get_account(8);

        p.env.set_caller(p.admin);
        let charity_id = p.registry.register("Food Bank".to_string(), charity);
        let treasury_id = p.registry.register("Treasury".to_string(), treasury);
        p.enable_donations();
        let vault_address = p.vault.address().clone();
        p.router.set_donation_config(
            vault_address,
            250,
            fee_recipient,
            treasury_id,
            vec![cspr_yield_vault_contracts::types::Allocation {
                beneficiary_id: charity_id,
                allocation_bps: 7_500,
            }],
        );

        let alice = p.alice;
        p.deposit(alice, 1_000);
        p.back_yield(&adapter, 100);
        p.env.advance_block_time(MILLIS_PER_YEAR);

        p.env.set_caller(p.manager);
        let outcome = p.vault.harvest();

        assert_eq!(outcome.yield_amount, u(100));
        assert_eq!(outcome.donated, u(75));
        assert_eq!(outcome.retained, u(25));
        assert!(!outcome.impaired);
        assert_eq!(p.token.balance_of(fee_recipient), u(2));
        assert_eq!(p.token.balance_of(charity), u(73));
        assert_eq!(p.vault.total_assets(), u(1_025));
        assert_eq!(p.router.beneficiary_total(charity_id), u(73));
        assert_eq!(p.router.treasury_total(treasury_id), u(2));
        assert_eq!(p.router.vault_total(vault_address), u(75));
        assert!(p.env.emitted(&p.router, "YieldRouted"));
        assert!(p.env.emitted(&p.vault, "Harvested"));
    }

    #[test]
    fn test_harvest_without_router_compounds_everything() {
        let mut p = Protocol::deploy(params(0, 100, 200));
        let (_, adapter) = p.activate(
            AdapterKind::MoneyMarket,
            StrategyParams { rate_bps: 1_000, ..Default::default() },
        );
        let alice = p.alice;
        p.deposit(alice, 1_000);
        p.back_yield(&adapter, 100);
        let price_before = p.vault.assets_per_share();
        p.env.advance_block_time(MILLIS_PER_YEAR);

        p.env.set_caller(p.manager);
        let outcome = p.vault.harvest();

        assert_eq!(outcome.donated, U256::zero());
        assert_eq!(outcome.retained, u(100));
        assert_eq!(p.vault.total_assets(), u(1_100));
        assert!(p.vault.assets_per_share() > price_before);
    }

    #[test]
    fn test_rotation_drains_outgoing_before_sweep() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let (a_id, a) = p.activate(AdapterKind::Manual, StrategyParams::default());
        let (b_id, b) = p.add_adapter(AdapterKind::Manual, StrategyParams::default());
        let alice = p.alice;
        p.deposit(alice, 1_000);
        assert_eq!(a.invested(), u(990));

        p.env.set_caller(p.manager);
        p.vault.set_active_adapter(b_id);

        assert_eq!(a.invested(), U256::zero());
        assert_eq!(p.token.balance_of(a.address().clone()), U256::zero());
        assert_eq!(b.invested(), u(990));
        assert_eq!(p.vault.buffer_balance(), u(10));
        assert_eq!(p.vault.total_assets(), u(1_000));
        assert_eq!(p.vault.adapter(a_id).map(|r| r.status), Some(AdapterStatus::Divesting));
        assert_eq!(p.vault.adapter(b_id).map(|r| r.status), Some(AdapterStatus::Active));
        assert_eq!(p.vault.strategy_config().active_adapter_id, Some(b_id));
        assert!(p.env.emitted(&p.vault, "ActiveAdapterChanged"));
    }

    #[test]
    fn test_rotation_to_unapproved_adapter_rejected() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        p.activate(AdapterKind::Manual, StrategyParams::default());
        let (b_id, _) = p.add_adapter(AdapterKind::Manual, StrategyParams::default());

        p.env.set_caller(p.manager);
        p.vault.set_adapter_approval(b_id, false);
        assert_eq!(p.vault.try_set_active_adapter(b_id), Err(VaultError::AdapterNotApproved.into()));
    }

    #[test]
    fn test_withdraw_beyond_liquidity_reverts_without_side_effects() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let (_, mut adapter) = p.activate(AdapterKind::Manual, StrategyParams::default());
        let alice = p.alice;
        p.deposit(alice, 1_000);

        p.env.set_caller(p.operator);
        adapter.set_liquidity_cap(Some(u(500)));

        p.env.set_caller(alice);
        assert_eq!(
            p.vault.try_redeem(u(1_000), alice, alice),
            Err(VaultError::InvestSlippage.into())
        );
        assert_eq!(p.vault.balance_of(alice), u(1_000));
        assert_eq!(p.vault.total_supply(), u(1_000));
        assert_eq!(p.token.balance_of(alice), U256::zero());
        assert_eq!(p.vault.buffer_balance(), u(10));
        assert_eq!(adapter.invested(), u(990));
    }

    #[test]
    fn test_liquidity_capped_withdrawal_does_not_shift_value() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let (_, mut adapter) = p.activate(AdapterKind::Manual, StrategyParams::default());
        let alice = p.alice;
        let bob = p.bob;
        p.deposit(alice, 1_000);
        p.deposit(bob, 1_000);
        assert_eq!(p.vault.buffer_balance(), u(20));

        p.env.set_caller(p.operator);
        adapter.set_liquidity_cap(Some(u(975)));

        // the adapter could only exit 975 of the 980 deficit
        p.env.set_caller(alice);
        assert_eq!(
            p.vault.try_withdraw(u(1_000), alice, alice),
            Err(VaultError::InsufficientLiquidity.into())
        );
        assert_eq!(p.vault.balance_of(alice), u(1_000));
        assert_eq!(p.vault.max_withdraw(alice), u(995));

        p.vault.withdraw(u(995), alice, alice);
        assert_eq!(p.token.balance_of(alice), u(995));
        assert_eq!(p.vault.balance_of(alice), u(5));
        let bob_shares = p.vault.balance_of(bob);
        assert_eq!(p.vault.convert_to_assets(bob_shares), u(1_000));
        assert_eq!(adapter.invested(), u(1_005));
    }

    #[test]
    fn test_withdraw_from_buffer_does_not_touch_adapter() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let (_, adapter) = p.activate(AdapterKind::Manual, StrategyParams::default());
        let alice = p.alice;
        p.deposit(alice, 1_000);

        p.env.set_caller(alice);
        p.vault.withdraw(u(10), alice, alice);

        assert_eq!(p.token.balance_of(alice), u(10));
        assert_eq!(p.vault.buffer_balance(), U256::zero());
        assert_eq!(adapter.invested(), u(990));
    }

    #[test]
    fn test_redeem_on_behalf_requires_allowance() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let alice = p.alice;
        let bob = p.bob;
        p.deposit(alice, 100);

        p.env.set_caller(bob);
        assert_eq!(
            p.vault.try_redeem(u(50), bob, alice),
            Err(VaultError::InsufficientAllowance.into())
        );

        p.env.set_caller(alice);
        p.vault.approve(bob, u(50));
        p.env.set_caller(bob);
        assert_eq!(p.vault.redeem(u(50), bob, alice), u(50));
        assert_eq!(p.vault.allowance(alice, bob), U256::zero());
        assert_eq!(p.token.balance_of(bob), u(50));
    }

    #[test]
    fn test_fixed_term_slippage_boundary() {
        let maturity_offset = MILLIS_PER_YEAR;

        // penalty exactly at the slippage tolerance passes
        let mut p = Protocol::deploy(params(0, 100, 200));
        let maturity = p.env.block_time() + maturity_offset;
        p.activate(
            AdapterKind::FixedTerm,
            StrategyParams { maturity, early_exit_bps: 100, ..Default::default() },
        );
        let alice = p.alice;
        p.deposit(alice, 10_000);
        p.env.set_caller(alice);
        assert_eq!(p.vault.redeem(u(10_000), alice, alice), u(9_900));

        // one bp over reverts
        let mut p = Protocol::deploy(params(0, 100, 200));
        let maturity = p.env.block_time() + maturity_offset;
        p.activate(
            AdapterKind::FixedTerm,
            StrategyParams { maturity, early_exit_bps: 101, ..Default::default() },
        );
        let alice = p.alice;
        p.deposit(alice, 10_000);
        p.env.set_caller(alice);
        assert_eq!(
            p.vault.try_redeem(u(10_000), alice, alice),
            Err(VaultError::InvestSlippage.into())
        );
    }

    #[test]
    fn test_rebalance_refills_buffer() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let (_, adapter) = p.activate(AdapterKind::Manual, StrategyParams::default());
        let alice = p.alice;
        p.deposit(alice, 1_000);

        p.env.set_caller(alice);
        p.vault.withdraw(u(8), alice, alice);
        assert_eq!(p.vault.buffer_balance(), u(2));

        p.env.set_caller(p.manager);
        p.vault.rebalance();

        // target is 1% of 992
        assert_eq!(p.vault.buffer_balance(), u(9));
        assert_eq!(adapter.invested(), u(983));
        assert!(p.env.emitted(&p.vault, "BufferRefilled"));
    }

    #[test]
    fn test_share_price_never_drops_on_deposit_or_withdraw() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let (_, adapter) = p.activate(
            AdapterKind::MoneyMarket,
            StrategyParams { rate_bps: 500, ..Default::default() },
        );
        let alice = p.alice;
        let bob = p.bob;
        p.deposit(alice, 10_000);
        p.back_yield(&adapter, 1_000);
        p.env.advance_block_time(MILLIS_PER_YEAR / 2);
        p.env.set_caller(p.manager);
        p.vault.harvest();

        let mut price = p.vault.assets_per_share();
        p.deposit(bob, 3_333);
        assert!(p.vault.assets_per_share() >= price);
        price = p.vault.assets_per_share();

        p.env.set_caller(bob);
        let bob_shares = p.vault.balance_of(bob);
        p.vault.redeem(bob_shares, bob, bob);
        assert!(p.vault.assets_per_share() >= price);
        price = p.vault.assets_per_share();

        p.env.set_caller(alice);
        p.vault.withdraw(u(1_234), alice, alice);
        assert!(p.vault.assets_per_share() >= price);
    }
}

#[cfg(test)]
mod guard_tests {
    use super::fixtures::*;
    use cspr_yield_vault_contracts::errors::VaultError;
    use cspr_yield_vault_contracts::risk_guard::RiskConfig;
    use cspr_yield_vault_contracts::types::{AdapterKind, AdapterStatus, StrategyParams};
    use odra::casper_types::{U256, U512};
    use odra::host::HostRef;
    use odra::prelude::Addressable;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deposit_cap_enforced() {
        let risk = RiskConfig { max_deposit: u(1_000), ..RiskConfig::uncapped() };
        let mut p = Protocol::deploy_with(params(100, 100, 200), risk, true);
        let alice = p.alice;
        p.deposit(alice, 600);
        assert_eq!(p.vault.max_deposit(alice), u(400));

        p.fund(alice, 401);
        p.env.set_caller(alice);
        p.token.approve(p.vault.address().clone(), u(401));
        assert_eq!(p.vault.try_deposit(u(401), alice), Err(VaultError::CapExceeded.into()));
        p.vault.deposit(u(400), alice);
        assert_eq!(p.vault.max_deposit(alice), U256::zero());
    }

    #[test]
    fn test_risk_config_admin_only() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let risk = RiskConfig { max_deposit: u(10), ..RiskConfig::uncapped() };

        p.env.set_caller(p.manager);
        assert_eq!(p.vault.try_set_risk_config(risk.clone()), Err(VaultError::Unauthorized.into()));

        p.env.set_caller(p.admin);
        p.vault.set_risk_config(risk);
        assert_eq!(p.vault.risk_config().max_deposit, u(10));
    }

    #[test]
    fn test_loss_over_guard_impairs_adapter_until_reapproved() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let (id, mut adapter) = p.activate(AdapterKind::Manual, StrategyParams::default());
        let alice = p.alice;
        p.deposit(alice, 1_000);

        p.env.set_caller(p.operator);
        adapter.report_loss(u(50));

        p.env.set_caller(p.manager);
        let outcome = p.vault.harvest();
        assert!(outcome.impaired);
        assert_eq!(outcome.loss_amount, u(50));
        assert_eq!(p.vault.adapter(id).map(|r| r.status), Some(AdapterStatus::Impaired));
        // nothing booked while impaired
        assert_eq!(p.vault.total_assets(), u(1_000));
        assert!(p.env.emitted(&p.vault, "AdapterImpaired"));

        assert_eq!(p.vault.try_harvest(), Err(VaultError::AdapterImpaired.into()));
        assert_eq!(p.vault.max_deposit(alice), U256::zero());
        p.fund(alice, 100);
        p.env.set_caller(alice);
        p.token.approve(p.vault.address().clone(), u(100));
        assert_eq!(p.vault.try_deposit(u(100), alice), Err(VaultError::AdapterImpaired.into()));

        p.env.set_caller(p.manager);
        p.vault.set_adapter_approval(id, true);
        assert_eq!(p.vault.adapter(id).map(|r| r.status), Some(AdapterStatus::Active));
        assert_eq!(p.vault.total_assets(), u(950));

        p.env.set_caller(alice);
        p.vault.deposit(u(100), alice);
        assert_eq!(p.vault.total_assets(), u(1_050));
    }

    #[test]
    fn test_impaired_adapter_serves_withdrawals_from_buffer_only() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let (_, mut adapter) = p.activate(AdapterKind::Manual, StrategyParams::default());
        let alice = p.alice;
        p.deposit(alice, 1_000);

        p.env.set_caller(p.operator);
        adapter.report_loss(u(50));
        p.env.set_caller(p.manager);
        assert!(p.vault.harvest().impaired);
        assert_eq!(p.vault.max_withdraw(alice), u(10));

        // the buffer pays at the pre-loss price
        p.env.set_caller(alice);
        p.vault.withdraw(u(10), alice, alice);
        assert_eq!(p.token.balance_of(alice), u(10));
        assert_eq!(
            p.vault.try_withdraw(u(1), alice, alice),
            Err(VaultError::InsufficientLiquidity.into())
        );
        assert_eq!(p.vault.max_withdraw(alice), U256::zero());
    }

    #[test]
    fn test_loss_within_guard_is_booked() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let (_, mut adapter) = p.activate(AdapterKind::Manual, StrategyParams::default());
        let alice = p.alice;
        p.deposit(alice, 1_000);

        p.env.set_caller(p.operator);
        adapter.report_loss(u(10));
        p.env.set_caller(p.manager);
        let outcome = p.vault.harvest();

        assert!(!outcome.impaired);
        assert_eq!(p.vault.total_assets(), u(990));
        assert_eq!(adapter.invested(), u(980));
    }

    #[test]
    fn test_approval_is_idempotent() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let (id, _) = p.add_adapter(AdapterKind::Manual, StrategyParams::default());

        p.env.set_caller(p.manager);
        p.vault.set_adapter_approval(id, true);
        p.vault.set_adapter_approval(id, true);

        let config = p.vault.strategy_config();
        assert_eq!(config.approved_adapter_ids, vec![id]);
        assert_eq!(p.vault.adapter(id).map(|r| r.status), Some(AdapterStatus::Approved));
    }

    #[test]
    fn test_active_adapter_cannot_lose_approval() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let (id, _) = p.activate(AdapterKind::Manual, StrategyParams::default());

        p.env.set_caller(p.manager);
        assert_eq!(p.vault.try_set_adapter_approval(id, false), Err(VaultError::AdapterActive.into()));
    }

    #[test]
    fn test_pause_blocks_deposits_only() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let alice = p.alice;
        p.deposit(alice, 100);

        p.env.set_caller(p.pauser);
        p.vault.pause();
        assert!(p.vault.is_paused());

        p.fund(alice, 10);
        p.env.set_caller(alice);
        p.token.approve(p.vault.address().clone(), u(10));
        assert_eq!(p.vault.try_deposit(u(10), alice), Err(VaultError::DepositsPaused.into()));
        assert_eq!(p.vault.max_deposit(alice), U256::zero());
        p.vault.withdraw(u(50), alice, alice);

        p.env.set_caller(p.pauser);
        p.vault.unpause();
        p.env.set_caller(alice);
        p.vault.deposit(u(10), alice);
    }

    #[test]
    fn test_halt_blocks_withdrawals() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let alice = p.alice;
        p.deposit(alice, 100);

        p.env.set_caller(p.pauser);
        p.vault.halt();

        p.env.set_caller(alice);
        assert_eq!(p.vault.try_withdraw(u(10), alice, alice), Err(VaultError::VaultHalted.into()));
        assert_eq!(p.vault.max_withdraw(alice), U256::zero());

        p.env.set_caller(p.pauser);
        p.vault.resume();
        p.env.set_caller(alice);
        p.vault.withdraw(u(10), alice, alice);
        assert_eq!(p.token.balance_of(alice), u(10));
    }

    #[test]
    fn test_operator_entry_points_require_roles() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let alice = p.alice;

        p.env.set_caller(alice);
        assert_eq!(p.vault.try_pause(), Err(VaultError::Unauthorized.into()));
        assert_eq!(p.vault.try_harvest(), Err(VaultError::Unauthorized.into()));
        assert_eq!(p.vault.try_rebalance(), Err(VaultError::Unauthorized.into()));
        assert_eq!(
            p.vault.try_update_vault_parameters(200, 100, 200),
            Err(VaultError::Unauthorized.into())
        );

        // the manager is not a pauser
        p.env.set_caller(p.manager);
        assert_eq!(p.vault.try_halt(), Err(VaultError::Unauthorized.into()));

        // admin satisfies every role
        p.env.set_caller(p.admin);
        p.vault.pause();
        p.vault.update_vault_parameters(200, 100, 200);
        assert_eq!(p.vault.strategy_config().cash_buffer_bps, 200);
    }

    #[test]
    fn test_emergency_withdraw_and_rearm() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let (id, adapter) = p.activate(AdapterKind::Manual, StrategyParams::default());
        let alice = p.alice;
        p.deposit(alice, 1_000);

        p.env.set_caller(p.pauser);
        p.vault.emergency_withdraw_adapter(id);

        assert_eq!(p.vault.buffer_balance(), u(1_000));
        assert_eq!(p.vault.total_invested(), U256::zero());
        assert_eq!(p.vault.strategy_config().active_adapter_id, None);
        assert_eq!(p.vault.adapter(id).map(|r| r.status), Some(AdapterStatus::Divesting));

        p.env.set_caller(p.manager);
        p.vault.set_adapter_approval(id, true);
        p.vault.set_active_adapter(id);
        assert_eq!(adapter.invested(), u(990));
        assert_eq!(p.vault.buffer_balance(), u(10));
    }

    #[test]
    fn test_retired_adapter_cannot_return() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let (id, _) = p.activate(AdapterKind::Manual, StrategyParams::default());
        let alice = p.alice;
        p.deposit(alice, 1_000);

        p.env.set_caller(p.manager);
        p.vault.retire_adapter(id);
        assert_eq!(p.vault.buffer_balance(), u(1_000));
        assert_eq!(p.vault.try_set_adapter_approval(id, true), Err(VaultError::AdapterRetired.into()));
    }

    #[test]
    fn test_native_deposit_and_withdraw() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        p.activate(AdapterKind::Manual, StrategyParams::default());
        let alice = p.alice;
        let bob = p.bob;

        p.env.set_caller(alice);
        let shares = p.vault.with_tokens(U512::from(1_000u64)).deposit_native(alice);
        assert_eq!(shares, u(1_000));
        assert_eq!(p.vault.total_assets(), u(1_000));
        assert_eq!(p.token.total_supply(), u(1_000));

        let before = p.env.balance_of(&bob);
        p.vault.withdraw_native(u(500), bob, alice);
        assert_eq!(p.env.balance_of(&bob), before + U512::from(500u64));
        assert_eq!(p.vault.balance_of(alice), u(500));
        assert_eq!(p.token.total_supply(), u(500));
    }

    #[test]
    fn test_native_pair_requires_wrapped_asset() {
        let mut p = Protocol::deploy_with(params(100, 100, 200), RiskConfig::uncapped(), false);
        let alice = p.alice;
        p.env.set_caller(alice);
        assert_eq!(
            p.vault.with_tokens(U512::from(10u64)).try_deposit_native(alice),
            Err(VaultError::NativeNotSupported.into())
        );
    }
}

#[cfg(test)]
mod donation_auth_tests {
    use super::fixtures::*;
    use cspr_yield_vault_contracts::errors::VaultError;
    use cspr_yield_vault_contracts::interest::MILLIS_PER_YEAR;
    use cspr_yield_vault_contracts::types::{AdapterKind, Allocation, StrategyParams};
    use odra::casper_types::U256;
    use odra::host::HostRef;
    use odra::prelude::Addressable;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_router_rejects_unknown_vault() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let alice = p.alice;
        p.env.set_caller(alice);
        assert_eq!(p.router.try_route_yield(u(100)), Err(VaultError::UnauthorizedVault.into()));
    }

    #[test]
    fn test_vault_without_recorder_role_cannot_route() {
        let mut p = Protocol::deploy(params(0, 100, 200));
        let (_, adapter) = p.activate(
            AdapterKind::MoneyMarket,
            StrategyParams { rate_bps: 1_000, ..Default::default() },
        );
        let charity = p.env.get_account(6);

        p.env.set_caller(p.admin);
        let charity_id = p.registry.register("Food Bank".to_string(), charity);
        let vault_address = p.vault.address().clone();
        p.router.set_authorized_caller(vault_address, true);
        p.router.set_donation_config(
            vault_address,
            0,
            p.admin,
            charity_id,
            vec![Allocation { beneficiary_id: charity_id, allocation_bps: 5_000 }],
        );
        p.vault.set_donation_router(p.router.address().clone());

        let alice = p.alice;
        p.deposit(alice, 1_000);
        p.back_yield(&adapter, 100);
        p.env.advance_block_time(MILLIS_PER_YEAR);

        p.env.set_caller(p.manager);
        assert_eq!(p.vault.try_harvest(), Err(VaultError::UnauthorizedVault.into()));
    }

    #[test]
    fn test_suspended_beneficiary_blocks_routing() {
        let mut p = Protocol::deploy(params(0, 100, 200));
        let (_, adapter) = p.activate(
            AdapterKind::MoneyMarket,
            StrategyParams { rate_bps: 1_000, ..Default::default() },
        );
        let charity = p.env.get_account(6);

        p.env.set_caller(p.admin);
        let charity_id = p.registry.register("Food Bank".to_string(), charity);
        p.enable_donations();
        let vault_address = p.vault.address().clone();
        p.router.set_donation_config(
            vault_address,
            0,
            p.admin,
            charity_id,
            vec![Allocation { beneficiary_id: charity_id, allocation_bps: 7_500 }],
        );
        p.registry.set_approved(charity_id, false);

        let alice = p.alice;
        p.deposit(alice, 1_000);
        p.back_yield(&adapter, 100);
        p.env.advance_block_time(MILLIS_PER_YEAR);

        p.env.set_caller(p.manager);
        assert_eq!(p.vault.try_harvest(), Err(VaultError::BeneficiaryNotApproved.into()));
        assert_eq!(p.token.balance_of(charity), U256::zero());
        assert_eq!(p.vault.total_assets(), u(1_000));
    }

    #[test]
    fn test_fixed_term_harvest_routes_before_maturity() {
        let mut p = Protocol::deploy(params(0, 100, 200));
        let maturity = p.env.block_time() + 2 * MILLIS_PER_YEAR;
        let (_, adapter) = p.activate(
            AdapterKind::FixedTerm,
            StrategyParams { rate_bps: 1_000, maturity, early_exit_bps: 100, ..Default::default() },
        );
        let charity = p.env.get_account(6);

        p.env.set_caller(p.admin);
        let charity_id = p.registry.register("Food Bank".to_string(), charity);
        p.enable_donations();
        let vault_address = p.vault.address().clone();
        p.router.set_donation_config(
            vault_address,
            0,
            p.admin,
            charity_id,
            vec![Allocation { beneficiary_id: charity_id, allocation_bps: 10_000 }],
        );

        let alice = p.alice;
        p.deposit(alice, 100_000);
        p.back_yield(&adapter, 10_000);
        p.env.advance_block_time(MILLIS_PER_YEAR);

        p.env.set_caller(p.manager);
        let outcome = p.vault.harvest();

        assert_eq!(outcome.yield_amount, u(10_000));
        assert_eq!(outcome.donated, u(10_000));
        assert_eq!(p.token.balance_of(charity), u(10_000));
        // 10_102 divested, 101 kept as early-exit penalty, 1 left over
        assert_eq!(adapter.invested(), u(99_898));
        assert_eq!(p.vault.buffer_balance(), u(1));
        assert_eq!(p.vault.total_assets(), u(99_899));
    }

    #[test]
    fn test_config_rejects_unapproved_beneficiary() {
        let mut p = Protocol::deploy(params(100, 100, 200));
        let charity = p.env.get_account(6);

        p.env.set_caller(p.admin);
        let charity_id = p.registry.register("Food Bank".to_string(), charity);
        p.registry.set_approved(charity_id, false);
        let vault_address = p.vault.address().clone();
        assert_eq!(
            p.router.try_set_donation_config(
                vault_address,
                0,
                p.admin,
                charity_id,
                vec![Allocation { beneficiary_id: charity_id, allocation_bps: 5_000 }],
            ),
            Err(VaultError::BeneficiaryNotApproved.into())
        );
    }
}
