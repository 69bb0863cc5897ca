//! wCSPR Contract
//!
//! CEP-18 wrapper of the native currency. Attached CSPR is minted 1:1 and
//! burned tokens are paid back in CSPR, so a vault can hold the native
//! currency through the same token interface as any other asset.

use odra::prelude::*;
use odra::casper_types::{U256, Key};
use odra::casper_types::bytesrepr::ToBytes;
use crate::errors::VaultError;
use crate::events::{Approval, Transfer, Unwrapped, Wrapped};
use crate::math::{u256_to_u512, u512_to_u256};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

const TOKEN_NAME: &str = "Wrapped CSPR";
const TOKEN_SYMBOL: &str = "wCSPR";
/// Same as native motes
const DECIMALS: u8 = 9;
const CEP18_NAME_KEY: &str = "name";
const CEP18_SYMBOL_KEY: &str = "symbol";
const CEP18_DECIMALS_KEY: &str = "decimals";
const CEP18_TOTAL_SUPPLY_KEY: &str = "total_supply";
const CEP18_BALANCES_DICT: &str = "balances";
const CEP18_ALLOWANCES_DICT: &str = "allowances";

/// Wrapped native currency
#[odra::module(events = [Transfer, Approval, Wrapped, Unwrapped])]
pub struct WrappedNative {
    /// Total supply (equals CSPR held)
    total_supply: Var<U256>,
    /// Balance mapping
    balances: Mapping<Address, U256>,
    /// Allowance mapping (owner, spender) -> amount
    allowances: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl WrappedNative {
    /// Initialize the token
    pub fn init(&mut self) {
        self.total_supply.set(U256::zero());
        self.env().init_dictionary(CEP18_BALANCES_DICT);
        self.env().init_dictionary(CEP18_ALLOWANCES_DICT);
        self.env().set_named_value(CEP18_NAME_KEY, String::from(TOKEN_NAME));
        self.env().set_named_value(CEP18_SYMBOL_KEY, String::from(TOKEN_SYMBOL));
        self.env().set_named_value(CEP18_DECIMALS_KEY, DECIMALS);
        self.env().set_named_value(CEP18_TOTAL_SUPPLY_KEY, U256::zero());
    }

    // ========== CEP-18 Standard Functions ==========

    pub fn name(&self) -> String {
        String::from(TOKEN_NAME)
    }

    pub fn symbol(&self) -> String {
        String::from(TOKEN_SYMBOL)
    }

    pub fn decimals(&self) -> u8 {
        DECIMALS
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get().unwrap_or(U256::zero())
    }

    pub fn balance_of(&self, address: Address) -> U256 {
        self.balances.get(&address).unwrap_or(U256::zero())
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or(U256::zero())
    }

    /// Transfer tokens to recipient
    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        let sender = self.env().caller();
        self.transfer_internal(sender, recipient, amount);
        true
    }

    /// Approve spender to spend tokens
    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.approve_internal(owner, spender, amount);
        true
    }

    /// Transfer tokens from owner to recipient (requires allowance)
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        let spender = self.env().caller();

        let current_allowance = self.allowance(owner, spender);
        if current_allowance < amount {
            self.env().revert(VaultError::InsufficientAllowance);
        }

        self.transfer_internal(owner, recipient, amount);
        self.approve_internal(owner, spender, current_allowance - amount);
        true
    }

    // ========== Wrap / Unwrap ==========

    /// Wrap the attached CSPR 1:1 into wCSPR for the caller
    #[odra(payable)]
    pub fn deposit(&mut self) -> U256 {
        let amount = u512_to_u256(self.env().attached_value());
        if amount.is_zero() {
            self.env().revert(VaultError::ZeroAmount);
        }

        let caller = self.env().caller();
        self.mint_internal(caller, amount);
        self.env().emit_event(Wrapped { account: caller, amount });
        amount
    }

    /// Burn `amount` wCSPR from the caller and pay it out in CSPR
    pub fn withdraw(&mut self, amount: U256) {
        if amount.is_zero() {
            self.env().revert(VaultError::ZeroAmount);
        }

        let caller = self.env().caller();
        self.burn_internal(caller, amount);
        self.env().emit_event(Unwrapped { account: caller, amount });
        self.env().transfer_tokens(&caller, &u256_to_u512(amount));
    }

    // ========== Internal Functions ==========

    fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(VaultError::InsufficientTokenBalance);
        }

        let new_from_balance = from_balance - amount;
        self.balances.set(&from, new_from_balance);
        self.set_balance_cep18(from, new_from_balance);

        let new_to_balance = self.balance_of(to) + amount;
        self.balances.set(&to, new_to_balance);
        self.set_balance_cep18(to, new_to_balance);

        self.env().emit_event(Transfer { from: Some(from), to: Some(to), amount });
    }

    fn approve_internal(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.set(&(owner, spender), amount);
        self.set_allowance_cep18(owner, spender, amount);
        self.env().emit_event(Approval { owner, spender, amount });
    }

    fn mint_internal(&mut self, to: Address, amount: U256) {
        let new_balance = self.balance_of(to) + amount;
        self.balances.set(&to, new_balance);
        self.set_balance_cep18(to, new_balance);

        let new_supply = self.total_supply() + amount;
        self.total_supply.set(new_supply);
        self.env().set_named_value(CEP18_TOTAL_SUPPLY_KEY, new_supply);

        self.env().emit_event(Transfer { from: None, to: Some(to), amount });
    }

    fn burn_internal(&mut self, from: Address, amount: U256) {
        let current_balance = self.balance_of(from);
        if current_balance < amount {
            self.env().revert(VaultError::InsufficientTokenBalance);
        }

        let new_balance = current_balance - amount;
        self.balances.set(&from, new_balance);
        self.set_balance_cep18(from, new_balance);

        let new_supply = self.total_supply() - amount;
        self.total_supply.set(new_supply);
        self.env().set_named_value(CEP18_TOTAL_SUPPLY_KEY, new_supply);

        self.env().emit_event(Transfer { from: Some(from), to: None, amount });
    }

    fn set_balance_cep18(&self, owner: Address, amount: U256) {
        let key = cep18_balance_key(owner);
        self.env().set_dictionary_value(CEP18_BALANCES_DICT, key.as_bytes(), amount);
    }

    fn set_allowance_cep18(&self, owner: Address, spender: Address, amount: U256) {
        let key = cep18_allowance_key(owner, spender);
        self.env().set_dictionary_value(CEP18_ALLOWANCES_DICT, key.as_bytes(), amount);
    }
}

/// Dictionary key of a CEP-18 balance: base64 of the serialized `Key`.
fn cep18_balance_key(owner: Address) -> String {
    let bytes = Key::from(owner).to_bytes().unwrap_or_default();
    BASE64_STANDARD.encode(bytes)
}

/// Dictionary key of a CEP-18 allowance: base64 of owner key ++ spender key.
fn cep18_allowance_key(owner: Address, spender: Address) -> String {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&Key::from(owner).to_bytes().unwrap_or_default());
    bytes.extend_from_slice(&Key::from(spender).to_bytes().unwrap_or_default());
    BASE64_STANDARD.encode(bytes)
}
