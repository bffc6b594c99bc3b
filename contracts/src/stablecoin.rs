//! NFR Stablecoin Contract
//!
//! CEP-18 compatible synthetic dollar. Supply is controlled by the engine: only authorized
//! minters can mint, and burning is limited to a minter's own balance (the engine pulls
//! tokens from users before burning them).

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::EngineError;

const TOKEN_NAME: &str = "NFR Stablecoin";
const TOKEN_SYMBOL: &str = "NFR";
const TOKEN_DECIMALS: u8 = 18;

/// Tokens moved between accounts
#[odra::event]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub amount: U256,
}

/// Allowance set by an owner
#[odra::event]
pub struct Approval {
    pub owner: Address,
    pub spender: Address,
    pub amount: U256,
}

/// New tokens issued
#[odra::event]
pub struct Mint {
    pub minter: Address,
    pub to: Address,
    pub amount: U256,
}

/// Tokens destroyed
#[odra::event]
pub struct Burn {
    pub from: Address,
    pub amount: U256,
}

/// NFR Stablecoin Contract
#[odra::module(events = [Transfer, Approval, Mint, Burn])]
pub struct NfrStablecoin {
    /// Total supply
    total_supply: Var<U256>,
    /// Balance mapping
    balances: Mapping<Address, U256>,
    /// Allowance mapping (owner, spender) -> amount
    allowances: Mapping<(Address, Address), U256>,
    /// Account allowed to manage minters
    admin: Var<Address>,
    /// Authorized minters (the engine)
    authorized_minters: Mapping<Address, bool>,
}

#[odra::module]
impl NfrStablecoin {
    /// Initialize the stablecoin; the deployer becomes admin
    pub fn init(&mut self) {
        self.total_supply.set(U256::zero());
        self.admin.set(self.env().caller());
    }

    // ========== CEP-18 Standard Functions ==========

    pub fn name(&self) -> String {
        String::from(TOKEN_NAME)
    }

    pub fn symbol(&self) -> String {
        String::from(TOKEN_SYMBOL)
    }

    pub fn decimals(&self) -> u8 {
        TOKEN_DECIMALS
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get().unwrap_or(U256::zero())
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).unwrap_or(U256::zero())
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
            self.env().revert(EngineError::InsufficientAllowance);
        }

        self.transfer_internal(owner, recipient, amount);
        self.approve_internal(owner, spender, current_allowance - amount);
        true
    }

    // ========== Protocol Functions (Restricted) ==========

    /// Mint new tokens (only authorized minters)
    pub fn mint(&mut self, to: Address, amount: U256) -> bool {
        self.require_authorized_minter();
        if amount.is_zero() {
            self.env().revert(EngineError::NeedsMoreThanZero);
        }

        let new_supply = match self.total_supply().checked_add(amount) {
            Some(supply) => supply,
            None => self.env().revert(EngineError::ArithmeticOverflow),
        };
        // balance <= supply, so this cannot overflow
        let new_balance = self.balance_of(to) + amount;
        self.balances.set(&to, new_balance);
        self.total_supply.set(new_supply);

        self.env().emit_event(Mint {
            minter: self.env().caller(),
            to,
            amount,
        });
        true
    }

    /// Burn tokens from the caller's balance (only authorized minters)
    pub fn burn(&mut self, amount: U256) {
        self.require_authorized_minter();
        if amount.is_zero() {
            self.env().revert(EngineError::NeedsMoreThanZero);
        }

        let caller = self.env().caller();
        let current_balance = self.balance_of(caller);
        if current_balance < amount {
            self.env().revert(EngineError::InsufficientBalance);
        }

        self.balances.set(&caller, current_balance - amount);
        self.total_supply.set(self.total_supply() - amount);

        self.env().emit_event(Burn {
            from: caller,
            amount,
        });
    }

    // ========== Admin Functions ==========

    /// Add an authorized minter (admin only)
    pub fn add_minter(&mut self, minter: Address) {
        self.require_admin();
        self.authorized_minters.set(&minter, true);
    }

    /// Remove an authorized minter (admin only)
    pub fn remove_minter(&mut self, minter: Address) {
        self.require_admin();
        self.authorized_minters.set(&minter, false);
    }

    pub fn is_minter(&self, account: Address) -> bool {
        self.authorized_minters.get(&account).unwrap_or(false)
    }

    pub fn get_admin(&self) -> Option<Address> {
        self.admin.get()
    }

    // ========== Internal Functions ==========

    fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(EngineError::InsufficientBalance);
        }

        self.balances.set(&from, from_balance - amount);
        let to_balance = self.balance_of(to);
        self.balances.set(&to, to_balance + amount);

        self.env().emit_event(Transfer { from, to, amount });
    }

    fn approve_internal(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.set(&(owner, spender), amount);
        self.env().emit_event(Approval {
            owner,
            spender,
            amount,
        });
    }

    fn require_authorized_minter(&self) {
        let caller = self.env().caller();
        if !self.is_minter(caller) {
            self.env().revert(EngineError::Unauthorized);
        }
    }

    fn require_admin(&self) {
        if self.admin.get() != Some(self.env().caller()) {
            self.env().revert(EngineError::Unauthorized);
        }
    }
}
