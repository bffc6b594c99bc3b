//! Position ledgers.
//!
//! [`CollateralLedger`] tracks deposited collateral per (user, token); [`DebtLedger`] tracks
//! minted NFR per user. Both are composed into the engine as sub-modules, so only the
//! engine's entry points can mutate them. Balances are never deleted; a fully repaid or
//! fully redeemed position keeps explicit zero entries.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::EngineError;

/// Per-user, per-token collateral balances
#[odra::module]
pub struct CollateralLedger {
    /// (user, token) -> deposited amount
    balances: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl CollateralLedger {
    /// Deposited amount of `token` held for `user`
    pub fn balance_of(&self, user: Address, token: Address) -> U256 {
        self.balances.get(&(user, token)).unwrap_or(U256::zero())
    }
}

impl CollateralLedger {
    /// Increase a balance. Returns the new balance.
    pub fn credit(&mut self, user: Address, token: Address, amount: U256) -> Result<U256, EngineError> {
        let new_balance = self
            .balance_of(user, token)
            .checked_add(amount)
            .ok_or(EngineError::ArithmeticOverflow)?;
        self.balances.set(&(user, token), new_balance);
        Ok(new_balance)
    }

    /// Decrease a balance. Fails without writing if `amount` exceeds it.
    pub fn debit(&mut self, user: Address, token: Address, amount: U256) -> Result<U256, EngineError> {
        let new_balance = self
            .balance_of(user, token)
            .checked_sub(amount)
            .ok_or(EngineError::CollateralLedgerUnderflow)?;
        self.balances.set(&(user, token), new_balance);
        Ok(new_balance)
    }
}

/// Per-user minted debt
#[odra::module]
pub struct DebtLedger {
    /// user -> NFR minted
    minted: Mapping<Address, U256>,
}

#[odra::module]
impl DebtLedger {
    /// NFR minted by `user`
    pub fn debt_of(&self, user: Address) -> U256 {
        self.minted.get(&user).unwrap_or(U256::zero())
    }
}

impl DebtLedger {
    /// Record newly minted debt. Returns the new total.
    pub fn mint_debt(&mut self, user: Address, amount: U256) -> Result<U256, EngineError> {
        let new_debt = self
            .debt_of(user)
            .checked_add(amount)
            .ok_or(EngineError::ArithmeticOverflow)?;
        self.minted.set(&user, new_debt);
        Ok(new_debt)
    }

    /// Record repaid debt. Fails without writing if `amount` exceeds the debt.
    pub fn burn_debt(&mut self, user: Address, amount: U256) -> Result<U256, EngineError> {
        let new_debt = self
            .debt_of(user)
            .checked_sub(amount)
            .ok_or(EngineError::DebtLedgerUnderflow)?;
        self.minted.set(&user, new_debt);
        Ok(new_debt)
    }
}
