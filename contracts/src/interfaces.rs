//! External contract interfaces consumed by the engine.

use odra::prelude::*;
use odra::casper_types::U256;

/// CEP-18 transfers used to move collateral in and out of the engine
#[odra::external_contract]
pub trait Cep18Token {
    fn transfer(&mut self, recipient: Address, amount: U256) -> bool;
    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool;
}

/// Synthetic asset token service: pull, mint and burn
#[odra::external_contract]
pub trait SyntheticToken {
    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool;
    fn mint(&mut self, to: Address, amount: U256) -> bool;
    fn burn(&mut self, amount: U256);
}
