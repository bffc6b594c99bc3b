//! NFR Engine Contract
//!
//! Position manager for the NFR synthetic dollar. Users lock approved collateral tokens,
//! mint NFR against them, repay and withdraw, and anyone can liquidate a position whose
//! health factor fell below `MIN_HEALTH_FACTOR`.
//!
//! Every entry point is atomic: a failed guard, a broken health factor, a rejected price
//! or a failed token call reverts the whole call, ledger writes included. Mutating entry
//! points are `non_reentrant` and never call each other; composite operations share the
//! private helpers below instead.
//!
//! Order of work inside each operation:
//! 1. guard clauses (amount, approved token)
//! 2. ledger updates
//! 3. health factor evaluation on the resulting state
//! 4. token service calls

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::config::{
    RiskParameters, ADDITIONAL_FEED_PRECISION, LIQUIDATION_BONUS, LIQUIDATION_THRESHOLD,
    MIN_HEALTH_FACTOR, PRECISION,
};
use crate::errors::EngineError;
use crate::interfaces::{Cep18TokenContractRef, SyntheticTokenContractRef};
use crate::ledger::{CollateralLedger, DebtLedger};
use crate::math;
use crate::oracle;
use crate::price_feed::PriceFeedContractRef;
use crate::types::{AccountInformation, LiquidationOutcome};

/// Collateral locked in the engine
#[odra::event]
pub struct CollateralDeposited {
    pub user: Address,
    pub token: Address,
    pub amount: U256,
}

/// Collateral released by the engine, to the owner or to a liquidator
#[odra::event]
pub struct CollateralRedeemed {
    pub redeemed_from: Address,
    pub redeemed_to: Address,
    pub token: Address,
    pub amount: U256,
}

/// Position partially or fully liquidated
#[odra::event]
pub struct Liquidation {
    pub liquidator: Address,
    pub user: Address,
    pub token: Address,
    pub debt_covered: U256,
    pub collateral_seized: U256,
    pub bonus_collateral: U256,
}

/// Pair approved collateral tokens with their feeds, rejecting mismatched or repeated entries.
pub fn collateral_pairs(
    token_addresses: &[Address],
    price_feed_addresses: &[Address],
) -> Result<Vec<(Address, Address)>, EngineError> {
    if token_addresses.len() != price_feed_addresses.len() {
        return Err(EngineError::TokenAddressesAndPriceFeedAddressesMustBeSameLength);
    }

    let mut pairs: Vec<(Address, Address)> = Vec::with_capacity(token_addresses.len());
    for (token, feed) in token_addresses.iter().zip(price_feed_addresses.iter()) {
        if pairs.iter().any(|(listed, _)| listed == token) {
            return Err(EngineError::DuplicateCollateralToken);
        }
        pairs.push((*token, *feed));
    }
    Ok(pairs)
}

/// NFR Engine Contract
#[odra::module(events = [CollateralDeposited, CollateralRedeemed, Liquidation])]
pub struct NfrEngine {
    /// Synthetic token contract address
    nfr: Var<Address>,
    /// Approved collateral tokens, in construction order
    collateral_tokens: Var<Vec<Address>>,
    /// Collateral token -> price feed
    price_feeds: Mapping<Address, Address>,
    /// Deposited collateral
    collateral: SubModule<CollateralLedger>,
    /// Minted debt
    debt: SubModule<DebtLedger>,
}

#[odra::module]
impl NfrEngine {
    /// Initialize the engine with its fixed collateral set
    pub fn init(
        &mut self,
        token_addresses: Vec<Address>,
        price_feed_addresses: Vec<Address>,
        nfr_address: Address,
    ) {
        let pairs = self.ok_or_revert(collateral_pairs(&token_addresses, &price_feed_addresses));
        for (token, feed) in pairs.iter() {
            self.price_feeds.set(token, *feed);
        }
        self.collateral_tokens.set(token_addresses);
        self.nfr.set(nfr_address);
    }

    // ========== Position Operations ==========

    /// Lock `amount` of `token` as collateral for the caller
    #[odra(non_reentrant)]
    pub fn deposit_collateral(&mut self, token: Address, amount: U256) {
        let user = self.env().caller();
        self.deposit_collateral_internal(user, token, amount);
    }

    /// Mint `amount` NFR against the caller's collateral
    #[odra(non_reentrant)]
    pub fn mint_nfr(&mut self, amount: U256) {
        let user = self.env().caller();
        self.mint_nfr_internal(user, amount);
    }

    /// Deposit collateral and mint NFR in one atomic call
    #[odra(non_reentrant)]
    pub fn deposit_collateral_and_mint_nfr(
        &mut self,
        token: Address,
        collateral_amount: U256,
        amount_to_mint: U256,
    ) {
        let user = self.env().caller();
        self.deposit_collateral_internal(user, token, collateral_amount);
        self.mint_nfr_internal(user, amount_to_mint);
    }

    /// Withdraw `amount` of `token`; the remaining position must stay healthy
    #[odra(non_reentrant)]
    pub fn redeem_collateral(&mut self, token: Address, amount: U256) {
        let user = self.env().caller();
        self.redeem_collateral_internal(token, amount, user, user);
        self.revert_if_health_factor_is_broken(user);
        self.send_collateral(token, user, amount);
    }

    /// Repay `amount` NFR of the caller's debt
    #[odra(non_reentrant)]
    pub fn burn_nfr(&mut self, amount: U256) {
        let user = self.env().caller();
        self.burn_nfr_internal(amount, user, user);
    }

    /// Repay NFR and withdraw collateral in one atomic call
    #[odra(non_reentrant)]
    pub fn redeem_collateral_for_nfr(
        &mut self,
        token: Address,
        collateral_amount: U256,
        amount_to_burn: U256,
    ) {
        let user = self.env().caller();
        self.burn_nfr_internal(amount_to_burn, user, user);
        self.redeem_collateral_internal(token, collateral_amount, user, user);
        self.revert_if_health_factor_is_broken(user);
        self.send_collateral(token, user, collateral_amount);
    }

    /// Repay `debt_to_cover` of an unhealthy `user`'s debt and take their `token` collateral
    /// plus `LIQUIDATION_BONUS` percent.
    ///
    /// The caller must hold and approve `debt_to_cover` NFR for the engine. The seized amount
    /// is capped at the user's balance of `token`. Reverts unless the user's health factor
    /// strictly improves and the liquidator's own position stays healthy.
    #[odra(non_reentrant)]
    pub fn liquidate(&mut self, token: Address, user: Address, debt_to_cover: U256) -> LiquidationOutcome {
        self.require_more_than_zero(debt_to_cover);
        let feed = self.require_allowed_token(token);
        let liquidator = self.env().caller();

        let starting_health_factor = self.health_factor_of(user);
        if math::is_healthy(starting_health_factor) {
            self.env().revert(EngineError::HealthFactorOk);
        }
        if debt_to_cover > self.debt.debt_of(user) {
            self.env().revert(EngineError::NoTokensToBurn);
        }

        let price = self.price_from_feed(feed);
        let available = self.collateral.balance_of(user, token);
        let sizing = self.ok_or_revert(math::size_liquidation(price, debt_to_cover, available));
        if sizing.total_collateral_seized.is_zero() {
            self.env().revert(EngineError::NotEnoughCollateralToRedeem);
        }

        self.redeem_collateral_internal(token, sizing.total_collateral_seized, user, liquidator);
        let debt_result = self.debt.burn_debt(user, debt_to_cover);
        self.ok_or_revert(debt_result);

        let ending_health_factor = self.health_factor_of(user);
        // strict: an unchanged health factor also counts as not improved
        if ending_health_factor <= starting_health_factor {
            self.env().revert(EngineError::HealthFactorNotImproved);
        }
        self.revert_if_health_factor_is_broken(liquidator);

        self.send_collateral(token, liquidator, sizing.total_collateral_seized);
        self.pull_and_burn_nfr(liquidator, debt_to_cover);

        let outcome = LiquidationOutcome {
            user,
            token,
            debt_covered: debt_to_cover,
            collateral_equivalent: sizing.collateral_equivalent,
            bonus_collateral: sizing.bonus_collateral,
            collateral_seized: sizing.total_collateral_seized,
        };
        self.env().emit_event(Liquidation {
            liquidator,
            user,
            token,
            debt_covered: debt_to_cover,
            collateral_seized: sizing.total_collateral_seized,
            bonus_collateral: sizing.bonus_collateral,
        });
        outcome
    }

    // ========== Views ==========

    /// Health factor of `user`, scaled by 1e18; `U256::MAX` when the user has no debt
    pub fn get_health_factor(&self, user: Address) -> U256 {
        self.health_factor_of(user)
    }

    /// Health factor for arbitrary debt and collateral value, without touching state
    pub fn calculate_health_factor(&self, total_nfr_minted: U256, collateral_value_in_usd: U256) -> U256 {
        self.ok_or_revert(math::health_factor(total_nfr_minted, collateral_value_in_usd))
    }

    pub fn get_account_information(&self, user: Address) -> AccountInformation {
        AccountInformation {
            total_nfr_minted: self.debt.debt_of(user),
            collateral_value_in_usd: self.account_collateral_value(user),
        }
    }

    /// USD value of all collateral deposited by `user`
    pub fn get_account_collateral_value(&self, user: Address) -> U256 {
        self.account_collateral_value(user)
    }

    /// USD value of `amount` of `token` at the current validated price
    pub fn get_usd_value(&self, token: Address, amount: U256) -> U256 {
        let price = self.price_of(token);
        self.ok_or_revert(math::usd_value(price, amount))
    }

    /// Amount of `token` worth `usd_amount` at the current validated price
    pub fn get_token_amount_from_usd(&self, token: Address, usd_amount: U256) -> U256 {
        let price = self.price_of(token);
        self.ok_or_revert(math::token_amount_from_usd(price, usd_amount))
    }

    pub fn get_collateral_balance_of_user(&self, user: Address, token: Address) -> U256 {
        self.collateral.balance_of(user, token)
    }

    pub fn get_nfr_minted(&self, user: Address) -> U256 {
        self.debt.debt_of(user)
    }

    pub fn get_collateral_tokens(&self) -> Vec<Address> {
        self.collateral_tokens.get().unwrap_or_default()
    }

    pub fn get_collateral_token_price_feed(&self, token: Address) -> Option<Address> {
        self.price_feeds.get(&token)
    }

    pub fn get_nfr(&self) -> Option<Address> {
        self.nfr.get()
    }

    pub fn get_risk_parameters(&self) -> RiskParameters {
        RiskParameters::default()
    }

    pub fn get_precision(&self) -> U256 {
        U256::from(PRECISION)
    }

    pub fn get_additional_feed_precision(&self) -> U256 {
        U256::from(ADDITIONAL_FEED_PRECISION)
    }

    pub fn get_liquidation_threshold(&self) -> u64 {
        LIQUIDATION_THRESHOLD
    }

    pub fn get_liquidation_bonus(&self) -> u64 {
        LIQUIDATION_BONUS
    }

    pub fn get_min_health_factor(&self) -> U256 {
        U256::from(MIN_HEALTH_FACTOR)
    }

    // ========== Internal Operations ==========

    fn deposit_collateral_internal(&mut self, user: Address, token: Address, amount: U256) {
        self.require_more_than_zero(amount);
        self.require_allowed_token(token);

        let credit = self.collateral.credit(user, token, amount);
        self.ok_or_revert(credit);
        self.env().emit_event(CollateralDeposited { user, token, amount });

        let engine = self.env().self_address();
        let success = Cep18TokenContractRef::new(self.env(), token).transfer_from(user, engine, amount);
        if !success {
            self.env().revert(EngineError::TransferFailed);
        }
    }

    fn mint_nfr_internal(&mut self, user: Address, amount: U256) {
        self.require_more_than_zero(amount);

        let minted = self.debt.mint_debt(user, amount);
        self.ok_or_revert(minted);
        self.revert_if_health_factor_is_broken(user);

        let success = self.nfr_token().mint(user, amount);
        if !success {
            self.env().revert(EngineError::MintFailed);
        }
    }

    /// Ledger side of a redemption. The caller checks health and sends the tokens.
    fn redeem_collateral_internal(&mut self, token: Address, amount: U256, from: Address, to: Address) {
        self.require_more_than_zero(amount);
        self.require_allowed_token(token);

        if amount > self.collateral.balance_of(from, token) {
            self.env().revert(EngineError::NotEnoughCollateralToRedeem);
        }
        let debit = self.collateral.debit(from, token, amount);
        self.ok_or_revert(debit);

        self.env().emit_event(CollateralRedeemed {
            redeemed_from: from,
            redeemed_to: to,
            token,
            amount,
        });
    }

    /// Reduce `on_behalf_of`'s debt, funded by NFR pulled from `nfr_from`.
    fn burn_nfr_internal(&mut self, amount: U256, on_behalf_of: Address, nfr_from: Address) {
        if amount.is_zero() || amount > self.debt.debt_of(on_behalf_of) {
            self.env().revert(EngineError::NoTokensToBurn);
        }
        let burned = self.debt.burn_debt(on_behalf_of, amount);
        self.ok_or_revert(burned);

        self.pull_and_burn_nfr(nfr_from, amount);
    }

    fn pull_and_burn_nfr(&mut self, from: Address, amount: U256) {
        let engine = self.env().self_address();
        let mut nfr = self.nfr_token();
        if !nfr.transfer_from(from, engine, amount) {
            self.env().revert(EngineError::TransferFailed);
        }
        nfr.burn(amount);
    }

    fn send_collateral(&mut self, token: Address, to: Address, amount: U256) {
        let success = Cep18TokenContractRef::new(self.env(), token).transfer(to, amount);
        if !success {
            self.env().revert(EngineError::TransferFailed);
        }
    }

    // ========== Valuation ==========

    fn health_factor_of(&self, user: Address) -> U256 {
        let total_minted = self.debt.debt_of(user);
        // debt-free positions are maximally safe; skip the oracle entirely
        if total_minted.is_zero() {
            return U256::MAX;
        }
        let collateral_value = self.account_collateral_value(user);
        self.ok_or_revert(math::health_factor(total_minted, collateral_value))
    }

    fn revert_if_health_factor_is_broken(&self, user: Address) {
        let health_factor = self.health_factor_of(user);
        if !math::is_healthy(health_factor) {
            self.env().revert(EngineError::BreaksHealthFactor);
        }
    }

    fn account_collateral_value(&self, user: Address) -> U256 {
        let mut total = U256::zero();
        for token in self.get_collateral_tokens() {
            let amount = self.collateral.balance_of(user, token);
            if amount.is_zero() {
                continue;
            }
            let price = self.price_of(token);
            let value = self.ok_or_revert(math::usd_value(price, amount));
            total = match total.checked_add(value) {
                Some(sum) => sum,
                None => self.env().revert(EngineError::ArithmeticOverflow),
            };
        }
        total
    }

    fn price_of(&self, token: Address) -> U256 {
        let feed = self.require_allowed_token(token);
        self.price_from_feed(feed)
    }

    fn price_from_feed(&self, feed: Address) -> U256 {
        let quote = PriceFeedContractRef::new(self.env(), feed).latest_quote();
        // block time is reported in milliseconds
        let now_secs = self.env().get_block_time() / 1000;
        self.ok_or_revert(oracle::stale_checked_price(&quote, now_secs))
    }

    // ========== Guards ==========

    fn require_more_than_zero(&self, amount: U256) {
        if amount.is_zero() {
            self.env().revert(EngineError::NeedsMoreThanZero);
        }
    }

    /// Returns the token's price feed
    fn require_allowed_token(&self, token: Address) -> Address {
        match self.price_feeds.get(&token) {
            Some(feed) => feed,
            None => self.env().revert(EngineError::NotAllowedToken),
        }
    }

    fn nfr_token(&self) -> SyntheticTokenContractRef {
        match self.nfr.get() {
            Some(address) => SyntheticTokenContractRef::new(self.env(), address),
            None => self.env().revert(EngineError::MintFailed),
        }
    }

    fn ok_or_revert<T>(&self, result: Result<T, EngineError>) -> T {
        match result {
            Ok(value) => value,
            Err(error) => self.env().revert(error),
        }
    }
}
