//! Position lifecycle tests: deposit, mint, burn, redeem and price handling.

use odra::casper_types::U256;
use odra::host::{Deployer, NoArgs};
use odra::prelude::Addressable;
use odra::prelude::ExecutionError;
use pretty_assertions::assert_eq;
use nfr_cdp_contracts::config::PRICE_TIMEOUT_SECONDS;
use nfr_cdp_contracts::engine::{CollateralDeposited, CollateralRedeemed, NfrEngine, NfrEngineInitArgs};
use nfr_cdp_contracts::errors::EngineError;
use crate::fixture::*;
use crate::mocks::{MockToken, ReentrantToken};

// ===== Construction =====

#[test]
fn test_constructor_registers_collateral() {
    let mut f = Fixture::setup();
    assert_eq!(
        f.engine.get_collateral_tokens(),
        vec![f.weth_address(), f.wbtc_address()]
    );
    assert_eq!(
        f.engine.get_collateral_token_price_feed(f.weth_address()),
        Some(f.weth_feed.address().clone())
    );
    assert_eq!(
        f.engine.get_collateral_token_price_feed(f.wbtc_address()),
        Some(f.wbtc_feed.address().clone())
    );
    assert_eq!(f.engine.get_nfr(), Some(f.nfr.address().clone()));
}

#[test]
fn test_constructor_rejects_mismatched_feeds() {
    let f = Fixture::setup();
    let result = NfrEngine::try_deploy(
        &f.env,
        NfrEngineInitArgs {
            token_addresses: vec![f.weth_address(), f.wbtc_address()],
            price_feed_addresses: vec![f.weth_feed.address().clone()],
            nfr_address: f.nfr.address().clone(),
        },
    );
    assert_eq!(
        result.err(),
        Some(EngineError::TokenAddressesAndPriceFeedAddressesMustBeSameLength.into())
    );
}

#[test]
fn test_risk_constants() {
    let mut f = Fixture::setup();
    assert_eq!(f.engine.get_precision(), wad(1));
    assert_eq!(f.engine.get_additional_feed_precision(), U256::exp10(10));
    assert_eq!(f.engine.get_liquidation_threshold(), 50);
    assert_eq!(f.engine.get_liquidation_bonus(), 10);
    assert_eq!(f.engine.get_min_health_factor(), wad(1));

    let params = f.engine.get_risk_parameters();
    assert_eq!(params.liquidation_threshold, 50);
    assert_eq!(params.liquidation_bonus, 10);
}

// ===== Pricing =====

#[test]
fn test_usd_value() {
    let mut f = Fixture::setup();
    // 15 WETH at $2000
    assert_eq!(f.engine.get_usd_value(f.weth_address(), wad(15)), wad(30_000));
    assert_eq!(f.engine.get_usd_value(f.weth_address(), wad(1)), wad(2000));
}

#[test]
fn test_token_amount_from_usd() {
    let mut f = Fixture::setup();
    // $100 of WETH at $2000 = 0.05 WETH
    let expected = U256::from(50_000_000_000_000_000u64);
    assert_eq!(
        f.engine.get_token_amount_from_usd(f.weth_address(), wad(100)),
        expected
    );
}

#[test]
fn test_pricing_unapproved_token_reverts() {
    let mut f = Fixture::setup();
    let stray = MockToken::deploy(&f.env, NoArgs);
    assert_eq!(
        f.engine.try_get_usd_value(stray.address().clone(), wad(1)),
        Err(EngineError::NotAllowedToken.into())
    );
}

// ===== Deposit =====

#[test]
fn test_deposit_updates_ledger_and_balances() {
    let mut f = Fixture::setup();
    let (user, weth) = (f.user, f.weth_address());
    f.deposit_weth(user, starting_balance());

    assert_eq!(f.engine.get_collateral_balance_of_user(user, weth), starting_balance());
    assert_eq!(f.weth.balance_of(f.engine_address()), starting_balance());
    assert_eq!(f.weth.balance_of(user), U256::zero());
    assert!(f.env.emitted_event(
        &f.engine,
        CollateralDeposited {
            user,
            token: weth,
            amount: starting_balance(),
        }
    ));

    let info = f.engine.get_account_information(user);
    assert_eq!(info.total_nfr_minted, U256::zero());
    assert_eq!(info.collateral_value_in_usd, wad(20_000));
    // deposited amount recovered through the oracle round trip
    assert_eq!(
        f.engine.get_token_amount_from_usd(weth, info.collateral_value_in_usd),
        starting_balance()
    );
}

#[test]
fn test_deposit_zero_reverts() {
    let mut f = Fixture::setup();
    let (user, weth) = (f.user, f.weth_address());
    f.env.set_caller(user);
    assert_eq!(
        f.engine.try_deposit_collateral(weth, U256::zero()),
        Err(EngineError::NeedsMoreThanZero.into())
    );
    assert_eq!(f.engine.get_collateral_balance_of_user(user, weth), U256::zero());
}

#[test]
fn test_deposit_unapproved_token_reverts() {
    let mut f = Fixture::setup();
    let user = f.user;
    let mut stray = MockToken::deploy(&f.env, NoArgs);
    stray.mint(user, wad(1));

    f.env.set_caller(user);
    stray.approve(f.engine_address(), wad(1));
    assert_eq!(
        f.engine.try_deposit_collateral(stray.address().clone(), wad(1)),
        Err(EngineError::NotAllowedToken.into())
    );
    assert_eq!(stray.balance_of(user), wad(1));
}

#[test]
fn test_deposit_without_allowance_leaves_no_credit() {
    let mut f = Fixture::setup();
    let (user, weth) = (f.user, f.weth_address());
    f.env.set_caller(user);
    assert!(f.engine.try_deposit_collateral(weth, wad(1)).is_err());
    assert_eq!(f.engine.get_collateral_balance_of_user(user, weth), U256::zero());
    assert_eq!(f.weth.balance_of(user), starting_balance());
}

#[test]
fn test_deposit_transfer_failure_rolls_back() {
    let mut f = Fixture::setup();
    let (user, weth) = (f.user, f.weth_address());
    f.weth.set_fail_transfers(true);

    f.env.set_caller(user);
    f.weth.approve(f.engine_address(), wad(1));
    assert_eq!(
        f.engine.try_deposit_collateral(weth, wad(1)),
        Err(EngineError::TransferFailed.into())
    );
    assert_eq!(f.engine.get_collateral_balance_of_user(user, weth), U256::zero());
}

#[test]
fn test_multiple_collateral_tokens_sum() {
    let mut f = Fixture::setup();
    let (user, wbtc) = (f.user, f.wbtc_address());
    f.deposit_weth(user, starting_balance());

    f.env.set_caller(user);
    f.wbtc.approve(f.engine_address(), starting_balance());
    f.engine.deposit_collateral(wbtc, starting_balance());

    // 10 WETH * 2000 + 10 WBTC * 1000
    assert_eq!(f.engine.get_account_collateral_value(user), wad(30_000));
}

// ===== Mint =====

#[test]
fn test_health_factor_reference_position() {
    let mut f = Fixture::setup();
    let user = f.user;
    f.deposit_weth_and_mint(user, starting_balance(), wad(100));

    // $20000 collateral, $10000 counted, 100 NFR debt
    assert_eq!(f.engine.get_health_factor(user), wad(100));
    assert_eq!(f.engine.get_nfr_minted(user), wad(100));
    assert_eq!(f.nfr.balance_of(user), wad(100));
    assert_eq!(f.nfr.total_supply(), wad(100));
}

#[test]
fn test_zero_debt_health_factor_is_max() {
    let mut f = Fixture::setup();
    let user = f.user;
    assert_eq!(f.engine.get_health_factor(user), U256::MAX);

    f.deposit_weth(user, starting_balance());
    assert_eq!(f.engine.get_health_factor(user), U256::MAX);
}

#[test]
fn test_calculate_health_factor() {
    let mut f = Fixture::setup();
    assert_eq!(f.engine.calculate_health_factor(wad(100), wad(20_000)), wad(100));
    assert_eq!(f.engine.calculate_health_factor(U256::zero(), wad(1)), U256::MAX);
}

#[test]
fn test_mint_zero_reverts() {
    let mut f = Fixture::setup();
    let user = f.user;
    f.deposit_weth(user, starting_balance());
    f.env.set_caller(user);
    assert_eq!(
        f.engine.try_mint_nfr(U256::zero()),
        Err(EngineError::NeedsMoreThanZero.into())
    );
}

#[test]
fn test_mint_breaking_health_factor_reverts() {
    let mut f = Fixture::setup();
    let user = f.user;
    f.deposit_weth(user, starting_balance());

    // $10000 counted collateral allows exactly 10000 NFR
    f.env.set_caller(user);
    assert_eq!(
        f.engine.try_mint_nfr(wad(10_001)),
        Err(EngineError::BreaksHealthFactor.into())
    );
    assert_eq!(f.engine.get_nfr_minted(user), U256::zero());
    assert_eq!(f.nfr.balance_of(user), U256::zero());

    f.engine.mint_nfr(wad(10_000));
    assert_eq!(f.engine.get_health_factor(user), wad(1));
}

#[test]
fn test_mint_without_collateral_reverts() {
    let mut f = Fixture::setup();
    f.env.set_caller(f.user);
    assert_eq!(
        f.engine.try_mint_nfr(wad(1)),
        Err(EngineError::BreaksHealthFactor.into())
    );
}

#[test]
fn test_deposit_and_mint_is_atomic() {
    let mut f = Fixture::setup();
    let (user, weth) = (f.user, f.weth_address());
    f.env.set_caller(user);
    f.weth.approve(f.engine_address(), starting_balance());
    assert_eq!(
        f.engine
            .try_deposit_collateral_and_mint_nfr(weth, starting_balance(), wad(10_001)),
        Err(EngineError::BreaksHealthFactor.into())
    );

    assert_eq!(f.engine.get_collateral_balance_of_user(user, weth), U256::zero());
    assert_eq!(f.weth.balance_of(user), starting_balance());
    assert_eq!(f.engine.get_nfr_minted(user), U256::zero());
}

#[test]
fn test_mint_failure_rolls_back_debt() {
    let mut f = Fixture::setup();
    let (user, weth) = (f.user, f.weth_address());

    let mut failing_nfr = MockToken::deploy(&f.env, NoArgs);
    failing_nfr.set_fail_mints(true);
    let mut engine = deploy_engine(
        &f.env,
        vec![weth],
        vec![f.weth_feed.address().clone()],
        failing_nfr.address().clone(),
    );

    f.env.set_caller(user);
    f.weth.approve(engine.address().clone(), starting_balance());
    assert_eq!(
        engine.try_deposit_collateral_and_mint_nfr(weth, starting_balance(), wad(100)),
        Err(EngineError::MintFailed.into())
    );
    assert_eq!(engine.get_nfr_minted(user), U256::zero());
    assert_eq!(engine.get_collateral_balance_of_user(user, weth), U256::zero());
    assert_eq!(f.weth.balance_of(user), starting_balance());
}

// ===== Burn =====

#[test]
fn test_burn_repays_debt() {
    let mut f = Fixture::setup();
    let user = f.user;
    f.deposit_weth_and_mint(user, starting_balance(), wad(100));
    f.approve_nfr(user, wad(100));

    f.env.set_caller(user);
    f.engine.burn_nfr(wad(40));
    assert_eq!(f.engine.get_nfr_minted(user), wad(60));
    assert_eq!(f.nfr.balance_of(user), wad(60));
    assert_eq!(f.nfr.total_supply(), wad(60));
    assert_eq!(f.nfr.balance_of(f.engine_address()), U256::zero());
}

#[test]
fn test_burn_zero_or_more_than_debt_reverts() {
    let mut f = Fixture::setup();
    let user = f.user;
    f.deposit_weth_and_mint(user, starting_balance(), wad(100));
    f.approve_nfr(user, wad(1000));

    f.env.set_caller(user);
    assert_eq!(
        f.engine.try_burn_nfr(U256::zero()),
        Err(EngineError::NoTokensToBurn.into())
    );
    assert_eq!(
        f.engine.try_burn_nfr(wad(101)),
        Err(EngineError::NoTokensToBurn.into())
    );
    assert_eq!(f.engine.get_nfr_minted(user), wad(100));
}

#[test]
fn test_burn_without_allowance_keeps_debt() {
    let mut f = Fixture::setup();
    let user = f.user;
    f.deposit_weth_and_mint(user, starting_balance(), wad(100));

    f.env.set_caller(user);
    assert_eq!(
        f.engine.try_burn_nfr(wad(100)),
        Err(EngineError::InsufficientAllowance.into())
    );
    assert_eq!(f.engine.get_nfr_minted(user), wad(100));
    assert_eq!(f.nfr.balance_of(user), wad(100));
}

// ===== Redeem =====

#[test]
fn test_deposit_then_redeem_round_trip() {
    let mut f = Fixture::setup();
    let (user, weth) = (f.user, f.weth_address());
    f.deposit_weth(user, starting_balance());

    f.env.set_caller(user);
    f.engine.redeem_collateral(weth, starting_balance());
    assert_eq!(f.engine.get_collateral_balance_of_user(user, weth), U256::zero());
    assert_eq!(f.weth.balance_of(user), starting_balance());
    assert_eq!(f.weth.balance_of(f.engine_address()), U256::zero());
    assert!(f.env.emitted_event(
        &f.engine,
        CollateralRedeemed {
            redeemed_from: user,
            redeemed_to: user,
            token: weth,
            amount: starting_balance(),
        }
    ));
}

#[test]
fn test_redeem_more_than_deposited_reverts() {
    let mut f = Fixture::setup();
    let (user, weth) = (f.user, f.weth_address());
    f.deposit_weth(user, wad(5));

    f.env.set_caller(user);
    assert_eq!(
        f.engine.try_redeem_collateral(weth, wad(6)),
        Err(EngineError::NotEnoughCollateralToRedeem.into())
    );
    assert_eq!(
        f.engine.try_redeem_collateral(weth, U256::zero()),
        Err(EngineError::NeedsMoreThanZero.into())
    );
    assert_eq!(f.engine.get_collateral_balance_of_user(user, weth), wad(5));
}

#[test]
fn test_redeem_breaking_health_factor_reverts() {
    let mut f = Fixture::setup();
    let (user, weth) = (f.user, f.weth_address());
    f.deposit_weth_and_mint(user, starting_balance(), wad(10_000));

    f.env.set_caller(user);
    assert_eq!(
        f.engine.try_redeem_collateral(weth, wad(1)),
        Err(EngineError::BreaksHealthFactor.into())
    );
    assert_eq!(f.engine.get_collateral_balance_of_user(user, weth), starting_balance());
    assert_eq!(f.weth.balance_of(user), U256::zero());
}

#[test]
fn test_redeem_collateral_for_nfr_closes_position() {
    let mut f = Fixture::setup();
    let (user, weth) = (f.user, f.weth_address());
    f.deposit_weth_and_mint(user, starting_balance(), wad(100));
    f.approve_nfr(user, wad(100));

    f.env.set_caller(user);
    f.engine
        .redeem_collateral_for_nfr(weth, starting_balance(), wad(100));
    assert_eq!(f.engine.get_nfr_minted(user), U256::zero());
    assert_eq!(f.engine.get_collateral_balance_of_user(user, weth), U256::zero());
    assert_eq!(f.weth.balance_of(user), starting_balance());
    assert_eq!(f.nfr.balance_of(user), U256::zero());
    assert_eq!(f.nfr.total_supply(), U256::zero());
}

#[test]
fn test_redeem_send_failure_rolls_back() {
    let mut f = Fixture::setup();
    let (user, weth) = (f.user, f.weth_address());
    f.deposit_weth(user, starting_balance());
    f.weth.set_fail_transfers(true);

    f.env.set_caller(user);
    assert_eq!(
        f.engine.try_redeem_collateral(weth, starting_balance()),
        Err(EngineError::TransferFailed.into())
    );
    assert_eq!(f.engine.get_collateral_balance_of_user(user, weth), starting_balance());
}

// ===== Oracle validation =====

#[test]
fn test_stale_price_blocks_valuation() {
    let mut f = Fixture::setup();
    let (user, weth) = (f.user, f.weth_address());
    f.deposit_weth_and_mint(user, starting_balance(), wad(100));

    f.advance_seconds(PRICE_TIMEOUT_SECONDS + 1);
    f.env.set_caller(user);
    assert_eq!(
        f.engine.try_mint_nfr(wad(1)),
        Err(EngineError::StalePrice.into())
    );
    assert_eq!(
        f.engine.try_get_health_factor(user),
        Err(EngineError::StalePrice.into())
    );
    assert_eq!(
        f.engine.try_redeem_collateral(weth, wad(1)),
        Err(EngineError::StalePrice.into())
    );

    f.set_eth_price(ETH_USD_PRICE);
    f.env.set_caller(user);
    f.engine.mint_nfr(wad(1));
    assert_eq!(f.engine.get_nfr_minted(user), wad(101));
}

#[test]
fn test_price_at_timeout_is_fresh() {
    let mut f = Fixture::setup();
    let user = f.user;
    f.deposit_weth_and_mint(user, starting_balance(), wad(100));

    f.advance_seconds(PRICE_TIMEOUT_SECONDS);
    assert_eq!(f.engine.get_health_factor(user), wad(100));
}

#[test]
fn test_debt_free_position_ignores_stale_price() {
    let mut f = Fixture::setup();
    let (user, weth) = (f.user, f.weth_address());
    f.deposit_weth(user, starting_balance());

    f.advance_seconds(PRICE_TIMEOUT_SECONDS * 2);
    assert_eq!(f.engine.get_health_factor(user), U256::MAX);

    f.env.set_caller(user);
    f.engine.redeem_collateral(weth, starting_balance());
    assert_eq!(f.weth.balance_of(user), starting_balance());
}

#[test]
fn test_non_positive_price_reverts() {
    let mut f = Fixture::setup();
    let weth = f.weth_address();

    f.set_eth_price(0);
    assert_eq!(
        f.engine.try_get_usd_value(weth, wad(1)),
        Err(EngineError::InvalidPrice.into())
    );

    f.set_eth_price(-1);
    assert_eq!(
        f.engine.try_get_usd_value(weth, wad(1)),
        Err(EngineError::InvalidPrice.into())
    );
}

#[test]
fn test_feed_with_wrong_decimals_reverts() {
    let mut f = Fixture::setup();
    let six_decimal_feed = deploy_feed(&f.env, 6, 2000_000_000);
    let mut engine = deploy_engine(
        &f.env,
        vec![f.weth_address()],
        vec![six_decimal_feed.address().clone()],
        f.nfr.address().clone(),
    );
    assert_eq!(
        engine.try_get_usd_value(f.weth_address(), wad(1)),
        Err(EngineError::FeedDecimalsMismatch.into())
    );
}

// ===== Reentrancy =====

#[test]
fn test_reentrant_collateral_token_is_rejected() {
    let mut f = Fixture::setup();
    let env = f.env.clone();
    let user = f.user;

    let mut token = ReentrantToken::deploy(&env, NoArgs);
    let feed = deploy_feed(&env, FEED_DECIMALS, ETH_USD_PRICE);
    let mut engine = deploy_engine(
        &env,
        vec![token.address().clone()],
        vec![feed.address().clone()],
        f.nfr.address().clone(),
    );
    token.set_engine(engine.address().clone());

    env.set_caller(user);
    assert_eq!(
        engine.try_deposit_collateral(token.address().clone(), wad(1)),
        Err(ExecutionError::ReentrantCall.into())
    );
    assert_eq!(
        engine.get_collateral_balance_of_user(user, token.address().clone()),
        U256::zero()
    );
}
