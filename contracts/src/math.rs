//! Health factor and liquidation math.
//!
//! Pure fixed-point functions over `U256` at 18-decimal scale. Every formula multiplies
//! before it divides, and every division truncates toward zero. The truncation direction
//! is noted per function: it always leaves rounding dust with the protocol.

use odra::casper_types::U256;
use crate::config::{
    LIQUIDATION_BONUS, LIQUIDATION_PRECISION, LIQUIDATION_THRESHOLD, MIN_HEALTH_FACTOR, PRECISION,
};
use crate::errors::EngineError;

/// Collateral sizing for a single liquidation call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidationSizing {
    /// Collateral worth exactly the covered debt
    pub collateral_equivalent: U256,
    /// Bonus collateral actually paid (after capping)
    pub bonus_collateral: U256,
    /// Total collateral taken from the position
    pub total_collateral_seized: U256,
}

fn precision() -> U256 {
    U256::from(PRECISION)
}

/// USD value of `amount` tokens at `price` (both 18 decimals).
///
/// `price * amount / PRECISION`, truncated: values are rounded down.
pub fn usd_value(price: U256, amount: U256) -> Result<U256, EngineError> {
    let scaled = price
        .checked_mul(amount)
        .ok_or(EngineError::ArithmeticOverflow)?;
    Ok(scaled / precision())
}

/// Token amount worth `usd_amount` at `price`.
///
/// `usd_amount * PRECISION / price`, truncated: a liquidator receives slightly less, never more.
pub fn token_amount_from_usd(price: U256, usd_amount: U256) -> Result<U256, EngineError> {
    if price.is_zero() {
        return Err(EngineError::InvalidPrice);
    }
    let scaled = usd_amount
        .checked_mul(precision())
        .ok_or(EngineError::ArithmeticOverflow)?;
    Ok(scaled / price)
}

/// Collateral value that counts towards solvency.
///
/// `collateral_value * LIQUIDATION_THRESHOLD / LIQUIDATION_PRECISION`, truncated down.
pub fn adjusted_collateral_value(collateral_value: U256) -> Result<U256, EngineError> {
    let scaled = collateral_value
        .checked_mul(U256::from(LIQUIDATION_THRESHOLD))
        .ok_or(EngineError::ArithmeticOverflow)?;
    Ok(scaled / U256::from(LIQUIDATION_PRECISION))
}

/// Health factor of a position, scaled by 1e18.
///
/// A position with no debt is maximally safe and returns `U256::MAX`, whatever its
/// collateral. Otherwise `adjusted * PRECISION / total_minted`, truncated down so a
/// borderline position reads as less healthy.
pub fn health_factor(total_minted: U256, collateral_value: U256) -> Result<U256, EngineError> {
    if total_minted.is_zero() {
        return Ok(U256::MAX);
    }
    let adjusted = adjusted_collateral_value(collateral_value)?;
    let scaled = adjusted
        .checked_mul(precision())
        .ok_or(EngineError::ArithmeticOverflow)?;
    Ok(scaled / total_minted)
}

/// Whether a health factor is at or above the liquidation line.
pub fn is_healthy(health_factor: U256) -> bool {
    health_factor >= U256::from(MIN_HEALTH_FACTOR)
}

/// Liquidation bonus for a collateral equivalent: `equivalent * BONUS / PRECISION`, truncated down.
pub fn liquidation_bonus(collateral_equivalent: U256) -> Result<U256, EngineError> {
    let scaled = collateral_equivalent
        .checked_mul(U256::from(LIQUIDATION_BONUS))
        .ok_or(EngineError::ArithmeticOverflow)?;
    Ok(scaled / U256::from(LIQUIDATION_PRECISION))
}

/// Size a liquidation of `debt_to_cover` against a position holding `available` collateral.
///
/// The bonus-inclusive amount is capped at `available`; when capped, the bonus is whatever
/// remains above the collateral equivalent (possibly zero).
pub fn size_liquidation(
    price: U256,
    debt_to_cover: U256,
    available: U256,
) -> Result<LiquidationSizing, EngineError> {
    let collateral_equivalent = token_amount_from_usd(price, debt_to_cover)?;
    let bonus = liquidation_bonus(collateral_equivalent)?;
    let uncapped = collateral_equivalent
        .checked_add(bonus)
        .ok_or(EngineError::ArithmeticOverflow)?;

    let total_collateral_seized = uncapped.min(available);
    let bonus_collateral = total_collateral_seized.saturating_sub(collateral_equivalent);

    Ok(LiquidationSizing {
        collateral_equivalent,
        bonus_collateral,
        total_collateral_seized,
    })
}
