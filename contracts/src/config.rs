//! Protocol risk parameters.
//!
//! All monetary values are `U256` integers at 18-decimal scale. The parameters are
//! fixed at compile time; there is no governance path that changes them after deployment.

use odra::prelude::*;
use odra::casper_types::U256;

/// Internal precision (1e18)
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Decimals every price feed must report in
pub const FEED_DECIMALS: u8 = 8;

/// Scales an 8-decimal feed answer up to 18 decimals (1e10)
pub const ADDITIONAL_FEED_PRECISION: u128 = 10_000_000_000;

/// Share of nominal collateral value counted towards solvency (50 / 100 = 200% overcollateralized)
pub const LIQUIDATION_THRESHOLD: u64 = 50;

/// Denominator for threshold and bonus percentages
pub const LIQUIDATION_PRECISION: u64 = 100;

/// Extra collateral paid to a liquidator, in percent of the covered debt (10%)
pub const LIQUIDATION_BONUS: u64 = 10;

/// Health factor below which a position can be liquidated (1.0)
pub const MIN_HEALTH_FACTOR: u128 = PRECISION;

/// Expected update interval of a price feed, in seconds (1 hour)
pub const FEED_HEARTBEAT_SECONDS: u64 = 3_600;

/// Number of missed heartbeats tolerated before a quote is stale
pub const STALENESS_HEARTBEAT_MULTIPLIER: u64 = 3;

/// Maximum quote age, in seconds (3 hours)
pub const PRICE_TIMEOUT_SECONDS: u64 = FEED_HEARTBEAT_SECONDS * STALENESS_HEARTBEAT_MULTIPLIER;

/// Snapshot of the risk parameters, returned by the engine for off-chain tooling
#[odra::odra_type]
pub struct RiskParameters {
    /// Internal precision
    pub precision: U256,
    /// Feed answer rescale factor
    pub additional_feed_precision: U256,
    /// Required feed decimals
    pub feed_decimals: u8,
    /// Liquidation threshold numerator
    pub liquidation_threshold: u64,
    /// Denominator for threshold and bonus
    pub liquidation_precision: u64,
    /// Liquidation bonus numerator
    pub liquidation_bonus: u64,
    /// Minimum health factor (scaled by 1e18)
    pub min_health_factor: U256,
    /// Maximum accepted quote age in seconds
    pub price_timeout_seconds: u64,
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self {
            precision: U256::from(PRECISION),
            additional_feed_precision: U256::from(ADDITIONAL_FEED_PRECISION),
            feed_decimals: FEED_DECIMALS,
            liquidation_threshold: LIQUIDATION_THRESHOLD,
            liquidation_precision: LIQUIDATION_PRECISION,
            liquidation_bonus: LIQUIDATION_BONUS,
            min_health_factor: U256::from(MIN_HEALTH_FACTOR),
            price_timeout_seconds: PRICE_TIMEOUT_SECONDS,
        }
    }
}
