//! Common types used across the engine.

use odra::prelude::*;
use odra::casper_types::U256;

/// Raw quote returned by a price feed
#[odra::odra_type]
#[derive(Copy)]
pub struct PriceQuote {
    /// Signed answer in the feed's native decimals
    pub answer: i64,
    /// Decimal places of `answer`
    pub decimals: u8,
    /// Timestamp of the last update, in seconds
    pub updated_at: u64,
}

/// Debt and collateral summary of a position
#[odra::odra_type]
pub struct AccountInformation {
    /// Total NFR minted by the user (debt)
    pub total_nfr_minted: U256,
    /// USD value of all deposited collateral (18 decimals)
    pub collateral_value_in_usd: U256,
}

/// Result of a single liquidation call
#[odra::odra_type]
pub struct LiquidationOutcome {
    /// Liquidated position owner
    pub user: Address,
    /// Collateral token seized
    pub token: Address,
    /// NFR debt repaid by the liquidator
    pub debt_covered: U256,
    /// Collateral worth exactly `debt_covered`
    pub collateral_equivalent: U256,
    /// Bonus collateral on top of the equivalent
    pub bonus_collateral: U256,
    /// Total collateral transferred to the liquidator
    pub collateral_seized: U256,
}
