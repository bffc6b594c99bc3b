//! NFR-CDP Contracts
//!
//! Over-collateralized CDP engine backing the NFR synthetic dollar.
//!
//! ## Architecture
//!
//! - **Engine**: position manager; deposits, mints, repays, redeems and liquidates
//! - **Ledgers**: per-user collateral and debt accounting, owned by the engine
//! - **Math**: health factor and liquidation sizing (pure, 18-decimal fixed point)
//! - **Oracle**: freshness, sign and decimals validation of feed quotes
//! - **PushPriceFeed**: feeder-updated price feed implementing the feed interface
//! - **Stablecoin (NFR)**: CEP-18 token with engine-controlled mint/burn
//!
//! ## Solvency rule
//!
//! Only 50% of nominal collateral value counts towards solvency, so a position needs a
//! 200% collateral ratio to keep its health factor at or above 1.0. Positions below that
//! line can be liquidated by anyone for a 10% collateral bonus.

#![cfg_attr(target_arch = "wasm32", no_std)]

#[cfg(target_arch = "wasm32")]
extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod config;
pub mod errors;
pub mod types;
pub mod interfaces;
pub mod math;
pub mod oracle;

// Contract modules
pub mod ledger;
pub mod price_feed;
pub mod stablecoin;
pub mod engine;
