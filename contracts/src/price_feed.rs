//! Price feed capability and a push-style feed contract.
//!
//! The engine only depends on [`PriceFeed::latest_quote`]. [`PushPriceFeed`] is a minimal
//! aggregator whose answer is pushed by a single feeder account (the deployer).

use odra::prelude::*;
use crate::errors::EngineError;
use crate::types::PriceQuote;

/// Price feed interface for cross-contract calls
#[odra::external_contract]
pub trait PriceFeed {
    fn latest_quote(&self) -> PriceQuote;
}

/// Feeder-updated price feed
#[odra::module]
pub struct PushPriceFeed {
    /// Account allowed to push answers
    feeder: Var<Address>,
    /// Decimal places of the answer
    decimals: Var<u8>,
    /// Latest answer
    answer: Var<i64>,
    /// Timestamp of the latest answer, in seconds
    updated_at: Var<u64>,
}

#[odra::module]
impl PushPriceFeed {
    /// Initialize the feed with its precision and a first answer
    pub fn init(&mut self, decimals: u8, initial_answer: i64) {
        self.feeder.set(self.env().caller());
        self.decimals.set(decimals);
        self.answer.set(initial_answer);
        self.updated_at.set(self.now_secs());
    }

    /// Latest quote with its update time
    pub fn latest_quote(&self) -> PriceQuote {
        PriceQuote {
            answer: self.latest_answer(),
            decimals: self.decimals(),
            updated_at: self.latest_timestamp(),
        }
    }

    /// Push a new answer stamped with the current block time
    pub fn update_answer(&mut self, answer: i64) {
        self.require_feeder();
        let now = self.now_secs();
        self.answer.set(answer);
        self.updated_at.set(now);
    }

    /// Push a new answer with an explicit update time (backfills, replays)
    pub fn update_round_data(&mut self, answer: i64, updated_at: u64) {
        self.require_feeder();
        self.answer.set(answer);
        self.updated_at.set(updated_at);
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get().unwrap_or(0)
    }

    pub fn latest_answer(&self) -> i64 {
        self.answer.get().unwrap_or(0)
    }

    pub fn latest_timestamp(&self) -> u64 {
        self.updated_at.get().unwrap_or(0)
    }

    pub fn get_feeder(&self) -> Option<Address> {
        self.feeder.get()
    }

    fn require_feeder(&self) {
        if self.feeder.get() != Some(self.env().caller()) {
            self.env().revert(EngineError::Unauthorized);
        }
    }

    fn now_secs(&self) -> u64 {
        // block time is reported in milliseconds
        self.env().get_block_time() / 1000
    }
}
