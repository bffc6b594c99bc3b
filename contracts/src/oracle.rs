//! Price oracle adapter.
//!
//! Turns a raw feed quote into an 18-decimal USD price, or rejects it:
//! - quotes older than `PRICE_TIMEOUT_SECONDS` are stale
//! - zero or negative answers are invalid
//! - feeds not reporting `FEED_DECIMALS` cannot be rescaled with the fixed factor
//!
//! A rejected quote never yields a usable valuation; the caller reverts.

use odra::casper_types::U256;
use crate::config::{ADDITIONAL_FEED_PRECISION, FEED_DECIMALS, PRICE_TIMEOUT_SECONDS};
use crate::errors::EngineError;
use crate::types::PriceQuote;

/// Age of a quote at `now_secs`. Quotes stamped in the future are treated as fresh.
pub fn quote_age(quote: &PriceQuote, now_secs: u64) -> u64 {
    now_secs.saturating_sub(quote.updated_at)
}

/// Validate `quote` against `timeout_secs` and rescale it to 18 decimals.
pub fn validated_price(
    quote: &PriceQuote,
    now_secs: u64,
    timeout_secs: u64,
) -> Result<U256, EngineError> {
    if quote_age(quote, now_secs) > timeout_secs {
        return Err(EngineError::StalePrice);
    }
    if quote.answer <= 0 {
        return Err(EngineError::InvalidPrice);
    }
    if quote.decimals != FEED_DECIMALS {
        return Err(EngineError::FeedDecimalsMismatch);
    }

    // answer > 0 was checked above
    let answer = U256::from(quote.answer as u64);
    answer
        .checked_mul(U256::from(ADDITIONAL_FEED_PRECISION))
        .ok_or(EngineError::ArithmeticOverflow)
}

/// [`validated_price`] with the protocol staleness window.
pub fn stale_checked_price(quote: &PriceQuote, now_secs: u64) -> Result<U256, EngineError> {
    validated_price(quote, now_secs, PRICE_TIMEOUT_SECONDS)
}
