//! Engine error definitions.

use odra::prelude::*;

/// CDP engine errors
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EngineError {
    // Input errors (1xx)
    NeedsMoreThanZero = 100,
    TokenAddressesAndPriceFeedAddressesMustBeSameLength = 101,
    NotAllowedToken = 102,
    DuplicateCollateralToken = 103,

    // Policy errors (2xx)
    BreaksHealthFactor = 200,
    HealthFactorOk = 201,
    NotEnoughCollateralToRedeem = 202,
    NoTokensToBurn = 203,
    HealthFactorNotImproved = 204,

    // Ledger errors (3xx)
    CollateralLedgerUnderflow = 300,
    DebtLedgerUnderflow = 301,
    ArithmeticOverflow = 302,

    // Dependency errors (4xx)
    TransferFailed = 400,
    MintFailed = 401,
    StalePrice = 402,
    InvalidPrice = 403,
    FeedDecimalsMismatch = 404,

    // Token and feed contract errors (5xx)
    Unauthorized = 500,
    InsufficientBalance = 501,
    InsufficientAllowance = 502,
}

impl EngineError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Input
            EngineError::NeedsMoreThanZero => "Amount must be more than zero",
            EngineError::TokenAddressesAndPriceFeedAddressesMustBeSameLength => {
                "Token addresses and price feed addresses must be the same length"
            }
            EngineError::NotAllowedToken => "Token is not an approved collateral",
            EngineError::DuplicateCollateralToken => "Collateral token listed more than once",

            // Policy
            EngineError::BreaksHealthFactor => "Operation breaks the health factor",
            EngineError::HealthFactorOk => "Health factor is ok, position cannot be liquidated",
            EngineError::NotEnoughCollateralToRedeem => "Not enough collateral to redeem",
            EngineError::NoTokensToBurn => "No tokens to burn",
            EngineError::HealthFactorNotImproved => "Liquidation did not improve the health factor",

            // Ledger
            EngineError::CollateralLedgerUnderflow => "Collateral ledger underflow",
            EngineError::DebtLedgerUnderflow => "Debt ledger underflow",
            EngineError::ArithmeticOverflow => "Arithmetic overflow",

            // Dependency
            EngineError::TransferFailed => "Token transfer failed",
            EngineError::MintFailed => "Mint failed",
            EngineError::StalePrice => "Price feed quote is stale",
            EngineError::InvalidPrice => "Price feed reported a zero or negative price",
            EngineError::FeedDecimalsMismatch => "Price feed decimals mismatch",

            // Token / feed
            EngineError::Unauthorized => "Unauthorized caller",
            EngineError::InsufficientBalance => "Insufficient token balance",
            EngineError::InsufficientAllowance => "Insufficient token allowance",
        }
    }
}

impl core::fmt::Display for EngineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<EngineError> for OdraError {
    fn from(error: EngineError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error as u16)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error as u16, error.message())
        }
    }
}
