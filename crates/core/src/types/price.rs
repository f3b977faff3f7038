//! Type-safe price representation using decimal arithmetic.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing a price amount.
#[derive(Debug, Error)]
#[error("invalid price amount {amount:?}: {source}")]
pub struct PriceError {
    amount: String,
    #[source]
    source: rust_decimal::Error,
}

/// A price with currency information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Parse a decimal amount string as returned by Shopify (e.g. "129.0").
    ///
    /// # Errors
    ///
    /// Returns `PriceError` if `amount` is not a decimal number.
    pub fn parse(amount: &str, currency_code: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(amount.trim()).map_err(|source| PriceError {
            amount: amount.to_owned(),
            source,
        })?;
        Ok(Self::new(amount, CurrencyCode::from_code(currency_code)))
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        let amount = self.amount.round_dp(2);
        match self.currency_code.symbol() {
            Some(symbol) => format!("{symbol}{amount:.2}"),
            None => format!("{amount:.2} {}", self.currency_code.code()),
        }
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    /// Any other ISO code, displayed by code.
    Other(String),
}

impl CurrencyCode {
    /// Map an ISO code to a currency. Unknown codes are kept verbatim.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "USD" => Self::USD,
            "EUR" => Self::EUR,
            "GBP" => Self::GBP,
            "CAD" => Self::CAD,
            "AUD" => Self::AUD,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::Other(code) => code,
        }
    }

    #[must_use]
    pub const fn symbol(&self) -> Option<&'static str> {
        match self {
            Self::USD | Self::CAD | Self::AUD => Some("$"),
            Self::EUR => Some("€"),
            Self::GBP => Some("£"),
            Self::Other(_) => None,
        }
    }
}
