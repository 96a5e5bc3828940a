//! Type-safe price representation using decimal arithmetic.
//!
//! Shopify returns money as a decimal string plus an ISO 4217 currency code.
//! Amounts are parsed into [`Decimal`] so totals never go through floats.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code (e.g., "USD").
    pub currency_code: String,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub fn new(amount: Decimal, currency_code: impl Into<String>) -> Self {
        Self {
            amount,
            currency_code: currency_code.into(),
        }
    }

    /// Parse a price from the string amount Shopify returns.
    ///
    /// Returns `None` if the amount is not a valid decimal.
    #[must_use]
    pub fn parse(amount: &str, currency_code: impl Into<String>) -> Option<Self> {
        Decimal::from_str(amount.trim())
            .ok()
            .map(|amount| Self::new(amount, currency_code))
    }

    /// Price multiplied by a line quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self {
            amount: self.amount * Decimal::from(quantity),
            currency_code: self.currency_code.clone(),
        }
    }

    /// Format for display with two decimal places (e.g., "19.99 USD").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{:.2} {}", self.amount, self.currency_code)
    }
}
