//! Type-safe price representation using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
///
/// Amounts are held in the currency's standard unit (dollars, not cents) as
/// a [`Decimal`], never a float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit.
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

    /// Create a USD price from a whole-cent amount.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self {
            amount: Decimal::new(cents, 2),
            currency_code: CurrencyCode::USD,
        }
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn line_total(&self, quantity: u32) -> Self {
        Self {
            amount: self.amount * Decimal::from(quantity),
            currency_code: self.currency_code,
        }
    }

    /// Apply a percentage discount (e.g. 20 means 20% off).
    ///
    /// Discounts outside 0..=100 are clamped.
    #[must_use]
    pub fn discounted(&self, percent: Decimal) -> Self {
        let percent = percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        let factor = (Decimal::ONE_HUNDRED - percent) / Decimal::ONE_HUNDRED;
        Self {
            amount: self.amount * factor,
            currency_code: self.currency_code,
        }
    }

    /// Format for display (e.g. `$19.99`).
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes supported by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Currency symbol for display.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "\u{20ac}",
            Self::GBP => "\u{a3}",
        }
    }

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cents_builds_dollars() {
        let price = Price::from_cents(12000);
        assert_eq!(price.display(), "$120.00");
    }

    #[test]
    fn line_total_multiplies_by_quantity() {
        let price = Price::from_cents(1250);
        assert_eq!(price.line_total(3).amount, Decimal::new(3750, 2));
    }

    #[test]
    fn discount_is_clamped() {
        let price = Price::from_cents(10000);
        assert_eq!(
            price.discounted(Decimal::from(20)).amount,
            Decimal::from(80)
        );
        assert_eq!(
            price.discounted(Decimal::from(150)).amount,
            Decimal::ZERO
        );
    }
}
