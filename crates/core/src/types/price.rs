//! Type-safe rupee amounts using decimal arithmetic.
//!
//! The storefront only sells in Indian rupees, so a [`Price`] carries no
//! currency code. Amounts are in rupees (not paise) and travel over the wire
//! as plain JSON numbers.

use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Rupee symbol used by [`Price::to_inr`].
const RUPEE_SYMBOL: char = '₹';

/// An amount in Indian rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal rupee amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of rupees.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Format for display the way the `en-IN` locale renders INR currency.
    ///
    /// Uses Indian digit grouping (the last three digits, then pairs) and
    /// always two fraction digits: `₹12,34,567.50`.
    #[must_use]
    pub fn to_inr(&self) -> String {
        let rounded = self.0.round_dp(2);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let formatted = format!("{:.2}", rounded.abs());
        let (whole, fraction) = formatted
            .split_once('.')
            .unwrap_or((formatted.as_str(), "00"));

        let mut out = String::with_capacity(formatted.len() + 8);
        if negative {
            out.push('-');
        }
        out.push(RUPEE_SYMBOL);
        out.push_str(&group_indian(whole));
        out.push('.');
        out.push_str(fraction);
        out
    }
}

/// Insert separators using the Indian numbering system (lakh/crore).
#[allow(clippy::indexing_slicing)] // `digits` is ASCII and every range stays within `head`
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    let mut out = groups.join(",");
    out.push(',');
    out.push_str(tail);
    out
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_inr())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(s: &str) -> Price {
        Price::new(s.parse().unwrap())
    }

    #[test]
    fn test_to_inr_small_amounts() {
        assert_eq!(Price::ZERO.to_inr(), "₹0.00");
        assert_eq!(Price::from_rupees(999).to_inr(), "₹999.00");
        assert_eq!(price("49.5").to_inr(), "₹49.50");
    }

    #[test]
    fn test_to_inr_indian_grouping() {
        assert_eq!(Price::from_rupees(1000).to_inr(), "₹1,000.00");
        assert_eq!(Price::from_rupees(100_000).to_inr(), "₹1,00,000.00");
        assert_eq!(price("1234567.5").to_inr(), "₹12,34,567.50");
        assert_eq!(Price::from_rupees(123_456_789).to_inr(), "₹12,34,56,789.00");
    }

    #[test]
    fn test_to_inr_rounds_to_two_places() {
        assert_eq!(price("10.456").to_inr(), "₹10.46");
    }

    #[test]
    fn test_to_inr_negative() {
        assert_eq!(Price::from_rupees(-1500).to_inr(), "-₹1,500.00");
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [price("99.99").times(2), Price::from_rupees(10).times(3)]
            .into_iter()
            .sum();
        assert_eq!(total, price("229.98"));
    }

    #[test]
    fn test_serde_uses_json_numbers() {
        let parsed: Price = serde_json::from_str("1499.5").unwrap();
        assert_eq!(parsed, price("1499.5"));

        let json = serde_json::to_value(Price::from_rupees(250)).unwrap();
        assert!(json.is_number());
        assert_eq!(json.as_f64(), Some(250.0));
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let from_number: Price = serde_json::from_str("29999").unwrap();
        let from_string: Price = serde_json::from_str("\"29999.00\"").unwrap();
        assert_eq!(from_number, Price::from_rupees(29_999));
        assert_eq!(from_string, Price::from_rupees(29_999));

        let product: crate::Product =
            serde_json::from_str(r#"{"_id": "p1", "name": "Phone", "price": "7499.5"}"#).unwrap();
        assert_eq!(product.price, price("7499.5"));
    }
}
