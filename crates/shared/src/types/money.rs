//! Money type with decimal precision and currency.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` for arbitrary precision.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Represents a monetary amount with currency.
///
/// Uses `Decimal` internally to avoid floating-point precision errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount in major units (e.g., pesos, dollars).
    pub amount: Decimal,
    /// ISO 4217 currency code (e.g., "CLP", "USD").
    pub currency: Currency,
}

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Chilean Peso
    Clp,
    /// Argentine Peso
    Ars,
    /// Colombian Peso
    Cop,
    /// Mexican Peso
    Mxn,
    /// Peruvian Sol
    Pen,
    /// Paraguayan Guarani
    Pyg,
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// Japanese Yen
    Jpy,
    /// South Korean Won
    Krw,
}

impl Currency {
    /// ISO 4217 alphabetic code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Clp => "CLP",
            Self::Ars => "ARS",
            Self::Cop => "COP",
            Self::Mxn => "MXN",
            Self::Pen => "PEN",
            Self::Pyg => "PYG",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Jpy => "JPY",
            Self::Krw => "KRW",
        }
    }

    /// Number of decimal places used when presenting amounts.
    #[must_use]
    pub const fn minor_units(self) -> u32 {
        match self {
            Self::Clp | Self::Pyg | Self::Jpy | Self::Krw => 0,
            _ => 2,
        }
    }
}

impl Money {
    /// Creates a new Money instance.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Decimal places for a currency code. Unknown codes use two.
    #[must_use]
    pub fn minor_units_of(code: &str) -> u32 {
        code.parse::<Currency>().map_or(2, Currency::minor_units)
    }

    /// Formats an amount for a currency code that may not be a known [`Currency`].
    ///
    /// Unknown codes are shown verbatim with two decimal places.
    #[must_use]
    pub fn format_code(amount: Decimal, code: &str) -> String {
        match code.parse::<Currency>() {
            Ok(currency) => Self::new(amount, currency).to_string(),
            Err(_) => format!("{} {}", code.trim().to_uppercase(), group(amount, 2)),
        }
    }
}

/// Rounds to `dp` places and inserts `,` thousands separators.
fn group(amount: Decimal, dp: u32) -> String {
    let rounded = amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.*}", dp as usize, rounded.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}",
            self.currency,
            group(self.amount, self.currency.minor_units())
        )
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CLP" => Ok(Self::Clp),
            "ARS" => Ok(Self::Ars),
            "COP" => Ok(Self::Cop),
            "MXN" => Ok(Self::Mxn),
            "PEN" => Ok(Self::Pen),
            "PYG" => Ok(Self::Pyg),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "JPY" => Ok(Self::Jpy),
            "KRW" => Ok(Self::Krw),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[rstest]
    #[case("CLP", 0)]
    #[case("jpy", 0)]
    #[case("USD", 2)]
    #[case("XYZ", 2)]
    fn test_minor_units_of(#[case] code: &str, #[case] expected: u32) {
        assert_eq!(Money::minor_units_of(code), expected);
    }

    #[rstest]
    #[case(dec!(13000), Currency::Clp, "CLP 13,000")]
    #[case(dec!(1234567.891), Currency::Usd, "USD 1,234,567.89")]
    #[case(dec!(999), Currency::Clp, "CLP 999")]
    #[case(dec!(0), Currency::Eur, "EUR 0.00")]
    #[case(dec!(-2000), Currency::Clp, "CLP -2,000")]
    #[case(dec!(100.5), Currency::Clp, "CLP 101")]
    fn test_money_display(#[case] amount: Decimal, #[case] currency: Currency, #[case] expected: &str) {
        assert_eq!(Money::new(amount, currency).to_string(), expected);
    }

    #[test]
    fn test_format_unknown_code() {
        assert_eq!(Money::format_code(dec!(1500), "xyz"), "XYZ 1,500.00");
        assert_eq!(Money::format_code(dec!(1500), "clp"), "CLP 1,500");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(Currency::from_str("CLP").unwrap(), Currency::Clp);
        assert_eq!(Currency::from_str("usd").unwrap(), Currency::Usd);
        assert!(Currency::from_str("XXX").is_err());
        assert!(Currency::from_str("").is_err());
    }
}
