//! Amount parsing and two-decimal formatting for receipt totals.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Parse a numeric token as printed on a receipt (e.g. "1,234.56", "42", ".99").
///
/// Commas are thousands separators and are dropped. Returns `None` when the
/// remaining digits do not form a decimal that can be kept to cents.
pub fn parse_receipt_amount(token: &str) -> Option<Decimal> {
    let value = parse_decimal(token)?;
    FormattedAmount::new(value).ok().map(|_| value)
}

fn parse_decimal(token: &str) -> Option<Decimal> {
    let cleaned: String = token.chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.starts_with('.') {
        format!("0{}", cleaned)
    } else {
        cleaned
    };

    Decimal::from_str(&normalized).ok()
}

/// Format an amount with exactly two fractional digits ("42" -> "42.00").
pub fn format_amount(amount: Decimal) -> Result<String, AmountParseError> {
    FormattedAmount::new(amount).map(|a| a.to_string())
}

/// A non-negative amount fixed at two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct FormattedAmount(Decimal);

impl FormattedAmount {
    /// Round half away from zero to cents. Negative input is clamped to zero.
    ///
    /// Fails when the amount has too many integer digits to carry two
    /// fractional digits.
    pub fn new(amount: Decimal) -> Result<Self, AmountParseError> {
        let mut value = amount
            .max(Decimal::ZERO)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        value.rescale(2);
        if value.scale() != 2 {
            return Err(AmountParseError::OutOfRange(amount.to_string()));
        }
        Ok(Self(value))
    }
}

impl fmt::Display for FormattedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when manual amount input cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountParseError {
    /// Not a number.
    #[error("not a valid amount: {0}")]
    Invalid(String),

    /// Negative values never describe a receipt total.
    #[error("amount must not be negative: {0}")]
    Negative(String),

    /// Too large to hold with cents.
    #[error("amount is too large: {0}")]
    OutOfRange(String),
}

impl FromStr for FormattedAmount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let unsigned = trimmed.trim_start_matches('$');
        if unsigned.starts_with('-') {
            return Err(AmountParseError::Negative(trimmed.to_string()));
        }
        parse_decimal(unsigned)
            .ok_or_else(|| AmountParseError::Invalid(trimmed.to_string()))
            .and_then(Self::new)
    }
}

impl From<FormattedAmount> for String {
    fn from(amount: FormattedAmount) -> Self {
        amount.to_string()
    }
}

impl TryFrom<String> for FormattedAmount {
    type Error = AmountParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_receipt_amount() {
        assert_eq!(parse_receipt_amount("1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_receipt_amount("42"), Some(dec("42")));
        assert_eq!(parse_receipt_amount(".99"), Some(dec("0.99")));
        assert_eq!(parse_receipt_amount("12,345,678.90"), Some(dec("12345678.90")));
    }

    #[test]
    fn test_parse_rejects_unrepresentable() {
        assert_eq!(parse_receipt_amount(","), None);
        assert_eq!(parse_receipt_amount("123456789012345678901234567890123"), None);
        // Fits a Decimal, but not with two fractional digits.
        assert_eq!(parse_receipt_amount("9999999999999999999999999999"), None);
    }

    #[test]
    fn test_largest_amount_keeps_cents() {
        let amount = FormattedAmount::new(dec("99999999999999999999999999")).unwrap();
        assert_eq!(amount.to_string(), "99999999999999999999999999.00");
        assert_eq!(
            FormattedAmount::new(dec("9999999999999999999999999999")),
            Err(AmountParseError::OutOfRange("9999999999999999999999999999".to_string()))
        );
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec("42")).unwrap(), "42.00");
        assert_eq!(format_amount(dec("1234.5")).unwrap(), "1234.50");
        assert_eq!(format_amount(dec("19.999")).unwrap(), "20.00");
        assert_eq!(format_amount(dec("0.125")).unwrap(), "0.13");
        assert_eq!(format_amount(dec("7.12345")).unwrap(), "7.12");
        assert_eq!(format_amount(dec("-4.20")).unwrap(), "0.00");
    }

    #[test]
    fn test_formatted_amount_always_two_digits() {
        for input in ["0", "1", "1.1", "1.10", "1.105", "99999.9", "0.001"] {
            let formatted = format_amount(dec(input)).unwrap();
            let (_, fraction) = formatted.split_once('.').unwrap();
            assert_eq!(fraction.len(), 2, "input {input} gave {formatted}");
        }
    }

    #[test]
    fn test_manual_entry_parsing() {
        assert_eq!("$45.5".parse::<FormattedAmount>().unwrap().to_string(), "45.50");
        assert_eq!(" 1,200 ".parse::<FormattedAmount>().unwrap().to_string(), "1200.00");
        assert_eq!(
            "-3.00".parse::<FormattedAmount>(),
            Err(AmountParseError::Negative("-3.00".to_string()))
        );
        assert!(matches!(
            "abc".parse::<FormattedAmount>(),
            Err(AmountParseError::Invalid(_))
        ));
        assert!(matches!(
            "9,999,999,999,999,999,999,999,999,999".parse::<FormattedAmount>(),
            Err(AmountParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_serializes_as_string() {
        let amount = FormattedAmount::new(dec("42")).unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"42.00\"");
        let back: FormattedAmount = serde_json::from_str("\"42.00\"").unwrap();
        assert_eq!(back, amount);
        assert!(serde_json::from_str::<FormattedAmount>("\"9999999999999999999999999999\"").is_err());
    }
}
