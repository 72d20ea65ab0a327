//! Regex patterns compiled from the keyword/currency/tip policy.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RuleError;
use crate::models::config::ExtractionConfig;

/// Numeric token: digits with optional thousands separators and an optional
/// decimal point, at least one digit.
pub const NUMBER_PATTERN: &str = r"[0-9,]*\.?[0-9]+";

/// Number inside a tip window (tip lines are often printed without cents).
pub const TIP_NUMBER_PATTERN: &str = r"\$?[0-9]+\.?[0-9]*";

lazy_static! {
    /// Rules compiled from [`ExtractionConfig::default`].
    pub static ref DEFAULT_RULES: ExtractionRules =
        ExtractionRules::compile(&ExtractionConfig::default()).unwrap();
}

/// Priority class of a total keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Labels the payable total ("Total").
    Primary,
    /// Fallback labels ("Subtotal", "Balance due").
    Secondary,
}

/// Compiled extraction policy. Immutable and shareable across threads.
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    /// `(keyword)[\s\S]*?(currency)?(number)`.
    pub(crate) amount: Regex,
    /// `(tip keyword)[\s\S]*?\$?number`.
    pub(crate) tip: Regex,
    tiers: HashMap<String, Tier>,
    tip_window_chars: usize,
}

impl ExtractionRules {
    /// Compile rules from configuration.
    pub fn compile(config: &ExtractionConfig) -> Result<Self, RuleError> {
        if config.primary_keywords.is_empty() && config.secondary_keywords.is_empty() {
            return Err(RuleError::EmptyKeywords("total"));
        }
        if config.tip_keywords.is_empty() {
            return Err(RuleError::EmptyKeywords("tip"));
        }

        let mut tiers = HashMap::new();
        // A literal listed in both tiers counts as primary.
        for keyword in &config.secondary_keywords {
            tiers.insert(keyword.clone(), Tier::Secondary);
        }
        for keyword in &config.primary_keywords {
            tiers.insert(keyword.clone(), Tier::Primary);
        }

        let keywords = alternation(tiers.keys().map(String::as_str));
        let amount = if config.currency_symbols.is_empty() {
            format!(r"({keywords})[\s\S]*?()({NUMBER_PATTERN})")
        } else {
            let currencies = alternation(config.currency_symbols.iter().map(String::as_str));
            format!(r"({keywords})[\s\S]*?({currencies})?({NUMBER_PATTERN})")
        };

        let tip_keywords = alternation(config.tip_keywords.iter().map(String::as_str));
        let tip = format!(r"({tip_keywords})[\s\S]*?{TIP_NUMBER_PATTERN}");

        Ok(Self {
            amount: Regex::new(&amount)?,
            tip: Regex::new(&tip)?,
            tiers,
            tip_window_chars: config.tip_window_chars,
        })
    }

    /// Tier of a matched keyword literal.
    pub fn tier_of(&self, keyword: &str) -> Option<Tier> {
        self.tiers.get(keyword).copied()
    }

    /// Characters inspected on each side of a numeric token.
    pub fn tip_window_chars(&self) -> usize {
        self.tip_window_chars
    }
}

/// Escaped alternation, longest literal first so it wins at a shared start.
fn alternation<'a>(literals: impl Iterator<Item = &'a str>) -> String {
    let mut literals: Vec<&str> = literals.filter(|l| !l.is_empty()).collect();
    literals.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    literals.dedup();
    literals
        .into_iter()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers() {
        assert_eq!(DEFAULT_RULES.tier_of("Total"), Some(Tier::Primary));
        assert_eq!(DEFAULT_RULES.tier_of("SUBTOTAL"), Some(Tier::Secondary));
        assert_eq!(DEFAULT_RULES.tier_of("Balance Due"), Some(Tier::Secondary));
        assert_eq!(DEFAULT_RULES.tier_of("Amount"), None);
    }

    #[test]
    fn test_alternation_prefers_longer_literal() {
        assert_eq!(alternation(["CA", "CAD$", "$", "CA$"].into_iter()), r"CAD\$|CA\$|CA|\$");
    }

    #[test]
    fn test_currency_is_optional() {
        let caps = DEFAULT_RULES.amount.captures("Total 12.50").unwrap();
        assert_eq!(&caps[1], "Total");
        assert!(caps.get(2).is_none());
        assert_eq!(&caps[3], "12.50");

        let caps = DEFAULT_RULES.amount.captures("TOTAL CAD$ 1,020.00").unwrap();
        assert_eq!(&caps[3], "1,020.00");
    }

    #[test]
    fn test_empty_keywords_rejected() {
        let config = ExtractionConfig {
            primary_keywords: Vec::new(),
            secondary_keywords: Vec::new(),
            ..ExtractionConfig::default()
        };
        assert!(matches!(
            ExtractionRules::compile(&config),
            Err(RuleError::EmptyKeywords("total"))
        ));
    }

    #[test]
    fn test_no_currency_symbols() {
        let config = ExtractionConfig {
            currency_symbols: Vec::new(),
            ..ExtractionConfig::default()
        };
        let rules = ExtractionRules::compile(&config).unwrap();
        let caps = rules.amount.captures("Total: 9.99").unwrap();
        assert_eq!(&caps[3], "9.99");
    }
}
