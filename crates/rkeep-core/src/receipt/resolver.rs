//! Tiered selection of the final total among surviving candidates.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rules::amounts::FormattedAmount;
use super::rules::patterns::Tier;
use super::rules::scanner::Candidate;

/// Outcome of one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "amount", rename_all = "snake_case")]
pub enum ExtractionResult {
    /// A total was found.
    Found(FormattedAmount),
    /// No keyword/number pair survived.
    NotFound,
}

impl ExtractionResult {
    pub fn amount(&self) -> Option<FormattedAmount> {
        match self {
            Self::Found(amount) => Some(*amount),
            Self::NotFound => None,
        }
    }
}

/// Picks the largest primary-tier amount, falling back to the largest secondary one.
#[derive(Debug, Default, Clone, Copy)]
pub struct TotalAmountResolver;

impl TotalAmountResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, candidates: &[Candidate]) -> ExtractionResult {
        for tier in [Tier::Primary, Tier::Secondary] {
            let best = candidates
                .iter()
                .filter(|c| c.tier == tier)
                .filter_map(|c| FormattedAmount::new(c.amount).ok().map(|a| (a, c)))
                .max_by(|a, b| a.0.cmp(&b.0));

            if let Some((amount, best)) = best {
                debug!("Resolved {:?} total {} ({})", tier, amount, best.keyword);
                return ExtractionResult::Found(amount);
            }
        }

        ExtractionResult::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn candidate(keyword: &str, tier: Tier, amount: &str) -> Candidate {
        Candidate {
            keyword: keyword.to_string(),
            tier,
            amount: Decimal::from_str(amount).unwrap(),
            offset: 0,
            len: amount.len(),
        }
    }

    fn found(amount: &str) -> ExtractionResult {
        ExtractionResult::Found(amount.parse().unwrap())
    }

    #[test]
    fn test_max_primary_regardless_of_order() {
        let mut candidates = vec![
            candidate("Total", Tier::Primary, "38.10"),
            candidate("TOTAL", Tier::Primary, "42.57"),
            candidate("total", Tier::Primary, "40"),
        ];
        let resolver = TotalAmountResolver::new();

        assert_eq!(resolver.resolve(&candidates), found("42.57"));
        candidates.reverse();
        assert_eq!(resolver.resolve(&candidates), found("42.57"));
    }

    #[test]
    fn test_primary_beats_larger_secondary() {
        let candidates = vec![
            candidate("Balance due", Tier::Secondary, "500.00"),
            candidate("Total", Tier::Primary, "12.00"),
        ];
        assert_eq!(TotalAmountResolver::new().resolve(&candidates), found("12.00"));
    }

    #[test]
    fn test_secondary_fallback() {
        let candidates = vec![
            candidate("Subtotal", Tier::Secondary, "40.00"),
            candidate("Balance Due", Tier::Secondary, "45.00"),
        ];
        assert_eq!(TotalAmountResolver::new().resolve(&candidates), found("45.00"));
    }

    #[test]
    fn test_not_found() {
        assert_eq!(TotalAmountResolver::new().resolve(&[]), ExtractionResult::NotFound);
    }

    #[test]
    fn test_two_decimal_output() {
        let candidates = vec![candidate("Total", Tier::Primary, "42")];
        let result = TotalAmountResolver::new().resolve(&candidates);
        assert_eq!(result.amount().unwrap().to_string(), "42.00");
    }

    #[test]
    fn test_amount_without_room_for_cents_is_ignored() {
        let candidates = vec![
            candidate("Total", Tier::Primary, "9999999999999999999999999999"),
            candidate("Subtotal", Tier::Secondary, "18.00"),
        ];
        assert_eq!(TotalAmountResolver::new().resolve(&candidates), found("18.00"));
    }
}
