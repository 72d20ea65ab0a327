//! Scan → tip filter → resolve pipeline over one block of receipt text.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::RuleError;
use crate::models::config::ExtractionConfig;

use super::resolver::{ExtractionResult, TotalAmountResolver};
use super::rules::{AmountCandidateScanner, Candidate, ExtractionRules, TipContextFilter, DEFAULT_RULES};

/// Full account of one extraction, for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    /// Resolved total.
    pub result: ExtractionResult,
    /// Every keyword/number match in the text.
    pub candidates: Vec<Candidate>,
    /// Matches that survived tip filtering.
    pub kept: Vec<Candidate>,
    /// Text the extraction ran on.
    pub raw_text: String,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Receipt total extractor. Cheap to clone; the compiled rules are shared.
#[derive(Debug, Clone)]
pub struct TotalExtractor {
    rules: Arc<ExtractionRules>,
    resolver: TotalAmountResolver,
}

impl TotalExtractor {
    /// Create an extractor with the default keyword policy.
    pub fn new() -> Self {
        Self::with_rules(DEFAULT_RULES.clone())
    }

    /// Compile an extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, RuleError> {
        Ok(Self::with_rules(ExtractionRules::compile(config)?))
    }

    pub fn with_rules(rules: ExtractionRules) -> Self {
        Self {
            rules: Arc::new(rules),
            resolver: TotalAmountResolver::new(),
        }
    }

    pub fn rules(&self) -> &ExtractionRules {
        &self.rules
    }

    /// Resolve the receipt total in `text`.
    pub fn extract(&self, text: &str) -> ExtractionResult {
        self.report(text).result
    }

    /// Resolve the receipt total and keep the intermediate candidates.
    pub fn report(&self, text: &str) -> ExtractionReport {
        let start = Instant::now();

        let candidates = AmountCandidateScanner::new(&self.rules).scan(text);
        let kept = TipContextFilter::new(&self.rules).filter(text, candidates.clone());
        debug!(
            "{} of {} candidates survived tip filtering",
            kept.len(),
            candidates.len()
        );

        let result = self.resolver.resolve(&kept);
        let processing_time_ms = start.elapsed().as_millis() as u64;

        match result {
            ExtractionResult::Found(amount) => info!("Receipt total resolved: {}", amount),
            ExtractionResult::NotFound => info!("No receipt total found"),
        }

        ExtractionReport {
            result,
            candidates,
            kept,
            raw_text: text.to_string(),
            processing_time_ms,
        }
    }
}

impl Default for TotalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn found(amount: &str) -> ExtractionResult {
        ExtractionResult::Found(amount.parse().unwrap())
    }

    #[test]
    fn test_subtotal_tax_total() {
        let extractor = TotalExtractor::new();
        assert_eq!(
            extractor.extract("Subtotal $40.00\nTax $2.00\nTotal $42.00"),
            found("42.00")
        );
    }

    #[test]
    fn test_balance_due_fallback_when_far_from_gratuity() {
        let filler = "Thank you for dining with us, please come again soon. ".repeat(3);
        let text = format!(
            "Subtotal $40.00\nSuggested Gratuity $5.00\n{filler}\nBalance Due $45.00"
        );
        let report = TotalExtractor::new().report(&text);

        assert_eq!(report.candidates.len(), 2);
        assert_eq!(report.kept.len(), 1);
        assert_eq!(report.kept[0].keyword, "Balance Due");
        assert_eq!(report.result, found("45.00"));
    }

    #[test]
    fn test_balance_due_near_gratuity_is_excluded() {
        let text = "Subtotal $40.00\nSuggested Gratuity $5.00\nBalance Due $45.00";
        assert_eq!(TotalExtractor::new().extract(text), ExtractionResult::NotFound);
    }

    #[test]
    fn test_tip_adjacent_total_excluded_but_distant_total_wins() {
        let extractor = TotalExtractor::new();
        assert_eq!(extractor.extract("Tip $5.00 Total $47.00"), ExtractionResult::NotFound);

        let filler = "-".repeat(110);
        let text = format!("Tip $5.00 Total $47.00\n{filler}\nTOTAL $52.00");
        assert_eq!(extractor.extract(&text), found("52.00"));
    }

    #[test]
    fn test_no_numbers() {
        let extractor = TotalExtractor::new();
        assert_eq!(extractor.extract("TOTAL\nThank you"), ExtractionResult::NotFound);
        assert_eq!(extractor.extract(""), ExtractionResult::NotFound);
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(
            TotalExtractor::new().extract("GRAND TOTAL CAD$1,234.56"),
            found("1234.56")
        );
    }

    #[test]
    fn test_amount_too_large_for_cents() {
        let extractor = TotalExtractor::new();
        assert_eq!(
            extractor.extract("Total 9999999999999999999999999999"),
            ExtractionResult::NotFound
        );
        assert_eq!(
            extractor.extract("Total 9999999999999999999999999999\nSubtotal 12.50"),
            found("12.50")
        );
    }

    #[test]
    fn test_largest_primary_total() {
        let text = "Total before tax 18.00\nHST 2.34\nTotal 20.34\nRounded Total 20.35";
        assert_eq!(TotalExtractor::new().extract(text), found("20.35"));
    }

    #[test]
    fn test_custom_keywords() {
        let config = ExtractionConfig {
            primary_keywords: vec!["Amount Paid".to_string()],
            ..ExtractionConfig::default()
        };
        let extractor = TotalExtractor::from_config(&config).unwrap();
        assert_eq!(extractor.extract("Subtotal 9.00\nAmount Paid 10.00"), found("10.00"));
    }

    #[test]
    fn test_report_keeps_raw_text() {
        let text = "Total $3.00";
        let report = TotalExtractor::new().report(text);
        assert_eq!(report.raw_text, text);
        assert_eq!(report.kept, report.candidates);
    }
}
