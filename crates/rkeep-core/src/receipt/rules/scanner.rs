//! Keyword + currency + number candidate scanning.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::amounts::parse_receipt_amount;
use super::patterns::{ExtractionRules, Tier};

/// A keyword/number pair found in receipt text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// The keyword literal that matched.
    pub keyword: String,
    /// Tier of the keyword.
    pub tier: Tier,
    /// Parsed amount with thousands separators removed.
    pub amount: Decimal,
    /// Byte offset of the numeric token in the source text.
    pub offset: usize,
    /// Byte length of the numeric token.
    pub len: usize,
}

impl Candidate {
    /// Byte range of the numeric token.
    pub fn span(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Finds every non-overlapping keyword match followed by a number.
pub struct AmountCandidateScanner<'r> {
    rules: &'r ExtractionRules,
}

impl<'r> AmountCandidateScanner<'r> {
    pub fn new(rules: &'r ExtractionRules) -> Self {
        Self { rules }
    }

    /// Scan `text` left to right. Tokens that fail to parse are skipped.
    pub fn scan(&self, text: &str) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for caps in self.rules.amount.captures_iter(text) {
            let (Some(keyword), Some(number)) = (caps.get(1), caps.get(3)) else {
                continue;
            };

            let Some(tier) = self.rules.tier_of(keyword.as_str()) else {
                continue;
            };

            match parse_receipt_amount(number.as_str()) {
                Some(amount) => candidates.push(Candidate {
                    keyword: keyword.as_str().to_string(),
                    tier,
                    amount,
                    offset: number.start(),
                    len: number.len(),
                }),
                None => {
                    debug!(
                        "Dropping malformed numeric token {:?} after {:?}",
                        number.as_str(),
                        keyword.as_str()
                    );
                }
            }
        }

        debug!("Scanned {} amount candidates", candidates.len());
        candidates
    }
}
