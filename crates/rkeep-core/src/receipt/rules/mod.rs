//! Rule-based total-amount extraction for receipts.

pub mod amounts;
pub mod patterns;
pub mod scanner;
pub mod tip;

pub use amounts::{format_amount, parse_receipt_amount, AmountParseError, FormattedAmount};
pub use patterns::{ExtractionRules, Tier, DEFAULT_RULES};
pub use scanner::{AmountCandidateScanner, Candidate};
pub use tip::{tip_window, TipContextFilter};
