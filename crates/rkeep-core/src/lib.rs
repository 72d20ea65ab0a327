//! Core library for receipt total extraction.
//!
//! This crate provides:
//! - Keyword/currency candidate scanning over OCR text
//! - Tip/gratuity context filtering and tiered total resolution
//! - A confirm/reject/manual-review workflow with an async session driver
//! - Image-to-text collaborators (pure Rust OCR behind the `native` feature)

pub mod error;
pub mod models;
pub mod ocr;
pub mod receipt;
pub mod workflow;

pub use error::{RecognitionError, RkeepError, Result, RuleError, WorkflowError};
pub use models::config::{ExtractionConfig, OcrConfig, RkeepConfig};
pub use models::expense::{ExpenseCategory, ExpenseDraft};
pub use ocr::{PlainTextRecognizer, TextRecognizer};
#[cfg(feature = "native")]
pub use ocr::PureOcrRecognizer;
pub use receipt::rules::{Candidate, FormattedAmount, Tier};
pub use receipt::{ExtractionReport, ExtractionResult, TotalExtractor};
pub use workflow::{
    ExtractionWorkflow, ScanSession, SessionId, SessionOutcome, UserAction, WorkflowEvent,
    WorkflowState,
};
