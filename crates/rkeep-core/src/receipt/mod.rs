//! Receipt total-amount extraction.

mod extractor;
mod resolver;
pub mod rules;

pub use extractor::{ExtractionReport, TotalExtractor};
pub use resolver::{ExtractionResult, TotalAmountResolver};
