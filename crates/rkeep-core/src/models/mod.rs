//! Data models for rkeep.

pub mod config;
pub mod expense;

pub use config::{ExtractionConfig, OcrConfig, RkeepConfig};
pub use expense::{ExpenseCategory, ExpenseDraft};
