//! Error types for the rkeep-core library.

use thiserror::Error;

/// Main error type for the rkeep library.
#[derive(Error, Debug)]
pub enum RkeepError {
    /// Image-to-text recognition error.
    #[error("recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    /// Workflow transition error.
    #[error("workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    /// Extraction rule compilation error.
    #[error("rule error: {0}")]
    Rules(#[from] RuleError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the image-to-text collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    /// The input could not be decoded as an image (or as text).
    #[error("could not decode input: {0}")]
    Decode(String),

    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The OCR engine failed while processing a decoded image.
    #[error("recognition failed: {0}")]
    Engine(String),
}

/// Errors related to the confirmation workflow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// The event is not valid in the current state.
    #[error("event {event} is not valid in state {state}")]
    InvalidTransition { state: String, event: String },
}

/// Errors raised while compiling extraction rules from configuration.
#[derive(Error, Debug)]
pub enum RuleError {
    /// A keyword list that must not be empty was empty.
    #[error("no {0} keywords configured")]
    EmptyKeywords(&'static str),

    /// The generated pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result type for the rkeep library.
pub type Result<T> = std::result::Result<T, RkeepError>;
