//! Confirmation workflow around the extracted total.
//!
//! One session runs from a captured image to exactly one return to `Idle`:
//!
//! ```text
//! Idle -> AwaitingImage -> Processing -> AwaitingConfirmation -> Confirmed -> Idle
//!              |                 |                |
//!              v                 +----------------+--> AwaitingManualReview -> Idle
//!           Aborted -> Idle
//! ```
//!
//! Dismissing at any non-terminal state cancels the session. Recognition
//! results tagged with an abandoned session are ignored.

mod session;

pub use session::{ScanSession, SessionOutcome, UserAction};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{RecognitionError, WorkflowError};
use crate::receipt::rules::FormattedAmount;
use crate::receipt::{ExtractionResult, TotalExtractor};

/// Identifies one photo → resolution attempt.
pub type SessionId = u64;

/// Workflow state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkflowState {
    #[default]
    Idle,
    /// An image was captured; waiting for recognition.
    AwaitingImage,
    /// Recognition produced text; extraction pending.
    Processing { text: String },
    /// Waiting for the user to accept or reject `amount`.
    AwaitingConfirmation {
        amount: FormattedAmount,
        full_text: String,
    },
    /// No usable total; the user reads the raw text and enters the amount by hand.
    AwaitingManualReview { full_text: String },
    /// The user approved `amount`.
    Confirmed { amount: FormattedAmount },
    /// The image could not be processed.
    Aborted,
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::AwaitingImage => "AwaitingImage",
            Self::Processing { .. } => "Processing",
            Self::AwaitingConfirmation { .. } => "AwaitingConfirmation",
            Self::AwaitingManualReview { .. } => "AwaitingManualReview",
            Self::Confirmed { .. } => "Confirmed",
            Self::Aborted => "Aborted",
        }
    }

    /// `Confirmed` and `Aborted` end a session; only cleanup remains.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed { .. } | Self::Aborted)
    }
}

/// Events driving the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// A photo was taken or picked from the library.
    ImageCaptured,
    /// The recognizer returned text for `session`.
    RecognitionSucceeded { session: SessionId, text: String },
    /// The recognizer could not process the image for `session`.
    RecognitionFailed {
        session: SessionId,
        error: RecognitionError,
    },
    /// Extraction over the recognized text finished.
    Resolved(ExtractionResult),
    /// The user accepted the proposed total.
    Confirm,
    /// The user rejected the proposed total.
    Reject,
    /// The user closed the screen or acknowledged a notice.
    Dismiss,
    /// The confirmed amount was handed to expense creation.
    SessionEnded,
}

impl WorkflowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ImageCaptured => "ImageCaptured",
            Self::RecognitionSucceeded { .. } => "RecognitionSucceeded",
            Self::RecognitionFailed { .. } => "RecognitionFailed",
            Self::Resolved(_) => "Resolved",
            Self::Confirm => "Confirm",
            Self::Reject => "Reject",
            Self::Dismiss => "Dismiss",
            Self::SessionEnded => "SessionEnded",
        }
    }
}

/// Explicit state machine for one scan screen.
#[derive(Debug, Clone)]
pub struct ExtractionWorkflow {
    state: WorkflowState,
    extractor: TotalExtractor,
    active: Option<SessionId>,
    next_session: SessionId,
}

impl ExtractionWorkflow {
    pub fn new(extractor: TotalExtractor) -> Self {
        Self {
            state: WorkflowState::Idle,
            extractor,
            active: None,
            next_session: 1,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// The session in flight, if any.
    pub fn session(&self) -> Option<SessionId> {
        self.active
    }

    /// Start a session for a newly captured image.
    pub fn capture_image(&mut self) -> Result<SessionId, WorkflowError> {
        self.handle(WorkflowEvent::ImageCaptured)?;
        self.active.ok_or_else(|| WorkflowError::InvalidTransition {
            state: self.state.name().to_string(),
            event: WorkflowEvent::ImageCaptured.name().to_string(),
        })
    }

    /// Run extraction over the text held by `Processing`.
    pub fn process(&mut self) -> Result<&WorkflowState, WorkflowError> {
        let result = match &self.state {
            WorkflowState::Processing { text } => self.extractor.extract(text),
            other => {
                return Err(WorkflowError::InvalidTransition {
                    state: other.name().to_string(),
                    event: "Process".to_string(),
                });
            }
        };
        self.handle(WorkflowEvent::Resolved(result))
    }

    /// Apply one event. Invalid pairs leave the state untouched.
    pub fn handle(&mut self, event: WorkflowEvent) -> Result<&WorkflowState, WorkflowError> {
        if let WorkflowEvent::RecognitionSucceeded { session, .. }
        | WorkflowEvent::RecognitionFailed { session, .. } = &event
        {
            if self.active != Some(*session) {
                warn!("Ignoring recognition result for abandoned session {}", session);
                return Ok(&self.state);
            }
        }

        let current = std::mem::take(&mut self.state);
        let from = current.name();
        let event_name = event.name();

        let next = match (current, event) {
            (WorkflowState::Idle, WorkflowEvent::ImageCaptured) => {
                let session = self.next_session;
                self.next_session += 1;
                self.active = Some(session);
                WorkflowState::AwaitingImage
            }
            (WorkflowState::AwaitingImage, WorkflowEvent::RecognitionSucceeded { text, .. }) => {
                WorkflowState::Processing { text }
            }
            (WorkflowState::AwaitingImage, WorkflowEvent::RecognitionFailed { error, .. }) => {
                warn!("Could not process image: {}", error);
                WorkflowState::Aborted
            }
            (WorkflowState::Processing { text }, WorkflowEvent::Resolved(result)) => match result {
                ExtractionResult::Found(amount) => WorkflowState::AwaitingConfirmation {
                    amount,
                    full_text: text,
                },
                ExtractionResult::NotFound => WorkflowState::AwaitingManualReview { full_text: text },
            },
            (WorkflowState::AwaitingConfirmation { amount, .. }, WorkflowEvent::Confirm) => {
                info!("User confirmed total {}", amount);
                WorkflowState::Confirmed { amount }
            }
            (WorkflowState::AwaitingConfirmation { full_text, .. }, WorkflowEvent::Reject) => {
                WorkflowState::AwaitingManualReview { full_text }
            }
            (
                WorkflowState::Confirmed { .. } | WorkflowState::Aborted,
                WorkflowEvent::SessionEnded | WorkflowEvent::Dismiss,
            ) => self.finish(),
            (
                WorkflowState::AwaitingImage
                | WorkflowState::Processing { .. }
                | WorkflowState::AwaitingConfirmation { .. }
                | WorkflowState::AwaitingManualReview { .. },
                WorkflowEvent::Dismiss,
            ) => {
                info!("Session closed from {}", from);
                self.finish()
            }
            (current, _) => {
                self.state = current;
                return Err(WorkflowError::InvalidTransition {
                    state: from.to_string(),
                    event: event_name.to_string(),
                });
            }
        };

        debug!("Workflow {} --{}--> {}", from, event_name, next.name());
        self.state = next;
        Ok(&self.state)
    }

    fn finish(&mut self) -> WorkflowState {
        self.active = None;
        WorkflowState::Idle
    }
}
