//! Async driver running one scan session against a recognizer and a front end.

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::error::{RecognitionError, WorkflowError};
use crate::ocr::TextRecognizer;
use crate::receipt::rules::FormattedAmount;
use crate::receipt::TotalExtractor;

use super::{ExtractionWorkflow, WorkflowEvent, WorkflowState};

/// User input from the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Confirm,
    Reject,
    Dismiss,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The user approved the extracted total.
    Confirmed(FormattedAmount),
    /// No total was accepted; the raw text was shown for manual entry.
    ManualEntry(String),
    /// The image could not be processed.
    Aborted(RecognitionError),
    /// The user dismissed the screen before the session finished.
    Cancelled,
}

/// Drives an [`ExtractionWorkflow`] through one session at a time.
///
/// Every state is published on a watch channel so a front end can render
/// prompts; the front end answers through an mpsc channel of [`UserAction`]s.
/// A closed action channel is treated as a dismissal.
pub struct ScanSession {
    workflow: ExtractionWorkflow,
    states: watch::Sender<WorkflowState>,
}

impl ScanSession {
    /// Create a session driver and a receiver for its state updates.
    pub fn new(extractor: TotalExtractor) -> (Self, watch::Receiver<WorkflowState>) {
        let (states, receiver) = watch::channel(WorkflowState::Idle);
        let session = Self {
            workflow: ExtractionWorkflow::new(extractor),
            states,
        };
        (session, receiver)
    }

    pub fn state(&self) -> &WorkflowState {
        self.workflow.state()
    }

    /// Run one session for `image`. Always returns with the workflow back at `Idle`.
    ///
    /// A session left unfinished by a dropped `run` future (e.g. under
    /// `tokio::time::timeout`) is dismissed before the new one starts.
    pub async fn run<R: TextRecognizer>(
        &mut self,
        image: &[u8],
        recognizer: &R,
        actions: &mut mpsc::Receiver<UserAction>,
    ) -> Result<SessionOutcome, WorkflowError> {
        if !matches!(self.workflow.state(), WorkflowState::Idle) {
            warn!(
                "Dismissing unfinished session in state {}",
                self.workflow.state().name()
            );
            self.apply(WorkflowEvent::Dismiss)?;
        }

        let session = self.workflow.capture_image()?;
        self.publish();
        debug!("Scan session {} started ({} bytes)", session, image.len());

        let recognition = recognizer.recognize(image);
        tokio::pin!(recognition);

        let event = loop {
            tokio::select! {
                biased;

                result = &mut recognition => {
                    break match result {
                        Ok(text) => WorkflowEvent::RecognitionSucceeded { session, text },
                        Err(error) => WorkflowEvent::RecognitionFailed { session, error },
                    };
                }
                action = actions.recv() => match action {
                    Some(UserAction::Dismiss) | None => {
                        // Dropping the recognition future discards its result.
                        self.apply(WorkflowEvent::Dismiss)?;
                        return Ok(SessionOutcome::Cancelled);
                    }
                    Some(other) => warn!("Ignoring {:?} while recognition is running", other),
                },
            }
        };

        let failure = match &event {
            WorkflowEvent::RecognitionFailed { error, .. } => Some(error.clone()),
            _ => None,
        };
        self.apply(event)?;

        if let Some(error) = failure {
            // Wait for the user to dismiss the failure notice.
            loop {
                match actions.recv().await {
                    Some(UserAction::Dismiss) | None => break,
                    Some(other) => warn!("Ignoring {:?} while showing a failure", other),
                }
            }
            self.apply(WorkflowEvent::Dismiss)?;
            return Ok(SessionOutcome::Aborted(error));
        }

        self.workflow.process()?;
        self.publish();

        loop {
            let action = actions.recv().await.unwrap_or(UserAction::Dismiss);

            match (self.workflow.state().clone(), action) {
                (WorkflowState::AwaitingConfirmation { .. }, UserAction::Confirm) => {
                    self.apply(WorkflowEvent::Confirm)?;
                    let amount = match self.workflow.state() {
                        WorkflowState::Confirmed { amount } => *amount,
                        other => {
                            return Err(WorkflowError::InvalidTransition {
                                state: other.name().to_string(),
                                event: "Confirm".to_string(),
                            });
                        }
                    };
                    self.apply(WorkflowEvent::SessionEnded)?;
                    info!("Scan session {} confirmed {}", session, amount);
                    return Ok(SessionOutcome::Confirmed(amount));
                }
                (WorkflowState::AwaitingConfirmation { .. }, UserAction::Reject) => {
                    self.apply(WorkflowEvent::Reject)?;
                }
                (WorkflowState::AwaitingConfirmation { .. }, UserAction::Dismiss) => {
                    self.apply(WorkflowEvent::Dismiss)?;
                    return Ok(SessionOutcome::Cancelled);
                }
                (WorkflowState::AwaitingManualReview { full_text }, UserAction::Dismiss) => {
                    self.apply(WorkflowEvent::Dismiss)?;
                    info!("Scan session {} left for manual entry", session);
                    return Ok(SessionOutcome::ManualEntry(full_text));
                }
                (state, action) => {
                    warn!("Ignoring {:?} in state {}", action, state.name());
                }
            }
        }
    }

    fn apply(&mut self, event: WorkflowEvent) -> Result<(), WorkflowError> {
        self.workflow.handle(event)?;
        self.publish();
        Ok(())
    }

    fn publish(&self) {
        self.states.send_replace(self.workflow.state().clone());
    }
}
