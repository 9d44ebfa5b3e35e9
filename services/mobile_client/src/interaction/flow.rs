//! services/mobile_client/src/interaction/flow.rs
//!
//! Error surface for the form-style flows (sign-in, activity logging, goals).
//! Unlike the conversation transcript, these surface server-provided
//! validation detail to the user verbatim.

use coach_core::mutability::EditWindowExpired;
use coach_core::outcome::RequestOutcome;
use coach_core::ports::PortError;
use serde_json::Value;

const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "The server is still starting. Please try again in a moment.";

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// Input rejected before any request was made.
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    EditWindowExpired(#[from] EditWindowExpired),

    /// The server rejected the input; the text is its own detail.
    #[error("{0}")]
    Rejected(String),

    #[error("Your session has expired. Please sign in again.")]
    SessionExpired,

    /// Still no answer after the automatic cold-start retry.
    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Failed(String),

    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl FlowError {
    /// Turns a classified outcome into the success payload or a flow error.
    /// `fallback` is the generic text for failures with no usable detail.
    pub fn check(outcome: RequestOutcome, fallback: &str) -> Result<Value, FlowError> {
        match outcome {
            RequestOutcome::Success { payload } => Ok(payload),
            RequestOutcome::ValidationError { message } => Err(FlowError::Rejected(message)),
            RequestOutcome::AuthExpired { .. } => Err(FlowError::SessionExpired),
            RequestOutcome::ColdStart { .. } => {
                Err(FlowError::Unavailable(SERVICE_UNAVAILABLE_MESSAGE.to_string()))
            }
            RequestOutcome::Unknown { .. } => Err(FlowError::Failed(fallback.to_string())),
        }
    }
}
