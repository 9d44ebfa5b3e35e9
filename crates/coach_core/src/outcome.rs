//! crates/coach_core/src/outcome.rs
//!
//! Classification of a single request attempt. The classifier is pure: it
//! maps a raw response or a transport failure to a `RequestOutcome`, in the
//! priority order cold start, expired session, rejected input, anything else.

use serde_json::Value;

use crate::ports::{ApiResponse, TransportError};

/// Interim status shown while a dormant backend is being woken up.
pub const SERVICE_STARTING_MESSAGE: &str = "Waking up the server, please wait...";

const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";
const GENERIC_VALIDATION_MESSAGE: &str = "The request could not be completed.";
const GENERIC_UNKNOWN_MESSAGE: &str = "Something went wrong. Please try again.";

/// The class of an attempt's result, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeClass {
    Success,
    ColdStart,
    AuthExpired,
    ValidationError,
    Unknown,
}

/// The classified result of one request attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    Success { payload: Value },
    ColdStart { message: String },
    AuthExpired { message: String },
    ValidationError { message: String },
    Unknown { message: String },
}

impl RequestOutcome {
    pub fn class(&self) -> OutcomeClass {
        match self {
            Self::Success { .. } => OutcomeClass::Success,
            Self::ColdStart { .. } => OutcomeClass::ColdStart,
            Self::AuthExpired { .. } => OutcomeClass::AuthExpired,
            Self::ValidationError { .. } => OutcomeClass::ValidationError,
            Self::Unknown { .. } => OutcomeClass::Unknown,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Success { payload } => Some(payload),
            _ => None,
        }
    }

    /// The failure text, `None` on success.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::ColdStart { message }
            | Self::AuthExpired { message }
            | Self::ValidationError { message }
            | Self::Unknown { message } => Some(message),
        }
    }
}

/// Classifies an attempt that never produced an HTTP response.
pub fn classify_transport(error: &TransportError) -> RequestOutcome {
    match error {
        TransportError::Timeout | TransportError::Connect(_) => RequestOutcome::ColdStart {
            message: SERVICE_STARTING_MESSAGE.to_string(),
        },
        TransportError::Other(_) => RequestOutcome::Unknown {
            message: GENERIC_UNKNOWN_MESSAGE.to_string(),
        },
    }
}

/// Classifies an attempt that produced an HTTP response.
pub fn classify_response(response: ApiResponse) -> RequestOutcome {
    match response.status {
        200..=299 => RequestOutcome::Success {
            payload: response.body,
        },
        401 => RequestOutcome::AuthExpired {
            message: server_detail(&response.body)
                .unwrap_or_else(|| SESSION_EXPIRED_MESSAGE.to_string()),
        },
        400..=499 => RequestOutcome::ValidationError {
            message: server_detail(&response.body)
                .unwrap_or_else(|| GENERIC_VALIDATION_MESSAGE.to_string()),
        },
        _ => RequestOutcome::Unknown {
            message: GENERIC_UNKNOWN_MESSAGE.to_string(),
        },
    }
}

/// Pulls the human-readable `detail` out of an error body.
///
/// Accepts a plain string or a list of `{ "msg": ... }` entries.
pub fn server_detail(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => {
            let parts: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        _ => None,
    }
}
