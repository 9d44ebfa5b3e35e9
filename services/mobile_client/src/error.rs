//! services/mobile_client/src/error.rs
//!
//! Defines the primary error type for the client service.

use crate::config::ConfigError;
use crate::interaction::flow::FlowError;
use coach_core::ports::PortError;

/// The primary error type for the `mobile_client` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from building the HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A user-facing failure from one of the interaction flows.
    #[error(transparent)]
    Flow(#[from] FlowError),
}
