//! crates/coach_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the client's core logic.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! core independent of the HTTP stack, the on-device token storage and the
//! system clock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::SessionToken;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for port operations other than HTTP round trips.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// HTTP Round Trips
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// One idempotent-or-safely-retryable call against the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl Operation {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            body: None,
        }
    }
}

/// A raw HTTP response. Non-JSON bodies arrive as `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

/// A round trip that produced no HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("could not reach the service: {0}")]
    Connect(String),
    #[error("transport failure: {0}")]
    Other(String),
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Performs one round trip, attaching the bearer token when present.
    async fn send(
        &self,
        operation: &Operation,
        token: Option<&SessionToken>,
    ) -> Result<ApiResponse, TransportError>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Reads the durable token, if one was stored.
    async fn get(&self) -> PortResult<Option<SessionToken>>;

    async fn set(&self, token: &SessionToken) -> PortResult<()>;

    /// Removes the durable token. Clearing an empty store succeeds.
    async fn clear(&self) -> PortResult<()>;
}

/// Wall-clock source for timestamps and the edit window.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
