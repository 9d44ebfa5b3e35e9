//! services/mobile_client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter for the coaching backend.
//! It implements the `HttpTransport` port from the `core` crate using `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use coach_core::domain::SessionToken;
use coach_core::ports::{ApiResponse, HttpTransport, Method, Operation, TransportError};
use serde_json::Value;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `HttpTransport` against a JSON API.
///
/// Response deadlines are not set here; the executor bounds each attempt.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Creates a new `ReqwestTransport` rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

//=========================================================================================
// `HttpTransport` Trait Implementation
//=========================================================================================

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        operation: &Operation,
        token: Option<&SessionToken>,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(&operation.path);
        debug!(
            method = operation.method.as_str(),
            url = %url,
            authenticated = token.is_some(),
            "API request"
        );

        let mut request = match operation.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        if let Some(token) = token {
            request = request.bearer_auth(token.expose());
        }
        if let Some(body) = &operation.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;

        // Error pages and empty bodies come through as Null.
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        debug!(status, path = %operation.path, "API response");
        Ok(ApiResponse { status, body })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}
