//! Shared fakes for the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use client_lib::adapters::MemoryTokenStore;
use client_lib::config::ClientConfig;
use client_lib::interaction::{ClientEvent, ClientState, EventSink};
use coach_core::domain::SessionToken;
use coach_core::ports::{
    ApiResponse, Clock, HttpTransport, Operation, PortResult, TokenStore, TransportError,
};
use serde_json::Value;
use tokio::sync::{mpsc, Semaphore};

//=========================================================================================
// Scripted Transport
//=========================================================================================

/// What the fake backend does for one call.
pub enum Step {
    Respond(u16, Value),
    Fail(TransportError),
    /// Never answers; only the executor's timeout ends the attempt.
    Hang,
    /// Waits for a permit, then responds.
    Gated(Arc<Semaphore>, u16, Value),
}

/// A recorded call.
#[derive(Debug, Clone)]
pub struct Call {
    pub operation: Operation,
    pub token: Option<SessionToken>,
}

pub struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Call>>,
    count: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
            count: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Yields until at least `n` calls have reached the transport.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.call_count() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(
        &self,
        operation: &Operation,
        token: Option<&SessionToken>,
    ) -> Result<ApiResponse, TransportError> {
        self.calls.lock().unwrap().push(Call {
            operation: operation.clone(),
            token: token.cloned(),
        });
        let step = self.steps.lock().unwrap().pop_front();
        self.count.fetch_add(1, Ordering::SeqCst);

        match step {
            Some(Step::Respond(status, body)) => Ok(ApiResponse { status, body }),
            Some(Step::Fail(e)) => Err(e),
            Some(Step::Hang) => std::future::pending().await,
            Some(Step::Gated(gate, status, body)) => {
                let _permit = gate.acquire().await.expect("gate closed");
                Ok(ApiResponse { status, body })
            }
            None => Err(TransportError::Other("script exhausted".into())),
        }
    }
}

//=========================================================================================
// Token Store and Clock
//=========================================================================================

/// In-memory store that counts how often it is cleared.
#[derive(Default)]
pub struct CountingTokenStore {
    inner: MemoryTokenStore,
    clears: AtomicUsize,
}

impl CountingTokenStore {
    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenStore for CountingTokenStore {
    async fn get(&self) -> PortResult<Option<SessionToken>> {
        self.inner.get().await
    }

    async fn set(&self, token: &SessionToken) -> PortResult<()> {
        self.inner.set(token).await
    }

    async fn clear(&self) -> PortResult<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear().await
    }
}

pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(now)))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.0.lock().unwrap() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

//=========================================================================================
// Wiring
//=========================================================================================

pub fn test_config() -> ClientConfig {
    ClientConfig::from_lookup(|key| match key {
        "COACH_API_BASE_URL" => Some("http://coach.test".to_string()),
        "COACH_TOKEN_PATH" => Some("/nonexistent/session.json".to_string()),
        _ => None,
    })
    .expect("test config")
}

pub struct Harness {
    pub state: ClientState,
    pub transport: Arc<ScriptedTransport>,
    pub store: Arc<CountingTokenStore>,
    pub events: mpsc::UnboundedReceiver<ClientEvent>,
}

impl Harness {
    pub async fn new(steps: Vec<Step>) -> Self {
        Self::build(steps, None, Arc::new(client_lib::adapters::SystemClock)).await
    }

    pub async fn signed_in(steps: Vec<Step>, token: &str) -> Self {
        Self::build(steps, Some(token), Arc::new(client_lib::adapters::SystemClock)).await
    }

    pub async fn with_clock(steps: Vec<Step>, token: Option<&str>, clock: Arc<dyn Clock>) -> Self {
        Self::build(steps, token, clock).await
    }

    async fn build(steps: Vec<Step>, token: Option<&str>, clock: Arc<dyn Clock>) -> Self {
        let transport = ScriptedTransport::new(steps);
        let store = Arc::new(CountingTokenStore::default());
        if let Some(token) = token {
            store.set(&SessionToken::new(token)).await.unwrap();
        }
        let (sink, events) = EventSink::channel();
        let state = ClientState::new(
            Arc::new(test_config()),
            transport.clone(),
            store.clone(),
            clock,
            sink,
        )
        .await
        .unwrap();
        Self {
            state,
            transport,
            store,
            events,
        }
    }

    /// Drains whatever events were emitted so far.
    pub fn drain_events(&mut self) -> Vec<ClientEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }
}

pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(2000);
