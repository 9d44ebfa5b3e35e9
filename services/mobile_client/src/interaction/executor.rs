//! services/mobile_client/src/interaction/executor.rs
//!
//! The resilient request executor. Every outbound call goes through
//! [`RequestExecutor::execute`], which bounds each attempt with a timeout,
//! classifies the result, and retries exactly once when the backend looks
//! dormant. It never returns an error: every path ends in a `RequestOutcome`.

use std::sync::Arc;
use std::time::Duration;

use coach_core::outcome::{classify_response, classify_transport, RequestOutcome};
use coach_core::ports::{HttpTransport, Operation, TransportError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::interaction::events::{ClientEvent, EventSink};
use crate::interaction::session_token::SessionTokens;

/// Per-call knobs.
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Upper bound on waiting for a response, per attempt.
    pub timeout: Duration,
    /// Delay before the single retry that follows a cold start.
    pub retry_delay: Duration,
    /// Fires when the owner is torn down; a pending retry is then abandoned.
    pub cancel: Option<CancellationToken>,
    /// Whether the stored session token is attached. Sign-in and sign-up run
    /// without it, so their 401s never touch the stored session.
    pub attach_token: bool,
}

impl ExecuteOptions {
    /// Options for ordinary interactive calls.
    pub fn interactive(config: &ClientConfig) -> Self {
        Self {
            timeout: config.request_timeout,
            retry_delay: config.cold_start_retry_delay,
            cancel: None,
            attach_token: true,
        }
    }

    /// Options for calls that may be the first to reach a sleeping backend.
    pub fn cold_start(config: &ClientConfig) -> Self {
        Self {
            timeout: config.cold_start_timeout,
            retry_delay: config.cold_start_retry_delay,
            cancel: None,
            attach_token: true,
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Sends the call without the session token.
    pub fn anonymous(mut self) -> Self {
        self.attach_token = false;
        self
    }
}

/// Where a logical operation stands. Only `FirstAttempt` can lead to
/// `Retrying`, which caps the retries at one.
enum AttemptState {
    FirstAttempt,
    Retrying,
    Done(RequestOutcome),
}

pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<SessionTokens>,
    events: EventSink,
}

impl RequestExecutor {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<SessionTokens>,
        events: EventSink,
    ) -> Self {
        Self {
            transport,
            tokens,
            events,
        }
    }

    pub fn tokens(&self) -> &Arc<SessionTokens> {
        &self.tokens
    }

    /// Runs `operation` to a classified outcome.
    pub async fn execute(&self, operation: &Operation, options: &ExecuteOptions) -> RequestOutcome {
        let mut state = AttemptState::FirstAttempt;
        loop {
            state = match state {
                AttemptState::FirstAttempt => {
                    let outcome = self.attempt(operation, options).await;
                    let interim = match &outcome {
                        RequestOutcome::ColdStart { message } => Some(message.clone()),
                        _ => None,
                    };
                    match interim {
                        Some(message) => {
                            warn!(
                                path = %operation.path,
                                retry_in = ?options.retry_delay,
                                "Backend did not answer, assuming a cold start."
                            );
                            self.events.emit(ClientEvent::ServiceStarting {
                                message,
                                retry_in_secs: options.retry_delay.as_secs(),
                            });
                            if self.wait_for_retry(options).await {
                                AttemptState::Retrying
                            } else {
                                info!(path = %operation.path, "Owner torn down, retry abandoned.");
                                AttemptState::Done(outcome)
                            }
                        }
                        None => AttemptState::Done(outcome),
                    }
                }
                AttemptState::Retrying => {
                    info!(path = %operation.path, "Retrying after cold start.");
                    AttemptState::Done(self.attempt(operation, options).await)
                }
                AttemptState::Done(outcome) => return outcome,
            };
        }
    }

    /// Sleeps out the retry delay. Returns `false` if cancelled first.
    async fn wait_for_retry(&self, options: &ExecuteOptions) -> bool {
        match &options.cancel {
            Some(cancel) => tokio::select! {
                _ = cancel.cancelled() => false,
                _ = tokio::time::sleep(options.retry_delay) => true,
            },
            None => {
                tokio::time::sleep(options.retry_delay).await;
                true
            }
        }
    }

    /// One bounded round trip plus its side effects.
    async fn attempt(&self, operation: &Operation, options: &ExecuteOptions) -> RequestOutcome {
        let token = if options.attach_token {
            self.tokens.get().await
        } else {
            None
        };
        debug!(
            method = operation.method.as_str(),
            path = %operation.path,
            authenticated = token.is_some(),
            "Sending request."
        );

        let round_trip = self.transport.send(operation, token.as_ref());
        let outcome = match tokio::time::timeout(options.timeout, round_trip).await {
            Err(_elapsed) => classify_transport(&TransportError::Timeout),
            Ok(Err(e)) => {
                debug!(error = %e, "Transport failure.");
                classify_transport(&e)
            }
            Ok(Ok(response)) => classify_response(response),
        };

        match &outcome {
            RequestOutcome::AuthExpired { .. } => {
                if let Some(sent) = &token {
                    match self.tokens.invalidate(sent).await {
                        Ok(true) => {
                            warn!(path = %operation.path, "Session expired or invalid token. Signing out.");
                            self.events.emit(ClientEvent::SessionExpired);
                        }
                        Ok(false) => {}
                        Err(e) => error!("Failed to discard the rejected session token: {}", e),
                    }
                }
            }
            RequestOutcome::Unknown { .. } => {
                error!(path = %operation.path, "Request failed for an unknown reason.");
            }
            _ => {}
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryTokenStore;
    use async_trait::async_trait;
    use coach_core::domain::SessionToken;
    use coach_core::outcome::OutcomeClass;
    use coach_core::ports::{ApiResponse, TokenStore};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    /// Replays a fixed list of results, one per call.
    struct Replay {
        results: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
        calls: AtomicUsize,
    }

    impl Replay {
        fn new(results: Vec<Result<ApiResponse, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results.into()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl HttpTransport for Replay {
        async fn send(
            &self,
            _operation: &Operation,
            _token: Option<&SessionToken>,
        ) -> Result<ApiResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.results
                .lock()
                .await
                .pop_front()
                .unwrap_or(Err(TransportError::Other("script exhausted".into())))
        }
    }

    fn ok(body: serde_json::Value) -> Result<ApiResponse, TransportError> {
        Ok(ApiResponse { status: 200, body })
    }

    fn options() -> ExecuteOptions {
        ExecuteOptions {
            timeout: Duration::from_secs(70),
            retry_delay: Duration::from_secs(60),
            cancel: None,
            attach_token: true,
        }
    }

    async fn executor(
        transport: Arc<Replay>,
    ) -> (RequestExecutor, tokio::sync::mpsc::UnboundedReceiver<ClientEvent>) {
        let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
        let tokens = Arc::new(SessionTokens::load(store).await.unwrap());
        let (events, rx) = EventSink::channel();
        (RequestExecutor::new(transport, tokens, events), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn cold_start_then_success_retries_once() {
        let transport = Replay::new(vec![
            Err(TransportError::Connect("refused".into())),
            ok(json!({"analysis": "done"})),
        ]);
        let (executor, mut events) = executor(transport.clone()).await;

        let started = tokio::time::Instant::now();
        let outcome = executor.execute(&Operation::get("/api/dashboard/"), &options()).await;

        assert!(outcome.is_success());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() >= Duration::from_secs(60));
        assert!(matches!(
            events.try_recv(),
            Ok(ClientEvent::ServiceStarting { retry_in_secs: 60, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn second_cold_start_is_final() {
        let transport = Replay::new(vec![
            Err(TransportError::Timeout),
            Err(TransportError::Connect("refused".into())),
            ok(json!({})),
        ]);
        let (executor, _events) = executor(transport.clone()).await;

        let outcome = executor.execute(&Operation::get("/api/dashboard/"), &options()).await;

        assert_eq!(outcome.class(), OutcomeClass::ColdStart);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn validation_errors_are_not_retried() {
        let transport = Replay::new(vec![
            Ok(ApiResponse {
                status: 400,
                body: json!({"detail": "Activity type 'Juggling' not found."}),
            }),
            ok(json!({})),
        ]);
        let (executor, mut events) = executor(transport.clone()).await;

        let outcome = executor
            .execute(&Operation::post("/api/activities/log", json!({})), &options())
            .await;

        assert_eq!(outcome.class(), OutcomeClass::ValidationError);
        assert_eq!(outcome.message(), Some("Activity type 'Juggling' not found."));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_owner_abandons_the_retry() {
        let transport = Replay::new(vec![Err(TransportError::Timeout), ok(json!({}))]);
        let (executor, _events) = executor(transport.clone()).await;
        let cancel = CancellationToken::new();
        let opts = options().with_cancel(cancel.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            cancel.cancel();
        });

        let outcome = executor.execute(&Operation::get("/api/dashboard/"), &opts).await;
        canceller.await.unwrap();

        assert_eq!(outcome.class(), OutcomeClass::ColdStart);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn anonymous_calls_leave_the_stored_token_alone() {
        let transport = Replay::new(vec![Ok(ApiResponse {
            status: 401,
            body: json!({"detail": "Incorrect email or password"}),
        })]);
        let (executor, mut events) = executor(transport).await;
        executor.tokens().set(SessionToken::new("current")).await.unwrap();

        let outcome = executor
            .execute(
                &Operation::post("/api/auth/login", json!({})),
                &options().anonymous(),
            )
            .await;

        assert_eq!(outcome.class(), OutcomeClass::AuthExpired);
        assert_eq!(executor.tokens().get().await, Some(SessionToken::new("current")));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn unauthorized_without_a_token_clears_nothing() {
        let transport = Replay::new(vec![Ok(ApiResponse {
            status: 401,
            body: json!({"detail": "Not authenticated"}),
        })]);
        let (executor, mut events) = executor(transport).await;

        let outcome = executor.execute(&Operation::get("/api/auth/me"), &options()).await;

        assert_eq!(outcome.class(), OutcomeClass::AuthExpired);
        assert!(events.try_recv().is_err());
    }
}
