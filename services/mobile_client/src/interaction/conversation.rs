//! services/mobile_client/src/interaction/conversation.rs
//!
//! The conversational session: an append-only transcript plus the turn
//! cycle that drives one analysis request per user message.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use coach_core::domain::Message;
use coach_core::outcome::{OutcomeClass, RequestOutcome};
use coach_core::ports::{Clock, Operation};
use serde_json::{json, Value};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::interaction::events::{ClientEvent, EventSink};
use crate::interaction::executor::{ExecuteOptions, RequestExecutor};
use crate::interaction::progress::{ProgressDriver, ProgressState};

pub const ANALYZE_PATH: &str = "/api/intelligence/analyze";

/// Used when a successful reply carries no usable text.
pub const FALLBACK_REPLY: &str = "I've analyzed your data, but couldn't generate a specific response. Try logging more activities!";

/// Used for every failed turn, whatever the cause.
pub const ERROR_REPLY: &str =
    "I apologize, but I encountered an error processing your request. Please try again.";

/// An enum representing whether a turn is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    AwaitingResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("Message is empty.")]
    EmptyInput,
    #[error("Still waiting for the previous reply.")]
    Busy,
    #[error("The conversation has been closed.")]
    Closed,
}

/// What a completed turn produced.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub user_message_id: Uuid,
    pub reply: Message,
    pub outcome: OutcomeClass,
}

impl TurnReport {
    pub fn delivered(&self) -> bool {
        self.outcome == OutcomeClass::Success
    }
}

struct Transcript {
    messages: Vec<Message>,
    phase: SessionPhase,
}

pub struct ConversationSession {
    transcript: Mutex<Transcript>,
    executor: Arc<RequestExecutor>,
    progress: ProgressDriver,
    clock: Arc<dyn Clock>,
    options: ExecuteOptions,
    teardown: CancellationToken,
    events: EventSink,
}

impl ConversationSession {
    pub fn new(
        executor: Arc<RequestExecutor>,
        progress: ProgressDriver,
        clock: Arc<dyn Clock>,
        options: ExecuteOptions,
        events: EventSink,
    ) -> Self {
        let teardown = CancellationToken::new();
        Self {
            transcript: Mutex::new(Transcript {
                messages: Vec::new(),
                phase: SessionPhase::Idle,
            }),
            executor,
            progress,
            clock,
            options: options.with_cancel(teardown.clone()),
            teardown,
            events,
        }
    }

    fn transcript(&self) -> MutexGuard<'_, Transcript> {
        self.transcript.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A snapshot of the transcript in creation order.
    pub fn messages(&self) -> Vec<Message> {
        self.transcript().messages.clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.transcript().phase
    }

    pub fn progress(&self) -> watch::Receiver<ProgressState> {
        self.progress.subscribe()
    }

    pub fn progress_label(&self) -> Option<&'static str> {
        self.progress.current().running.then(|| self.progress.label())
    }

    pub fn is_closed(&self) -> bool {
        self.teardown.is_cancelled()
    }

    /// Tears the session down: stops the progress ticker and abandons any
    /// scheduled retry. The transcript is left as it was.
    pub fn close(&self) {
        self.teardown.cancel();
        self.progress.stop();
        info!("Conversation closed.");
    }

    /// Submits one user message and waits for the assistant's reply.
    ///
    /// Rejected with `Busy` while another turn is outstanding.
    pub async fn submit_turn(&self, text: &str) -> Result<TurnReport, TurnError> {
        let content = text.trim();
        if content.is_empty() {
            return Err(TurnError::EmptyInput);
        }
        if self.is_closed() {
            return Err(TurnError::Closed);
        }

        // 1. Append the pending user message and claim the session.
        let user_message_id = {
            let mut transcript = self.transcript();
            if transcript.phase == SessionPhase::AwaitingResponse {
                return Err(TurnError::Busy);
            }
            let message = Message::pending_user(content, self.clock.now());
            let id = message.id();
            transcript.messages.push(message);
            transcript.phase = SessionPhase::AwaitingResponse;
            id
        };
        let mut pending = PendingTurn {
            session: self,
            message_id: user_message_id,
            settled: false,
        };
        info!(message_id = %user_message_id, "Turn started.");
        self.events.emit(ClientEvent::TurnStarted {
            message_id: user_message_id,
        });

        // 2. Show simulated progress while the request is outstanding.
        let progress = self.progress.run();

        // 3. Ask the backend.
        let operation = Operation::post(ANALYZE_PATH, json!({ "query": content }));
        let outcome = self.executor.execute(&operation, &self.options).await;
        drop(progress);

        if self.is_closed() {
            pending.settled = true;
            info!(message_id = %user_message_id, "Reply arrived after close, discarded.");
            return Err(TurnError::Closed);
        }

        // 4. Resolve the user message and append the reply right after it.
        let class = outcome.class();
        let delivered = outcome.is_success();
        let reply = Message::assistant(reply_text(&outcome), self.clock.now());
        {
            let mut transcript = self.transcript();
            resolve_message(&mut transcript, user_message_id, delivered);
            transcript.messages.push(reply.clone());
            transcript.phase = SessionPhase::Idle;
        }
        pending.settled = true;

        info!(message_id = %user_message_id, outcome = ?class, "Turn resolved.");
        self.events.emit(ClientEvent::TurnResolved {
            message_id: user_message_id,
            delivered,
        });

        Ok(TurnReport {
            user_message_id,
            reply,
            outcome: class,
        })
    }
}

impl Drop for ConversationSession {
    fn drop(&mut self) {
        self.teardown.cancel();
    }
}

/// Settles a turn whose future was dropped before the reply arrived, so the
/// session never stays stuck awaiting a response nobody is waiting for.
struct PendingTurn<'a> {
    session: &'a ConversationSession,
    message_id: Uuid,
    settled: bool,
}

impl Drop for PendingTurn<'_> {
    fn drop(&mut self) {
        if self.settled || self.session.is_closed() {
            return;
        }
        warn!(message_id = %self.message_id, "Turn abandoned before its reply arrived.");
        let mut transcript = self.session.transcript();
        resolve_message(&mut transcript, self.message_id, false);
        transcript.phase = SessionPhase::Idle;
    }
}

fn resolve_message(transcript: &mut Transcript, id: Uuid, delivered: bool) {
    if let Some(message) = transcript.messages.iter_mut().rev().find(|m| m.id() == id) {
        if let Err(e) = message.resolve(delivered) {
            warn!("{}", e);
        }
    }
}

/// The assistant text for an outcome. Failure detail never reaches the
/// transcript.
fn reply_text(outcome: &RequestOutcome) -> String {
    match outcome.payload() {
        Some(payload) => reply_from_payload(payload),
        None => ERROR_REPLY.to_string(),
    }
}

/// Prefers `analysis`, then `message`, then the fallback text.
pub fn reply_from_payload(payload: &Value) -> String {
    ["analysis", "message"]
        .iter()
        .filter_map(|key| payload.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_REPLY.to_string())
}
