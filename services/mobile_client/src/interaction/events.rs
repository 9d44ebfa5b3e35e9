//! services/mobile_client/src/interaction/events.rs
//!
//! Events the interaction core pushes to whatever front end is attached.

use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Represents the notifications a front end can show without polling.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// The backend looked dormant. One automatic retry fires after `retry_in_secs`.
    ServiceStarting { message: String, retry_in_secs: u64 },

    /// The stored session token was rejected and has been discarded.
    /// The UI should send the user back to sign-in.
    SessionExpired,

    /// A conversation turn was submitted and is awaiting its reply.
    TurnStarted { message_id: Uuid },

    /// A conversation turn finished; `delivered` is false when it failed.
    TurnResolved { message_id: Uuid, delivered: bool },
}

/// Sending half of the event stream. Events are dropped when nobody listens.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<ClientEvent>>,
}

impl EventSink {
    /// Creates a sink together with the receiver a front end reads from.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that discards everything.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: ClientEvent) {
        if let Some(tx) = &self.tx {
            // A closed receiver only means the front end went away.
            let _ = tx.send(event);
        }
    }
}
