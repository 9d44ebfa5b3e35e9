//! services/mobile_client/src/interaction/state.rs
//!
//! Defines the client's shared state and the per-conversation session factory.

use std::sync::Arc;

use coach_core::ports::{Clock, HttpTransport, PortResult, TokenStore};

use crate::config::ClientConfig;
use crate::interaction::conversation::ConversationSession;
use crate::interaction::events::EventSink;
use crate::interaction::executor::{ExecuteOptions, RequestExecutor};
use crate::interaction::progress::ProgressDriver;
use crate::interaction::session_token::SessionTokens;

//=========================================================================================
// ClientState (Shared Across All Flows)
//=========================================================================================

/// The shared client state, created once at startup and passed to every flow.
#[derive(Clone)]
pub struct ClientState {
    pub config: Arc<ClientConfig>,
    pub tokens: Arc<SessionTokens>,
    pub clock: Arc<dyn Clock>,
    pub executor: Arc<RequestExecutor>,
    pub events: EventSink,
}

impl ClientState {
    /// Wires the adapters together, loading any token that survived the last run.
    pub async fn new(
        config: Arc<ClientConfig>,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn TokenStore>,
        clock: Arc<dyn Clock>,
        events: EventSink,
    ) -> PortResult<Self> {
        let tokens = Arc::new(SessionTokens::load(store).await?);
        let executor = Arc::new(RequestExecutor::new(
            transport,
            Arc::clone(&tokens),
            events.clone(),
        ));
        Ok(Self {
            config,
            tokens,
            clock,
            executor,
            events,
        })
    }

    pub fn interactive_options(&self) -> ExecuteOptions {
        ExecuteOptions::interactive(&self.config)
    }

    pub fn cold_start_options(&self) -> ExecuteOptions {
        ExecuteOptions::cold_start(&self.config)
    }

    /// Options for sign-in and sign-up: cold-start bounds, no session token.
    pub fn auth_options(&self) -> ExecuteOptions {
        self.cold_start_options().anonymous()
    }

    /// Opens a fresh conversation. The analysis call may be the first to
    /// reach a dormant backend, so it uses the cold-start timeout.
    pub fn conversation(&self) -> ConversationSession {
        ConversationSession::new(
            Arc::clone(&self.executor),
            ProgressDriver::new(self.config.progress_interval),
            Arc::clone(&self.clock),
            self.cold_start_options(),
            self.events.clone(),
        )
    }
}
