pub mod activities;
pub mod auth;
pub mod conversation;
pub mod dashboard;
pub mod events;
pub mod executor;
pub mod flow;
pub mod goals;
pub mod progress;
pub mod session_token;
pub mod state;

// Re-export the pieces a front end wires together.
pub use conversation::{ConversationSession, SessionPhase, TurnError, TurnReport};
pub use events::{ClientEvent, EventSink};
pub use executor::{ExecuteOptions, RequestExecutor};
pub use flow::FlowError;
pub use progress::{ProgressDriver, ProgressState, THINKING_PHASES};
pub use session_token::SessionTokens;
pub use state::ClientState;
