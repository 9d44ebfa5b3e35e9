//! services/mobile_client/src/interaction/auth.rs
//!
//! Sign-in, sign-up, sign-out and the startup session check.

use coach_core::domain::{Credentials, SessionToken, SignupDetails};
use coach_core::outcome::RequestOutcome;
use coach_core::ports::Operation;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::interaction::flow::FlowError;
use crate::interaction::state::ClientState;

const LOGIN_FAILED: &str = "Login failed. Check your credentials.";
const SIGNUP_FAILED: &str = "Signup failed. Please try again.";

/// Result of the startup check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    SignedIn,
    SignedOut,
}

/// POST /api/auth/login, storing the issued token.
pub async fn login(state: &ClientState, credentials: &Credentials) -> Result<(), FlowError> {
    // 1. Validate before touching the network
    credentials
        .validate()
        .map_err(|e| FlowError::Invalid(e.to_string()))?;

    // 2. Ask the backend, allowing for a cold start and without any stored token
    let operation = Operation::post(
        "/api/auth/login",
        json!({ "email": credentials.email.trim(), "password": credentials.password }),
    );
    let outcome = state
        .executor
        .execute(&operation, &state.auth_options())
        .await;

    // 3. A 401 here means the credentials were wrong, not that a session lapsed
    let payload = match outcome {
        RequestOutcome::AuthExpired { message } => return Err(FlowError::Rejected(message)),
        other => FlowError::check(other, LOGIN_FAILED)?,
    };

    // 4. Store the token
    let token = access_token(&payload).ok_or_else(|| FlowError::Failed(LOGIN_FAILED.to_string()))?;
    state.tokens.set(token).await?;
    info!("Signed in.");
    Ok(())
}

/// POST /api/auth/register. The user signs in separately afterwards.
pub async fn signup(state: &ClientState, details: &SignupDetails) -> Result<(), FlowError> {
    details
        .validate()
        .map_err(|e| FlowError::Invalid(e.to_string()))?;

    let operation = Operation::post(
        "/api/auth/register",
        json!({
            "name": details.name.trim(),
            "email": details.email.trim(),
            "password": details.password,
        }),
    );
    let outcome = state
        .executor
        .execute(&operation, &state.auth_options())
        .await;
    FlowError::check(outcome, SIGNUP_FAILED)?;
    info!("Account created.");
    Ok(())
}

pub async fn logout(state: &ClientState) -> Result<(), FlowError> {
    state.tokens.clear().await?;
    info!("Signed out.");
    Ok(())
}

/// Verifies a stored token with GET /api/auth/me. Any failure signs the user out.
pub async fn check_session(state: &ClientState) -> Result<SessionStatus, FlowError> {
    if !state.tokens.is_signed_in().await {
        return Ok(SessionStatus::SignedOut);
    }

    let outcome = state
        .executor
        .execute(&Operation::get("/api/auth/me"), &state.interactive_options())
        .await;
    if outcome.is_success() {
        return Ok(SessionStatus::SignedIn);
    }

    warn!(outcome = ?outcome.class(), "Token invalid, signing out.");
    state.tokens.clear().await?;
    Ok(SessionStatus::SignedOut)
}

fn access_token(payload: &Value) -> Option<SessionToken> {
    payload
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(SessionToken::new)
}
