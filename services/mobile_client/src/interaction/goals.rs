//! services/mobile_client/src/interaction/goals.rs

use coach_core::domain::GoalsUpdate;
use coach_core::ports::Operation;
use serde_json::json;
use tracing::info;

use crate::interaction::flow::FlowError;
use crate::interaction::state::ClientState;

const GOALS_FAILED: &str = "Could not update goals.";

/// POST /api/profiles/update from raw form input.
pub async fn update_goals(
    state: &ClientState,
    primary_goal: &str,
    focus_areas: &str,
) -> Result<GoalsUpdate, FlowError> {
    let goals = GoalsUpdate::from_input(primary_goal, focus_areas)
        .map_err(|e| FlowError::Invalid(e.to_string()))?;

    let body = json!({
        "primary_goal": goals.primary_goal,
        "focus_areas": goals.focus_areas,
    });
    let outcome = state
        .executor
        .execute(&Operation::post("/api/profiles/update", body), &state.interactive_options())
        .await;
    FlowError::check(outcome, GOALS_FAILED)?;
    info!(focus_areas = goals.focus_areas.len(), "Goals updated.");
    Ok(goals)
}
