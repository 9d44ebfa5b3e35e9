//! services/mobile_client/src/interaction/activities.rs
//!
//! Activity logging, editing and deletion. Editing and deletion share the
//! same edit-window gate and check it before any request is made.

use coach_core::domain::{ActivityDraft, ActivityRecord, ActivityType, ActivityUpdate};
use coach_core::mutability::{ensure_editable, EditAvailability};
use coach_core::ports::Operation;
use serde_json::{json, Value};
use tracing::info;

use crate::interaction::flow::FlowError;
use crate::interaction::state::ClientState;

const LOG_FAILED: &str = "Failed to log activity. Try again.";
const UPDATE_FAILED: &str = "Could not update session.";
const DELETE_FAILED: &str = "Could not delete session.";
const TYPES_FAILED: &str = "Could not load activity types.";

fn log_path(id: i64) -> String {
    format!("/api/activities/log/{}", id)
}

/// What a record view should offer right now.
pub fn availability(state: &ClientState, record: &ActivityRecord) -> EditAvailability {
    EditAvailability::for_record(record, state.clock.now())
}

/// GET /api/activity-types/
pub async fn activity_types(state: &ClientState) -> Result<Vec<ActivityType>, FlowError> {
    let outcome = state
        .executor
        .execute(&Operation::get("/api/activity-types/"), &state.interactive_options())
        .await;
    let payload = FlowError::check(outcome, TYPES_FAILED)?;
    serde_json::from_value(payload).map_err(|_| FlowError::Failed(TYPES_FAILED.to_string()))
}

/// POST /api/activities/log, dated today and marked completed.
pub async fn log_activity(state: &ClientState, draft: &ActivityDraft) -> Result<Value, FlowError> {
    draft
        .validate()
        .map_err(|e| FlowError::Invalid(e.to_string()))?;

    let today = state.clock.now().date_naive().format("%Y-%m-%d").to_string();
    let body = json!({
        "activity_name": draft.name.trim(),
        "duration_minutes": draft.duration_minutes,
        "notes": draft.notes,
        "energy_level": draft.energy_level,
        "date": today,
        "completed": true,
    });
    let outcome = state
        .executor
        .execute(&Operation::post("/api/activities/log", body), &state.interactive_options())
        .await;
    let created = FlowError::check(outcome, LOG_FAILED)?;
    info!(activity = %draft.name, "Activity logged.");
    Ok(created)
}

/// PUT /api/activities/log/{id}, only inside the edit window.
pub async fn update_activity(
    state: &ClientState,
    record: &ActivityRecord,
    update: &ActivityUpdate,
) -> Result<Value, FlowError> {
    ensure_editable(record, state.clock.now())?;
    update
        .validate()
        .map_err(|e| FlowError::Invalid(e.to_string()))?;

    let body = json!({
        "activity_name": update.name.trim(),
        "duration_minutes": update.duration_minutes,
        "notes": update.notes,
        "energy_level": update.energy_level,
    });
    let outcome = state
        .executor
        .execute(&Operation::put(log_path(record.id), body), &state.interactive_options())
        .await;
    let updated = FlowError::check(outcome, UPDATE_FAILED)?;
    info!(record_id = record.id, "Activity updated.");
    Ok(updated)
}

/// DELETE /api/activities/log/{id}, gated exactly like editing.
pub async fn delete_activity(state: &ClientState, record: &ActivityRecord) -> Result<(), FlowError> {
    ensure_editable(record, state.clock.now())?;

    let outcome = state
        .executor
        .execute(&Operation::delete(log_path(record.id)), &state.interactive_options())
        .await;
    FlowError::check(outcome, DELETE_FAILED)?;
    info!(record_id = record.id, "Activity deleted.");
    Ok(())
}
