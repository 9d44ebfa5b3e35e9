//! services/mobile_client/src/interaction/dashboard.rs
//!
//! The home dashboard snapshot. Editability of each listed activity is
//! recomputed locally from its creation time; the server's `can_edit` hint
//! is ignored so every surface applies the same gate.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use coach_core::domain::{ActivityRecord, DashboardSnapshot, EnergyLevel, OutcomeEntry, Profile};
use coach_core::ports::Operation;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::interaction::flow::FlowError;
use crate::interaction::state::ClientState;

const DASHBOARD_FAILED: &str = "Could not load your dashboard.";

//=========================================================================================
// Wire Shapes
//=========================================================================================

#[derive(Deserialize)]
struct DashboardPayload {
    #[serde(default)]
    profile: Option<ProfilePayload>,
    #[serde(default)]
    activities: Vec<ActivityPayload>,
    #[serde(default)]
    outcomes: Vec<OutcomePayload>,
    #[serde(default)]
    streak: u32,
    #[serde(default)]
    goals_count: u32,
    #[serde(default)]
    activity_distribution: Value,
    #[serde(default)]
    onboarding: Value,
    #[serde(default)]
    last_sync: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
}

#[derive(Deserialize)]
struct ProfilePayload {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    primary_goal: Option<String>,
    #[serde(default)]
    focus_areas: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct ActivityPayload {
    log_id: i64,
    activity_name: String,
    timestamp: String,
    #[serde(default)]
    duration: Option<u32>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    energy_level: Option<u8>,
}

#[derive(Deserialize)]
struct OutcomePayload {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: Option<String>,
    date: String,
}

//=========================================================================================
// Fetch
//=========================================================================================

/// GET /api/dashboard/
pub async fn fetch_dashboard(state: &ClientState) -> Result<DashboardSnapshot, FlowError> {
    let outcome = state
        .executor
        .execute(&Operation::get("/api/dashboard/"), &state.interactive_options())
        .await;
    let payload = FlowError::check(outcome, DASHBOARD_FAILED)?;
    parse_dashboard(payload)
}

/// Converts the dashboard payload into the domain snapshot.
pub fn parse_dashboard(payload: Value) -> Result<DashboardSnapshot, FlowError> {
    let wire: DashboardPayload = serde_json::from_value(payload).map_err(|e| {
        warn!("Unexpected dashboard payload: {}", e);
        FlowError::Failed(DASHBOARD_FAILED.to_string())
    })?;

    let profile = match wire.profile {
        Some(p) => Profile {
            name: p.name.or(wire.user_name),
            primary_goal: p.primary_goal.unwrap_or_else(|| "No primary goal".to_string()),
            focus_areas: p.focus_areas.unwrap_or_default(),
        },
        None => Profile {
            name: wire.user_name,
            primary_goal: "No primary goal".to_string(),
            focus_areas: Vec::new(),
        },
    };

    let activities = wire
        .activities
        .into_iter()
        .filter_map(|a| {
            let Some(created_at) = parse_timestamp(&a.timestamp) else {
                warn!(log_id = a.log_id, timestamp = %a.timestamp, "Skipping activity with unreadable timestamp.");
                return None;
            };
            Some(ActivityRecord {
                id: a.log_id,
                name: a.activity_name,
                duration_minutes: a.duration,
                energy_level: a.energy_level.and_then(|e| EnergyLevel::new(e).ok()),
                notes: a.notes,
                created_at,
            })
        })
        .collect();

    let outcomes = wire
        .outcomes
        .into_iter()
        .map(|o| OutcomeEntry {
            id: o.id,
            kind: o.kind,
            value: o.value,
            date: o.date,
        })
        .collect();

    Ok(DashboardSnapshot {
        profile,
        activities,
        outcomes,
        streak: wire.streak,
        goals_count: wire.goals_count,
        activity_distribution: wire.activity_distribution,
        onboarding: wire.onboarding,
        last_sync: wire.last_sync,
    })
}

/// Reads RFC 3339, offset-less ISO 8601 (taken as UTC), or a bare date.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
