//! crates/coach_core/src/domain.rs
//!
//! Defines the pure, core data structures for the coaching client.
//! These structs are independent of any transport or storage format; the
//! adapters in the client service translate wire payloads into them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Conversation
//=========================================================================================

/// Who authored a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Delivery lifecycle of a message. Only user messages ever start as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    Pending,
    Delivered,
    Failed,
}

/// Returned when a message that already left `Pending` is resolved again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("message {id} is already {state:?}")]
pub struct AlreadyResolved {
    pub id: Uuid,
    pub state: DeliveryState,
}

/// One turn in a conversation.
///
/// The id, role, content and creation time are fixed at construction. The
/// delivery state moves at most once, from `Pending` to a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    id: Uuid,
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
    delivery_state: DeliveryState,
}

impl Message {
    /// A freshly submitted user message awaiting the outcome of its request.
    pub fn pending_user(content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: content.into(),
            created_at,
            delivery_state: DeliveryState::Pending,
        }
    }

    /// An assistant reply. Assistant messages are born delivered.
    pub fn assistant(content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: content.into(),
            created_at,
            delivery_state: DeliveryState::Delivered,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn delivery_state(&self) -> DeliveryState {
        self.delivery_state
    }

    pub fn is_pending(&self) -> bool {
        self.delivery_state == DeliveryState::Pending
    }

    /// Moves a pending message to `Delivered` or `Failed`.
    pub fn resolve(&mut self, delivered: bool) -> Result<(), AlreadyResolved> {
        if !self.is_pending() {
            return Err(AlreadyResolved {
                id: self.id,
                state: self.delivery_state,
            });
        }
        self.delivery_state = if delivered {
            DeliveryState::Delivered
        } else {
            DeliveryState::Failed
        };
        Ok(())
    }
}

//=========================================================================================
// Activities
//=========================================================================================

/// Self-reported energy on a 1 to 5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct EnergyLevel(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("energy level must be between 1 and 5, got {0}")]
pub struct InvalidEnergyLevel(pub u8);

impl EnergyLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, InvalidEnergyLevel> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidEnergyLevel(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for EnergyLevel {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for EnergyLevel {
    type Error = InvalidEnergyLevel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EnergyLevel> for u8 {
    fn from(level: EnergyLevel) -> Self {
        level.0
    }
}

/// A previously persisted activity entry, as projected onto the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRecord {
    pub id: i64,
    pub name: String,
    pub duration_minutes: Option<u32>,
    pub energy_level: Option<EnergyLevel>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Why a draft or update was rejected before reaching the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("Please provide an activity name and duration.")]
    MissingFields,
}

/// Fields for logging a new activity.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityDraft {
    pub name: String,
    pub duration_minutes: u32,
    pub notes: String,
    pub energy_level: EnergyLevel,
}

impl ActivityDraft {
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.name.trim().is_empty() || self.duration_minutes == 0 {
            return Err(DraftError::MissingFields);
        }
        Ok(())
    }
}

/// Replacement fields for an existing activity. Edits carry the same
/// fields and rules as a new entry.
pub type ActivityUpdate = ActivityDraft;

/// A named kind of activity offered by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityType {
    #[serde(alias = "activity_id")]
    pub id: i64,
    #[serde(alias = "activity_name")]
    pub name: String,
    #[serde(default, alias = "activity_category")]
    pub category: Option<String>,
}

//=========================================================================================
// Goals and Dashboard
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Please set a primary goal.")]
pub struct MissingPrimaryGoal;

/// A new primary goal plus its focus areas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalsUpdate {
    pub primary_goal: String,
    pub focus_areas: Vec<String>,
}

impl GoalsUpdate {
    /// Builds an update from raw form input, where focus areas are comma separated.
    pub fn from_input(primary_goal: &str, focus_areas: &str) -> Result<Self, MissingPrimaryGoal> {
        let primary_goal = primary_goal.trim();
        if primary_goal.is_empty() {
            return Err(MissingPrimaryGoal);
        }
        let focus_areas = focus_areas
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Ok(Self {
            primary_goal: primary_goal.to_string(),
            focus_areas,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: Option<String>,
    pub primary_goal: String,
    pub focus_areas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeEntry {
    pub id: i64,
    pub kind: String,
    pub value: Option<String>,
    pub date: String,
}

/// Everything the home view shows, fetched in one round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub profile: Profile,
    pub activities: Vec<ActivityRecord>,
    pub outcomes: Vec<OutcomeEntry>,
    pub streak: u32,
    pub goals_count: u32,
    pub activity_distribution: serde_json::Value,
    pub onboarding: serde_json::Value,
    pub last_sync: Option<String>,
}

//=========================================================================================
// Authentication
//=========================================================================================

/// An opaque bearer token issued on login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

// Keeps tokens out of logs.
impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("Please fill in all fields")]
pub struct IncompleteForm;

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), IncompleteForm> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(IncompleteForm);
        }
        Ok(())
    }
}

#[derive(Clone, Serialize)]
pub struct SignupDetails {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignupDetails {
    pub fn validate(&self) -> Result<(), IncompleteForm> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() || self.password.is_empty()
        {
            return Err(IncompleteForm);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_message_resolves_exactly_once() {
        let mut msg = Message::pending_user("hello", Utc::now());
        assert!(msg.is_pending());
        msg.resolve(true).unwrap();
        assert_eq!(msg.delivery_state(), DeliveryState::Delivered);

        let err = msg.resolve(false).unwrap_err();
        assert_eq!(err.state, DeliveryState::Delivered);
        assert_eq!(msg.delivery_state(), DeliveryState::Delivered);
    }

    #[test]
    fn assistant_messages_are_born_delivered() {
        let msg = Message::assistant("hi", Utc::now());
        assert_eq!(msg.role(), Role::Assistant);
        assert_eq!(msg.delivery_state(), DeliveryState::Delivered);
        assert!(msg.clone().resolve(true).is_err());
    }

    #[test]
    fn energy_level_bounds() {
        assert!(EnergyLevel::new(0).is_err());
        assert_eq!(EnergyLevel::new(1).unwrap().get(), 1);
        assert_eq!(EnergyLevel::new(5).unwrap().get(), 5);
        assert_eq!(EnergyLevel::new(6), Err(InvalidEnergyLevel(6)));
        assert!(serde_json::from_str::<EnergyLevel>("9").is_err());
        assert_eq!(serde_json::to_string(&EnergyLevel::default()).unwrap(), "3");
    }

    #[test]
    fn draft_requires_name_and_duration() {
        let mut draft = ActivityDraft {
            name: "Deep work".into(),
            duration_minutes: 45,
            notes: String::new(),
            energy_level: EnergyLevel::default(),
        };
        assert!(draft.validate().is_ok());
        draft.duration_minutes = 0;
        assert_eq!(draft.validate(), Err(DraftError::MissingFields));
        draft.duration_minutes = 10;
        draft.name = "   ".into();
        assert_eq!(draft.validate(), Err(DraftError::MissingFields));
    }

    #[test]
    fn updates_follow_the_draft_rules() {
        let update: ActivityUpdate = ActivityDraft {
            name: "Walk".into(),
            duration_minutes: 0,
            notes: "after lunch".into(),
            energy_level: EnergyLevel::new(2).unwrap(),
        };
        assert_eq!(update.validate(), Err(DraftError::MissingFields));
    }

    #[test]
    fn goals_split_focus_areas() {
        let goals = GoalsUpdate::from_input(" Ship the app ", "health, ,focus ,  sleep").unwrap();
        assert_eq!(goals.primary_goal, "Ship the app");
        assert_eq!(goals.focus_areas, vec!["health", "focus", "sleep"]);
        assert_eq!(GoalsUpdate::from_input("  ", "x"), Err(MissingPrimaryGoal));
    }

    #[test]
    fn session_token_debug_is_redacted() {
        let token = SessionToken::new("secret-value");
        assert!(!format!("{token:?}").contains("secret"));
        assert_eq!(token.expose(), "secret-value");
    }

    #[test]
    fn signup_requires_every_field() {
        let details = SignupDetails {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: String::new(),
        };
        assert_eq!(details.validate(), Err(IncompleteForm));
    }
}
