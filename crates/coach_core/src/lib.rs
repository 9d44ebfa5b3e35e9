pub mod domain;
pub mod mutability;
pub mod outcome;
pub mod ports;

pub use domain::{
    ActivityDraft, ActivityRecord, ActivityType, ActivityUpdate, Credentials, DashboardSnapshot,
    DeliveryState, EnergyLevel, GoalsUpdate, Message, Role, SessionToken, SignupDetails,
};
pub use mutability::{can_edit, editable_until, ensure_editable, EditAvailability, EditWindowExpired};
pub use outcome::{OutcomeClass, RequestOutcome};
pub use ports::{
    ApiResponse, Clock, HttpTransport, Method, Operation, PortError, PortResult, TokenStore,
    TransportError,
};
