//! Types for conference attendees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the attendee connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    #[default]
    SignedIn,
    Anonymous,
    Phone,
}

/// Role the provider reports for the attendee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Organizer,
    #[default]
    Participant,
}

/// An attendee as reported by the provider. Read-only input to reconciliation;
/// never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attendee {
    pub role: Role,
    pub kind: Kind,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub earliest_join_time: Option<DateTime<Utc>>,
    /// Unset while the attendee is still connected.
    pub end_time: Option<DateTime<Utc>>,
}
