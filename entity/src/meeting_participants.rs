//! A party member's attendance in a meeting session, after reconciliation
//! against the provider's participant list.

use crate::attendee_kind::AttendeeKind;
use crate::meeting_role::MeetingRole;
use crate::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Application user id; always a member of the session's party
    pub user_id: Id,

    pub role_in_meeting: MeetingRole,

    pub join_time: DateTime<Utc>,

    /// Unset while the provider still reports the attendee as connected
    pub leave_time: Option<DateTime<Utc>>,

    #[serde(rename = "type")]
    pub kind: AttendeeKind,

    pub display_name: String,

    pub session_id: Id,
}
