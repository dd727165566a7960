use serde::{Deserialize, Serialize};

/// How an attendee was connected to the conference.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendeeKind {
    #[default]
    SignedIn,
    Anonymous,
    Phone,
}

impl std::fmt::Display for AttendeeKind {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendeeKind::SignedIn => write!(fmt, "signed_in"),
            AttendeeKind::Anonymous => write!(fmt, "anonymous"),
            AttendeeKind::Phone => write!(fmt, "phone"),
        }
    }
}
