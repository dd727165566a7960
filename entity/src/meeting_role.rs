use serde::{Deserialize, Serialize};

/// Role a party member played in a meeting session.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingRole {
    /// The party member who created the session
    Organizer,
    /// Any other member who joined
    #[default]
    Participant,
}

impl std::fmt::Display for MeetingRole {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeetingRole::Organizer => write!(fmt, "organizer"),
            MeetingRole::Participant => write!(fmt, "participant"),
        }
    }
}
