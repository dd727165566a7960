use crate::{meeting_participants, meeting_sessions};
use serde::{Deserialize, Serialize};

/// A finalized session with its reconciled attendance and backend summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub session: meeting_sessions::Model,

    #[serde(default)]
    pub participants: Vec<meeting_participants::Model>,

    /// Populated by the backend once summarization has run
    #[serde(default)]
    pub summary_text: Option<String>,
}
