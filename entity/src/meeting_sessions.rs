//! A party's meeting session as stored by the backend.

use crate::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Assigned by the backend on first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,

    pub party_id: Id,

    pub organizer_id: Id,

    pub title: String,

    pub scheduled_start: DateTime<Utc>,

    pub scheduled_end: DateTime<Utc>,

    #[serde(default)]
    pub actual_start: Option<DateTime<Utc>>,

    #[serde(default)]
    pub actual_end: Option<DateTime<Utc>>,

    /// Join URL of the provider space backing this session
    pub join_link: String,

    /// Provider resource name of the space (e.g. `spaces/abc123`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_name: Option<String>,

    /// Short human-typable meeting code (e.g. `abc-mnop-xyz`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_code: Option<String>,
}

impl Model {
    /// True once the session has been finalized.
    pub fn has_ended(&self) -> bool {
        self.actual_end.is_some()
    }

    /// True when `now` falls inside the scheduled window, bounds included.
    pub fn is_scheduled_at(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_start <= now && now <= self.scheduled_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use serde_json::json;

    fn session() -> Model {
        let start = Utc::now();
        Model {
            id: None,
            party_id: Id::new_v4(),
            organizer_id: Id::new_v4(),
            title: "Algebra study group".to_string(),
            scheduled_start: start,
            scheduled_end: start + TimeDelta::hours(1),
            actual_start: None,
            actual_end: None,
            join_link: "https://meet.google.com/abc-mnop-xyz".to_string(),
            space_name: None,
            meeting_code: None,
        }
    }

    #[test]
    fn test_unsaved_session_omits_id_when_serialized() {
        let value = serde_json::to_value(session()).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["actual_end"], json!(null));
    }

    #[test]
    fn test_scheduled_window_includes_both_bounds() {
        let session = session();
        assert!(session.is_scheduled_at(session.scheduled_start));
        assert!(session.is_scheduled_at(session.scheduled_end));
        assert!(!session.is_scheduled_at(session.scheduled_end + TimeDelta::seconds(1)));
    }
}
