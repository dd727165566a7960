//! Types for conference records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::last_segment;

/// The provider's authoritative record of a completed or in-progress call.
///
/// Providers are inconsistent about how the record is identified: some return a
/// path-style resource `name`, others a bare `id`. Both are kept and
/// `conference_id` accepts whichever is present.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Resource name of the space the conference took place in.
    #[serde(default)]
    pub space: Option<String>,
}

impl ConferenceRecord {
    /// Conference identifier: the final segment of `name`, else `id`.
    pub fn conference_id(&self) -> Option<&str> {
        self.name
            .as_deref()
            .and_then(last_segment)
            .or_else(|| self.id.as_deref().filter(|id| !id.trim().is_empty()))
    }
}
