//! Types for conference transcripts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::last_segment;

/// Where the provider exported a transcript document, once it has.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocsDestination {
    /// Provider document id.
    #[serde(default)]
    pub document: Option<String>,
    /// URL of the exported document.
    #[serde(default)]
    pub export_uri: Option<String>,
}

/// A transcript generated for a conference.
///
/// `state` is kept as the provider reports it (`STARTED`, `ENDED`,
/// `FILE_GENERATED`, ...). Entries may be empty while it is still processing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "unspecified_state")]
    pub state: String,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub docs_destination: Option<DocsDestination>,
}

fn unspecified_state() -> String {
    "STATE_UNSPECIFIED".to_string()
}

impl Transcript {
    /// Transcript identifier: the final segment of `name`, else `id`.
    pub fn transcript_id(&self) -> Option<&str> {
        self.name
            .as_deref()
            .and_then(last_segment)
            .or_else(|| self.id.as_deref().filter(|id| !id.trim().is_empty()))
    }

    /// Export location, if the provider has produced one.
    pub fn export_uri(&self) -> Option<&str> {
        self.docs_destination
            .as_ref()
            .and_then(|d| d.export_uri.as_deref())
            .filter(|uri| !uri.trim().is_empty())
    }

    /// Provider document id, if the transcript was exported to a document.
    pub fn document_id(&self) -> Option<&str> {
        self.docs_destination
            .as_ref()
            .and_then(|d| d.document.as_deref())
            .and_then(last_segment)
    }
}

/// A single spoken entry in a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default)]
    pub name: Option<String>,
    /// Resource name of the participant who spoke.
    #[serde(default)]
    pub participant: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}
