//! Resolves which provider conference a session maps to.

use crate::error::Error;
use log::*;
use meeting_conference::traits::conferencing::Provider;
use meeting_conference::ConferenceRecord;
use secrecy::SecretString;

/// Outcome of looking up the latest conference record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found {
        conference_id: String,
        record: ConferenceRecord,
    },
    /// No records, or the newest one carries no usable identifier.
    NotFound,
}

/// Take the newest conference record the token can see.
///
/// The lookup is not scoped to the session's space: it trusts that the
/// organizer's most recent conference is the one being ended. Provider
/// failures propagate; an empty listing is `NotFound`, not an error.
pub async fn resolve_latest(
    provider: &dyn Provider,
    token: &SecretString,
    page_size: u32,
) -> Result<Resolution, Error> {
    let records = provider
        .list_conference_records(token, page_size.max(1))
        .await?;

    let Some(record) = records.into_iter().next() else {
        info!("No conference records returned by {}", provider.provider_id());
        return Ok(Resolution::NotFound);
    };

    match record.conference_id() {
        Some(conference_id) => {
            debug!("Resolved conference record {conference_id}");
            Ok(Resolution::Found {
                conference_id: conference_id.to_string(),
                record,
            })
        }
        None => {
            warn!("Latest conference record has neither a name nor an id: {record:?}");
            Ok(Resolution::NotFound)
        }
    }
}
