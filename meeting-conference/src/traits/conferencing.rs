//! Conferencing provider trait.

use crate::types::conference::ConferenceRecord;
use crate::types::participant::Attendee;
use crate::types::space::{Config, Space};
use crate::types::transcript::{Entry, Transcript};
use crate::Error;
use async_trait::async_trait;
use secrecy::SecretString;

/// Abstraction over the service that hosts a party's live meeting sessions.
///
/// Every call takes the bearer token for the current session episode; the
/// token must carry the capability the operation needs (space creation for
/// `create_space` and `end_active_conference`, the read capabilities for
/// everything else). Implementations must not cache tokens themselves.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Allocate a new meeting space and return its join descriptor.
    async fn create_space(
        &self,
        token: &SecretString,
        config: Config,
    ) -> std::result::Result<Space, Error>;

    /// End the conference currently running in a space.
    ///
    /// `space` is the space resource name or its meeting code. Conferences
    /// also end on their own once everyone leaves, so callers may treat a
    /// failure here as non-fatal.
    async fn end_active_conference(
        &self,
        token: &SecretString,
        space: &str,
    ) -> std::result::Result<(), Error>;

    /// List conference records, newest first.
    async fn list_conference_records(
        &self,
        token: &SecretString,
        page_size: u32,
    ) -> std::result::Result<Vec<ConferenceRecord>, Error>;

    /// List everyone who attended a conference.
    async fn list_participants(
        &self,
        token: &SecretString,
        conference_id: &str,
    ) -> std::result::Result<Vec<Attendee>, Error>;

    /// List transcripts generated for a conference.
    async fn list_transcripts(
        &self,
        token: &SecretString,
        conference_id: &str,
    ) -> std::result::Result<Vec<Transcript>, Error>;

    /// List entries of one transcript. Empty while the transcript is processing.
    async fn list_transcript_entries(
        &self,
        token: &SecretString,
        conference_id: &str,
        transcript_id: &str,
    ) -> std::result::Result<Vec<Entry>, Error>;

    /// Return unique identifier for this provider (e.g., "google_meet").
    fn provider_id(&self) -> &'static str;
}
