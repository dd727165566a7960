//! Persistence gateway: the backend that owns parties and meeting records.

use crate::error::Error;
use crate::{meeting_artifacts, meeting_details, meeting_participants, meeting_sessions, parties, Id};
use async_trait::async_trait;

/// Where sessions, reconciled participants and artifacts are saved.
///
/// The controller only talks to the backend through this trait. The HTTP
/// implementation lives in `gateway::backend`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Load a party together with its member roster.
    async fn find_party(&self, party_id: Id) -> Result<parties::Model, Error>;

    /// Every meeting session recorded for a party, in backend order.
    async fn party_meetings(&self, party_id: Id) -> Result<Vec<meeting_sessions::Model>, Error>;

    /// Create the session when it has no id yet, update it otherwise. Returns the saved record.
    async fn upsert_session(
        &self,
        session: &meeting_sessions::Model,
    ) -> Result<meeting_sessions::Model, Error>;

    async fn upsert_participants(
        &self,
        session_id: Id,
        participants: &[meeting_participants::Model],
    ) -> Result<(), Error>;

    async fn submit_artifacts(
        &self,
        session_id: Id,
        artifacts: &[meeting_artifacts::Model],
    ) -> Result<(), Error>;

    async fn meeting_details(&self, session_id: Id) -> Result<meeting_details::Model, Error>;
}
