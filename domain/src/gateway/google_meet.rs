//! Google Meet REST API client.
//!
//! Implements the conferencing `Provider` trait against the Meet v2 API:
//! space creation, ending a space's active conference, and reading
//! conference records, participants and transcripts. List calls follow
//! `nextPageToken` except for conference records, where only the newest
//! page is wanted.

use async_trait::async_trait;
use log::*;
use meeting_auth::http::HttpClient;
use meeting_conference::traits::conferencing::Provider;
use meeting_conference::types::participant::{Kind, Role};
use meeting_conference::types::space::{Config as SpaceConfig, Space};
use meeting_conference::types::transcript::{Entry, Transcript};
use meeting_conference::{Attendee, ConferenceRecord, Error};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

const PROVIDER_ID: &str = "google_meet";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSpaceRequest<'a> {
    config: SpaceConfigBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpaceConfigBody<'a> {
    access_type: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpaceResponse {
    name: String,
    meeting_uri: String,
    meeting_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConferenceRecordsPage {
    #[serde(default)]
    conference_records: Vec<ConferenceRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParticipantsPage {
    #[serde(default)]
    participants: Vec<ParticipantResource>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptsPage {
    #[serde(default)]
    transcripts: Vec<Transcript>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptEntriesPage {
    #[serde(default)]
    transcript_entries: Vec<Entry>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// A participant resource. Exactly one of the user fields is set.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParticipantResource {
    #[serde(default)]
    earliest_start_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    latest_end_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    signedin_user: Option<SignedInUser>,
    #[serde(default)]
    anonymous_user: Option<NamedUser>,
    #[serde(default)]
    phone_user: Option<NamedUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignedInUser {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamedUser {
    #[serde(default)]
    display_name: Option<String>,
}

impl From<ParticipantResource> for Attendee {
    fn from(resource: ParticipantResource) -> Self {
        let (kind, display_name, email) = match (
            resource.signedin_user,
            resource.anonymous_user,
            resource.phone_user,
        ) {
            (Some(user), _, _) => (Kind::SignedIn, user.display_name, user.email),
            (None, Some(user), _) => (Kind::Anonymous, user.display_name, None),
            (None, None, Some(user)) => (Kind::Phone, user.display_name, None),
            (None, None, None) => (Kind::SignedIn, None, None),
        };
        Attendee {
            // Meet does not report roles on participant resources.
            role: Role::Participant,
            kind,
            display_name,
            email,
            earliest_join_time: resource.earliest_start_time,
            end_time: resource.latest_end_time,
        }
    }
}

/// Space id from either a meeting code or a `spaces/{id}` resource name.
fn space_id(space: &str) -> &str {
    space.strip_prefix("spaces/").unwrap_or(space)
}

/// One page of a Meet list call.
trait Page<T> {
    fn into_parts(self) -> (Vec<T>, Option<String>);
}

impl Page<Attendee> for ParticipantsPage {
    fn into_parts(self) -> (Vec<Attendee>, Option<String>) {
        (
            self.participants.into_iter().map(Attendee::from).collect(),
            self.next_page_token,
        )
    }
}

impl Page<Transcript> for TranscriptsPage {
    fn into_parts(self) -> (Vec<Transcript>, Option<String>) {
        (self.transcripts, self.next_page_token)
    }
}

impl Page<Entry> for TranscriptEntriesPage {
    fn into_parts(self) -> (Vec<Entry>, Option<String>) {
        (self.transcript_entries, self.next_page_token)
    }
}

/// Google Meet API client
pub struct Client {
    http_client: HttpClient,
    base_url: String,
}

impl Client {
    /// Create a client for the API rooted at `base_url` (e.g. `https://meet.googleapis.com/v2`).
    pub fn new(base_url: &str, http_client: HttpClient) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `base_url` extended by `segments`, each percent-encoded as a single path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Configuration(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Configuration(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute(
        &self,
        request: reqwest_middleware::RequestBuilder,
        token: &SecretString,
    ) -> Result<reqwest::Response, Error> {
        let response = request
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(|e| {
                warn!("Google Meet request failed: {:?}", e);
                Error::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Google Meet API error {}: {}", status, error_text);
            return Err(Error::from_status(status.as_u16(), error_text));
        }
        Ok(response)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest_middleware::RequestBuilder,
        token: &SecretString,
    ) -> Result<T, Error> {
        self.execute(request, token).await?.json().await.map_err(|e| {
            warn!("Failed to parse Google Meet response: {:?}", e);
            Error::Deserialization(e.to_string())
        })
    }

    /// Fetch every page of a list call, following `nextPageToken`.
    async fn list_all<P, T>(&self, url: Url, token: &SecretString) -> Result<Vec<T>, Error>
    where
        P: Page<T> + DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut page_url = url.clone();
            if let Some(page_token) = &page_token {
                page_url
                    .query_pairs_mut()
                    .append_pair("pageToken", page_token);
            }
            let page: P = self.send(self.http_client.get(page_url), token).await?;
            let (batch, next) = page.into_parts();
            items.extend(batch);
            match next.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => return Ok(items),
            }
        }
    }
}

#[async_trait]
impl Provider for Client {
    async fn create_space(&self, token: &SecretString, config: SpaceConfig) -> Result<Space, Error> {
        let url = self.endpoint(&["spaces"])?;
        let request = CreateSpaceRequest {
            config: SpaceConfigBody {
                access_type: &config.access_type,
            },
        };

        debug!("Creating Google Meet space");
        let space: SpaceResponse = self
            .send(self.http_client.post(url).json(&request), token)
            .await?;
        info!("Created Google Meet space: {}", space.meeting_code);

        Ok(Space {
            name: space.name,
            meeting_uri: space.meeting_uri,
            meeting_code: space.meeting_code,
        })
    }

    async fn end_active_conference(&self, token: &SecretString, space: &str) -> Result<(), Error> {
        let action = format!("{}:endActiveConference", space_id(space));
        let url = self.endpoint(&["spaces", &action])?;
        debug!("Ending active conference in {}", space);
        // The response body is an empty object.
        self.execute(
            self.http_client
                .post(url)
                .json(&serde_json::json!({})),
            token,
        )
        .await?;
        Ok(())
    }

    async fn list_conference_records(
        &self,
        token: &SecretString,
        page_size: u32,
    ) -> Result<Vec<ConferenceRecord>, Error> {
        let mut url = self.endpoint(&["conferenceRecords"])?;
        url.query_pairs_mut()
            .append_pair("pageSize", &page_size.to_string());
        let page: ConferenceRecordsPage = self.send(self.http_client.get(url), token).await?;
        Ok(page.conference_records)
    }

    async fn list_participants(
        &self,
        token: &SecretString,
        conference_id: &str,
    ) -> Result<Vec<Attendee>, Error> {
        let url = self.endpoint(&["conferenceRecords", conference_id, "participants"])?;
        self.list_all::<ParticipantsPage, _>(url, token).await
    }

    async fn list_transcripts(
        &self,
        token: &SecretString,
        conference_id: &str,
    ) -> Result<Vec<Transcript>, Error> {
        let url = self.endpoint(&["conferenceRecords", conference_id, "transcripts"])?;
        self.list_all::<TranscriptsPage, _>(url, token).await
    }

    async fn list_transcript_entries(
        &self,
        token: &SecretString,
        conference_id: &str,
        transcript_id: &str,
    ) -> Result<Vec<Entry>, Error> {
        let url = self.endpoint(&[
            "conferenceRecords",
            conference_id,
            "transcripts",
            transcript_id,
            "entries",
        ])?;
        self.list_all::<TranscriptEntriesPage, _>(url, token).await
    }

    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }
}
