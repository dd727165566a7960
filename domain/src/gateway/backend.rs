//! HTTP client for the platform backend that stores parties and meeting records.
//!
//! Every request carries the `x-version` API version header and, when one is
//! configured, a bearer token. Responses are wrapped in a
//! `{ "status_code": .., "data": .. }` envelope.

use crate::error::{persistence_error, Error};
use crate::persistence::Gateway;
use crate::{meeting_artifacts, meeting_details, meeting_participants, meeting_sessions, parties, Id};
use async_trait::async_trait;
use log::*;
use meeting_auth::http::HttpClient;
use reqwest_middleware::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use service::config::{ApiVersion, Config};

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    #[allow(dead_code)]
    status_code: u16,
    data: Option<T>,
}

#[derive(Debug, Serialize)]
struct ParticipantsBody<'a> {
    participants: &'a [meeting_participants::Model],
}

#[derive(Debug, Serialize)]
struct ArtifactsBody<'a> {
    artifacts: &'a [meeting_artifacts::Model],
}

pub struct Client {
    http_client: HttpClient,
    base_url: String,
    api_version: ApiVersion,
    api_token: Option<SecretString>,
}

impl Client {
    pub fn new(config: &Config, http_client: HttpClient) -> Self {
        Self {
            http_client,
            base_url: config.backend_base_url().trim_end_matches('/').to_string(),
            api_version: ApiVersion::new(config.api_version()),
            api_token: config.backend_api_token().map(SecretString::new),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(ApiVersion::field_name(), self.api_version.to_string());
        match &self.api_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder, what: &str) -> Result<reqwest::Response, Error> {
        let response = self.prepare(request).send().await.map_err(|e| {
            warn!("Backend request to {what} failed: {:?}", e);
            Error::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Backend returned {status} for {what}: {error_text}");
            Err(persistence_error(format!("{what}: {status} {error_text}")))
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T, Error> {
        let envelope: ApiResponse<T> = self.execute(request, what).await?.json().await?;
        envelope
            .data
            .ok_or_else(|| persistence_error(format!("{what}: response had no data")))
    }
}

#[async_trait]
impl Gateway for Client {
    async fn find_party(&self, party_id: Id) -> Result<parties::Model, Error> {
        let url = self.url(&format!("parties/{party_id}"));
        self.fetch(self.http_client.get(&url), "find party").await
    }

    async fn party_meetings(&self, party_id: Id) -> Result<Vec<meeting_sessions::Model>, Error> {
        let url = self.url(&format!("parties/{party_id}/meetings"));
        self.fetch(self.http_client.get(&url), "list party meetings")
            .await
    }

    async fn upsert_session(
        &self,
        session: &meeting_sessions::Model,
    ) -> Result<meeting_sessions::Model, Error> {
        let request = match session.id {
            Some(id) => self.http_client.put(self.url(&format!("meetings/{id}"))),
            None => self
                .http_client
                .post(self.url(&format!("parties/{}/meetings", session.party_id))),
        };
        let saved: meeting_sessions::Model =
            self.fetch(request.json(session), "save meeting").await?;
        debug!("Saved meeting session {:?}", saved.id);
        Ok(saved)
    }

    async fn upsert_participants(
        &self,
        session_id: Id,
        participants: &[meeting_participants::Model],
    ) -> Result<(), Error> {
        let url = self.url(&format!("meetings/{session_id}/participants"));
        self.execute(
            self.http_client
                .post(&url)
                .json(&ParticipantsBody { participants }),
            "push participants",
        )
        .await?;
        Ok(())
    }

    async fn submit_artifacts(
        &self,
        session_id: Id,
        artifacts: &[meeting_artifacts::Model],
    ) -> Result<(), Error> {
        let url = self.url(&format!("meetings/{session_id}/artifacts"));
        self.execute(
            self.http_client.post(&url).json(&ArtifactsBody { artifacts }),
            "submit artifacts",
        )
        .await?;
        Ok(())
    }

    async fn meeting_details(&self, session_id: Id) -> Result<meeting_details::Model, Error> {
        let url = self.url(&format!("meetings/{session_id}"));
        self.fetch(self.http_client.get(&url), "meeting details")
            .await
    }
}
