//! Google OAuth scope token broker.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::form_urlencoded;

use crate::error::{config_error, oauth_error, Error, OAuthErrorKind};
use crate::http::HttpClient;
use crate::oauth::token::Tokens;
use crate::oauth::CapabilitySet;

/// OAuth client credentials plus the organizer's long-lived refresh token.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub refresh_token: SecretString,
}

impl Credentials {
    /// Build credentials from optional configuration values, failing if any is missing.
    pub fn from_parts(
        client_id: Option<String>,
        client_secret: Option<String>,
        refresh_token: Option<String>,
    ) -> Result<Self, Error> {
        match (client_id, client_secret, refresh_token) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => Ok(Self {
                client_id,
                client_secret: SecretString::new(client_secret),
                refresh_token: SecretString::new(refresh_token),
            }),
            _ => Err(config_error(
                "Google client id, client secret and refresh token must all be configured",
            )),
        }
    }
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default)]
    scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Google scope token broker.
///
/// Mints access tokens from a refresh token, narrowing each one to the union of
/// every capability granted so far and the capabilities being asked for.
pub struct Broker {
    credentials: Credentials,
    token_url: String,
    http_client: HttpClient,
    granted: Mutex<CapabilitySet>,
}

impl Broker {
    /// Create a new Google broker.
    ///
    /// # Arguments
    ///
    /// * `credentials` - OAuth client credentials and refresh token
    /// * `token_url` - Google OAuth token endpoint
    /// * `http_client` - Client built with `crate::http::HttpClientBuilder`
    pub fn new(credentials: Credentials, token_url: &str, http_client: HttpClient) -> Self {
        Self {
            credentials,
            token_url: token_url.to_string(),
            http_client,
            granted: Mutex::new(CapabilitySet::new()),
        }
    }

    /// Capabilities granted so far in this user session.
    pub async fn granted(&self) -> CapabilitySet {
        self.granted.lock().await.clone()
    }

    fn request_body(&self, requested: &CapabilitySet) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "refresh_token")
            .append_pair("client_id", &self.credentials.client_id)
            .append_pair(
                "client_secret",
                self.credentials.client_secret.expose_secret(),
            )
            .append_pair(
                "refresh_token",
                self.credentials.refresh_token.expose_secret(),
            )
            .append_pair("scope", &requested.scope_string())
            .finish()
    }
}

#[async_trait]
impl crate::oauth::Broker for Broker {
    async fn request_token(&self, capabilities: &CapabilitySet) -> Result<Tokens, Error> {
        // Held across the request so concurrent callers see a consistent grant set.
        let mut granted = self.granted.lock().await;
        let requested = granted.union(capabilities);

        debug!("Requesting Google access token for {}", requested);

        let response = self
            .http_client
            .post(&self.token_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(self.request_body(&requested))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Google token endpoint returned {}: {}", status, error_text);
            return Err(oauth_error(OAuthErrorKind::TokenRequestFailed, &error_text));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse Google token response: {:?}", e);
            oauth_error(OAuthErrorKind::InvalidResponse, &e.to_string())
        })?;

        // Google omits `scope` when it matches what was asked for.
        let issued = token
            .scope
            .as_deref()
            .map(CapabilitySet::from_scopes)
            .filter(|issued| !issued.is_empty())
            .unwrap_or_else(|| requested.clone());

        if !issued.contains_all(capabilities) {
            warn!(
                "Google granted {} but {} was requested",
                issued, capabilities
            );
            return Err(oauth_error(
                OAuthErrorKind::InsufficientScope,
                "User did not grant every requested capability",
            ));
        }

        *granted = granted.union(&issued);
        info!("Obtained Google access token for {}", issued);

        Ok(Tokens {
            access_token: SecretString::new(token.access_token),
            expires_at: token.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
            token_type: token.token_type,
            capabilities: issued,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::HttpClientBuilder;
    use crate::oauth::{Broker as _, Capability};
    use mockito::{Matcher, Server};

    const READONLY: &str = "https://www.googleapis.com/auth/meetings.space.readonly";
    const CREATED: &str = "https://www.googleapis.com/auth/meetings.space.created";

    fn broker(token_url: &str) -> Broker {
        let credentials = Credentials::from_parts(
            Some("client-id".to_string()),
            Some("client-secret".to_string()),
            Some("refresh-token".to_string()),
        )
        .unwrap();
        let http_client = HttpClientBuilder::new().with_max_retries(0).build().unwrap();
        Broker::new(credentials, token_url, http_client)
    }

    #[test]
    fn test_credentials_require_every_part() {
        let result = Credentials::from_parts(Some("id".to_string()), None, None);
        assert_eq!(result.unwrap_err().error_kind, ErrorKind::Config);
    }

    #[tokio::test]
    async fn test_request_token_sends_refresh_grant_with_scopes() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                Matcher::UrlEncoded("refresh_token".into(), "refresh-token".into()),
                Matcher::UrlEncoded("scope".into(), format!("{} {}", CREATED, READONLY)),
            ]))
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "access_token": "ya29.episode",
                    "expires_in": 3599,
                    "token_type": "Bearer",
                    "scope": format!("{} {}", READONLY, CREATED),
                })
                .to_string(),
            )
            .create_async()
            .await;

        let broker = broker(&format!("{}/token", server.url()));
        let tokens = broker
            .request_token(&CapabilitySet::session_episode())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(tokens.access_token.expose_secret(), "ya29.episode");
        assert!(tokens.covers(&CapabilitySet::session_episode()));
        assert!(!tokens.is_expired());
    }

    #[tokio::test]
    async fn test_grants_are_additive_across_requests() {
        let mut server = Server::new_async().await;
        let _first = server
            .mock("POST", "/token")
            .match_body(Matcher::UrlEncoded("scope".into(), CREATED.into()))
            .with_status(200)
            .with_body(
                serde_json::json!({"access_token": "a", "expires_in": 3599, "scope": CREATED})
                    .to_string(),
            )
            .create_async()
            .await;
        let second = server
            .mock("POST", "/token")
            .match_body(Matcher::UrlEncoded(
                "scope".into(),
                format!("{} {}", CREATED, READONLY),
            ))
            .with_status(200)
            .with_body(serde_json::json!({"access_token": "b", "expires_in": 3599}).to_string())
            .create_async()
            .await;

        let broker = broker(&format!("{}/token", server.url()));
        let create_only: CapabilitySet = [Capability::SpaceCreation].into_iter().collect();
        broker.request_token(&create_only).await.unwrap();
        let tokens = broker
            .request_token(&CapabilitySet::reconciliation())
            .await
            .unwrap();

        second.assert_async().await;
        assert!(tokens.covers(&CapabilitySet::session_episode()));
        assert_eq!(broker.granted().await, CapabilitySet::session_episode());
    }

    #[tokio::test]
    async fn test_partial_grant_is_insufficient_scope() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(
                serde_json::json!({"access_token": "a", "expires_in": 3599, "scope": CREATED})
                    .to_string(),
            )
            .create_async()
            .await;

        let broker = broker(&format!("{}/token", server.url()));
        let err = broker
            .request_token(&CapabilitySet::session_episode())
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::InsufficientScope)
        );
        assert!(broker.granted().await.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_refresh_token_is_token_request_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error": "invalid_grant"}"#)
            .create_async()
            .await;

        let broker = broker(&format!("{}/token", server.url()));
        let err = broker
            .request_token(&CapabilitySet::reconciliation())
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::TokenRequestFailed)
        );
    }
}
