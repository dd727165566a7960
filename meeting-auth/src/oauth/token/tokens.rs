//! OAuth token types.

use chrono::{DateTime, Utc};
use secrecy::SecretString;

use crate::oauth::CapabilitySet;

/// A bearer token together with the capabilities it was issued for.
#[derive(Debug, Clone)]
pub struct Tokens {
    /// Access token for API requests.
    pub access_token: SecretString,
    /// When the access token expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Token type (usually "Bearer").
    pub token_type: String,
    /// Capabilities the provider actually granted.
    pub capabilities: CapabilitySet,
}

impl Tokens {
    /// Check if the access token is expired or about to expire soon.
    ///
    /// Returns true if token is expired or will expire within 5 minutes.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|expires| {
                let now = Utc::now();
                let buffer = chrono::Duration::minutes(5);
                expires <= (now + buffer)
            })
            .unwrap_or(false)
    }

    /// Get the remaining time until expiration.
    pub fn time_until_expiry(&self) -> Option<chrono::Duration> {
        self.expires_at.map(|expires| expires - Utc::now())
    }

    /// True if this token was granted every capability in `required`.
    pub fn covers(&self, required: &CapabilitySet) -> bool {
        self.capabilities.contains_all(required)
    }

    /// True if the token can still be used for `required` without asking the broker again.
    pub fn is_usable_for(&self, required: &CapabilitySet) -> bool {
        !self.is_expired() && self.covers(required)
    }
}
