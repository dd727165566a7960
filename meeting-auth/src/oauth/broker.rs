//! Scope token broker trait.

use async_trait::async_trait;

use super::token::Tokens;
use super::CapabilitySet;
use crate::error::Error;

/// Issues bearer tokens scoped to a set of provider capabilities.
///
/// Grants are additive within a user session: a token requested for a new set
/// of capabilities keeps every capability granted earlier. Callers should still
/// ask for the union of everything a multi-step flow will need before starting
/// it, so the user is not asked to consent again halfway through.
///
/// Expiry is not handled here. An expired token surfaces as an authentication
/// failure on the next provider call.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait Broker: Send + Sync {
    /// Request a token covering at least `capabilities`.
    async fn request_token(&self, capabilities: &CapabilitySet) -> Result<Tokens, Error>;
}
