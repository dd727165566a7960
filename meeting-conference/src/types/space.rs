//! Types for meeting spaces.

use serde::{Deserialize, Serialize};

use super::last_segment;

/// Configuration for allocating a new meeting space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Who may join without knocking (e.g. `OPEN`, `TRUSTED`, `RESTRICTED`).
    pub access_type: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_type: "OPEN".to_string(),
        }
    }
}

/// A provisioned meeting space: the provider descriptor merged into a saved session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    /// Resource name, e.g. `spaces/jQCFfuBOdN5z`.
    pub name: String,
    /// URL attendees open to join.
    pub meeting_uri: String,
    /// Typable meeting code, e.g. `abc-mnop-xyz`.
    pub meeting_code: String,
}

impl Space {
    /// Provider space id (final segment of `name`).
    pub fn id(&self) -> Option<&str> {
        last_segment(&self.name)
    }
}
