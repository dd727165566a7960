//! Provider capabilities and sets of them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A named permission needed to invoke a class of provider operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    SpaceCreation,
    RecordRead,
    ParticipantRead,
    TranscriptRead,
    DocumentRead,
}

const MEET_SPACE_CREATED_SCOPE: &str = "https://www.googleapis.com/auth/meetings.space.created";
const MEET_SPACE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/meetings.space.readonly";
const DOCUMENTS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/documents.readonly";

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Capability; 5] = [
        Capability::SpaceCreation,
        Capability::RecordRead,
        Capability::ParticipantRead,
        Capability::TranscriptRead,
        Capability::DocumentRead,
    ];

    /// Get the capability identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::SpaceCreation => "space-creation",
            Capability::RecordRead => "record-read",
            Capability::ParticipantRead => "participant-read",
            Capability::TranscriptRead => "transcript-read",
            Capability::DocumentRead => "document-read",
        }
    }

    /// OAuth scope that grants this capability. Several read capabilities
    /// share one provider scope.
    pub fn scope(&self) -> &'static str {
        match self {
            Capability::SpaceCreation => MEET_SPACE_CREATED_SCOPE,
            Capability::RecordRead | Capability::ParticipantRead | Capability::TranscriptRead => {
                MEET_SPACE_READONLY_SCOPE
            }
            Capability::DocumentRead => DOCUMENTS_READONLY_SCOPE,
        }
    }
}

/// An ordered, duplicate-free set of capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything one session episode needs, from space creation through
    /// reconciliation at `end`. Requested up front so the user is only asked
    /// to consent once per episode.
    pub fn session_episode() -> Self {
        [
            Capability::SpaceCreation,
            Capability::RecordRead,
            Capability::ParticipantRead,
            Capability::TranscriptRead,
        ]
        .into_iter()
        .collect()
    }

    /// Ending a space's live conference is only allowed to the app that created it.
    pub fn termination() -> Self {
        [Capability::SpaceCreation].into_iter().collect()
    }

    /// The read capabilities needed to reconcile a finished conference.
    pub fn reconciliation() -> Self {
        [
            Capability::RecordRead,
            Capability::ParticipantRead,
            Capability::TranscriptRead,
        ]
        .into_iter()
        .collect()
    }

    /// Capabilities granted by a space-separated OAuth scope string.
    pub fn from_scopes(scopes: &str) -> Self {
        let granted: BTreeSet<&str> = scopes.split_whitespace().collect();
        Capability::ALL
            .into_iter()
            .filter(|c| granted.contains(c.scope()))
            .collect()
    }

    pub fn insert(&mut self, capability: Capability) -> bool {
        self.0.insert(capability)
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// True if every capability in `other` is also in `self`.
    pub fn contains_all(&self, other: &CapabilitySet) -> bool {
        other.0.is_subset(&self.0)
    }

    pub fn union(&self, other: &CapabilitySet) -> Self {
        CapabilitySet(self.0.union(&other.0).copied().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    /// Space-separated, deduplicated OAuth scopes for this set.
    pub fn scope_string(&self) -> String {
        let scopes: BTreeSet<&str> = self.0.iter().map(Capability::scope).collect();
        scopes.into_iter().collect::<Vec<_>>().join(" ")
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        CapabilitySet(iter.into_iter().collect())
    }
}

impl std::fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Capability::as_str).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
