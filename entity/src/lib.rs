use uuid::Uuid;

// Party entities
pub mod parties;
pub mod party_members;

// Meeting entities
pub mod artifact_type;
pub mod attendee_kind;
pub mod meeting_artifacts;
pub mod meeting_details;
pub mod meeting_participants;
pub mod meeting_role;
pub mod meeting_sessions;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
