//! Meeting session lifecycle and reconciliation for party collaboration.
//!
//! The `party_meeting` controller is the entry point. It provisions sessions
//! on the conferencing provider, detects the active one, and on `end`
//! reconciles the provider's record of the conference (attendees,
//! transcripts) with the party roster before pushing the result to the
//! backend and provisioning a successor session.
//!
//! Entity types are re-exported here so consumers of the `domain` crate do not
//! need to depend on `entity` directly.
pub use entity::{
    artifact_type, attendee_kind, meeting_artifacts, meeting_details, meeting_participants,
    meeting_role, meeting_sessions, parties, party_members, Id,
};

pub mod artifact;
pub mod conference_record;
pub mod error;
pub mod participant;
pub mod party_meeting;
pub mod persistence;

pub mod gateway;
