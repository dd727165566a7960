//! Conferencing provider abstraction for party meeting sessions.
//!
//! This crate provides a trait-based abstraction over the conferencing provider
//! that hosts a party's live sessions:
//! - Allocating meeting spaces and ending their active conference
//! - Reading conference records, participants and transcripts after the fact
//!
//! The design is provider-agnostic. Adapters (Google Meet today) live with the
//! application and map their wire formats into the types here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::Error;
pub use types::conference::ConferenceRecord;
pub use types::participant::Attendee;
pub use types::transcript::Transcript;
