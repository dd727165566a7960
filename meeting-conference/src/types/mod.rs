//! Provider-agnostic types.

pub mod conference;
pub mod participant;
pub mod space;
pub mod transcript;

/// Returns the final segment of a path-style resource name
/// (`conferenceRecords/abc` → `abc`). Empty names yield `None`.
pub fn last_segment(name: &str) -> Option<&str> {
    name.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}
