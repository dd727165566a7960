//! Active session detection.

use crate::meeting_sessions;
use chrono::{DateTime, Utc};

/// Pick the session a party is currently in, if any.
///
/// A session that has started and not ended always wins over one that is
/// merely scheduled; among started sessions the most recently started is
/// chosen. Failing that, the earliest-starting session whose scheduled window
/// contains `now` (bounds included) and that has not ended is returned.
pub fn detect_active(
    sessions: &[meeting_sessions::Model],
    now: DateTime<Utc>,
) -> Option<&meeting_sessions::Model> {
    let mut started: Vec<&meeting_sessions::Model> = sessions
        .iter()
        .filter(|s| s.actual_start.is_some() && s.actual_end.is_none())
        .collect();
    started.sort_by(|a, b| b.actual_start.cmp(&a.actual_start));
    if let Some(session) = started.first() {
        return Some(*session);
    }

    let mut scheduled: Vec<&meeting_sessions::Model> = sessions
        .iter()
        .filter(|s| s.actual_end.is_none() && s.is_scheduled_at(now))
        .collect();
    scheduled.sort_by_key(|s| s.scheduled_start);
    scheduled.first().copied()
}
