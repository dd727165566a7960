//! Participant reconciliation: provider attendees matched against the party roster.
//!
//! Matching is by normalized key only (trimmed, lowercased, exact). An
//! attendee's display name is tried against usernames first, then full names;
//! its email, when the provider exposes one, is tried last. Attendees that
//! match nobody are dropped. The organizer is always present in the output,
//! synthesized from the roster when they were not seen on the call.

use crate::attendee_kind::AttendeeKind;
use crate::meeting_role::MeetingRole;
use crate::party_members::{self, normalize};
use crate::{meeting_participants, Id};
use chrono::{DateTime, Utc};
use log::*;
use meeting_conference::types::participant::{Kind, Role};
use meeting_conference::Attendee;
use std::collections::HashMap;

struct RosterIndex<'a> {
    by_username: HashMap<String, &'a party_members::Model>,
    by_full_name: HashMap<String, &'a party_members::Model>,
    by_email: HashMap<String, &'a party_members::Model>,
}

impl<'a> RosterIndex<'a> {
    fn new(roster: &'a [party_members::Model]) -> Self {
        let mut index = Self {
            by_username: HashMap::new(),
            by_full_name: HashMap::new(),
            by_email: HashMap::new(),
        };
        for member in roster {
            insert_key(&mut index.by_username, member.username_key(), member);
            insert_key(&mut index.by_full_name, member.full_name_key(), member);
            insert_key(&mut index.by_email, member.email_key(), member);
        }
        index
    }

    fn lookup(&self, attendee: &Attendee) -> Option<&'a party_members::Model> {
        let by_name = attendee
            .display_name
            .as_deref()
            .map(normalize)
            .filter(|key| !key.is_empty())
            .and_then(|key| {
                self.by_username
                    .get(&key)
                    .or_else(|| self.by_full_name.get(&key))
                    .copied()
            });

        by_name.or_else(|| {
            attendee
                .email
                .as_deref()
                .map(normalize)
                .filter(|key| !key.is_empty())
                .and_then(|key| self.by_email.get(&key).copied())
        })
    }
}

// First member to claim a key keeps it.
fn insert_key<'a>(
    map: &mut HashMap<String, &'a party_members::Model>,
    key: String,
    member: &'a party_members::Model,
) {
    if !key.is_empty() {
        map.entry(key).or_insert(member);
    }
}

fn kind_of(kind: Kind) -> AttendeeKind {
    match kind {
        Kind::SignedIn => AttendeeKind::SignedIn,
        Kind::Anonymous => AttendeeKind::Anonymous,
        Kind::Phone => AttendeeKind::Phone,
    }
}

fn role_of(role: Role) -> MeetingRole {
    match role {
        Role::Organizer => MeetingRole::Organizer,
        Role::Participant => MeetingRole::Participant,
    }
}

/// Reconcile provider attendees into participant rows for `session_id`.
///
/// The result holds at most one row per user. When a user appears more than
/// once (rejoins, a second device) the last occurrence wins but keeps the
/// position of the first. Attendees without a join time fall back to
/// `session_start`. If the organizer never joined, a row is synthesized with
/// `join_time = session_start` and `leave_time = now`.
pub fn reconcile(
    attendees: &[Attendee],
    roster: &[party_members::Model],
    organizer_id: Id,
    session_id: Id,
    session_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Vec<meeting_participants::Model> {
    let index = RosterIndex::new(roster);
    let mut rows: Vec<meeting_participants::Model> = Vec::new();
    let mut positions: HashMap<Id, usize> = HashMap::new();

    for attendee in attendees {
        let Some(member) = index.lookup(attendee) else {
            debug!(
                "Dropping attendee {:?} with no roster match",
                attendee.display_name
            );
            continue;
        };

        let role_in_meeting = if member.user_id == organizer_id {
            MeetingRole::Organizer
        } else {
            role_of(attendee.role)
        };

        let row = meeting_participants::Model {
            user_id: member.user_id,
            role_in_meeting,
            join_time: attendee.earliest_join_time.unwrap_or(session_start),
            leave_time: attendee.end_time,
            kind: kind_of(attendee.kind),
            display_name: attendee
                .display_name
                .clone()
                .unwrap_or_else(|| member.full_name()),
            session_id,
        };

        match positions.get(&member.user_id) {
            Some(&position) => rows[position] = row,
            None => {
                positions.insert(member.user_id, rows.len());
                rows.push(row);
            }
        }
    }

    if !positions.contains_key(&organizer_id) {
        let display_name = roster
            .iter()
            .find(|m| m.user_id == organizer_id)
            .map(|m| m.full_name())
            .unwrap_or_default();
        debug!("Organizer {organizer_id} not seen on the call; adding them");
        rows.push(meeting_participants::Model {
            user_id: organizer_id,
            role_in_meeting: MeetingRole::Organizer,
            join_time: session_start,
            leave_time: Some(now),
            kind: AttendeeKind::SignedIn,
            display_name,
            session_id,
        });
    }

    rows
}
