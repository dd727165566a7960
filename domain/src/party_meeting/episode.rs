//! The unit of work the controller hands back to callers.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use crate::{meeting_sessions, parties};
use chrono::{DateTime, TimeDelta, Utc};
use meeting_auth::oauth::token::Tokens;

/// Scheduled bounds for a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, Error> {
        if end <= start {
            return Err(invalid_window("session window must end after it starts"));
        }
        Ok(Self { start, end })
    }

    pub fn starting_at(start: DateTime<Utc>, length: TimeDelta) -> Result<Self, Error> {
        let end = start
            .checked_add_signed(length)
            .ok_or_else(|| invalid_window("session window ends out of range"))?;
        Self::new(start, end)
    }

    /// A window of `minutes` from `start`.
    pub fn lasting_minutes(start: DateTime<Utc>, minutes: i64) -> Result<Self, Error> {
        let length = TimeDelta::try_minutes(minutes)
            .ok_or_else(|| invalid_window("session length out of range"))?;
        Self::starting_at(start, length)
    }
}

fn invalid_window(reason: &str) -> Error {
    Error {
        source: None,
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(reason.to_string())),
    }
}

/// A session together with the party it belongs to and the token that provisioned it.
///
/// `token` is `None` for episodes recovered from the backend (see
/// `Controller::resume`); the controller requests a fresh one when needed.
#[derive(Debug, Clone)]
pub struct SessionEpisode {
    pub party: parties::Model,
    pub session: meeting_sessions::Model,
    pub token: Option<Tokens>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_rejects_empty_range() {
        let now = Utc::now();
        assert!(Window::new(now, now).is_err());
        assert!(Window::new(now, now + TimeDelta::minutes(1)).is_ok());
    }

    #[test]
    fn test_window_starting_at() {
        let now = Utc::now();
        let window = Window::starting_at(now, TimeDelta::minutes(60)).unwrap();
        assert_eq!(window.end - window.start, TimeDelta::minutes(60));
    }

    #[test]
    fn test_window_with_unrepresentable_length_is_an_error() {
        let now = Utc::now();
        assert!(Window::lasting_minutes(now, i64::MAX).is_err());
        assert!(Window::lasting_minutes(now, 0).is_err());
        assert!(Window::starting_at(now, TimeDelta::MAX).is_err());
        let window = Window::lasting_minutes(now, 90).unwrap();
        assert_eq!(window.end - window.start, TimeDelta::minutes(90));
    }
}
