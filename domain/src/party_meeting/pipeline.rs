//! Results of the end-of-session pipeline.

use super::episode::SessionEpisode;
use crate::meeting_sessions;
use serde::Serialize;

/// Result of a non-fatal pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Step<T> {
    Completed(T),
    /// The step did not run or did not succeed; the reason is kept for reporting.
    Skipped(String),
}

impl<T> Step<T> {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Step::Skipped(reason.into())
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Step::Completed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Step<U> {
        match self {
            Step::Completed(value) => Step::Completed(f(value)),
            Step::Skipped(reason) => Step::Skipped(reason),
        }
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Step::Completed(value) => Some(value),
            Step::Skipped(_) => None,
        }
    }
}

/// Everything `Controller::end` did.
///
/// Failures before the session is marked ended never produce an outcome;
/// they are returned as errors. Once `ended` is saved the outcome is always
/// returned, even if no successor could be provisioned.
#[derive(Debug, Clone)]
pub struct EndOutcome {
    /// The finalized session, `actual_end` set.
    pub ended: meeting_sessions::Model,
    /// The session provisioned to replace it. A skipped successor leaves the
    /// party with no active session until the next `create`.
    pub successor: Step<SessionEpisode>,
    pub termination: Step<()>,
    /// Number of participant rows pushed.
    pub participants: Step<usize>,
    /// Number of artifacts pushed.
    pub artifacts: Step<usize>,
}
