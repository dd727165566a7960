//! Error types for the `domain` layer.
use meeting_auth::error::{Error as MeetingAuthError, ErrorKind as MeetingAuthErrorKind};
use meeting_conference::Error as ConferenceError;
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. Each lower crate (`meeting-auth`, `meeting-conference`) keeps its
/// own error type and is translated into this tree at the boundary, so callers of the
/// controller only ever match on `DomainErrorKind`.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
    Meeting(MeetingErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Config,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    Authentication,
    Provider,
    Persistence,
    Other(String),
}

/// Failures of the session lifecycle itself.
#[derive(Debug, PartialEq)]
pub enum MeetingErrorKind {
    /// The provider has no conference record to reconcile against.
    NoConferenceRecord,
    /// Another create or end is already running for the party.
    InFlight,
    /// The party has no session that is currently active.
    NoActiveSession,
    /// The caller cancelled an end sequence between steps.
    Cancelled,
    /// A session was used before the backend assigned it an id.
    Unsaved,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            DomainErrorKind::Meeting(MeetingErrorKind::NoConferenceRecord) => write!(
                f,
                "could not finalize session: no conference record found for the session"
            ),
            DomainErrorKind::Meeting(MeetingErrorKind::InFlight) => {
                write!(f, "a meeting operation is already in progress for this party")
            }
            DomainErrorKind::Meeting(MeetingErrorKind::NoActiveSession) => {
                write!(f, "the party has no active meeting session")
            }
            _ => write!(f, "Domain Error: {self:?}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl Error {
    /// True if this error is the given lifecycle failure.
    pub fn is_meeting(&self, kind: MeetingErrorKind) -> bool {
        self.error_kind == DomainErrorKind::Meeting(kind)
    }
}

pub(crate) fn meeting_error(kind: MeetingErrorKind) -> Error {
    Error {
        source: None,
        error_kind: DomainErrorKind::Meeting(kind),
    }
}

pub(crate) fn persistence_error(message: impl Into<String>) -> Error {
    let message: String = message.into();
    Error {
        source: Some(message.into()),
        error_kind: DomainErrorKind::External(ExternalErrorKind::Persistence),
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // A body that arrived but could not be decoded.
        } else if err.is_decode() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Persistence),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(err) => err.into(),
            reqwest_middleware::Error::Middleware(err) => Error {
                source: Some(err.into()),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            },
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    }
}

impl From<MeetingAuthError> for Error {
    fn from(err: MeetingAuthError) -> Self {
        let error_kind = match &err.error_kind {
            MeetingAuthErrorKind::Http(_) => DomainErrorKind::External(ExternalErrorKind::Network),
            MeetingAuthErrorKind::OAuth(_) | MeetingAuthErrorKind::Token(_) => {
                DomainErrorKind::External(ExternalErrorKind::Authentication)
            }
            MeetingAuthErrorKind::Config => DomainErrorKind::Internal(InternalErrorKind::Config),
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<ConferenceError> for Error {
    fn from(err: ConferenceError) -> Self {
        let error_kind = match &err {
            ConferenceError::Authentication(_) => {
                DomainErrorKind::External(ExternalErrorKind::Authentication)
            }
            ConferenceError::Network(_) => DomainErrorKind::External(ExternalErrorKind::Network),
            ConferenceError::Configuration(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Config)
            }
            ConferenceError::Provider(_)
            | ConferenceError::NotFound(_)
            | ConferenceError::RateLimited { .. }
            | ConferenceError::Deserialization(_)
            | ConferenceError::Other(_) => DomainErrorKind::External(ExternalErrorKind::Provider),
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}
