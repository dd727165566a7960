//! Event system for meeting session lifecycle changes.
//!
//! # Architecture
//!
//! - **DomainEvent**: Enum representing the meeting lifecycle events
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//!
//! This crate has no dependencies on internal crates (entity, domain, etc.),
//! avoiding circular dependencies. Entity data is carried as serialized JSON values.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// A type alias that represents any Entity's internal id field data type.
/// This matches the definition in the entity crate to maintain compatibility.
pub type Id = Uuid;

/// Domain events emitted by the meeting session controller once an operation
/// has completed (or definitively failed).
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A new session was provisioned on the conferencing provider and saved.
    /// Emitted both for explicit creates and for the successor created by `end`.
    MeetingSessionCreated {
        party_id: Id,
        /// Complete serialized meeting session, including the join link.
        meeting_session: Value,
    },
    /// A session was finalized: attendance and artifacts were pushed (or
    /// skipped because empty) and `actual_end` was set.
    MeetingSessionEnded {
        party_id: Id,
        meeting_session_id: Id,
        participant_count: usize,
        artifact_count: usize,
    },
    /// Finalization aborted before the session was marked ended; it stays
    /// active so the caller can retry. Not emitted when only the successor
    /// could not be provisioned.
    MeetingSessionFinalizeFailed {
        party_id: Id,
        meeting_session_id: Option<Id>,
        reason: String,
    },
}

impl DomainEvent {
    pub fn party_id(&self) -> Id {
        match self {
            DomainEvent::MeetingSessionCreated { party_id, .. }
            | DomainEvent::MeetingSessionEnded { party_id, .. }
            | DomainEvent::MeetingSessionFinalizeFailed { party_id, .. } => *party_id,
        }
    }
}

/// Trait for handling domain events.
/// Implementations can perform side effects like sending notifications,
/// updating caches, logging, etc.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    /// Publish an event to all registered handlers, in order.
    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
        label: &'static str,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle(&self, event: &DomainEvent) {
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.label, event.party_id()));
        }
    }

    #[tokio::test]
    async fn test_publish_calls_handlers_in_registration_order() {
        let first = Arc::new(Recorder {
            label: "first",
            ..Default::default()
        });
        let second = Arc::new(Recorder {
            label: "second",
            ..Default::default()
        });
        let publisher = EventPublisher::new()
            .with_handler(first.clone())
            .with_handler(second.clone());

        let party_id = Id::new_v4();
        publisher
            .publish(DomainEvent::MeetingSessionFinalizeFailed {
                party_id,
                meeting_session_id: None,
                reason: "no conference record".to_string(),
            })
            .await;

        assert_eq!(
            first.seen.lock().unwrap().as_slice(),
            [format!("first:{party_id}")]
        );
        assert_eq!(second.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_publish_without_handlers_is_a_no_op() {
        EventPublisher::default()
            .publish(DomainEvent::MeetingSessionEnded {
                party_id: Id::new_v4(),
                meeting_session_id: Id::new_v4(),
                participant_count: 0,
                artifact_count: 0,
            })
            .await;
    }
}
