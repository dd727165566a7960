//! Party meeting session controller.
//!
//! Owns the lifecycle of a party's meeting sessions: provisioning a session
//! on the conferencing provider, detecting the active one, and ending it.
//!
//! Ending runs a fixed pipeline:
//!
//! 1. ask the provider to end the live conference (non-fatal)
//! 2. obtain a token with the read capabilities, reusing the episode's when it still fits
//! 3. resolve the conference record (fatal if there is none)
//! 4. reconcile participants and collect artifacts concurrently
//! 5. push both to the backend, skipping empty lists
//! 6. mark the session ended
//! 7. provision its successor (reported in the outcome, never an error)
//!
//! Only one create or end may run per party at a time.

mod detect;
mod episode;
mod pipeline;

pub use detect::detect_active;
pub use episode::{SessionEpisode, Window};
pub use pipeline::{EndOutcome, Step};

use crate::conference_record::{self, Resolution};
use crate::error::{meeting_error, DomainErrorKind, Error, InternalErrorKind, MeetingErrorKind};
use crate::gateway::{backend, google_meet};
use crate::persistence::Gateway;
use crate::{artifact, meeting_details, meeting_sessions, parties, participant, Id};
use chrono::{TimeDelta, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use events::{DomainEvent, EventPublisher};
use log::*;
use meeting_auth::http::HttpClientBuilder;
use meeting_auth::oauth::providers::google;
use meeting_auth::oauth::token::Tokens;
use meeting_auth::oauth::{Broker, CapabilitySet};
use meeting_conference::traits::conferencing::Provider;
use meeting_conference::types::space;
use service::config::Config;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Tunables the controller reads from configuration once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Conference records fetched when resolving; only the first is used.
    pub page_size: u32,
    /// Length of the window given to successor sessions.
    pub default_session_length: TimeDelta,
    pub viewer_base_url: String,
    pub space_config: space::Config,
}

impl Settings {
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let minutes = config.default_session_minutes;
        let default_session_length = TimeDelta::try_minutes(minutes)
            .filter(|length| *length > TimeDelta::zero())
            .ok_or_else(|| {
                warn!("Default session length of {minutes} minutes is out of range");
                Error {
                    source: None,
                    error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
                }
            })?;

        Ok(Self {
            page_size: config.conference_record_page_size,
            default_session_length,
            viewer_base_url: config.meet_viewer_base_url().to_string(),
            space_config: space::Config {
                access_type: config.meet_space_access_type().to_string(),
            },
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: 1,
            default_session_length: TimeDelta::minutes(60),
            viewer_base_url: "https://meet.google.com".to_string(),
            space_config: space::Config::default(),
        }
    }
}

/// Which lifecycle operation holds a party's slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    End,
}

/// Releases the party's slot when dropped, whichever way the operation exits.
struct InFlight<'a> {
    operations: &'a DashMap<Id, Operation>,
    party_id: Id,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.operations.remove(&self.party_id);
    }
}

pub struct Controller {
    broker: Arc<dyn Broker>,
    provider: Arc<dyn Provider>,
    gateway: Arc<dyn Gateway>,
    publisher: EventPublisher,
    settings: Settings,
    in_flight: DashMap<Id, Operation>,
}

impl Controller {
    pub fn new(
        broker: Arc<dyn Broker>,
        provider: Arc<dyn Provider>,
        gateway: Arc<dyn Gateway>,
        publisher: EventPublisher,
        settings: Settings,
    ) -> Self {
        Self {
            broker,
            provider,
            gateway,
            publisher,
            settings,
            in_flight: DashMap::new(),
        }
    }

    /// Wire the Google broker, the Google Meet adapter and the backend client
    /// from configuration. All three share one retrying HTTP client.
    pub fn from_config(config: &Config, publisher: EventPublisher) -> Result<Self, Error> {
        let http_client = HttpClientBuilder::new()
            .with_timeout(Duration::from_secs(config.http_timeout_secs))
            .with_max_retries(config.http_max_retries)
            .build()?;

        let credentials = google::Credentials::from_parts(
            config.google_client_id(),
            config.google_client_secret(),
            config.google_refresh_token(),
        )?;
        let broker = google::Broker::new(
            credentials,
            config.google_oauth_token_url(),
            http_client.clone(),
        );
        let provider = google_meet::Client::new(config.google_meet_base_url(), http_client.clone());
        let gateway = backend::Client::new(config, http_client);

        Ok(Self::new(
            Arc::new(broker),
            Arc::new(provider),
            Arc::new(gateway),
            publisher,
            Settings::from_config(config)?,
        ))
    }

    fn acquire(&self, party_id: Id, operation: Operation) -> Result<InFlight<'_>, Error> {
        match self.in_flight.entry(party_id) {
            Entry::Occupied(running) => {
                warn!(
                    "Refusing {operation:?} for party {party_id}: {:?} already in progress",
                    running.get()
                );
                Err(meeting_error(MeetingErrorKind::InFlight))
            }
            Entry::Vacant(slot) => {
                slot.insert(operation);
                Ok(InFlight {
                    operations: &self.in_flight,
                    party_id,
                })
            }
        }
    }

    /// The party's active session, if any.
    pub async fn current(&self, party_id: Id) -> Result<Option<meeting_sessions::Model>, Error> {
        let sessions = self.gateway.party_meetings(party_id).await?;
        Ok(detect_active(&sessions, Utc::now()).cloned())
    }

    /// Rebuild the episode for the party's active session so it can be ended.
    ///
    /// The provisioning token is not recoverable; `end` requests a new one
    /// covering termination and reconciliation.
    pub async fn resume(&self, party_id: Id) -> Result<SessionEpisode, Error> {
        let party = self.gateway.find_party(party_id).await?;
        let sessions = self.gateway.party_meetings(party_id).await?;
        let session = detect_active(&sessions, Utc::now())
            .cloned()
            .ok_or_else(|| meeting_error(MeetingErrorKind::NoActiveSession))?;

        Ok(SessionEpisode {
            party,
            session,
            token: None,
        })
    }

    pub async fn details(&self, session_id: Id) -> Result<meeting_details::Model, Error> {
        self.gateway.meeting_details(session_id).await
    }

    /// Provision a new session for the party and save it as started.
    pub async fn create(
        &self,
        party_id: Id,
        title: &str,
        window: Window,
    ) -> Result<SessionEpisode, Error> {
        let _in_flight = self.acquire(party_id, Operation::Create)?;
        let party = self.gateway.find_party(party_id).await?;
        self.provision(&party, title, window).await
    }

    /// End the episode's session and start its successor.
    ///
    /// Failures before the session is marked ended leave it active (no
    /// `actual_end` locally or on the backend) so the call can be retried; a
    /// `MeetingSessionFinalizeFailed` event is published. After that point an
    /// outcome is always returned and a failed successor shows up as
    /// `EndOutcome::successor` being skipped.
    /// `cancel` is honoured between steps, never in the middle of one.
    pub async fn end(
        &self,
        episode: &SessionEpisode,
        cancel: &CancellationToken,
    ) -> Result<EndOutcome, Error> {
        let party_id = episode.party.id;
        let _in_flight = self.acquire(party_id, Operation::End)?;

        match self.finalize(episode, cancel).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!(
                    "Failed to end session {:?} of party {party_id}: {err}",
                    episode.session.id
                );
                self.publisher
                    .publish(DomainEvent::MeetingSessionFinalizeFailed {
                        party_id,
                        meeting_session_id: episode.session.id,
                        reason: err.to_string(),
                    })
                    .await;
                Err(err)
            }
        }
    }

    async fn provision(
        &self,
        party: &parties::Model,
        title: &str,
        window: Window,
    ) -> Result<SessionEpisode, Error> {
        let token = self
            .broker
            .request_token(&CapabilitySet::session_episode())
            .await?;

        let space = self
            .provider
            .create_space(&token.access_token, self.settings.space_config.clone())
            .await?;
        info!(
            "Created {} space {} for party {}",
            self.provider.provider_id(),
            space.meeting_code,
            party.id
        );

        let draft = meeting_sessions::Model {
            id: None,
            party_id: party.id,
            organizer_id: party.organizer_id,
            title: title.to_string(),
            scheduled_start: window.start,
            scheduled_end: window.end,
            actual_start: Some(Utc::now()),
            actual_end: None,
            join_link: space.meeting_uri.clone(),
            space_name: Some(space.name.clone()),
            meeting_code: Some(space.meeting_code.clone()),
        };

        let mut session = self.gateway.upsert_session(&draft).await?;
        if session.id.is_none() {
            return Err(meeting_error(MeetingErrorKind::Unsaved));
        }
        // The provider descriptor is authoritative for how to join.
        session.join_link = space.meeting_uri;
        session.space_name = Some(space.name);
        session.meeting_code = Some(space.meeting_code);

        self.publisher
            .publish(DomainEvent::MeetingSessionCreated {
                party_id: party.id,
                meeting_session: serde_json::to_value(&session).unwrap_or_else(|e| {
                    warn!("Could not serialize session {:?} for its event: {e}", session.id);
                    serde_json::Value::Null
                }),
            })
            .await;

        Ok(SessionEpisode {
            party: party.clone(),
            session,
            token: Some(token),
        })
    }

    /// Token for ending the live conference and reading it back afterwards.
    ///
    /// The episode's token is used while it still allows termination. Otherwise
    /// one token for termination and reconciliation together is requested;
    /// failing to get it only costs the termination step.
    async fn end_token(&self, episode: &SessionEpisode) -> Option<Tokens> {
        let termination = CapabilitySet::termination();
        if let Some(token) = episode
            .token
            .as_ref()
            .filter(|token| token.is_usable_for(&termination))
        {
            return Some(token.clone());
        }

        let wanted = termination.union(&CapabilitySet::reconciliation());
        debug!("Requesting a token for {wanted}");
        match self.broker.request_token(&wanted).await {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("Could not obtain a token to end the conference: {e}");
                None
            }
        }
    }

    async fn terminate(
        &self,
        session: &meeting_sessions::Model,
        token: Option<&Tokens>,
    ) -> Step<()> {
        let Some(space) = session
            .space_name
            .as_deref()
            .or(session.meeting_code.as_deref())
        else {
            return Step::skipped("session has no provider space");
        };

        let Some(token) = token.filter(|token| token.is_usable_for(&CapabilitySet::termination()))
        else {
            info!("No usable token to end the conference in {space}; leaving it to expire");
            return Step::skipped("no usable token");
        };

        match self
            .provider
            .end_active_conference(&token.access_token, space)
            .await
        {
            Ok(()) => Step::Completed(()),
            Err(e) => {
                warn!("Provider did not end the conference in {space}: {e}");
                Step::skipped(e.to_string())
            }
        }
    }

    async fn reconciliation_token(&self, cached: Option<&Tokens>) -> Result<Tokens, Error> {
        let required = CapabilitySet::reconciliation();
        match cached {
            Some(token) if token.is_usable_for(&required) => Ok(token.clone()),
            _ => {
                debug!("Requesting a token for {required}");
                Ok(self.broker.request_token(&required).await?)
            }
        }
    }

    async fn finalize(
        &self,
        episode: &SessionEpisode,
        cancel: &CancellationToken,
    ) -> Result<EndOutcome, Error> {
        let party = &episode.party;
        let session_id = episode
            .session
            .id
            .ok_or_else(|| meeting_error(MeetingErrorKind::Unsaved))?;

        let end_token = self.end_token(episode).await;
        let termination = self
            .terminate(&episode.session, end_token.as_ref())
            .await;

        if cancel.is_cancelled() {
            return Err(meeting_error(MeetingErrorKind::Cancelled));
        }

        let token = self.reconciliation_token(end_token.as_ref()).await?;
        let access_token = &token.access_token;

        let conference_id = match conference_record::resolve_latest(
            self.provider.as_ref(),
            access_token,
            self.settings.page_size,
        )
        .await?
        {
            Resolution::Found {
                conference_id,
                record,
            } => {
                if let (Some(seen), Some(expected)) =
                    (record.space.as_deref(), episode.session.space_name.as_deref())
                {
                    if seen != expected {
                        warn!("Conference {conference_id} belongs to {seen}, not {expected}");
                    }
                }
                conference_id
            }
            Resolution::NotFound => {
                return Err(meeting_error(MeetingErrorKind::NoConferenceRecord));
            }
        };

        let (attendees, artifacts) = tokio::try_join!(
            async {
                self.provider
                    .list_participants(access_token, &conference_id)
                    .await
                    .map_err(Error::from)
            },
            artifact::collect(
                self.provider.as_ref(),
                access_token,
                &conference_id,
                &self.settings.viewer_base_url,
            ),
        )?;

        let session_start = episode
            .session
            .actual_start
            .unwrap_or(episode.session.scheduled_start);
        let participants = participant::reconcile(
            &attendees,
            &party.members,
            episode.session.organizer_id,
            session_id,
            session_start,
            Utc::now(),
        );

        if cancel.is_cancelled() {
            return Err(meeting_error(MeetingErrorKind::Cancelled));
        }

        let participants_step = if participants.is_empty() {
            Step::skipped("no participants to push")
        } else {
            self.gateway
                .upsert_participants(session_id, &participants)
                .await?;
            Step::Completed(participants.len())
        };

        let artifacts_step = if artifacts.is_empty() {
            Step::skipped("no artifacts to push")
        } else {
            self.gateway.submit_artifacts(session_id, &artifacts).await?;
            Step::Completed(artifacts.len())
        };

        let mut ended = episode.session.clone();
        ended.actual_end = Some(Utc::now());
        self.gateway.upsert_session(&ended).await?;
        info!(
            "Ended session {session_id} of party {}: {} participant(s), {} artifact(s)",
            party.id,
            participants.len(),
            artifacts.len()
        );

        self.publisher
            .publish(DomainEvent::MeetingSessionEnded {
                party_id: party.id,
                meeting_session_id: session_id,
                participant_count: participants.len(),
                artifact_count: artifacts.len(),
            })
            .await;

        let successor = match self.provision_successor(episode).await {
            Ok(successor) => Step::Completed(successor),
            Err(e) => {
                error!(
                    "Session {session_id} of party {} ended but no successor was provisioned: {e}",
                    party.id
                );
                Step::skipped(e.to_string())
            }
        };

        Ok(EndOutcome {
            ended,
            successor,
            termination,
            participants: participants_step,
            artifacts: artifacts_step,
        })
    }

    async fn provision_successor(&self, episode: &SessionEpisode) -> Result<SessionEpisode, Error> {
        let window = Window::starting_at(Utc::now(), self.settings.default_session_length)?;
        self.provision(&episode.party, &episode.session.title, window)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MockGateway;
    use crate::meeting_role::MeetingRole;
    use crate::party_members;
    use async_trait::async_trait;
    use events::EventHandler;
    use meeting_auth::oauth::{Capability, MockBroker};
    use meeting_conference::traits::conferencing::MockProvider;
    use meeting_conference::types::participant::Attendee;
    use meeting_conference::types::space::Space;
    use meeting_conference::types::transcript::{DocsDestination, Entry, Transcript};
    use meeting_conference::ConferenceRecord;
    use secrecy::SecretString;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<DomainEvent>>,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle(&self, event: &DomainEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn tokens(capabilities: CapabilitySet) -> Tokens {
        Tokens {
            access_token: SecretString::new("ya29.test".to_string()),
            expires_at: Some(Utc::now() + TimeDelta::hours(1)),
            token_type: "Bearer".to_string(),
            capabilities,
        }
    }

    fn member(username: &str, first: &str, last: &str) -> party_members::Model {
        party_members::Model {
            user_id: Id::new_v4(),
            username: username.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: format!("{username}@example.com"),
        }
    }

    struct Fixture {
        organizer: party_members::Model,
        member_a: party_members::Model,
        episode: SessionEpisode,
    }

    fn fixture() -> Fixture {
        let organizer = member("olive", "Olive", "Organizer");
        let member_a = member("mathwiz", "Ada", "Lovelace");
        let party = parties::Model {
            id: Id::new_v4(),
            name: "Calculus crew".to_string(),
            organizer_id: organizer.user_id,
            members: vec![organizer.clone(), member_a.clone()],
        };
        let started = Utc::now() - TimeDelta::minutes(45);
        let session = meeting_sessions::Model {
            id: Some(Id::new_v4()),
            party_id: party.id,
            organizer_id: organizer.user_id,
            title: "Calculus crew weekly".to_string(),
            scheduled_start: started,
            scheduled_end: started + TimeDelta::hours(1),
            actual_start: Some(started),
            actual_end: None,
            join_link: "https://meet.google.com/old-code-abc".to_string(),
            space_name: Some("spaces/old".to_string()),
            meeting_code: Some("old-code-abc".to_string()),
        };
        Fixture {
            organizer,
            member_a,
            episode: SessionEpisode {
                party,
                session,
                token: Some(tokens(CapabilitySet::session_episode())),
            },
        }
    }

    fn controller(
        broker: MockBroker,
        provider: MockProvider,
        gateway: MockGateway,
        recorder: Arc<Recorder>,
    ) -> Controller {
        Controller::new(
            Arc::new(broker),
            Arc::new(provider),
            Arc::new(gateway),
            EventPublisher::new().with_handler(recorder),
            Settings::default(),
        )
    }

    fn successor_space() -> Space {
        Space {
            name: "spaces/new".to_string(),
            meeting_uri: "https://meet.google.com/new-code-xyz".to_string(),
            meeting_code: "new-code-xyz".to_string(),
        }
    }

    fn expect_conference(provider: &mut MockProvider, member_a: &party_members::Model) {
        let username = member_a.username.clone();
        provider
            .expect_list_conference_records()
            .return_once(|_, _| {
                Ok(vec![ConferenceRecord {
                    name: Some("conferenceRecords/conf-1".to_string()),
                    space: Some("spaces/old".to_string()),
                    ..Default::default()
                }])
            });
        provider.expect_list_participants().return_once(move |_, _| {
            Ok(vec![
                Attendee {
                    display_name: Some(username),
                    ..Default::default()
                },
                Attendee {
                    display_name: Some("Someone Else".to_string()),
                    ..Default::default()
                },
            ])
        });
        provider.expect_list_transcripts().return_once(|_, _| {
            Ok(vec![Transcript {
                name: Some("conferenceRecords/conf-1/transcripts/t-1".to_string()),
                state: "FILE_GENERATED".to_string(),
                docs_destination: Some(DocsDestination {
                    document: Some("documents/doc-1".to_string()),
                    export_uri: Some("https://docs.google.com/document/d/doc-1".to_string()),
                }),
                ..Default::default()
            }])
        });
        provider
            .expect_list_transcript_entries()
            .return_once(|_, _, _| Ok(vec![Entry::default()]));
    }

    fn expect_successor(broker: &mut MockBroker, provider: &mut MockProvider) {
        broker
            .expect_request_token()
            .withf(|capabilities| *capabilities == CapabilitySet::session_episode())
            .times(1)
            .returning(|capabilities| Ok(tokens(capabilities.clone())));
        provider
            .expect_create_space()
            .times(1)
            .returning(|_, _| Ok(successor_space()));
    }

    fn saving_gateway() -> MockGateway {
        let mut gateway = MockGateway::new();
        gateway.expect_upsert_session().returning(|session| {
            let mut saved = session.clone();
            saved.id.get_or_insert_with(Id::new_v4);
            Ok(saved)
        });
        gateway
    }

    #[tokio::test]
    async fn test_end_reconciles_pushes_and_provisions_successor() {
        let Fixture {
            organizer,
            member_a,
            episode,
        } = fixture();
        let mut broker = MockBroker::new();
        let mut provider = MockProvider::new();
        provider.expect_provider_id().return_const("google_meet");
        provider
            .expect_end_active_conference()
            .times(1)
            .returning(|_, _| Err(meeting_conference::Error::Provider("already ended".to_string())));
        expect_conference(&mut provider, &member_a);
        expect_successor(&mut broker, &mut provider);

        let mut gateway = saving_gateway();
        let pushed = Arc::new(Mutex::new(Vec::new()));
        let sink = pushed.clone();
        gateway
            .expect_upsert_participants()
            .times(1)
            .returning(move |_, rows| {
                sink.lock().unwrap().extend_from_slice(rows);
                Ok(())
            });
        gateway
            .expect_submit_artifacts()
            .withf(|_, artifacts| artifacts.len() == 1 && artifacts[0].entry_count == Some(1))
            .times(1)
            .returning(|_, _| Ok(()));

        let recorder = Arc::new(Recorder::default());
        let controller = controller(broker, provider, gateway, recorder.clone());

        let outcome = controller
            .end(&episode, &CancellationToken::new())
            .await
            .unwrap();

        assert!(!outcome.termination.is_completed());
        assert_eq!(outcome.participants, Step::Completed(2));
        assert_eq!(outcome.artifacts, Step::Completed(1));

        let rows = pushed.lock().unwrap().clone();
        assert_eq!(rows[0].user_id, member_a.user_id);
        assert_eq!(rows[1].user_id, organizer.user_id);
        assert_eq!(rows[1].role_in_meeting, MeetingRole::Organizer);
        assert_eq!(rows[1].join_time, episode.session.actual_start.unwrap());
        assert!(rows[1].leave_time.is_some());

        assert!(outcome.ended.actual_end.is_some());
        let Step::Completed(successor) = &outcome.successor else {
            panic!("successor was not provisioned: {:?}", outcome.successor);
        };
        let successor = &successor.session;
        assert!(successor.actual_start.is_some());
        assert_eq!(successor.join_link, "https://meet.google.com/new-code-xyz");
        assert_ne!(successor.join_link, episode.session.join_link);
        assert_eq!(successor.title, episode.session.title);

        let sessions = vec![outcome.ended.clone(), successor.clone()];
        assert_eq!(detect_active(&sessions, Utc::now()), Some(successor));

        let events = recorder.events.lock().unwrap();
        assert!(matches!(
            events[0],
            DomainEvent::MeetingSessionEnded {
                participant_count: 2,
                artifact_count: 1,
                ..
            }
        ));
        assert!(matches!(events[1], DomainEvent::MeetingSessionCreated { .. }));
    }

    #[tokio::test]
    async fn test_end_without_conference_record_is_fatal_and_pushes_nothing() {
        let Fixture { episode, .. } = fixture();
        let broker = MockBroker::new();
        let mut provider = MockProvider::new();
        provider.expect_provider_id().return_const("google_meet");
        provider
            .expect_end_active_conference()
            .returning(|_, _| Ok(()));
        provider
            .expect_list_conference_records()
            .returning(|_, _| Ok(vec![]));
        provider.expect_create_space().never();
        let gateway = MockGateway::new();

        let recorder = Arc::new(Recorder::default());
        let controller = controller(broker, provider, gateway, recorder.clone());

        let err = controller
            .end(&episode, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(err.is_meeting(MeetingErrorKind::NoConferenceRecord));
        assert!(err.to_string().starts_with("could not finalize session"));
        assert!(episode.session.actual_end.is_none());
        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            DomainEvent::MeetingSessionFinalizeFailed { .. }
        ));
    }

    #[tokio::test]
    async fn test_failed_push_does_not_mark_session_ended() {
        let Fixture {
            member_a, episode, ..
        } = fixture();
        let mut provider = MockProvider::new();
        provider.expect_provider_id().return_const("google_meet");
        provider
            .expect_end_active_conference()
            .returning(|_, _| Ok(()));
        expect_conference(&mut provider, &member_a);
        provider.expect_create_space().never();

        let mut gateway = MockGateway::new();
        gateway
            .expect_upsert_participants()
            .returning(|_, _| Err(crate::error::persistence_error("backend unavailable")));
        gateway.expect_submit_artifacts().never();
        gateway.expect_upsert_session().never();

        let controller = controller(
            MockBroker::new(),
            provider,
            gateway,
            Arc::new(Recorder::default()),
        );

        let err = controller
            .end(&episode, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(crate::error::ExternalErrorKind::Persistence)
        );
    }

    #[tokio::test]
    async fn test_resumed_episode_requests_one_token_to_terminate_and_reconcile() {
        let Fixture {
            member_a,
            mut episode,
            ..
        } = fixture();
        episode.token = None;

        let mut broker = MockBroker::new();
        broker
            .expect_request_token()
            .withf(|capabilities| {
                *capabilities
                    == CapabilitySet::termination().union(&CapabilitySet::reconciliation())
            })
            .times(1)
            .returning(|capabilities| Ok(tokens(capabilities.clone())));
        let mut provider = MockProvider::new();
        provider.expect_provider_id().return_const("google_meet");
        provider
            .expect_end_active_conference()
            .withf(|_, space| space == "spaces/old")
            .times(1)
            .returning(|_, _| Ok(()));
        expect_conference(&mut provider, &member_a);
        expect_successor(&mut broker, &mut provider);

        let mut gateway = saving_gateway();
        gateway
            .expect_upsert_participants()
            .returning(|_, _| Ok(()));
        gateway.expect_submit_artifacts().returning(|_, _| Ok(()));

        let controller = controller(broker, provider, gateway, Arc::new(Recorder::default()));
        let outcome = controller
            .end(&episode, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.termination, Step::Completed(()));
        assert!(outcome.participants.is_completed());
        assert!(outcome.successor.is_completed());
    }

    #[tokio::test]
    async fn test_token_failure_only_skips_termination() {
        let Fixture {
            member_a,
            mut episode,
            ..
        } = fixture();
        episode.token = None;

        let mut broker = MockBroker::new();
        broker
            .expect_request_token()
            .withf(|capabilities| capabilities.contains(Capability::SpaceCreation))
            .times(1)
            .returning(|_| {
                Err(meeting_auth::Error {
                    source: None,
                    error_kind: meeting_auth::ErrorKind::Http(
                        meeting_auth::error::HttpErrorKind::Network,
                    ),
                })
            });
        broker
            .expect_request_token()
            .withf(|capabilities| *capabilities == CapabilitySet::reconciliation())
            .times(1)
            .returning(|capabilities| Ok(tokens(capabilities.clone())));
        let mut provider = MockProvider::new();
        provider.expect_provider_id().return_const("google_meet");
        provider.expect_end_active_conference().never();
        expect_conference(&mut provider, &member_a);
        expect_successor(&mut broker, &mut provider);

        let mut gateway = saving_gateway();
        gateway
            .expect_upsert_participants()
            .returning(|_, _| Ok(()));
        gateway.expect_submit_artifacts().returning(|_, _| Ok(()));

        let controller = controller(broker, provider, gateway, Arc::new(Recorder::default()));
        let outcome = controller
            .end(&episode, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.termination, Step::skipped("no usable token"));
        assert!(outcome.participants.is_completed());
    }

    #[tokio::test]
    async fn test_successor_failure_still_reports_session_ended() {
        let Fixture {
            member_a, episode, ..
        } = fixture();
        let mut broker = MockBroker::new();
        broker
            .expect_request_token()
            .times(1)
            .returning(|capabilities| Ok(tokens(capabilities.clone())));
        let mut provider = MockProvider::new();
        provider.expect_provider_id().return_const("google_meet");
        provider
            .expect_end_active_conference()
            .returning(|_, _| Ok(()));
        expect_conference(&mut provider, &member_a);
        provider
            .expect_create_space()
            .times(1)
            .returning(|_, _| Err(meeting_conference::Error::Provider("quota".to_string())));

        let saved = Arc::new(Mutex::new(Vec::new()));
        let sink = saved.clone();
        let mut gateway = MockGateway::new();
        gateway.expect_upsert_session().times(1).returning(move |session| {
            sink.lock().unwrap().push(session.clone());
            Ok(session.clone())
        });
        gateway
            .expect_upsert_participants()
            .returning(|_, _| Ok(()));
        gateway.expect_submit_artifacts().returning(|_, _| Ok(()));

        let recorder = Arc::new(Recorder::default());
        let controller = controller(broker, provider, gateway, recorder.clone());
        let outcome = controller
            .end(&episode, &CancellationToken::new())
            .await
            .unwrap();

        assert!(outcome.ended.actual_end.is_some());
        assert_eq!(
            saved.lock().unwrap()[0].actual_end,
            outcome.ended.actual_end
        );
        assert!(!outcome.successor.is_completed());
        assert!(matches!(&outcome.successor, Step::Skipped(reason) if reason.contains("quota")));

        let sessions = vec![outcome.ended.clone()];
        assert_eq!(detect_active(&sessions, Utc::now()), None);

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], DomainEvent::MeetingSessionEnded { .. }));
    }

    #[test]
    fn test_settings_reject_unrepresentable_session_length() {
        use clap::Parser;

        let mut config = Config::try_parse_from(["party_meetings"]).unwrap();
        config.default_session_minutes = i64::MAX;
        let err = Settings::from_config(&config).unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config)
        );

        config.default_session_minutes = 45;
        let settings = Settings::from_config(&config).unwrap();
        assert_eq!(settings.default_session_length, TimeDelta::minutes(45));
    }

    #[tokio::test]
    async fn test_cancelled_end_stops_before_resolution() {
        let Fixture { episode, .. } = fixture();
        let mut provider = MockProvider::new();
        provider
            .expect_end_active_conference()
            .returning(|_, _| Ok(()));
        provider.expect_list_conference_records().never();

        let controller = controller(
            MockBroker::new(),
            provider,
            MockGateway::new(),
            Arc::new(Recorder::default()),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = controller.end(&episode, &cancel).await.unwrap_err();

        assert!(err.is_meeting(MeetingErrorKind::Cancelled));
    }

    #[tokio::test]
    async fn test_second_operation_for_same_party_is_refused() {
        let Fixture { episode, .. } = fixture();
        let controller = controller(
            MockBroker::new(),
            MockProvider::new(),
            MockGateway::new(),
            Arc::new(Recorder::default()),
        );

        let guard = controller
            .acquire(episode.party.id, Operation::End)
            .unwrap();
        let err = controller
            .end(&episode, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Meeting(MeetingErrorKind::InFlight)
        );

        // Other parties are unaffected.
        assert!(controller.acquire(Id::new_v4(), Operation::Create).is_ok());

        drop(guard);
        assert!(controller
            .acquire(episode.party.id, Operation::Create)
            .is_ok());
    }

    #[tokio::test]
    async fn test_create_saves_started_session_with_provider_descriptor() {
        let Fixture { episode, .. } = fixture();
        let party = episode.party.clone();
        let mut broker = MockBroker::new();
        let mut provider = MockProvider::new();
        provider.expect_provider_id().return_const("google_meet");
        expect_successor(&mut broker, &mut provider);

        let mut gateway = MockGateway::new();
        gateway
            .expect_find_party()
            .return_once(move |_| Ok(party));
        gateway
            .expect_upsert_session()
            .withf(|session| session.id.is_none() && session.actual_start.is_some())
            .returning(|session| {
                let mut saved = session.clone();
                saved.id = Some(Id::new_v4());
                // Backend echoes back an older join link.
                saved.join_link = "https://stale.example.com".to_string();
                Ok(saved)
            });

        let recorder = Arc::new(Recorder::default());
        let controller = controller(broker, provider, gateway, recorder.clone());
        let window = Window::starting_at(Utc::now(), TimeDelta::minutes(30)).unwrap();

        let created = controller
            .create(episode.party.id, "Exam prep", window)
            .await
            .unwrap();

        assert!(created.session.id.is_some());
        assert_eq!(created.session.join_link, "https://meet.google.com/new-code-xyz");
        assert_eq!(created.session.space_name.as_deref(), Some("spaces/new"));
        assert_eq!(created.session.scheduled_end, window.end);
        assert!(created.token.is_some());
        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        let DomainEvent::MeetingSessionCreated {
            meeting_session, ..
        } = &events[0]
        else {
            panic!("expected a created event, got {:?}", events[0]);
        };
        assert_eq!(
            meeting_session["join_link"],
            "https://meet.google.com/new-code-xyz"
        );
        assert_eq!(
            meeting_session["id"],
            serde_json::json!(created.session.id)
        );
    }

    #[tokio::test]
    async fn test_resume_rebuilds_episode_for_active_session() {
        let Fixture { episode, .. } = fixture();
        let party = episode.party.clone();
        let active = episode.session.clone();
        let mut ended = active.clone();
        ended.id = Some(Id::new_v4());
        ended.actual_end = Some(Utc::now());

        let mut gateway = MockGateway::new();
        gateway
            .expect_find_party()
            .return_once(move |_| Ok(party));
        gateway
            .expect_party_meetings()
            .return_once(move |_| Ok(vec![ended, active]));

        let controller = controller(
            MockBroker::new(),
            MockProvider::new(),
            gateway,
            Arc::new(Recorder::default()),
        );

        let resumed = controller.resume(episode.party.id).await.unwrap();

        assert_eq!(resumed.session, episode.session);
        assert!(resumed.token.is_none());
    }

    #[tokio::test]
    async fn test_resume_without_active_session() {
        let Fixture { episode, .. } = fixture();
        let party = episode.party.clone();
        let mut gateway = MockGateway::new();
        gateway
            .expect_find_party()
            .return_once(move |_| Ok(party));
        gateway
            .expect_party_meetings()
            .return_once(|_| Ok(vec![]));

        let controller = controller(
            MockBroker::new(),
            MockProvider::new(),
            gateway,
            Arc::new(Recorder::default()),
        );

        let err = controller.resume(episode.party.id).await.unwrap_err();
        assert!(err.is_meeting(MeetingErrorKind::NoActiveSession));
    }
}
