use async_trait::async_trait;
use chrono::Utc;
use clap::{Parser, Subcommand};
use domain::error::Error;
use domain::party_meeting::{Controller, Window};
use domain::Id;
use events::{DomainEvent, EventHandler, EventPublisher};
use log::*;
use serde_json::{json, Value};
use service::config::{Config, MAX_SESSION_MINUTES};
use service::logging::Logger;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "party_meetings")]
#[command(about = "Provision, end and inspect a party's meeting sessions")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the party's active session, if any
    Active { party_id: Id },
    /// Provision a new session starting now
    Create {
        party_id: Id,
        #[arg(long)]
        title: String,
        /// Length of the scheduled window; defaults to DEFAULT_SESSION_MINUTES
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..=MAX_SESSION_MINUTES))]
        minutes: Option<i64>,
    },
    /// End the party's active session and start its successor
    End { party_id: Id },
    /// Show a finalized session with its participants
    Details { session_id: Id },
}

/// Writes every lifecycle event to the log.
struct LogEventHandler;

#[async_trait]
impl EventHandler for LogEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        match event {
            DomainEvent::MeetingSessionCreated { party_id, .. } => {
                info!("Meeting session created for party {party_id}")
            }
            DomainEvent::MeetingSessionEnded {
                party_id,
                meeting_session_id,
                participant_count,
                artifact_count,
            } => info!(
                "Meeting session {meeting_session_id} of party {party_id} ended \
                 ({participant_count} participants, {artifact_count} artifacts)"
            ),
            DomainEvent::MeetingSessionFinalizeFailed {
                party_id, reason, ..
            } => warn!("Could not finalize meeting session of party {party_id}: {reason}"),
        }
    }
}

async fn run(controller: &Controller, command: Command, default_minutes: i64) -> Result<Value, Error> {
    match command {
        Command::Active { party_id } => Ok(json!(controller.current(party_id).await?)),
        Command::Create {
            party_id,
            title,
            minutes,
        } => {
            let minutes = minutes.unwrap_or(default_minutes);
            let window = Window::lasting_minutes(Utc::now(), minutes)?;
            let episode = controller.create(party_id, &title, window).await?;
            Ok(json!(episode.session))
        }
        Command::End { party_id } => {
            let episode = controller.resume(party_id).await?;

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted; stopping after the current step");
                    on_interrupt.cancel();
                }
            });

            let outcome = controller.end(&episode, &cancel).await?;
            Ok(json!({
                "ended": outcome.ended,
                "successor": outcome.successor.map(|successor| successor.session),
                "termination": outcome.termination,
                "participants": outcome.participants,
                "artifacts": outcome.artifacts,
            }))
        }
        Command::Details { session_id } => Ok(json!(controller.details(session_id).await?)),
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    Logger::init_logger(&cli.config);

    let publisher = EventPublisher::new().with_handler(Arc::new(LogEventHandler));
    let controller = match Controller::from_config(&cli.config, publisher) {
        Ok(controller) => controller,
        Err(e) => {
            error!("Failed to configure meeting controller: {e}");
            std::process::exit(1);
        }
    };

    match run(&controller, cli.command, cli.config.default_session_minutes).await {
        Ok(output) => println!("{output:#}"),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}
