//! Artifact collection: transcripts generated for a conference.

use crate::artifact_type::ArtifactType;
use crate::error::Error;
use crate::meeting_artifacts;
use log::*;
use meeting_conference::traits::conferencing::Provider;
use meeting_conference::Transcript;
use secrecy::SecretString;
use url::Url;

/// Link to a transcript in the provider's own viewer, used when no export exists yet.
pub fn viewer_url(
    viewer_base_url: &str,
    conference_id: &str,
    transcript_id: &str,
) -> Result<String, Error> {
    let mut url = Url::parse(viewer_base_url)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(["conferenceRecords", conference_id, "transcripts", transcript_id]);
    Ok(url.into())
}

/// Collect one artifact per transcript of `conference_id`.
///
/// The transcript state is passed through verbatim. Entry counts are best
/// effort: a failed entry listing is logged and leaves `entry_count` unset.
pub async fn collect(
    provider: &dyn Provider,
    token: &SecretString,
    conference_id: &str,
    viewer_base_url: &str,
) -> Result<Vec<meeting_artifacts::Model>, Error> {
    let transcripts = provider.list_transcripts(token, conference_id).await?;
    debug!(
        "Conference {conference_id} has {} transcript(s)",
        transcripts.len()
    );

    let mut artifacts = Vec::with_capacity(transcripts.len());
    for transcript in &transcripts {
        if let Some(artifact) =
            artifact_for(provider, token, conference_id, viewer_base_url, transcript).await?
        {
            artifacts.push(artifact);
        }
    }
    Ok(artifacts)
}

async fn artifact_for(
    provider: &dyn Provider,
    token: &SecretString,
    conference_id: &str,
    viewer_base_url: &str,
    transcript: &Transcript,
) -> Result<Option<meeting_artifacts::Model>, Error> {
    let transcript_id = transcript.transcript_id();

    let url = match (transcript.export_uri(), transcript_id) {
        (Some(export_uri), _) => export_uri.to_string(),
        (None, Some(transcript_id)) => viewer_url(viewer_base_url, conference_id, transcript_id)?,
        (None, None) => {
            warn!("Skipping transcript with no export and no identifier: {transcript:?}");
            return Ok(None);
        }
    };

    let entry_count = match transcript_id {
        Some(transcript_id) => {
            match provider
                .list_transcript_entries(token, conference_id, transcript_id)
                .await
            {
                Ok(entries) => Some(entries.len()),
                Err(e) => {
                    warn!("Could not list entries of transcript {transcript_id}: {e}");
                    None
                }
            }
        }
        None => None,
    };

    Ok(Some(meeting_artifacts::Model {
        artifact_type: ArtifactType::Transcript,
        url,
        state: transcript.state.clone(),
        export_uri: transcript.export_uri().map(str::to_string),
        provider_document_id: transcript.document_id().map(str::to_string),
        entry_count,
    }))
}
