//! A provider artifact (transcript) submitted to the backend for summarization.

use crate::artifact_type::ArtifactType;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub artifact_type: ArtifactType,

    /// Export location if the provider produced one, otherwise a viewer link
    pub url: String,

    /// Provider processing state, passed through verbatim (e.g. `FILE_GENERATED`)
    pub state: String,

    #[serde(default)]
    pub export_uri: Option<String>,

    #[serde(default)]
    pub provider_document_id: Option<String>,

    /// Number of transcript entries the provider reported at collection time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_count: Option<usize>,
}
