use serde::{Deserialize, Serialize};

/// Kind of provider-generated artifact submitted for summarization.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactType {
    #[default]
    Transcript,
}

impl std::fmt::Display for ArtifactType {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactType::Transcript => write!(fmt, "transcript"),
        }
    }
}
