use serde::{Deserialize, Serialize};

/// Where the PRD text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrdSource {
    #[default]
    Manual,
    Confluence,
}

impl PrdSource {
    pub fn is_manual(self) -> bool {
        self == PrdSource::Manual
    }

    pub fn label(self) -> &'static str {
        match self {
            PrdSource::Manual => "Manual input",
            PrdSource::Confluence => "Confluence link",
        }
    }
}

/// Body of `POST /projects/create/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrdSubmission {
    pub title: String,
    pub content: String,
    pub source: PrdSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confluence_url: Option<String>,
    pub estimated_features: usize,
}

/// `data` of a successful project creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedProject {
    pub id: u64,
}
