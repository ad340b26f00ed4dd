use std::sync::LazyLock;

use regex::Regex;

use crate::model::project::{PrdSource, PrdSubmission};

/// Characters of PRD text shown in the preview box
pub const PREVIEW_CHARS: usize = 200;

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#+\s").expect("header pattern"));
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[-*]\s").expect("bullet pattern"));

/// State of the PRD input page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrdForm {
    pub title: String,
    pub source: PrdSource,
    pub manual_content: String,
    pub confluence_url: String,
    /// Page text once fetched. Fetching itself happens outside this crate.
    pub fetched_content: Option<String>,
}

impl PrdForm {
    /// Text of the active source
    pub fn content(&self) -> &str {
        match self.source {
            PrdSource::Manual => &self.manual_content,
            PrdSource::Confluence => self.fetched_content.as_deref().unwrap_or(""),
        }
    }

    pub fn toggle_source(&mut self) {
        self.source = match self.source {
            PrdSource::Manual => PrdSource::Confluence,
            PrdSource::Confluence => PrdSource::Manual,
        };
    }

    /// Build the create-project body, or `None` while the form is incomplete
    pub fn submission(&self) -> Option<PrdSubmission> {
        if !is_submit_ready(self) {
            return None;
        }
        let content = self.content().to_string();
        Some(PrdSubmission {
            title: self.title.clone(),
            estimated_features: estimate_feature_count(&content),
            content,
            source: self.source,
            confluence_url: match self.source {
                PrdSource::Confluence => Some(self.confluence_url.clone()),
                PrdSource::Manual => None,
            },
        })
    }
}

/// Rough number of features: one per three markdown headers or bullets,
/// never less than one.
pub fn estimate_feature_count(content: &str) -> usize {
    let headers = HEADER_RE.find_iter(content).count();
    let bullets = BULLET_RE.find_iter(content).count();
    ((headers + bullets) / 3).max(1)
}

/// A title is always required. Manual input needs non-blank text;
/// Confluence input needs fetched content.
pub fn is_submit_ready(form: &PrdForm) -> bool {
    if form.title.trim().is_empty() {
        return false;
    }
    match form.source {
        PrdSource::Manual => !form.manual_content.trim().is_empty(),
        PrdSource::Confluence => form.fetched_content.is_some(),
    }
}

pub fn content_preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
