use serde::{Deserialize, Serialize};

use super::resume::{snippet, RecordId};

const PREVIEW_CHARS: usize = 150;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobItem {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<RecordId>,
    pub title: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JobsBody {
    #[serde(default)]
    pub jobs: Vec<JobItem>,
}

/// Job card as served to views: the listing plus a short description preview.
#[derive(Debug, Clone, Serialize)]
pub struct JobCard {
    #[serde(flatten)]
    pub job: JobItem,
    pub preview: String,
}

impl From<JobItem> for JobCard {
    fn from(job: JobItem) -> Self {
        let preview = description_preview(job.description.as_deref());
        JobCard { job, preview }
    }
}

pub fn description_preview(description: Option<&str>) -> String {
    match description {
        None | Some("") => "No description available.".to_string(),
        Some(text) if text.chars().count() > PREVIEW_CHARS => {
            format!("{}...", snippet(text, PREVIEW_CHARS))
        }
        Some(text) => text.to_string(),
    }
}
