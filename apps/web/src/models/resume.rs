use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum length of an analysis snippet shown on a resume card.
pub const SNIPPET_CHARS: usize = 200;

/// Backend record identifier. Some API variants return integers, others strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    /// Parses an id taken from a request path. Only URL-safe characters are
    /// accepted so the value can be spliced into backend paths verbatim.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty()
            || !raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return None;
        }
        Some(match raw.parse::<i64>() {
            Ok(n) => RecordId::Number(n),
            Err(_) => RecordId::Text(raw.to_string()),
        })
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// Result of one successful upload, as extracted by the backend.
///
/// Fields are private: the counts are computed server-side over
/// `extracted_text` and the id is assigned once, so none of them may be
/// edited after the record is decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resume_id: Option<RecordId>,
    extracted_text: String,
    file_name: String,
    file_size: u64,
    file_type: String,
    extraction_timestamp: String,
    word_count: u64,
    character_count: u64,
}

impl UploadResult {
    pub fn resume_id(&self) -> Option<&RecordId> {
        self.resume_id.as_ref()
    }

    pub fn extracted_text(&self) -> &str {
        &self.extracted_text
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    pub fn extraction_timestamp(&self) -> &str {
        &self.extraction_timestamp
    }

    pub fn word_count(&self) -> u64 {
        self.word_count
    }

    pub fn character_count(&self) -> u64 {
        self.character_count
    }
}

/// One entry of the user's resume library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeItem {
    #[serde(alias = "resume_id")]
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<RecordId>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// The list endpoint answers either `{ "resumes": [...] }` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ResumeListBody {
    Wrapped { resumes: Vec<ResumeItem> },
    Bare(Vec<ResumeItem>),
}

impl ResumeListBody {
    pub fn into_items(self) -> Vec<ResumeItem> {
        match self {
            ResumeListBody::Wrapped { resumes } => resumes,
            ResumeListBody::Bare(items) => items,
        }
    }
}

/// Stored analysis for a resume. The analysis object itself is opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub resume_id: RecordId,
    #[serde(default)]
    pub analysis: Option<Value>,
}

impl StoredAnalysis {
    /// Card snippet: `analysis.summary`, else `analysis.text`.
    pub fn summary(&self) -> Option<String> {
        let analysis = self.analysis.as_ref()?;
        ["summary", "text"]
            .iter()
            .filter_map(|key| analysis.get(key).and_then(|v| v.as_str()))
            .find(|s| !s.is_empty())
            .map(|s| snippet(s, SNIPPET_CHARS))
    }
}

/// Re-analysis answers `{ summary }` or `{ analysis: { summary } }`.
pub fn reanalysis_summary(body: &Value) -> Option<String> {
    body.get("summary")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            body.get("analysis")
                .and_then(|a| a.get("summary"))
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
        })
        .map(|s| snippet(s, SNIPPET_CHARS))
}

/// Truncates to at most `max` characters without splitting a code point.
pub fn snippet(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
