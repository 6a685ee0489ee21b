use serde::{Deserialize, Serialize};

/// Shortest resume text or job description worth sending for analysis.
pub const MIN_TEXT_CHARS: usize = 10;

/// Body of an ATS analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub resume_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

impl AnalysisRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_text("Resume text", &self.resume_text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub category: String,
    pub description: String,
    pub impact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub overall_score: f64,
    #[serde(default)]
    pub strengths: Vec<Finding>,
    #[serde(default)]
    pub weaknesses: Vec<Finding>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub summary: String,
    pub analysis_timestamp: String,
}

/// Body of a request to rewrite a resume for one job posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailorRequest {
    pub resume_text: String,
    pub job_description: String,
    pub job_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

impl TailorRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_text("Resume text", &self.resume_text)?;
        require_text("Job description", &self.job_description)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailorReport {
    pub tailored_resume: String,
    #[serde(default)]
    pub changes_made: Vec<String>,
    #[serde(default)]
    pub keyword_matches: Vec<String>,
    pub tailoring_timestamp: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeTips {
    #[serde(default)]
    pub general_tips: Vec<String>,
    #[serde(default)]
    pub ats_optimization: Vec<String>,
    #[serde(default)]
    pub content_guidelines: Vec<String>,
}

fn require_text(label: &str, text: &str) -> Result<(), String> {
    if text.trim().chars().count() < MIN_TEXT_CHARS {
        return Err(format!(
            "{label} must be at least {MIN_TEXT_CHARS} characters long"
        ));
    }
    Ok(())
}
