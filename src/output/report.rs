//! Analysis result structures

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Maximum number of entries kept per list section.
pub const MAX_MISSING_KEYWORDS: usize = 5;
pub const MAX_IMPROVEMENTS: usize = 5;
pub const MAX_REWRITTEN_BULLETS: usize = 3;

/// The model's structured answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Overall match score (0-100)
    pub match_score: u8,

    /// Short justification of the score
    #[serde(default)]
    pub score_explanation: String,

    /// Job keywords absent from the resume
    #[serde(default)]
    pub missing_keywords: Vec<String>,

    /// Actionable changes to the resume
    #[serde(default)]
    pub improvements: Vec<String>,

    /// Example bullet points before and after optimization
    #[serde(default)]
    pub rewritten_bullets: Vec<RewrittenBullet>,

    /// ATS formatting advice
    #[serde(default)]
    pub ats_tips: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewrittenBullet {
    #[serde(alias = "original")]
    pub before: String,

    #[serde(alias = "improved")]
    pub after: String,

    #[serde(default)]
    pub keywords_added: Vec<String>,
}

/// One completed run: the analysis plus where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub timestamp: DateTime<Local>,
    pub resume_path: String,
    pub job_path: String,
    pub analysis: Analysis,
}

/// Qualitative band for a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Strong,
    Moderate,
    Weak,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => ScoreBand::Strong,
            60..=79 => ScoreBand::Moderate,
            _ => ScoreBand::Weak,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Strong => "Strong match",
            ScoreBand::Moderate => "Moderate match",
            ScoreBand::Weak => "Weak match",
        }
    }
}

impl AnalysisResult {
    pub fn new(
        timestamp: DateTime<Local>,
        resume_path: impl Into<String>,
        job_path: impl Into<String>,
        analysis: Analysis,
    ) -> Self {
        Self {
            timestamp,
            resume_path: resume_path.into(),
            job_path: job_path.into(),
            analysis,
        }
    }

    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::from_score(self.analysis.match_score)
    }
}
