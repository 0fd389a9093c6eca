//! Prompt construction for resume analysis

use crate::error::{Result, ResumeMatcherError};

const RESUME_PLACEHOLDER: &str = "{resume}";
const JOB_PLACEHOLDER: &str = "{job}";

/// The two texts one analysis is run on.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    resume_text: String,
    job_description_text: String,
}

impl AnalysisRequest {
    /// Both texts must contain something other than whitespace.
    pub fn new(resume_text: impl Into<String>, job_description_text: impl Into<String>) -> Result<Self> {
        let resume_text = resume_text.into();
        let job_description_text = job_description_text.into();

        if resume_text.trim().is_empty() {
            return Err(ResumeMatcherError::InvalidInput("Resume is empty".to_string()));
        }
        if job_description_text.trim().is_empty() {
            return Err(ResumeMatcherError::InvalidInput(
                "Job description is empty".to_string(),
            ));
        }

        Ok(Self {
            resume_text,
            job_description_text,
        })
    }

    pub fn resume_text(&self) -> &str {
        &self.resume_text
    }

    pub fn job_description_text(&self) -> &str {
        &self.job_description_text
    }
}

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub analysis: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            analysis: ANALYSIS_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Render the analysis prompt in a single pass so input text is never re-expanded.
    pub fn render_analysis(&self, request: &AnalysisRequest) -> String {
        let mut out = String::with_capacity(
            self.analysis.len() + request.resume_text.len() + request.job_description_text.len(),
        );
        let mut rest = self.analysis.as_str();

        loop {
            let next = [
                (RESUME_PLACEHOLDER, request.resume_text.as_str()),
                (JOB_PLACEHOLDER, request.job_description_text.as_str()),
            ]
            .into_iter()
            .filter_map(|(token, value)| rest.find(token).map(|pos| (pos, token, value)))
            .min_by_key(|(pos, _, _)| *pos);

            match next {
                Some((pos, token, value)) => {
                    out.push_str(&rest[..pos]);
                    out.push_str(value);
                    rest = &rest[pos + token.len()..];
                }
                None => {
                    out.push_str(rest);
                    break;
                }
            }
        }

        out
    }
}

const ANALYSIS_TEMPLATE: &str = r#"You are an expert ATS (Applicant Tracking System) optimization specialist and resume consultant. Compare the resume below with the job description and give specific, actionable feedback.

<RESUME>
{resume}
</RESUME>

<JOB DESCRIPTION>
{job}
</JOB DESCRIPTION>

Respond with a single JSON object using exactly this structure:
{
  "match_score": <integer from 0 to 100>,
  "score_explanation": "<2-3 sentences explaining the score>",
  "missing_keywords": ["<keyword>", "<keyword>", "<keyword>", "<keyword>", "<keyword>"],
  "improvements": ["<improvement>", "<improvement>", "<improvement>", "<improvement>", "<improvement>"],
  "rewritten_bullets": [
    {"original": "<bullet from the resume>", "improved": "<rewritten bullet>", "keywords_added": ["<keyword>"]},
    {"original": "<bullet from the resume>", "improved": "<rewritten bullet>", "keywords_added": ["<keyword>"]},
    {"original": "<bullet from the resume>", "improved": "<rewritten bullet>", "keywords_added": ["<keyword>"]}
  ],
  "ats_tips": ["<formatting tip>", "<formatting tip>", "<formatting tip>"]
}

Focus on:
1. Exact keyword overlap between the job description and the resume
2. Hard and soft skill alignment
3. Relevance of experience and quantified impact
4. ATS-friendly formatting
5. Natural keyword placement, not keyword stuffing
6. Strong action verbs and measurable achievements

Give exactly 5 missing keywords, 5 improvements and 3 rewritten bullets. Reference the actual resume content above. Return ONLY the JSON object with no surrounding text."#;
