//! One analysis run: read inputs, query the model, stamp the result

use crate::error::Result;
use crate::input::{InputManager, JobSource};
use crate::llm::client::CompletionClient;
use crate::llm::parser::ParseWarning;
use crate::llm::prompts::AnalysisRequest;
use crate::llm::ResumeAnalyzer;
use crate::output::report::AnalysisResult;
use chrono::Local;
use log::info;
use std::path::Path;

/// Inputs that were read successfully and are ready to send.
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub request: AnalysisRequest,
    pub resume_path: String,
    pub job_path: String,
}

impl LoadedInputs {
    pub fn resume_chars(&self) -> usize {
        self.request.resume_text().chars().count()
    }

    pub fn job_chars(&self) -> usize {
        self.request.job_description_text().chars().count()
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub warnings: Vec<ParseWarning>,
}

pub struct Session<C> {
    inputs: InputManager,
    analyzer: ResumeAnalyzer<C>,
}

impl<C: CompletionClient> Session<C> {
    pub fn new(inputs: InputManager, analyzer: ResumeAnalyzer<C>) -> Self {
        Self { inputs, analyzer }
    }

    /// Read both inputs. Nothing is sent to the model here.
    pub async fn load(&self, resume_path: &Path, job: &JobSource) -> Result<LoadedInputs> {
        let resume_text = self.inputs.extract_text(resume_path).await?;
        let job_text = self.inputs.load_job(job).await?;

        let request = AnalysisRequest::new(resume_text, job_text)?;
        info!(
            "Loaded resume ({} chars) and job description ({} chars)",
            request.resume_text().len(),
            request.job_description_text().len()
        );

        Ok(LoadedInputs {
            request,
            resume_path: resume_path.display().to_string(),
            job_path: job.to_string(),
        })
    }

    pub async fn analyze(&self, loaded: LoadedInputs) -> Result<AnalysisOutcome> {
        let parsed = self.analyzer.analyze(&loaded.request).await?;

        Ok(AnalysisOutcome {
            result: AnalysisResult::new(
                Local::now(),
                loaded.resume_path,
                loaded.job_path,
                parsed.analysis,
            ),
            warnings: parsed.warnings,
        })
    }

    pub async fn run(&self, resume_path: &Path, job: &JobSource) -> Result<AnalysisOutcome> {
        let loaded = self.load(resume_path, job).await?;
        self.analyze(loaded).await
    }

    pub fn analyzer(&self) -> &ResumeAnalyzer<C> {
        &self.analyzer
    }
}
