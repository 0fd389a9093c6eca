//! Saving analysis results to timestamped JSON files

use crate::error::{Result, ResumeMatcherError};
use crate::output::report::AnalysisResult;
use chrono::{DateTime, Local};
use log::info;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub struct Exporter {
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// `resume_analysis_<YYYYMMDD_HHMMSS>.json`
    pub fn file_name(timestamp: &DateTime<Local>) -> String {
        format!("resume_analysis_{}.json", timestamp.format("%Y%m%d_%H%M%S"))
    }

    pub fn path_for(&self, result: &AnalysisResult) -> PathBuf {
        self.output_dir.join(Self::file_name(&result.timestamp))
    }

    pub fn export(&self, result: &AnalysisResult) -> Result<PathBuf> {
        let path = self.path_for(result);
        let json = serde_json::to_string_pretty(result)?;

        // Never replace an earlier result saved within the same second
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => ResumeMatcherError::Export(format!(
                    "{} already exists; wait a second and save again",
                    path.display()
                )),
                _ => ResumeMatcherError::Export(format!("Cannot write {}: {}", path.display(), e)),
            })?;
        file.write_all(json.as_bytes()).map_err(|e| {
            ResumeMatcherError::Export(format!("Cannot write {}: {}", path.display(), e))
        })?;

        info!("Results saved to {}", path.display());
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<AnalysisResult> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
