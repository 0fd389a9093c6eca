//! Input manager for handling different file types and job sources

use crate::config::ScrapeConfig;
use crate::error::{Result, ResumeMatcherError};
use crate::input::file_detector::FileType;
use crate::input::scraper::{is_url, JobScraper};
use crate::input::text_extractor::{
    MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor,
};
use log::info;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where the job description comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum JobSource {
    File(PathBuf),
    Url(String),
}

impl JobSource {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if is_url(input) {
            JobSource::Url(input.to_string())
        } else {
            JobSource::File(PathBuf::from(input))
        }
    }
}

impl fmt::Display for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobSource::File(path) => write!(f, "{}", path.display()),
            JobSource::Url(url) => write!(f, "{}", url),
        }
    }
}

pub struct InputManager {
    scraper: Option<JobScraper>,
}

impl InputManager {
    /// File inputs only; URLs are rejected.
    pub fn new() -> Self {
        Self { scraper: None }
    }

    pub fn from_config(config: &ScrapeConfig) -> Result<Self> {
        let scraper = if config.enabled {
            Some(JobScraper::new(config)?)
        } else {
            None
        };
        Ok(Self { scraper })
    }

    pub async fn extract_text(&self, path: &Path) -> Result<String> {
        if path.as_os_str().is_empty() {
            return Err(ResumeMatcherError::InvalidInput("No file path given".to_string()));
        }

        if !path.exists() {
            return Err(ResumeMatcherError::InvalidInput(format!(
                "File not found: {}",
                path.display()
            )));
        }

        if !path.is_file() {
            return Err(ResumeMatcherError::InvalidInput(format!(
                "Not a file: {}",
                path.display()
            )));
        }

        let text = match FileType::from_path(path) {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await?
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
            FileType::Unknown => {
                return Err(ResumeMatcherError::UnsupportedFormat(format!(
                    "Unsupported file type for: {} (use .txt, .md or .pdf)",
                    path.display()
                )));
            }
        };

        Ok(text.trim().to_string())
    }

    pub async fn load_job(&self, source: &JobSource) -> Result<String> {
        match source {
            JobSource::File(path) => self.extract_text(path).await,
            JobSource::Url(url) => match &self.scraper {
                Some(scraper) => scraper.scrape(url).await,
                None => Err(ResumeMatcherError::InvalidInput(format!(
                    "Job description URLs are disabled; save the posting to a file instead: {}",
                    url
                ))),
            },
        }
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_source_parse() {
        assert_eq!(
            JobSource::parse("  https://example.com/jobs/1 "),
            JobSource::Url("https://example.com/jobs/1".to_string())
        );
        assert_eq!(
            JobSource::parse("jobs/backend.txt\n"),
            JobSource::File(PathBuf::from("jobs/backend.txt"))
        );
    }

    #[tokio::test]
    async fn test_url_without_scraper_is_rejected() {
        let manager = InputManager::new();
        let result = manager
            .load_job(&JobSource::Url("https://example.com/jobs/1".to_string()))
            .await;
        assert!(matches!(result, Err(ResumeMatcherError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_text_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        std::fs::write(&path, "\n\n  Jane Roe\nBackend Engineer  \n\n").unwrap();

        let text = InputManager::new().extract_text(&path).await.unwrap();
        assert_eq!(text, "Jane Roe\nBackend Engineer");
    }

    #[tokio::test]
    async fn test_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = InputManager::new().extract_text(dir.path()).await;
        assert!(matches!(result, Err(ResumeMatcherError::InvalidInput(_))));
    }
}
