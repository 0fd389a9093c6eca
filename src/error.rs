//! Error handling for the resume matcher

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeMatcherError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("Job scraping failed: {0}")]
    Scrape(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected API response: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to export results: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, ResumeMatcherError>;

/// Coarse grouping used for user messages and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UserInput,
    Configuration,
    Transport,
    Auth,
    Quota,
    Provider,
    Internal,
}

impl ResumeMatcherError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ResumeMatcherError::InvalidInput(_)
            | ResumeMatcherError::UnsupportedFormat(_)
            | ResumeMatcherError::PdfExtraction(_)
            | ResumeMatcherError::Scrape(_) => ErrorCategory::UserInput,
            ResumeMatcherError::Configuration(_) => ErrorCategory::Configuration,
            ResumeMatcherError::Network(_) => ErrorCategory::Transport,
            ResumeMatcherError::Authentication(_) => ErrorCategory::Auth,
            ResumeMatcherError::RateLimited(_) => ErrorCategory::Quota,
            ResumeMatcherError::Api { .. } | ResumeMatcherError::InvalidResponse(_) => {
                ErrorCategory::Provider
            }
            ResumeMatcherError::Io(_)
            | ResumeMatcherError::Serialization(_)
            | ResumeMatcherError::Export(_) => ErrorCategory::Internal,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::UserInput => 2,
            ErrorCategory::Configuration => 3,
            ErrorCategory::Transport
            | ErrorCategory::Auth
            | ErrorCategory::Quota
            | ErrorCategory::Provider => 4,
            ErrorCategory::Internal => 1,
        }
    }
}

/// dialoguer surfaces terminal failures through its own error type
impl From<dialoguer::Error> for ResumeMatcherError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(e) => ResumeMatcherError::Io(e),
        }
    }
}
