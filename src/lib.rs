//! Resume matcher library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;
pub mod session;

pub use config::Config;
pub use error::{ErrorCategory, Result, ResumeMatcherError};
pub use session::{AnalysisOutcome, LoadedInputs, Session};
