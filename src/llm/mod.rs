//! LLM integration module

pub mod analyzer;
pub mod client;
pub mod parser;
pub mod prompts;

pub use analyzer::ResumeAnalyzer;
pub use client::{AnthropicClient, ApiKey, CompletionClient};
pub use parser::{ParseWarning, ParsedResponse, ResponseParser};
pub use prompts::{AnalysisRequest, PromptTemplates};
