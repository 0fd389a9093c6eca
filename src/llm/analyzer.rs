//! Resume analysis through a completion client

use crate::error::Result;
use crate::llm::client::CompletionClient;
use crate::llm::parser::{ParsedResponse, ResponseParser};
use crate::llm::prompts::{AnalysisRequest, PromptTemplates};
use log::{debug, info, warn};
use std::time::Instant;

/// Builds the prompt, makes the single model call, and parses the reply.
pub struct ResumeAnalyzer<C> {
    client: C,
    prompt_templates: PromptTemplates,
    parser: ResponseParser,
}

impl<C: CompletionClient> ResumeAnalyzer<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            prompt_templates: PromptTemplates::default(),
            parser: ResponseParser::new(),
        }
    }

    pub fn with_templates(mut self, templates: PromptTemplates) -> Self {
        self.prompt_templates = templates;
        self
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<ParsedResponse> {
        let start_time = Instant::now();

        let prompt = self.prompt_templates.render_analysis(request);
        debug!("Rendered prompt: {} characters", prompt.len());

        let raw = self.client.complete(&prompt).await?;
        info!(
            "Received {} characters from the model in {}ms",
            raw.len(),
            start_time.elapsed().as_millis()
        );

        let parsed = self.parser.parse(&raw);
        for warning in &parsed.warnings {
            warn!("Response parse warning: {}", warning);
        }

        Ok(parsed)
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}
