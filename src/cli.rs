//! CLI interface for the resume matcher

use crate::config::{Config, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "resume-matcher")]
#[command(about = "ATS optimization: match a resume against a job description with Claude")]
#[command(
    long_about = "Scores a resume against a job description, lists missing keywords, suggests improvements and rewrites bullet points. Run without arguments for interactive mode."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to resume file (TXT, MD, PDF); prompted for when omitted
    #[arg(short, long)]
    pub resume: Option<PathBuf>,

    /// Path or URL of the job description; prompted for when omitted
    #[arg(short, long)]
    pub job: Option<String>,

    /// Save results without asking
    #[arg(long, conflicts_with = "no_save")]
    pub save: bool,

    /// Never save results
    #[arg(long)]
    pub no_save: bool,

    /// Output format: console, json
    #[arg(short, long)]
    pub output: Option<String>,

    /// Directory for saved results
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show or manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Reset configuration to defaults
    Reset,
}

/// What to do with results after they are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Always,
    Never,
    Ask,
}

impl Cli {
    pub fn save_mode(&self) -> SaveMode {
        match (self.save, self.no_save) {
            (true, _) => SaveMode::Always,
            (_, true) => SaveMode::Never,
            _ => SaveMode::Ask,
        }
    }

    /// Both inputs came from flags, so there is nothing to prompt for.
    pub fn is_one_shot(&self) -> bool {
        self.resume.is_some() && self.job.is_some()
    }

    /// Fold flag overrides into the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) -> Result<(), String> {
        if let Some(format) = &self.output {
            config.output.format = parse_output_format(format)?;
        }
        if let Some(dir) = &self.output_dir {
            config.output.output_dir = dir.clone();
        }
        if self.no_color {
            config.output.color_output = false;
        }
        Ok(())
    }
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json",
            format
        )),
    }
}
