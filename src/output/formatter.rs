//! Output formatters for analysis results

use crate::config::OutputFormat;
use crate::error::Result;
use crate::llm::parser::ParseWarning;
use crate::output::report::{AnalysisResult, ScoreBand};
use colored::{Color, Colorize};

const RULE_WIDTH: usize = 80;

/// Trait for rendering an analysis result
pub trait OutputFormatter {
    fn format_result(&self, result: &AnalysisResult) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Colored terminal presentation
pub struct ConsoleFormatter {
    use_colors: bool,
}

/// Pretty JSON for piping into other tools
pub struct JsonFormatter {
    pretty: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, color: Color) -> String {
        let rule = "─".repeat(RULE_WIDTH);
        format!(
            "\n{}\n{}\n{}\n",
            self.colorize(&rule, color),
            self.bold(title, color),
            self.colorize(&rule, color)
        )
    }

    fn band_color(band: ScoreBand) -> Color {
        match band {
            ScoreBand::Strong => Color::Green,
            ScoreBand::Moderate => Color::Yellow,
            ScoreBand::Weak => Color::Red,
        }
    }

    fn band_icon(&self, band: ScoreBand) -> &'static str {
        match (band, self.use_colors) {
            (ScoreBand::Strong, true) => "🎉",
            (ScoreBand::Moderate, true) => "👍",
            (ScoreBand::Weak, true) => "⚠️",
            (ScoreBand::Strong, false) => "[+]",
            (ScoreBand::Moderate, false) => "[~]",
            (ScoreBand::Weak, false) => "[!]",
        }
    }

    fn empty_line(&self) -> String {
        format!("  {}\n", self.colorize("(none provided)", Color::BrightBlack))
    }

    /// Parse warnings, for display below the result.
    pub fn format_warnings(&self, warnings: &[ParseWarning]) -> String {
        if warnings.is_empty() {
            return String::new();
        }

        let mut output = format!(
            "\n{}\n",
            self.bold("Some parts of the response could not be read:", Color::Yellow)
        );
        for warning in warnings {
            output.push_str(&format!("  • {}\n", self.colorize(&warning.to_string(), Color::Yellow)));
        }
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_result(&self, result: &AnalysisResult) -> Result<String> {
        let analysis = &result.analysis;
        let band = result.score_band();
        let band_color = Self::band_color(band);
        let mut output = String::new();

        // Score
        output.push_str(&self.format_header("📊 Overall Match Score", band_color));
        output.push_str(&format!(
            "{} {}  {}\n",
            self.band_icon(band),
            self.bold(&format!("Match Score: {}/100", analysis.match_score), band_color),
            self.colorize(&format!("[{}]", band.label()), band_color)
        ));
        if !analysis.score_explanation.is_empty() {
            output.push_str(&format!("\n{}\n", analysis.score_explanation));
        }

        // Keywords
        output.push_str(&self.format_header("🔍 Missing Keywords", Color::Cyan));
        if analysis.missing_keywords.is_empty() {
            output.push_str(&self.empty_line());
        }
        for keyword in &analysis.missing_keywords {
            output.push_str(&format!("  • {}\n", self.bold(keyword, Color::Cyan)));
        }

        // Improvements
        output.push_str(&self.format_header("💡 Actionable Improvements", Color::Yellow));
        if analysis.improvements.is_empty() {
            output.push_str(&self.empty_line());
        }
        for (i, improvement) in analysis.improvements.iter().enumerate() {
            output.push_str(&format!(
                "  {} {}\n",
                self.bold(&format!("{}.", i + 1), Color::Yellow),
                improvement
            ));
        }

        // Rewritten bullets
        output.push_str(&self.format_header("✨ Rewritten Bullet Points", Color::Magenta));
        if analysis.rewritten_bullets.is_empty() {
            output.push_str(&self.empty_line());
        }
        for (i, bullet) in analysis.rewritten_bullets.iter().enumerate() {
            if i > 0 {
                output.push_str(&format!("\n  {}\n", self.colorize(&"·".repeat(40), Color::BrightBlack)));
            }
            output.push_str(&format!("  {}\n", self.bold(&format!("Example {}:", i + 1), Color::Magenta)));
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Before:", Color::BrightBlack),
                bullet.before
            ));
            output.push_str(&format!("  {} {}\n", self.colorize("After:", Color::Green), bullet.after));
            if !bullet.keywords_added.is_empty() {
                output.push_str(&format!(
                    "  {} {}\n",
                    self.colorize("Keywords added:", Color::Cyan),
                    bullet.keywords_added.join(", ")
                ));
            }
        }

        // ATS tips
        output.push_str(&self.format_header("🎯 ATS Optimization Tips", Color::Blue));
        if analysis.ats_tips.is_empty() {
            output.push_str(&self.empty_line());
        }
        for tip in &analysis.ats_tips {
            output.push_str(&format!("  • {}\n", tip));
        }

        output.push_str(&format!(
            "\n{}\n",
            self.colorize(
                &format!(
                    "Resume: {} | Job: {} | {}",
                    result.resume_path,
                    result.job_path,
                    result.timestamp.format("%Y-%m-%d %H:%M:%S")
                ),
                Color::BrightBlack
            )
        ));

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_result(&self, result: &AnalysisResult) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(result)?
        } else {
            serde_json::to_string(result)?
        };
        Ok(json)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

/// Pick the formatter for the configured output format.
pub fn formatter_for(format: OutputFormat, use_colors: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Console => Box::new(ConsoleFormatter::new(use_colors)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    }
}
