//! Result presentation and export

pub mod exporter;
pub mod formatter;
pub mod report;

pub use exporter::Exporter;
pub use formatter::{formatter_for, ConsoleFormatter, JsonFormatter, OutputFormatter};
pub use report::{Analysis, AnalysisResult, RewrittenBullet, ScoreBand};
