//! Report rendering and persistence

pub mod render;

pub use render::{render_json, render_markdown, render_summary};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::pipeline::ResultBundle;

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory reports are written to; created on demand
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/output")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// Persisted report kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Markdown,
    Json,
    SummaryOnly,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 3] = [Self::Markdown, Self::Json, Self::SummaryOnly];

    fn file_prefix(&self) -> &'static str {
        match self {
            Self::Markdown | Self::Json => "complete_report",
            Self::SummaryOnly => "executive_summary",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown | Self::SummaryOnly => "md",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Markdown => "markdown",
            Self::Json => "json",
            Self::SummaryOnly => "summary_only",
        };
        f.write_str(name)
    }
}

/// Report errors
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Writes rendered reports into the output directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.output_dir.clone())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render `bundle` in `format` and write it, returning the file path
    pub async fn persist(&self, bundle: &ResultBundle, format: ReportFormat) -> Result<PathBuf, ReportError> {
        let content = match format {
            ReportFormat::Markdown => render_markdown(bundle),
            ReportFormat::Json => render_json(bundle)?,
            ReportFormat::SummaryOnly => render_summary(bundle),
        };

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| ReportError::Io {
                path: self.output_dir.clone(),
                source,
            })?;

        let path = self.output_dir.join(file_name(bundle, format));
        tokio::fs::write(&path, content.as_bytes())
            .await
            .map_err(|source| ReportError::Io {
                path: path.clone(),
                source,
            })?;

        info!(
            run_id = %bundle.run_id,
            format = %format,
            path = %path.display(),
            bytes = content.len(),
            "Report written"
        );

        Ok(path)
    }
}

/// `<prefix>_<timestamp>_<run>.<ext>`, unique per run and format
fn file_name(bundle: &ResultBundle, format: ReportFormat) -> String {
    format!(
        "{}_{}_{}.{}",
        format.file_prefix(),
        bundle.created_at.format("%Y%m%d_%H%M%S"),
        bundle.short_id(),
        format.extension()
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::scoring::ComplianceScorer;
    use crate::summary::ExecutiveSummaryBuilder;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;
    use uuid::Uuid;

    const GAP_TEXT: &str = "Critical: no MFA.\nHigh: weak password policy.\nMedium: backup untested.\nLow: add logging detail.";

    pub(crate) fn sample_bundle(remediation: Option<&str>) -> ResultBundle {
        let scorer = ComplianceScorer::default();
        let score = scorer.calculate_score(GAP_TEXT);
        let summary = ExecutiveSummaryBuilder::default().generate(GAP_TEXT, &score);

        ResultBundle {
            run_id: Uuid::parse_str("3f2a9c1e-0000-4000-8000-000000000000").unwrap(),
            framework_name: "NIST CSF".to_string(),
            model_identifier: "llama3.2:3b".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
            user_policy_text: "Passwords are required.".to_string(),
            reference_text: "MFA must be enabled.".to_string(),
            gap_analysis_text: GAP_TEXT.to_string(),
            remediation_text: remediation.map(str::to_string),
            score,
            summary,
        }
    }

    #[test]
    fn test_file_names() {
        let bundle = sample_bundle(None);
        assert_eq!(
            file_name(&bundle, ReportFormat::Markdown),
            "complete_report_20260314_093000_3f2a9c1e.md"
        );
        assert_eq!(
            file_name(&bundle, ReportFormat::Json),
            "complete_report_20260314_093000_3f2a9c1e.json"
        );
        assert_eq!(
            file_name(&bundle, ReportFormat::SummaryOnly),
            "executive_summary_20260314_093000_3f2a9c1e.md"
        );
    }

    #[tokio::test]
    async fn test_persist_creates_output_dir() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path().join("nested/output"));
        let bundle = sample_bundle(Some("Enable MFA."));

        let mut written = Vec::new();
        for format in ReportFormat::ALL {
            written.push(writer.persist(&bundle, format).await.unwrap());
        }

        assert_eq!(written.len(), 3);
        for path in &written {
            assert!(path.exists(), "{} missing", path.display());
        }
        let markdown = std::fs::read_to_string(&written[0]).unwrap();
        assert!(markdown.contains("## Remediation Plan"));
    }
}
