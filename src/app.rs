//! End-to-end runs wired from configuration

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::documents::{DocumentExtractor, FileDocumentLoader};
use crate::error::Result;
use crate::inference::{HealthStatus, OllamaClient};
use crate::metrics::METRICS;
use crate::pipeline::{AnalysisPipeline, ResultBundle};
use crate::report::{ReportFormat, ReportWriter};
use crate::scoring::{ComplianceScorer, ScoreRecord};
use crate::summary::{ExecutiveSummaryBuilder, SummaryRecord};

/// One batch analysis
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub policy: String,
    pub reference: String,
    pub include_remediation: bool,
    pub formats: Vec<ReportFormat>,
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub bundle: ResultBundle,
    pub reports: Vec<PathBuf>,
}

/// Analyze a document pair with the local model and write the requested reports
pub async fn run_analysis(config: &Config, request: &AnalysisRequest) -> Result<AnalysisOutcome> {
    let loader = Arc::new(FileDocumentLoader::from_config(&config.documents));
    let client = Arc::new(OllamaClient::from_config(&config.inference)?);
    let mut pipeline = AnalysisPipeline::from_config(loader, client, config)?;

    info!(
        run_id = %pipeline.run_id(),
        framework = %config.framework_name,
        model = %config.inference.model,
        "Starting policy gap analysis"
    );

    let bundle = pipeline
        .run_all(
            &request.policy,
            &request.reference,
            &config.inference,
            request.include_remediation,
        )
        .await?;

    let writer = ReportWriter::from_config(&config.output);
    let mut reports = Vec::with_capacity(request.formats.len());
    for format in &request.formats {
        reports.push(writer.persist(&bundle, *format).await?);
    }

    Ok(AnalysisOutcome { bundle, reports })
}

/// Score an existing gap analysis document without calling a model
pub async fn score_file(config: &Config, locator: &str) -> Result<(ScoreRecord, SummaryRecord)> {
    let loader = FileDocumentLoader::from_config(&config.documents);
    let text = loader.extract_text(locator).await?;

    let scorer = ComplianceScorer::new(config.scoring.clone())?;
    let record = scorer.calculate_score(&text);
    let summary = ExecutiveSummaryBuilder::new(config.summary.clone()).generate(&text, &record);
    METRICS.record_score(&record);

    info!(
        locator = %locator,
        compliance_percentage = record.compliance_percentage(),
        total_gaps = record.total_gaps(),
        "Scored existing gap analysis"
    );

    Ok((record, summary))
}

/// Probe the configured runtime and model
pub async fn check_runtime(config: &Config) -> Result<HealthStatus> {
    let client = OllamaClient::from_config(&config.inference)?;
    let status = client.health_check(&config.inference.model).await?;

    if !status.model_available {
        warn!(
            model = %status.model,
            installed = status.installed_models.len(),
            "Configured model is not installed"
        );
    }

    Ok(status)
}

/// Process metrics in Prometheus text format
pub fn metrics_snapshot() -> String {
    METRICS.export_prometheus()
}
