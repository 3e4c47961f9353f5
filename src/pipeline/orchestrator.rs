//! Guarded analysis pipeline

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::bundle::ResultBundle;
use super::error::{DocumentRole, PipelineError};
use super::state::{Operation, PipelineState};
use crate::config::{Config, DEFAULT_FRAMEWORK_NAME};
use crate::documents::DocumentExtractor;
use crate::inference::prompts::{build_gap_analysis_prompt, build_remediation_prompt};
use crate::inference::{CompletionBackend, CompletionRequest, InferenceConfig};
use crate::metrics::METRICS;
use crate::scoring::{ComplianceScorer, ScoreRecord, ScoringConfigError};
use crate::summary::{ExecutiveSummaryBuilder, SummaryConfig, SummaryRecord};

/// Runs one policy/reference pair through extraction, gap analysis,
/// scoring and remediation
///
/// Each operation checks the current [`PipelineState`] before doing any
/// work and only advances it on success.
pub struct AnalysisPipeline {
    extractor: Arc<dyn DocumentExtractor>,
    backend: Arc<dyn CompletionBackend>,
    scorer: ComplianceScorer,
    summary_builder: ExecutiveSummaryBuilder,
    framework_name: String,

    run_id: Uuid,
    created_at: DateTime<Utc>,
    state: PipelineState,
    policy_text: Option<String>,
    reference_text: Option<String>,
    gap_analysis_text: Option<String>,
    model_identifier: Option<String>,
    score: Option<ScoreRecord>,
    summary: Option<SummaryRecord>,
    remediation_text: Option<String>,
}

impl AnalysisPipeline {
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        backend: Arc<dyn CompletionBackend>,
        scorer: ComplianceScorer,
        summary_config: SummaryConfig,
    ) -> Self {
        let summary_builder = ExecutiveSummaryBuilder::new(summary_config);

        Self {
            extractor,
            backend,
            scorer,
            summary_builder,
            framework_name: DEFAULT_FRAMEWORK_NAME.to_string(),
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            state: PipelineState::Empty,
            policy_text: None,
            reference_text: None,
            gap_analysis_text: None,
            model_identifier: None,
            score: None,
            summary: None,
            remediation_text: None,
        }
    }

    /// Build a pipeline with scoring, summary and framework settings from `config`
    pub fn from_config(
        extractor: Arc<dyn DocumentExtractor>,
        backend: Arc<dyn CompletionBackend>,
        config: &Config,
    ) -> Result<Self, ScoringConfigError> {
        let scorer = ComplianceScorer::new(config.scoring.clone())?;
        Ok(Self::new(extractor, backend, scorer, config.summary.clone())
            .with_framework_name(config.framework_name.clone()))
    }

    pub fn with_framework_name(mut self, framework_name: impl Into<String>) -> Self {
        self.framework_name = framework_name.into();
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn framework_name(&self) -> &str {
        &self.framework_name
    }

    pub fn scorer(&self) -> &ComplianceScorer {
        &self.scorer
    }

    /// Score of the current run, once scored
    pub fn score_record(&self) -> Option<&ScoreRecord> {
        self.score.as_ref()
    }

    /// Drop all results and start a new run
    pub fn reset(&mut self) {
        debug!(run_id = %self.run_id, state = %self.state, "Resetting pipeline");

        self.run_id = Uuid::new_v4();
        self.created_at = Utc::now();
        self.state = PipelineState::Empty;
        self.policy_text = None;
        self.reference_text = None;
        self.gap_analysis_text = None;
        self.model_identifier = None;
        self.score = None;
        self.summary = None;
        self.remediation_text = None;
    }

    /// Extract both documents; Empty → DocumentsLoaded
    pub async fn load_documents(
        &mut self,
        policy_locator: &str,
        reference_locator: &str,
    ) -> Result<(), PipelineError> {
        self.guard(Operation::LoadDocuments)?;

        let policy = self.extract(DocumentRole::Policy, policy_locator).await?;
        let reference = self.extract(DocumentRole::Reference, reference_locator).await?;

        info!(
            run_id = %self.run_id,
            policy_chars = policy.len(),
            reference_chars = reference.len(),
            "Documents loaded"
        );

        self.policy_text = Some(policy);
        self.reference_text = Some(reference);
        self.advance(Operation::LoadDocuments);
        Ok(())
    }

    /// Compare the policy against the reference; → GapAnalysisDone
    pub async fn run_gap_analysis(&mut self, model_config: &InferenceConfig) -> Result<(), PipelineError> {
        self.guard(Operation::GapAnalysis)?;

        let prompt = build_gap_analysis_prompt(
            &self.framework_name,
            self.stored(&self.policy_text, Operation::GapAnalysis)?,
            self.stored(&self.reference_text, Operation::GapAnalysis)?,
        );

        let text = self.complete(Operation::GapAnalysis, prompt, model_config).await?;

        self.gap_analysis_text = Some(text);
        self.model_identifier = Some(model_config.model.clone());
        self.advance(Operation::GapAnalysis);
        Ok(())
    }

    /// Score the stored gap analysis and build the executive summary; → Scored
    pub fn score(&mut self) -> Result<&ScoreRecord, PipelineError> {
        self.guard(Operation::Score)?;

        let text = self.stored(&self.gap_analysis_text, Operation::Score)?;
        let record = self.scorer.calculate_score(text);
        let summary = self.summary_builder.generate(text, &record);

        METRICS.record_score(&record);
        info!(
            run_id = %self.run_id,
            compliance_percentage = record.compliance_percentage(),
            risk_level = %record.risk_level(),
            total_gaps = record.total_gaps(),
            "Gap analysis scored"
        );

        self.summary = Some(summary);
        self.advance(Operation::Score);
        Ok(self.score.insert(record))
    }

    /// Generate remediation guidance for the scored gaps; → RemediationDone
    pub async fn run_remediation(&mut self, model_config: &InferenceConfig) -> Result<(), PipelineError> {
        self.guard(Operation::Remediation)?;

        let prompt = build_remediation_prompt(
            &self.framework_name,
            self.stored(&self.policy_text, Operation::Remediation)?,
            self.stored(&self.gap_analysis_text, Operation::Remediation)?,
        );

        let text = self.complete(Operation::Remediation, prompt, model_config).await?;

        self.remediation_text = Some(text);
        self.advance(Operation::Remediation);
        Ok(())
    }

    /// Snapshot of the run; remediation is included when it was generated
    pub fn export_bundle(&self) -> Result<ResultBundle, PipelineError> {
        self.guard(Operation::Export)?;

        let op = Operation::Export;
        let bundle = ResultBundle {
            run_id: self.run_id,
            framework_name: self.framework_name.clone(),
            model_identifier: self.stored(&self.model_identifier, op)?.to_string(),
            created_at: self.created_at,
            user_policy_text: self.stored(&self.policy_text, op)?.to_string(),
            reference_text: self.stored(&self.reference_text, op)?.to_string(),
            gap_analysis_text: self.stored(&self.gap_analysis_text, op)?.to_string(),
            remediation_text: self.remediation_text.clone(),
            score: self.stored(&self.score, op)?.clone(),
            summary: self.stored(&self.summary, op)?.clone(),
        };

        METRICS.record_stage(op.as_str(), true);
        debug!(
            run_id = %self.run_id,
            remediation = bundle.has_remediation(),
            "Result bundle exported"
        );

        Ok(bundle)
    }

    /// Run every stage in order and export the result
    pub async fn run_all(
        &mut self,
        policy_locator: &str,
        reference_locator: &str,
        model_config: &InferenceConfig,
        include_remediation: bool,
    ) -> Result<ResultBundle, PipelineError> {
        let start = Instant::now();

        self.load_documents(policy_locator, reference_locator).await?;
        self.run_gap_analysis(model_config).await?;
        self.score()?;
        if include_remediation {
            self.run_remediation(model_config).await?;
        }
        let bundle = self.export_bundle()?;

        info!(
            run_id = %self.run_id,
            elapsed_ms = start.elapsed().as_millis() as u64,
            remediation = include_remediation,
            "Analysis run completed"
        );

        Ok(bundle)
    }

    fn guard(&self, operation: Operation) -> Result<(), PipelineError> {
        let required = operation.required_state();
        let result = if self.state < required {
            Err(PipelineError::Precedence {
                operation,
                required,
                actual: self.state,
            })
        } else {
            match operation.target_state() {
                Some(target) if self.state >= target => Err(PipelineError::StageAlreadyCompleted {
                    operation,
                    state: self.state,
                }),
                _ => Ok(()),
            }
        };

        if let Err(ref e) = result {
            warn!(
                run_id = %self.run_id,
                operation = %operation,
                state = %self.state,
                reason = e.reason_code(),
                "Pipeline operation rejected"
            );
            METRICS.record_stage(operation.as_str(), false);
        }

        result
    }

    fn advance(&mut self, operation: Operation) {
        if let Some(target) = operation.target_state() {
            debug!(run_id = %self.run_id, from = %self.state, to = %target, "Pipeline state advanced");
            self.state = target;
        }
        METRICS.record_stage(operation.as_str(), true);
    }

    /// Stored result for a state the guard has already verified
    fn stored<'a, T>(&self, slot: &'a Option<T>, operation: Operation) -> Result<&'a T, PipelineError> {
        slot.as_ref().ok_or(PipelineError::Precedence {
            operation,
            required: operation.required_state(),
            actual: self.state,
        })
    }

    async fn extract(&self, role: DocumentRole, locator: &str) -> Result<String, PipelineError> {
        debug!(run_id = %self.run_id, role = %role, locator = %locator, "Extracting document");

        match self.extractor.extract_text(locator).await {
            Ok(text) => {
                METRICS.record_document_loaded(role.as_str());
                Ok(text)
            }
            Err(source) => {
                error!(
                    run_id = %self.run_id,
                    role = %role,
                    locator = %locator,
                    reason = source.reason_code(),
                    "Document extraction failed"
                );
                METRICS.record_stage(Operation::LoadDocuments.as_str(), false);
                Err(PipelineError::DocumentLoad {
                    role,
                    locator: locator.to_string(),
                    source,
                })
            }
        }
    }

    async fn complete(
        &self,
        stage: Operation,
        prompt: String,
        model_config: &InferenceConfig,
    ) -> Result<String, PipelineError> {
        let request = CompletionRequest::new(prompt, model_config);
        let start = Instant::now();

        info!(
            run_id = %self.run_id,
            stage = %stage,
            model = %request.model,
            prompt_length = request.prompt.len(),
            "Requesting completion"
        );

        let result = self.backend.complete(&request).await;
        let elapsed = start.elapsed();
        METRICS.record_inference(stage.as_str(), elapsed);

        match result {
            Ok(text) => {
                info!(
                    run_id = %self.run_id,
                    stage = %stage,
                    elapsed_ms = elapsed.as_millis() as u64,
                    completion_length = text.len(),
                    "Completion received"
                );
                Ok(text)
            }
            Err(source) => {
                error!(
                    run_id = %self.run_id,
                    stage = %stage,
                    elapsed_ms = elapsed.as_millis() as u64,
                    reason = source.reason_code(),
                    "Completion failed"
                );
                METRICS.record_stage(stage.as_str(), false);
                Err(PipelineError::Inference { stage, source })
            }
        }
    }
}
