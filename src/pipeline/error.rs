//! Pipeline errors

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::state::{Operation, PipelineState};
use crate::documents::ExtractionError;
use crate::inference::InferenceError;

/// Which of the two input documents an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentRole {
    Policy,
    Reference,
}

impl DocumentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Policy => "policy",
            Self::Reference => "reference",
        }
    }
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by [`AnalysisPipeline`](super::AnalysisPipeline) operations
///
/// A failed operation never changes the pipeline state.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to load {role} document '{locator}': {source}")]
    DocumentLoad {
        role: DocumentRole,
        locator: String,
        #[source]
        source: ExtractionError,
    },

    #[error("Inference failed during {stage}: {source}")]
    Inference {
        stage: Operation,
        #[source]
        source: InferenceError,
    },

    #[error("Cannot run {operation} in state {actual}; requires {required}")]
    Precedence {
        operation: Operation,
        required: PipelineState,
        actual: PipelineState,
    },

    #[error("Cannot run {operation} again; pipeline is already {state}")]
    StageAlreadyCompleted {
        operation: Operation,
        state: PipelineState,
    },
}

impl PipelineError {
    /// Stable reason code for callers and logs
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::DocumentLoad { source, .. } => source.reason_code(),
            Self::Inference { source, .. } => source.reason_code(),
            Self::Precedence { .. } => "precedence_violation",
            Self::StageAlreadyCompleted { .. } => "stage_already_completed",
        }
    }

    pub fn hint(&self) -> Option<String> {
        match self {
            Self::DocumentLoad { source, .. } => Some(source.hint()),
            Self::Inference { source, .. } => Some(source.hint()),
            Self::Precedence { required, .. } => required
                .reached_by()
                .map(|op| format!("Run {} first", op)),
            Self::StageAlreadyCompleted { .. } => {
                Some("Reset the pipeline to start a new run".to_string())
            }
        }
    }

    /// Document and inference failures may succeed when repeated
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DocumentLoad { .. } | Self::Inference { .. })
    }
}
