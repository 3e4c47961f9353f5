//! Pipeline states and the operations that move between them

use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress of one analysis run
///
/// Declared in execution order; the derived `Ord` is used by the guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Empty,
    DocumentsLoaded,
    GapAnalysisDone,
    Scored,
    RemediationDone,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::DocumentsLoaded => "documents_loaded",
            Self::GapAnalysisDone => "gap_analysis_done",
            Self::Scored => "scored",
            Self::RemediationDone => "remediation_done",
        }
    }

    /// Operation whose success enters this state
    pub fn reached_by(&self) -> Option<Operation> {
        match self {
            Self::Empty => None,
            Self::DocumentsLoaded => Some(Operation::LoadDocuments),
            Self::GapAnalysisDone => Some(Operation::GapAnalysis),
            Self::Scored => Some(Operation::Score),
            Self::RemediationDone => Some(Operation::Remediation),
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guarded pipeline operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    LoadDocuments,
    GapAnalysis,
    Score,
    Remediation,
    Export,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoadDocuments => "load_documents",
            Self::GapAnalysis => "gap_analysis",
            Self::Score => "score",
            Self::Remediation => "remediation",
            Self::Export => "export",
        }
    }

    /// Earliest state the operation may run from
    pub fn required_state(&self) -> PipelineState {
        match self {
            Self::LoadDocuments => PipelineState::Empty,
            Self::GapAnalysis => PipelineState::DocumentsLoaded,
            Self::Score => PipelineState::GapAnalysisDone,
            Self::Remediation | Self::Export => PipelineState::Scored,
        }
    }

    /// State entered on success; `None` for operations that don't advance
    pub fn target_state(&self) -> Option<PipelineState> {
        match self {
            Self::LoadDocuments => Some(PipelineState::DocumentsLoaded),
            Self::GapAnalysis => Some(PipelineState::GapAnalysisDone),
            Self::Score => Some(PipelineState::Scored),
            Self::Remediation => Some(PipelineState::RemediationDone),
            Self::Export => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_are_ordered() {
        assert!(PipelineState::Empty < PipelineState::DocumentsLoaded);
        assert!(PipelineState::GapAnalysisDone < PipelineState::Scored);
        assert!(PipelineState::Scored < PipelineState::RemediationDone);
    }

    #[test]
    fn test_each_advancing_operation_moves_forward() {
        for op in [
            Operation::LoadDocuments,
            Operation::GapAnalysis,
            Operation::Score,
            Operation::Remediation,
        ] {
            let target = op.target_state().unwrap();
            assert!(target > op.required_state(), "{} must advance", op);
            assert_eq!(target.reached_by(), Some(op));
        }
        assert_eq!(Operation::Export.target_state(), None);
    }
}
