//! Snapshot of a finished analysis run

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::error::DocumentRole;
use crate::scoring::ScoreRecord;
use crate::summary::SummaryRecord;

/// Everything one run produced, handed to report rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultBundle {
    pub run_id: Uuid,
    pub framework_name: String,
    pub model_identifier: String,
    pub created_at: DateTime<Utc>,
    pub user_policy_text: String,
    pub reference_text: String,
    pub gap_analysis_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation_text: Option<String>,
    pub score: ScoreRecord,
    pub summary: SummaryRecord,
}

impl ResultBundle {
    pub fn has_remediation(&self) -> bool {
        self.remediation_text.is_some()
    }

    pub fn document_text(&self, role: DocumentRole) -> &str {
        match role {
            DocumentRole::Policy => &self.user_policy_text,
            DocumentRole::Reference => &self.reference_text,
        }
    }

    /// First eight characters of the run id, used in file names
    pub fn short_id(&self) -> String {
        self.run_id.simple().to_string()[..8].to_string()
    }
}
