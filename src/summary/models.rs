//! Data models for executive summaries

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::scoring::{RiskLevel, ScoreRecord, Severity};

/// Fixed remediation horizons, nearest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    Immediate,
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl Horizon {
    pub const ALL: [Horizon; 4] = [
        Horizon::Immediate,
        Horizon::ShortTerm,
        Horizon::MediumTerm,
        Horizon::LongTerm,
    ];

    /// Horizon a gap of the given severity is scheduled into
    pub fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Critical => Self::Immediate,
            Severity::High => Self::ShortTerm,
            Severity::Medium => Self::MediumTerm,
            Severity::Low => Self::LongTerm,
        }
    }

    /// Window label, e.g. "0-30 days"
    pub fn window(&self) -> &'static str {
        match self {
            Self::Immediate => "0-30 days",
            Self::ShortTerm => "1-3 months",
            Self::MediumTerm => "3-6 months",
            Self::LongTerm => "6-12 months",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Immediate => "Immediate",
            Self::ShortTerm => "Short-term",
            Self::MediumTerm => "Medium-term",
            Self::LongTerm => "Long-term",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title(), self.window())
    }
}

/// One phase of the remediation timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub horizon: Horizon,
    pub window: String,
    pub action: String,
    /// Finding bodies scheduled into this window, in source order
    pub items: Vec<String>,
}

/// Headline numbers copied from the score record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyMetrics {
    pub compliance_percentage: u8,
    pub risk_level: RiskLevel,
    pub total_gaps: u32,
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl From<&ScoreRecord> for KeyMetrics {
    fn from(score: &ScoreRecord) -> Self {
        let counts = score.counts();
        Self {
            compliance_percentage: score.compliance_percentage(),
            risk_level: score.risk_level(),
            total_gaps: score.total_gaps(),
            critical: counts.critical,
            high: counts.high,
            medium: counts.medium,
            low: counts.low,
        }
    }
}

/// Executive summary derived from a score record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRecord {
    pub overall_assessment: String,
    pub key_metrics: KeyMetrics,
    /// Highest severity first
    pub priority_recommendations: Vec<String>,
    /// Always one entry per horizon, nearest first
    pub timeline: Vec<TimelineEntry>,
}
