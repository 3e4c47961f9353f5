//! Data models for compliance scoring

use serde::{Deserialize, Serialize};
use std::fmt;

use super::extractor::split_label;

/// Severity tier of a single gap
///
/// Variants are declared in priority order, so the derived `Ord` sorts
/// `Critical` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// All tiers, highest priority first
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Lowercase name, as serialized
    pub fn label(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse risk classification derived from the compliance percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One gap statement pulled out of the model's analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    text: String,
    severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
}

impl Finding {
    pub(crate) fn new(text: String, severity: Severity, category: Option<String>) -> Self {
        Self {
            text,
            severity,
            category,
        }
    }

    /// Verbatim fragment from the model output
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Fragment text without list markers, emphasis, or leading label
    pub fn body(&self) -> &str {
        split_label(&self.text).1
    }
}

/// Per-severity gap counts; every tier is always present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl SeverityCounts {
    pub fn get(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    pub(crate) fn increment(&mut self, severity: Severity) {
        let slot = match severity {
            Severity::Critical => &mut self.critical,
            Severity::High => &mut self.high,
            Severity::Medium => &mut self.medium,
            Severity::Low => &mut self.low,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn total(&self) -> u32 {
        Severity::ALL.iter().map(|s| self.get(*s)).sum()
    }

    /// Tally counts from a set of findings
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut counts = Self::default();
        for finding in findings {
            counts.increment(finding.severity());
        }
        counts
    }
}

/// Structured result of scoring one gap analysis
///
/// Fields are private so `total_gaps` can never drift from the counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreRecord {
    counts: SeverityCounts,
    total_gaps: u32,
    compliance_percentage: u8,
    risk_level: RiskLevel,
    findings: Vec<Finding>,
}

impl ScoreRecord {
    pub(crate) fn new(findings: Vec<Finding>, compliance_percentage: u8, risk_level: RiskLevel) -> Self {
        let counts = SeverityCounts::from_findings(&findings);
        Self {
            counts,
            total_gaps: counts.total(),
            compliance_percentage: compliance_percentage.min(100),
            risk_level,
            findings,
        }
    }

    /// Record for "no gaps found": full compliance, lowest risk
    pub fn zero_gap() -> Self {
        Self::new(Vec::new(), 100, RiskLevel::VeryLow)
    }

    pub fn counts(&self) -> SeverityCounts {
        self.counts
    }

    pub fn count(&self, severity: Severity) -> u32 {
        self.counts.get(severity)
    }

    pub fn total_gaps(&self) -> u32 {
        self.total_gaps
    }

    pub fn compliance_percentage(&self) -> u8 {
        self.compliance_percentage
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_orders_critical_first() {
        let mut tiers = vec![Severity::Low, Severity::Critical, Severity::Medium, Severity::High];
        tiers.sort();
        assert_eq!(tiers, Severity::ALL.to_vec());
    }

    #[test]
    fn test_severity_label_matches_serialized_name() {
        for severity in Severity::ALL {
            let json = serde_json::to_string(&severity).unwrap();
            assert_eq!(json, format!("\"{}\"", severity.label()));
        }
    }

    #[test]
    fn test_risk_level_serializes_with_space() {
        let json = serde_json::to_string(&RiskLevel::VeryLow).unwrap();
        assert_eq!(json, "\"Very Low\"");
    }

    #[test]
    fn test_record_total_matches_counts() {
        let findings = vec![
            Finding::new("Critical: no MFA".to_string(), Severity::Critical, None),
            Finding::new("Minor: typo".to_string(), Severity::Low, None),
            Finding::new("Low: add detail".to_string(), Severity::Low, None),
        ];
        let record = ScoreRecord::new(findings, 81, RiskLevel::Low);
        assert_eq!(record.total_gaps(), 3);
        assert_eq!(record.count(Severity::Low), 2);
        assert_eq!(record.count(Severity::High), 0);
        assert_eq!(record.total_gaps(), record.counts().total());
    }

    #[test]
    fn test_zero_gap_record() {
        let record = ScoreRecord::zero_gap();
        assert_eq!(record.total_gaps(), 0);
        assert_eq!(record.compliance_percentage(), 100);
        assert_eq!(record.risk_level(), RiskLevel::VeryLow);
    }

    #[test]
    fn test_finding_body_strips_label() {
        let finding = Finding::new(
            "- **Critical:** no MFA for admins".to_string(),
            Severity::Critical,
            Some("Critical".to_string()),
        );
        assert_eq!(finding.body(), "no MFA for admins");
    }
}
