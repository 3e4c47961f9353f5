//! Weighted compliance scoring and risk tiers

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::extractor::ScoreExtractor;
use super::lexicon::{LexiconError, SeverityLexicon};
use super::models::{RiskLevel, ScoreRecord, Severity, SeverityCounts};

/// Penalty points deducted per gap of each severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_critical_weight")]
    pub critical: u32,
    #[serde(default = "default_high_weight")]
    pub high: u32,
    #[serde(default = "default_medium_weight")]
    pub medium: u32,
    #[serde(default = "default_low_weight")]
    pub low: u32,
}

fn default_critical_weight() -> u32 { 15 }
fn default_high_weight() -> u32 { 10 }
fn default_medium_weight() -> u32 { 5 }
fn default_low_weight() -> u32 { 2 }

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            critical: default_critical_weight(),
            high: default_high_weight(),
            medium: default_medium_weight(),
            low: default_low_weight(),
        }
    }
}

impl ScoringWeights {
    pub fn get(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    /// Weights must be strictly decreasing and positive
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        if self.low == 0 {
            return Err(ScoringConfigError::ZeroWeight);
        }
        if !(self.critical > self.high && self.high > self.medium && self.medium > self.low) {
            return Err(ScoringConfigError::WeightsNotOrdered(*self));
        }
        Ok(())
    }

    /// Total penalty for a set of counts
    pub fn penalty(&self, counts: &SeverityCounts) -> u64 {
        Severity::ALL
            .iter()
            .map(|s| u64::from(self.get(*s)) * u64::from(counts.get(*s)))
            .sum()
    }
}

/// Minimum compliance percentage for each risk tier
///
/// Anything below `high` is `Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskThresholds {
    #[serde(default = "default_very_low_min")]
    pub very_low: u8,
    #[serde(default = "default_low_min")]
    pub low: u8,
    #[serde(default = "default_moderate_min")]
    pub moderate: u8,
    #[serde(default = "default_high_min")]
    pub high: u8,
}

fn default_very_low_min() -> u8 { 90 }
fn default_low_min() -> u8 { 80 }
fn default_moderate_min() -> u8 { 70 }
fn default_high_min() -> u8 { 60 }

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            very_low: default_very_low_min(),
            low: default_low_min(),
            moderate: default_moderate_min(),
            high: default_high_min(),
        }
    }
}

impl RiskThresholds {
    /// Thresholds must leave every tier a non-empty slice of [0, 100]
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        let ordered = self.very_low <= 100
            && self.very_low > self.low
            && self.low > self.moderate
            && self.moderate > self.high
            && self.high >= 1;
        if !ordered {
            return Err(ScoringConfigError::ThresholdsNotOrdered(*self));
        }
        Ok(())
    }

    pub fn classify(&self, percentage: u8) -> RiskLevel {
        if percentage >= self.very_low {
            RiskLevel::VeryLow
        } else if percentage >= self.low {
            RiskLevel::Low
        } else if percentage >= self.moderate {
            RiskLevel::Moderate
        } else if percentage >= self.high {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }
}

/// Scoring configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: ScoringWeights,

    #[serde(default)]
    pub thresholds: RiskThresholds,

    /// Ordered severity keyword table
    #[serde(default)]
    pub lexicon: SeverityLexicon,
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        self.weights.validate()?;
        self.thresholds.validate()
    }
}

/// Scoring configuration errors
#[derive(Debug, Error)]
pub enum ScoringConfigError {
    #[error("Scoring weights must satisfy critical > high > medium > low, got {0:?}")]
    WeightsNotOrdered(ScoringWeights),

    #[error("Scoring weights must be positive")]
    ZeroWeight,

    #[error("Risk thresholds must satisfy 100 >= very_low > low > moderate > high >= 1, got {0:?}")]
    ThresholdsNotOrdered(RiskThresholds),

    #[error("Invalid severity lexicon: {0}")]
    Lexicon(#[from] LexiconError),
}

/// Computes compliance scores from gap-analysis text
#[derive(Debug, Clone)]
pub struct ComplianceScorer {
    extractor: ScoreExtractor,
    weights: ScoringWeights,
    thresholds: RiskThresholds,
}

impl Default for ComplianceScorer {
    fn default() -> Self {
        Self {
            extractor: ScoreExtractor::default(),
            weights: ScoringWeights::default(),
            thresholds: RiskThresholds::default(),
        }
    }
}

impl ComplianceScorer {
    /// Create a scorer from validated configuration
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringConfigError> {
        config.validate()?;
        Ok(Self {
            extractor: ScoreExtractor::new(config.lexicon),
            weights: config.weights,
            thresholds: config.thresholds,
        })
    }

    pub fn extractor(&self) -> &ScoreExtractor {
        &self.extractor
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    /// Score one gap analysis
    ///
    /// Blank text yields the zero-gap record rather than an error.
    pub fn calculate_score(&self, gap_analysis_text: &str) -> ScoreRecord {
        if gap_analysis_text.trim().is_empty() {
            return ScoreRecord::zero_gap();
        }

        let findings = self.extractor.extract(gap_analysis_text);
        let counts = SeverityCounts::from_findings(&findings);
        let percentage = self.percentage(&counts);
        let risk_level = self.thresholds.classify(percentage);

        ScoreRecord::new(findings, percentage, risk_level)
    }

    /// `100 - penalty`, clamped to [0, 100]
    pub fn percentage(&self, counts: &SeverityCounts) -> u8 {
        let remaining = 100u64.saturating_sub(self.weights.penalty(counts));
        // remaining <= 100
        remaining as u8
    }

    /// Render a score as a plain-text table
    pub fn display(record: &ScoreRecord) -> String {
        let marker = match record.compliance_percentage() {
            80..=100 => "✓",
            60..=79 => "⚠",
            _ => "✗",
        };

        let mut rows = vec![
            (
                "Overall Compliance".to_string(),
                format!("{} {}%", marker, record.compliance_percentage()),
            ),
            ("Risk Level".to_string(), record.risk_level().to_string()),
            ("Total Gaps Found".to_string(), record.total_gaps().to_string()),
        ];
        for severity in Severity::ALL {
            rows.push((format!("  • {}", severity), record.count(severity).to_string()));
        }

        let metric_width = rows
            .iter()
            .map(|(m, _)| m.chars().count())
            .max()
            .unwrap_or(0)
            .max("Metric".len());
        let value_width = rows
            .iter()
            .map(|(_, v)| v.chars().count())
            .max()
            .unwrap_or(0)
            .max("Value".len());

        let border = format!("+{}+{}+", "-".repeat(metric_width + 2), "-".repeat(value_width + 2));
        let mut out = String::from("Compliance Score\n");
        out.push_str(&border);
        out.push('\n');
        out.push_str(&table_row("Metric", metric_width, "Value", value_width));
        out.push_str(&border);
        out.push('\n');
        for (metric, value) in &rows {
            out.push_str(&table_row(metric, metric_width, value, value_width));
        }
        out.push_str(&border);
        out.push('\n');
        out
    }
}

fn table_row(left: &str, left_width: usize, right: &str, right_width: usize) -> String {
    let left_pad = left_width - left.chars().count();
    let right_pad = right_width - right.chars().count();
    format!(
        "| {}{} | {}{} |\n",
        left,
        " ".repeat(left_pad),
        right,
        " ".repeat(right_pad)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOUR_TIERS: &str =
        "Critical: no MFA.\nHigh: weak password policy.\nMedium: backup untested.\nLow: add logging detail.";

    #[test]
    fn test_one_gap_per_tier() {
        let scorer = ComplianceScorer::default();
        let record = scorer.calculate_score(FOUR_TIERS);

        assert_eq!(record.counts(), SeverityCounts { critical: 1, high: 1, medium: 1, low: 1 });
        assert_eq!(record.total_gaps(), 4);
        assert_eq!(record.compliance_percentage(), 68);
        assert_eq!(record.risk_level(), RiskLevel::High);
    }

    #[test]
    fn test_empty_text_is_full_compliance() {
        let scorer = ComplianceScorer::default();
        for text in ["", "   ", "\n\n"] {
            let record = scorer.calculate_score(text);
            assert_eq!(record.total_gaps(), 0);
            assert_eq!(record.compliance_percentage(), 100);
            assert_eq!(record.risk_level(), RiskLevel::VeryLow);
        }
    }

    #[test]
    fn test_no_keywords_is_full_compliance() {
        let scorer = ComplianceScorer::default();
        let record = scorer.calculate_score("The policy aligns with the framework.\nNo gaps were identified.");
        assert_eq!(record.compliance_percentage(), 100);
        assert_eq!(record.risk_level(), RiskLevel::VeryLow);
    }

    #[test]
    fn test_penalty_clamps_at_zero() {
        let scorer = ComplianceScorer::default();
        let text = (0..10).map(|i| format!("Critical gap {}", i)).collect::<Vec<_>>().join("\n");
        let record = scorer.calculate_score(&text);
        assert_eq!(record.count(Severity::Critical), 10);
        assert_eq!(record.compliance_percentage(), 0);
        assert_eq!(record.risk_level(), RiskLevel::Critical);
    }

    #[test]
    fn test_custom_weights_change_score() {
        let config = ScoringConfig {
            weights: ScoringWeights { critical: 40, high: 20, medium: 10, low: 1 },
            ..ScoringConfig::default()
        };
        let scorer = ComplianceScorer::new(config).unwrap();
        let record = scorer.calculate_score(FOUR_TIERS);
        assert_eq!(record.compliance_percentage(), 29);
        assert_eq!(record.risk_level(), RiskLevel::Critical);
    }

    #[test]
    fn test_rejects_unordered_weights() {
        let config = ScoringConfig {
            weights: ScoringWeights { critical: 5, high: 10, medium: 3, low: 1 },
            ..ScoringConfig::default()
        };
        assert!(matches!(
            ComplianceScorer::new(config),
            Err(ScoringConfigError::WeightsNotOrdered(_))
        ));

        let zero = ScoringWeights { critical: 3, high: 2, medium: 1, low: 0 };
        assert!(matches!(zero.validate(), Err(ScoringConfigError::ZeroWeight)));
    }

    #[test]
    fn test_rejects_overlapping_thresholds() {
        let thresholds = RiskThresholds { very_low: 90, low: 90, moderate: 70, high: 60 };
        assert!(thresholds.validate().is_err());

        let thresholds = RiskThresholds { very_low: 101, low: 80, moderate: 70, high: 60 };
        assert!(thresholds.validate().is_err());

        let thresholds = RiskThresholds { very_low: 90, low: 80, moderate: 70, high: 0 };
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_thresholds_partition_full_range() {
        let thresholds = RiskThresholds::default();
        let mut previous = RiskLevel::Critical;
        for pct in 0..=100u8 {
            let level = thresholds.classify(pct);
            assert!(level <= previous, "risk must not rise as percentage rises");
            previous = level;
        }
        assert_eq!(thresholds.classify(100), RiskLevel::VeryLow);
        assert_eq!(thresholds.classify(90), RiskLevel::VeryLow);
        assert_eq!(thresholds.classify(89), RiskLevel::Low);
        assert_eq!(thresholds.classify(70), RiskLevel::Moderate);
        assert_eq!(thresholds.classify(60), RiskLevel::High);
        assert_eq!(thresholds.classify(59), RiskLevel::Critical);
        assert_eq!(thresholds.classify(0), RiskLevel::Critical);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let scorer = ComplianceScorer::default();
        assert_eq!(scorer.calculate_score(FOUR_TIERS), scorer.calculate_score(FOUR_TIERS));
    }

    #[test]
    fn test_display_renders_all_rows() {
        let scorer = ComplianceScorer::default();
        let record = scorer.calculate_score(FOUR_TIERS);
        let table = ComplianceScorer::display(&record);

        assert!(table.starts_with("Compliance Score\n"));
        assert!(table.contains("⚠ 68%"));
        assert!(table.contains("| Risk Level"));
        assert!(table.contains("• Critical"));
        assert!(table.contains("• Low"));
    }

    #[test]
    fn test_config_deserializes_partial_weights() {
        let config: ScoringConfig = serde_json::from_str(r#"{"weights": {"critical": 20}}"#).unwrap();
        assert_eq!(config.weights.critical, 20);
        assert_eq!(config.weights.high, 10);
        assert_eq!(config.thresholds, RiskThresholds::default());
        assert!(config.validate().is_ok());
    }
}
