//! Deterministic executive summary generation

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::models::{Horizon, KeyMetrics, SummaryRecord, TimelineEntry};
use crate::scoring::{Finding, RiskLevel, ScoreRecord};

/// Summary configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Maximum number of priority recommendations
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,

    /// Recommendations longer than this are truncated
    #[serde(default = "default_recommendation_max_chars")]
    pub recommendation_max_chars: usize,
}

fn default_max_recommendations() -> usize {
    5
}

fn default_recommendation_max_chars() -> usize {
    160
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_recommendations: default_max_recommendations(),
            recommendation_max_chars: default_recommendation_max_chars(),
        }
    }
}

/// Builds executive summaries from gap analysis text and its score
///
/// Recommendations and timeline items come from the findings stored in the
/// [`ScoreRecord`], so they always agree with its counts.
#[derive(Debug, Clone, Default)]
pub struct ExecutiveSummaryBuilder {
    config: SummaryConfig,
}

impl ExecutiveSummaryBuilder {
    pub fn new(config: SummaryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    pub fn generate(&self, gap_analysis_text: &str, score: &ScoreRecord) -> SummaryRecord {
        let findings = score.findings();
        let key_metrics = KeyMetrics::from(score);

        let summary = SummaryRecord {
            overall_assessment: assessment_for(score.risk_level()).to_string(),
            key_metrics,
            priority_recommendations: self.recommendations(findings),
            timeline: build_timeline(findings, &key_metrics),
        };

        debug!(
            risk_level = %score.risk_level(),
            analysis_chars = gap_analysis_text.len(),
            recommendations = summary.priority_recommendations.len(),
            "Executive summary generated"
        );

        summary
    }

    /// Top findings by severity, ties kept in source order
    fn recommendations(&self, findings: &[Finding]) -> Vec<String> {
        let mut ranked: Vec<&Finding> = findings.iter().collect();
        ranked.sort_by_key(|f| f.severity());

        ranked
            .into_iter()
            .take(self.config.max_recommendations)
            .map(|f| {
                let line = format!("[{}] {}", f.severity(), f.body());
                truncate_chars(&line, self.config.recommendation_max_chars)
            })
            .collect()
    }
}

/// Fixed assessment sentence per risk level
pub fn assessment_for(risk_level: RiskLevel) -> &'static str {
    match risk_level {
        RiskLevel::VeryLow => {
            "The policy demonstrates strong alignment with the reference framework; only minor refinements are indicated."
        }
        RiskLevel::Low => {
            "The policy demonstrates good compliance with the reference framework, with a small number of gaps to close."
        }
        RiskLevel::Moderate => {
            "The policy shows moderate compliance but requires targeted improvements to meet the reference framework."
        }
        RiskLevel::High => {
            "The policy has significant gaps that leave material security risks unaddressed."
        }
        RiskLevel::Critical => {
            "The policy has critical gaps that expose the organization to substantial security risks and require immediate action."
        }
    }
}

fn build_timeline(findings: &[Finding], metrics: &KeyMetrics) -> Vec<TimelineEntry> {
    Horizon::ALL
        .iter()
        .map(|horizon| {
            let items = findings
                .iter()
                .filter(|f| Horizon::for_severity(f.severity()) == *horizon)
                .map(|f| f.body().to_string())
                .collect();

            TimelineEntry {
                horizon: *horizon,
                window: horizon.window().to_string(),
                action: timeline_action(*horizon, metrics),
                items,
            }
        })
        .collect()
}

fn timeline_action(horizon: Horizon, metrics: &KeyMetrics) -> String {
    match horizon {
        Horizon::Immediate => match metrics.critical {
            0 => "No critical gaps identified; confirm existing controls remain effective".to_string(),
            n => format!("Address {} critical security {}", n, plural(n, "gap", "gaps")),
        },
        Horizon::ShortTerm => match metrics.high {
            0 => "No high-priority gaps identified".to_string(),
            n => format!(
                "Implement {} high-priority {}",
                n,
                plural(n, "improvement", "improvements")
            ),
        },
        Horizon::MediumTerm => match metrics.medium {
            0 => "No medium-priority gaps identified".to_string(),
            n => format!(
                "Complete {} medium-priority {}",
                n,
                plural(n, "enhancement", "enhancements")
            ),
        },
        Horizon::LongTerm => match metrics.low {
            0 => "Continuous improvement and monitoring".to_string(),
            n => format!(
                "Resolve {} low-priority {}; continuous improvement and monitoring",
                n,
                plural(n, "item", "items")
            ),
        },
    }
}

fn plural<'a>(n: u32, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}

/// Never longer than `max_chars`; the ellipsis is dropped when it would not fit
fn truncate_chars(text: &str, max_chars: usize) -> String {
    const ELLIPSIS: &str = "...";

    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars < ELLIPSIS.len() {
        return text.chars().take(max_chars).collect();
    }
    let mut truncated: String = text.chars().take(max_chars - ELLIPSIS.len()).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}
