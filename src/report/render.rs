//! Report rendering

use chrono::Utc;
use std::fmt::Write as _;

use super::ReportError;
use crate::pipeline::{DocumentRole, ResultBundle};
use crate::scoring::Severity;

/// Full report: metadata, score, gap analysis and remediation plan
pub fn render_markdown(bundle: &ResultBundle) -> String {
    let mut out = String::new();
    let score = &bundle.score;

    out.push_str("# Policy Gap Analysis Report\n\n");
    let _ = writeln!(out, "**Generated:** {}  ", bundle.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "**Framework:** {}  ", bundle.framework_name);
    let _ = writeln!(out, "**Model:** {}  ", bundle.model_identifier);
    let _ = writeln!(out, "**Run:** {}\n", bundle.run_id);

    out.push_str("## Documents\n\n");
    for role in [DocumentRole::Policy, DocumentRole::Reference] {
        let text = bundle.document_text(role);
        let _ = writeln!(
            out,
            "- **{}:** {} words, {} characters",
            capitalize(role.as_str()),
            text.split_whitespace().count(),
            text.chars().count()
        );
    }
    out.push_str("\n---\n\n");

    out.push_str("## Compliance Score\n\n");
    let _ = writeln!(out, "- **Overall Compliance:** {}%", score.compliance_percentage());
    let _ = writeln!(out, "- **Risk Level:** {}", score.risk_level());
    let _ = writeln!(out, "- **Total Gaps:** {}", score.total_gaps());
    for severity in Severity::ALL {
        let _ = writeln!(out, "  - {}: {}", severity, score.count(severity));
    }
    out.push_str("\n---\n\n");

    out.push_str("## Gap Analysis\n\n");
    out.push_str(bundle.gap_analysis_text.trim());
    out.push_str("\n\n");

    if let Some(remediation) = &bundle.remediation_text {
        out.push_str("## Remediation Plan\n\n");
        out.push_str(remediation.trim());
        out.push_str("\n\n");
    }

    out
}

/// The bundle as pretty JSON with an `export_timestamp` field
pub fn render_json(bundle: &ResultBundle) -> Result<String, ReportError> {
    let mut value = serde_json::to_value(bundle)?;
    if let Some(object) = value.as_object_mut() {
        object.insert(
            "export_timestamp".to_string(),
            serde_json::Value::String(Utc::now().to_rfc3339()),
        );
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Executive summary only
pub fn render_summary(bundle: &ResultBundle) -> String {
    let summary = &bundle.summary;
    let metrics = &summary.key_metrics;
    let mut out = String::new();

    out.push_str("# Executive Summary\n\n");
    let _ = writeln!(out, "**Date:** {}  ", bundle.created_at.format("%B %d, %Y"));
    let _ = writeln!(out, "**Framework:** {}\n", bundle.framework_name);

    let _ = writeln!(out, "## Overall Assessment\n\n{}\n", summary.overall_assessment);

    out.push_str("## Key Metrics\n\n");
    let _ = writeln!(out, "- **Compliance Score:** {}%", metrics.compliance_percentage);
    let _ = writeln!(out, "- **Risk Level:** {}", metrics.risk_level);
    let _ = writeln!(out, "- **Total Gaps Identified:** {}", metrics.total_gaps);
    let _ = writeln!(out, "- **Critical Issues:** {}", metrics.critical);
    let _ = writeln!(out, "- **High Priority Issues:** {}\n", metrics.high);

    out.push_str("## Priority Recommendations\n\n");
    if summary.priority_recommendations.is_empty() {
        out.push_str("No prioritized gaps were identified.\n");
    }
    for (i, recommendation) in summary.priority_recommendations.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, recommendation);
    }
    out.push('\n');

    out.push_str("## Recommended Timeline\n\n");
    for entry in &summary.timeline {
        let _ = writeln!(
            out,
            "- **{} ({}):** {}",
            entry.horizon.title(),
            entry.window,
            entry.action
        );
    }

    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_bundle;

    #[test]
    fn test_markdown_contains_score_and_sections() {
        let bundle = sample_bundle(None);
        let report = render_markdown(&bundle);

        assert!(report.starts_with("# Policy Gap Analysis Report"));
        assert!(report.contains("**Model:** llama3.2:3b"));
        assert!(report.contains("- **Overall Compliance:** 68%"));
        assert!(report.contains("- **Risk Level:** High"));
        assert!(report.contains("  - Critical: 1"));
        assert!(report.contains("## Gap Analysis\n\nCritical: no MFA."));
        assert!(!report.contains("## Remediation Plan"));
    }

    #[test]
    fn test_markdown_includes_remediation_when_present() {
        let bundle = sample_bundle(Some("Enable MFA for all users."));
        let report = render_markdown(&bundle);
        assert!(report.contains("## Remediation Plan\n\nEnable MFA for all users."));
    }

    #[test]
    fn test_json_has_export_timestamp_and_omits_missing_remediation() {
        let bundle = sample_bundle(None);
        let json: serde_json::Value = serde_json::from_str(&render_json(&bundle).unwrap()).unwrap();

        assert!(json["export_timestamp"].is_string());
        assert_eq!(json["score"]["compliance_percentage"], 68);
        assert_eq!(json["score"]["risk_level"], "High");
        assert!(json.get("remediation_text").is_none());
    }

    #[test]
    fn test_summary_lists_recommendations_and_timeline() {
        let bundle = sample_bundle(None);
        let summary = render_summary(&bundle);

        assert!(summary.contains("1. [Critical] no MFA."));
        assert!(summary.contains("- **Immediate (0-30 days):** Address 1 critical security gap"));
        assert!(summary.contains("- **Long-term (6-12 months):**"));
    }
}
