//! Prompt templates for the two model stages

/// Build the gap analysis prompt comparing `policy` against `reference`
pub fn build_gap_analysis_prompt(framework_name: &str, policy: &str, reference: &str) -> String {
    format!(
        r#"You are a cybersecurity policy analyst with deep knowledge of the {framework}.

Compare the organization's policy below against the reference framework and report every gap you find.

REFERENCE FRAMEWORK ({framework}):
{reference}

ORGANIZATION POLICY:
{policy}

Cover the following:
1. Missing provisions: controls or procedures required by the framework that the policy omits entirely.
2. Weak or incomplete areas: topics the policy mentions but treats vaguely or insufficiently.
3. Compliance gaps: specific framework requirements that are not adequately addressed.
4. Priority areas: the five gaps that most urgently need attention.

Output format:
- Put each gap on its own line.
- Start each gap line with its severity label, exactly one of "Critical:", "High:", "Medium:" or "Low:".
- Group related gaps under short markdown headings.
- Cite the relevant section of either document where possible.

Begin the gap analysis:"#,
        framework = framework_name,
        reference = reference.trim(),
        policy = policy.trim(),
    )
}

/// Build the remediation prompt from the policy and its gap analysis
pub fn build_remediation_prompt(framework_name: &str, policy: &str, gap_analysis: &str) -> String {
    format!(
        r#"You are a cybersecurity policy writer preparing remediation guidance against the {framework}.

ORIGINAL POLICY:
{policy}

GAP ANALYSIS FINDINGS:
{gaps}

Produce a remediation plan with these sections:
1. Overview: a short description of the changes required.
2. Recommendations: for each gap, what to add or change, the framework rationale, and the implementation priority (Immediate, Short-term or Long-term).
3. Revised policy text: draft policy language ready to insert into the organization's policy, clearly marked.
4. Roadmap: a phased implementation plan.
5. Validation: checkpoints that confirm compliance once the changes are in place.

Begin the remediation plan:"#,
        framework = framework_name,
        policy = policy.trim(),
        gaps = gap_analysis.trim(),
    )
}
